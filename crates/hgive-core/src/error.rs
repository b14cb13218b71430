//! Error types for HederaGive
//!
//! Provides the error taxonomy shared by every crate:
//! - Missing files and unknown ids (`NotFound`)
//! - Malformed JSON collections (`Parse`)
//! - Business-rule failures on form input (`Validation`)
//! - Role mismatches for pages and actions (`Unauthorized`)
//!
//! Nothing here is fatal at the process level: every variant halts only the
//! action that produced it.

use crate::campaign::MilestoneStatus;
use crate::user::Role;
use chrono::NaiveDate;
use std::path::PathBuf;

/// Main HederaGive error type
#[derive(Debug, thiserror::Error)]
pub enum GiveError {
    /// Missing backing file or unknown record id
    #[error("not found: {0}")]
    NotFound(#[from] NotFoundError),

    /// Malformed JSON in a backing file
    #[error("parse error in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// IO error while reading or writing a backing file
    #[error("io error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Form input failed a business rule
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// Session role does not permit the page or action
    #[error("unauthorized: {action} is not available to {}", describe_role(.role))]
    Unauthorized {
        /// What was attempted
        action: String,
        /// Role held by the session, `None` when anonymous
        role: Option<Role>,
    },

    /// Action requires an authenticated session
    #[error("not logged in")]
    NotLoggedIn,

    /// Configuration could not be loaded
    #[error("configuration error: {0}")]
    Config(String),
}

impl GiveError {
    /// Create parse error for path
    pub fn parse_error(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::Parse {
            path: path.into(),
            source,
        }
    }

    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create unauthorized error
    pub fn unauthorized(action: impl Into<String>, role: Option<Role>) -> Self {
        Self::Unauthorized {
            action: action.into(),
            role,
        }
    }

    /// Whether the error should be shown inline to the viewer
    ///
    /// Store and configuration failures are operator problems; everything
    /// else is the viewer's input or permissions.
    #[inline]
    #[must_use]
    pub fn is_user_facing(&self) -> bool {
        matches!(
            self,
            Self::Validation(_) | Self::Unauthorized { .. } | Self::NotLoggedIn | Self::NotFound(_)
        )
    }
}

fn describe_role(role: &Option<Role>) -> String {
    match role {
        Some(role) => format!("{role} accounts"),
        None => "anonymous sessions".to_string(),
    }
}

/// What could not be found
#[derive(Debug, thiserror::Error)]
pub enum NotFoundError {
    /// Backing JSON file is absent
    #[error("file {0}")]
    File(PathBuf),

    /// Unknown campaign id
    #[error("campaign {0}")]
    Campaign(u64),

    /// Unknown milestone within a campaign
    #[error("milestone {milestone} of campaign {campaign}")]
    Milestone { campaign: u64, milestone: u64 },

    /// Unknown donation transaction
    #[error("transaction {0}")]
    Transaction(String),
}

/// Business-rule failures
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    /// A required form field was left empty
    #[error("required field '{0}' is empty")]
    MissingField(&'static str),

    /// Signup password and confirmation differ
    #[error("passwords do not match")]
    PasswordMismatch,

    /// Email/password pair not recognized
    #[error("invalid email or password")]
    InvalidCredentials,

    /// Account type is neither donor nor charity
    #[error("unknown account type '{0}'")]
    UnknownRole(String),

    /// Wallet id not linked to any account
    #[error("wallet {0} not recognized")]
    UnknownWallet(String),

    /// Signup email already belongs to an account
    #[error("an account for {0} already exists")]
    EmailTaken(String),

    /// Date range filter runs backwards
    #[error("range start {from} is after range end {to}")]
    InvertedRange { from: NaiveDate, to: NaiveDate },

    /// Campaign end date is not after its start date
    #[error("end date {end} must be after start date {start}")]
    EndBeforeStart { start: NaiveDate, end: NaiveDate },

    /// Milestone funds do not add up to the campaign goal
    #[error("milestone funds sum to {sum}, campaign goal is {goal}")]
    MilestoneSumMismatch { sum: f64, goal: f64 },

    /// Milestone count outside the accepted range
    #[error("campaign needs between 1 and {max} milestones, got {count}")]
    MilestoneCount { count: usize, max: usize },

    /// Amount below the minimum accepted for the field
    #[error("{field} must be at least {minimum}, got {amount}")]
    AmountBelowMinimum {
        field: &'static str,
        amount: f64,
        minimum: f64,
    },

    /// Milestone status change outside the forward lifecycle
    #[error("illegal milestone transition {from} -> {to}")]
    IllegalTransition {
        from: MilestoneStatus,
        to: MilestoneStatus,
    },

    /// Milestone is not awaiting proof
    #[error("milestone {milestone} is {status}, proof can only be submitted while in progress")]
    ProofNotExpected {
        milestone: u64,
        status: MilestoneStatus,
    },

    /// Proof was already recorded for the milestone
    #[error("proof already submitted for milestone {0}")]
    ProofAlreadySubmitted(u64),

    /// Donations are only accepted by active campaigns
    #[error("campaign {0} is not accepting donations")]
    CampaignClosed(u64),
}

/// Result type alias for HederaGive operations
pub type GiveResult<T> = Result<T, GiveError>;
