//! Form validation rules
//!
//! Checks applied to viewer input before anything reaches the store:
//! - Campaign creation (dates, milestone count, milestone funding vs goal)
//! - Signup (password confirmation, required fields)
//! - Donation amounts

use crate::error::ValidationError;
use crate::user::Role;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Smallest campaign goal accepted
pub const MIN_CAMPAIGN_GOAL: f64 = 1000.0;

/// Smallest per-milestone funding accepted
pub const MIN_MILESTONE_FUNDS: f64 = 100.0;

/// Largest number of milestones per campaign
pub const MAX_MILESTONES: usize = 5;

/// Milestone sums within this distance of the goal are treated as equal
const FUNDS_TOLERANCE: f64 = 0.005;

/// Check that milestone funding adds up to the goal.
pub fn validate_milestone_funding(goal: f64, funds: &[f64]) -> Result<(), ValidationError> {
    let sum: f64 = funds.iter().sum();
    if (sum - goal).abs() > FUNDS_TOLERANCE {
        return Err(ValidationError::MilestoneSumMismatch { sum, goal });
    }
    Ok(())
}

/// Check an amount against a minimum.
pub fn validate_amount(field: &'static str, amount: f64, minimum: f64) -> Result<(), ValidationError> {
    if !amount.is_finite() || amount < minimum {
        return Err(ValidationError::AmountBelowMinimum {
            field,
            amount,
            minimum,
        });
    }
    Ok(())
}

/// Milestone as entered in the campaign form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MilestoneDraft {
    pub name: String,
    pub funds_required: f64,
}

impl MilestoneDraft {
    pub fn new(name: impl Into<String>, funds_required: f64) -> Self {
        Self {
            name: name.into(),
            funds_required,
        }
    }
}

/// New campaign as entered by a charity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CampaignDraft {
    pub name: String,
    pub description: String,
    pub goal: f64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub category: String,
    #[serde(default)]
    pub location: String,
    pub beneficiaries: u64,
    pub milestones: Vec<MilestoneDraft>,
    /// Existing ledger account; one is issued when absent
    #[serde(default)]
    pub ledger_account: Option<String>,
}

impl CampaignDraft {
    /// Validate in the order the form reports problems.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::MissingField("name"));
        }
        if self.description.trim().is_empty() {
            return Err(ValidationError::MissingField("description"));
        }
        if self.end_date <= self.start_date {
            return Err(ValidationError::EndBeforeStart {
                start: self.start_date,
                end: self.end_date,
            });
        }
        validate_amount("goal", self.goal, MIN_CAMPAIGN_GOAL)?;

        let count = self.milestones.len();
        if count == 0 || count > MAX_MILESTONES {
            return Err(ValidationError::MilestoneCount {
                count,
                max: MAX_MILESTONES,
            });
        }
        for m in &self.milestones {
            if m.name.trim().is_empty() {
                return Err(ValidationError::MissingField("milestone name"));
            }
            validate_amount("milestone funds", m.funds_required, MIN_MILESTONE_FUNDS)?;
        }

        let funds: Vec<f64> = self.milestones.iter().map(|m| m.funds_required).collect();
        validate_milestone_funding(self.goal, &funds)
    }
}

/// Signup form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignupForm {
    pub email: String,
    pub name: String,
    pub password: String,
    pub confirm_password: String,
    pub role: Role,
    #[serde(default)]
    pub wallet_id: Option<String>,
}

impl SignupForm {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.password != self.confirm_password {
            return Err(ValidationError::PasswordMismatch);
        }
        if self.email.trim().is_empty() {
            return Err(ValidationError::MissingField("email"));
        }
        if self.name.trim().is_empty() {
            return Err(ValidationError::MissingField("name"));
        }
        if self.password.is_empty() {
            return Err(ValidationError::MissingField("password"));
        }
        Ok(())
    }
}
