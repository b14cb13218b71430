//! HederaGive Core
//!
//! Shared vocabulary for the donation dashboard:
//! - Domain records (campaigns, milestones, donations, supporters)
//! - Session identities and roles
//! - Form validation rules
//! - Configuration
//! - The error taxonomy every other crate reports through
//!
//! # Example
//!
//! ```rust
//! use hgive_core::validation::validate_milestone_funding;
//!
//! assert!(validate_milestone_funding(1000.0, &[300.0, 300.0, 400.0]).is_ok());
//! assert!(validate_milestone_funding(1000.0, &[300.0, 300.0, 300.0]).is_err());
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod campaign;
pub mod config;
pub mod donation;
pub mod error;
pub mod impact;
pub mod user;
pub mod validation;

// Re-exports for convenience
pub use campaign::{Campaign, CampaignStatus, Milestone, MilestoneStatus};
pub use config::{GiveConfig, LedgerConfig};
pub use donation::{
    aggregate_supporters, sort_leaderboard, Donation, LeaderboardSort, NewDonation, Supporter,
    SupportersFile, ANONYMOUS_DONOR,
};
pub use error::{GiveError, GiveResult, NotFoundError, ValidationError};
pub use impact::{ImpactMetrics, MonthlyImpact, VerifiedMetrics};
pub use user::{Badge, Role, User, UserUpdate};
pub use validation::{CampaignDraft, MilestoneDraft, SignupForm};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with HederaGive
    pub use crate::{
        Badge, Campaign, CampaignStatus, Donation, GiveConfig, GiveError, GiveResult, Milestone,
        MilestoneStatus, NewDonation, Role, Supporter, User, ValidationError,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
