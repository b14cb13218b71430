//! Campaigns and their milestones
//!
//! Milestone status follows a forward-only lifecycle:
//!
//! ```text
//! Pending ──► InProgress ──► Completed
//! ```
//!
//! Every transition is triggered by a charity action and checked with
//! [`validate_transition`]; nothing advances on its own.

use crate::error::ValidationError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Campaign lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CampaignStatus {
    /// Accepting donations
    Active,
    /// Goal met and work finished
    Completed,
    /// Temporarily closed to donations
    Paused,
    /// Withdrawn by the charity
    Cancelled,
    /// Any status string this build does not know
    #[serde(other)]
    Unknown,
}

impl CampaignStatus {
    /// Wire name
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            CampaignStatus::Active => "active",
            CampaignStatus::Completed => "completed",
            CampaignStatus::Paused => "paused",
            CampaignStatus::Cancelled => "cancelled",
            CampaignStatus::Unknown => "unknown",
        }
    }
}

impl fmt::Display for CampaignStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Milestone lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MilestoneStatus {
    Pending,
    InProgress,
    Completed,
}

impl MilestoneStatus {
    /// Wire name
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            MilestoneStatus::Pending => "pending",
            MilestoneStatus::InProgress => "in_progress",
            MilestoneStatus::Completed => "completed",
        }
    }

    /// Human label ("In Progress")
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            MilestoneStatus::Pending => "Pending",
            MilestoneStatus::InProgress => "In Progress",
            MilestoneStatus::Completed => "Completed",
        }
    }
}

impl fmt::Display for MilestoneStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// States reachable from `from` in one step.
pub fn allowed_transitions(from: MilestoneStatus) -> Vec<MilestoneStatus> {
    use MilestoneStatus::*;
    match from {
        Pending => vec![InProgress],
        InProgress => vec![Completed],
        Completed => vec![],
    }
}

/// Validates a milestone status change.
pub fn validate_transition(
    from: MilestoneStatus,
    to: MilestoneStatus,
) -> Result<(), ValidationError> {
    if allowed_transitions(from).contains(&to) {
        Ok(())
    } else {
        Err(ValidationError::IllegalTransition { from, to })
    }
}

/// Funding stage of a campaign
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Milestone {
    pub id: u64,
    pub name: String,
    pub funds_required: f64,
    pub status: MilestoneStatus,
    /// Reference to the uploaded proof of completion
    #[serde(default)]
    pub proof: Option<String>,
    /// Date funds were released
    #[serde(default)]
    pub release_date: Option<NaiveDate>,
}

impl Milestone {
    /// New pending milestone
    pub fn pending(id: u64, name: impl Into<String>, funds_required: f64) -> Self {
        Self {
            id,
            name: name.into(),
            funds_required,
            status: MilestoneStatus::Pending,
            proof: None,
            release_date: None,
        }
    }

    /// Move to `to`, stamping the release date on completion
    pub fn advance(&mut self, to: MilestoneStatus, today: NaiveDate) -> Result<(), ValidationError> {
        validate_transition(self.status, to)?;
        self.status = to;
        if to == MilestoneStatus::Completed {
            self.release_date = Some(today);
        }
        Ok(())
    }

    /// Record a proof reference; only while in progress and only once
    pub fn attach_proof(&mut self, proof: impl Into<String>) -> Result<(), ValidationError> {
        if self.status != MilestoneStatus::InProgress {
            return Err(ValidationError::ProofNotExpected {
                milestone: self.id,
                status: self.status,
            });
        }
        if self.proof.is_some() {
            return Err(ValidationError::ProofAlreadySubmitted(self.id));
        }
        self.proof = Some(proof.into());
        Ok(())
    }

    /// In progress with no proof recorded yet
    #[inline]
    #[must_use]
    pub fn awaiting_proof(&self) -> bool {
        self.status == MilestoneStatus::InProgress && self.proof.is_none()
    }
}

/// Fundraising campaign
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Campaign {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub category: String,
    #[serde(default)]
    pub location: String,
    pub goal: f64,
    #[serde(default)]
    pub raised: f64,
    /// Part of `raised` not backed by the donation log (seed or offline
    /// gifts). `None` until the store first opens the file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raised_offline: Option<f64>,
    /// Number of donations received
    #[serde(default)]
    pub supporters: u32,
    pub status: CampaignStatus,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default)]
    pub milestones: Vec<Milestone>,
    #[serde(default)]
    pub beneficiaries: u64,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub transaction_id: String,
}

impl Campaign {
    /// Fraction of the goal raised; zero when the goal is not positive
    #[must_use]
    pub fn progress(&self) -> f64 {
        if self.goal > 0.0 {
            self.raised / self.goal
        } else {
            0.0
        }
    }

    /// Days until the end date, negative once it has passed
    #[must_use]
    pub fn days_left(&self, today: NaiveDate) -> i64 {
        (self.end_date - today).num_days()
    }

    #[inline]
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status == CampaignStatus::Active
    }

    /// Sum of milestone funding requirements
    #[must_use]
    pub fn milestone_funds_total(&self) -> f64 {
        self.milestones.iter().map(|m| m.funds_required).sum()
    }

    #[must_use]
    pub fn milestone(&self, id: u64) -> Option<&Milestone> {
        self.milestones.iter().find(|m| m.id == id)
    }

    pub fn milestone_mut(&mut self, id: u64) -> Option<&mut Milestone> {
        self.milestones.iter_mut().find(|m| m.id == id)
    }

    /// Milestones counted by status: `(completed, in_progress)`
    #[must_use]
    pub fn milestone_counts(&self) -> (usize, usize) {
        self.milestones.iter().fold((0, 0), |(done, ongoing), m| match m.status {
            MilestoneStatus::Completed => (done + 1, ongoing),
            MilestoneStatus::InProgress => (done, ongoing + 1),
            MilestoneStatus::Pending => (done, ongoing),
        })
    }

    /// Description cut to `max` characters with an ellipsis
    #[must_use]
    pub fn short_description(&self, max: usize) -> String {
        if self.description.chars().count() > max {
            let cut: String = self.description.chars().take(max).collect();
            format!("{cut}...")
        } else {
            self.description.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn transitions_move_forward_one_step() {
        use MilestoneStatus::*;
        assert!(validate_transition(Pending, InProgress).is_ok());
        assert!(validate_transition(InProgress, Completed).is_ok());

        assert!(validate_transition(Pending, Completed).is_err());
        assert!(validate_transition(Completed, InProgress).is_err());
        assert!(validate_transition(InProgress, Pending).is_err());
        assert!(validate_transition(Pending, Pending).is_err());
    }

    #[test]
    fn completion_stamps_release_date() {
        let today = date("2025-03-20");
        let mut m = Milestone::pending(1, "Wells", 300.0);
        m.advance(MilestoneStatus::InProgress, today).unwrap();
        assert_eq!(m.release_date, None);
        m.advance(MilestoneStatus::Completed, today).unwrap();
        assert_eq!(m.release_date, Some(today));
    }

    #[test]
    fn proof_only_while_in_progress_and_once() {
        let mut m = Milestone::pending(4, "Clinic", 500.0);
        assert!(matches!(
            m.attach_proof("ipfs://a"),
            Err(ValidationError::ProofNotExpected { milestone: 4, .. })
        ));

        m.advance(MilestoneStatus::InProgress, date("2025-01-01")).unwrap();
        assert!(m.awaiting_proof());
        m.attach_proof("ipfs://a").unwrap();
        assert!(!m.awaiting_proof());
        assert_eq!(
            m.attach_proof("ipfs://b"),
            Err(ValidationError::ProofAlreadySubmitted(4))
        );
    }

    #[test]
    fn campaign_deserializes_fixture_shape() {
        let json = r#"{
            "id": 1, "name": "Clean Water", "category": "Environment",
            "goal": 1000, "raised": 200, "status": "active",
            "start_date": "2025-01-15", "end_date": "2025-07-30",
            "milestones": [
                {"id": 1, "name": "Survey", "funds_required": 300, "status": "completed",
                 "proof": "QmProof", "release_date": "2025-02-01"},
                {"id": 2, "name": "Drill", "funds_required": 700, "status": "in_progress", "proof": null}
            ],
            "image": "water.jpg", "transaction_id": "0.0.2000001"
        }"#;
        let c: Campaign = serde_json::from_str(json).unwrap();
        assert_eq!(c.progress(), 0.2);
        assert_eq!(c.milestone_counts(), (1, 1));
        assert_eq!(c.milestone_funds_total(), 1000.0);
        assert_eq!(c.days_left(date("2025-07-20")), 10);
        assert_eq!(c.description, "");
    }

    #[test]
    fn unknown_status_is_tolerated() {
        let s: CampaignStatus = serde_json::from_str(r#""archived""#).unwrap();
        assert_eq!(s, CampaignStatus::Unknown);
    }

    #[test]
    fn zero_goal_has_zero_progress() {
        let json = r#"{"id": 9, "name": "x", "category": "y", "goal": 0, "raised": 10,
            "status": "active", "start_date": "2025-01-01", "end_date": "2025-02-01"}"#;
        let c: Campaign = serde_json::from_str(json).unwrap();
        assert_eq!(c.progress(), 0.0);
    }
}
