//! Page controllers
//!
//! Each controller turns store and session state into a serializable view
//! model and exposes the actions its page offers. Controllers that belong
//! to a role check it themselves, so an action cannot bypass the router's
//! page gate.

pub mod charity;
pub mod donate;
pub mod donor;
pub mod explore;
pub mod home;
pub mod impact;
pub mod login;

use crate::context::AppContext;
use chrono::NaiveDate;
use hgive_core::{Campaign, Milestone, MilestoneStatus};
use serde::Serialize;
use std::collections::BTreeSet;
use std::path::PathBuf;

/// Summary card shown wherever campaigns are listed
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CampaignCard {
    pub id: u64,
    pub name: String,
    pub description: String,
    pub category: String,
    pub image: PathBuf,
    pub raised: f64,
    pub goal: f64,
    /// Fraction of the goal raised, clamped to `0..=1` for display
    pub progress: f64,
}

impl CampaignCard {
    pub fn new(ctx: &AppContext, campaign: &Campaign) -> Self {
        Self {
            id: campaign.id,
            name: campaign.name.clone(),
            description: campaign.description.clone(),
            category: campaign.category.clone(),
            image: ctx.assets.resolve(&campaign.image),
            raised: campaign.raised,
            goal: campaign.goal,
            progress: campaign.progress().clamp(0.0, 1.0),
        }
    }

    /// Card with the description cut to `max` characters
    #[must_use]
    pub fn truncated(mut self, campaign: &Campaign, max: usize) -> Self {
        self.description = campaign.short_description(max);
        self
    }
}

/// One milestone as listed under a campaign
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MilestoneRow {
    pub id: u64,
    pub name: String,
    pub funds_required: f64,
    pub status: MilestoneStatus,
    pub status_label: &'static str,
    pub proof: Option<String>,
    pub release_date: Option<NaiveDate>,
}

impl From<&Milestone> for MilestoneRow {
    fn from(m: &Milestone) -> Self {
        Self {
            id: m.id,
            name: m.name.clone(),
            funds_required: m.funds_required,
            status: m.status,
            status_label: m.status.label(),
            proof: m.proof.clone(),
            release_date: m.release_date,
        }
    }
}

pub(crate) fn milestone_rows(campaign: &Campaign) -> Vec<MilestoneRow> {
    campaign.milestones.iter().map(MilestoneRow::from).collect()
}

/// Distinct categories in sorted order
pub(crate) fn categories(campaigns: &[Campaign]) -> Vec<String> {
    campaigns
        .iter()
        .map(|c| c.category.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// `YYYY-MM` bucket of a date
pub(crate) fn month_key(date: NaiveDate) -> String {
    date.format("%Y-%m").to_string()
}
