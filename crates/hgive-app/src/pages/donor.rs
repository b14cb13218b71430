//! Donor dashboard
//!
//! - Active campaigns, filtered by category and goal range
//! - Donation form (minimum from configuration, anonymous option)
//! - The donor's history with monthly and per-campaign totals
//! - Transaction verification tool
//! - Leaderboard

use super::donate::{self, DonationReceipt, DonationRequest};
use super::{categories, milestone_rows, month_key, CampaignCard, MilestoneRow};
use crate::context::AppContext;
use crate::session::Session;
use chrono::NaiveDate;
use hgive_core::{
    sort_leaderboard, Campaign, GiveResult, LeaderboardSort, Role, Supporter, ValidationError,
};
use hgive_ledger::Verification;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Sidebar filter; `None` fields do not filter
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CampaignFilter {
    pub category: Option<String>,
    pub min_goal: Option<f64>,
    pub max_goal: Option<f64>,
}

impl CampaignFilter {
    fn matches(&self, campaign: &Campaign) -> bool {
        self.category.as_deref().map_or(true, |c| campaign.category == c)
            && self.min_goal.map_or(true, |min| campaign.goal >= min)
            && self.max_goal.map_or(true, |max| campaign.goal <= max)
    }
}

/// Smallest and largest goal across all campaigns
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GoalBounds {
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DonorCampaign {
    #[serde(flatten)]
    pub card: CampaignCard,
    pub days_left: i64,
    pub end_date: NaiveDate,
    pub milestones: Vec<MilestoneRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryRow {
    pub date: NaiveDate,
    pub campaign: String,
    pub amount: f64,
    pub transaction_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DonationHistory {
    /// Newest first
    pub rows: Vec<HistoryRow>,
    pub total: f64,
    /// `YYYY-MM` → amount
    pub monthly: BTreeMap<String, f64>,
    /// Campaign name → amount
    pub by_campaign: BTreeMap<String, f64>,
}

impl DonationHistory {
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DonorDashboardView {
    pub donor: String,
    pub categories: Vec<String>,
    pub goal_bounds: Option<GoalBounds>,
    pub filter: CampaignFilter,
    pub campaigns: Vec<DonorCampaign>,
    pub min_donation: f64,
    pub history: DonationHistory,
    pub leaderboard_sort: LeaderboardSort,
    pub leaderboard: Vec<Supporter>,
}

pub fn render(
    ctx: &AppContext,
    session: &Session,
    filter: &CampaignFilter,
    sort: LeaderboardSort,
    today: NaiveDate,
) -> GiveResult<DonorDashboardView> {
    let donor = session.require_role(Role::Donor, "open the donor dashboard")?;
    let all = ctx.store.campaigns();

    let goal_bounds = all.iter().map(|c| c.goal).fold(None, |acc: Option<GoalBounds>, g| {
        Some(match acc {
            None => GoalBounds { min: g, max: g },
            Some(b) => GoalBounds {
                min: b.min.min(g),
                max: b.max.max(g),
            },
        })
    });

    let campaigns = all
        .iter()
        .filter(|c| c.is_active() && filter.matches(c))
        .map(|c| DonorCampaign {
            card: CampaignCard::new(ctx, c),
            days_left: c.days_left(today),
            end_date: c.end_date,
            milestones: milestone_rows(c),
        })
        .collect();

    Ok(DonorDashboardView {
        donor: donor.name.clone(),
        categories: categories(&all),
        goal_bounds,
        filter: filter.clone(),
        campaigns,
        min_donation: ctx.config.min_donation,
        history: history(ctx, &donor.name),
        leaderboard_sort: sort,
        leaderboard: leaderboard(ctx, sort),
    })
}

/// Donations made under `donor_name`, with totals
#[must_use]
pub fn history(ctx: &AppContext, donor_name: &str) -> DonationHistory {
    let names: HashMap<u64, String> = ctx
        .store
        .campaigns()
        .into_iter()
        .map(|c| (c.id, c.name))
        .collect();

    let mut donations = ctx.store.donations_by(donor_name);
    donations.sort_by(|a, b| b.date.cmp(&a.date).then(b.id.cmp(&a.id)));

    let mut history = DonationHistory::default();
    for d in donations {
        let campaign = names
            .get(&d.campaign_id)
            .cloned()
            .unwrap_or_else(|| format!("Campaign {}", d.campaign_id));
        history.total += d.amount;
        *history.monthly.entry(month_key(d.date)).or_insert(0.0) += d.amount;
        *history.by_campaign.entry(campaign.clone()).or_insert(0.0) += d.amount;
        history.rows.push(HistoryRow {
            date: d.date,
            campaign,
            amount: d.amount,
            transaction_id: d.transaction_id,
        });
    }
    history
}

/// Supporters ordered by `sort`
#[must_use]
pub fn leaderboard(ctx: &AppContext, sort: LeaderboardSort) -> Vec<Supporter> {
    let mut supporters = ctx.store.supporters();
    sort_leaderboard(&mut supporters, sort);
    supporters
}

/// Donate from the dashboard form
pub async fn donate(
    ctx: &AppContext,
    session: &mut Session,
    request: &DonationRequest,
    today: NaiveDate,
) -> GiveResult<DonationReceipt> {
    donate::donate(ctx, session, request, ctx.config.min_donation, today).await
}

/// Check a transaction id against the ledger
pub async fn verify(ctx: &AppContext, session: &Session, transaction_id: &str) -> GiveResult<Verification> {
    session.require_role(Role::Donor, "verify transactions")?;
    let transaction_id = transaction_id.trim();
    if transaction_id.is_empty() {
        return Err(ValidationError::MissingField("transaction id").into());
    }
    Ok(ctx.ledger.verify_transaction(transaction_id).await)
}
