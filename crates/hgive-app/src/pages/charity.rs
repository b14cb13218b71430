//! Charity management
//!
//! - Overview metrics across campaigns and donations
//! - Donations within a date range, with totals per campaign
//! - Milestones awaiting proof and proofs already on record
//! - Proof submission, milestone advancement and campaign creation,
//!   each recorded through the ledger

use super::{milestone_rows, CampaignCard, MilestoneRow};
use crate::context::AppContext;
use crate::session::Session;
use chrono::{Days, NaiveDate};
use hgive_core::{
    Campaign, CampaignDraft, CampaignStatus, GiveResult, Milestone, MilestoneStatus, Role,
    ValidationError,
};
use hgive_ledger::{AccountCredentials, TxScope};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::info;

/// Categories offered by the new-campaign form
pub const CAMPAIGN_CATEGORIES: [&str; 6] = [
    "Education",
    "Healthcare",
    "Environment",
    "Disaster Relief",
    "Poverty",
    "Other",
];

/// Default width of the donations window, ending today
pub const DEFAULT_WINDOW_DAYS: u64 = 30;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CharityOverview {
    pub total_raised: f64,
    pub active_campaigns: usize,
    pub total_donors: usize,
    pub average_donation: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CampaignSummary {
    #[serde(flatten)]
    pub card: CampaignCard,
    pub status: CampaignStatus,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub beneficiaries: u64,
    pub milestones: Vec<MilestoneRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DonationRecord {
    pub date: NaiveDate,
    pub donor: String,
    pub amount: f64,
    pub campaign_name: String,
    pub transaction_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DonationReport {
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub rows: Vec<DonationRecord>,
    pub total: f64,
    pub average: f64,
    pub count: usize,
    pub by_campaign: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProofRequest {
    pub campaign_id: u64,
    pub campaign_name: String,
    pub milestone_id: u64,
    pub milestone_name: String,
    pub funds_required: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubmittedProof {
    pub campaign_name: String,
    pub milestone_name: String,
    pub proof: String,
    pub release_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CharityView {
    pub charity: String,
    pub overview: CharityOverview,
    pub campaigns: Vec<CampaignSummary>,
    pub donations: DonationReport,
    pub proofs_needed: Vec<ProofRequest>,
    pub proofs_submitted: Vec<SubmittedProof>,
    pub categories: Vec<&'static str>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProofReceipt {
    pub milestone: Milestone,
    pub transaction_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CampaignReceipt {
    pub campaign: Campaign,
    pub transaction_id: String,
    /// Ledger account issued for the campaign, when none was supplied
    pub account: Option<AccountCredentials>,
}

pub fn render(ctx: &AppContext, session: &Session, today: NaiveDate) -> GiveResult<CharityView> {
    let charity = session.require_role(Role::Charity, "open charity management")?;
    let campaigns = ctx.store.campaigns();
    let from = today
        .checked_sub_days(Days::new(DEFAULT_WINDOW_DAYS))
        .unwrap_or(NaiveDate::MIN);

    Ok(CharityView {
        charity: charity.name.clone(),
        overview: overview(ctx),
        campaigns: campaigns
            .iter()
            .map(|c| CampaignSummary {
                card: CampaignCard::new(ctx, c),
                status: c.status,
                start_date: c.start_date,
                end_date: c.end_date,
                beneficiaries: c.beneficiaries,
                milestones: milestone_rows(c),
            })
            .collect(),
        donations: donation_report(ctx, &campaigns, from, today),
        proofs_needed: proofs_needed(&campaigns),
        proofs_submitted: proofs_submitted(&campaigns),
        categories: CAMPAIGN_CATEGORIES.to_vec(),
    })
}

/// Headline numbers; averages are zero without donations
#[must_use]
pub fn overview(ctx: &AppContext) -> CharityOverview {
    let campaigns = ctx.store.campaigns();
    let donations = ctx.store.donations();
    let donated: f64 = donations.iter().map(|d| d.amount).sum();

    CharityOverview {
        total_raised: campaigns.iter().map(|c| c.raised).sum(),
        active_campaigns: campaigns.iter().filter(|c| c.is_active()).count(),
        total_donors: donations
            .iter()
            .map(|d| d.donor.as_str())
            .collect::<HashSet<_>>()
            .len(),
        average_donation: mean(donated, donations.len()),
    }
}

/// Donations dated within `from..=to`
pub fn donations_between(
    ctx: &AppContext,
    session: &Session,
    from: NaiveDate,
    to: NaiveDate,
) -> GiveResult<DonationReport> {
    session.require_role(Role::Charity, "view donation history")?;
    if from > to {
        return Err(ValidationError::InvertedRange { from, to }.into());
    }
    Ok(donation_report(ctx, &ctx.store.campaigns(), from, to))
}

fn donation_report(ctx: &AppContext, campaigns: &[Campaign], from: NaiveDate, to: NaiveDate) -> DonationReport {
    let names: HashMap<u64, &str> = campaigns.iter().map(|c| (c.id, c.name.as_str())).collect();

    let rows: Vec<DonationRecord> = ctx
        .store
        .donations()
        .into_iter()
        .filter(|d| (from..=to).contains(&d.date))
        .map(|d| DonationRecord {
            date: d.date,
            campaign_name: names
                .get(&d.campaign_id)
                .map_or_else(|| format!("Campaign {}", d.campaign_id), |n| (*n).to_string()),
            donor: d.donor,
            amount: d.amount,
            transaction_id: d.transaction_id,
        })
        .collect();

    let total: f64 = rows.iter().map(|r| r.amount).sum();
    let mut by_campaign = BTreeMap::new();
    for row in &rows {
        *by_campaign.entry(row.campaign_name.clone()).or_insert(0.0) += row.amount;
    }

    DonationReport {
        from,
        to,
        average: mean(total, rows.len()),
        count: rows.len(),
        total,
        by_campaign,
        rows,
    }
}

#[allow(clippy::cast_precision_loss)]
fn mean(total: f64, count: usize) -> f64 {
    if count == 0 {
        0.0
    } else {
        total / count as f64
    }
}

/// In-progress milestones that have no proof yet
#[must_use]
pub fn proofs_needed(campaigns: &[Campaign]) -> Vec<ProofRequest> {
    campaigns
        .iter()
        .flat_map(|c| {
            c.milestones
                .iter()
                .filter(|m| m.awaiting_proof())
                .map(move |m| ProofRequest {
                    campaign_id: c.id,
                    campaign_name: c.name.clone(),
                    milestone_id: m.id,
                    milestone_name: m.name.clone(),
                    funds_required: m.funds_required,
                })
        })
        .collect()
}

/// Completed milestones with their proof
#[must_use]
pub fn proofs_submitted(campaigns: &[Campaign]) -> Vec<SubmittedProof> {
    campaigns
        .iter()
        .flat_map(|c| {
            c.milestones
                .iter()
                .filter(|m| m.status == MilestoneStatus::Completed)
                .filter_map(move |m| {
                    m.proof.as_ref().map(|proof| SubmittedProof {
                        campaign_name: c.name.clone(),
                        milestone_name: m.name.clone(),
                        proof: proof.clone(),
                        release_date: m.release_date,
                    })
                })
        })
        .collect()
}

/// Record proof of completion for an in-progress milestone.
pub async fn submit_proof(
    ctx: &AppContext,
    session: &Session,
    campaign_id: u64,
    milestone_id: u64,
    proof: &str,
) -> GiveResult<ProofReceipt> {
    session.require_role(Role::Charity, "submit milestone proof")?;
    let proof = proof.trim();
    if proof.is_empty() {
        return Err(ValidationError::MissingField("proof").into());
    }

    // Check before asking the ledger so a rejected proof leaves no transaction behind.
    let campaign = ctx.store.campaign(campaign_id)?;
    let mut preview = campaign
        .milestone(milestone_id)
        .cloned()
        .ok_or(hgive_core::NotFoundError::Milestone {
            campaign: campaign_id,
            milestone: milestone_id,
        })?;
    preview.attach_proof(proof)?;

    let transaction_id = ctx
        .ledger
        .issue_transaction_id(TxScope::MilestoneProof {
            campaign_id,
            milestone_id,
        })
        .await
        .into_string();
    let milestone = ctx
        .store
        .submit_milestone_proof(campaign_id, milestone_id, proof)?;

    info!(campaign_id, milestone_id, %transaction_id, "proof submitted");
    Ok(ProofReceipt {
        milestone,
        transaction_id,
    })
}

/// Move a milestone one step along its lifecycle.
pub fn advance_milestone(
    ctx: &AppContext,
    session: &Session,
    campaign_id: u64,
    milestone_id: u64,
    to: MilestoneStatus,
    today: NaiveDate,
) -> GiveResult<Milestone> {
    session.require_role(Role::Charity, "advance milestones")?;
    ctx.store.advance_milestone(campaign_id, milestone_id, to, today)
}

/// Validate a draft, register it with the ledger and store it.
///
/// A ledger account is issued when the draft does not name one.
pub async fn create_campaign(
    ctx: &AppContext,
    session: &Session,
    draft: &CampaignDraft,
) -> GiveResult<CampaignReceipt> {
    session.require_role(Role::Charity, "create campaigns")?;
    draft.validate()?;

    let supplied = draft
        .ledger_account
        .as_deref()
        .map(str::trim)
        .filter(|a| !a.is_empty());
    let account = match supplied {
        Some(_) => None,
        None => Some(ctx.ledger.issue_account().await),
    };

    let transaction_id = ctx
        .ledger
        .issue_transaction_id(TxScope::CampaignCreation {
            campaign_name: draft.name.trim().to_string(),
        })
        .await
        .into_string();
    let campaign = ctx.store.create_campaign(draft, &transaction_id)?;

    info!(
        campaign_id = campaign.id,
        account = supplied.or(account.as_ref().map(|a| a.account_id.as_str())),
        "campaign registered"
    );
    Ok(CampaignReceipt {
        campaign,
        transaction_id,
        account,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use hgive_core::{GiveError, MilestoneDraft, User};
    use hgive_test_utils::{date, TestDataDir};
    use pretty_assertions::assert_eq;

    fn setup() -> (TestDataDir, AppContext, Session) {
        let data = TestDataDir::new();
        let ctx = AppContext::open(data.config()).unwrap();
        let mut session = Session::new();
        session.login(User::new("Global Relief Foundation", Role::Charity), Role::Charity);
        (data, ctx, session)
    }

    fn draft() -> CampaignDraft {
        CampaignDraft {
            name: "Flood Recovery".to_string(),
            description: "Rebuilding homes after the floods".to_string(),
            goal: 1000.0,
            start_date: date("2025-06-01"),
            end_date: date("2025-12-01"),
            category: "Disaster Relief".to_string(),
            location: "Pakistan".to_string(),
            beneficiaries: 200,
            milestones: vec![
                MilestoneDraft::new("Assess", 300.0),
                MilestoneDraft::new("Rebuild", 300.0),
                MilestoneDraft::new("Handover", 400.0),
            ],
            ledger_account: None,
        }
    }

    #[test]
    fn overview_metrics() {
        let (_data, ctx, _session) = setup();
        let o = overview(&ctx);
        assert_eq!(o.total_raised, 36_000.0);
        assert_eq!(o.active_campaigns, 3);
        // "Anonymous" counts as one donor here
        assert_eq!(o.total_donors, 4);
        assert_eq!(o.average_donation, 1000.0 / 6.0);
    }

    #[test]
    fn donations_in_range_with_campaign_totals() {
        let (_data, ctx, session) = setup();
        let report = donations_between(&ctx, &session, date("2025-04-01"), date("2025-04-30")).unwrap();
        assert_eq!(report.count, 2);
        assert_eq!(report.total, 100.0);
        assert_eq!(report.by_campaign.get("Books for Every Child"), Some(&100.0));

        let empty = donations_between(&ctx, &session, date("2024-01-01"), date("2024-01-31")).unwrap();
        assert_eq!(empty.average, 0.0);

        assert!(matches!(
            donations_between(&ctx, &session, date("2025-05-01"), date("2025-04-01")),
            Err(GiveError::Validation(ValidationError::InvertedRange { .. }))
        ));
    }

    #[test]
    fn proof_queues() {
        let (_data, ctx, _session) = setup();
        let campaigns = ctx.store.campaigns();
        let needed = proofs_needed(&campaigns);
        assert_eq!(needed.len(), 1);
        assert_eq!((needed[0].campaign_id, needed[0].milestone_id), (1, 2));
        assert_eq!(proofs_submitted(&campaigns).len(), 4);
    }

    #[tokio::test]
    async fn proof_submission_goes_through_ledger() {
        let (_data, ctx, session) = setup();
        let receipt = submit_proof(&ctx, &session, 1, 2, "QmBuildPhotos").await.unwrap();
        assert_eq!(receipt.milestone.proof.as_deref(), Some("QmBuildPhotos"));
        let check = ctx.ledger.verify_transaction(&receipt.transaction_id).await;
        assert_eq!(check.memo, "Proof for milestone 2 of campaign 1");
        assert!(proofs_needed(&ctx.store.campaigns()).is_empty());

        assert!(matches!(
            submit_proof(&ctx, &session, 1, 2, "again").await,
            Err(GiveError::Validation(ValidationError::ProofAlreadySubmitted(2)))
        ));
        assert!(matches!(
            submit_proof(&ctx, &session, 1, 3, "early").await,
            Err(GiveError::Validation(ValidationError::ProofNotExpected { .. }))
        ));
    }

    #[tokio::test]
    async fn create_campaign_issues_account_when_missing() {
        let (_data, ctx, session) = setup();
        let receipt = create_campaign(&ctx, &session, &draft()).await.unwrap();
        assert_eq!(receipt.campaign.id, 5);
        assert!(receipt.account.unwrap().account_id.starts_with("0.0."));
        assert_eq!(receipt.campaign.transaction_id, receipt.transaction_id);

        let mut with_account = draft();
        with_account.ledger_account = Some("0.0.77777".to_string());
        let second = create_campaign(&ctx, &session, &with_account).await.unwrap();
        assert!(second.account.is_none());
        assert_eq!(second.campaign.id, 6);
    }

    #[tokio::test]
    async fn invalid_draft_and_donor_rejected() {
        let (_data, ctx, session) = setup();
        let mut bad = draft();
        bad.milestones[2].funds_required = 300.0;
        assert!(matches!(
            create_campaign(&ctx, &session, &bad).await,
            Err(GiveError::Validation(ValidationError::MilestoneSumMismatch { .. }))
        ));

        let mut donor = Session::new();
        donor.login(User::new("Alex", Role::Donor), Role::Donor);
        assert!(matches!(
            create_campaign(&ctx, &donor, &draft()).await,
            Err(GiveError::Unauthorized { .. })
        ));
        assert_eq!(ctx.store.campaigns().len(), 4);
    }

    #[test]
    fn milestone_advances_forward_only() {
        let (_data, ctx, session) = setup();
        let today = date("2025-05-01");
        let m = advance_milestone(&ctx, &session, 2, 1, MilestoneStatus::InProgress, today).unwrap();
        assert_eq!(m.status, MilestoneStatus::InProgress);
        assert!(matches!(
            advance_milestone(&ctx, &session, 2, 1, MilestoneStatus::Pending, today),
            Err(GiveError::Validation(ValidationError::IllegalTransition { .. }))
        ));
    }
}
