//! Impact reports, open to any signed-in user.

use crate::context::AppContext;
use crate::session::Session;
use hgive_core::{Donation, GiveResult, ImpactMetrics};
use hgive_ledger::ReportVerification;
use serde::Serialize;
use tracing::info;
use ulid::Ulid;

/// Explorer used for transaction links in reports
pub const EXPLORER_URL: &str = "https://hashscan.io/testnet/transaction/";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CampaignOption {
    pub id: u64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImpactReport {
    pub campaign_id: u64,
    pub campaign_name: String,
    pub metrics: ImpactMetrics,
    /// Donations to the campaign, newest first
    pub transactions: Vec<Donation>,
    pub explorer_url: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImpactView {
    pub campaigns: Vec<CampaignOption>,
    pub selected: Option<u64>,
    /// `None` when there are no campaigns
    pub report: Option<ImpactReport>,
}

/// Render the report for `selected`, or the first campaign.
pub fn render(ctx: &AppContext, session: &Session, selected: Option<u64>) -> GiveResult<ImpactView> {
    session.require_login()?;

    let campaigns: Vec<CampaignOption> = ctx
        .store
        .campaigns()
        .into_iter()
        .map(|c| CampaignOption { id: c.id, name: c.name })
        .collect();

    let selected = selected.or_else(|| campaigns.first().map(|c| c.id));
    let report = selected.map(|id| report(ctx, id)).transpose()?;

    Ok(ImpactView {
        campaigns,
        selected,
        report,
    })
}

fn report(ctx: &AppContext, campaign_id: u64) -> GiveResult<ImpactReport> {
    let campaign = ctx.store.campaign(campaign_id)?;
    let metrics = ctx.store.impact_metrics(campaign_id)?;
    let mut transactions = ctx.store.donations_for_campaign(campaign_id);
    transactions.sort_by(|a, b| b.date.cmp(&a.date).then(b.id.cmp(&a.id)));

    Ok(ImpactReport {
        campaign_id,
        campaign_name: campaign.name,
        metrics,
        transactions,
        explorer_url: EXPLORER_URL,
    })
}

/// Generate a report id and anchor it on the ledger
pub async fn verify_report(
    ctx: &AppContext,
    session: &Session,
    campaign_id: u64,
) -> GiveResult<ReportVerification> {
    session.require_login()?;
    ctx.store.campaign(campaign_id)?;

    let report_id = Ulid::new().to_string();
    let receipt = ctx.ledger.verify_report(campaign_id, &report_id).await;
    info!(campaign_id, %report_id, success = receipt.success, "impact report verified");
    Ok(receipt)
}

#[cfg(test)]
mod tests {
    use super::*;
    use hgive_core::{GiveError, NotFoundError, Role, User};
    use hgive_test_utils::TestDataDir;
    use pretty_assertions::assert_eq;

    fn signed_in(role: Role) -> Session {
        let mut session = Session::new();
        session.login(User::new("Someone", role), role);
        session
    }

    #[test]
    fn defaults_to_first_campaign_and_generates_metrics() {
        let data = TestDataDir::new();
        let ctx = AppContext::open(data.config()).unwrap();
        let view = render(&ctx, &signed_in(Role::Donor), None).unwrap();

        assert_eq!(view.selected, Some(1));
        let report = view.report.unwrap();
        assert_eq!(report.metrics.total_funds_received, 7_800.0);
        assert_eq!(report.transactions.len(), 3);
        assert!(data.path().join("impact_metrics.json").exists());
    }

    #[test]
    fn charity_sees_selected_campaign() {
        let data = TestDataDir::new();
        let ctx = AppContext::open(data.config()).unwrap();
        let view = render(&ctx, &signed_in(Role::Charity), Some(3)).unwrap();
        assert_eq!(view.report.unwrap().campaign_name, "Mobile Health Clinics");
    }

    #[test]
    fn requires_login_and_known_campaign() {
        let data = TestDataDir::new();
        let ctx = AppContext::open(data.config()).unwrap();
        assert!(matches!(
            render(&ctx, &Session::new(), None),
            Err(GiveError::NotLoggedIn)
        ));
        assert!(matches!(
            render(&ctx, &signed_in(Role::Donor), Some(99)),
            Err(GiveError::NotFound(NotFoundError::Campaign(99)))
        ));
    }

    #[test]
    fn empty_store_has_no_report() {
        let data = TestDataDir::with(vec![], vec![]);
        let ctx = AppContext::open(data.config()).unwrap();
        let view = render(&ctx, &signed_in(Role::Donor), None).unwrap();
        assert!(view.campaigns.is_empty());
        assert!(view.report.is_none());
    }

    #[tokio::test]
    async fn report_verification_has_fresh_ids() {
        let data = TestDataDir::new();
        let ctx = AppContext::open(data.config()).unwrap();
        let session = signed_in(Role::Charity);

        let a = verify_report(&ctx, &session, 1).await.unwrap();
        let b = verify_report(&ctx, &session, 1).await.unwrap();
        assert!(a.success);
        assert_ne!(a.report_id, b.report_id);
    }
}
