//! The donation action shared by the dashboard and the explore page.
//!
//! ```text
//! donor check → amount check → campaign open? → ledger id → store append → session total + badge
//! ```
//!
//! The ledger is only asked for an id once the request is known to be
//! acceptable, and the session is only touched after the store commit.

use crate::context::AppContext;
use crate::session::Session;
use chrono::NaiveDate;
use hgive_core::validation::validate_amount;
use hgive_core::{
    Badge, Donation, GiveResult, NewDonation, Role, UserUpdate, ValidationError,
};
use hgive_ledger::TxScope;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Donation form submission
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DonationRequest {
    pub campaign_id: u64,
    pub amount: f64,
    #[serde(default)]
    pub anonymous: bool,
}

impl DonationRequest {
    pub fn new(campaign_id: u64, amount: f64) -> Self {
        Self {
            campaign_id,
            amount,
            anonymous: false,
        }
    }

    #[must_use]
    pub fn anonymously(mut self) -> Self {
        self.anonymous = true;
        self
    }
}

/// What the donor sees after a successful donation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DonationReceipt {
    pub donation: Donation,
    pub campaign_name: String,
    pub badge: Badge,
    /// Whether `badge` was new to the donor
    pub badge_awarded: bool,
    pub total_donated: f64,
}

/// Record a donation from the session's donor.
///
/// `minimum` is the smallest amount the calling page accepts.
pub async fn donate(
    ctx: &AppContext,
    session: &mut Session,
    request: &DonationRequest,
    minimum: f64,
    today: NaiveDate,
) -> GiveResult<DonationReceipt> {
    let donor = session.require_role(Role::Donor, "donate")?.clone();
    validate_amount("donation amount", request.amount, minimum)?;

    let campaign = ctx.store.campaign(request.campaign_id)?;
    if !campaign.is_active() {
        return Err(ValidationError::CampaignClosed(campaign.id).into());
    }

    let transaction_id = ctx
        .ledger
        .issue_transaction_id(TxScope::Donation {
            campaign_id: campaign.id,
        })
        .await;

    let donation = ctx.store.append_donation(NewDonation::new(
        &donor.name,
        request.anonymous,
        request.amount,
        campaign.id,
        transaction_id,
        today,
    ))?;

    let total_donated = donor.total_donated.unwrap_or(0.0) + request.amount;
    session.update_field(UserUpdate::TotalDonated(total_donated))?;

    let badge = Badge::for_amount(request.amount);
    let badge_awarded = !donor.has_badge(&badge.name);
    if badge_awarded {
        let mut badges = donor.badges.clone();
        badges.push(badge.clone());
        session.update_field(UserUpdate::Badges(badges))?;
    }

    info!(
        donor = %donor.identity(),
        campaign_id = campaign.id,
        amount = request.amount,
        anonymous = request.anonymous,
        badge_awarded,
        "donation completed"
    );

    Ok(DonationReceipt {
        donation,
        campaign_name: campaign.name,
        badge,
        badge_awarded,
        total_donated,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use hgive_core::{GiveError, NotFoundError, User};
    use hgive_test_utils::{date, TestDataDir};

    fn donor_session() -> Session {
        let mut session = Session::new();
        session.login(User::new("Alex Johnson", Role::Donor), Role::Donor);
        session
    }

    #[tokio::test]
    async fn donation_updates_store_and_session() {
        let data = TestDataDir::new();
        let ctx = AppContext::open(data.config()).unwrap();
        let mut session = donor_session();
        let before = ctx.store.campaign(2).unwrap().raised;

        let receipt = donate(&ctx, &mut session, &DonationRequest::new(2, 120.0), 5.0, date("2025-05-01"))
            .await
            .unwrap();

        assert_eq!(ctx.store.campaign(2).unwrap().raised, before + 120.0);
        assert_eq!(receipt.badge.name, "Generous Supporter");
        assert!(receipt.badge_awarded);
        let user = session.user().unwrap();
        assert_eq!(user.total_donated, Some(120.0));
        assert_eq!(user.badges.len(), 1);
        assert!(ctx.ledger.verify_transaction(&receipt.donation.transaction_id).await.valid);
    }

    #[tokio::test]
    async fn repeated_tier_does_not_duplicate_badge() {
        let data = TestDataDir::new();
        let ctx = AppContext::open(data.config()).unwrap();
        let mut session = donor_session();
        let today = date("2025-05-01");

        donate(&ctx, &mut session, &DonationRequest::new(1, 10.0), 5.0, today).await.unwrap();
        let second = donate(&ctx, &mut session, &DonationRequest::new(1, 20.0), 5.0, today)
            .await
            .unwrap();

        assert!(!second.badge_awarded);
        assert_eq!(session.user().unwrap().badges.len(), 1);
        assert_eq!(second.total_donated, 30.0);
    }

    #[tokio::test]
    async fn anonymous_gift_recorded_without_name() {
        let data = TestDataDir::new();
        let ctx = AppContext::open(data.config()).unwrap();
        let mut session = donor_session();

        let receipt = donate(
            &ctx,
            &mut session,
            &DonationRequest::new(1, 25.0).anonymously(),
            5.0,
            date("2025-05-01"),
        )
        .await
        .unwrap();
        assert_eq!(receipt.donation.donor, "Anonymous");
        assert!(ctx.store.supporters().iter().all(|s| s.donor != "Anonymous"));
    }

    #[tokio::test]
    async fn rejected_requests_leave_store_untouched() {
        let data = TestDataDir::new();
        let ctx = AppContext::open(data.config()).unwrap();
        let today = date("2025-05-01");
        let count = ctx.store.donations().len();

        let mut anonymous = Session::new();
        assert!(matches!(
            donate(&ctx, &mut anonymous, &DonationRequest::new(1, 10.0), 5.0, today).await,
            Err(GiveError::NotLoggedIn)
        ));

        let mut session = donor_session();
        assert!(matches!(
            donate(&ctx, &mut session, &DonationRequest::new(1, 4.0), 5.0, today).await,
            Err(GiveError::Validation(ValidationError::AmountBelowMinimum { .. }))
        ));
        assert!(matches!(
            donate(&ctx, &mut session, &DonationRequest::new(99, 10.0), 5.0, today).await,
            Err(GiveError::NotFound(NotFoundError::Campaign(99)))
        ));
        // campaign 4 is completed in the sample data
        assert!(matches!(
            donate(&ctx, &mut session, &DonationRequest::new(4, 10.0), 5.0, today).await,
            Err(GiveError::Validation(ValidationError::CampaignClosed(4)))
        ));

        assert_eq!(ctx.store.donations().len(), count);
        assert_eq!(session.user().unwrap().total_donated, Some(0.0));
    }
}
