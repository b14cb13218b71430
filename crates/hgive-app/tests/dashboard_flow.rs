//! End-to-end checks of the dashboard through its public API.
//!
//! Guarantees exercised here:
//! - Pages outside the session's role are denied and never rendered.
//! - A donation raises the owning campaign by exactly its amount and the
//!   transaction it records verifies on the ledger.
//! - Logging out clears the identity and sends the viewer back home.
//! - Charity actions (proof, campaign creation) survive a reopen of the
//!   data directory.

use hgive_app::pages::donate::DonationRequest;
use hgive_app::pages::{charity, donor, explore, login};
use hgive_app::{AppContext, Outcome, Page, Router, Session, View};
use hgive_core::{CampaignDraft, GiveError, MilestoneDraft, MilestoneStatus, ValidationError};
use hgive_test_utils::{campaign, date, TestDataDir};
use pretty_assertions::assert_eq;
use std::sync::Arc;

fn router(data: &TestDataDir) -> Router {
    Router::new(Arc::new(AppContext::open(data.config()).unwrap()))
}

/// Anonymous viewers asking for charity management get a warning, not the page.
#[test]
fn anonymous_charity_request_is_denied() {
    let data = TestDataDir::new();
    let router = router(&data);
    let mut session = Session::new();
    let today = date("2025-04-01");

    let outcome = router
        .navigate(&mut session, Page::CharityManagement, today)
        .unwrap();
    assert!(!outcome.is_rendered());
    assert!(matches!(outcome, Outcome::Denied { page: Page::CharityManagement, .. }));
    assert_eq!(session.page(), Page::Home);

    for page in Page::ALL {
        let outcome = router.render(&session, page, today).unwrap();
        assert_eq!(
            outcome.is_rendered(),
            matches!(page, Page::Home | Page::Login),
            "{page}"
        );
    }
}

/// Donor and charity sessions see exactly their own page sets.
#[test]
fn role_page_sets() {
    let data = TestDataDir::new();
    let router = router(&data);
    let ctx = router.context();
    let today = date("2025-04-01");

    let mut donor = Session::new();
    login::email_login(ctx, &mut donor, "donor@example.com", "password123").unwrap();
    let mut charity = Session::new();
    login::email_login(ctx, &mut charity, "charity@example.com", "password123").unwrap();

    let rendered = |session: &Session| -> Vec<Page> {
        Page::ALL
            .into_iter()
            .filter(|p| router.render(session, *p, today).unwrap().is_rendered())
            .collect()
    };
    assert_eq!(
        rendered(&donor),
        vec![Page::Home, Page::DonorDashboard, Page::ExploreCauses, Page::ImpactReports]
    );
    assert_eq!(
        rendered(&charity),
        vec![Page::Home, Page::CharityManagement, Page::ImpactReports]
    );
}

/// Campaign {goal 1000, raised 200} plus a donation of 50 ends at 250.
#[tokio::test]
async fn donation_raises_campaign_and_verifies() {
    let data = TestDataDir::with(vec![campaign(1, 1000.0, 200.0)], vec![]);
    let router = router(&data);
    let ctx = router.context();
    let mut session = Session::new();
    login::email_login(ctx, &mut session, "donor@example.com", "password123").unwrap();

    let receipt = donor::donate(ctx, &mut session, &DonationRequest::new(1, 50.0), date("2025-04-01"))
        .await
        .unwrap();
    assert_eq!(ctx.store.campaign(1).unwrap().raised, 250.0);

    let check = donor::verify(ctx, &session, &receipt.donation.transaction_id)
        .await
        .unwrap();
    assert!(check.valid);
    assert_eq!(check.memo, "Donation to campaign 1");

    // The store on disk agrees after a reopen.
    let reopened = AppContext::open(data.config()).unwrap();
    assert_eq!(reopened.store.campaign(1).unwrap().raised, 250.0);
    assert_eq!(reopened.store.donations().len(), 1);
}

/// Login then logout leaves an anonymous session on the home page.
#[test]
fn logout_clears_identity() {
    let data = TestDataDir::new();
    let router = router(&data);
    let mut session = Session::new();
    let today = date("2025-04-01");

    login::wallet_login(router.context(), &mut session, "0.0.12345").unwrap();
    router.navigate(&mut session, Page::ExploreCauses, today).unwrap();
    assert_eq!(session.page(), Page::ExploreCauses);

    session.logout();
    assert!(!session.is_logged_in());
    assert_eq!(session.current_role(), None);

    let outcome = router.refresh(&mut session, today).unwrap();
    assert!(matches!(outcome.view(), Some(View::Home(_))));
    assert_eq!(session.page(), Page::Home);
}

/// Explore details select a cause, and a preset donation lands on it.
#[tokio::test]
async fn explore_details_then_give() {
    let data = TestDataDir::new();
    let router = router(&data);
    let ctx = router.context();
    let mut session = Session::new();
    login::email_login(ctx, &mut session, "donor@example.com", "password123").unwrap();

    let before = ctx.store.campaign(2).unwrap().raised;
    explore::details(ctx, &mut session, 2).unwrap();
    explore::donate_selected(ctx, &mut session, explore::DonationAmount::TwentyFive, date("2025-04-01"))
        .await
        .unwrap();
    assert_eq!(ctx.store.campaign(2).unwrap().raised, before + 25.0);
}

fn draft(milestones: [f64; 3]) -> CampaignDraft {
    CampaignDraft {
        name: "School Meals".to_string(),
        description: "Daily meals for primary pupils".to_string(),
        goal: 1000.0,
        start_date: date("2025-05-01"),
        end_date: date("2025-11-01"),
        category: "Education".to_string(),
        location: "Malawi".to_string(),
        beneficiaries: 400,
        milestones: milestones
            .iter()
            .enumerate()
            .map(|(i, f)| MilestoneDraft::new(format!("Phase {}", i + 1), *f))
            .collect(),
        ledger_account: Some("0.0.67890".to_string()),
    }
}

/// Milestones {300,300,400} against a goal of 1000 pass; {300,300,300} fail.
#[tokio::test]
async fn campaign_creation_checks_milestone_sum() {
    let data = TestDataDir::new();
    let router = router(&data);
    let ctx = router.context();
    let mut session = Session::new();
    login::email_login(ctx, &mut session, "charity@example.com", "password123").unwrap();

    let err = charity::create_campaign(ctx, &session, &draft([300.0, 300.0, 300.0]))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        GiveError::Validation(ValidationError::MilestoneSumMismatch { .. })
    ));

    let receipt = charity::create_campaign(ctx, &session, &draft([300.0, 300.0, 400.0]))
        .await
        .unwrap();
    assert!(receipt.account.is_none());
    assert!(ctx.ledger.verify_transaction(&receipt.transaction_id).await.valid);

    let reopened = AppContext::open(data.config()).unwrap();
    let stored = reopened.store.campaign(receipt.campaign.id).unwrap();
    assert_eq!(stored.name, "School Meals");
    assert_eq!(stored.raised, 0.0);
    assert!(stored.milestones.iter().all(|m| m.status == MilestoneStatus::Pending));
}

/// A milestone walks forward through its lifecycle and accepts one proof.
#[tokio::test]
async fn milestone_lifecycle_with_proof() {
    let data = TestDataDir::new();
    let router = router(&data);
    let ctx = router.context();
    let mut session = Session::new();
    login::email_login(ctx, &mut session, "charity@example.com", "password123").unwrap();
    let today = date("2025-05-01");

    charity::advance_milestone(ctx, &session, 2, 1, MilestoneStatus::InProgress, today).unwrap();
    let receipt = charity::submit_proof(ctx, &session, 2, 1, "QmLibraryPhotos").await.unwrap();
    assert_eq!(receipt.milestone.proof.as_deref(), Some("QmLibraryPhotos"));

    let done = charity::advance_milestone(ctx, &session, 2, 1, MilestoneStatus::Completed, today).unwrap();
    assert_eq!(done.release_date, Some(today));
    assert!(charity::advance_milestone(ctx, &session, 2, 1, MilestoneStatus::InProgress, today).is_err());

    let view = router.render(&session, Page::CharityManagement, today).unwrap();
    let Some(View::CharityManagement(view)) = view.view() else {
        panic!("charity page not rendered");
    };
    assert!(view
        .proofs_submitted
        .iter()
        .any(|p| p.proof == "QmLibraryPhotos" && p.release_date == Some(today)));
}
