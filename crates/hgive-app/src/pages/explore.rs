//! Explore causes
//!
//! Filters apply in order: category, progress status, text search. The first
//! match is featured and the rest are listed after it.

use super::donate::{self, DonationReceipt, DonationRequest};
use super::{categories, milestone_rows, CampaignCard, MilestoneRow};
use crate::context::AppContext;
use crate::session::Session;
use chrono::NaiveDate;
use hgive_core::{aggregate_supporters, Campaign, Donation, GiveResult, Role, Supporter, ValidationError};
use serde::{Deserialize, Serialize};

/// Progress at or above which a cause is "near goal"
pub const NEAR_GOAL_PROGRESS: f64 = 0.75;
/// Days left at or below which a cause is "urgent"
pub const URGENT_DAYS: i64 = 14;
/// Days since start at or below which a cause is "recently started"
pub const RECENT_DAYS: i64 = 30;
/// Smallest custom amount accepted by the explore donation form
pub const CUSTOM_MINIMUM: f64 = 1.0;

const CARD_DESCRIPTION_CHARS: usize = 100;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressFilter {
    #[default]
    All,
    RecentlyStarted,
    NearGoal,
    UrgentNeed,
}

impl ProgressFilter {
    fn matches(self, campaign: &Campaign, today: NaiveDate) -> bool {
        match self {
            ProgressFilter::All => true,
            ProgressFilter::RecentlyStarted => {
                let since = (today - campaign.start_date).num_days();
                (0..=RECENT_DAYS).contains(&since)
            }
            ProgressFilter::NearGoal => campaign.progress() >= NEAR_GOAL_PROGRESS,
            ProgressFilter::UrgentNeed => (0..=URGENT_DAYS).contains(&campaign.days_left(today)),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExploreSort {
    /// Most supporters first
    #[default]
    MostPopular,
    /// Latest start date first
    MostRecent,
    MostFunded,
    LeastFunded,
}

impl ExploreSort {
    fn apply(self, campaigns: &mut [Campaign]) {
        match self {
            ExploreSort::MostPopular => campaigns.sort_by(|a, b| b.supporters.cmp(&a.supporters)),
            ExploreSort::MostRecent => campaigns.sort_by(|a, b| b.start_date.cmp(&a.start_date)),
            ExploreSort::MostFunded => campaigns.sort_by(|a, b| b.raised.total_cmp(&a.raised)),
            ExploreSort::LeastFunded => campaigns.sort_by(|a, b| a.raised.total_cmp(&b.raised)),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExploreQuery {
    /// Empty selects every category
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub progress: ProgressFilter,
    #[serde(default)]
    pub sort: ExploreSort,
    /// Case-insensitive match on name or description
    #[serde(default)]
    pub search: String,
}

impl ExploreQuery {
    pub fn search(text: impl Into<String>) -> Self {
        Self {
            search: text.into(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeaturedCause {
    #[serde(flatten)]
    pub card: CampaignCard,
    pub supporters: u32,
    pub days_left: i64,
    pub percent_complete: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExploreView {
    pub categories: Vec<String>,
    pub query: ExploreQuery,
    pub featured: Option<FeaturedCause>,
    pub causes: Vec<CampaignCard>,
    pub amounts: Vec<f64>,
}

/// Donation form amount
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DonationAmount {
    Ten,
    TwentyFive,
    #[default]
    Fifty,
    Hundred,
    Custom(f64),
}

impl DonationAmount {
    pub const PRESETS: [DonationAmount; 4] = [
        DonationAmount::Ten,
        DonationAmount::TwentyFive,
        DonationAmount::Fifty,
        DonationAmount::Hundred,
    ];

    #[must_use]
    pub fn value(self) -> f64 {
        match self {
            DonationAmount::Ten => 10.0,
            DonationAmount::TwentyFive => 25.0,
            DonationAmount::Fifty => 50.0,
            DonationAmount::Hundred => 100.0,
            DonationAmount::Custom(amount) => amount,
        }
    }
}

/// Everything shown in the details panel of one cause
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CauseDetails {
    #[serde(flatten)]
    pub card: CampaignCard,
    pub location: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub beneficiaries: u64,
    pub contract_id: String,
    pub milestones: Vec<MilestoneRow>,
    pub milestones_completed: usize,
    pub milestones_in_progress: usize,
    /// Named donors to this cause
    pub supporters: Vec<Supporter>,
    /// Newest first
    pub transactions: Vec<Donation>,
}

pub fn render(
    ctx: &AppContext,
    session: &Session,
    query: &ExploreQuery,
    today: NaiveDate,
) -> GiveResult<ExploreView> {
    session.require_role(Role::Donor, "explore causes")?;
    let all = ctx.store.campaigns();
    let needle = query.search.trim().to_lowercase();

    let mut matches: Vec<Campaign> = all
        .iter()
        .filter(|c| query.categories.is_empty() || query.categories.contains(&c.category))
        .filter(|c| query.progress.matches(c, today))
        .filter(|c| {
            needle.is_empty()
                || c.name.to_lowercase().contains(&needle)
                || c.description.to_lowercase().contains(&needle)
        })
        .cloned()
        .collect();
    query.sort.apply(&mut matches);

    let mut iter = matches.iter();
    let featured = iter.next().map(|c| FeaturedCause {
        card: CampaignCard::new(ctx, c),
        supporters: c.supporters,
        days_left: c.days_left(today),
        percent_complete: (c.progress() * 1000.0).round() / 10.0,
    });
    let causes = iter
        .map(|c| CampaignCard::new(ctx, c).truncated(c, CARD_DESCRIPTION_CHARS))
        .collect();

    Ok(ExploreView {
        categories: categories(&all),
        query: query.clone(),
        featured,
        causes,
        amounts: DonationAmount::PRESETS.iter().map(|a| a.value()).collect(),
    })
}

/// Open the details panel and select the cause for donation
pub fn details(ctx: &AppContext, session: &mut Session, campaign_id: u64) -> GiveResult<CauseDetails> {
    session.require_role(Role::Donor, "view cause details")?;
    let campaign = ctx.store.campaign(campaign_id)?;
    let mut transactions = ctx.store.donations_for_campaign(campaign_id);
    transactions.sort_by(|a, b| b.date.cmp(&a.date).then(b.id.cmp(&a.id)));
    let (completed, in_progress) = campaign.milestone_counts();

    session.select_campaign(Some(campaign_id));

    Ok(CauseDetails {
        card: CampaignCard::new(ctx, &campaign),
        location: campaign.location.clone(),
        start_date: campaign.start_date,
        end_date: campaign.end_date,
        beneficiaries: campaign.beneficiaries,
        contract_id: campaign.transaction_id.clone(),
        milestones: milestone_rows(&campaign),
        milestones_completed: completed,
        milestones_in_progress: in_progress,
        supporters: aggregate_supporters(&transactions),
        transactions,
    })
}

/// Donate to the cause selected in the session
pub async fn donate_selected(
    ctx: &AppContext,
    session: &mut Session,
    amount: DonationAmount,
    today: NaiveDate,
) -> GiveResult<DonationReceipt> {
    let campaign_id = session
        .selected_campaign()
        .ok_or(ValidationError::MissingField("selected cause"))?;
    let request = DonationRequest::new(campaign_id, amount.value());
    donate::donate(ctx, session, &request, CUSTOM_MINIMUM, today).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use hgive_core::{GiveError, User};
    use hgive_test_utils::{date, TestDataDir};

    fn setup() -> (TestDataDir, AppContext, Session) {
        let data = TestDataDir::new();
        let ctx = AppContext::open(data.config()).unwrap();
        let mut session = Session::new();
        session.login(User::new("Alex Johnson", Role::Donor), Role::Donor);
        (data, ctx, session)
    }

    fn ids(view: &ExploreView) -> Vec<u64> {
        view.featured
            .iter()
            .map(|f| f.card.id)
            .chain(view.causes.iter().map(|c| c.id))
            .collect()
    }

    #[test]
    fn default_query_sorts_by_popularity() {
        let (_data, ctx, session) = setup();
        let view = render(&ctx, &session, &ExploreQuery::default(), date("2025-04-01")).unwrap();
        assert_eq!(ids(&view), vec![1, 2, 3, 4]);
        assert_eq!(view.featured.as_ref().unwrap().percent_complete, 78.0);
    }

    #[test]
    fn search_matches_name_or_description() {
        let (_data, ctx, session) = setup();
        let today = date("2025-04-01");
        let by_name = render(&ctx, &session, &ExploreQuery::search("BOOKS"), today).unwrap();
        assert_eq!(ids(&by_name), vec![2]);
        let by_description = render(&ctx, &session, &ExploreQuery::search("native trees"), today).unwrap();
        assert_eq!(ids(&by_description), vec![4]);
        let none = render(&ctx, &session, &ExploreQuery::search("space"), today).unwrap();
        assert!(none.featured.is_none());
    }

    #[test]
    fn progress_filters() {
        let (_data, ctx, session) = setup();
        let today = date("2025-04-01");
        let query = |progress| ExploreQuery {
            progress,
            sort: ExploreSort::MostFunded,
            ..ExploreQuery::default()
        };

        let near = render(&ctx, &session, &query(ProgressFilter::NearGoal), today).unwrap();
        assert_eq!(ids(&near), vec![3, 4, 1]);
        let urgent = render(&ctx, &session, &query(ProgressFilter::UrgentNeed), today).unwrap();
        assert_eq!(ids(&urgent), vec![3]);
        let recent = render(&ctx, &session, &query(ProgressFilter::RecentlyStarted), date("2025-03-20")).unwrap();
        assert_eq!(ids(&recent), vec![2]);
    }

    #[test]
    fn category_filter_and_least_funded_sort() {
        let (_data, ctx, session) = setup();
        let query = ExploreQuery {
            categories: vec!["Water".to_string(), "Education".to_string()],
            sort: ExploreSort::LeastFunded,
            ..ExploreQuery::default()
        };
        let view = render(&ctx, &session, &query, date("2025-04-01")).unwrap();
        assert_eq!(ids(&view), vec![2, 1]);
    }

    #[test]
    fn details_select_cause_and_list_named_supporters() {
        let (_data, ctx, mut session) = setup();
        let details = details(&ctx, &mut session, 1).unwrap();

        assert_eq!(session.selected_campaign(), Some(1));
        assert_eq!(details.milestones_completed, 1);
        assert_eq!(details.milestones_in_progress, 1);
        assert_eq!(details.transactions.len(), 3);
        assert_eq!(details.supporters.len(), 2);
    }

    #[tokio::test]
    async fn donate_requires_selection() {
        let (_data, ctx, mut session) = setup();
        let today = date("2025-04-01");
        assert!(matches!(
            donate_selected(&ctx, &mut session, DonationAmount::Ten, today).await,
            Err(GiveError::Validation(ValidationError::MissingField(_)))
        ));

        details(&ctx, &mut session, 2).unwrap();
        let receipt = donate_selected(&ctx, &mut session, DonationAmount::Custom(1.5), today)
            .await
            .unwrap();
        assert_eq!(receipt.donation.campaign_id, 2);
        assert_eq!(receipt.badge.name, "Compassionate Heart");

        assert!(donate_selected(&ctx, &mut session, DonationAmount::Custom(0.5), today)
            .await
            .is_err());
    }
}
