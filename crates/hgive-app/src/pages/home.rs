//! Home page: featured campaigns and platform statistics.

use super::CampaignCard;
use crate::context::AppContext;
use crate::session::Session;
use hgive_core::CampaignStatus;
use serde::Serialize;
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlatformStats {
    pub total_raised: f64,
    pub active_campaigns: usize,
    pub completed_campaigns: usize,
    /// Distinct named donors; anonymous gifts are not counted
    pub donors: usize,
    pub donations: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HomeView {
    pub featured: Vec<CampaignCard>,
    pub stats: PlatformStats,
    /// Anonymous visitors get the join prompt
    pub show_join: bool,
    pub welcome: Option<String>,
}

pub fn render(ctx: &AppContext, session: &Session) -> HomeView {
    let campaigns = ctx.store.campaigns();
    let donations = ctx.store.donations();

    let featured = campaigns
        .iter()
        .take(ctx.config.featured_count)
        .map(|c| CampaignCard::new(ctx, c))
        .collect();

    let stats = PlatformStats {
        total_raised: campaigns.iter().map(|c| c.raised).sum(),
        active_campaigns: campaigns.iter().filter(|c| c.is_active()).count(),
        completed_campaigns: campaigns
            .iter()
            .filter(|c| c.status == CampaignStatus::Completed)
            .count(),
        donors: donations
            .iter()
            .filter(|d| !d.is_anonymous())
            .map(|d| d.donor.as_str())
            .collect::<HashSet<_>>()
            .len(),
        donations: donations.len(),
    };

    HomeView {
        featured,
        stats,
        show_join: !session.is_logged_in(),
        welcome: session.user().map(|u| format!("Welcome, {}", u.name)),
    }
}
