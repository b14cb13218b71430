//! Role-gated page routing
//!
//! ```text
//! anonymous → Home, Login
//! donor     → Home, DonorDashboard, ExploreCauses, ImpactReports
//! charity   → Home, CharityManagement, ImpactReports
//! ```
//!
//! A request for a page outside the session's set never renders: it
//! degrades to [`Outcome::Denied`] with a warning and the selection stays
//! where it was.

use crate::context::AppContext;
use crate::pages::{charity, donor, explore, home, impact, login};
use crate::session::Session;
use chrono::NaiveDate;
use hgive_core::{GiveError, GiveResult, LeaderboardSort, Role};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, warn};

/// Navigable pages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Page {
    #[default]
    Home,
    Login,
    DonorDashboard,
    ExploreCauses,
    CharityManagement,
    ImpactReports,
}

const ANONYMOUS_PAGES: &[Page] = &[Page::Home, Page::Login];
const DONOR_PAGES: &[Page] = &[
    Page::Home,
    Page::DonorDashboard,
    Page::ExploreCauses,
    Page::ImpactReports,
];
const CHARITY_PAGES: &[Page] = &[Page::Home, Page::CharityManagement, Page::ImpactReports];

impl Page {
    pub const ALL: [Page; 6] = [
        Page::Home,
        Page::Login,
        Page::DonorDashboard,
        Page::ExploreCauses,
        Page::CharityManagement,
        Page::ImpactReports,
    ];

    /// Navigation label
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Page::Home => "Home",
            Page::Login => "Login",
            Page::DonorDashboard => "My Dashboard",
            Page::ExploreCauses => "Explore Causes",
            Page::CharityManagement => "Charity Management",
            Page::ImpactReports => "Impact Reports",
        }
    }

    fn slug(&self) -> &'static str {
        match self {
            Page::Home => "home",
            Page::Login => "login",
            Page::DonorDashboard => "donor_dashboard",
            Page::ExploreCauses => "explore_causes",
            Page::CharityManagement => "charity_management",
            Page::ImpactReports => "impact_reports",
        }
    }
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Unrecognized page name
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown page '{0}'")]
pub struct UnknownPage(pub String);

impl FromStr for Page {
    type Err = UnknownPage;

    /// Accepts the label ("My Dashboard") or the snake-case name
    /// ("donor_dashboard"), case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Page::ALL
            .into_iter()
            .find(|p| p.label().eq_ignore_ascii_case(wanted) || p.slug().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| UnknownPage(wanted.to_string()))
    }
}

/// Pages offered to a session holding `role`
#[must_use]
pub fn nav_options(role: Option<Role>) -> &'static [Page] {
    match role {
        None => ANONYMOUS_PAGES,
        Some(Role::Donor) => DONOR_PAGES,
        Some(Role::Charity) => CHARITY_PAGES,
    }
}

/// Check that the session may open `page`
pub fn authorize(session: &Session, page: Page) -> GiveResult<()> {
    let role = session.current_role();
    if nav_options(role).contains(&page) {
        Ok(())
    } else {
        Err(GiveError::unauthorized(format!("page {}", page.label()), role))
    }
}

/// Rendered page content
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "page", content = "view", rename_all = "snake_case")]
pub enum View {
    Home(home::HomeView),
    Login(login::LoginView),
    DonorDashboard(Box<donor::DonorDashboardView>),
    ExploreCauses(explore::ExploreView),
    CharityManagement(Box<charity::CharityView>),
    ImpactReports(Box<impact::ImpactView>),
}

/// Result of a routing request
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    Rendered {
        #[serde(flatten)]
        view: View,
        nav: Vec<Page>,
    },
    Denied {
        page: Page,
        warning: String,
    },
}

impl Outcome {
    #[inline]
    #[must_use]
    pub fn is_rendered(&self) -> bool {
        matches!(self, Outcome::Rendered { .. })
    }

    /// The view, when rendered
    #[must_use]
    pub fn view(&self) -> Option<&View> {
        match self {
            Outcome::Rendered { view, .. } => Some(view),
            Outcome::Denied { .. } => None,
        }
    }
}

/// Maps (selection, role) to a page controller
#[derive(Debug, Clone)]
pub struct Router {
    ctx: Arc<AppContext>,
}

impl Router {
    pub fn new(ctx: Arc<AppContext>) -> Self {
        Self { ctx }
    }

    #[inline]
    #[must_use]
    pub fn context(&self) -> &Arc<AppContext> {
        &self.ctx
    }

    /// Select `page` and render it.
    ///
    /// On denial the session's selection is left unchanged.
    pub fn navigate(&self, session: &mut Session, page: Page, today: NaiveDate) -> GiveResult<Outcome> {
        let outcome = self.render(session, page, today)?;
        if outcome.is_rendered() {
            session.set_page(page);
        }
        Ok(outcome)
    }

    /// Re-render the session's current selection.
    ///
    /// A selection that is no longer allowed (e.g. after logout) falls back
    /// to Home.
    pub fn refresh(&self, session: &mut Session, today: NaiveDate) -> GiveResult<Outcome> {
        let page = session.page();
        if authorize(session, page).is_err() {
            debug!(%page, "selection no longer allowed, returning home");
            session.set_page(Page::Home);
        }
        self.render(session, session.page(), today)
    }

    /// Authorize and render `page` without changing the selection.
    pub fn render(&self, session: &Session, page: Page, today: NaiveDate) -> GiveResult<Outcome> {
        if let Err(e) = authorize(session, page) {
            warn!(%page, role = ?session.current_role(), "page request denied");
            return Ok(Outcome::Denied {
                page,
                warning: e.to_string(),
            });
        }

        let ctx = &self.ctx;
        let view = match page {
            Page::Home => View::Home(home::render(ctx, session)),
            Page::Login => View::Login(login::render(session)),
            Page::DonorDashboard => View::DonorDashboard(Box::new(donor::render(
                ctx,
                session,
                &donor::CampaignFilter::default(),
                LeaderboardSort::default(),
                today,
            )?)),
            Page::ExploreCauses => View::ExploreCauses(explore::render(
                ctx,
                session,
                &explore::ExploreQuery::default(),
                today,
            )?),
            Page::CharityManagement => {
                View::CharityManagement(Box::new(charity::render(ctx, session, today)?))
            }
            Page::ImpactReports => View::ImpactReports(Box::new(impact::render(
                ctx,
                session,
                session.selected_campaign(),
            )?)),
        };
        debug!(%page, "page rendered");

        Ok(Outcome::Rendered {
            view,
            nav: nav_options(session.current_role()).to_vec(),
        })
    }
}
