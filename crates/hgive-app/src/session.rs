//! Per-viewer session state
//!
//! A session is always in exactly one of three states:
//!
//! ```text
//! Anonymous ──login(user, donor)──▶ Authenticated(donor)
//!     ▲      ──login(user, charity)─▶ Authenticated(charity)
//!     └────────────logout()──────────────┘
//! ```
//!
//! `login` overwrites whatever was there before. The session also carries
//! the navigation selection so the router can re-render after an action.

use crate::router::Page;
use hgive_core::{GiveError, GiveResult, Role, User, UserUpdate};
use tracing::{debug, info};

/// Identity half of the session
#[derive(Debug, Clone, PartialEq, Default)]
pub enum SessionState {
    #[default]
    Anonymous,
    Authenticated { user: User, role: Role },
}

/// One viewer's session
#[derive(Debug, Clone, Default)]
pub struct Session {
    state: SessionState,
    page: Page,
    selected_campaign: Option<u64>,
}

impl Session {
    /// Anonymous session on the home page
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Authenticate as `user` with `role`, replacing any prior session.
    pub fn login(&mut self, mut user: User, role: Role) {
        user.role = role;
        info!(user = %user.identity(), %role, "session login");
        self.state = SessionState::Authenticated { user, role };
        self.page = Page::Home;
        self.selected_campaign = None;
    }

    /// Drop identity, role and selection.
    pub fn logout(&mut self) {
        if let SessionState::Authenticated { user, .. } = &self.state {
            info!(user = %user.identity(), "session logout");
        }
        *self = Self::default();
    }

    #[inline]
    #[must_use]
    pub fn is_logged_in(&self) -> bool {
        matches!(self.state, SessionState::Authenticated { .. })
    }

    #[inline]
    #[must_use]
    pub fn current_role(&self) -> Option<Role> {
        match &self.state {
            SessionState::Authenticated { role, .. } => Some(*role),
            SessionState::Anonymous => None,
        }
    }

    /// Current identity, if authenticated
    #[inline]
    #[must_use]
    pub fn user(&self) -> Option<&User> {
        match &self.state {
            SessionState::Authenticated { user, .. } => Some(user),
            SessionState::Anonymous => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Mutate one attribute of the current identity.
    ///
    /// Fails with [`GiveError::NotLoggedIn`] on an anonymous session.
    pub fn update_field(&mut self, update: UserUpdate) -> GiveResult<()> {
        match &mut self.state {
            SessionState::Authenticated { user, .. } => {
                debug!(?update, "session field updated");
                user.apply(update);
                Ok(())
            }
            SessionState::Anonymous => Err(GiveError::NotLoggedIn),
        }
    }

    /// The identity, provided it holds `role`.
    ///
    /// `NotLoggedIn` when anonymous, `Unauthorized` on a role mismatch.
    pub fn require_role(&self, role: Role, action: &str) -> GiveResult<&User> {
        match &self.state {
            SessionState::Authenticated { user, role: held } if *held == role => Ok(user),
            SessionState::Authenticated { role: held, .. } => {
                Err(GiveError::unauthorized(action, Some(*held)))
            }
            SessionState::Anonymous => Err(GiveError::NotLoggedIn),
        }
    }

    /// The identity, whatever its role
    pub fn require_login(&self) -> GiveResult<&User> {
        self.user().ok_or(GiveError::NotLoggedIn)
    }

    /// Page currently selected
    #[inline]
    #[must_use]
    pub fn page(&self) -> Page {
        self.page
    }

    /// Record the page selection. Authorization is the router's job.
    pub(crate) fn set_page(&mut self, page: Page) {
        self.page = page;
    }

    #[inline]
    #[must_use]
    pub fn selected_campaign(&self) -> Option<u64> {
        self.selected_campaign
    }

    pub fn select_campaign(&mut self, campaign_id: Option<u64>) {
        self.selected_campaign = campaign_id;
    }
}
