//! Viewer identities
//!
//! A `User` lives only as long as a session: it is built from the mock
//! account table at login or from a signup form, mutated by donation actions
//! and dropped on logout.

use crate::error::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Account role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Gives to campaigns
    Donor,
    /// Runs campaigns
    Charity,
}

impl Role {
    /// Lowercase wire name
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Donor => "donor",
            Role::Charity => "charity",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "donor" => Ok(Role::Donor),
            "charity" => Ok(Role::Charity),
            other => Err(ValidationError::UnknownRole(other.to_string())),
        }
    }
}

/// Achievement earned by donating
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Badge {
    pub name: String,
    pub emoji: String,
}

impl Badge {
    /// Create a badge
    #[inline]
    pub fn new(name: impl Into<String>, emoji: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            emoji: emoji.into(),
        }
    }

    /// Badge awarded for a single donation of `amount`
    #[must_use]
    pub fn for_amount(amount: f64) -> Self {
        if amount >= 100.0 {
            Self::new("Generous Supporter", "🌟")
        } else if amount >= 50.0 {
            Self::new("Dedicated Giver", "🎖️")
        } else {
            Self::new("Compassionate Heart", "💖")
        }
    }
}

/// Session identity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// Login email, absent for wallet-only accounts
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Display name
    pub name: String,
    /// Account role
    #[serde(rename = "type")]
    pub role: Role,
    /// Linked ledger account
    #[serde(default)]
    pub wallet_id: Option<String>,
    /// Lifetime giving (donors)
    #[serde(default)]
    pub total_donated: Option<f64>,
    /// Lifetime receipts (charities)
    #[serde(default)]
    pub total_received: Option<f64>,
    /// Earned badges in acquisition order (donors)
    #[serde(default)]
    pub badges: Vec<Badge>,
    /// Supported causes (charities)
    #[serde(default)]
    pub causes: Vec<String>,
}

impl User {
    /// Fresh account with zeroed totals for its role
    pub fn new(name: impl Into<String>, role: Role) -> Self {
        Self {
            email: None,
            name: name.into(),
            role,
            wallet_id: None,
            total_donated: (role == Role::Donor).then_some(0.0),
            total_received: (role == Role::Charity).then_some(0.0),
            badges: Vec::new(),
            causes: Vec::new(),
        }
    }

    /// With email
    #[inline]
    #[must_use]
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// With wallet id
    #[inline]
    #[must_use]
    pub fn with_wallet(mut self, wallet_id: impl Into<String>) -> Self {
        self.wallet_id = Some(wallet_id.into());
        self
    }

    /// Email if present, otherwise the wallet id, otherwise the name
    #[must_use]
    pub fn identity(&self) -> &str {
        self.email
            .as_deref()
            .or(self.wallet_id.as_deref())
            .unwrap_or(&self.name)
    }

    /// Whether the badge name is already held
    #[must_use]
    pub fn has_badge(&self, name: &str) -> bool {
        self.badges.iter().any(|b| b.name == name)
    }

    /// Apply a single-field update
    pub fn apply(&mut self, update: UserUpdate) {
        match update {
            UserUpdate::Name(name) => self.name = name,
            UserUpdate::WalletId(wallet) => self.wallet_id = wallet,
            UserUpdate::TotalDonated(total) => self.total_donated = Some(total),
            UserUpdate::TotalReceived(total) => self.total_received = Some(total),
            UserUpdate::Badges(badges) => self.badges = badges,
            UserUpdate::Causes(causes) => self.causes = causes,
        }
    }
}

/// Single-attribute mutation of the session identity
#[derive(Debug, Clone, PartialEq)]
pub enum UserUpdate {
    Name(String),
    WalletId(Option<String>),
    TotalDonated(f64),
    TotalReceived(f64),
    Badges(Vec<Badge>),
    Causes(Vec<String>),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn badge_tiers() {
        assert_eq!(Badge::for_amount(150.0).name, "Generous Supporter");
        assert_eq!(Badge::for_amount(100.0).name, "Generous Supporter");
        assert_eq!(Badge::for_amount(50.0).name, "Dedicated Giver");
        assert_eq!(Badge::for_amount(49.99).name, "Compassionate Heart");
    }

    #[test]
    fn new_user_totals_follow_role() {
        let donor = User::new("Ana", Role::Donor);
        assert_eq!(donor.total_donated, Some(0.0));
        assert_eq!(donor.total_received, None);

        let charity = User::new("Relief", Role::Charity);
        assert_eq!(charity.total_donated, None);
        assert_eq!(charity.total_received, Some(0.0));
    }

    #[test]
    fn identity_prefers_email_then_wallet() {
        let user = User::new("Ana", Role::Donor).with_wallet("0.0.1");
        assert_eq!(user.identity(), "0.0.1");
        let user = user.with_email("ana@example.com");
        assert_eq!(user.identity(), "ana@example.com");
    }

    #[test]
    fn role_parses_case_insensitively() {
        assert_eq!("Donor".parse::<Role>().unwrap(), Role::Donor);
        assert_eq!(" charity ".parse::<Role>().unwrap(), Role::Charity);
        assert!("admin".parse::<Role>().is_err());
    }

    #[test]
    fn user_round_trips_type_field() {
        let json = r#"{"name":"Alex","type":"donor","wallet_id":"0.0.12345","total_donated":1250.5}"#;
        let user: User = serde_json::from_str(json).unwrap();
        assert_eq!(user.role, Role::Donor);
        assert!(user.badges.is_empty());
    }
}
