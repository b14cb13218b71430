//! Donations and the supporter leaderboard
//!
//! Donations are the record of truth. Supporter entries are a projection
//! over them and can always be rebuilt with [`aggregate_supporters`].

use crate::user::Badge;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Donor name recorded for anonymous gifts
pub const ANONYMOUS_DONOR: &str = "Anonymous";

/// Recorded donation; immutable once appended
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Donation {
    pub id: u64,
    pub donor: String,
    pub amount: f64,
    pub date: NaiveDate,
    pub campaign_id: u64,
    pub transaction_id: String,
}

impl Donation {
    #[inline]
    #[must_use]
    pub fn is_anonymous(&self) -> bool {
        self.donor == ANONYMOUS_DONOR
    }
}

/// Donation before the store assigns its id
#[derive(Debug, Clone, PartialEq)]
pub struct NewDonation {
    pub donor: String,
    pub amount: f64,
    pub date: NaiveDate,
    pub campaign_id: u64,
    pub transaction_id: String,
}

impl NewDonation {
    /// Donation attributed to `donor`, or to "Anonymous" when `anonymous`
    pub fn new(
        donor: impl Into<String>,
        anonymous: bool,
        amount: f64,
        campaign_id: u64,
        transaction_id: impl Into<String>,
        date: NaiveDate,
    ) -> Self {
        Self {
            donor: if anonymous {
                ANONYMOUS_DONOR.to_string()
            } else {
                donor.into()
            },
            amount,
            date,
            campaign_id,
            transaction_id: transaction_id.into(),
        }
    }

    /// Finalize with the store-assigned id
    #[must_use]
    pub fn into_donation(self, id: u64) -> Donation {
        Donation {
            id,
            donor: self.donor,
            amount: self.amount,
            date: self.date,
            campaign_id: self.campaign_id,
            transaction_id: self.transaction_id,
        }
    }
}

/// Leaderboard entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Supporter {
    pub donor: String,
    pub total_donated: f64,
    pub donations_count: u32,
    #[serde(default)]
    pub badges: Vec<Badge>,
}

/// On-disk wrapper of `supporters.json`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SupportersFile {
    #[serde(default)]
    pub supporters: Vec<Supporter>,
}

/// Leaderboard ordering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeaderboardSort {
    #[default]
    TotalDonated,
    DonationsCount,
}

/// Build supporter entries from donations.
///
/// Donors appear in order of their first donation; anonymous gifts are not
/// attributed to anyone. Badges are awarded per donation and kept in
/// acquisition order without duplicates.
#[must_use]
pub fn aggregate_supporters(donations: &[Donation]) -> Vec<Supporter> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut supporters: Vec<Supporter> = Vec::new();

    for donation in donations.iter().filter(|d| !d.is_anonymous()) {
        let slot = *index.entry(donation.donor.as_str()).or_insert_with(|| {
            supporters.push(Supporter {
                donor: donation.donor.clone(),
                total_donated: 0.0,
                donations_count: 0,
                badges: Vec::new(),
            });
            supporters.len() - 1
        });

        let entry = &mut supporters[slot];
        entry.total_donated += donation.amount;
        entry.donations_count += 1;
        let badge = Badge::for_amount(donation.amount);
        if !entry.badges.iter().any(|b| b.name == badge.name) {
            entry.badges.push(badge);
        }
    }

    supporters
}

/// Sort supporters descending by the chosen key.
pub fn sort_leaderboard(supporters: &mut [Supporter], by: LeaderboardSort) {
    match by {
        LeaderboardSort::TotalDonated => {
            supporters.sort_by(|a, b| b.total_donated.total_cmp(&a.total_donated));
        }
        LeaderboardSort::DonationsCount => {
            supporters.sort_by(|a, b| b.donations_count.cmp(&a.donations_count));
        }
    }
}
