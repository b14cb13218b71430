//! Consistency checks over the collections
//!
//! A campaign's `raised` must equal its offline part plus the donations
//! recorded against it. Campaigns that never recorded an offline part (files
//! the store has not opened yet) only need `raised` to cover their donations.

use hgive_core::{aggregate_supporters, Campaign, Donation, Supporter};
use serde::Serialize;
use std::collections::HashMap;

/// Slack allowed when comparing summed amounts
pub const TOLERANCE: f64 = 1e-6;

/// Campaign whose `raised` does not match its offline part plus donations
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RaisedDiscrepancy {
    pub campaign_id: u64,
    pub raised: f64,
    pub offline: Option<f64>,
    pub donated: f64,
}

/// Donation pointing at a campaign that does not exist
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrphanDonation {
    pub donation_id: u64,
    pub campaign_id: u64,
}

/// Findings of [`audit`]
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AuditReport {
    pub raised_discrepancies: Vec<RaisedDiscrepancy>,
    pub orphan_donations: Vec<OrphanDonation>,
    pub supporters_stale: bool,
}

impl AuditReport {
    #[inline]
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.raised_discrepancies.is_empty()
            && self.orphan_donations.is_empty()
            && !self.supporters_stale
    }
}

/// Sum of donation amounts per campaign id
#[must_use]
pub fn donated_by_campaign(donations: &[Donation]) -> HashMap<u64, f64> {
    let mut totals = HashMap::new();
    for d in donations {
        *totals.entry(d.campaign_id).or_insert(0.0) += d.amount;
    }
    totals
}

/// Check campaigns, donations and the supporters view against each other.
#[must_use]
pub fn audit(campaigns: &[Campaign], donations: &[Donation], supporters: &[Supporter]) -> AuditReport {
    let totals = donated_by_campaign(donations);

    let raised_discrepancies = campaigns
        .iter()
        .filter_map(|c| {
            let donated = totals.get(&c.id).copied().unwrap_or(0.0);
            let mismatch = match c.raised_offline {
                Some(offline) => (c.raised - (offline + donated)).abs() > TOLERANCE,
                None => c.raised + TOLERANCE < donated,
            };
            mismatch.then_some(RaisedDiscrepancy {
                campaign_id: c.id,
                raised: c.raised,
                offline: c.raised_offline,
                donated,
            })
        })
        .collect();

    let orphan_donations = donations
        .iter()
        .filter(|d| !campaigns.iter().any(|c| c.id == d.campaign_id))
        .map(|d| OrphanDonation {
            donation_id: d.id,
            campaign_id: d.campaign_id,
        })
        .collect();

    AuditReport {
        raised_discrepancies,
        orphan_donations,
        supporters_stale: aggregate_supporters(donations) != supporters,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hgive_test_utils::{campaign, donation};

    #[test]
    fn clean_when_raised_covers_donations() {
        let campaigns = vec![campaign(1, 1000.0, 250.0)];
        let donations = vec![donation(1, "Alex", 50.0, 1)];
        let report = audit(&campaigns, &donations, &aggregate_supporters(&donations));
        assert!(report.is_clean());
    }

    #[test]
    fn flags_raised_below_donations_and_orphans() {
        let campaigns = vec![campaign(1, 1000.0, 10.0)];
        let donations = vec![donation(1, "Alex", 50.0, 1), donation(2, "Sam", 5.0, 9)];
        let report = audit(&campaigns, &donations, &[]);

        assert_eq!(report.raised_discrepancies.len(), 1);
        assert_eq!(report.raised_discrepancies[0].donated, 50.0);
        assert_eq!(
            report.orphan_donations,
            vec![OrphanDonation {
                donation_id: 2,
                campaign_id: 9
            }]
        );
        assert!(report.supporters_stale);
        assert!(!report.is_clean());
    }

    #[test]
    fn recorded_offline_part_requires_exact_total() {
        let mut exact = campaign(1, 1000.0, 250.0);
        exact.raised_offline = Some(200.0);
        let mut lost_credit = campaign(2, 1000.0, 200.0);
        lost_credit.raised_offline = Some(200.0);
        let mut over = campaign(3, 1000.0, 900.0);
        over.raised_offline = Some(0.0);

        let donations = vec![
            donation(1, "Alex", 50.0, 1),
            donation(2, "Sam", 50.0, 2),
            donation(3, "Kim", 10.0, 3),
        ];
        let report = audit(
            &[exact, lost_credit, over],
            &donations,
            &aggregate_supporters(&donations),
        );

        let flagged: Vec<u64> = report.raised_discrepancies.iter().map(|d| d.campaign_id).collect();
        assert_eq!(flagged, vec![2, 3]);
        assert_eq!(report.raised_discrepancies[0].offline, Some(200.0));
        assert!(!report.is_clean());
    }
}
