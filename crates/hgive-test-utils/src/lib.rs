//! Testing utilities for the HederaGive workspace
//!
//! Record builders, sample fixtures and throwaway data directories.

#![allow(missing_docs)]

use chrono::NaiveDate;
use hgive_core::{
    aggregate_supporters, Campaign, CampaignStatus, Donation, GiveConfig, Milestone,
    MilestoneStatus, SupportersFile,
};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Parse a `YYYY-MM-DD` date
pub fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

/// Active campaign running through 2025 with three pending milestones
/// that sum to `goal`.
pub fn campaign(id: u64, goal: f64, raised: f64) -> Campaign {
    Campaign {
        id,
        name: format!("Campaign {id}"),
        description: format!("Test campaign number {id}"),
        category: "Water".to_string(),
        location: "Kenya".to_string(),
        goal,
        raised,
        raised_offline: None,
        supporters: 0,
        status: CampaignStatus::Active,
        start_date: date("2025-01-01"),
        end_date: date("2025-12-31"),
        milestones: vec![
            Milestone::pending(1, "Planning", goal * 0.3),
            Milestone::pending(2, "Build", goal * 0.3),
            Milestone::pending(3, "Handover", goal * 0.4),
        ],
        beneficiaries: 500,
        image: String::new(),
        transaction_id: format!("0.0.{}", 2_000_000 + id),
    }
}

/// Donation dated 2025-03-15 with a derived transaction id
pub fn donation(id: u64, donor: &str, amount: f64, campaign_id: u64) -> Donation {
    Donation {
        id,
        donor: donor.to_string(),
        amount,
        date: date("2025-03-15"),
        campaign_id,
        transaction_id: format!("0.0.{}", 1_000_000 + id),
    }
}

/// A small catalogue spanning categories, statuses and milestone states
pub fn sample_campaigns() -> Vec<Campaign> {
    let mut water = campaign(1, 10_000.0, 7_800.0);
    water.name = "Clean Water for Rural Kenya".to_string();
    water.description = "Drilling wells and installing filtration for villages".to_string();
    water.supporters = 3;
    water.image = "water.jpg".to_string();
    water.milestones[0].status = MilestoneStatus::Completed;
    water.milestones[0].proof = Some("QmWellSurvey".to_string());
    water.milestones[0].release_date = Some(date("2025-02-10"));
    water.milestones[1].status = MilestoneStatus::InProgress;

    let mut school = campaign(2, 5_000.0, 1_200.0);
    school.name = "Books for Every Child".to_string();
    school.description = "Stocking libraries in primary schools".to_string();
    school.category = "Education".to_string();
    school.location = "Nepal".to_string();
    school.supporters = 2;
    school.start_date = date("2025-03-01");
    school.end_date = date("2025-09-30");

    let mut clinic = campaign(3, 20_000.0, 19_000.0);
    clinic.name = "Mobile Health Clinics".to_string();
    clinic.description = "Bringing primary care to remote communities".to_string();
    clinic.category = "Healthcare".to_string();
    clinic.location = "Peru".to_string();
    clinic.supporters = 1;
    clinic.end_date = date("2025-04-10");

    let mut reforest = campaign(4, 8_000.0, 8_000.0);
    reforest.name = "Reforest the Highlands".to_string();
    reforest.description = "Planting native trees on degraded land".to_string();
    reforest.category = "Environment".to_string();
    reforest.location = "Ethiopia".to_string();
    reforest.status = CampaignStatus::Completed;
    reforest.end_date = date("2025-02-28");
    for m in &mut reforest.milestones {
        m.status = MilestoneStatus::Completed;
        m.proof = Some(format!("QmReforest{}", m.id));
        m.release_date = Some(date("2025-02-20"));
    }

    vec![water, school, clinic, reforest]
}

/// Donations against [`sample_campaigns`], including one anonymous gift
pub fn sample_donations() -> Vec<Donation> {
    let mut donations = vec![
        donation(1, "Alex Johnson", 100.0, 1),
        donation(2, "Maria Garcia", 250.0, 1),
        donation(3, "Anonymous", 50.0, 1),
        donation(4, "Alex Johnson", 25.0, 2),
        donation(5, "Sam Lee", 75.0, 2),
        donation(6, "Maria Garcia", 500.0, 3),
    ];
    donations[3].date = date("2025-04-02");
    donations[4].date = date("2025-04-18");
    donations
}

/// Temporary data directory populated with JSON collections and an
/// assets directory holding the default image.
pub struct TestDataDir {
    dir: TempDir,
}

impl TestDataDir {
    /// Directory seeded with the sample fixtures
    pub fn new() -> Self {
        Self::with(sample_campaigns(), sample_donations())
    }

    /// Directory seeded with the given records and their supporters view
    pub fn with(campaigns: Vec<Campaign>, donations: Vec<Donation>) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let supporters = SupportersFile {
            supporters: aggregate_supporters(&donations),
        };
        write(&dir.path().join("campaigns.json"), &serde_json::to_string_pretty(&campaigns).unwrap());
        write(&dir.path().join("donations.json"), &serde_json::to_string_pretty(&donations).unwrap());
        write(&dir.path().join("supporters.json"), &serde_json::to_string_pretty(&supporters).unwrap());

        let assets = dir.path().join("assets");
        std::fs::create_dir_all(&assets).unwrap();
        std::fs::write(assets.join("na.jpg"), b"default").unwrap();
        std::fs::write(assets.join("water.jpg"), b"water").unwrap();

        Self { dir }
    }

    /// Data directory
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Assets directory
    pub fn assets(&self) -> PathBuf {
        self.dir.path().join("assets")
    }

    /// Configuration pointing at this directory
    pub fn config(&self) -> GiveConfig {
        GiveConfig::new()
            .with_data_dir(self.path())
            .with_assets_dir(self.assets())
    }
}

impl Default for TestDataDir {
    fn default() -> Self {
        Self::new()
    }
}

fn write(path: &Path, body: &str) {
    std::fs::write(path, body).unwrap();
}
