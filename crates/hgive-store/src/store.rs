//! The data store
//!
//! Holds campaigns, donations and the supporters view in one snapshot behind
//! a read-write lock. Every mutation runs as a single transaction:
//!
//! ```text
//! write lock → clone snapshot → apply change → stage touched files → commit (rename) → swap snapshot
//! ```
//!
//! If staging fails nothing on disk or in memory changes. Files are committed
//! donations first, then campaigns, then the supporters view, so the log of
//! record always lands before anything derived from it. When a rename fails
//! partway, files already replaced are rolled back to the previous snapshot.
//!
//! Donations are the source of truth for what they feed: `supporters.json`
//! is rebuilt from them, and each campaign's `raised` is reset to its
//! offline part plus its donations, on open and after every append.

use crate::audit::{self, AuditReport};
use crate::json::{self, StagedFile};
use chrono::NaiveDate;
use hgive_core::impact::estimate_all;
use hgive_core::validation::validate_amount;
use hgive_core::{
    aggregate_supporters, Campaign, CampaignDraft, CampaignStatus, Donation, GiveError,
    GiveResult, ImpactMetrics, Milestone, MilestoneStatus, NewDonation, NotFoundError, Supporter,
    SupportersFile, ValidationError,
};
use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

/// Smallest amount the store records
const MIN_RECORDED_AMOUNT: f64 = 0.01;

/// Backing files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Campaigns,
    Donations,
    Supporters,
    ImpactMetrics,
}

impl Collection {
    /// File name inside the data directory
    #[inline]
    #[must_use]
    pub fn file_name(&self) -> &'static str {
        match self {
            Collection::Campaigns => "campaigns.json",
            Collection::Donations => "donations.json",
            Collection::Supporters => "supporters.json",
            Collection::ImpactMetrics => "impact_metrics.json",
        }
    }
}

/// Files a transaction may rewrite
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TxFile {
    Donations,
    Campaigns,
    Supporters,
}

impl TxFile {
    fn collection(self) -> Collection {
        match self {
            TxFile::Donations => Collection::Donations,
            TxFile::Campaigns => Collection::Campaigns,
            TxFile::Supporters => Collection::Supporters,
        }
    }
}

/// Reset each campaign's `raised` to its offline part plus its donations.
///
/// A campaign with no recorded offline part takes whatever of `raised` its
/// donations do not explain. Returns whether any campaign changed.
fn project_raised(campaigns: &mut [Campaign], donations: &[Donation]) -> bool {
    let totals = audit::donated_by_campaign(donations);
    let mut changed = false;
    for c in campaigns {
        let donated = totals.get(&c.id).copied().unwrap_or(0.0);
        let offline = c
            .raised_offline
            .unwrap_or_else(|| (c.raised - donated).max(0.0));
        let projected = offline + donated;

        if (c.raised - projected).abs() > audit::TOLERANCE {
            warn!(
                campaign_id = c.id,
                recorded = c.raised,
                projected,
                "campaign total disagrees with donations, using donations"
            );
            c.raised = projected;
            changed = true;
        }
        if c.raised_offline != Some(offline) {
            c.raised_offline = Some(offline);
            changed = true;
        }
    }
    changed
}

#[derive(Debug, Clone, Default)]
struct Snapshot {
    campaigns: Vec<Campaign>,
    donations: Vec<Donation>,
    supporters: Vec<Supporter>,
}

impl Snapshot {
    fn campaign_mut(&mut self, id: u64) -> GiveResult<&mut Campaign> {
        self.campaigns
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| NotFoundError::Campaign(id).into())
    }

    fn milestone_mut(&mut self, campaign_id: u64, milestone_id: u64) -> GiveResult<&mut Milestone> {
        self.campaign_mut(campaign_id)?
            .milestone_mut(milestone_id)
            .ok_or_else(|| {
                NotFoundError::Milestone {
                    campaign: campaign_id,
                    milestone: milestone_id,
                }
                .into()
            })
    }
}

#[derive(Serialize)]
struct SupportersView<'a> {
    supporters: &'a [Supporter],
}

/// JSON-file backed store for one data directory
#[derive(Debug)]
pub struct DataStore {
    dir: PathBuf,
    state: RwLock<Snapshot>,
    impact_gate: Mutex<()>,
}

impl DataStore {
    /// Open the store, loading campaigns and donations.
    ///
    /// Fails with `NotFound` when either required file is missing and
    /// `Parse` when one is malformed. Campaign totals and the supporters
    /// view are recomputed from donations and rewritten if the files
    /// disagree.
    pub fn open(dir: impl Into<PathBuf>) -> GiveResult<Self> {
        let store = Self {
            dir: dir.into(),
            state: RwLock::new(Snapshot::default()),
            impact_gate: Mutex::new(()),
        };
        store.reload()?;
        Ok(store)
    }

    /// Data directory
    #[inline]
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of a collection's backing file
    #[must_use]
    pub fn path(&self, collection: Collection) -> PathBuf {
        self.dir.join(collection.file_name())
    }

    /// Read campaigns from disk
    pub fn load_campaigns(&self) -> GiveResult<Vec<Campaign>> {
        json::read_json(&self.path(Collection::Campaigns))
    }

    /// Read donations from disk
    pub fn load_donations(&self) -> GiveResult<Vec<Donation>> {
        json::read_json(&self.path(Collection::Donations))
    }

    /// Read the supporters view from disk
    pub fn load_supporters(&self) -> GiveResult<Vec<Supporter>> {
        json::read_json::<SupportersFile>(&self.path(Collection::Supporters))
            .map(|file| file.supporters)
    }

    /// Replace the in-memory snapshot with the files on disk
    pub fn reload(&self) -> GiveResult<()> {
        let mut campaigns = self.load_campaigns()?;
        let donations = self.load_donations()?;
        if project_raised(&mut campaigns, &donations) {
            json::write_json(&self.path(Collection::Campaigns), &campaigns)?;
            debug!(count = campaigns.len(), "rewrote campaign totals");
        }

        let supporters = aggregate_supporters(&donations);

        let on_disk = match self.load_supporters() {
            Ok(existing) => Some(existing),
            Err(e @ (GiveError::NotFound(_) | GiveError::Parse { .. })) => {
                warn!(error = %e, "supporters view unreadable, rebuilding from donations");
                None
            }
            Err(e) => return Err(e),
        };
        if on_disk.as_deref() != Some(supporters.as_slice()) {
            json::write_json(
                &self.path(Collection::Supporters),
                &SupportersView {
                    supporters: &supporters,
                },
            )?;
            debug!(count = supporters.len(), "rewrote supporters view");
        }

        info!(
            dir = %self.dir.display(),
            campaigns = campaigns.len(),
            donations = donations.len(),
            supporters = supporters.len(),
            "data store loaded"
        );

        *self.state.write() = Snapshot {
            campaigns,
            donations,
            supporters,
        };
        Ok(())
    }

    // ─────────────────────────────────────────────────────────
    // Queries
    // ─────────────────────────────────────────────────────────

    /// All campaigns in file order
    #[must_use]
    pub fn campaigns(&self) -> Vec<Campaign> {
        self.state.read().campaigns.clone()
    }

    /// One campaign by id
    pub fn campaign(&self, id: u64) -> GiveResult<Campaign> {
        self.state
            .read()
            .campaigns
            .iter()
            .find(|c| c.id == id)
            .cloned()
            .ok_or_else(|| NotFoundError::Campaign(id).into())
    }

    /// All donations in append order
    #[must_use]
    pub fn donations(&self) -> Vec<Donation> {
        self.state.read().donations.clone()
    }

    /// Donations for one campaign
    #[must_use]
    pub fn donations_for_campaign(&self, campaign_id: u64) -> Vec<Donation> {
        self.state
            .read()
            .donations
            .iter()
            .filter(|d| d.campaign_id == campaign_id)
            .cloned()
            .collect()
    }

    /// Donations attributed to a donor name
    #[must_use]
    pub fn donations_by(&self, donor: &str) -> Vec<Donation> {
        self.state
            .read()
            .donations
            .iter()
            .filter(|d| d.donor == donor)
            .cloned()
            .collect()
    }

    /// Donation recorded under a transaction id
    #[must_use]
    pub fn donation_by_transaction(&self, transaction_id: &str) -> Option<Donation> {
        self.state
            .read()
            .donations
            .iter()
            .find(|d| d.transaction_id == transaction_id)
            .cloned()
    }

    /// Leaderboard entries derived from donations
    #[must_use]
    pub fn supporters(&self) -> Vec<Supporter> {
        self.state.read().supporters.clone()
    }

    /// Cross-check the collections
    #[must_use]
    pub fn audit(&self) -> AuditReport {
        let state = self.state.read();
        audit::audit(&state.campaigns, &state.donations, &state.supporters)
    }

    // ─────────────────────────────────────────────────────────
    // Mutations
    // ─────────────────────────────────────────────────────────

    /// Record a donation and credit its campaign in one transaction.
    pub fn append_donation(&self, new: NewDonation) -> GiveResult<Donation> {
        validate_amount("donation amount", new.amount, MIN_RECORDED_AMOUNT)?;

        let donation = self.transact(
            &[TxFile::Donations, TxFile::Campaigns, TxFile::Supporters],
            |snap| {
                let campaign = snap.campaign_mut(new.campaign_id)?;
                if !campaign.is_active() {
                    return Err(ValidationError::CampaignClosed(campaign.id).into());
                }
                campaign.raised += new.amount;
                campaign.supporters += 1;

                let id = snap.donations.iter().map(|d| d.id).max().unwrap_or(0) + 1;
                let donation = new.into_donation(id);
                snap.donations.push(donation.clone());
                snap.supporters = aggregate_supporters(&snap.donations);
                Ok(donation)
            },
        )?;

        info!(
            donation_id = donation.id,
            campaign_id = donation.campaign_id,
            amount = donation.amount,
            transaction_id = %donation.transaction_id,
            "donation recorded"
        );
        Ok(donation)
    }

    /// Create an active campaign from a validated draft.
    pub fn create_campaign(&self, draft: &CampaignDraft, transaction_id: &str) -> GiveResult<Campaign> {
        draft.validate()?;

        let campaign = self.transact(&[TxFile::Campaigns], |snap| {
            let id = snap.campaigns.iter().map(|c| c.id).max().unwrap_or(0) + 1;
            let campaign = Campaign {
                id,
                name: draft.name.trim().to_string(),
                description: draft.description.trim().to_string(),
                category: draft.category.clone(),
                location: draft.location.clone(),
                goal: draft.goal,
                raised: 0.0,
                raised_offline: Some(0.0),
                supporters: 0,
                status: CampaignStatus::Active,
                start_date: draft.start_date,
                end_date: draft.end_date,
                milestones: draft
                    .milestones
                    .iter()
                    .zip(1u64..)
                    .map(|(m, mid)| Milestone::pending(mid, m.name.trim(), m.funds_required))
                    .collect(),
                beneficiaries: draft.beneficiaries,
                image: String::new(),
                transaction_id: transaction_id.to_string(),
            };
            snap.campaigns.push(campaign.clone());
            Ok(campaign)
        })?;

        info!(campaign_id = campaign.id, name = %campaign.name, "campaign created");
        Ok(campaign)
    }

    /// Move a milestone one step forward.
    pub fn advance_milestone(
        &self,
        campaign_id: u64,
        milestone_id: u64,
        to: MilestoneStatus,
        today: NaiveDate,
    ) -> GiveResult<Milestone> {
        let milestone = self.transact(&[TxFile::Campaigns], |snap| {
            let milestone = snap.milestone_mut(campaign_id, milestone_id)?;
            milestone.advance(to, today)?;
            Ok(milestone.clone())
        })?;
        info!(campaign_id, milestone_id, status = %to, "milestone advanced");
        Ok(milestone)
    }

    /// Attach a proof reference to an in-progress milestone.
    pub fn submit_milestone_proof(
        &self,
        campaign_id: u64,
        milestone_id: u64,
        proof: &str,
    ) -> GiveResult<Milestone> {
        let milestone = self.transact(&[TxFile::Campaigns], |snap| {
            let milestone = snap.milestone_mut(campaign_id, milestone_id)?;
            milestone.attach_proof(proof)?;
            Ok(milestone.clone())
        })?;
        info!(campaign_id, milestone_id, "milestone proof recorded");
        Ok(milestone)
    }

    /// Rebuild and persist the supporters view from donations
    pub fn rebuild_supporters(&self) -> GiveResult<Vec<Supporter>> {
        self.transact(&[TxFile::Supporters], |snap| {
            snap.supporters = aggregate_supporters(&snap.donations);
            Ok(snap.supporters.clone())
        })
    }

    // ─────────────────────────────────────────────────────────
    // Impact metrics
    // ─────────────────────────────────────────────────────────

    /// Impact metrics for a campaign.
    ///
    /// When `impact_metrics.json` is missing it is generated from the
    /// current campaigns and written back. A campaign absent from the file
    /// gets an estimate without touching the file.
    pub fn impact_metrics(&self, campaign_id: u64) -> GiveResult<ImpactMetrics> {
        let campaign = self.campaign(campaign_id)?;
        let path = self.path(Collection::ImpactMetrics);

        let _gate = self.impact_gate.lock();
        let mut all: BTreeMap<String, ImpactMetrics> = match json::read_json(&path) {
            Ok(all) => all,
            Err(GiveError::NotFound(_)) => {
                let generated = estimate_all(&self.campaigns());
                json::write_json(&path, &generated)?;
                info!(path = %path.display(), entries = generated.len(), "generated impact metrics");
                generated
            }
            Err(e) => return Err(e),
        };

        Ok(all
            .remove(&campaign_id.to_string())
            .unwrap_or_else(|| ImpactMetrics::estimate(&campaign)))
    }

    // ─────────────────────────────────────────────────────────
    // Transactions
    // ─────────────────────────────────────────────────────────

    fn transact<R>(
        &self,
        touched: &[TxFile],
        apply: impl FnOnce(&mut Snapshot) -> GiveResult<R>,
    ) -> GiveResult<R> {
        let mut guard = self.state.write();
        let mut next = guard.clone();
        let out = apply(&mut next)?;

        let staged = touched
            .iter()
            .map(|f| self.stage(*f, &next))
            .collect::<GiveResult<Vec<StagedFile>>>()?;
        if let Err(partial) = json::commit_all(staged) {
            self.roll_back(&touched[..partial.committed], &guard);
            return Err(partial.error);
        }

        *guard = next;
        Ok(out)
    }

    /// Rewrite files a failed commit already replaced from `previous`.
    fn roll_back(&self, committed: &[TxFile], previous: &Snapshot) {
        for file in committed.iter().rev() {
            let name = file.collection().file_name();
            match self.stage(*file, previous).and_then(StagedFile::commit) {
                Ok(()) => warn!(file = name, "rolled back partial commit"),
                Err(e) => error!(
                    file = name,
                    error = %e,
                    "rollback failed, totals are recomputed from donations on next open"
                ),
            }
        }
    }

    fn stage(&self, file: TxFile, snap: &Snapshot) -> GiveResult<StagedFile> {
        let path = self.path(file.collection());
        match file {
            TxFile::Campaigns => json::stage_json(&path, &snap.campaigns),
            TxFile::Donations => json::stage_json(&path, &snap.donations),
            TxFile::Supporters => json::stage_json(
                &path,
                &SupportersView {
                    supporters: &snap.supporters,
                },
            ),
        }
    }
}
