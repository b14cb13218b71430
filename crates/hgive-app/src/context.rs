//! Shared application context
//!
//! Everything a page controller needs besides the viewer's session. One
//! context is shared by all sessions through an `Arc`.

use crate::users::UserDirectory;
use hgive_core::{GiveConfig, GiveResult};
use hgive_ledger::{LedgerClient, MockLedger, TxScope, ID_PREFIX};
use hgive_store::{AssetResolver, DataStore};
use std::fmt;
use std::sync::Arc;
use tracing::info;

pub struct AppContext {
    pub store: Arc<DataStore>,
    pub ledger: Arc<dyn LedgerClient>,
    pub users: UserDirectory,
    pub assets: AssetResolver,
    pub config: GiveConfig,
}

impl AppContext {
    /// Open the data directory named by `config` and seed a mock ledger
    /// with every transaction id already on record.
    pub fn open(config: GiveConfig) -> GiveResult<Self> {
        let store = Arc::new(DataStore::open(&config.data_dir)?);

        let mut known: Vec<(String, TxScope)> = store
            .donations()
            .into_iter()
            .map(|d| {
                (
                    d.transaction_id,
                    TxScope::Donation {
                        campaign_id: d.campaign_id,
                    },
                )
            })
            .collect();
        known.extend(
            store
                .campaigns()
                .into_iter()
                .filter(|c| !c.transaction_id.is_empty())
                .map(|c| {
                    (
                        c.transaction_id,
                        TxScope::CampaignCreation {
                            campaign_name: c.name,
                        },
                    )
                }),
        );

        // Ids issued by an earlier run are already on record; continue past them.
        let mut ledger_config = config.ledger.clone();
        if let Some(highest) = known.iter().filter_map(|(id, _)| id_number(id)).max() {
            ledger_config.transaction_seed = ledger_config.transaction_seed.max(highest.saturating_add(1));
        }

        let ledger = MockLedger::new(ledger_config).with_known_transactions(known);
        info!(known = ledger.known_count(), "mock ledger seeded");

        Ok(Self::new(store, Arc::new(ledger), config))
    }

    /// Assemble from parts
    pub fn new(store: Arc<DataStore>, ledger: Arc<dyn LedgerClient>, config: GiveConfig) -> Self {
        Self {
            store,
            ledger,
            users: UserDirectory::with_demo_accounts(),
            assets: AssetResolver::new(&config.assets_dir, config.default_image.clone()),
            config,
        }
    }

    /// Replace the account table
    #[must_use]
    pub fn with_users(mut self, users: UserDirectory) -> Self {
        self.users = users;
        self
    }
}

fn id_number(id: &str) -> Option<u64> {
    id.strip_prefix(ID_PREFIX)?.parse().ok()
}

impl fmt::Debug for AppContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppContext")
            .field("data_dir", &self.store.dir())
            .field("ledger", &self.ledger.name())
            .field("accounts", &self.users.len())
            .finish_non_exhaustive()
    }
}
