//! In-memory mock ledger
//!
//! Stands in for the real network. Transaction ids are `0.0.<n>` with `n`
//! drawn from a process-wide counter, so ids never repeat within a process.
//! Verification is a placeholder oracle: an id is valid when this ledger
//! knows it (issued here or seeded from the donation log) or when it merely
//! looks like a ledger id.

use crate::client::{
    AccountCredentials, LedgerClient, ReportVerification, TransactionId, TxScope, Verification,
};
use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use hgive_core::LedgerConfig;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

/// Prefix shared by every fabricated id
pub const ID_PREFIX: &str = "0.0.";

/// Whether `id` has the shape of a ledger id (`0.0.` followed by digits)
#[must_use]
pub fn is_well_formed(id: &str) -> bool {
    id.strip_prefix(ID_PREFIX)
        .is_some_and(|rest| !rest.is_empty() && rest.bytes().all(|b| b.is_ascii_digit()))
}

/// Mock ledger backed by a counter and a memo map
#[derive(Debug)]
pub struct MockLedger {
    config: LedgerConfig,
    next: AtomicU64,
    known: DashMap<String, String>,
}

impl MockLedger {
    /// Create from configuration
    #[must_use]
    pub fn new(config: LedgerConfig) -> Self {
        Self {
            next: AtomicU64::new(config.transaction_seed),
            config,
            known: DashMap::new(),
        }
    }

    /// Seed with transactions already on record (e.g. the donation log)
    #[must_use]
    pub fn with_known_transactions<I, S>(self, entries: I) -> Self
    where
        I: IntoIterator<Item = (S, TxScope)>,
        S: Into<String>,
    {
        for (id, scope) in entries {
            self.known.insert(id.into(), scope.memo());
        }
        self
    }

    /// Number of transactions this ledger knows about
    #[inline]
    #[must_use]
    pub fn known_count(&self) -> usize {
        self.known.len()
    }

    fn memo_for(&self, id: &str) -> Option<String> {
        self.known.get(id).map(|memo| memo.value().clone())
    }
}

impl Default for MockLedger {
    fn default() -> Self {
        Self::new(LedgerConfig::default())
    }
}

#[async_trait]
impl LedgerClient for MockLedger {
    async fn issue_transaction_id(&self, scope: TxScope) -> TransactionId {
        let n = self.next.fetch_add(1, Ordering::Relaxed);
        let id = format!("{ID_PREFIX}{n}");
        let memo = scope.memo();
        debug!(transaction_id = %id, %memo, "issued mock transaction");
        self.known.insert(id.clone(), memo);
        TransactionId::new(id)
    }

    async fn verify_transaction(&self, id: &str) -> Verification {
        let id = id.trim();
        let (valid, memo) = match self.memo_for(id) {
            Some(memo) => (true, memo),
            None if is_well_formed(id) => (true, "Unrecorded transfer".to_string()),
            None => (false, "Invalid transaction ID format".to_string()),
        };
        debug!(transaction_id = %id, valid, "verified mock transaction");
        Verification {
            transaction_id: id.to_string(),
            valid,
            memo,
            timestamp: Utc::now(),
        }
    }

    async fn issue_account(&self) -> AccountCredentials {
        let suffix = Utc::now().timestamp().unsigned_abs() % 1_000_000;
        let account_id = format!("{ID_PREFIX}{}", self.config.account_base + suffix);
        debug!(%account_id, "issued mock account");
        AccountCredentials {
            account_id,
            private_key: format!("mock-private-key-{}", hex::encode(rand::random::<[u8; 16]>())),
            public_key: format!("mock-public-key-{}", hex::encode(rand::random::<[u8; 16]>())),
        }
    }

    async fn verify_report(&self, campaign_id: u64, report_id: &str) -> ReportVerification {
        ReportVerification {
            campaign_id,
            report_id: report_id.to_string(),
            success: true,
            timestamp: Utc::now(),
            consensus_node: self.config.consensus_node.clone(),
            topic_id: self.config.topic_id.clone(),
        }
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;

    #[test]
    fn well_formed_ids() {
        assert!(is_well_formed("0.0.12345"));
        assert!(!is_well_formed("0.0."));
        assert!(!is_well_formed("0.0.12a"));
        assert!(!is_well_formed("1.2.3"));
        assert!(!is_well_formed(""));
    }

    #[tokio::test]
    async fn issued_ids_are_distinct() {
        let ledger = MockLedger::default();
        let mut seen = HashSet::new();
        for i in 0..500 {
            let id = ledger
                .issue_transaction_id(TxScope::Donation { campaign_id: i % 7 })
                .await;
            assert!(seen.insert(id));
        }
        assert_eq!(seen.len(), 500);
    }

    #[tokio::test]
    async fn issued_ids_are_distinct_across_tasks() {
        let ledger = Arc::new(MockLedger::default());
        let mut handles = Vec::new();
        for t in 0..8 {
            let ledger = Arc::clone(&ledger);
            handles.push(tokio::spawn(async move {
                let mut ids = Vec::new();
                for _ in 0..50 {
                    ids.push(
                        ledger
                            .issue_transaction_id(TxScope::Donation { campaign_id: t })
                            .await,
                    );
                }
                ids
            }));
        }
        let mut all = HashSet::new();
        for h in handles {
            for id in h.await.unwrap() {
                assert!(all.insert(id));
            }
        }
        assert_eq!(all.len(), 400);
    }

    #[tokio::test]
    async fn issued_id_verifies_with_scope_memo() {
        let ledger = MockLedger::default();
        let id = ledger
            .issue_transaction_id(TxScope::Donation { campaign_id: 4 })
            .await;
        let v = ledger.verify_transaction(id.as_str()).await;
        assert!(v.valid);
        assert_eq!(v.memo, "Donation to campaign 4");
    }

    #[tokio::test]
    async fn seeded_ids_verify_even_when_malformed() {
        let ledger = MockLedger::default().with_known_transactions([(
            "legacy-tx-1",
            TxScope::Donation { campaign_id: 2 },
        )]);
        let v = ledger.verify_transaction("legacy-tx-1").await;
        assert!(v.valid);
        assert_eq!(v.memo, "Donation to campaign 2");
    }

    #[tokio::test]
    async fn unknown_ids_fall_back_to_format_check() {
        let ledger = MockLedger::default();
        assert!(ledger.verify_transaction("0.0.777").await.valid);
        assert!(!ledger.verify_transaction("garbage").await.valid);
        assert!(!ledger.verify_transaction("").await.valid);
    }

    #[tokio::test]
    async fn counter_starts_at_seed() {
        let config = LedgerConfig {
            transaction_seed: 100,
            ..LedgerConfig::default()
        };
        let ledger = MockLedger::new(config);
        let id = ledger
            .issue_transaction_id(TxScope::CampaignCreation {
                campaign_name: "x".to_string(),
            })
            .await;
        assert_eq!(id.as_str(), "0.0.100");
    }

    #[tokio::test]
    async fn accounts_and_reports_are_fabricated() {
        let ledger = MockLedger::default();
        let account = ledger.issue_account().await;
        assert!(is_well_formed(&account.account_id));
        assert!(account.private_key.starts_with("mock-private-key-"));

        let receipt = ledger.verify_report(3, "01HREPORT").await;
        assert!(receipt.success);
        assert_eq!(receipt.consensus_node, "0.0.3");
        assert_eq!(receipt.campaign_id, 3);
    }
}
