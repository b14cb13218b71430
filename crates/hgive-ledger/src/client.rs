//! Ledger client seam
//!
//! Everything the dashboard needs from a distributed ledger goes through
//! [`LedgerClient`]. Callers never build identifiers themselves, so a
//! networked client can replace the mock without touching them.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque ledger transaction identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionId(String);

impl TransactionId {
    #[inline]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[inline]
    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<TransactionId> for String {
    fn from(id: TransactionId) -> Self {
        id.0
    }
}

/// What a transaction is for; becomes its memo
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TxScope {
    /// Donation to a campaign
    Donation { campaign_id: u64 },
    /// Campaign registration
    CampaignCreation { campaign_name: String },
    /// Proof of milestone completion
    MilestoneProof { campaign_id: u64, milestone_id: u64 },
}

impl TxScope {
    /// Memo recorded with the transaction
    #[must_use]
    pub fn memo(&self) -> String {
        match self {
            TxScope::Donation { campaign_id } => format!("Donation to campaign {campaign_id}"),
            TxScope::CampaignCreation { campaign_name } => {
                format!("Campaign created: {campaign_name}")
            }
            TxScope::MilestoneProof {
                campaign_id,
                milestone_id,
            } => format!("Proof for milestone {milestone_id} of campaign {campaign_id}"),
        }
    }
}

/// Result of checking a transaction id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verification {
    pub transaction_id: String,
    pub valid: bool,
    pub memo: String,
    pub timestamp: DateTime<Utc>,
}

/// Fabricated account with key material
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountCredentials {
    pub account_id: String,
    pub private_key: String,
    pub public_key: String,
}

/// Consensus receipt for an impact report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportVerification {
    pub campaign_id: u64,
    pub report_id: String,
    pub success: bool,
    pub timestamp: DateTime<Utc>,
    pub consensus_node: String,
    pub topic_id: String,
}

/// Operations the dashboard performs against a ledger.
///
/// Every method always succeeds and returns a best-effort value.
#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// Issue a transaction id, unique within the running process
    async fn issue_transaction_id(&self, scope: TxScope) -> TransactionId;

    /// Check whether `id` refers to a recorded transaction
    async fn verify_transaction(&self, id: &str) -> Verification;

    /// Create an account for a charity without one
    async fn issue_account(&self) -> AccountCredentials;

    /// Anchor an impact report and return the consensus receipt
    async fn verify_report(&self, campaign_id: u64, report_id: &str) -> ReportVerification;

    /// Implementation name for logs
    fn name(&self) -> &'static str;
}
