//! HederaGive Ledger
//!
//! The trust layer seam of the dashboard. [`LedgerClient`] describes what
//! the pages need from a ledger; [`MockLedger`] is the in-memory stand-in
//! that fabricates ids and verification results.
//!
//! # Example
//!
//! ```rust,ignore
//! use hgive_ledger::{LedgerClient, MockLedger, TxScope};
//!
//! # async fn example() {
//! let ledger = MockLedger::default();
//! let id = ledger.issue_transaction_id(TxScope::Donation { campaign_id: 1 }).await;
//! assert!(ledger.verify_transaction(id.as_str()).await.valid);
//! # }
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod client;
pub mod mock;

pub use client::{
    AccountCredentials, LedgerClient, ReportVerification, TransactionId, TxScope, Verification,
};
pub use mock::{is_well_formed, MockLedger, ID_PREFIX};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
