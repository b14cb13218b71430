//! HederaGive Store
//!
//! JSON-file persistence for the dashboard:
//! - `campaigns.json` and `donations.json` (required, loaded on open)
//! - `supporters.json` (derived from donations, rebuilt when stale)
//! - `impact_metrics.json` (generated on first use when absent)
//!
//! All mutations go through [`DataStore`], which serializes writers and
//! stages every touched file before committing any of them.

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod assets;
pub mod audit;
pub mod json;
pub mod store;

pub use assets::AssetResolver;
pub use audit::{AuditReport, OrphanDonation, RaisedDiscrepancy};
pub use store::{Collection, DataStore};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
