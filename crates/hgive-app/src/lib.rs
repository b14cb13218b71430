//! HederaGive App
//!
//! The application layer of the dashboard:
//! - [`Session`]: per-viewer login state and page selection
//! - [`Router`]: role-gated page selection and rendering
//! - [`pages`]: one controller per page, producing serializable views
//! - [`Console`]: line-oriented front end used by the `hgive` binary
//!
//! Shared state (store, ledger, user directory, configuration) lives in
//! [`AppContext`] and is handed to controllers by reference.

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod console;
pub mod context;
pub mod pages;
pub mod router;
pub mod session;
pub mod users;

pub use console::{Command, CommandError, Console};
pub use context::AppContext;
pub use router::{authorize, nav_options, Outcome, Page, Router, UnknownPage, View};
pub use session::{Session, SessionState};
pub use users::UserDirectory;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
