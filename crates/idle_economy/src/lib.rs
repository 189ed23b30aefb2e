//! Idle Farm Economy
//!
//! Accrual and upgrade engine for an idle farming game:
//! - Fixed asset lines (crops, animals, workers) producing points per block
//! - Floor-division growth curve for production rate and upgrade cost
//! - Explicit accounts owned by the host, advanced by host-supplied block heights
//! - Checked arithmetic throughout; failures are returned, never panicked
//!
//! `PlayerRegistry` is an optional host-side table with admin gating.

pub mod account;
pub mod asset_line;
pub mod config;
pub mod errors;
pub mod registry;
pub mod types;

pub use account::*;
pub use asset_line::*;
pub use config::*;
pub use errors::EconomyError;
pub use registry::*;
pub use types::*;

/// Crate version for API introspection
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
