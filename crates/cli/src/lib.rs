//! Sieve CLI library
//!
//! Command implementations behind the `sieve` binary, exposed so they can
//! be driven directly from integration tests.

pub mod cmd;
pub mod util;

pub use cmd::hash::{run_hash, HashSummary};
pub use cmd::select::{run_select, SelectSummary};
