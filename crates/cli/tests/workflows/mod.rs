//! Workflow integration tests
//!
//! End-to-end runs over a synthetic clustered corpus, through both the
//! library entry points and the `sieve` binary.

pub mod edge_cases;
pub mod selection;
