//! Sieve Core - diverse subset selection over fuzzy content fingerprints
//!
//! This crate provides:
//! - Fuzzy fingerprints (byte-shingle SimHash) behind a `Fingerprinter` trait
//! - Corpus enumeration (flat or recursive)
//! - Fingerprint map with a whole-file on-disk cache
//! - Greedy farthest-point selection with running minima
//! - Run configuration and the shared error type

pub mod config;
pub mod corpus;
pub mod error;
pub mod hash;
pub mod select;
pub mod store;

// Re-export main types for convenience
pub use config::SelectConfig;
pub use corpus::{enumerate, CorpusFile, Enumeration, IdentifierMode};
pub use error::{Error, Result};
pub use hash::{hash_file, Digest, Fingerprinter, SimHasher};
pub use select::{
    target_count, CancelFlag, SelectOptions, SelectionSink, SelectionState, Selector, Slot,
};
pub use store::{FingerprintMap, FingerprintStore};
