//! Checkpoint log and selection output
//!
//! This crate provides:
//! - Append-only, fsync-per-record checkpoint log of selection decisions
//! - Read-back of a checkpoint left behind by an interrupted run
//! - Atomic writer for the final selection list

pub mod checkpoint;
pub mod output;

// Re-exports
pub use checkpoint::CheckpointLog;
pub use output::write_selection;

/// Result type for journal operations
pub type Result<T> = anyhow::Result<T>;
