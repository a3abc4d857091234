//! Append-only checkpoint log of selection decisions
//!
//! One identifier per line, in selection order. Every append is flushed
//! and synced before it returns, so an interrupted run leaves a prefix of
//! real decisions on disk.

use crate::Result;
use anyhow::Context;
use sieve_core::SelectionSink;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Durable per-step record of a selection run
pub struct CheckpointLog {
    path: PathBuf,
    writer: BufWriter<File>,
    records: usize,
}

impl CheckpointLog {
    /// Create a fresh log, truncating any previous one
    pub fn open(path: &Path) -> Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)
            .with_context(|| format!("Failed to open checkpoint log {}", path.display()))?;

        debug!("Opened checkpoint log {}", path.display());
        Ok(Self {
            path: path.to_path_buf(),
            writer: BufWriter::new(file),
            records: 0,
        })
    }

    /// Append one decision and make it durable
    pub fn append(&mut self, identifier: &str) -> Result<()> {
        if identifier.contains('\n') {
            anyhow::bail!("Identifier {:?} cannot be checkpointed: contains a newline", identifier);
        }

        writeln!(self.writer, "{}", identifier)
            .and_then(|_| self.writer.flush())
            .and_then(|_| self.writer.get_ref().sync_data())
            .with_context(|| format!("Failed to append to checkpoint log {}", self.path.display()))?;

        self.records += 1;
        Ok(())
    }

    /// Number of records written by this handle
    pub fn len(&self) -> usize {
        self.records
    }

    pub fn is_empty(&self) -> bool {
        self.records == 0
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the decisions recorded by a previous run
    ///
    /// A missing log reads as empty.
    pub fn read(path: &Path) -> Result<Vec<String>> {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(e).with_context(|| {
                    format!("Failed to read checkpoint log {}", path.display())
                })
            }
        };

        Ok(text
            .lines()
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect())
    }

    /// Remove the log; a missing log is not an error
    pub fn clear(path: &Path) -> Result<()> {
        match std::fs::remove_file(path) {
            Ok(()) => {
                info!("Removed checkpoint log {}", path.display());
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e)
                .with_context(|| format!("Failed to remove checkpoint log {}", path.display())),
        }
    }
}

impl SelectionSink for CheckpointLog {
    fn record(&mut self, identifier: &str) -> sieve_core::Result<()> {
        self.append(identifier)
            .map_err(|e| sieve_core::Error::Sink(e.into()))
    }
}
