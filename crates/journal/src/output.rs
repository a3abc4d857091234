//! Final selection list

use crate::Result;
use anyhow::Context;
use sieve_core::store::atomic_write;
use std::path::Path;
use tracing::info;

/// Write the chosen identifiers, one per line, in selection order
///
/// The file is replaced atomically, so a reader never sees a partial list.
/// An empty selection still produces an (empty) file.
pub fn write_selection(path: &Path, identifiers: &[String]) -> Result<()> {
    let mut body = String::with_capacity(identifiers.iter().map(|id| id.len() + 1).sum());
    for id in identifiers {
        body.push_str(id);
        body.push('\n');
    }

    atomic_write(path, body.as_bytes())
        .with_context(|| format!("Failed to write selection to {}", path.display()))?;
    info!("Wrote {} identifiers to {}", identifiers.len(), path.display());
    Ok(())
}
