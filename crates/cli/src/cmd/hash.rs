//! Build or refresh the fingerprint cache without selecting

use super::CorpusArgs;
use crate::util;
use anyhow::{Context, Result};
use clap::Args;
use owo_colors::OwoColorize;
use sieve_core::{enumerate, CancelFlag, FingerprintStore, SelectConfig};
use std::path::PathBuf;
use std::time::Instant;

#[derive(Args, Debug, Clone, Default)]
pub struct HashArgs {
    #[command(flatten)]
    pub corpus: CorpusArgs,
}

/// Outcome of a cache rebuild
#[derive(Debug, Clone)]
pub struct HashSummary {
    pub fingerprints: usize,
    pub cache_path: PathBuf,
}

/// Fingerprint every file and overwrite the cache
///
/// A cancelled run leaves any existing cache as it was.
pub fn run_hash(
    config: &SelectConfig,
    cancel: &CancelFlag,
    show_progress: bool,
) -> Result<HashSummary> {
    config.validate()?;
    let cache_path = config
        .cache_path
        .clone()
        .context("The hash command needs a cache path (pass --cache PATH)")?;

    let files = enumerate(&config.input_dir, config.enumeration())?;
    let fingerprinter = config.fingerprinter();
    let store = FingerprintStore::new(&fingerprinter, Some(cache_path.clone()))
        .with_cancel_flag(cancel.clone());

    let bar = util::progress_bar(files.len() as u64, "Fingerprinting", show_progress);
    let map = store.compute(&files, |_| bar.inc(1))?;
    bar.finish_and_clear();

    Ok(HashSummary {
        fingerprints: map.len(),
        cache_path,
    })
}

pub async fn run(args: HashArgs, show_progress: bool) -> Result<()> {
    let mut config = SelectConfig::default();
    args.corpus.apply(&mut config);

    let cancel = CancelFlag::new();
    let interrupt = util::watch_interrupts(cancel.clone());

    let start = Instant::now();
    let job = tokio::task::spawn_blocking(move || run_hash(&config, &cancel, show_progress));
    let result = job.await.context("Fingerprint task panicked")?;
    interrupt.abort();

    let summary = result?;

    if show_progress {
        println!("{}", "Fingerprint Cache Updated".green().bold());
        println!("Fingerprints:   {}", summary.fingerprints.to_string().yellow());
        println!("Cache:          {}", summary.cache_path.display());
        println!(
            "Elapsed:        {}",
            util::format_elapsed(start.elapsed()).dimmed()
        );
    }
    Ok(())
}
