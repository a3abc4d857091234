//! Select a diverse subset of the corpus

use super::CorpusArgs;
use crate::util::{self, ProgressSink};
use anyhow::{Context, Result};
use clap::Args;
use owo_colors::OwoColorize;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use sieve_core::{
    enumerate, target_count, CancelFlag, Error, FingerprintStore, SelectConfig, SelectOptions,
    Selector,
};
use sieve_journal::{write_selection, CheckpointLog};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::info;

#[derive(Args, Debug, Clone, Default)]
pub struct SelectArgs {
    #[command(flatten)]
    pub corpus: CorpusArgs,

    /// Keep 1/N of the corpus (default: 5)
    #[arg(short = 't', long = "times-less", visible_alias = "timesLess")]
    pub times_less: Option<usize>,

    /// Selection output file (default: ./chosen_files.txt)
    #[arg(short = 'o', long)]
    pub output: Option<PathBuf>,

    /// Checkpoint log path (default: ./chosen_files.checkpoint)
    #[arg(long)]
    pub checkpoint: Option<PathBuf>,

    /// Seed for the first pick (default: random)
    #[arg(long)]
    pub seed: Option<u64>,

    /// Compute distances on a single thread
    #[arg(long)]
    pub no_parallel: bool,

    /// Continue from the checkpoint left by an interrupted run
    #[arg(long)]
    pub resume: bool,

    /// TOML file with run settings; flags take precedence
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl SelectArgs {
    /// Defaults, then the TOML file, then flags
    pub fn into_config(self) -> Result<SelectConfig> {
        let mut config = match &self.config {
            Some(path) => SelectConfig::from_toml_file(path)?,
            None => SelectConfig::default(),
        };

        self.corpus.apply(&mut config);
        if let Some(times_less) = self.times_less {
            config.times_less = times_less;
        }
        if let Some(output) = self.output {
            config.output_path = output;
        }
        if let Some(checkpoint) = self.checkpoint {
            config.checkpoint_path = checkpoint;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        if self.no_parallel {
            config.parallel = false;
        }
        if self.resume {
            config.resume = true;
        }
        Ok(config)
    }
}

/// Outcome of a completed selection run
#[derive(Debug, Clone)]
pub struct SelectSummary {
    pub corpus_size: usize,
    pub selected: Vec<String>,
    pub resumed: usize,
    pub output_path: PathBuf,
    pub elapsed: Duration,
}

/// Run a full selection: validate, fingerprint, select, write, clean up
///
/// The output file is only written once selection has completed; on any
/// failure the checkpoint log is left in place.
pub fn run_select(
    config: &SelectConfig,
    cancel: &CancelFlag,
    show_progress: bool,
) -> Result<SelectSummary> {
    let start = Instant::now();
    config.validate()?;

    // A stale checkpoint is only replaced once selection actually starts
    let prefix = if config.resume {
        let prefix = CheckpointLog::read(&config.checkpoint_path)?;
        info!(
            "Resuming from {} checkpointed picks in {}",
            prefix.len(),
            config.checkpoint_path.display()
        );
        prefix
    } else {
        Vec::new()
    };

    let files = enumerate(&config.input_dir, config.enumeration())?;
    info!("Found {} files under {}", files.len(), config.input_dir.display());

    let fingerprinter = config.fingerprinter();
    let store = FingerprintStore::new(&fingerprinter, config.cache_path.clone())
        .with_cancel_flag(cancel.clone());
    let bar = util::progress_bar(files.len() as u64, "Fingerprinting", show_progress);
    let map = store
        .compute_or_load(&files, |_| bar.inc(1))
        .context("Fingerprinting stopped; checkpoint left untouched")?;
    bar.finish_and_clear();

    if map.is_empty() {
        return Err(Error::EmptyCorpus.into());
    }
    let k = target_count(map.len(), config.times_less);
    if let Some(unknown) = prefix.iter().find(|id| map.index_of(id).is_none()) {
        // Fail before the checkpoint is truncated
        return Err(Error::UnknownIdentifier(unknown.clone()))
            .context("Checkpoint does not match the fingerprint map");
    }
    if cancel.is_cancelled() {
        return Err(Error::Cancelled { selected: 0 })
            .context("Interrupted before selection; checkpoint left untouched");
    }

    let mut rng = match config.seed {
        Some(seed) => ChaCha8Rng::seed_from_u64(seed),
        None => ChaCha8Rng::from_entropy(),
    };

    let resumed = prefix.len();
    let mut log = CheckpointLog::open(&config.checkpoint_path)?;
    let bar = util::progress_bar(k as u64, "Selecting", show_progress);
    let selected = Selector::new(&map, &fingerprinter)
        .with_options(SelectOptions {
            parallel: config.parallel,
        })
        .with_cancel_flag(cancel.clone())
        .resume(prefix)
        .run(k, &mut rng, &mut ProgressSink::new(&mut log, &bar))
        .with_context(|| {
            format!(
                "Selection stopped; picks so far are kept in {}",
                config.checkpoint_path.display()
            )
        })?;
    bar.finish_and_clear();
    drop(log);

    write_selection(&config.output_path, &selected)?;
    CheckpointLog::clear(&config.checkpoint_path)?;

    Ok(SelectSummary {
        corpus_size: map.len(),
        selected,
        resumed,
        output_path: config.output_path.clone(),
        elapsed: start.elapsed(),
    })
}

pub async fn run(args: SelectArgs, show_progress: bool) -> Result<()> {
    let config = args.into_config()?;
    let cancel = CancelFlag::new();

    let interrupt = util::watch_interrupts(cancel.clone());
    let job = tokio::task::spawn_blocking(move || run_select(&config, &cancel, show_progress));
    let result = job.await.context("Selection task panicked")?;
    interrupt.abort();

    let summary = result?;
    if show_progress {
        print_summary(&summary);
    }
    Ok(())
}

fn print_summary(summary: &SelectSummary) {
    println!("{}", "Selection Complete".green().bold());
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("Corpus files:   {}", summary.corpus_size.to_string().yellow());
    println!("Chosen files:   {}", summary.selected.len().to_string().yellow());
    if summary.resumed > 0 {
        println!("Resumed picks:  {}", summary.resumed.to_string().yellow());
    }
    println!("Output:         {}", summary.output_path.display());
    println!(
        "Elapsed:        {}",
        util::format_elapsed(summary.elapsed).dimmed()
    );
}
