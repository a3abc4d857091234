//! CLI command implementations

pub mod hash;
pub mod select;

use clap::Args;
use sieve_core::{IdentifierMode, SelectConfig};
use std::path::PathBuf;

/// Corpus and fingerprint flags shared by every command
#[derive(Args, Debug, Clone, Default)]
pub struct CorpusArgs {
    /// Input dataset folder (default: ./dataset/)
    #[arg(short = 'i', long = "input-folder")]
    pub input: Option<PathBuf>,

    /// Only take files directly inside the input folder
    #[arg(long)]
    pub flat: bool,

    /// Key files by file name instead of relative path
    #[arg(long)]
    pub basename: bool,

    /// SimHash shingle width in bytes, 1-8 (default: 4)
    #[arg(long)]
    pub shingle: Option<usize>,

    /// Fingerprint cache file; reused as-is when it already exists
    #[arg(long, conflicts_with = "no_cache")]
    pub cache: Option<PathBuf>,

    /// Ignore a cache path set in the config file
    #[arg(long)]
    pub no_cache: bool,
}

impl CorpusArgs {
    /// Overlay the flags that were given onto `config`
    pub fn apply(&self, config: &mut SelectConfig) {
        if let Some(input) = &self.input {
            config.input_dir = input.clone();
        }
        if self.flat {
            config.recursive = false;
        }
        if self.basename {
            config.identifier = IdentifierMode::Basename;
        }
        if let Some(shingle) = self.shingle {
            config.shingle_len = shingle;
        }
        if let Some(cache) = &self.cache {
            config.cache_path = Some(cache.clone());
        }
        if self.no_cache {
            config.cache_path = None;
        }
    }
}
