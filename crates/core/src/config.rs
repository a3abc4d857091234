//! Run configuration
//!
//! Built from defaults, optionally overlaid by a TOML file, then by CLI
//! flags; [`SelectConfig::validate`] runs once before any hashing starts.

use crate::corpus::{Enumeration, IdentifierMode};
use crate::error::{Error, Result};
use crate::hash::SimHasher;
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const DEFAULT_INPUT_DIR: &str = "./dataset/";
pub const DEFAULT_TIMES_LESS: usize = 5;
pub const DEFAULT_OUTPUT_PATH: &str = "./chosen_files.txt";
pub const DEFAULT_CHECKPOINT_PATH: &str = "./chosen_files.checkpoint";

/// Everything a selection run needs to know
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SelectConfig {
    /// Corpus root (default: `./dataset/`)
    pub input_dir: PathBuf,
    /// Subset size divisor: `k = n / times_less` (default: 5)
    pub times_less: usize,
    /// Fingerprint cache file; caching is off unless a path is given
    pub cache_path: Option<PathBuf>,
    /// Final selection list (default: `./chosen_files.txt`)
    pub output_path: PathBuf,
    /// Per-step progress log (default: `./chosen_files.checkpoint`)
    pub checkpoint_path: PathBuf,
    /// Walk subdirectories (default: true)
    pub recursive: bool,
    /// Key files by relative path or by basename
    pub identifier: IdentifierMode,
    /// SimHash shingle width in bytes, 1..=8 (default: 4)
    pub shingle_len: usize,
    /// Fixed seed for the first pick; entropy when unset
    pub seed: Option<u64>,
    /// Fan the per-step distance pass out over rayon (default: true)
    pub parallel: bool,
    /// Replay an existing checkpoint before continuing (default: false)
    pub resume: bool,
}

impl Default for SelectConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from(DEFAULT_INPUT_DIR),
            times_less: DEFAULT_TIMES_LESS,
            cache_path: None,
            output_path: PathBuf::from(DEFAULT_OUTPUT_PATH),
            checkpoint_path: PathBuf::from(DEFAULT_CHECKPOINT_PATH),
            recursive: true,
            identifier: IdentifierMode::RelativePath,
            shingle_len: SimHasher::DEFAULT_SHINGLE_LEN,
            seed: None,
            parallel: true,
            resume: false,
        }
    }
}

impl SelectConfig {
    /// Load from a TOML file; absent keys keep their defaults
    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        toml::from_str(&text)
            .map_err(|e| Error::InvalidConfig(format!("{}: {}", path.display(), e)))
    }

    /// Reject configurations that cannot produce a run
    pub fn validate(&self) -> Result<()> {
        if self.times_less == 0 {
            return Err(Error::InvalidConfig(
                "times_less must be at least 1".to_string(),
            ));
        }
        if !(1..=SimHasher::MAX_SHINGLE_LEN).contains(&self.shingle_len) {
            return Err(Error::InvalidConfig(format!(
                "shingle_len must be between 1 and {}, got {}",
                SimHasher::MAX_SHINGLE_LEN,
                self.shingle_len
            )));
        }
        if !self.input_dir.is_dir() {
            return Err(Error::InputDirectory(self.input_dir.clone()));
        }
        Ok(())
    }

    pub fn enumeration(&self) -> Enumeration {
        Enumeration {
            recursive: self.recursive,
            identifier: self.identifier,
        }
    }

    pub fn fingerprinter(&self) -> SimHasher {
        SimHasher::new(self.shingle_len)
    }
}
