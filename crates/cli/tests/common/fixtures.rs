//! Synthetic corpora for workflow tests
//!
//! Files are generated in clusters: every member of a cluster is a small
//! edit of the same random base document, while different clusters share
//! nothing. A diverse selection should therefore touch many clusters.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use sieve_core::SelectConfig;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const DOC_LEN: usize = 2048;
const EDITS_PER_VARIANT: usize = 6;

/// A corpus directory plus scratch paths for cache, checkpoint and output
pub struct TestCorpus {
    temp_dir: TempDir,
}

impl TestCorpus {
    /// Empty corpus directory
    pub fn empty() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        fs::create_dir_all(temp_dir.path().join("corpus")).expect("Failed to create corpus dir");
        Self { temp_dir }
    }

    /// `clusters` groups of `per_cluster` near-duplicate files, named
    /// `c<cluster>/v<variant>.txt`
    pub fn clustered(clusters: usize, per_cluster: usize) -> Self {
        let corpus = Self::empty();
        let mut rng = ChaCha8Rng::seed_from_u64(0x5eed);

        for c in 0..clusters {
            let base: Vec<u8> = (0..DOC_LEN).map(|_| rng.gen_range(b'a'..=b'z')).collect();
            for v in 0..per_cluster {
                let mut doc = base.clone();
                for _ in 0..EDITS_PER_VARIANT {
                    let at = rng.gen_range(0..DOC_LEN);
                    doc[at] = rng.gen_range(b'a'..=b'z');
                }
                corpus.write(&format!("c{:02}/v{:02}.txt", c, v), &doc);
            }
        }
        corpus
    }

    /// Write a corpus file, creating parent directories
    pub fn write(&self, rel: &str, content: &[u8]) {
        let path = self.corpus_dir().join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent dir");
        }
        fs::write(path, content).expect("Failed to write corpus file");
    }

    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn corpus_dir(&self) -> PathBuf {
        self.root().join("corpus")
    }

    pub fn cache_path(&self) -> PathBuf {
        self.root().join("fingerprints.bin")
    }

    pub fn checkpoint_path(&self) -> PathBuf {
        self.root().join("chosen.checkpoint")
    }

    pub fn output_path(&self) -> PathBuf {
        self.root().join("chosen.txt")
    }

    /// Config pointing every path into this corpus' scratch dir
    pub fn config(&self, times_less: usize, seed: u64) -> SelectConfig {
        SelectConfig {
            input_dir: self.corpus_dir(),
            times_less,
            cache_path: Some(self.cache_path()),
            output_path: self.output_path(),
            checkpoint_path: self.checkpoint_path(),
            seed: Some(seed),
            ..SelectConfig::default()
        }
    }

    /// Lines of the output file
    pub fn read_output(&self) -> Vec<String> {
        fs::read_to_string(self.output_path())
            .expect("Failed to read output")
            .lines()
            .map(str::to_string)
            .collect()
    }
}

/// Distinct cluster prefixes (`cNN`) among identifiers
pub fn clusters_of(identifiers: &[String]) -> BTreeSet<String> {
    identifiers
        .iter()
        .filter_map(|id| id.split('/').next())
        .map(str::to_string)
        .collect()
}
