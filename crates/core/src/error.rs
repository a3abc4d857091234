//! Error type shared by the sieve-core modules
//!
//! | Variant | Category |
//! |---------|----------|
//! | [`InvalidConfig`](Error::InvalidConfig), [`InputDirectory`](Error::InputDirectory) | Configuration, raised before any hashing |
//! | [`EmptyCorpus`](Error::EmptyCorpus), [`InsufficientCorpus`](Error::InsufficientCorpus) | Corpus size |
//! | [`Hash`](Error::Hash), [`Io`](Error::Io), [`CacheFormat`](Error::CacheFormat) | Storage |
//! | [`UnknownIdentifier`](Error::UnknownIdentifier), [`DuplicateIdentifier`](Error::DuplicateIdentifier) | Resume prefix |
//! | [`Cancelled`](Error::Cancelled) | Cooperative cancellation |
//! | [`Internal`](Error::Internal) | Broken selector contract |

use std::path::PathBuf;
use thiserror::Error;

/// Errors produced by fingerprinting, caching and selection
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("input directory {} does not exist or is not a directory", .0.display())]
    InputDirectory(PathBuf),

    #[error("no fingerprints available: the corpus is empty")]
    EmptyCorpus,

    #[error("corpus too small: {available} fingerprints available, {requested} requested")]
    InsufficientCorpus { available: usize, requested: usize },

    #[error("failed to fingerprint {}", path.display())]
    Hash {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error on {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unrecognized fingerprint cache format: {0}")]
    CacheFormat(String),

    #[error("checkpoint names unknown identifier '{0}'")]
    UnknownIdentifier(String),

    #[error("checkpoint lists identifier '{0}' more than once")]
    DuplicateIdentifier(String),

    #[error("selection cancelled after {selected} picks")]
    Cancelled { selected: usize },

    #[error("internal selector error: {0}")]
    Internal(String),

    #[error("selection sink failed")]
    Sink(#[source] Box<dyn std::error::Error + Send + Sync + 'static>),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result alias used throughout sieve-core
pub type Result<T> = std::result::Result<T, Error>;
