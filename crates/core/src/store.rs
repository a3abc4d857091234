//! Fingerprint map and its on-disk cache
//!
//! The cache is a single file, loaded or rebuilt wholesale:
//! ```text
//! magic: "SVF1" (4 bytes)
//! body:  zstd(bincode(Vec<(identifier, digest)>))
//! ```
//! Entries keep enumeration order, which is the canonical index order
//! used by the selector.

use crate::corpus::CorpusFile;
use crate::error::{Error, Result};
use crate::hash::{hash_file, Digest, Fingerprinter};
use crate::select::CancelFlag;
use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

const CACHE_MAGIC: [u8; 4] = *b"SVF1";
const CACHE_ZSTD_LEVEL: i32 = 3;

/// Insertion-ordered identifier -> digest mapping
#[derive(Debug, Clone, Default)]
pub struct FingerprintMap {
    entries: Vec<(String, Digest)>,
    index: AHashMap<String, usize>,
}

impl FingerprintMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a digest, returning the one it replaced
    ///
    /// A repeated identifier overwrites the earlier digest but keeps the
    /// earlier position.
    pub fn insert(&mut self, identifier: String, digest: Digest) -> Option<Digest> {
        if let Some(&pos) = self.index.get(&identifier) {
            warn!("Identifier collision on '{}': overwriting earlier digest", identifier);
            let previous = std::mem::replace(&mut self.entries[pos].1, digest);
            return Some(previous);
        }
        self.index.insert(identifier.clone(), self.entries.len());
        self.entries.push((identifier, digest));
        None
    }

    pub fn get(&self, identifier: &str) -> Option<&Digest> {
        self.index.get(identifier).map(|&pos| &self.entries[pos].1)
    }

    /// Canonical index of an identifier
    pub fn index_of(&self, identifier: &str) -> Option<usize> {
        self.index.get(identifier).copied()
    }

    pub fn identifier(&self, index: usize) -> &str {
        &self.entries[index].0
    }

    pub fn digest(&self, index: usize) -> &Digest {
        &self.entries[index].1
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Digest)> {
        self.entries.iter().map(|(id, d)| (id.as_str(), d))
    }

    pub fn identifiers(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(id, _)| id.as_str())
    }

    fn from_entries(entries: Vec<(String, Digest)>) -> Self {
        let mut map = Self::new();
        for (id, digest) in entries {
            map.insert(id, digest);
        }
        map
    }
}

impl PartialEq for FingerprintMap {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl Eq for FingerprintMap {}

#[derive(Serialize, Deserialize)]
struct CacheBody {
    entries: Vec<(String, Digest)>,
}

/// Read a cache file
pub fn load(path: &Path) -> Result<FingerprintMap> {
    let bytes = std::fs::read(path).map_err(|e| Error::io(path, e))?;
    if bytes.len() < CACHE_MAGIC.len() || bytes[..CACHE_MAGIC.len()] != CACHE_MAGIC {
        return Err(Error::CacheFormat(format!(
            "{} is missing the SVF1 header",
            path.display()
        )));
    }

    let raw = zstd::decode_all(&bytes[CACHE_MAGIC.len()..])
        .map_err(|e| Error::CacheFormat(format!("decompress: {}", e)))?;
    let body: CacheBody = bincode::deserialize(&raw)
        .map_err(|e| Error::CacheFormat(format!("decode: {}", e)))?;

    Ok(FingerprintMap::from_entries(body.entries))
}

/// Write a cache file atomically
pub fn save(map: &FingerprintMap, path: &Path) -> Result<()> {
    let body = CacheBody {
        entries: map.entries.clone(),
    };
    let raw = bincode::serialize(&body)
        .map_err(|e| Error::CacheFormat(format!("encode: {}", e)))?;
    let compressed =
        zstd::encode_all(raw.as_slice(), CACHE_ZSTD_LEVEL).map_err(|e| Error::io(path, e))?;

    let mut data = Vec::with_capacity(CACHE_MAGIC.len() + compressed.len());
    data.extend_from_slice(&CACHE_MAGIC);
    data.extend_from_slice(&compressed);
    atomic_write(path, &data)
}

/// Load a cache, degrading to an empty map on any failure
pub fn load_or_empty(path: &Path) -> FingerprintMap {
    if !path.exists() {
        warn!("Fingerprint cache {} not found, recomputing", path.display());
        return FingerprintMap::new();
    }
    match load(path) {
        Ok(map) => map,
        Err(e) => {
            warn!("Fingerprint cache {} unusable ({}), recomputing", path.display(), e);
            FingerprintMap::new()
        }
    }
}

/// Atomic write helper
///
/// Writes to a temporary file in the target's directory, fsyncs it, then
/// renames it over the target. Readers see either the old or new content.
pub fn atomic_write(target: &Path, data: &[u8]) -> Result<()> {
    let dir = match target.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };

    let mut tmp = tempfile::NamedTempFile::new_in(&dir).map_err(|e| Error::io(&dir, e))?;
    tmp.write_all(data).map_err(|e| Error::io(tmp.path(), e))?;
    tmp.as_file().sync_all().map_err(|e| Error::io(tmp.path(), e))?;
    tmp.persist(target).map_err(|e| Error::io(target, e.error))?;
    Ok(())
}

/// Computes fingerprints for a corpus, backed by an optional cache file
pub struct FingerprintStore<'a, F: Fingerprinter + ?Sized> {
    fingerprinter: &'a F,
    cache_path: Option<PathBuf>,
    cancel: CancelFlag,
}

impl<'a, F: Fingerprinter + ?Sized> FingerprintStore<'a, F> {
    pub fn new(fingerprinter: &'a F, cache_path: Option<PathBuf>) -> Self {
        Self {
            fingerprinter,
            cache_path,
            cancel: CancelFlag::new(),
        }
    }

    /// Stop hashing once `cancel` is set; checked before every file
    pub fn with_cancel_flag(mut self, cancel: CancelFlag) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn cache_path(&self) -> Option<&Path> {
        self.cache_path.as_deref()
    }

    /// Use a valid cache as-is, otherwise fingerprint `files` and persist
    ///
    /// A loaded cache is trusted even if it does not cover `files`.
    /// `on_file` is called after each file is hashed.
    pub fn compute_or_load(
        &self,
        files: &[CorpusFile],
        on_file: impl FnMut(&CorpusFile),
    ) -> Result<FingerprintMap> {
        if let Some(path) = &self.cache_path {
            let cached = load_or_empty(path);
            if !cached.is_empty() {
                info!("Loaded {} fingerprints from {}", cached.len(), path.display());
                return Ok(cached);
            }
        }
        self.compute(files, on_file)
    }

    /// Fingerprint every file, then persist if a cache path is set
    ///
    /// Aborts on the first unreadable file or on cancellation; nothing is
    /// written in either case.
    pub fn compute(
        &self,
        files: &[CorpusFile],
        mut on_file: impl FnMut(&CorpusFile),
    ) -> Result<FingerprintMap> {
        let mut map = FingerprintMap::new();
        for file in files {
            if self.cancel.is_cancelled() {
                warn!("Fingerprinting cancelled after {} of {} files", map.len(), files.len());
                return Err(Error::Cancelled { selected: 0 });
            }
            let digest = hash_file(self.fingerprinter, &file.path)?;
            debug!("{} -> {}", file.identifier, digest);
            map.insert(file.identifier.clone(), digest);
            on_file(file);
        }
        info!("Fingerprinted {} files", map.len());

        if let Some(path) = &self.cache_path {
            save(&map, path)?;
            info!("Saved fingerprint cache to {}", path.display());
        }
        Ok(map)
    }
}
