//! Fuzzy content fingerprints
//!
//! A [`Digest`] is a 256-bit locality-sensitive fingerprint: files with
//! similar byte content produce digests with a small Hamming distance.
//! The selector only depends on the [`Fingerprinter`] trait, so any fuzzy
//! hash with a symmetric distance can be plugged in.

use crate::error::{Error, Result};
use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// Digest width in bytes
pub const DIGEST_LEN: usize = 32;

/// Files above this size are memory-mapped instead of read into a buffer
const MMAP_THRESHOLD: u64 = 4 * 1024 * 1024;

/// A fixed-size fuzzy fingerprint
#[derive(Copy, Clone, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
pub struct Digest([u8; DIGEST_LEN]);

impl Digest {
    /// Digest of empty content
    pub const ZERO: Digest = Digest([0; DIGEST_LEN]);

    pub const fn from_bytes(bytes: [u8; DIGEST_LEN]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; DIGEST_LEN] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    pub fn from_hex(s: &str) -> std::result::Result<Self, hex::FromHexError> {
        let mut bytes = [0u8; DIGEST_LEN];
        hex::decode_to_slice(s, &mut bytes)?;
        Ok(Self(bytes))
    }

    /// Number of differing bits
    pub fn hamming(&self, other: &Digest) -> u32 {
        self.0
            .iter()
            .zip(other.0.iter())
            .map(|(a, b)| (a ^ b).count_ones())
            .sum()
    }
}

impl std::fmt::Debug for Digest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Digest({})", self.to_hex())
    }
}

impl std::fmt::Display for Digest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

/// A fuzzy hash: content -> digest, digest x digest -> dissimilarity
///
/// Implementations must keep `distance` symmetric with `distance(x, x) == 0`.
pub trait Fingerprinter: Send + Sync {
    fn digest(&self, data: &[u8]) -> Digest;

    fn distance(&self, a: &Digest, b: &Digest) -> u32;
}

/// Byte-shingle SimHash over 256 bits
///
/// Every distinct shingle of `shingle_len` bytes is expanded to 256
/// pseudo-random bits with BLAKE3 and voted into per-bit accumulators,
/// weighted by how often the shingle occurs. Distance is Hamming distance.
#[derive(Debug, Clone, Copy)]
pub struct SimHasher {
    shingle_len: usize,
}

impl SimHasher {
    pub const DEFAULT_SHINGLE_LEN: usize = 4;
    pub const MAX_SHINGLE_LEN: usize = 8;

    /// `shingle_len` is clamped to `1..=8` so a shingle packs into a u64
    pub fn new(shingle_len: usize) -> Self {
        Self {
            shingle_len: shingle_len.clamp(1, Self::MAX_SHINGLE_LEN),
        }
    }

    pub fn shingle_len(&self) -> usize {
        self.shingle_len
    }
}

impl Default for SimHasher {
    fn default() -> Self {
        Self::new(Self::DEFAULT_SHINGLE_LEN)
    }
}

fn pack_shingle(window: &[u8]) -> u64 {
    window.iter().fold(0u64, |acc, &b| (acc << 8) | u64::from(b))
}

impl Fingerprinter for SimHasher {
    fn digest(&self, data: &[u8]) -> Digest {
        if data.is_empty() {
            return Digest::ZERO;
        }

        // Inputs shorter than a shingle count as one shingle
        let width = self.shingle_len.min(data.len());
        let mut counts: AHashMap<u64, i64> = AHashMap::new();
        for window in data.windows(width) {
            *counts.entry(pack_shingle(window)).or_insert(0) += 1;
        }

        let mut votes = [0i64; DIGEST_LEN * 8];
        for (shingle, weight) in counts {
            let bits = blake3::hash(&shingle.to_le_bytes());
            for (byte_idx, byte) in bits.as_bytes().iter().enumerate() {
                for bit in 0..8 {
                    let vote = &mut votes[byte_idx * 8 + bit];
                    if (byte >> bit) & 1 == 1 {
                        *vote += weight;
                    } else {
                        *vote -= weight;
                    }
                }
            }
        }

        let mut out = [0u8; DIGEST_LEN];
        for (slot, vote) in votes.iter().enumerate() {
            if *vote > 0 {
                out[slot / 8] |= 1 << (slot % 8);
            }
        }
        Digest(out)
    }

    fn distance(&self, a: &Digest, b: &Digest) -> u32 {
        a.hamming(b)
    }
}

/// Fingerprint a file's full contents
///
/// Small files are read into memory; files above 4 MiB are memory-mapped.
/// Any I/O failure is reported as [`Error::Hash`] naming the file.
pub fn hash_file<F: Fingerprinter + ?Sized>(fp: &F, path: &Path) -> Result<Digest> {
    let wrap = |source| Error::Hash {
        path: path.to_path_buf(),
        source,
    };

    let file = File::open(path).map_err(wrap)?;
    let len = file.metadata().map_err(wrap)?.len();

    if len > MMAP_THRESHOLD {
        // SAFETY: read-only map dropped before return; the corpus is not
        // expected to change while it is being fingerprinted.
        let mmap = unsafe { memmap2::Mmap::map(&file) }.map_err(wrap)?;
        return Ok(fp.digest(&mmap));
    }

    let mut data = Vec::with_capacity(len as usize);
    BufReader::new(file).read_to_end(&mut data).map_err(wrap)?;
    Ok(fp.digest(&data))
}
