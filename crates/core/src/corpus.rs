//! Corpus enumeration

use crate::error::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// How a file is keyed in the fingerprint map
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdentifierMode {
    /// Path relative to the corpus root, `/`-separated
    #[default]
    RelativePath,
    /// File name only; files sharing a name collide
    Basename,
}

/// Enumeration options
#[derive(Debug, Clone, Copy)]
pub struct Enumeration {
    pub recursive: bool,
    pub identifier: IdentifierMode,
}

impl Default for Enumeration {
    fn default() -> Self {
        Self {
            recursive: true,
            identifier: IdentifierMode::RelativePath,
        }
    }
}

/// A corpus member: where it lives and what it is called
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorpusFile {
    pub path: PathBuf,
    pub identifier: String,
}

/// List the regular files under `root`, sorted by path
///
/// Hidden entries (leading `.`) are skipped, symlinks are not followed.
pub fn enumerate(root: &Path, opts: Enumeration) -> Result<Vec<CorpusFile>> {
    if !root.is_dir() {
        return Err(Error::InputDirectory(root.to_path_buf()));
    }

    let max_depth = if opts.recursive { usize::MAX } else { 1 };
    let walker = WalkDir::new(root)
        .follow_links(false)
        .max_depth(max_depth)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_hidden(e.file_name()));

    let mut files = Vec::new();
    for entry in walker {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(root).to_path_buf();
            Error::io(path, e.into())
        })?;
        if !entry.file_type().is_file() {
            continue;
        }

        let identifier = identifier_for(root, entry.path(), opts.identifier);
        files.push(CorpusFile {
            path: entry.into_path(),
            identifier,
        });
    }

    Ok(files)
}

fn is_hidden(name: &std::ffi::OsStr) -> bool {
    name.to_str().map(|s| s.starts_with('.')).unwrap_or(false)
}

fn identifier_for(root: &Path, path: &Path, mode: IdentifierMode) -> String {
    match mode {
        IdentifierMode::Basename => path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default(),
        IdentifierMode::RelativePath => {
            let rel = path.strip_prefix(root).unwrap_or(path);
            rel.components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/")
        }
    }
}
