//! Output cache for incremental builds.
//!
//! Rendering the whole site is cheap; rewriting every file is not free for
//! deploy tooling that syncs by mtime. This module records the SHA-256 of
//! every file the generator writes so an unchanged page is left untouched on
//! the next build.
//!
//! # Design
//!
//! The cache is keyed by output path (relative to the output directory). A
//! write is skipped when:
//! 1. The manifest has an entry for that path with the same content hash
//! 2. The file still exists on disk
//!
//! Anything else (new page, changed copy, deleted output file) writes the file
//! and updates the entry.
//!
//! ## Storage
//!
//! The manifest is a JSON file at `<output_dir>/.build-manifest.json`, so it
//! travels with the output directory when cached in CI.
//!
//! ## Bypassing the cache
//!
//! `--no-cache` loads an empty manifest, so every file is rewritten.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fmt;
use std::io;
use std::path::Path;
use std::sync::Mutex;

/// Name of the cache manifest file within the output directory.
pub const MANIFEST_FILENAME: &str = ".build-manifest.json";

/// Bump to invalidate all existing caches when the format changes.
const MANIFEST_VERSION: u32 = 1;

/// On-disk map of output path → content hash.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheManifest {
    pub version: u32,
    pub entries: HashMap<String, String>,
}

impl CacheManifest {
    /// Create an empty manifest (used for `--no-cache` or first build).
    pub fn empty() -> Self {
        Self {
            version: MANIFEST_VERSION,
            entries: HashMap::new(),
        }
    }

    /// Load from the output directory. Returns an empty manifest if the
    /// file doesn't exist or can't be parsed (version mismatch, corruption).
    pub fn load(output_dir: &Path) -> Self {
        let path = output_dir.join(MANIFEST_FILENAME);
        let Ok(content) = std::fs::read_to_string(&path) else {
            return Self::empty();
        };
        match serde_json::from_str::<Self>(&content) {
            Ok(m) if m.version == MANIFEST_VERSION => m,
            _ => Self::empty(),
        }
    }

    /// Save to the output directory.
    pub fn save(&self, output_dir: &Path) -> io::Result<()> {
        let path = output_dir.join(MANIFEST_FILENAME);
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
    }
}

/// SHA-256 of `bytes` as lowercase hex.
pub fn hash_bytes(bytes: &[u8]) -> String {
    let digest = Sha256::digest(bytes);
    digest.iter().map(|b| format!("{b:02x}")).collect()
}

/// Counts of written vs. skipped files for one build.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub written: u32,
    pub unchanged: u32,
}

impl CacheStats {
    pub fn total(&self) -> u32 {
        self.written + self.unchanged
    }
}

impl fmt::Display for CacheStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.unchanged > 0 {
            write!(f, "{} written, {} unchanged", self.written, self.unchanged)
        } else {
            write!(f, "{} written", self.written)
        }
    }
}

/// Writer shared by rayon workers during one generate run.
#[derive(Debug)]
pub struct OutputWriter<'a> {
    output_dir: &'a Path,
    previous: CacheManifest,
    state: Mutex<(CacheManifest, CacheStats)>,
}

impl<'a> OutputWriter<'a> {
    pub fn new(output_dir: &'a Path, previous: CacheManifest) -> Self {
        Self {
            output_dir,
            previous,
            state: Mutex::new((CacheManifest::empty(), CacheStats::default())),
        }
    }

    /// Write `contents` to `relative` under the output dir unless the previous
    /// build wrote identical bytes there. Returns whether the file was written.
    pub fn write(&self, relative: &str, contents: &[u8]) -> io::Result<bool> {
        let hash = hash_bytes(contents);
        let target = self.output_dir.join(relative);
        let unchanged =
            self.previous.entries.get(relative) == Some(&hash) && target.exists();

        if !unchanged {
            if let Some(parent) = target.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&target, contents)?;
        }

        let mut state = self
            .state
            .lock()
            .map_err(|_| io::Error::other("output writer lock poisoned"))?;
        state.0.entries.insert(relative.to_string(), hash);
        if unchanged {
            state.1.unchanged += 1;
        } else {
            state.1.written += 1;
        }
        Ok(!unchanged)
    }

    /// Consume the writer, returning the manifest for the next build and stats.
    pub fn finish(self) -> io::Result<(CacheManifest, CacheStats)> {
        self.state
            .into_inner()
            .map_err(|_| io::Error::other("output writer lock poisoned"))
    }
}
