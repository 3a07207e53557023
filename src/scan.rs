//! Content directory scanning and manifest generation.
//!
//! Stage 1 of the build pipeline. Reads the TOML content files into a typed
//! [`ContentGraph`] plus the merged site config, producing a [`Manifest`] the
//! later stages consume.
//!
//! ## Directory Structure
//!
//! ```text
//! content/
//! ├── config.toml                    # Site configuration (optional)
//! ├── navigation.toml                # Menu taxonomy + conditions directory
//! ├── conditions/
//! │   ├── 010-acne-breakouts.toml    # Numbered = explicit listing order
//! │   └── 020-acne-scars.toml
//! ├── families/
//! │   └── 010-acne-scar-solutions.toml
//! ├── treatments/                    # Sub-treatments
//! │   ├── chemical-peels.toml        # Unnumbered = after numbered, by slug
//! │   └── hydrafacial.toml
//! └── programs/
//!     └── 010-bridal-glow.toml
//! ```
//!
//! ## Slugs
//!
//! A record's slug is its file stem minus the `NNN-` prefix. A file may also
//! state `slug = "..."` explicitly; it must then agree with the filename.
//!
//! ## Validation
//!
//! The scanner enforces file-local rules only: parseable TOML, known keys,
//! URL-safe slugs that match their filenames. Cross-record rules (duplicate
//! slugs, dangling references, menu integrity) belong to
//! [`site::Site::new`](crate::site::Site::new).

use crate::config::{self, SiteConfig};
use crate::content::{
    ConditionContent, ContentGraph, SignatureProgram, SubTreatmentContent, TreatmentFamilyContent,
};
use crate::naming::{is_valid_slug, parse_entry_name};
use crate::taxonomy::NavigationDeclaration;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Directory walk error: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("Parse error in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("Invalid slug '{slug}' from {path} (use lowercase letters, digits and dashes)")]
    InvalidSlug { path: PathBuf, slug: String },
    #[error("Slug '{declared}' in {path} does not match its filename slug '{from_name}'")]
    SlugMismatch {
        path: PathBuf,
        declared: String,
        from_name: String,
    },
    #[error("Content directory not found: {0}")]
    MissingRoot(PathBuf),
}

/// Manifest output from the scan stage.
#[derive(Debug, Serialize, Deserialize)]
pub struct Manifest {
    pub content: ContentGraph,
    pub config: SiteConfig,
}

pub const CONDITIONS_DIR: &str = "conditions";
pub const FAMILIES_DIR: &str = "families";
pub const SUB_TREATMENTS_DIR: &str = "treatments";
pub const PROGRAMS_DIR: &str = "programs";
pub const NAVIGATION_FILE: &str = "navigation.toml";

/// Records whose slug lives in the file as well as in its name.
trait Slugged {
    fn slug_mut(&mut self) -> &mut String;
}

macro_rules! slugged {
    ($($t:ty),*) => {
        $(impl Slugged for $t {
            fn slug_mut(&mut self) -> &mut String {
                &mut self.slug
            }
        })*
    };
}

slugged!(
    ConditionContent,
    SubTreatmentContent,
    TreatmentFamilyContent,
    SignatureProgram
);

pub fn scan(root: &Path) -> Result<Manifest, ScanError> {
    if !root.is_dir() {
        return Err(ScanError::MissingRoot(root.to_path_buf()));
    }

    let content = ContentGraph {
        conditions: load_records(&root.join(CONDITIONS_DIR))?,
        families: load_records(&root.join(FAMILIES_DIR))?,
        sub_treatments: load_records(&root.join(SUB_TREATMENTS_DIR))?,
        programs: load_records(&root.join(PROGRAMS_DIR))?,
        navigation: load_navigation(root)?,
    };

    // Load site config (uses defaults if config.toml doesn't exist)
    let config = config::load_config(root)?;

    debug!(
        conditions = content.conditions.len(),
        families = content.families.len(),
        sub_treatments = content.sub_treatments.len(),
        programs = content.programs.len(),
        "scanned content"
    );

    Ok(Manifest { content, config })
}

fn load_navigation(root: &Path) -> Result<NavigationDeclaration, ScanError> {
    let path = root.join(NAVIGATION_FILE);
    if !path.exists() {
        warn!(path = %path.display(), "no navigation file, menu will be empty");
        return Ok(NavigationDeclaration::default());
    }
    parse_file(&path)
}

/// Load every `*.toml` directly inside `dir`, ordered by `NNN-` prefix then slug.
///
/// A missing directory yields no records.
fn load_records<T>(dir: &Path) -> Result<Vec<T>, ScanError>
where
    T: DeserializeOwned + Slugged,
{
    if !dir.is_dir() {
        debug!(dir = %dir.display(), "content directory absent");
        return Ok(Vec::new());
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
        let entry = entry?;
        let path = entry.path();
        let name = entry.file_name().to_string_lossy();
        if name.starts_with('.') || !entry.file_type().is_file() {
            continue;
        }
        if path.extension().is_none_or(|e| !e.eq_ignore_ascii_case("toml")) {
            continue;
        }
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
        files.push((parse_entry_name(&stem), path.to_path_buf()));
    }

    files.sort_by(|(a, _), (b, _)| {
        a.sort_key()
            .cmp(&b.sort_key())
            .then_with(|| a.slug.cmp(&b.slug))
    });

    let mut records = Vec::with_capacity(files.len());
    for (parsed, path) in files {
        let mut record: T = parse_file(&path)?;
        let slug = record.slug_mut();
        if slug.is_empty() {
            *slug = parsed.slug.clone();
        } else if *slug != parsed.slug {
            return Err(ScanError::SlugMismatch {
                path,
                declared: slug.clone(),
                from_name: parsed.slug,
            });
        }
        if !is_valid_slug(slug) {
            return Err(ScanError::InvalidSlug {
                slug: slug.clone(),
                path,
            });
        }
        records.push(record);
    }
    Ok(records)
}

fn parse_file<T: DeserializeOwned>(path: &Path) -> Result<T, ScanError> {
    let text = fs::read_to_string(path)?;
    toml::from_str(&text).map_err(|source| ScanError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
