//! Shared test utilities for the pragna-site test suite.
//!
//! Provides fixture setup, lookup helpers and menu shape assertions over the
//! scan-phase data (`Manifest`, `ContentGraph`) and the validated `Site`.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = setup_fixtures();
//! let manifest = scan(tmp.path()).unwrap();
//!
//! let peels = find_sub_treatment(&manifest, "chemical-peels");
//! assert_eq!(peels.hero.title, "Chemical Peels");
//!
//! assert_menu_shape(&fixture_site().taxonomy, &[
//!     ("Skin", &["Acne & Scars", "Rejuvenation"]),
//!     ("Hair", &["Laser Hair Reduction"]),
//! ]);
//! ```

use std::path::Path;
use tempfile::TempDir;

use crate::content::{ConditionContent, ContentGraph, SubTreatmentContent, TreatmentFamilyContent};
use crate::registry::ContentRegistry;
use crate::scan::{Manifest, scan};
use crate::site::Site;
use crate::taxonomy::Taxonomy;

// =========================================================================
// Fixture setup
// =========================================================================

/// Copy `fixtures/content/` to a temp directory and return it.
///
/// Tests get an isolated copy they can mutate without affecting other tests
/// or the source fixtures.
pub fn setup_fixtures() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let fixtures = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/content");
    copy_dir_recursive(&fixtures, tmp.path()).unwrap();
    tmp
}

fn copy_dir_recursive(src: &Path, dst: &Path) -> std::io::Result<()> {
    for entry in std::fs::read_dir(src)? {
        let entry = entry?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if src_path.is_dir() {
            std::fs::create_dir_all(&dst_path)?;
            copy_dir_recursive(&src_path, &dst_path)?;
        } else {
            std::fs::copy(&src_path, &dst_path)?;
        }
    }
    Ok(())
}

/// Scan the fixtures.
pub fn fixture_manifest() -> Manifest {
    let tmp = setup_fixtures();
    scan(tmp.path()).unwrap()
}

/// The scanned fixture content graph, unvalidated.
pub fn fixture_graph() -> ContentGraph {
    fixture_manifest().content
}

pub fn fixture_registry() -> ContentRegistry {
    ContentRegistry::new(fixture_graph()).unwrap()
}

/// Fixtures validated into a `Site`.
pub fn fixture_site() -> Site {
    Site::new(fixture_manifest()).unwrap()
}

// =========================================================================
// Manifest lookups, panicking with a clear message on a miss
// =========================================================================

/// Find a condition by slug. Panics if not found.
pub fn find_condition<'a>(manifest: &'a Manifest, slug: &str) -> &'a ConditionContent {
    manifest
        .content
        .conditions
        .iter()
        .find(|c| c.slug == slug)
        .unwrap_or_else(|| {
            let slugs = condition_slugs(manifest);
            panic!("condition '{slug}' not found. Available: {slugs:?}")
        })
}

/// Find a sub-treatment by slug. Panics if not found.
pub fn find_sub_treatment<'a>(manifest: &'a Manifest, slug: &str) -> &'a SubTreatmentContent {
    manifest
        .content
        .sub_treatments
        .iter()
        .find(|s| s.slug == slug)
        .unwrap_or_else(|| {
            let slugs: Vec<&str> = manifest
                .content
                .sub_treatments
                .iter()
                .map(|s| s.slug.as_str())
                .collect();
            panic!("sub-treatment '{slug}' not found. Available: {slugs:?}")
        })
}

/// Find a treatment family by slug. Panics if not found.
pub fn find_family<'a>(manifest: &'a Manifest, slug: &str) -> &'a TreatmentFamilyContent {
    manifest
        .content
        .families
        .iter()
        .find(|f| f.slug == slug)
        .unwrap_or_else(|| {
            let slugs = family_slugs(manifest);
            panic!("family '{slug}' not found. Available: {slugs:?}")
        })
}

// =========================================================================
// Bulk extractors
// =========================================================================

/// All condition slugs in listing order.
pub fn condition_slugs(manifest: &Manifest) -> Vec<&str> {
    manifest
        .content
        .conditions
        .iter()
        .map(|c| c.slug.as_str())
        .collect()
}

/// All family slugs in listing order.
pub fn family_slugs(manifest: &Manifest) -> Vec<&str> {
    manifest
        .content
        .families
        .iter()
        .map(|f| f.slug.as_str())
        .collect()
}

// =========================================================================
// Menu helpers
// =========================================================================

/// Pillar names in menu order.
pub fn pillar_names(taxonomy: &Taxonomy) -> Vec<&str> {
    taxonomy.pillars.iter().map(|p| p.name.as_str()).collect()
}

/// Category names under a pillar. Panics if the pillar is not found.
pub fn category_names<'a>(taxonomy: &'a Taxonomy, pillar: &str) -> Vec<&'a str> {
    taxonomy
        .pillars
        .iter()
        .find(|p| p.name == pillar)
        .map(|p| p.categories.iter().map(|c| c.name.as_str()).collect())
        .unwrap_or_else(|| {
            let names = pillar_names(taxonomy);
            panic!("pillar '{pillar}' not found. Available: {names:?}")
        })
}

/// Assert that the menu's pillars and their categories match exactly.
///
/// Each entry is `(pillar, categories)`.
pub fn assert_menu_shape(taxonomy: &Taxonomy, expected: &[(&str, &[&str])]) {
    let expected_pillars: Vec<&str> = expected.iter().map(|(p, _)| *p).collect();
    assert_eq!(
        pillar_names(taxonomy),
        expected_pillars,
        "menu pillars mismatch"
    );

    for (pillar, categories) in expected {
        assert_eq!(
            category_names(taxonomy, pillar),
            categories.to_vec(),
            "categories of '{pillar}' mismatch"
        );
    }
}
