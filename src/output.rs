//! CLI output formatting for all pipeline stages.
//!
//! # Information-First Display
//!
//! Output is **information-centric, not file-centric**. Every record is shown
//! by positional index and title first, with its slug or route as indented
//! context. The output reads as a content inventory while still letting
//! authors trace a line back to the file that produced it.
//!
//! # Output Format
//!
//! ## Scan
//!
//! ```text
//! Conditions
//! 001 Acne & Breakouts
//!     Slug: acne-breakouts
//!
//! Treatment families
//! 001 Acne & Acne Scar Solutions (2 sub-treatments)
//!     Slug: acne-scar-solutions
//!     001 Chemical Peels
//!     002 Microneedling
//!
//! Signature programs
//! 001 Bridal Glow (3 treatments)
//!     Slug: bridal-glow
//! ```
//!
//! ## Check
//!
//! ```text
//! Skin
//!     Acne & Scars
//!         Chemical Peels → /treatments/acne-scar-solutions/chemical-peels (sub-treatment)
//!
//! Content OK: 3 conditions, 5 families, 7 sub-treatments, 2 programs
//! Menu OK: 5 pillars, 12 items, 3 directory conditions
//! ```
//!
//! ## Generate
//!
//! ```text
//! / → Pragna Skin & Hair Clinic
//! /conditions/acne-breakouts → Acne & Breakouts
//! /treatments/skin-rejuvenation/peel-lite → Treatment (placeholder)
//!
//! Generated 21 pages (1 placeholder), sitemap with 21 URLs
//! Files: 24 written
//! ```
//!
//! # Architecture
//!
//! Each stage has a `format_*` function (returns `Vec<String>`) for testability
//! and a `print_*` wrapper that writes to stdout. Format functions are pure:
//! no I/O, no side effects.

use crate::booking::BookingReceipt;
use crate::content::ContentGraph;
use crate::generate::GenerateReport;
use crate::scan::Manifest;
use crate::site::Site;
use crate::taxonomy::Taxonomy;

// ============================================================================
// Shared entity display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Format an entity header: positional index + title, with optional count.
///
/// ```text
/// 001 Acne & Acne Scar Solutions (2 sub-treatments)
/// 001 Acne & Breakouts
/// ```
fn entity_header(index: usize, title: &str, count: Option<(usize, &str)>) -> String {
    match count {
        Some((n, noun)) => format!("{} {} ({} {})", format_index(index), title, n, noun),
        None => format!("{} {}", format_index(index), title),
    }
}

/// Truncate text to `max` characters, appending `...` if truncated.
fn truncate_desc(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((end, _)) => format!("{}...", &text[..end]),
        None => text.to_string(),
    }
}

fn sub_treatment_title<'a>(graph: &'a ContentGraph, slug: &'a str) -> &'a str {
    graph
        .sub_treatments
        .iter()
        .find(|s| s.slug == slug)
        .map(|s| s.hero.title.as_str())
        .unwrap_or(slug)
}

// ============================================================================
// Stage 1: Scan output
// ============================================================================

/// Format scan stage output showing the discovered content.
pub fn format_scan_output(manifest: &Manifest) -> Vec<String> {
    let graph = &manifest.content;
    let mut lines = Vec::new();

    lines.push("Conditions".to_string());
    for (i, condition) in graph.conditions.iter().enumerate() {
        lines.push(entity_header(i + 1, &condition.hero.title, None));
        lines.push(format!("{}Slug: {}", indent(1), condition.slug));
        let empathy = truncate_desc(condition.hero.empathy.trim(), 60);
        if !empathy.is_empty() {
            lines.push(format!("{}{}", indent(1), empathy));
        }
    }

    lines.push(String::new());
    lines.push("Treatment families".to_string());
    for (i, family) in graph.families.iter().enumerate() {
        lines.push(entity_header(
            i + 1,
            &family.hero.title,
            Some((family.sub_treatments.len(), "sub-treatments")),
        ));
        lines.push(format!("{}Slug: {}", indent(1), family.slug));
        for (j, slug) in family.sub_treatments.iter().enumerate() {
            lines.push(format!(
                "{}{} {}",
                indent(1),
                format_index(j + 1),
                sub_treatment_title(graph, slug)
            ));
        }
    }

    // Sub-treatments no family lists have no page; surface them.
    let orphans: Vec<&str> = graph
        .sub_treatments
        .iter()
        .filter(|s| !graph.families.iter().any(|f| f.sub_treatments.contains(&s.slug)))
        .map(|s| s.slug.as_str())
        .collect();
    if !orphans.is_empty() {
        lines.push(format!("{}Unlisted: {}", indent(1), orphans.join(", ")));
    }

    if !graph.programs.is_empty() {
        lines.push(String::new());
        lines.push("Signature programs".to_string());
        for (i, program) in graph.programs.iter().enumerate() {
            lines.push(entity_header(
                i + 1,
                &program.hero.title,
                Some((program.includes.len(), "treatments")),
            ));
            lines.push(format!("{}Slug: {}", indent(1), program.slug));
        }
    }

    lines.push(String::new());
    lines.push("Config".to_string());
    lines.push(format!("{}Site: {}", indent(1), manifest.config.site.name));
    lines.push(format!("{}Base URL: {}", indent(1), manifest.config.site.base_url));
    let endpoint = &manifest.config.booking.endpoint;
    lines.push(format!(
        "{}Booking: {}",
        indent(1),
        if endpoint.is_empty() { "(disabled)" } else { endpoint.as_str() }
    ));

    lines
}

/// Print scan output to stdout.
pub fn print_scan_output(manifest: &Manifest) {
    for line in format_scan_output(manifest) {
        println!("{}", line);
    }
}

// ============================================================================
// Check output
// ============================================================================

/// Format the resolved menu tree.
pub fn format_taxonomy(taxonomy: &Taxonomy) -> Vec<String> {
    let mut lines = Vec::new();
    for pillar in &taxonomy.pillars {
        lines.push(pillar.name.clone());
        for category in &pillar.categories {
            lines.push(format!("{}{}", indent(1), category.name));
            for item in &category.items {
                lines.push(format!(
                    "{}{} \u{2192} {} ({})",
                    indent(2),
                    item.name,
                    item.href,
                    item.target.kind()
                ));
            }
        }
    }
    lines
}

/// Format the result of a successful integrity check.
pub fn format_check_output(site: &Site) -> Vec<String> {
    let graph = site.registry.graph();
    let mut lines = format_taxonomy(&site.taxonomy);
    lines.push(String::new());
    lines.push(format!(
        "Content OK: {} conditions, {} families, {} sub-treatments, {} programs",
        graph.conditions.len(),
        graph.families.len(),
        graph.sub_treatments.len(),
        graph.programs.len()
    ));
    lines.push(format!(
        "Menu OK: {} pillars, {} items, {} directory conditions",
        site.taxonomy.pillars.len(),
        site.taxonomy.items().count(),
        site.taxonomy.conditions.len()
    ));
    lines
}

pub fn print_check_output(site: &Site) {
    for line in format_check_output(site) {
        println!("{}", line);
    }
}

// ============================================================================
// Generate output
// ============================================================================

/// Format generate stage output: one line per route, then totals.
pub fn format_generate_output(report: &GenerateReport) -> Vec<String> {
    let mut lines = Vec::new();
    for (path, title, placeholder) in &report.pages {
        let marker = if *placeholder { " (placeholder)" } else { "" };
        lines.push(format!("{} \u{2192} {}{}", path, title, marker));
    }

    let placeholders = report.pages.iter().filter(|(_, _, p)| *p).count();
    lines.push(String::new());
    let summary = if placeholders > 0 {
        format!("{} pages ({} placeholder)", report.pages.len(), placeholders)
    } else {
        format!("{} pages", report.pages.len())
    };
    lines.push(format!(
        "Generated {}, sitemap with {} URLs",
        summary, report.sitemap_entries
    ));
    lines.push(format!("Files: {}", report.stats));
    lines
}

/// Print generate output to stdout.
pub fn print_generate_output(report: &GenerateReport) {
    for line in format_generate_output(report) {
        println!("{}", line);
    }
}

// ============================================================================
// Booking output
// ============================================================================

pub fn format_booking_output(receipt: &BookingReceipt) -> Vec<String> {
    vec![format!("Booking accepted: {}", receipt.message)]
}

pub fn print_booking_output(receipt: &BookingReceipt) {
    for line in format_booking_output(receipt) {
        println!("{}", line);
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::CacheStats;
    use crate::scan::scan;
    use crate::test_helpers::*;

    #[test]
    fn format_index_pads() {
        assert_eq!(format_index(1), "001");
        assert_eq!(format_index(42), "042");
        assert_eq!(format_index(1234), "1234");
    }

    #[test]
    fn indent_levels() {
        assert_eq!(indent(0), "");
        assert_eq!(indent(2), "        ");
    }

    #[test]
    fn entity_header_with_and_without_count() {
        assert_eq!(entity_header(1, "Acne", None), "001 Acne");
        assert_eq!(
            entity_header(2, "Lasers", Some((3, "sub-treatments"))),
            "002 Lasers (3 sub-treatments)"
        );
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate_desc("short", 10), "short");
        assert_eq!(truncate_desc("ééééé", 3), "ééé...");
    }

    #[test]
    fn scan_output_lists_sections() {
        let tmp = setup_fixtures();
        let manifest = scan(tmp.path()).unwrap();
        let lines = format_scan_output(&manifest);

        assert_eq!(lines[0], "Conditions");
        assert_eq!(lines[1], "001 Acne & Breakouts");
        assert_eq!(lines[2], "    Slug: acne-breakouts");
        assert!(lines.iter().any(|l| l == "Treatment families"));
        assert!(lines.iter().any(|l| l == "Signature programs"));
        assert!(lines.iter().any(|l| l.contains("(2 sub-treatments)")));
        assert!(lines.iter().any(|l| l == "    001 Chemical Peels"));
        assert!(!lines.iter().any(|l| l.contains("Unlisted")));
    }

    #[test]
    fn scan_output_flags_unlisted_sub_treatments() {
        let tmp = setup_fixtures();
        let mut manifest = scan(tmp.path()).unwrap();
        manifest.content.families[0].sub_treatments.clear();
        let lines = format_scan_output(&manifest);
        assert!(lines.iter().any(|l| l.contains("Unlisted: ")
            && l.contains("chemical-peels")));
    }

    #[test]
    fn check_output_shows_menu_and_totals() {
        let site = fixture_site();
        let lines = format_check_output(&site);
        assert_eq!(lines[0], "Skin");
        assert!(lines.iter().any(|l| l.contains(
            "\u{2192} /treatments/laser-hair-reduction/underarm-hair-reduction (sub-treatment)"
        )));
        assert!(lines.iter().any(|l| l
            == "Content OK: 3 conditions, 5 families, 7 sub-treatments, 2 programs"));
        assert!(lines.iter().any(|l| l.starts_with("Menu OK: 5 pillars")));
    }

    #[test]
    fn generate_output_marks_placeholders() {
        let report = GenerateReport {
            pages: vec![
                ("/".into(), "Pragna".into(), false),
                ("/treatments/a/b".into(), "Treatment".into(), true),
            ],
            sitemap_entries: 2,
            stats: CacheStats {
                written: 3,
                unchanged: 1,
            },
        };
        let lines = format_generate_output(&report);
        assert_eq!(lines[0], "/ \u{2192} Pragna");
        assert_eq!(lines[1], "/treatments/a/b \u{2192} Treatment (placeholder)");
        assert_eq!(
            lines[3],
            "Generated 2 pages (1 placeholder), sitemap with 2 URLs"
        );
        assert_eq!(lines[4], "Files: 3 written, 1 unchanged");
    }

    #[test]
    fn booking_output() {
        let receipt = BookingReceipt {
            message: "See you soon".into(),
        };
        assert_eq!(
            format_booking_output(&receipt),
            vec!["Booking accepted: See you soon"]
        );
    }
}
