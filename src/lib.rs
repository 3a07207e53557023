//! # Pragna Site
//!
//! Static site generator for the Pragna dermatology clinic website. Content
//! lives in TOML files (one per condition, treatment family, sub-treatment and
//! signature program) plus a navigation file describing the site menu. The
//! output is a directory of plain HTML ready for any file server.
//!
//! # Architecture: Three-Stage Pipeline
//!
//! ```text
//! 1. Scan      content/  →  manifest.json    (TOML files → typed content graph)
//! 2. Check     manifest  →  Site             (registry, references, menu taxonomy)
//! 3. Generate  Site      →  dist/            (HTML pages, sitemap.xml, robots.txt)
//! ```
//!
//! The scan manifest is human-readable JSON, so what the generator sees can be
//! inspected without rendering anything. The check stage is the build's
//! integrity gate: a menu link that points nowhere, a condition that
//! recommends a treatment that doesn't exist, or two records sharing a slug
//! abort the build before a page is written.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`scan`] | Stage 1: reads the content directory into a [`scan::Manifest`] |
//! | [`content`] | Entity schemas: conditions, families, sub-treatments, programs |
//! | [`types`] | Small value types shared across entities (FAQ, timeline step, treatment ref) |
//! | [`naming`] | `NNN-slug` filename convention and href path helpers |
//! | [`registry`] | Slug → record lookup per content kind; cross-reference checks |
//! | [`taxonomy`] | Menu declaration → validated pillar/category/item tree |
//! | [`site`] | Stage 2: assembles and validates registry + taxonomy + config |
//! | [`generate`] | Stage 3: route enumeration and Maud page rendering |
//! | [`sitemap`] | `sitemap.xml` entries and `robots.txt` rules |
//! | [`cache`] | Skips rewriting output files whose bytes haven't changed |
//! | [`booking`] | Booking lead validation and submission with bounded retry |
//! | [`config`] | `config.toml` loading, merging over stock defaults, validation |
//! | [`output`] | CLI output formatting for every stage |
//!
//! # Design Decisions
//!
//! ## Exact Slug Matching
//!
//! Menu hrefs are resolved by their final path segment, compared for equality
//! against the registry. A segment that merely ends with a real slug never
//! matches, and a menu href that matches nothing is a build error rather
//! than a silently dead link.
//!
//! ## Placeholder Pages
//!
//! A `(family, sub-treatment)` route with no content renders a generic
//! "Treatment" page instead of failing. Every other miss fails the build.
//!
//! ## Maud Over Template Engines
//!
//! HTML is generated with [Maud](https://maud.lambda.xyz/), so templates are
//! checked at compile time and every interpolation is escaped. Long-form copy
//! is markdown rendered with `pulldown-cmark`.

pub mod booking;
pub mod cache;
pub mod config;
pub mod content;
pub mod generate;
pub mod naming;
pub mod output;
pub mod registry;
pub mod scan;
pub mod site;
pub mod sitemap;
pub mod taxonomy;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
