//! `sitemap.xml` and `robots.txt`.
//!
//! Sitemap entries are derived from the registry in a fixed order: the four
//! static pages, then conditions, families, `(family, sub-treatment)` pairs
//! and programs, each in listing order.
//!
//! Every entry's `lastmod` is the build time. Content files carry no edit
//! history, so the build stamp is the only date available.

use crate::site::Site;
use chrono::{DateTime, SecondsFormat, Utc};
use maud::html;
use std::fmt;

/// Paths every crawler is kept out of.
pub const DISALLOWED_PATHS: [&str; 5] = ["/api/", "/_next/", "/static/", "/admin/", "/test/"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeFrequency {
    Weekly,
    Monthly,
}

impl fmt::Display for ChangeFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ChangeFrequency::Weekly => "weekly",
            ChangeFrequency::Monthly => "monthly",
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SitemapEntry {
    pub url: String,
    pub last_modified: DateTime<Utc>,
    pub change_frequency: ChangeFrequency,
    pub priority: f32,
}

/// The four non-parameterized routes with their priorities.
const STATIC_PAGES: [(&str, f32); 4] = [
    ("/", 1.0),
    ("/conditions", 0.8),
    ("/treatments", 0.8),
    ("/signature-programs", 0.8),
];

const DETAIL_PRIORITY: f32 = 0.7;
const SUB_TREATMENT_PRIORITY: f32 = 0.6;

pub fn build_sitemap(site: &Site, now: DateTime<Utc>) -> Vec<SitemapEntry> {
    let origin = site.config.site.origin();
    let graph = site.registry.graph();
    let entry = |path: String, change_frequency, priority| SitemapEntry {
        url: format!("{origin}{path}"),
        last_modified: now,
        change_frequency,
        priority,
    };

    let mut entries = Vec::with_capacity(
        STATIC_PAGES.len()
            + graph.conditions.len()
            + graph.families.len()
            + graph.route_pair_count()
            + graph.programs.len(),
    );

    for (path, priority) in STATIC_PAGES {
        let path = if path == "/" { String::new() } else { path.to_string() };
        entries.push(entry(path, ChangeFrequency::Weekly, priority));
    }
    for condition in &graph.conditions {
        entries.push(entry(
            format!("/conditions/{}", condition.slug),
            ChangeFrequency::Monthly,
            DETAIL_PRIORITY,
        ));
    }
    for family in &graph.families {
        entries.push(entry(
            format!("/treatments/{}", family.slug),
            ChangeFrequency::Monthly,
            DETAIL_PRIORITY,
        ));
    }
    for family in &graph.families {
        for sub in &family.sub_treatments {
            entries.push(entry(
                format!("/treatments/{}/{}", family.slug, sub),
                ChangeFrequency::Monthly,
                SUB_TREATMENT_PRIORITY,
            ));
        }
    }
    for program in &graph.programs {
        entries.push(entry(
            format!("/signature-programs/{}", program.slug),
            ChangeFrequency::Monthly,
            DETAIL_PRIORITY,
        ));
    }
    entries
}

/// Render entries as a sitemap protocol `urlset` document.
pub fn render_sitemap_xml(entries: &[SitemapEntry]) -> String {
    let body = html! {
        urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9" {
            @for e in entries {
                url {
                    loc { (e.url) }
                    lastmod { (e.last_modified.to_rfc3339_opts(SecondsFormat::Secs, true)) }
                    changefreq { (e.change_frequency.to_string()) }
                    priority { (format!("{:.1}", e.priority)) }
                }
            }
        }
    };
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n{}\n",
        body.into_string()
    )
}

#[derive(Debug, Clone, PartialEq)]
pub struct RobotsRule {
    pub user_agent: String,
    pub allow: Vec<String>,
    pub disallow: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Robots {
    pub rules: Vec<RobotsRule>,
    pub sitemap_url: String,
}

/// Crawl rules: everything allowed except framework and internal paths.
pub fn build_robots(origin: &str) -> Robots {
    let origin = origin.trim_end_matches('/');
    Robots {
        rules: vec![RobotsRule {
            user_agent: "*".to_string(),
            allow: vec!["/".to_string()],
            disallow: DISALLOWED_PATHS.iter().map(|p| p.to_string()).collect(),
        }],
        sitemap_url: format!("{origin}/sitemap.xml"),
    }
}

pub fn render_robots_txt(robots: &Robots) -> String {
    let mut out = String::new();
    for rule in &robots.rules {
        out.push_str(&format!("User-agent: {}\n", rule.user_agent));
        for path in &rule.allow {
            out.push_str(&format!("Allow: {path}\n"));
        }
        for path in &rule.disallow {
            out.push_str(&format!("Disallow: {path}\n"));
        }
        out.push('\n');
    }
    out.push_str(&format!("Sitemap: {}\n", robots.sitemap_url));
    out
}
