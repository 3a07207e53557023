//! HTML site generation.
//!
//! Stage 3 of the build pipeline. Takes the validated [`Site`] and writes the
//! final static site.
//!
//! ## Generated Pages
//!
//! | Route | Source |
//! |-------|--------|
//! | `/` | Site config, taxonomy, programs |
//! | `/conditions` | Taxonomy conditions list |
//! | `/conditions/{slug}` | [`ConditionContent`] |
//! | `/treatments` | Taxonomy pillars + all families |
//! | `/treatments/{family}` | [`TreatmentFamilyContent`] |
//! | `/treatments/{family}/{sub}` | [`SubTreatmentContent`], or the placeholder |
//! | `/signature-programs` | All programs |
//! | `/signature-programs/{slug}` | [`SignatureProgram`] |
//!
//! Each route is written as `{route}/index.html`, alongside `style.css`,
//! `sitemap.xml` and `robots.txt` at the output root.
//!
//! ## Misses
//!
//! Routes are enumerated from the registry, so a lookup miss during rendering
//! means the content graph changed underneath us and is a hard error. The one
//! exception is the sub-treatment route: a `(family, sub)` pair with no
//! content renders a "coming soon" placeholder instead of failing the build.
//!
//! ## HTML Generation
//!
//! Uses [maud](https://maud.lambda.xyz/) for compile-time HTML templating.
//! Long-form fields are markdown, rendered with `pulldown-cmark`.

use crate::cache::{CacheManifest, CacheStats, OutputWriter};
use crate::config;
use crate::content::{
    ConditionContent, SignatureProgram, SubTreatmentContent, TreatmentFamilyContent,
};
use crate::registry::{ContentRecord, NotFound};
use crate::site::Site;
use crate::sitemap;
use crate::taxonomy::Taxonomy;
use crate::types::{Faq, TimelineStep, TreatmentRef};
use chrono::{DateTime, Utc};
use maud::{DOCTYPE, Markup, PreEscaped, html};
use pulldown_cmark::{Parser, html as md_html};
use rayon::prelude::*;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Missing content: {0}")]
    Missing(#[from] NotFound),
}

const CSS_STATIC: &str = include_str!("../static/style.css");
const BOOKING_JS: &str = include_str!("../static/booking.js");

/// Body text of the sub-treatment placeholder page.
pub const PLACEHOLDER_TEXT: &str =
    "Details for this treatment are coming soon. Book a consultation and our dermatologists will walk you through it.";

// ============================================================================
// Routes
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteKind {
    Home,
    ConditionsIndex,
    Condition,
    TreatmentsIndex,
    Family,
    SubTreatment,
    ProgramsIndex,
    Program,
}

impl RouteKind {
    pub const ALL: [RouteKind; 8] = [
        RouteKind::Home,
        RouteKind::ConditionsIndex,
        RouteKind::Condition,
        RouteKind::TreatmentsIndex,
        RouteKind::Family,
        RouteKind::SubTreatment,
        RouteKind::ProgramsIndex,
        RouteKind::Program,
    ];
}

/// One concrete page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Home,
    ConditionsIndex,
    Condition { slug: String },
    TreatmentsIndex,
    Family { slug: String },
    SubTreatment { family: String, slug: String },
    ProgramsIndex,
    Program { slug: String },
}

impl Route {
    pub fn kind(&self) -> RouteKind {
        match self {
            Route::Home => RouteKind::Home,
            Route::ConditionsIndex => RouteKind::ConditionsIndex,
            Route::Condition { .. } => RouteKind::Condition,
            Route::TreatmentsIndex => RouteKind::TreatmentsIndex,
            Route::Family { .. } => RouteKind::Family,
            Route::SubTreatment { .. } => RouteKind::SubTreatment,
            Route::ProgramsIndex => RouteKind::ProgramsIndex,
            Route::Program { .. } => RouteKind::Program,
        }
    }

    /// URL path, e.g. `/treatments/laser-hair-reduction`.
    pub fn path(&self) -> String {
        match self {
            Route::Home => "/".to_string(),
            Route::ConditionsIndex => "/conditions".to_string(),
            Route::Condition { slug } => format!("/conditions/{slug}"),
            Route::TreatmentsIndex => "/treatments".to_string(),
            Route::Family { slug } => format!("/treatments/{slug}"),
            Route::SubTreatment { family, slug } => format!("/treatments/{family}/{slug}"),
            Route::ProgramsIndex => "/signature-programs".to_string(),
            Route::Program { slug } => format!("/signature-programs/{slug}"),
        }
    }

    /// File the route is written to, relative to the output directory.
    pub fn output_file(&self) -> String {
        match self {
            Route::Home => "index.html".to_string(),
            other => format!("{}/index.html", other.path().trim_start_matches('/')),
        }
    }
}

/// Every concrete route of `kind`, fully materialized in listing order.
pub fn enumerate_slugs(kind: RouteKind, site: &Site) -> Vec<Route> {
    let graph = site.registry.graph();
    match kind {
        RouteKind::Home => vec![Route::Home],
        RouteKind::ConditionsIndex => vec![Route::ConditionsIndex],
        RouteKind::TreatmentsIndex => vec![Route::TreatmentsIndex],
        RouteKind::ProgramsIndex => vec![Route::ProgramsIndex],
        RouteKind::Condition => graph
            .conditions
            .iter()
            .map(|c| Route::Condition {
                slug: c.slug.clone(),
            })
            .collect(),
        RouteKind::Family => graph
            .families
            .iter()
            .map(|f| Route::Family {
                slug: f.slug.clone(),
            })
            .collect(),
        RouteKind::SubTreatment => graph
            .families
            .iter()
            .flat_map(|f| {
                f.sub_treatments.iter().map(|s| Route::SubTreatment {
                    family: f.slug.clone(),
                    slug: s.clone(),
                })
            })
            .collect(),
        RouteKind::Program => graph
            .programs
            .iter()
            .map(|p| Route::Program {
                slug: p.slug.clone(),
            })
            .collect(),
    }
}

/// Every route of the site.
pub fn all_routes(site: &Site) -> Vec<Route> {
    RouteKind::ALL
        .iter()
        .flat_map(|&kind| enumerate_slugs(kind, site))
        .collect()
}

// ============================================================================
// Generation
// ============================================================================

/// A rendered page.
#[derive(Debug, Clone)]
pub struct PageOutput {
    pub route: Route,
    pub title: String,
    pub html: String,
    /// True when the route had no content and the placeholder was rendered.
    pub placeholder: bool,
}

/// What a generate run produced, for CLI output.
#[derive(Debug)]
pub struct GenerateReport {
    /// `(route path, title, placeholder)` in route order.
    pub pages: Vec<(String, String, bool)>,
    pub sitemap_entries: usize,
    pub stats: CacheStats,
}

/// Shared page furniture.
struct Chrome<'a> {
    site: &'a Site,
    css: String,
}

pub fn generate(
    site: &Site,
    output_dir: &Path,
    previous: CacheManifest,
    now: DateTime<Utc>,
) -> Result<GenerateReport, GenerateError> {
    std::fs::create_dir_all(output_dir)?;
    let chrome = Chrome::new(site);
    let routes = all_routes(site);
    info!(routes = routes.len(), "rendering site");

    let pages = routes
        .par_iter()
        .map(|route| chrome.render(route))
        .collect::<Result<Vec<_>, _>>()?;

    let writer = OutputWriter::new(output_dir, previous);
    writer.write("style.css", chrome.css.as_bytes())?;
    pages.par_iter().try_for_each(|page| {
        let written = writer.write(&page.route.output_file(), page.html.as_bytes())?;
        debug!(path = %page.route.path(), written, "page");
        Ok::<_, std::io::Error>(())
    })?;

    let entries = sitemap::build_sitemap(site, now);
    writer.write(
        "sitemap.xml",
        sitemap::render_sitemap_xml(&entries).as_bytes(),
    )?;
    let robots = sitemap::build_robots(site.config.site.origin());
    writer.write(
        "robots.txt",
        sitemap::render_robots_txt(&robots).as_bytes(),
    )?;

    let (manifest, stats) = writer.finish()?;
    manifest.save(output_dir)?;
    info!(%stats, "site written to {}", output_dir.display());

    Ok(GenerateReport {
        pages: pages
            .into_iter()
            .map(|p| (p.route.path(), p.title, p.placeholder))
            .collect(),
        sitemap_entries: entries.len(),
        stats,
    })
}

/// Render one route without touching the filesystem.
pub fn render_page(route: &Route, site: &Site) -> Result<PageOutput, GenerateError> {
    Chrome::new(site).render(route)
}

impl<'a> Chrome<'a> {
    fn new(site: &'a Site) -> Self {
        let css = format!(
            "{}\n\n{}",
            config::generate_color_css(&site.config.colors),
            CSS_STATIC
        );
        Self { site, css }
    }

    fn render(&self, route: &Route) -> Result<PageOutput, GenerateError> {
        let registry = &self.site.registry;
        let (title, markup, placeholder) = match route {
            Route::Home => {
                let title = self.site.config.site.name.clone();
                (title, self.render_home(), false)
            }
            Route::ConditionsIndex => (
                "Conditions We Treat".to_string(),
                self.render_conditions_index(),
                false,
            ),
            Route::Condition { slug } => {
                let condition = registry.condition(slug)?;
                (
                    condition.hero.title.clone(),
                    self.render_condition(condition),
                    false,
                )
            }
            Route::TreatmentsIndex => (
                "Treatments".to_string(),
                self.render_treatments_index(),
                false,
            ),
            Route::Family { slug } => {
                let family = registry.family(slug)?;
                (family.hero.title.clone(), self.render_family(family), false)
            }
            Route::SubTreatment { family, slug } => {
                let found = registry
                    .family(family)
                    .ok()
                    .filter(|_| registry.family_lists(family, slug))
                    .zip(registry.sub_treatment(slug).ok());
                match found {
                    Some((family, sub)) => (
                        sub.hero.title.clone(),
                        self.render_sub_treatment(family, sub),
                        false,
                    ),
                    None => {
                        debug!(%family, %slug, "no sub-treatment content, rendering placeholder");
                        ("Treatment".to_string(), self.render_placeholder(route), true)
                    }
                }
            }
            Route::ProgramsIndex => (
                "Signature Programs".to_string(),
                self.render_programs_index(),
                false,
            ),
            Route::Program { slug } => {
                let program = registry.program(slug)?;
                (program.hero.title.clone(), self.render_program(program), false)
            }
        };
        Ok(PageOutput {
            route: route.clone(),
            title,
            html: markup.into_string(),
            placeholder,
        })
    }

    // ========================================================================
    // Page furniture
    // ========================================================================

    fn document(&self, title: &str, current_path: &str, breadcrumb: Markup, content: Markup) -> Markup {
        let site_name = &self.site.config.site.name;
        let full_title = if title == site_name.as_str() {
            site_name.clone()
        } else {
            format!("{title} | {site_name}")
        };
        html! {
            (DOCTYPE)
            html lang="en" {
                head {
                    meta charset="UTF-8";
                    meta name="viewport" content="width=device-width, initial-scale=1.0";
                    meta name="generator" content=(generator());
                    title { (full_title) }
                    link rel="stylesheet" href="/style.css";
                }
                body {
                    header.site-header {
                        a.brand href="/" { (site_name) }
                        (render_nav(&self.site.taxonomy, current_path))
                    }
                    nav.breadcrumb aria-label="Breadcrumb" { (breadcrumb) }
                    main { (content) }
                    (self.footer())
                }
            }
        }
    }

    fn footer(&self) -> Markup {
        let booking = &self.site.config.booking;
        html! {
            footer.site-footer {
                section.booking #book {
                    h2 { "Book a consultation" }
                    form #booking-form data-endpoint=(booking.endpoint) data-source=(booking.source)
                        data-max-retries=(booking.max_retries)
                        data-initial-backoff-ms=(booking.initial_backoff_ms)
                        data-timeout-ms=(booking.timeout_secs.saturating_mul(1000)) novalidate {
                        label { "Name" input name="name" type="text" autocomplete="name" required; }
                        div.phone-row {
                            label { "Code"
                                select name="countryCode" {
                                    option value="+91" selected { "+91" }
                                    option value="+1" { "+1" }
                                    option value="+44" { "+44" }
                                    option value="+971" { "+971" }
                                }
                            }
                            label { "Phone" input name="phone" type="tel" autocomplete="tel" required; }
                        }
                        label { "Email" input name="email" type="email" autocomplete="email" required; }
                        label { "Branch"
                            select name="branch" required {
                                option value="punjagutta" { "Punjagutta" }
                                option value="kokapet" { "Kokapet" }
                            }
                        }
                        label { "Concerns" textarea name="concerns" rows="3" {} }
                        button type="submit" { "Request appointment" }
                        p.form-status role="status" aria-live="polite" {}
                    }
                }
                p.footer-note { (self.site.config.site.name) " · " (self.site.config.site.tagline) }
            }
            script { (PreEscaped(BOOKING_JS)) }
        }
    }

    // ========================================================================
    // Page renderers
    // ========================================================================

    fn render_home(&self) -> Markup {
        let site = &self.site.config.site;
        let graph = self.site.registry.graph();
        let content = html! {
            section.hero {
                h1 { (site.name) }
                p.tagline { (site.tagline) }
                a.button href="#book" { "Book a consultation" }
            }
            section.pillars {
                h2 { "Our care" }
                div.card-grid {
                    @for pillar in &self.site.taxonomy.pillars {
                        div.card {
                            h3 { (pillar.name) }
                            ul {
                                @for category in &pillar.categories {
                                    li { (category.name) }
                                }
                            }
                        }
                    }
                }
                a href="/treatments" { "All treatments →" }
            }
            section.conditions {
                h2 { "Concerns we treat" }
                ul.chip-list {
                    @for entry in &self.site.taxonomy.conditions {
                        li { a href={ "/conditions/" (entry.slug) } { (entry.name) } }
                    }
                }
            }
            @if !graph.programs.is_empty() {
                section.programs {
                    h2 { "Signature programs" }
                    div.card-grid {
                        @for program in &graph.programs {
                            (program_card(program))
                        }
                    }
                }
            }
        };
        self.document(&site.name, "/", html! { a href="/" { "Home" } }, content)
    }

    fn render_conditions_index(&self) -> Markup {
        let registry = &self.site.registry;
        let content = html! {
            header.page-hero {
                h1 { "Conditions We Treat" }
                p { "Find your concern and see how we approach it." }
            }
            div.card-grid {
                @for entry in &self.site.taxonomy.conditions {
                    a.card href={ "/conditions/" (entry.slug) } {
                        h3 { (entry.name) }
                        @if let Ok(condition) = registry.condition(&entry.slug) {
                            p { (condition.hero.empathy) }
                        }
                    }
                }
            }
        };
        let breadcrumb = html! { a href="/" { "Home" } " › " "Conditions" };
        self.document("Conditions We Treat", "/conditions", breadcrumb, content)
    }

    fn render_condition(&self, condition: &ConditionContent) -> Markup {
        let registry = &self.site.registry;
        let path = format!("/conditions/{}", condition.slug);
        let content = html! {
            header.page-hero {
                h1 { (condition.hero.title) }
                p.empathy { (condition.hero.empathy) }
                (markdown(&condition.hero.intro))
            }
            section.symptoms {
                h2 { (condition.symptoms.headline) }
                ul { @for item in &condition.symptoms.items { li { (item) } } }
            }
            @if !condition.quick_stats.is_empty() {
                section.quick-stats {
                    @for stat in &condition.quick_stats {
                        div.stat { strong { (stat.stat) } span { (stat.text) } }
                    }
                }
            }
            section.understanding {
                h2 { "Understanding " (condition.hero.title) }
                (markdown(&condition.understanding.what_it_is))
                @if !condition.understanding.why_it_happens.is_empty() {
                    h3 { "Why it happens" }
                    ul { @for cause in &condition.understanding.why_it_happens { li { (cause) } } }
                }
            }
            section.approach {
                h2 { "The Pragna approach" }
                (markdown(&condition.pragna_approach.description))
            }
            @if !condition.recommended_treatments.is_empty() {
                section.recommended {
                    h2 { "Recommended treatments" }
                    div.card-grid {
                        @for reference in &condition.recommended_treatments {
                            (self.treatment_card(reference))
                        }
                    }
                }
            }
            (timeline("Your treatment journey", &condition.timeline))
            @if !condition.self_care_tips.is_empty() {
                section.self-care {
                    h2 { "Self-care tips" }
                    ul { @for tip in &condition.self_care_tips { li { (tip) } } }
                }
            }
            (faq_section(&condition.faqs))
            @if !condition.related_condition_slugs.is_empty() {
                section.related {
                    h2 { "Related conditions" }
                    ul.chip-list {
                        @for slug in &condition.related_condition_slugs {
                            @if let Ok(related) = registry.condition(slug) {
                                li { a href={ "/conditions/" (related.slug) } { (related.hero.title) } }
                            }
                        }
                    }
                }
            }
        };
        let breadcrumb = html! {
            a href="/" { "Home" } " › " a href="/conditions" { "Conditions" } " › " (condition.hero.title)
        };
        self.document(&condition.hero.title, &path, breadcrumb, content)
    }

    fn render_treatments_index(&self) -> Markup {
        let content = html! {
            header.page-hero {
                h1 { "Treatments" }
                p { "Every treatment, grouped the way our dermatologists plan care." }
            }
            @for pillar in &self.site.taxonomy.pillars {
                section.pillar {
                    h2 { (pillar.name) }
                    @for category in &pillar.categories {
                        h3 { (category.name) }
                        ul {
                            @for item in &category.items {
                                li { a href=(item.href) { (item.name) } }
                            }
                        }
                    }
                }
            }
            section.families {
                h2 { "Treatment families" }
                div.card-grid {
                    @for family in &self.site.registry.graph().families {
                        a.card href={ "/treatments/" (family.slug) } {
                            @if let Some(eyebrow) = &family.hero.eyebrow { span.eyebrow { (eyebrow) } }
                            h3 { (family.hero.title) }
                            p { (family.hero.subtitle) }
                        }
                    }
                }
            }
        };
        let breadcrumb = html! { a href="/" { "Home" } " › " "Treatments" };
        self.document("Treatments", "/treatments", breadcrumb, content)
    }

    fn render_family(&self, family: &TreatmentFamilyContent) -> Markup {
        let registry = &self.site.registry;
        let path = format!("/treatments/{}", family.slug);
        let content = html! {
            header.page-hero {
                @if let Some(eyebrow) = &family.hero.eyebrow { span.eyebrow { (eyebrow) } }
                h1 { (family.hero.title) }
                p.subtitle { (family.hero.subtitle) }
                (markdown(&family.hero.intro))
                @if let Some(image) = &family.hero.image {
                    img.hero-image src=(image) alt=(family.hero.title) loading="lazy";
                }
            }
            @if !family.trust_indicators.is_empty() {
                section.trust {
                    @for indicator in &family.trust_indicators {
                        div.stat { strong { (indicator.value) } span { (indicator.label) } }
                    }
                }
            }
            section.sub-treatments {
                h2 { "Treatments in this family" }
                div.card-grid {
                    @for slug in &family.sub_treatments {
                        @let href = format!("/treatments/{}/{}", family.slug, slug);
                        a.card href=(href) {
                            @match registry.sub_treatment(slug) {
                                Ok(sub) => {
                                    h3 { (sub.hero.title) }
                                    p { (sub.hero.tagline) }
                                }
                                Err(_) => {
                                    h3 { (slug) }
                                    p { "Coming soon" }
                                }
                            }
                        }
                    }
                }
            }
            section.how-it-works {
                h2 { "How it works" }
                p { (family.how_it_works.description) }
                ol.steps {
                    @for step in &family.how_it_works.steps {
                        li data-icon=[step.icon.as_deref()] {
                            h3 { (step.title) }
                            p { (step.text) }
                        }
                    }
                }
            }
            section.who {
                h2 { (family.who_is_this_for.headline) }
                ul { @for item in &family.who_is_this_for.items { li { (item) } } }
            }
            @if !family.why_pragna.is_empty() {
                section.why-pragna {
                    h2 { "Why Pragna" }
                    div.card-grid {
                        @for point in &family.why_pragna {
                            div.card { h3 { (point.title) } p { (point.description) } }
                        }
                    }
                }
            }
            (self.related_conditions(&family.related_condition_slugs))
        };
        let breadcrumb = html! {
            a href="/" { "Home" } " › " a href="/treatments" { "Treatments" }
            @if let Some(pillar) = self.site.taxonomy.pillar_of_family(&family.slug) {
                " › " span { (pillar) }
            }
            " › " (family.hero.title)
        };
        self.document(&family.hero.title, &path, breadcrumb, content)
    }

    fn render_sub_treatment(
        &self,
        family: &TreatmentFamilyContent,
        sub: &SubTreatmentContent,
    ) -> Markup {
        let path = format!("/treatments/{}/{}", family.slug, sub.slug);
        let stats = &sub.quick_stats;
        let content = html! {
            header.page-hero {
                h1 { (sub.hero.title) }
                p.tagline { (sub.hero.tagline) }
                (markdown(&sub.hero.intro))
            }
            section.quick-stats {
                div.stat { span { "Sessions" } strong { (stats.sessions) } }
                div.stat { span { "Duration" } strong { (stats.duration) } }
                div.stat { span { "Downtime" } strong { (stats.downtime) } }
                div.stat { span { "Pain level" } strong { (stats.pain_level) } }
            }
            section.overview {
                h2 { "Overview" }
                (markdown(&sub.overview))
            }
            @if !sub.is_this_for_you.is_empty() {
                section.for-you {
                    h2 { "Is this for you?" }
                    ul { @for item in &sub.is_this_for_you { li { (item) } } }
                }
            }
            section.process {
                h2 { "The process" }
                ol.steps {
                    @for (phase, step) in sub.process.steps.ordered() {
                        li {
                            span.phase { (phase) }
                            h3 { (step.title) }
                            p { (step.description) }
                        }
                    }
                }
            }
            section.results {
                h2 { "Results" }
                p { strong { "When you'll see results: " } (sub.results.timeline) }
                p { strong { "Recovery: " } (sub.results.recovery) }
                @if let Some(image) = &sub.results.image {
                    img src=(image) alt={ (sub.hero.title) " results" } loading="lazy";
                }
            }
            (faq_section(&sub.faqs))
        };
        let breadcrumb = html! {
            a href="/" { "Home" } " › " a href="/treatments" { "Treatments" } " › "
            a href={ "/treatments/" (family.slug) } { (family.hero.title) } " › " (sub.hero.title)
        };
        self.document(&sub.hero.title, &path, breadcrumb, content)
    }

    fn render_placeholder(&self, route: &Route) -> Markup {
        let content = html! {
            header.page-hero.placeholder {
                h1 { "Treatment" }
                p { (PLACEHOLDER_TEXT) }
                a.button href="#book" { "Book a consultation" }
            }
        };
        let breadcrumb = html! {
            a href="/" { "Home" } " › " a href="/treatments" { "Treatments" } " › " "Treatment"
        };
        self.document("Treatment", &route.path(), breadcrumb, content)
    }

    fn render_programs_index(&self) -> Markup {
        let content = html! {
            header.page-hero {
                h1 { "Signature Programs" }
                p { "Curated multi-treatment journeys, planned end to end." }
            }
            div.card-grid {
                @for program in &self.site.registry.graph().programs {
                    (program_card(program))
                }
            }
        };
        let breadcrumb = html! { a href="/" { "Home" } " › " "Signature Programs" };
        self.document("Signature Programs", "/signature-programs", breadcrumb, content)
    }

    fn render_program(&self, program: &SignatureProgram) -> Markup {
        let path = format!("/signature-programs/{}", program.slug);
        let content = html! {
            header.page-hero {
                @if let Some(eyebrow) = &program.hero.eyebrow { span.eyebrow { (eyebrow) } }
                h1 { (program.hero.title) }
                p.subtitle { (program.hero.subtitle) }
                (markdown(&program.hero.intro))
                @if let Some(image) = &program.hero.image {
                    img.hero-image src=(image) alt=(program.hero.title) loading="lazy";
                }
            }
            (timeline("How the program runs", &program.process.steps))
            @if !program.includes.is_empty() {
                section.includes {
                    h2 { "What's included" }
                    div.card-grid {
                        @for reference in &program.includes {
                            (self.treatment_card(reference))
                        }
                    }
                }
            }
            (faq_section(&program.faqs))
        };
        let breadcrumb = html! {
            a href="/" { "Home" } " › " a href="/signature-programs" { "Signature Programs" }
            " › " (program.hero.title)
        };
        self.document(&program.hero.title, &path, breadcrumb, content)
    }

    // ========================================================================
    // Components
    // ========================================================================

    /// Card for a treatment reference, linked when its page exists.
    fn treatment_card(&self, reference: &TreatmentRef) -> Markup {
        let registry = &self.site.registry;
        let href = registry
            .resolve_treatment(reference)
            .ok()
            .and_then(|record: ContentRecord<'_>| registry.path_of(record));
        html! {
            @if let Some(href) = href {
                a.card.treatment href=(href) {
                    span.eyebrow { (reference.kind.to_string()) }
                    h3 { (reference.name) }
                    @if !reference.best_for.is_empty() { p { "Best for: " (reference.best_for) } }
                }
            } @else {
                div.card.treatment {
                    h3 { (reference.name) }
                    @if !reference.best_for.is_empty() { p { "Best for: " (reference.best_for) } }
                }
            }
        }
    }

    fn related_conditions(&self, slugs: &[String]) -> Markup {
        let registry = &self.site.registry;
        html! {
            @if !slugs.is_empty() {
                section.related {
                    h2 { "Conditions this helps" }
                    ul.chip-list {
                        @for slug in slugs {
                            @if let Ok(condition) = registry.condition(slug) {
                                li { a href={ "/conditions/" (condition.slug) } { (condition.hero.title) } }
                            }
                        }
                    }
                }
            }
        }
    }
}

/// Renders the pillar → category → item menu (hamburger style).
pub fn render_nav(taxonomy: &Taxonomy, current_path: &str) -> Markup {
    html! {
        input.nav-toggle type="checkbox" id="nav-toggle";
        label.nav-hamburger for="nav-toggle" aria-label="Menu" {
            span.hamburger-line {}
            span.hamburger-line {}
            span.hamburger-line {}
        }
        nav.site-nav {
            ul {
                @for pillar in &taxonomy.pillars {
                    li.pillar {
                        span.nav-group { (pillar.name) }
                        @for category in &pillar.categories {
                            div.nav-category {
                                span.nav-category-name { (category.name) }
                                ul {
                                    @for item in &category.items {
                                        @let is_current = item.href.trim_end_matches('/') == current_path;
                                        li class=[is_current.then_some("current")] {
                                            a href=(item.href) { (item.name) }
                                        }
                                    }
                                }
                            }
                        }
                    }
                }
                li { a href="/conditions" { "Conditions" } }
                li { a href="/signature-programs" { "Signature Programs" } }
            }
        }
    }
}

fn program_card(program: &SignatureProgram) -> Markup {
    html! {
        a.card href={ "/signature-programs/" (program.slug) } {
            @if let Some(eyebrow) = &program.hero.eyebrow { span.eyebrow { (eyebrow) } }
            h3 { (program.hero.title) }
            p { (program.hero.subtitle) }
        }
    }
}

fn timeline(heading: &str, steps: &[TimelineStep]) -> Markup {
    html! {
        @if !steps.is_empty() {
            section.timeline {
                h2 { (heading) }
                ol.steps {
                    @for step in steps {
                        li { h3 { (step.title) } p { (step.description) } }
                    }
                }
            }
        }
    }
}

fn faq_section(faqs: &[Faq]) -> Markup {
    html! {
        @if !faqs.is_empty() {
            section.faqs {
                h2 { "Frequently asked questions" }
                @for faq in faqs {
                    details.faq {
                        summary { (faq.question) }
                        (markdown(&faq.answer))
                    }
                }
            }
        }
    }
}

/// Render authored markdown. Content files are trusted input.
fn markdown(text: &str) -> Markup {
    let mut out = String::new();
    md_html::push_html(&mut out, Parser::new(text));
    PreEscaped(out)
}

fn generator() -> String {
    let hash = env!("PRAGNA_SITE_GIT_HASH");
    if hash.is_empty() {
        format!("pragna-site {}", env!("CARGO_PKG_VERSION"))
    } else {
        format!("pragna-site {}@{hash}", env!("CARGO_PKG_VERSION"))
    }
}

// ============================================================================
// Tests
// ============================================================================
