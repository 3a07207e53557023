//! Content entity schemas.
//!
//! One struct per page kind, deserialized from the TOML files under the
//! content directory. Records are plain data: they reference each other by
//! slug only, and the [`registry`](crate::registry) resolves those slugs.
//!
//! Unknown keys are rejected so authoring typos fail the scan instead of
//! silently dropping copy from the page.

use crate::taxonomy::NavigationDeclaration;
use crate::types::{Faq, FeatureHero, QuickStat, TimelineStep, TreatmentRef, TrustIndicator};
use serde::{Deserialize, Serialize};

// ============================================================================
// Conditions
// ============================================================================

/// A patient-facing concern page, e.g. "Acne & Breakouts".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConditionContent {
    /// Filled from the filename when omitted in the file.
    #[serde(default)]
    pub slug: String,
    pub hero: ConditionHero,
    pub symptoms: Symptoms,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub quick_stats: Vec<QuickStat>,
    pub understanding: Understanding,
    pub pragna_approach: PragnaApproach,
    #[serde(default)]
    pub recommended_treatments: Vec<TreatmentRef>,
    #[serde(default)]
    pub timeline: Vec<TimelineStep>,
    #[serde(default)]
    pub faqs: Vec<Faq>,
    #[serde(default)]
    pub self_care_tips: Vec<String>,
    #[serde(default)]
    pub related_condition_slugs: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConditionHero {
    pub title: String,
    pub empathy: String,
    /// Markdown.
    pub intro: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Symptoms {
    pub headline: String,
    pub items: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Understanding {
    /// Markdown.
    pub what_it_is: String,
    #[serde(default)]
    pub why_it_happens: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PragnaApproach {
    /// Markdown.
    pub description: String,
}

// ============================================================================
// Sub-treatments
// ============================================================================

/// A single bookable procedure page, e.g. "Hydrafacial".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SubTreatmentContent {
    #[serde(default)]
    pub slug: String,
    pub hero: SubTreatmentHero,
    pub quick_stats: SubTreatmentStats,
    /// Markdown.
    pub overview: String,
    #[serde(default)]
    pub is_this_for_you: Vec<String>,
    pub process: SubTreatmentProcess,
    pub results: TreatmentResults,
    #[serde(default)]
    pub faqs: Vec<Faq>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SubTreatmentHero {
    pub title: String,
    pub tagline: String,
    /// Markdown.
    pub intro: String,
}

/// Free-text summary figures shown under the hero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SubTreatmentStats {
    pub sessions: String,
    pub duration: String,
    pub downtime: String,
    pub pain_level: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SubTreatmentProcess {
    pub steps: ProcessSteps,
}

/// The three phases of a procedure. Named fields keep the order fixed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProcessSteps {
    pub before: TimelineStep,
    pub during: TimelineStep,
    pub after: TimelineStep,
}

impl ProcessSteps {
    /// Phases in `before → during → after` order, labelled.
    pub fn ordered(&self) -> [(&'static str, &TimelineStep); 3] {
        [
            ("Before", &self.before),
            ("During", &self.during),
            ("After", &self.after),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TreatmentResults {
    pub timeline: String,
    pub recovery: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

// ============================================================================
// Treatment families
// ============================================================================

/// A grouping page, e.g. "Acne & Acne Scar Solutions".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TreatmentFamilyContent {
    #[serde(default)]
    pub slug: String,
    pub hero: FeatureHero,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub trust_indicators: Vec<TrustIndicator>,
    pub how_it_works: HowItWorks,
    pub who_is_this_for: WhoIsThisFor,
    #[serde(default)]
    pub why_pragna: Vec<WhyPragnaPoint>,
    #[serde(default)]
    pub related_condition_slugs: Vec<String>,
    /// Ordered sub-treatment slugs; each yields a `/treatments/{family}/{sub}` page.
    #[serde(default)]
    pub sub_treatments: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HowItWorks {
    pub description: String,
    #[serde(default)]
    pub steps: Vec<HowItWorksStep>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HowItWorksStep {
    pub title: String,
    pub text: String,
    /// Presentation hint only (icon name); never interpreted by the generator.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WhoIsThisFor {
    pub headline: String,
    pub items: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WhyPragnaPoint {
    pub title: String,
    pub description: String,
}

// ============================================================================
// Signature programs
// ============================================================================

/// A curated multi-treatment journey.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SignatureProgram {
    #[serde(default)]
    pub slug: String,
    pub hero: FeatureHero,
    pub process: ProgramProcess,
    /// Treatments bundled into the program.
    #[serde(default)]
    pub includes: Vec<TreatmentRef>,
    #[serde(default)]
    pub faqs: Vec<Faq>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProgramProcess {
    pub steps: Vec<TimelineStep>,
}

// ============================================================================
// Content graph
// ============================================================================

/// Every record scanned from the content directory, in listing order.
///
/// Built once by [`scan`](crate::scan::scan) and never mutated afterwards.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContentGraph {
    pub conditions: Vec<ConditionContent>,
    pub families: Vec<TreatmentFamilyContent>,
    pub sub_treatments: Vec<SubTreatmentContent>,
    pub programs: Vec<SignatureProgram>,
    pub navigation: NavigationDeclaration,
}

impl ContentGraph {
    /// Number of `(family, sub-treatment)` route pairs.
    pub fn route_pair_count(&self) -> usize {
        self.families.iter().map(|f| f.sub_treatments.len()).sum()
    }
}
