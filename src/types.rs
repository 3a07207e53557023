//! Small value types shared by several content entities.
//!
//! These appear inside conditions, families, sub-treatments and programs
//! alike, and serialize identically in content TOML and in the scan manifest.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A question/answer pair. The answer is markdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Faq {
    pub question: String,
    pub answer: String,
}

/// One step of an ordered journey (condition timeline, program process).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TimelineStep {
    pub title: String,
    pub description: String,
}

/// A headline figure with its explanation, e.g. `{stat = "85%", text = "..."}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct QuickStat {
    pub stat: String,
    pub text: String,
}

/// Trust badge on a family page, e.g. `{value = "10,000+", label = "Sessions"}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TrustIndicator {
    pub value: String,
    pub label: String,
}

/// Which kind of treatment page a [`TreatmentRef`] points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TreatmentKind {
    Family,
    SubTreatment,
}

impl fmt::Display for TreatmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TreatmentKind::Family => f.write_str("family"),
            TreatmentKind::SubTreatment => f.write_str("sub-treatment"),
        }
    }
}

/// A typed reference from a condition or program to a treatment page.
///
/// `name` and `best_for` are display copy owned by the referencing page;
/// the target record is looked up by `(kind, slug)` only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TreatmentRef {
    #[serde(rename = "type")]
    pub kind: TreatmentKind,
    pub slug: String,
    pub name: String,
    #[serde(default)]
    pub best_for: String,
}

/// Hero block shared by family and program pages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FeatureHero {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eyebrow: Option<String>,
    pub title: String,
    pub subtitle: String,
    /// Markdown.
    pub intro: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn treatment_ref_reads_type_tag() {
        let r: TreatmentRef = toml::from_str(
            r#"
type = "sub-treatment"
slug = "chemical-peels"
name = "Chemical Peels"
best_for = "Active acne"
"#,
        )
        .unwrap();
        assert_eq!(r.kind, TreatmentKind::SubTreatment);
        assert_eq!(r.slug, "chemical-peels");
    }

    #[test]
    fn treatment_ref_rejects_unknown_kind() {
        let r: Result<TreatmentRef, _> = toml::from_str(
            r#"
type = "program"
slug = "bridal-glow"
name = "Bridal Glow"
"#,
        );
        assert!(r.is_err());
    }

    #[test]
    fn treatment_kind_display_matches_wire_name() {
        assert_eq!(TreatmentKind::Family.to_string(), "family");
        assert_eq!(TreatmentKind::SubTreatment.to_string(), "sub-treatment");
    }
}
