//! Slug → record lookup over the content graph.
//!
//! The registry takes ownership of the scanned [`ContentGraph`] and builds one
//! `HashMap` per content kind. Nothing mutates it afterwards; the page
//! generator borrows it from every rayon worker.
//!
//! Lookups return [`NotFound`] on a miss. What to do about a miss is the
//! caller's decision: the sub-treatment route renders a placeholder, every
//! other caller treats it as a content bug.
//!
//! [`ContentRegistry::check_references`] walks every slug-valued field in the
//! graph and reports the ones that point nowhere.

use crate::content::{
    ConditionContent, ContentGraph, SignatureProgram, SubTreatmentContent, TreatmentFamilyContent,
};
use crate::types::{TreatmentKind, TreatmentRef};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;
use tracing::warn;

/// The four slug namespaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ContentKind {
    Condition,
    SubTreatment,
    Family,
    Program,
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ContentKind::Condition => "condition",
            ContentKind::SubTreatment => "sub-treatment",
            ContentKind::Family => "family",
            ContentKind::Program => "program",
        })
    }
}

impl From<TreatmentKind> for ContentKind {
    fn from(kind: TreatmentKind) -> Self {
        match kind {
            TreatmentKind::Family => ContentKind::Family,
            TreatmentKind::SubTreatment => ContentKind::SubTreatment,
        }
    }
}

/// A borrowed record of any kind.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ContentRecord<'a> {
    Condition(&'a ConditionContent),
    SubTreatment(&'a SubTreatmentContent),
    Family(&'a TreatmentFamilyContent),
    Program(&'a SignatureProgram),
}

impl<'a> ContentRecord<'a> {
    pub fn kind(&self) -> ContentKind {
        match self {
            ContentRecord::Condition(_) => ContentKind::Condition,
            ContentRecord::SubTreatment(_) => ContentKind::SubTreatment,
            ContentRecord::Family(_) => ContentKind::Family,
            ContentRecord::Program(_) => ContentKind::Program,
        }
    }

    pub fn slug(&self) -> &'a str {
        match self {
            ContentRecord::Condition(c) => &c.slug,
            ContentRecord::SubTreatment(s) => &s.slug,
            ContentRecord::Family(f) => &f.slug,
            ContentRecord::Program(p) => &p.slug,
        }
    }

    pub fn title(&self) -> &'a str {
        match self {
            ContentRecord::Condition(c) => &c.hero.title,
            ContentRecord::SubTreatment(s) => &s.hero.title,
            ContentRecord::Family(f) => &f.hero.title,
            ContentRecord::Program(p) => &p.hero.title,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("no {kind} with slug '{slug}'")]
pub struct NotFound {
    pub kind: ContentKind,
    pub slug: String,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IntegrityProblem {
    #[error("{kind} slug '{slug}' is used by more than one record")]
    DuplicateSlug { kind: ContentKind, slug: String },
    #[error("{owner_kind} '{owner}': {field} references missing {kind} '{slug}'")]
    DanglingReference {
        owner_kind: ContentKind,
        owner: String,
        field: &'static str,
        kind: ContentKind,
        slug: String,
    },
    #[error("condition '{owner}' lists itself as related")]
    SelfReference { owner: String },
}

/// Every integrity problem found in the content graph.
#[derive(Error, Debug)]
pub struct IntegrityError(pub Vec<IntegrityProblem>);

impl fmt::Display for IntegrityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "content has {} integrity problem(s)", self.0.len())?;
        for problem in &self.0 {
            write!(f, "\n  - {problem}")?;
        }
        Ok(())
    }
}

#[derive(Debug)]
pub struct ContentRegistry {
    graph: ContentGraph,
    conditions: HashMap<String, usize>,
    sub_treatments: HashMap<String, usize>,
    families: HashMap<String, usize>,
    programs: HashMap<String, usize>,
}

impl ContentRegistry {
    /// Index `graph` by slug. Fails if any kind has a repeated slug.
    pub fn new(graph: ContentGraph) -> Result<Self, IntegrityError> {
        let mut problems = Vec::new();
        let conditions = index(
            ContentKind::Condition,
            graph.conditions.iter().map(|c| c.slug.as_str()),
            &mut problems,
        );
        let sub_treatments = index(
            ContentKind::SubTreatment,
            graph.sub_treatments.iter().map(|s| s.slug.as_str()),
            &mut problems,
        );
        let families = index(
            ContentKind::Family,
            graph.families.iter().map(|f| f.slug.as_str()),
            &mut problems,
        );
        let programs = index(
            ContentKind::Program,
            graph.programs.iter().map(|p| p.slug.as_str()),
            &mut problems,
        );
        if !problems.is_empty() {
            return Err(IntegrityError(problems));
        }
        Ok(Self {
            graph,
            conditions,
            sub_treatments,
            families,
            programs,
        })
    }

    pub fn graph(&self) -> &ContentGraph {
        &self.graph
    }

    /// Look up a record of `kind` by exact slug.
    pub fn resolve(&self, kind: ContentKind, slug: &str) -> Result<ContentRecord<'_>, NotFound> {
        match kind {
            ContentKind::Condition => self.condition(slug).map(ContentRecord::Condition),
            ContentKind::SubTreatment => self.sub_treatment(slug).map(ContentRecord::SubTreatment),
            ContentKind::Family => self.family(slug).map(ContentRecord::Family),
            ContentKind::Program => self.program(slug).map(ContentRecord::Program),
        }
    }

    /// Resolve a typed treatment reference from a condition or program.
    pub fn resolve_treatment(&self, reference: &TreatmentRef) -> Result<ContentRecord<'_>, NotFound> {
        self.resolve(reference.kind.into(), &reference.slug)
    }

    pub fn condition(&self, slug: &str) -> Result<&ConditionContent, NotFound> {
        lookup(&self.conditions, &self.graph.conditions, ContentKind::Condition, slug)
    }

    pub fn sub_treatment(&self, slug: &str) -> Result<&SubTreatmentContent, NotFound> {
        lookup(
            &self.sub_treatments,
            &self.graph.sub_treatments,
            ContentKind::SubTreatment,
            slug,
        )
    }

    pub fn family(&self, slug: &str) -> Result<&TreatmentFamilyContent, NotFound> {
        lookup(&self.families, &self.graph.families, ContentKind::Family, slug)
    }

    pub fn program(&self, slug: &str) -> Result<&SignatureProgram, NotFound> {
        lookup(&self.programs, &self.graph.programs, ContentKind::Program, slug)
    }

    /// Whether `family` exists and lists `sub` among its sub-treatments.
    pub fn family_lists(&self, family: &str, sub: &str) -> bool {
        self.family(family)
            .map(|f| f.sub_treatments.iter().any(|s| s == sub))
            .unwrap_or(false)
    }

    /// Families whose sub-treatment list includes `sub`, in listing order.
    pub fn families_containing<'a>(
        &'a self,
        sub: &'a str,
    ) -> impl Iterator<Item = &'a TreatmentFamilyContent> + 'a {
        self.graph
            .families
            .iter()
            .filter(move |f| f.sub_treatments.iter().any(|s| s == sub))
    }

    /// The canonical URL path of a record.
    ///
    /// Sub-treatments are served under their first listing family; one that no
    /// family lists has no page and yields `None`.
    pub fn path_of(&self, record: ContentRecord<'_>) -> Option<String> {
        match record {
            ContentRecord::Condition(c) => Some(format!("/conditions/{}", c.slug)),
            ContentRecord::Family(f) => Some(format!("/treatments/{}", f.slug)),
            ContentRecord::Program(p) => Some(format!("/signature-programs/{}", p.slug)),
            ContentRecord::SubTreatment(s) => self
                .families_containing(&s.slug)
                .next()
                .map(|f| format!("/treatments/{}/{}", f.slug, s.slug)),
        }
    }

    /// Check every cross-reference in the graph, reporting all dangling ones.
    pub fn check_references(&self) -> Result<(), IntegrityError> {
        let mut problems = Vec::new();
        let mut check = |owner_kind: ContentKind,
                         owner: &str,
                         field: &'static str,
                         kind: ContentKind,
                         slug: &str| {
            if self.resolve(kind, slug).is_err() {
                problems.push(IntegrityProblem::DanglingReference {
                    owner_kind,
                    owner: owner.to_string(),
                    field,
                    kind,
                    slug: slug.to_string(),
                });
            }
        };

        for condition in &self.graph.conditions {
            for related in &condition.related_condition_slugs {
                check(
                    ContentKind::Condition,
                    &condition.slug,
                    "related_condition_slugs",
                    ContentKind::Condition,
                    related,
                );
            }
            for reference in &condition.recommended_treatments {
                check(
                    ContentKind::Condition,
                    &condition.slug,
                    "recommended_treatments",
                    reference.kind.into(),
                    &reference.slug,
                );
            }
        }
        for family in &self.graph.families {
            for related in &family.related_condition_slugs {
                check(
                    ContentKind::Family,
                    &family.slug,
                    "related_condition_slugs",
                    ContentKind::Condition,
                    related,
                );
            }
            // A listed sub without content still gets a route; it renders
            // the placeholder page.
            for sub in &family.sub_treatments {
                if self.sub_treatment(sub).is_err() {
                    warn!(
                        family = %family.slug,
                        sub_treatment = %sub,
                        "no content for listed sub-treatment, page will be a placeholder"
                    );
                }
            }
        }
        for program in &self.graph.programs {
            for reference in &program.includes {
                check(
                    ContentKind::Program,
                    &program.slug,
                    "includes",
                    reference.kind.into(),
                    &reference.slug,
                );
            }
        }

        for condition in &self.graph.conditions {
            if condition.related_condition_slugs.contains(&condition.slug) {
                problems.push(IntegrityProblem::SelfReference {
                    owner: condition.slug.clone(),
                });
            }
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(IntegrityError(problems))
        }
    }
}

fn index<'a>(
    kind: ContentKind,
    slugs: impl Iterator<Item = &'a str>,
    problems: &mut Vec<IntegrityProblem>,
) -> HashMap<String, usize> {
    let mut map = HashMap::new();
    for (position, slug) in slugs.enumerate() {
        if map.insert(slug.to_string(), position).is_some() {
            problems.push(IntegrityProblem::DuplicateSlug {
                kind,
                slug: slug.to_string(),
            });
        }
    }
    map
}

fn lookup<'a, T>(
    map: &HashMap<String, usize>,
    records: &'a [T],
    kind: ContentKind,
    slug: &str,
) -> Result<&'a T, NotFound> {
    map.get(slug)
        .and_then(|&i| records.get(i))
        .ok_or_else(|| NotFound {
            kind,
            slug: slug.to_string(),
        })
}
