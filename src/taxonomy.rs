//! Navigation taxonomy: pillars → categories → items, plus the conditions list.
//!
//! `navigation.toml` declares the tree the way the clinic thinks about its
//! services:
//!
//! ```toml
//! [[pillars]]
//! name = "Skin"
//!
//! [[pillars.categories]]
//! name = "Acne & Scars"
//!
//! [[pillars.categories.items]]
//! name = "Chemical Peels"
//! href = "/treatments/acne-scar-solutions/chemical-peels"
//!
//! [[conditions]]
//! slug = "acne-breakouts"
//! name = "Acne & Breakouts"
//! ```
//!
//! [`Taxonomy::build`] validates the declaration against the content registry.
//! An item's target is found by exact match on the final path segment of its
//! href, never by suffix comparison, and the href must then be the canonical
//! route of that record. Any problem is fatal: a broken menu is an authoring
//! mistake, not a page to degrade gracefully.

use crate::naming::{href_segments, slug_from_href};
use crate::registry::{ContentKind, ContentRegistry};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use thiserror::Error;

// ============================================================================
// Declaration (as authored)
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NavigationDeclaration {
    pub pillars: Vec<PillarDecl>,
    pub conditions: Vec<ConditionEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PillarDecl {
    pub name: String,
    #[serde(default)]
    pub categories: Vec<CategoryDecl>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CategoryDecl {
    pub name: String,
    #[serde(default)]
    pub items: Vec<ItemDecl>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ItemDecl {
    pub name: String,
    pub href: String,
    /// Set on deliberate repeats: an href, or the record behind it, already
    /// listed elsewhere in the menu.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub alias: bool,
}

/// Entry of the flat conditions directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConditionEntry {
    pub slug: String,
    pub name: String,
}

// ============================================================================
// Validated tree
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct Taxonomy {
    pub pillars: Vec<Pillar>,
    pub conditions: Vec<ConditionEntry>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Pillar {
    pub name: String,
    pub categories: Vec<Category>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Category {
    pub name: String,
    pub items: Vec<NavItem>,
}

/// A menu entry whose href has been resolved to exactly one content record.
#[derive(Debug, Clone, PartialEq)]
pub struct NavItem {
    pub name: String,
    pub href: String,
    pub target: NavTarget,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NavTarget {
    Family { slug: String },
    SubTreatment { family: String, slug: String },
}

impl NavTarget {
    pub fn kind(&self) -> ContentKind {
        match self {
            NavTarget::Family { .. } => ContentKind::Family,
            NavTarget::SubTreatment { .. } => ContentKind::SubTreatment,
        }
    }

    pub fn slug(&self) -> &str {
        match self {
            NavTarget::Family { slug } | NavTarget::SubTreatment { slug, .. } => slug,
        }
    }
}

// ============================================================================
// Errors
// ============================================================================

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TaxonomyProblem {
    #[error("item '{name}': href {href} has no slug segment")]
    EmptyHref { name: String, href: String },
    #[error("item '{name}': href {href} matches no treatment family or sub-treatment")]
    DanglingHref { name: String, href: String },
    #[error("item '{name}': slug '{slug}' in {href} is both a family and a sub-treatment")]
    AmbiguousSlug {
        name: String,
        href: String,
        slug: String,
    },
    #[error("item '{name}': href {href} should be {expected}")]
    NonCanonicalHref {
        name: String,
        href: String,
        expected: String,
    },
    #[error("item '{name}': href {href} is already listed (mark it `alias = true` if intended)")]
    DuplicateHref { name: String, href: String },
    #[error(
        "item '{name}': href {href} links {kind} '{slug}', already in the menu under another href (mark it `alias = true` if intended)"
    )]
    DuplicateTarget {
        name: String,
        href: String,
        kind: ContentKind,
        slug: String,
    },
    #[error("conditions list: '{slug}' has no condition page")]
    UnknownCondition { slug: String },
    #[error("conditions list: '{slug}' is listed more than once")]
    DuplicateCondition { slug: String },
}

/// Every problem found in the navigation declaration.
#[derive(Error, Debug)]
pub struct TaxonomyError(pub Vec<TaxonomyProblem>);

impl fmt::Display for TaxonomyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "navigation has {} problem(s)", self.0.len())?;
        for problem in &self.0 {
            write!(f, "\n  - {problem}")?;
        }
        Ok(())
    }
}

// ============================================================================
// Build
// ============================================================================

impl Taxonomy {
    /// Validate `declaration` against `registry` and produce the resolved tree.
    ///
    /// Collects every problem before failing so authors can fix them in one pass.
    pub fn build(
        declaration: &NavigationDeclaration,
        registry: &ContentRegistry,
    ) -> Result<Taxonomy, TaxonomyError> {
        let mut problems = Vec::new();
        let mut seen_hrefs: HashSet<&str> = HashSet::new();
        let mut seen_records: HashSet<(ContentKind, String)> = HashSet::new();

        let mut pillars = Vec::with_capacity(declaration.pillars.len());
        for pillar in &declaration.pillars {
            let mut categories = Vec::with_capacity(pillar.categories.len());
            for category in &pillar.categories {
                let mut items = Vec::with_capacity(category.items.len());
                for item in &category.items {
                    if !seen_hrefs.insert(item.href.as_str()) && !item.alias {
                        problems.push(TaxonomyProblem::DuplicateHref {
                            name: item.name.clone(),
                            href: item.href.clone(),
                        });
                        continue;
                    }
                    match resolve_item(item, registry) {
                        Ok(target) => {
                            let record = (target.kind(), target.slug().to_string());
                            if !seen_records.insert(record) && !item.alias {
                                problems.push(TaxonomyProblem::DuplicateTarget {
                                    name: item.name.clone(),
                                    href: item.href.clone(),
                                    kind: target.kind(),
                                    slug: target.slug().to_string(),
                                });
                                continue;
                            }
                            items.push(NavItem {
                                name: item.name.clone(),
                                href: item.href.clone(),
                                target,
                            });
                        }
                        Err(problem) => problems.push(problem),
                    }
                }
                categories.push(Category {
                    name: category.name.clone(),
                    items,
                });
            }
            pillars.push(Pillar {
                name: pillar.name.clone(),
                categories,
            });
        }

        let mut seen_conditions: HashSet<&str> = HashSet::new();
        for entry in &declaration.conditions {
            if !seen_conditions.insert(entry.slug.as_str()) {
                problems.push(TaxonomyProblem::DuplicateCondition {
                    slug: entry.slug.clone(),
                });
            } else if registry.condition(&entry.slug).is_err() {
                problems.push(TaxonomyProblem::UnknownCondition {
                    slug: entry.slug.clone(),
                });
            }
        }

        if !problems.is_empty() {
            return Err(TaxonomyError(problems));
        }

        Ok(Taxonomy {
            pillars,
            conditions: declaration.conditions.clone(),
        })
    }

    /// All resolved items in menu order.
    pub fn items(&self) -> impl Iterator<Item = &NavItem> {
        self.pillars
            .iter()
            .flat_map(|p| p.categories.iter())
            .flat_map(|c| c.items.iter())
    }

    /// Name of the pillar whose menu lists `family` (directly or via one of its
    /// sub-treatments), for breadcrumbs.
    pub fn pillar_of_family(&self, family: &str) -> Option<&str> {
        self.pillars
            .iter()
            .find(|p| {
                p.categories.iter().flat_map(|c| c.items.iter()).any(|i| match &i.target {
                    NavTarget::Family { slug } => slug == family,
                    NavTarget::SubTreatment { family: f, .. } => f == family,
                })
            })
            .map(|p| p.name.as_str())
    }
}

/// Resolve one item by exact match on its final href segment.
fn resolve_item(item: &ItemDecl, registry: &ContentRegistry) -> Result<NavTarget, TaxonomyProblem> {
    let Some(slug) = slug_from_href(&item.href) else {
        return Err(TaxonomyProblem::EmptyHref {
            name: item.name.clone(),
            href: item.href.clone(),
        });
    };

    let is_family = registry.family(slug).is_ok();
    let is_sub = registry.sub_treatment(slug).is_ok();

    let target = match (is_family, is_sub) {
        (true, true) => {
            return Err(TaxonomyProblem::AmbiguousSlug {
                name: item.name.clone(),
                href: item.href.clone(),
                slug: slug.to_string(),
            });
        }
        (false, false) => {
            return Err(TaxonomyProblem::DanglingHref {
                name: item.name.clone(),
                href: item.href.clone(),
            });
        }
        (true, false) => NavTarget::Family {
            slug: slug.to_string(),
        },
        (false, true) => {
            // The parent segment names the family; fall back to the first family
            // listing this sub so the error can suggest the canonical href.
            let segments = href_segments(&item.href);
            let parent = segments.len().checked_sub(2).map(|i| segments[i]);
            let family = parent
                .filter(|f| registry.family_lists(f, slug))
                .or_else(|| registry.families_containing(slug).next().map(|f| f.slug.as_str()));
            match family {
                Some(family) => NavTarget::SubTreatment {
                    family: family.to_string(),
                    slug: slug.to_string(),
                },
                None => {
                    return Err(TaxonomyProblem::DanglingHref {
                        name: item.name.clone(),
                        href: item.href.clone(),
                    });
                }
            }
        }
    };

    let expected = canonical_href(&target);
    if normalize_href(&item.href) != expected {
        return Err(TaxonomyProblem::NonCanonicalHref {
            name: item.name.clone(),
            href: item.href.clone(),
            expected,
        });
    }
    Ok(target)
}

/// The route a nav target is served from.
pub fn canonical_href(target: &NavTarget) -> String {
    match target {
        NavTarget::Family { slug } => format!("/treatments/{slug}"),
        NavTarget::SubTreatment { family, slug } => format!("/treatments/{family}/{slug}"),
    }
}

fn normalize_href(href: &str) -> String {
    format!("/{}", href_segments(href).join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::*;

    fn item(name: &str, href: &str) -> ItemDecl {
        ItemDecl {
            name: name.to_string(),
            href: href.to_string(),
            alias: false,
        }
    }

    fn declaration(items: Vec<ItemDecl>) -> NavigationDeclaration {
        NavigationDeclaration {
            pillars: vec![PillarDecl {
                name: "Skin".to_string(),
                categories: vec![CategoryDecl {
                    name: "Acne".to_string(),
                    items,
                }],
            }],
            conditions: vec![],
        }
    }

    #[test]
    fn fixture_taxonomy_builds() {
        let registry = fixture_registry();
        let taxonomy = Taxonomy::build(&registry.graph().navigation, &registry).unwrap();
        let pillars: Vec<&str> = taxonomy.pillars.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(pillars, vec!["Skin", "Hair", "Body", "Wellness", "Others"]);
    }

    #[test]
    fn every_fixture_item_resolves_to_one_record() {
        let registry = fixture_registry();
        let taxonomy = Taxonomy::build(&registry.graph().navigation, &registry).unwrap();
        for item in taxonomy.items() {
            assert!(
                registry.resolve(item.target.kind(), item.target.slug()).is_ok(),
                "{} did not resolve",
                item.href
            );
        }
    }

    #[test]
    fn resolves_family_and_sub_treatment_items() {
        let registry = fixture_registry();
        let decl = declaration(vec![
            item("Acne", "/treatments/acne-scar-solutions"),
            item("Peels", "/treatments/acne-scar-solutions/chemical-peels"),
        ]);
        let taxonomy = Taxonomy::build(&decl, &registry).unwrap();
        let targets: Vec<&NavTarget> = taxonomy.items().map(|i| &i.target).collect();
        assert_eq!(
            targets,
            vec![
                &NavTarget::Family {
                    slug: "acne-scar-solutions".into()
                },
                &NavTarget::SubTreatment {
                    family: "acne-scar-solutions".into(),
                    slug: "chemical-peels".into()
                },
            ]
        );
    }

    #[test]
    fn dangling_href_is_fatal() {
        let registry = fixture_registry();
        let decl = declaration(vec![item("Ghost", "/treatments/acne-scar-solutions/ghost")]);
        let err = Taxonomy::build(&decl, &registry).unwrap_err();
        assert!(matches!(err.0[0], TaxonomyProblem::DanglingHref { .. }));
    }

    #[test]
    fn suffix_of_real_slug_does_not_match() {
        let registry = fixture_registry();
        // "peels" is a suffix of "chemical-peels" but not a slug of its own.
        let decl = declaration(vec![item("Peels", "/treatments/acne-scar-solutions/peels")]);
        let err = Taxonomy::build(&decl, &registry).unwrap_err();
        assert!(matches!(err.0[0], TaxonomyProblem::DanglingHref { .. }));
    }

    #[test]
    fn duplicate_href_is_fatal_unless_aliased() {
        let registry = fixture_registry();
        let href = "/treatments/acne-scar-solutions/chemical-peels";
        let decl = declaration(vec![item("Peels", href), item("Peels again", href)]);
        let err = Taxonomy::build(&decl, &registry).unwrap_err();
        assert_eq!(
            err.0,
            vec![TaxonomyProblem::DuplicateHref {
                name: "Peels again".into(),
                href: href.into()
            }]
        );

        let mut aliased = item("Peels again", href);
        aliased.alias = true;
        let decl = declaration(vec![item("Peels", href), aliased]);
        assert!(Taxonomy::build(&decl, &registry).is_ok());
    }

    #[test]
    fn two_hrefs_to_one_record_need_alias() {
        let mut graph = fixture_graph();
        graph.families[1]
            .sub_treatments
            .push("chemical-peels".to_string());
        let registry = ContentRegistry::new(graph).unwrap();
        let first = "/treatments/acne-scar-solutions/chemical-peels";
        let second = "/treatments/skin-rejuvenation/chemical-peels";

        let decl = declaration(vec![item("Peels", first), item("Peels (rejuvenation)", second)]);
        let err = Taxonomy::build(&decl, &registry).unwrap_err();
        assert_eq!(
            err.0,
            vec![TaxonomyProblem::DuplicateTarget {
                name: "Peels (rejuvenation)".into(),
                href: second.into(),
                kind: ContentKind::SubTreatment,
                slug: "chemical-peels".into(),
            }]
        );

        let mut aliased = item("Peels (rejuvenation)", second);
        aliased.alias = true;
        let decl = declaration(vec![item("Peels", first), aliased]);
        let taxonomy = Taxonomy::build(&decl, &registry).unwrap();
        assert_eq!(taxonomy.items().count(), 2);
    }

    #[test]
    fn sub_treatment_under_wrong_family_suggests_canonical_href() {
        let registry = fixture_registry();
        let decl = declaration(vec![item("Peels", "/treatments/chemical-peels")]);
        let err = Taxonomy::build(&decl, &registry).unwrap_err();
        assert_eq!(
            err.0,
            vec![TaxonomyProblem::NonCanonicalHref {
                name: "Peels".into(),
                href: "/treatments/chemical-peels".into(),
                expected: "/treatments/acne-scar-solutions/chemical-peels".into(),
            }]
        );
    }

    #[test]
    fn trailing_slash_is_canonical() {
        let registry = fixture_registry();
        let decl = declaration(vec![item("Acne", "/treatments/acne-scar-solutions/")]);
        assert!(Taxonomy::build(&decl, &registry).is_ok());
    }

    #[test]
    fn unknown_and_repeated_conditions_are_reported() {
        let registry = fixture_registry();
        let mut decl = declaration(vec![]);
        decl.conditions = vec![
            ConditionEntry {
                slug: "acne-breakouts".into(),
                name: "Acne".into(),
            },
            ConditionEntry {
                slug: "acne-breakouts".into(),
                name: "Acne".into(),
            },
            ConditionEntry {
                slug: "sunburn".into(),
                name: "Sunburn".into(),
            },
        ];
        let err = Taxonomy::build(&decl, &registry).unwrap_err();
        assert_eq!(err.0.len(), 2);
        assert!(err.to_string().contains("2 problem(s)"));
        assert!(err.to_string().contains("sunburn"));
    }

    #[test]
    fn all_problems_are_collected() {
        let registry = fixture_registry();
        let decl = declaration(vec![item("A", "/treatments/nope"), item("B", "/")]);
        let err = Taxonomy::build(&decl, &registry).unwrap_err();
        assert_eq!(err.0.len(), 2);
    }

    #[test]
    fn pillar_lookup_for_breadcrumbs() {
        let registry = fixture_registry();
        let taxonomy = Taxonomy::build(&registry.graph().navigation, &registry).unwrap();
        assert_eq!(taxonomy.pillar_of_family("laser-hair-reduction"), Some("Hair"));
        assert_eq!(taxonomy.pillar_of_family("nope"), None);
    }
}
