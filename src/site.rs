//! The validated site: registry, taxonomy and config, assembled once.
//!
//! [`Site::new`] is the build-time integrity gate. It indexes the scanned
//! content, checks every cross-reference, and validates the navigation menu.
//! Any failure aborts the build before a single page is written.

use crate::config::SiteConfig;
use crate::registry::{ContentRegistry, IntegrityError};
use crate::scan::Manifest;
use crate::taxonomy::{Taxonomy, TaxonomyError};
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum SiteError {
    #[error(transparent)]
    Integrity(#[from] IntegrityError),
    #[error(transparent)]
    Taxonomy(#[from] TaxonomyError),
}

#[derive(Debug)]
pub struct Site {
    pub registry: ContentRegistry,
    pub taxonomy: Taxonomy,
    pub config: SiteConfig,
}

impl Site {
    pub fn new(manifest: Manifest) -> Result<Self, SiteError> {
        let Manifest { content, config } = manifest;
        let registry = ContentRegistry::new(content)?;
        registry.check_references()?;
        let taxonomy = Taxonomy::build(&registry.graph().navigation, &registry)?;
        info!(
            menu_items = taxonomy.items().count(),
            conditions = taxonomy.conditions.len(),
            "content graph validated"
        );
        Ok(Self {
            registry,
            taxonomy,
            config,
        })
    }
}
