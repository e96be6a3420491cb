//! HTML parsing and entity extraction
//!
//! This module turns a Bulbapedia species page into an
//! [`ExtractedEntity`](crate::models::ExtractedEntity).

pub mod infobox;
pub mod sanitize;
pub mod selectors;

pub use infobox::InfoboxParser;

use std::sync::Arc;

use crate::crawler::fetcher::WikiFetcher;
use crate::models::ExtractedEntity;
use crate::utils::error::CrawlerError;

/// Fetches and parses one entity page
pub struct PageExtractor {
    fetcher: Arc<WikiFetcher>,
    parser: InfoboxParser,
}

impl PageExtractor {
    pub fn new(fetcher: Arc<WikiFetcher>) -> Self {
        Self {
            fetcher,
            parser: InfoboxParser::new(),
        }
    }

    /// Extract one entity
    ///
    /// # Errors
    ///
    /// - `CrawlerError::InvalidEntityName` for a blank name
    /// - `CrawlerError::Fetch` on a non-success status or network failure
    /// - `CrawlerError::Parse` when the page has no infobox
    pub async fn extract(&self, name: &str) -> Result<ExtractedEntity, CrawlerError> {
        if name.trim().is_empty() {
            return Err(CrawlerError::InvalidEntityName(name.to_string()));
        }

        let html = self.fetcher.fetch_page(name).await?;
        let entity = self.parser.parse(name, &html)?;

        tracing::debug!(
            entity = name,
            name = %entity.canonical_name,
            category = %entity.category,
            "Extracted entity"
        );

        Ok(entity)
    }

    pub fn fetcher(&self) -> &WikiFetcher {
        &self.fetcher
    }
}
