//! Category listing with pagination support
//!
//! Queries the MediaWiki `categorymembers` API and turns page titles into
//! entity names.

use serde::Deserialize;
use std::collections::HashSet;
use std::sync::Arc;
use url::Url;

use crate::config::SourceConfig;
use crate::crawler::fetcher::{WikiFetcher, ACCEPT_JSON};
use crate::utils::error::{CrawlerError, FetchError, ParseError};

/// MediaWiki's upper bound for `cmlimit`
pub const MAX_PAGE_SIZE: u32 = 500;

/// Listing parameters
#[derive(Debug, Clone)]
pub struct ListingOptions {
    /// `api.php` endpoint
    pub api_url: String,

    /// Category name without the `Category:` prefix
    pub category: String,

    /// Members per request
    pub page_size: u32,

    /// Maximum requests to follow (0 = unlimited)
    pub max_pages: u32,

    /// Removed from every title
    pub title_suffix: String,

    /// Names dropped from the listing
    pub excluded_titles: Vec<String>,
}

impl Default for ListingOptions {
    fn default() -> Self {
        Self::from(&SourceConfig::default())
    }
}

impl From<&SourceConfig> for ListingOptions {
    fn from(source: &SourceConfig) -> Self {
        Self {
            api_url: source.api_url.clone(),
            category: source.category.clone(),
            page_size: source.page_size,
            max_pages: source.max_pages,
            title_suffix: source.title_suffix.clone(),
            excluded_titles: source.excluded_titles.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct CategoryResponse {
    #[serde(default)]
    query: Option<CategoryQuery>,

    #[serde(default, rename = "continue")]
    continuation: Option<Continuation>,
}

#[derive(Debug, Deserialize)]
struct CategoryQuery {
    #[serde(default)]
    categorymembers: Vec<CategoryMember>,
}

#[derive(Debug, Deserialize)]
struct CategoryMember {
    #[serde(default)]
    title: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Continuation {
    #[serde(default)]
    cmcontinue: Option<String>,
}

/// One parsed listing response
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingPage {
    /// Raw member titles in API order
    pub titles: Vec<String>,

    /// Token for the next request, if any
    pub next: Option<String>,
}

/// Parse a `categorymembers` response body
///
/// Missing `query` or `categorymembers` yields an empty page.
///
/// # Errors
///
/// Returns `ParseError::InvalidJson` if the body is not valid JSON
pub fn parse_listing(body: &str) -> Result<ListingPage, ParseError> {
    let response: CategoryResponse =
        serde_json::from_str(body).map_err(|e| ParseError::InvalidJson(e.to_string()))?;

    let titles = response
        .query
        .map(|q| q.categorymembers)
        .unwrap_or_default()
        .into_iter()
        .filter_map(|m| m.title)
        .collect();

    Ok(ListingPage {
        titles,
        next: response.continuation.and_then(|c| c.cmcontinue),
    })
}

/// Fetches the list of entity names
pub struct EntityListFetcher {
    fetcher: Arc<WikiFetcher>,
    options: ListingOptions,
}

impl EntityListFetcher {
    /// Create a list fetcher sharing `fetcher` (and its rate limiter)
    #[must_use]
    pub fn new(fetcher: Arc<WikiFetcher>, options: ListingOptions) -> Self {
        Self { fetcher, options }
    }

    pub fn options(&self) -> &ListingOptions {
        &self.options
    }

    /// URL of one listing request
    ///
    /// # Errors
    ///
    /// Returns `FetchError::InvalidUrl` if `api_url` does not parse
    pub fn listing_url(&self, continue_token: Option<&str>) -> Result<String, FetchError> {
        let mut url = Url::parse(&self.options.api_url)
            .map_err(|e| FetchError::InvalidUrl(format!("{}: {e}", self.options.api_url)))?;

        let page_size = self.options.page_size.clamp(1, MAX_PAGE_SIZE);
        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("action", "query")
                .append_pair("list", "categorymembers")
                .append_pair("cmtitle", &format!("Category:{}", self.options.category))
                .append_pair("cmlimit", &page_size.to_string())
                .append_pair("format", "json");
            if let Some(token) = continue_token {
                query.append_pair("cmcontinue", token);
            }
        }

        Ok(url.into())
    }

    /// Turn a page title into an entity name
    ///
    /// Returns `None` for excluded or empty titles.
    pub fn normalize_title(&self, title: &str) -> Option<String> {
        let name = if self.options.title_suffix.is_empty() {
            title.trim().to_string()
        } else {
            title.replace(&self.options.title_suffix, "").trim().to_string()
        };

        if name.is_empty() || self.options.excluded_titles.iter().any(|t| *t == name) {
            None
        } else {
            Some(name)
        }
    }

    /// List entity names in API order
    ///
    /// Follows continuation tokens up to `max_pages` requests. Duplicate
    /// names across pages are kept once.
    ///
    /// # Errors
    ///
    /// Any fetch or parse failure aborts the listing
    pub async fn list_entities(&self) -> Result<Vec<String>, CrawlerError> {
        let mut names = Vec::new();
        let mut seen = HashSet::new();
        let mut token: Option<String> = None;
        let mut page = 1;

        loop {
            if self.options.max_pages > 0 && page > self.options.max_pages {
                tracing::debug!(page, max_pages = self.options.max_pages, "Reached maximum pages limit");
                break;
            }

            let url = self.listing_url(token.as_deref())?;
            tracing::debug!(page, url = %url, "Fetching category listing");

            let body = self.fetcher.get_text(&url, ACCEPT_JSON).await?;
            let listing = parse_listing(&body)?;

            let before = names.len();
            for title in &listing.titles {
                if let Some(name) = self.normalize_title(title) {
                    if seen.insert(name.clone()) {
                        names.push(name);
                    }
                } else {
                    tracing::trace!(title = %title, "Skipping excluded title");
                }
            }

            tracing::debug!(
                page,
                members = listing.titles.len(),
                new_names = names.len() - before,
                "Listing page processed"
            );

            match listing.next {
                Some(next) => token = Some(next),
                None => break,
            }
            page += 1;
        }

        tracing::info!(
            category = %self.options.category,
            entities = names.len(),
            "Listed category members"
        );

        Ok(names)
    }
}
