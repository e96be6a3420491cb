//! Error types for the pokegraph crawler
//!
//! This module defines the error types shared by the fetching, parsing and
//! translation-loading stages.

use thiserror::Error;

/// Errors that can occur during HTTP fetching operations
#[derive(Error, Debug)]
pub enum FetchError {
    /// HTTP request error
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Upstream answered with a non-success status code
    #[error("Server error: {0}")]
    ServerError(u16),

    /// Request timeout, or the run deadline passed
    #[error("Request timeout")]
    Timeout,

    /// Maximum retry attempts exceeded
    #[error("Maximum retry attempts exceeded after {attempts} attempts (last status: {last_status:?})")]
    MaxRetriesExceeded {
        attempts: u32,
        last_status: Option<u16>,
    },

    /// Content decoding error
    #[error("Decoding error: {0}")]
    Decode(String),

    /// Invalid URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl FetchError {
    /// Status code carried by this error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::ServerError(code) => Some(*code),
            Self::MaxRetriesExceeded { last_status, .. } => *last_status,
            Self::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

/// Errors that can occur during parsing operations
#[derive(Error, Debug)]
pub enum ParseError {
    /// The infobox table is missing from the entity page
    #[error("infobox not found for {entity}")]
    InfoboxNotFound { entity: String },

    /// Listing API returned a body that is not JSON
    #[error("Invalid JSON in listing response: {0}")]
    InvalidJson(String),
}

/// A translation table row that cannot be parsed
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DataFormatError {
    /// Row does not split into the expected number of tab-separated columns
    #[error("line {line}: expected {expected} tab-separated columns, found {found}")]
    ColumnCount {
        line: usize,
        expected: usize,
        found: usize,
    },
}

/// General crawler errors
#[derive(Error, Debug)]
pub enum CrawlerError {
    /// Fetch error
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    /// Entity name cannot be turned into a page URL
    #[error("Invalid entity name: {0}")]
    InvalidEntityName(String),
}
