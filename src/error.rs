//! Unified error handling for the pokegraph crate
//!
//! This module provides a unified error type that consolidates the
//! domain-specific errors into a single `Error` enum, while keeping the
//! domain errors usable on their own.
//!
//! # Architecture
//!
//! - [`PokegraphErrorTrait`] - Common interface implemented by all error types
//! - [`ErrorCategory`] - Classification of errors for handling strategies
//! - [`Error`] - Unified error enum wrapping all domain-specific errors
//!
//! The build pipeline classifies each entity failure through
//! [`PokegraphErrorTrait`], and the commands wrap library errors in
//! [`Error`] to decide how to report them.
//!
//! # Usage
//!
//! ```
//! use pokegraph::error::{Error, ErrorCategory, PokegraphErrorTrait};
//! use pokegraph::utils::error::FetchError;
//!
//! let err = Error::from(FetchError::ServerError(503));
//! assert!(err.is_recoverable());
//! assert_eq!(err.category(), ErrorCategory::Network);
//! assert_eq!(err.summary(), "upstream returned HTTP 503");
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

// Re-export domain-specific errors for convenience
pub use crate::shacl::ValidationError;
pub use crate::store::PublishError;
pub use crate::translation::TranslationError;
pub use crate::utils::error::{CrawlerError, FetchError, ParseError};

/// Common trait for all pokegraph error types
///
/// This trait provides a unified interface for error handling across
/// all modules, enabling consistent error processing strategies.
pub trait PokegraphErrorTrait: std::error::Error {
    /// Check if this error is recoverable (a later run may succeed)
    fn is_recoverable(&self) -> bool;

    /// Get a short user-facing summary
    fn summary(&self) -> String;

    /// Get the error category for handling strategies
    fn category(&self) -> ErrorCategory;
}

/// Classification of errors for handling strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorCategory {
    /// Network-related errors (HTTP, timeout, upstream status)
    Network,
    /// Parsing and data extraction errors
    Parsing,
    /// Local file and remote store write errors
    Storage,
    /// Schema validation errors
    Validation,
}

impl ErrorCategory {
    /// Get a human-readable label for the category
    pub fn label(&self) -> &'static str {
        match self {
            Self::Network => "network error",
            Self::Parsing => "parsing error",
            Self::Storage => "storage error",
            Self::Validation => "validation error",
        }
    }
}

/// Unified error type for the pokegraph crate
#[derive(Error, Debug)]
pub enum Error {
    /// Crawler-related errors (fetch, parse)
    #[error("Crawler error: {0}")]
    Crawler(#[from] CrawlerError),

    /// Fetch-specific errors
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// Translation table loading errors
    #[error("Translation error: {0}")]
    Translation(#[from] TranslationError),

    /// Serializer/publisher errors
    #[error("Publish error: {0}")]
    Publish(#[from] PublishError),

    /// Schema validator errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl PokegraphErrorTrait for FetchError {
    fn is_recoverable(&self) -> bool {
        match self {
            Self::Http(_) | Self::Timeout => true,
            Self::ServerError(code) => *code == 429 || *code >= 500,
            Self::MaxRetriesExceeded { last_status, .. } => {
                last_status.map_or(true, |code| code == 429 || code >= 500)
            }
            Self::Decode(_) | Self::InvalidUrl(_) => false,
        }
    }

    fn summary(&self) -> String {
        match self {
            Self::Http(_) => "HTTP request failed".to_string(),
            Self::ServerError(code) => format!("upstream returned HTTP {code}"),
            Self::Timeout => "request timed out".to_string(),
            Self::MaxRetriesExceeded { attempts, .. } => {
                format!("gave up after {attempts} attempts")
            }
            Self::Decode(_) => "response body could not be decoded".to_string(),
            Self::InvalidUrl(url) => format!("invalid URL {url}"),
        }
    }

    fn category(&self) -> ErrorCategory {
        ErrorCategory::Network
    }
}

impl PokegraphErrorTrait for ParseError {
    fn is_recoverable(&self) -> bool {
        false
    }

    fn summary(&self) -> String {
        match self {
            Self::InfoboxNotFound { .. } => "infobox not found".to_string(),
            Self::InvalidJson(_) => "listing response is not valid JSON".to_string(),
        }
    }

    fn category(&self) -> ErrorCategory {
        ErrorCategory::Parsing
    }
}

impl PokegraphErrorTrait for CrawlerError {
    fn is_recoverable(&self) -> bool {
        match self {
            Self::Fetch(e) => e.is_recoverable(),
            Self::Parse(e) => e.is_recoverable(),
            Self::InvalidEntityName(_) => false,
        }
    }

    fn summary(&self) -> String {
        match self {
            Self::Fetch(e) => e.summary(),
            Self::Parse(e) => e.summary(),
            Self::InvalidEntityName(name) => format!("invalid entity name {name}"),
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::Fetch(_) => ErrorCategory::Network,
            Self::Parse(_) | Self::InvalidEntityName(_) => ErrorCategory::Parsing,
        }
    }
}

impl PokegraphErrorTrait for Error {
    fn is_recoverable(&self) -> bool {
        match self {
            Self::Crawler(e) => e.is_recoverable(),
            Self::Fetch(e) => e.is_recoverable(),
            Self::Translation(_) => false,
            Self::Publish(e) => e.is_transient(),
            Self::Validation(e) => matches!(e, ValidationError::Fetch { .. }),
        }
    }

    fn summary(&self) -> String {
        match self {
            Self::Crawler(e) => e.summary(),
            Self::Fetch(e) => e.summary(),
            Self::Translation(e) => e.to_string(),
            Self::Publish(e) => e.to_string(),
            Self::Validation(e) => e.to_string(),
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::Crawler(e) => e.category(),
            Self::Fetch(_) => ErrorCategory::Network,
            Self::Translation(_) => ErrorCategory::Storage,
            Self::Publish(PublishError::Rejected { .. } | PublishError::Http(_)) => {
                ErrorCategory::Network
            }
            Self::Publish(PublishError::LocalWrite { .. }) => ErrorCategory::Storage,
            Self::Validation(ValidationError::Fetch { .. }) => ErrorCategory::Network,
            Self::Validation(_) => ErrorCategory::Validation,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_category() {
        let fetch_err = Error::Fetch(FetchError::Timeout);
        assert_eq!(fetch_err.category(), ErrorCategory::Network);

        let parse_err = Error::Crawler(CrawlerError::Parse(ParseError::InfoboxNotFound {
            entity: "Bulbasaur".to_string(),
        }));
        assert_eq!(parse_err.category(), ErrorCategory::Parsing);

        let publish_err = Error::Publish(PublishError::Rejected {
            status: 500,
            reason: "Internal Server Error".to_string(),
        });
        assert_eq!(publish_err.category(), ErrorCategory::Network);
    }

    #[test]
    fn test_is_recoverable() {
        assert!(Error::Fetch(FetchError::Timeout).is_recoverable());
        assert!(Error::Fetch(FetchError::ServerError(503)).is_recoverable());
        assert!(!Error::Fetch(FetchError::ServerError(404)).is_recoverable());
        assert!(!FetchError::MaxRetriesExceeded {
            attempts: 1,
            last_status: Some(404)
        }
        .is_recoverable());

        let parse_err = CrawlerError::Parse(ParseError::InfoboxNotFound {
            entity: "MissingNo.".to_string(),
        });
        assert!(!parse_err.is_recoverable());
    }

    #[test]
    fn test_summary() {
        let err = Error::Fetch(FetchError::ServerError(404));
        assert_eq!(err.summary(), "upstream returned HTTP 404");

        let err = Error::from(CrawlerError::InvalidEntityName("a/b".to_string()));
        assert_eq!(err.summary(), "invalid entity name a/b");
    }

    #[test]
    fn test_error_conversion() {
        let crawler_err = CrawlerError::Fetch(FetchError::ServerError(429));
        let unified: Error = crawler_err.into();
        assert!(matches!(unified, Error::Crawler(_)));
        assert_eq!(unified.category(), ErrorCategory::Network);
        assert!(unified.is_recoverable());
    }
}
