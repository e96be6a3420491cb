//! SHACL validation of the published graph
//!
//! The [`SchemaValidator`] reads the data graph back from the store and the
//! shape document from disk, then evaluates the shapes locally:
//!
//! - [`shapes`] - shape model, read from a shape [`Graph`]
//! - [`validator`] - constraint evaluation (pure)
//! - [`report`] - results and their text rendering

pub mod report;
pub mod shapes;
pub mod validator;

pub use report::{ValidationReport, ValidationResult};
pub use shapes::{ShapeError, ShapesGraph, Severity};

use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::config::Config;
use crate::ontology::graph::Graph;
use crate::ontology::turtle::parse_turtle_str;
use crate::store::StoreClient;

/// Errors that prevent a validation run from producing a report
#[derive(Error, Debug)]
pub enum ValidationError {
    /// The data graph or the shape document could not be retrieved
    #[error("failed to fetch {origin}: {reason}")]
    Fetch { origin: String, reason: String },

    /// Retrieved Turtle could not be parsed
    #[error("invalid Turtle in {origin}: {reason}")]
    Syntax { origin: String, reason: String },

    /// The shape document parsed but describes invalid shapes
    #[error("invalid shapes: {0}")]
    InvalidShapes(#[from] ShapeError),
}

/// Validates the store's graph against a local shape document
pub struct SchemaValidator {
    store: StoreClient,
    shapes_path: PathBuf,
}

impl SchemaValidator {
    pub fn new(store: StoreClient, shapes_path: impl Into<PathBuf>) -> Self {
        Self {
            store,
            shapes_path: shapes_path.into(),
        }
    }

    /// Build a validator from the application configuration
    pub fn from_config(config: &Config) -> Result<Self, reqwest::Error> {
        Ok(Self::new(
            StoreClient::from_config(config)?,
            config.data.shapes_path.clone(),
        ))
    }

    pub fn shapes_path(&self) -> &Path {
        &self.shapes_path
    }

    /// Read and interpret the shape document
    pub async fn load_shapes(&self) -> Result<ShapesGraph, ValidationError> {
        let origin = self.shapes_path.display().to_string();
        let text = tokio::fs::read_to_string(&self.shapes_path)
            .await
            .map_err(|e| ValidationError::Fetch {
                origin: origin.clone(),
                reason: e.to_string(),
            })?;

        let graph = parse_turtle_str(&text).map_err(|e| ValidationError::Syntax {
            origin,
            reason: e.to_string(),
        })?;

        let shapes = ShapesGraph::from_graph(&graph)?;
        tracing::debug!(path = %self.shapes_path.display(), shapes = shapes.len(), "Loaded shapes");
        Ok(shapes)
    }

    /// GET the data graph from the store
    pub async fn fetch_data(&self) -> Result<Graph, ValidationError> {
        let origin = self.store.data_url().to_string();
        let text = self
            .store
            .read_turtle()
            .await
            .map_err(|e| ValidationError::Fetch {
                origin: origin.clone(),
                reason: e.to_string(),
            })?;

        let graph = parse_turtle_str(&text).map_err(|e| ValidationError::Syntax {
            origin,
            reason: e.to_string(),
        })?;

        tracing::debug!(endpoint = %self.store.data_url(), triples = graph.len(), "Fetched data graph");
        Ok(graph)
    }

    /// Pull the graph, load the shapes and validate
    ///
    /// A non-conforming graph is a successful run with `conforms: false`.
    ///
    /// # Errors
    ///
    /// - `ValidationError::Fetch` if the store or the shape file is unreachable
    /// - `ValidationError::Syntax` if either document is not valid Turtle
    /// - `ValidationError::InvalidShapes` if the shape document is malformed
    pub async fn validate(&self) -> Result<ValidationReport, ValidationError> {
        let data = self.fetch_data().await?;
        let shapes = self.load_shapes().await?;

        let report = shapes.validate(&data);
        if report.conforms {
            tracing::info!(
                focus_nodes = report.focus_nodes,
                triples = data.len(),
                "Graph conforms to shapes"
            );
        } else {
            tracing::warn!(
                results = report.results.len(),
                violations = report.violations().count(),
                focus_nodes = report.focus_nodes,
                "Graph does not conform to shapes"
            );
        }
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn unreachable_store() -> StoreClient {
        StoreClient::new("http://127.0.0.1:9", "Pokemon", Duration::from_secs(1)).unwrap()
    }

    #[tokio::test]
    async fn test_missing_shapes_file_is_fetch_error() {
        let validator = SchemaValidator::new(unreachable_store(), "/nonexistent/shapes.ttl");
        let err = validator.load_shapes().await.unwrap_err();
        assert!(matches!(err, ValidationError::Fetch { ref origin, .. } if origin.contains("shapes.ttl")));
    }

    #[tokio::test]
    async fn test_invalid_shapes_syntax() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shapes.ttl");
        std::fs::write(&path, "this is not turtle").unwrap();

        let validator = SchemaValidator::new(unreachable_store(), &path);
        let err = validator.load_shapes().await.unwrap_err();
        assert!(matches!(err, ValidationError::Syntax { .. }));
    }

    #[tokio::test]
    async fn test_unreachable_store_is_fetch_error() {
        let validator = SchemaValidator::new(unreachable_store(), "data/shapes.ttl");
        let err = validator.validate().await.unwrap_err();
        match err {
            ValidationError::Fetch { origin, .. } => {
                assert_eq!(origin, "http://127.0.0.1:9/Pokemon/data");
            }
            other => panic!("expected fetch error, got {other:?}"),
        }
    }
}
