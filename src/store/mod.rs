//! Triple store access and graph publishing
//!
//! [`StoreClient`] talks to a Fuseki dataset over the Graph Store Protocol:
//! `POST {url}/{dataset}/data` appends Turtle to the default graph and
//! `GET` on the same path reads it back.
//!
//! [`Publisher`] writes the serialized graph to a local file, then POSTs the
//! same text to the store. A rejected POST does not remove the local file.

use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::Client;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::config::Config;
use crate::ontology::graph::Graph;
use crate::ontology::turtle::TurtleWriter;
use crate::parser::sanitize::strip_markup;
use crate::utils::{format_bytes, truncate_text};

/// Media type of the published body
pub const TURTLE_CONTENT_TYPE: &str = "text/turtle; charset=utf-8";

/// Errors raised while publishing the graph
#[derive(Error, Debug)]
pub enum PublishError {
    /// The local Turtle file could not be written
    #[error("failed to write {}: {source}", path.display())]
    LocalWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The store answered with a non-success status
    #[error("store rejected the graph: HTTP {status} {reason}")]
    Rejected { status: u16, reason: String },

    /// The store could not be reached
    #[error("store request failed: {0}")]
    Http(#[from] reqwest::Error),
}

impl PublishError {
    /// Whether a later attempt could succeed
    pub fn is_transient(&self) -> bool {
        match self {
            Self::LocalWrite { .. } => false,
            Self::Rejected { status, .. } => *status == 429 || *status >= 500,
            Self::Http(e) => e.is_timeout() || e.is_connect(),
        }
    }

    /// HTTP status carried by the error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Rejected { status, .. } => Some(*status),
            Self::Http(e) => e.status().map(|s| s.as_u16()),
            Self::LocalWrite { .. } => None,
        }
    }
}

/// Errors raised while reading the graph back from the store
#[derive(Error, Debug)]
pub enum StoreReadError {
    /// The store could not be reached
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The store answered with a non-success status
    #[error("HTTP {status} {reason}")]
    Status { status: u16, reason: String },
}

/// Graph Store Protocol client for one dataset
#[derive(Debug, Clone)]
pub struct StoreClient {
    client: Client,
    data_url: String,
}

impl StoreClient {
    /// Create a client for `{base_url}/{dataset}/data`
    ///
    /// # Errors
    ///
    /// Returns the builder error if the HTTP client cannot be created
    pub fn new(base_url: &str, dataset: &str, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            data_url: format!("{}/{dataset}/data", base_url.trim_end_matches('/')),
        })
    }

    /// Create a client from the application configuration
    pub fn from_config(config: &Config) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(config.request_timeout()).build()?;
        Ok(Self {
            client,
            data_url: config.store_data_url(),
        })
    }

    /// Endpoint of the dataset's default graph
    pub fn data_url(&self) -> &str {
        &self.data_url
    }

    /// POST a Turtle document to the default graph
    ///
    /// Returns the success status code.
    ///
    /// # Errors
    ///
    /// - `PublishError::Http` if the store is unreachable
    /// - `PublishError::Rejected` on a non-success status
    pub async fn post_turtle(&self, body: String) -> Result<u16, PublishError> {
        let response = self
            .client
            .post(&self.data_url)
            .header(CONTENT_TYPE, TURTLE_CONTENT_TYPE)
            .body(body)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(status.as_u16());
        }

        let text = response.text().await.unwrap_or_default();
        tracing::debug!(status = status.as_u16(), body = %truncate_text(&text, 500), "Store rejected POST");

        Err(PublishError::Rejected {
            status: status.as_u16(),
            reason: rejection_reason(status, &text),
        })
    }

    /// GET the default graph as Turtle
    ///
    /// # Errors
    ///
    /// - `StoreReadError::Http` if the store is unreachable
    /// - `StoreReadError::Status` on a non-success status
    pub async fn read_turtle(&self) -> Result<String, StoreReadError> {
        let response = self
            .client
            .get(&self.data_url)
            .header(ACCEPT, "text/turtle")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(StoreReadError::Status {
                status: status.as_u16(),
                reason: rejection_reason(status, &text),
            });
        }

        Ok(response.text().await?)
    }
}

fn rejection_reason(status: reqwest::StatusCode, body: &str) -> String {
    let canonical = status.canonical_reason().unwrap_or("Unknown");
    let body = strip_markup(body);
    if body.is_empty() {
        canonical.to_string()
    } else {
        format!("{canonical}: {}", truncate_text(&body, 200))
    }
}

/// Outcome of a publish
#[derive(Debug, Clone, Serialize)]
pub struct PublishReport {
    /// Where the Turtle file was written
    pub local_path: PathBuf,

    /// Size of the serialized graph
    pub bytes: usize,

    pub triples: usize,

    /// Store endpoint, when the graph was POSTed
    pub endpoint: Option<String>,

    /// Success status returned by the store
    pub status: Option<u16>,
}

impl PublishReport {
    /// One-line summary for the command output
    pub fn summary(&self) -> String {
        let mut out = format!(
            "Wrote {} triples ({}) to {}",
            self.triples,
            format_bytes(self.bytes as u64),
            self.local_path.display()
        );
        if let (Some(endpoint), Some(status)) = (&self.endpoint, self.status) {
            out.push_str(&format!("; published to {endpoint} (HTTP {status})"));
        }
        out
    }
}

/// Serializes the graph and publishes it
pub struct Publisher {
    store: StoreClient,
    writer: TurtleWriter,
}

impl Publisher {
    pub fn new(store: StoreClient) -> Self {
        Self {
            store,
            writer: TurtleWriter::new(),
        }
    }

    pub fn store(&self) -> &StoreClient {
        &self.store
    }

    /// Write the local file, then POST the same text to the store
    ///
    /// # Errors
    ///
    /// - `PublishError::LocalWrite` if the file cannot be written; nothing
    ///   is sent in that case
    /// - `PublishError::Rejected` / `PublishError::Http` if the POST fails;
    ///   the local file is kept
    pub async fn publish(&self, graph: &Graph, local_path: &Path) -> Result<PublishReport, PublishError> {
        let turtle = self.writer.write(graph);
        let mut report = write_local(&turtle, graph.len(), local_path).await?;

        match self.store.post_turtle(turtle).await {
            Ok(status) => {
                tracing::info!(
                    endpoint = %self.store.data_url(),
                    status,
                    triples = graph.len(),
                    "Published graph"
                );
                report.endpoint = Some(self.store.data_url().to_string());
                report.status = Some(status);
                Ok(report)
            }
            Err(e) => {
                tracing::error!(
                    endpoint = %self.store.data_url(),
                    error = %e,
                    local = %local_path.display(),
                    "Publishing failed, local file kept"
                );
                Err(e)
            }
        }
    }

    /// Write only the local file
    pub async fn write_only(&self, graph: &Graph, local_path: &Path) -> Result<PublishReport, PublishError> {
        let turtle = self.writer.write(graph);
        write_local(&turtle, graph.len(), local_path).await
    }
}

async fn write_local(turtle: &str, triples: usize, path: &Path) -> Result<PublishReport, PublishError> {
    let local_write = |source| PublishError::LocalWrite {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(local_write)?;
    }
    tokio::fs::write(path, turtle.as_bytes())
        .await
        .map_err(local_write)?;

    tracing::info!(path = %path.display(), triples, bytes = turtle.len(), "Wrote Turtle file");

    Ok(PublishReport {
        local_path: path.to_path_buf(),
        bytes: turtle.len(),
        triples,
        endpoint: None,
        status: None,
    })
}
