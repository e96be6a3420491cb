//! pokegraph - Pokémon knowledge graph builder
//!
//! Scrapes entity infoboxes from a MediaWiki site, joins them with a
//! multilingual name table, publishes the result as Turtle to a triple store
//! and validates the stored graph against SHACL shapes.
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - [`config`] - Configuration management and settings
//! - [`translation`] - Tab-separated translation table and language tags
//! - [`crawler`] - Category listing, rate-limited fetching and the build loop
//! - [`parser`] - Infobox extraction from entity pages
//! - [`models`] - Extracted entities and run statistics
//! - [`ontology`] - RDF graph model, Turtle I/O and graph assembly
//! - [`store`] - Triple store client and publisher
//! - [`shacl`] - Shape loading and validation
//! - [`utils`] - Common utilities and helpers
//!
//! # Example
//!
//! ```no_run
//! use pokegraph::config::Config;
//! use pokegraph::crawler::BuildPipeline;
//! use pokegraph::translation::TranslationIndex;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env()?;
//!     let translations = TranslationIndex::load(&config.data.translations_path)?;
//!     let pipeline = BuildPipeline::from_config(&config, translations)?;
//!     let output = pipeline.run().await?;
//!     println!("{}", output.stats.report());
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod crawler;
pub mod error;
pub mod models;
pub mod ontology;
pub mod parser;
pub mod shacl;
pub mod store;
pub mod translation;
pub mod utils;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::Config;
    pub use crate::crawler::{BuildPipeline, PipelineOutput, WikiFetcher};
    pub use crate::error::{Error, ErrorCategory, PokegraphErrorTrait};
    pub use crate::models::{ExtractedEntity, RunStats};
    pub use crate::ontology::{Graph, GraphAssembler, Term, TurtleWriter};
    pub use crate::shacl::{SchemaValidator, ValidationReport};
    pub use crate::store::{Publisher, StoreClient};
    pub use crate::translation::TranslationIndex;
}

// Direct re-exports for convenience
pub use models::{ExtractedEntity, RunStats};
