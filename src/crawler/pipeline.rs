//! Sequential build pipeline
//!
//! Lists the category, then for each entity in turn: fetch + extract,
//! assemble into the graph. One entity's failure is logged and recorded in
//! [`RunStats`], and the loop moves on.
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │   Listing   │────▶│    Page     │────▶│    Graph    │
//! │   fetcher   │     │  extractor  │     │  assembler  │
//! └─────────────┘     └─────────────┘     └─────────────┘
//!                            │                   │
//!                            └───── RunStats ────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use pokegraph::config::Config;
//! use pokegraph::crawler::pipeline::BuildPipeline;
//! use pokegraph::translation::TranslationIndex;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = Config::default();
//! let translations = TranslationIndex::load(&config.data.translations_path)?;
//! let output = BuildPipeline::from_config(&config, translations)?.run().await?;
//!
//! println!("{}", output.stats.report());
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use crate::config::Config;
use crate::crawler::fetcher::WikiFetcher;
use crate::crawler::list::{EntityListFetcher, ListingOptions};
use crate::models::RunStats;
use crate::ontology::assembler::{AssemblerOptions, GraphAssembler};
use crate::ontology::graph::Graph;
use crate::parser::PageExtractor;
use crate::translation::TranslationIndex;
use crate::utils::error::{CrawlerError, FetchError};

// ============================================================================
// Output
// ============================================================================

/// Graph and statistics of a finished run
#[derive(Debug)]
pub struct PipelineOutput {
    pub graph: Graph,
    pub stats: RunStats,
}

// ============================================================================
// Pipeline Implementation
// ============================================================================

/// Build pipeline owning the run's graph
pub struct BuildPipeline {
    lister: EntityListFetcher,
    extractor: PageExtractor,
    translations: TranslationIndex,
    assembler: GraphAssembler,

    /// Process at most this many entities (0 = all)
    limit: usize,
}

impl BuildPipeline {
    /// Create a pipeline; `fetcher` is shared by listing and page requests
    pub fn new(
        fetcher: Arc<WikiFetcher>,
        listing: ListingOptions,
        translations: TranslationIndex,
        assembler: AssemblerOptions,
    ) -> Self {
        Self {
            lister: EntityListFetcher::new(Arc::clone(&fetcher), listing),
            extractor: PageExtractor::new(fetcher),
            translations,
            assembler: GraphAssembler::new(assembler),
            limit: 0,
        }
    }

    /// Create a pipeline from the application configuration
    ///
    /// # Errors
    ///
    /// Returns `FetchError::Http` if the HTTP client cannot be created
    pub fn from_config(config: &Config, translations: TranslationIndex) -> Result<Self, FetchError> {
        let fetcher = Arc::new(WikiFetcher::from_config(config)?);
        Ok(Self::new(
            fetcher,
            ListingOptions::from(&config.source),
            translations,
            AssemblerOptions::from(&config.graph),
        )
        .with_limit(config.run.limit))
    }

    /// Process at most `limit` entities (0 = all)
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// List the category and process every entity
    ///
    /// # Errors
    ///
    /// Only a listing failure is returned; entity failures are recorded in
    /// the stats.
    pub async fn run(self) -> Result<PipelineOutput, CrawlerError> {
        let names = self.lister.list_entities().await.inspect_err(|e| {
            tracing::error!(error = %e, "Category listing failed, aborting run");
        })?;

        Ok(self.run_names(names).await)
    }

    /// Process the given entity names in order
    pub async fn run_names(mut self, names: Vec<String>) -> PipelineOutput {
        let mut stats = RunStats::new();
        stats.listed = names.len();

        let take = if self.limit > 0 {
            self.limit.min(names.len())
        } else {
            names.len()
        };

        tracing::info!(
            listed = names.len(),
            processing = take,
            translations = self.translations.len(),
            "Starting build"
        );

        for name in names.iter().take(take) {
            if self.extractor.fetcher().deadline_passed() {
                tracing::warn!(
                    processed = stats.attempted,
                    remaining = take - stats.attempted,
                    "Run deadline reached"
                );
                stats.deadline_hit = true;
                break;
            }

            stats.attempted += 1;

            match self.extractor.extract(name).await {
                Ok(entity) => {
                    if !entity.missing_fields().is_empty() {
                        stats.partial += 1;
                    }
                    let outcome = self.assembler.add_entity(&entity, &self.translations);
                    stats.extracted += 1;
                    stats.labels += outcome.labels;
                }
                Err(CrawlerError::Fetch(FetchError::Timeout))
                    if self.extractor.fetcher().deadline_passed() =>
                {
                    stats.record_failure(name, &FetchError::Timeout);
                    stats.deadline_hit = true;
                    tracing::warn!(entity = %name, "Run deadline reached");
                    break;
                }
                Err(e) => {
                    tracing::warn!(entity = %name, error = %e, "Skipping entity");
                    stats.record_failure(name, &e);
                }
            }
        }

        let graph = self.assembler.into_graph();
        stats.triples = graph.len();
        stats.finish();

        tracing::info!(
            extracted = stats.extracted,
            failed = stats.failed(),
            triples = stats.triples,
            elapsed_secs = stats.elapsed_secs(),
            "Build completed"
        );

        PipelineOutput { graph, stats }
    }
}
