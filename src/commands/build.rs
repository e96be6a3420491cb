use anyhow::{Context, Result};
use std::path::PathBuf;

use pokegraph::config::Config;
use pokegraph::crawler::BuildPipeline;
use pokegraph::error::{Error, ErrorCategory, PokegraphErrorTrait};
use pokegraph::store::{Publisher, StoreClient};
use pokegraph::translation::TranslationIndex;

pub async fn build(
    config: &Config,
    limit: Option<usize>,
    output: Option<PathBuf>,
    no_publish: bool,
) -> Result<()> {
    let translations = TranslationIndex::load(&config.data.translations_path)
        .map_err(Error::from)
        .context("Failed to load translation table")?;
    let stats = translations.load_stats();
    println!(
        "Loaded {} identifiers ({} rows kept, {} malformed) from {}",
        translations.len(),
        stats.kept,
        stats.malformed,
        config.data.translations_path.display()
    );
    if stats.lossy > 0 {
        println!("{} rows held invalid UTF-8 and were decoded lossily", stats.lossy);
    }

    let mut pipeline = BuildPipeline::from_config(config, translations)
        .map_err(Error::from)
        .context("Failed to create HTTP client")?;
    if let Some(limit) = limit {
        pipeline = pipeline.with_limit(limit);
    }

    let output_path = output.unwrap_or_else(|| config.data.output_path.clone());
    let pipeline_output = pipeline
        .run()
        .await
        .map_err(Error::from)
        .context("Category listing failed")?;

    println!();
    println!("{}", pipeline_output.stats.report());

    let store = StoreClient::from_config(config).context("Failed to create store client")?;
    let publisher = Publisher::new(store);

    let result = if no_publish {
        publisher
            .write_only(&pipeline_output.graph, &output_path)
            .await
    } else {
        publisher.publish(&pipeline_output.graph, &output_path).await
    };

    let err = match result {
        Ok(report) => {
            println!("{}", report.summary());
            return Ok(());
        }
        Err(e) => Error::from(e),
    };

    if err.category() == ErrorCategory::Storage {
        return Err(err).context("Failed to write Turtle output");
    }

    println!("Local file kept at {}", output_path.display());
    if err.is_recoverable() {
        println!("The store failure looks transient ({}); rerun to publish again", err.summary());
    }
    Err(err).with_context(|| format!("Failed to publish to {}", config.store_data_url()))
}
