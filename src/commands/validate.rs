use anyhow::{Context, Result};
use std::path::PathBuf;

use pokegraph::config::Config;
use pokegraph::error::{Error, ErrorCategory, PokegraphErrorTrait};
use pokegraph::shacl::SchemaValidator;
use pokegraph::store::StoreClient;

/// Validate the store's graph and print the report
///
/// A non-conforming graph is reported, not treated as a command failure.
pub async fn validate(config: &Config, shapes: Option<PathBuf>) -> Result<()> {
    let store = StoreClient::from_config(config).context("Failed to create store client")?;
    let shapes_path = shapes.unwrap_or_else(|| config.data.shapes_path.clone());

    println!("Validating {} against {}", store.data_url(), shapes_path.display());

    let validator = SchemaValidator::new(store, shapes_path);
    let report = match validator.validate().await {
        Ok(report) => report,
        Err(e) => {
            let err = Error::from(e);
            if err.category() == ErrorCategory::Network {
                println!("Could not read the graph or shapes; check that the store is running");
            }
            return Err(err).context("Validation failed");
        }
    };

    print!("{}", report.to_text());
    Ok(())
}
