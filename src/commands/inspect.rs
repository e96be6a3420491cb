//! Single-entity inspection commands

use anyhow::{Context, Result};
use std::sync::Arc;

use pokegraph::config::Config;
use pokegraph::crawler::{EntityListFetcher, ListingOptions, WikiFetcher};
use pokegraph::ontology::{AssemblerOptions, GraphAssembler, TurtleWriter};
use pokegraph::parser::PageExtractor;
use pokegraph::translation::{normalize_language, TranslationIndex};

/// Extract one page and print the entity's triples
pub async fn extract(config: &Config, name: &str) -> Result<()> {
    let fetcher = Arc::new(WikiFetcher::from_config(config).context("Failed to create HTTP client")?);
    let extractor = PageExtractor::new(fetcher);

    let entity = extractor
        .extract(name)
        .await
        .with_context(|| format!("Failed to extract {name}"))?;

    let missing = entity.missing_fields();
    if !missing.is_empty() {
        let labels: Vec<&str> = missing.iter().map(|f| f.label()).collect();
        eprintln!("Missing fields: {}", labels.join(", "));
    }

    // Labels are optional here; a missing table still prints the attributes
    let translations = match TranslationIndex::load(&config.data.translations_path) {
        Ok(index) => index,
        Err(e) => {
            tracing::warn!(error = %e, "Translation table unavailable, printing attributes only");
            TranslationIndex::default()
        }
    };

    let mut assembler = GraphAssembler::new(AssemblerOptions::from(&config.graph));
    assembler.add_entity(&entity, &translations);

    print!("{}", TurtleWriter::new().write(assembler.graph()));
    Ok(())
}

/// Print the category's entity names, one per line
pub async fn list(config: &Config) -> Result<()> {
    let fetcher = Arc::new(WikiFetcher::from_config(config).context("Failed to create HTTP client")?);
    let lister = EntityListFetcher::new(fetcher, ListingOptions::from(&config.source));

    let names = lister
        .list_entities()
        .await
        .with_context(|| format!("Failed to list category {}", config.source.category))?;

    for name in &names {
        println!("{name}");
    }
    eprintln!("{} entities", names.len());
    Ok(())
}

/// Print the identifier and translations recorded for an English name
pub fn lookup(config: &Config, english_name: &str) -> Result<()> {
    let translations = TranslationIndex::load(&config.data.translations_path)
        .context("Failed to load translation table")?;

    let Some(id) = translations.find_id_by_english_name(english_name) else {
        println!("No identifier found for {english_name:?}");
        return Ok(());
    };

    println!("{english_name} -> {id}");
    for translation in translations.translations(id) {
        let status = match normalize_language(&translation.language) {
            Ok(tag) => format!("@{tag}"),
            Err(rejection) => format!("skipped ({rejection:?})"),
        };
        println!("  {:<24} {:<20} {status}", translation.name, translation.language);
    }
    Ok(())
}
