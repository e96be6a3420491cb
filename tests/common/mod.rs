//! Common test utilities

use std::sync::Arc;

use pokegraph::config::Config;
use pokegraph::crawler::{ListingOptions, WikiFetcher};

/// Bulbasaur species page with a complete infobox
pub const BULBASAUR_HTML: &str = include_str!("../fixtures/html/bulbasaur.html");

/// Page without any infobox table
#[allow(dead_code)]
pub const NO_INFOBOX_HTML: &str = include_str!("../fixtures/html/no_infobox.html");

/// Infobox with name and type but no dimension blocks
#[allow(dead_code)]
pub const PARTIAL_INFOBOX_HTML: &str = include_str!("../fixtures/html/partial_infobox.html");

/// Bulbasaur page whose infobox has no Height or Weight block
#[allow(dead_code)]
pub const BULBASAUR_NO_DIMENSIONS_HTML: &str =
    include_str!("../fixtures/html/bulbasaur_no_dimensions.html");

/// Translation table with an English and a French row for Bulbasaur
#[allow(dead_code)]
pub const BULBASAUR_TSV: &str = "pokemon\t001\tBulbasaur\tEnglish\npokemon\t001\tBulbizarre\tFrench\n";

/// Listing API path on the mock server
#[allow(dead_code)]
pub const API_PATH: &str = "/w/api.php";

/// Fetcher pointed at a mock server, with fast retries
#[allow(dead_code)]
pub fn mock_fetcher(base_url: &str) -> Arc<WikiFetcher> {
    Arc::new(
        WikiFetcher::with_base_url(base_url, 100)
            .unwrap()
            .with_retry_delay(5),
    )
}

/// Listing options pointed at a mock server
#[allow(dead_code)]
pub fn mock_listing(base_url: &str) -> ListingOptions {
    ListingOptions {
        api_url: format!("{base_url}{API_PATH}"),
        ..ListingOptions::default()
    }
}

/// Configuration whose wiki, API and store all live on a mock server
#[allow(dead_code)]
pub fn mock_config(base_url: &str) -> Config {
    let mut config = Config::default();
    config.http.rate_limit = 100;
    config.http.retry_base_delay_ms = 5;
    config.http.request_timeout_secs = 5;
    config.source.wiki_url = base_url.to_string();
    config.source.api_url = format!("{base_url}{API_PATH}");
    config.store.url = base_url.to_string();
    config
}

/// MediaWiki `categorymembers` response body
#[allow(dead_code)]
pub fn listing_json(titles: &[&str], next: Option<&str>) -> String {
    let members: Vec<serde_json::Value> = titles
        .iter()
        .enumerate()
        .map(|(i, title)| serde_json::json!({ "pageid": i + 1, "ns": 0, "title": title }))
        .collect();

    let mut body = serde_json::json!({
        "batchcomplete": "",
        "query": { "categorymembers": members },
    });
    if let Some(token) = next {
        body["continue"] = serde_json::json!({ "cmcontinue": token, "continue": "-||" });
    }
    body.to_string()
}
