//! Configuration management for the pokegraph pipeline
//!
//! This module handles loading and validating configuration from environment variables
//! and TOML files.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP client configuration
    pub http: HttpConfig,

    /// Wiki source configuration
    pub source: SourceConfig,

    /// Triple store configuration
    pub store: StoreConfig,

    /// Local data files
    pub data: DataConfig,

    /// Graph assembly options
    pub graph: GraphConfig,

    /// Run limits
    pub run: RunConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// HTTP client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Rate limit (requests per second)
    pub rate_limit: u32,

    /// Request timeout in seconds
    pub request_timeout_secs: u64,

    /// Retries for 429 and 5xx responses
    pub max_retries: u32,

    /// Base delay in milliseconds for exponential backoff
    pub retry_base_delay_ms: u64,

    /// Fixed User-Agent; a browser-like one is picked from a pool when unset
    pub user_agent: Option<String>,
}

/// Wiki source configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Wiki base URL (pages live under `{wiki_url}/wiki/`)
    pub wiki_url: String,

    /// MediaWiki API endpoint
    pub api_url: String,

    /// Category whose members are the entities
    pub category: String,

    /// `cmlimit` for the listing query
    pub page_size: u32,

    /// Maximum listing pages to follow (0 = unlimited)
    pub max_pages: u32,

    /// Suffix stripped from listing titles and appended to page titles
    pub title_suffix: String,

    /// Titles dropped from the listing
    pub excluded_titles: Vec<String>,
}

/// Triple store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Store base URL (Fuseki server root)
    pub url: String,

    /// Dataset name
    pub dataset: String,
}

/// Local data files
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Tab-separated translation table
    pub translations_path: PathBuf,

    /// SHACL shape document
    pub shapes_path: PathBuf,

    /// Turtle output file
    pub output_path: PathBuf,
}

/// Graph assembly options
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
    /// Assert `owl:sameAs` links to an external resource
    pub link_same_as: bool,

    /// Base IRI the escaped canonical name is appended to
    pub same_as_base: String,
}

/// Run limits
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Overall deadline in seconds for the extraction loop (0 = none)
    pub deadline_secs: u64,

    /// Process at most this many entities (0 = all)
    pub limit: usize,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (text, json)
    pub format: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            rate_limit: 2,
            request_timeout_secs: 30,
            max_retries: 2,
            retry_base_delay_ms: 1000,
            user_agent: None,
        }
    }
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            wiki_url: String::from("https://bulbapedia.bulbagarden.net"),
            api_url: String::from("https://bulbapedia.bulbagarden.net/w/api.php"),
            category: String::from("Pokémon"),
            page_size: 50,
            max_pages: 1,
            title_suffix: String::from(" (Pokémon)"),
            excluded_titles: vec![String::from("Pokémon (species)")],
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            url: String::from("http://localhost:3030"),
            dataset: String::from("Pokemon"),
        }
    }
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            translations_path: PathBuf::from("data/pokedex-i18n.tsv"),
            shapes_path: PathBuf::from("data/shapes.ttl"),
            output_path: PathBuf::from("data/pokemon.ttl"),
        }
    }
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            link_same_as: false,
            same_as_base: String::from("http://dbpedia.org/resource/"),
        }
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            deadline_secs: 0,
            limit: 0,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: String::from("info"),
            format: String::from("text"),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            http: HttpConfig::default(),
            source: SourceConfig::default(),
            store: StoreConfig::default(),
            data: DataConfig::default(),
            graph: GraphConfig::default(),
            run: RunConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.parse::<T>().ok())
}

impl Config {
    /// Load configuration from environment variables on top of the defaults
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env();
        Ok(config)
    }

    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse TOML config file: {}", path.display()))?;

        Ok(config)
    }

    /// Load from an optional file, then let environment variables override it
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    fn apply_env(&mut self) {
        if let Some(v) = env_parse("POKEGRAPH_RATE_LIMIT") {
            self.http.rate_limit = v;
        }
        if let Some(v) = env_parse("POKEGRAPH_REQUEST_TIMEOUT") {
            self.http.request_timeout_secs = v;
        }
        if let Some(v) = env_parse("POKEGRAPH_MAX_RETRIES") {
            self.http.max_retries = v;
        }
        if let Ok(v) = std::env::var("POKEGRAPH_USER_AGENT") {
            self.http.user_agent = Some(v);
        }
        if let Ok(v) = std::env::var("POKEGRAPH_WIKI_URL") {
            self.source.wiki_url = v;
        }
        if let Ok(v) = std::env::var("POKEGRAPH_API_URL") {
            self.source.api_url = v;
        }
        if let Some(v) = env_parse("POKEGRAPH_PAGE_SIZE") {
            self.source.page_size = v;
        }
        if let Some(v) = env_parse("POKEGRAPH_MAX_PAGES") {
            self.source.max_pages = v;
        }
        if let Ok(v) = std::env::var("POKEGRAPH_STORE_URL").or_else(|_| std::env::var("FUSEKI_URL"))
        {
            self.store.url = v;
        }
        if let Ok(v) = std::env::var("POKEGRAPH_DATASET") {
            self.store.dataset = v;
        }
        if let Ok(v) = std::env::var("POKEGRAPH_TRANSLATIONS") {
            self.data.translations_path = PathBuf::from(v);
        }
        if let Ok(v) = std::env::var("POKEGRAPH_SHAPES") {
            self.data.shapes_path = PathBuf::from(v);
        }
        if let Ok(v) = std::env::var("POKEGRAPH_OUTPUT") {
            self.data.output_path = PathBuf::from(v);
        }
        if let Some(v) = env_parse("POKEGRAPH_LINK_SAME_AS") {
            self.graph.link_same_as = v;
        }
        if let Some(v) = env_parse("POKEGRAPH_DEADLINE") {
            self.run.deadline_secs = v;
        }
        if let Ok(v) = std::env::var("POKEGRAPH_LOG_LEVEL") {
            self.logging.level = v;
        }
        if let Ok(v) = std::env::var("POKEGRAPH_LOG_FORMAT") {
            self.logging.format = v;
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.http.rate_limit == 0 {
            anyhow::bail!("rate_limit must be greater than 0");
        }

        if self.http.request_timeout_secs == 0 {
            anyhow::bail!("request_timeout_secs must be greater than 0");
        }

        if self.source.page_size == 0 || self.source.page_size > 500 {
            anyhow::bail!("page_size must be between 1 and 500");
        }

        for (name, value) in [
            ("source.wiki_url", &self.source.wiki_url),
            ("source.api_url", &self.source.api_url),
            ("store.url", &self.store.url),
        ] {
            url::Url::parse(value).with_context(|| format!("{name} is not a valid URL: {value}"))?;
        }

        if self.store.dataset.trim().is_empty() {
            anyhow::bail!("store.dataset must not be empty");
        }

        if !matches!(self.logging.format.as_str(), "text" | "json") {
            anyhow::bail!("logging.format must be 'text' or 'json'");
        }

        Ok(())
    }

    /// Get request timeout as Duration
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.http.request_timeout_secs)
    }

    /// Overall run deadline, if one is configured
    #[must_use]
    pub fn run_deadline(&self) -> Option<Duration> {
        (self.run.deadline_secs > 0).then(|| Duration::from_secs(self.run.deadline_secs))
    }

    /// Graph Store Protocol endpoint of the dataset's default graph
    #[must_use]
    pub fn store_data_url(&self) -> String {
        format!(
            "{}/{}/data",
            self.store.url.trim_end_matches('/'),
            self.store.dataset
        )
    }
}
