//! HTTP fetcher with rate limiting and charset-aware decoding
//!
//! [`WikiFetcher`] is used for every upstream GET of a run (category
//! listing and entity pages):
//! - User-Agent rotation over a pool of browser identifiers
//! - Rate limiting with governor
//! - Retry with exponential backoff on 429 and 5xx
//! - Charset detection from `Content-Type` or `<meta charset>`
//! - An optional run deadline, checked before every attempt

use crate::config::Config;
use crate::crawler::headers::build_browser_headers;
use crate::utils::error::FetchError;
use encoding_rs::{Encoding, UTF_8, WINDOWS_1252};
use governor::{
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter,
};
use lazy_static::lazy_static;
use rand::seq::SliceRandom;
use regex::Regex;
use reqwest::{Client, Response};
use std::num::NonZeroU32;
use std::time::{Duration, Instant};
use url::Url;

/// Pool of realistic User-Agent strings for rotation
const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:121.0) Gecko/20100101 Firefox/121.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.2 Safari/605.1.15",
];

/// Accept header for entity pages
pub const ACCEPT_HTML: &str =
    "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";

/// Accept header for API calls
pub const ACCEPT_JSON: &str = "application/json";

lazy_static! {
    static ref META_CHARSET: Regex =
        Regex::new(r#"(?i)<meta[^>]+charset\s*=\s*["']?([A-Za-z0-9_\-]+)"#)
            .expect("Invalid regex pattern");
}

/// Wiki fetcher used for listing and page requests
pub struct WikiFetcher {
    /// HTTP client with configured timeout and compression
    client: Client,

    /// Rate limiter to control request frequency
    rate_limiter: RateLimiter<NotKeyed, InMemoryState, DefaultClock>,

    /// Maximum number of retry attempts for failed requests
    max_retries: u32,

    /// Base delay in milliseconds for exponential backoff
    base_delay_ms: u64,

    /// Wiki root, e.g. `https://bulbapedia.bulbagarden.net`
    wiki_url: String,

    /// Suffix appended to an entity name to form its page title
    title_suffix: String,

    /// Fixed User-Agent, overriding the rotation pool
    user_agent: Option<String>,

    /// Point in time after which no further request is sent
    deadline: Option<Instant>,
}

impl WikiFetcher {
    /// Create a new fetcher with default settings
    ///
    /// # Errors
    ///
    /// Returns `FetchError::Http` if the HTTP client cannot be created
    pub fn new(requests_per_second: u32) -> Result<Self, FetchError> {
        Self::with_config(requests_per_second, 2, Duration::from_secs(30))
    }

    /// Create a new fetcher with custom retry and timeout settings
    ///
    /// # Errors
    ///
    /// Returns `FetchError::Http` if the HTTP client cannot be created
    pub fn with_config(
        requests_per_second: u32,
        max_retries: u32,
        timeout: Duration,
    ) -> Result<Self, FetchError> {
        let client = Client::builder().timeout(timeout).gzip(true).build()?;

        let rate = NonZeroU32::new(requests_per_second).unwrap_or(NonZeroU32::MIN);
        let rate_limiter = RateLimiter::direct(Quota::per_second(rate));

        Ok(Self {
            client,
            rate_limiter,
            max_retries,
            base_delay_ms: 1000,
            wiki_url: String::from("https://bulbapedia.bulbagarden.net"),
            title_suffix: String::from(" (Pokémon)"),
            user_agent: None,
            deadline: None,
        })
    }

    /// Create a fetcher from the application configuration
    ///
    /// The run deadline starts counting when this is called.
    pub fn from_config(config: &Config) -> Result<Self, FetchError> {
        let mut fetcher = Self::with_config(
            config.http.rate_limit,
            config.http.max_retries,
            config.request_timeout(),
        )?;
        fetcher.base_delay_ms = config.http.retry_base_delay_ms;
        fetcher.wiki_url = config.source.wiki_url.trim_end_matches('/').to_string();
        fetcher.title_suffix = config.source.title_suffix.clone();
        fetcher.user_agent = config.http.user_agent.clone();
        fetcher.deadline = config.run_deadline().map(|d| Instant::now() + d);
        Ok(fetcher)
    }

    /// Create a fetcher pointing at another wiki root (mock servers in tests)
    pub fn with_base_url(base_url: &str, requests_per_second: u32) -> Result<Self, FetchError> {
        let mut fetcher = Self::new(requests_per_second)?;
        fetcher.wiki_url = base_url.trim_end_matches('/').to_string();
        Ok(fetcher)
    }

    /// Override the backoff base delay
    pub fn with_retry_delay(mut self, base_delay_ms: u64) -> Self {
        self.base_delay_ms = base_delay_ms;
        self
    }

    /// Stop sending requests once `deadline` has passed
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Whether the run deadline has passed
    pub fn deadline_passed(&self) -> bool {
        self.deadline.is_some_and(|d| Instant::now() >= d)
    }

    pub fn wiki_url(&self) -> &str {
        &self.wiki_url
    }

    /// Page URL for an entity: `{wiki}/wiki/{Name}_(Pokémon)`
    ///
    /// # Errors
    ///
    /// Returns `FetchError::InvalidUrl` for an empty name or an unparseable
    /// result
    pub fn page_url(&self, name: &str) -> Result<String, FetchError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(FetchError::InvalidUrl("empty entity name".to_string()));
        }

        let title = format!("{name}{}", self.title_suffix).replace(' ', "_");
        let raw = format!("{}/wiki/{title}", self.wiki_url);
        Url::parse(&raw)
            .map(String::from)
            .map_err(|e| FetchError::InvalidUrl(format!("{raw}: {e}")))
    }

    /// Fetch an entity page
    pub async fn fetch_page(&self, name: &str) -> Result<String, FetchError> {
        let url = self.page_url(name)?;
        tracing::debug!(entity = name, url = %url, "Fetching entity page");
        self.get_text(&url, ACCEPT_HTML).await
    }

    /// GET a URL with rate limiting and retry, returning the decoded body
    ///
    /// # Errors
    ///
    /// - `FetchError::Timeout` when the run deadline has passed
    /// - `FetchError::ServerError` on a non-retryable status
    /// - `FetchError::MaxRetriesExceeded` once retries are exhausted
    pub async fn get_text(&self, url: &str, accept: &str) -> Result<String, FetchError> {
        self.rate_limiter.until_ready().await;
        self.fetch_with_retry(url, accept).await
    }

    async fn fetch_with_retry(&self, url: &str, accept: &str) -> Result<String, FetchError> {
        let mut last_status = None;
        let mut attempts = 0;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let delay = self.base_delay_ms * 2_u64.pow(attempt - 1);
                tracing::debug!(url, attempt, delay_ms = delay, "Retrying request");
                tokio::time::sleep(Duration::from_millis(delay)).await;
            }

            if self.deadline_passed() {
                return Err(FetchError::Timeout);
            }

            attempts += 1;
            let headers = build_browser_headers(self.user_agent(), accept);

            match self.client.get(url).headers(headers).send().await {
                Ok(response) => {
                    let status = response.status();

                    if status.is_success() {
                        return self.decode_response(response).await;
                    } else if Self::should_retry(status.as_u16()) {
                        last_status = Some(status.as_u16());
                        continue;
                    } else {
                        return Err(FetchError::ServerError(status.as_u16()));
                    }
                }
                Err(e) if e.is_timeout() => {
                    tracing::debug!(url, "Request timed out");
                    last_status = None;
                }
                Err(e) if e.is_builder() => return Err(FetchError::Http(e)),
                Err(e) => {
                    tracing::debug!(url, error = %e, "Request failed");
                    last_status = None;
                }
            }
        }

        tracing::warn!(url, attempts, ?last_status, "Giving up on request");
        Err(FetchError::MaxRetriesExceeded {
            attempts,
            last_status,
        })
    }

    /// Determine if a status code should trigger a retry
    ///
    /// Retries on 429 and 500/502/503/504; other statuses fail at once.
    fn should_retry(status: u16) -> bool {
        matches!(status, 429 | 500 | 502 | 503 | 504)
    }

    async fn decode_response(&self, response: Response) -> Result<String, FetchError> {
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string())
            .unwrap_or_default();

        let bytes = response.bytes().await?;

        self.decode_bytes(&bytes, &content_type)
    }

    /// Decode bytes to a string
    ///
    /// Strategies, in order:
    /// 1. `charset=` parameter of the `Content-Type` header
    /// 2. strict UTF-8
    /// 3. `<meta charset>` in the first kilobyte
    /// 4. windows-1252, which accepts any byte sequence
    ///
    /// # Errors
    ///
    /// Returns `FetchError::Decode` if the declared charset cannot decode the
    /// body
    pub fn decode_bytes(&self, bytes: &[u8], content_type: &str) -> Result<String, FetchError> {
        if let Some(encoding) = charset_from_content_type(content_type) {
            return decode_with(encoding, bytes);
        }

        if let Ok(text) = decode_with(UTF_8, bytes) {
            return Ok(text);
        }

        let head = String::from_utf8_lossy(&bytes[..bytes.len().min(1024)]);
        if let Some(encoding) = META_CHARSET
            .captures(&head)
            .and_then(|c| Encoding::for_label(c[1].as_bytes()))
        {
            if let Ok(text) = decode_with(encoding, bytes) {
                return Ok(text);
            }
        }

        decode_with(WINDOWS_1252, bytes)
    }

    fn user_agent(&self) -> &str {
        match &self.user_agent {
            Some(ua) => ua.as_str(),
            None => self.random_user_agent(),
        }
    }

    /// Get a random user agent from the pool
    fn random_user_agent(&self) -> &'static str {
        let mut rng = rand::thread_rng();
        USER_AGENTS.choose(&mut rng).unwrap_or(&USER_AGENTS[0])
    }
}

fn charset_from_content_type(content_type: &str) -> Option<&'static Encoding> {
    content_type
        .split(';')
        .filter_map(|part| part.trim().split_once('='))
        .find(|(key, _)| key.trim().eq_ignore_ascii_case("charset"))
        .and_then(|(_, value)| Encoding::for_label(value.trim().trim_matches('"').as_bytes()))
}

fn decode_with(encoding: &'static Encoding, bytes: &[u8]) -> Result<String, FetchError> {
    let (cow, _encoding, had_errors) = encoding.decode(bytes);

    if had_errors {
        return Err(FetchError::Decode(format!(
            "{} decoding errors",
            encoding.name()
        )));
    }

    Ok(cow.into_owned())
}
