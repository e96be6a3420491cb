use reqwest::header::{
    HeaderMap, HeaderName, HeaderValue, ACCEPT, ACCEPT_ENCODING, ACCEPT_LANGUAGE, USER_AGENT,
};

/// Fallback when the configured User-Agent is not a valid header value
const DEFAULT_USER_AGENT: &str = "Mozilla/5.0";

/// Build browser-like request headers
///
/// The wiki rejects requests without a browser-like User-Agent; the other
/// headers mirror what a browser sends for a top-level navigation.
///
/// # Arguments
///
/// * `user_agent` - User agent string (typically a modern browser UA)
/// * `accept` - Value of the `Accept` header
///
/// # Examples
///
/// ```
/// use pokegraph::crawler::headers::build_browser_headers;
///
/// let headers = build_browser_headers("Mozilla/5.0 (X11; Linux x86_64)", "text/html");
/// assert!(headers.contains_key("user-agent"));
/// ```
pub fn build_browser_headers(user_agent: &str, accept: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();

    let user_agent = HeaderValue::from_str(user_agent)
        .unwrap_or_else(|_| HeaderValue::from_static(DEFAULT_USER_AGENT));
    headers.insert(USER_AGENT, user_agent);

    if let Ok(accept) = HeaderValue::from_str(accept) {
        headers.insert(ACCEPT, accept);
    }
    headers.insert(
        ACCEPT_LANGUAGE,
        HeaderValue::from_static("en-US,en;q=0.9"),
    );
    headers.insert(ACCEPT_ENCODING, HeaderValue::from_static("gzip"));

    headers.insert(
        HeaderName::from_static("sec-fetch-dest"),
        HeaderValue::from_static("document"),
    );
    headers.insert(
        HeaderName::from_static("sec-fetch-mode"),
        HeaderValue::from_static("navigate"),
    );

    headers
}
