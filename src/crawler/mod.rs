//! Wiki crawling with rate limiting
//!
//! - [`fetcher`] - HTTP GET with retry, rate limiting and charset decoding
//! - [`headers`] - browser-like request headers
//! - [`list`] - category listing (entity names)
//! - [`pipeline`] - sequential build loop producing the graph

pub mod fetcher;
pub mod headers;
pub mod list;
pub mod pipeline;

pub use fetcher::WikiFetcher;
pub use list::{EntityListFetcher, ListingOptions};
pub use pipeline::{BuildPipeline, PipelineOutput};
