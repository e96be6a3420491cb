//! Error scenario integration tests
//!
//! Tests various failure modes and error handling:
//! 1. Entity pages that fail (404, missing infobox, partial infobox)
//! 2. Listing failures, which abort the run
//! 3. Store rejections during publishing
//! 4. Validator fetch, syntax and non-conformance outcomes

use pokegraph::crawler::BuildPipeline;
use pokegraph::error::ErrorCategory;
use pokegraph::ontology::assembler::{AssemblerOptions, HAS_HEIGHT, HAS_TYPE};
use pokegraph::ontology::graph::{Graph, Term};
use pokegraph::shacl::{SchemaValidator, Severity, ValidationError};
use pokegraph::store::{PublishError, Publisher, StoreClient};
use pokegraph::translation::TranslationIndex;
use pokegraph::utils::error::{CrawlerError, FetchError, ParseError};
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::fixtures::{write_shapes, ATTRIBUTE_SHAPES, CONFORMING_TURTLE, MISSING_TYPE_TURTLE};
use crate::common::{
    mock_fetcher, mock_listing, API_PATH, BULBASAUR_HTML, BULBASAUR_TSV,
    NO_INFOBOX_HTML, PARTIAL_INFOBOX_HTML,
};

fn pipeline(server: &MockServer) -> BuildPipeline {
    BuildPipeline::new(
        mock_fetcher(&server.uri()),
        mock_listing(&server.uri()),
        TranslationIndex::parse_str(BULBASAUR_TSV),
        AssemblerOptions::default(),
    )
}

fn store_client(server: &MockServer) -> StoreClient {
    StoreClient::new(&server.uri(), "Pokemon", Duration::from_secs(5)).unwrap()
}

fn small_graph() -> Graph {
    let mut graph = Graph::new();
    graph.assert(
        Term::iri("http://example.org/pokemon/Bulbasaur"),
        "http://example.org/property/hasName",
        Term::literal("Bulbasaur"),
    );
    graph
}

async fn mount_page(server: &MockServer, name: &str, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path_regex(format!(r"^/wiki/{name}_")))
        .respond_with(response)
        .mount(server)
        .await;
}

// ============================================================================
// Entity Failure Tests
// ============================================================================

#[tokio::test]
async fn test_missing_page_is_skipped() {
    let server = MockServer::start().await;
    mount_page(&server, "Bulbasaur", ResponseTemplate::new(200).set_body_string(BULBASAUR_HTML)).await;
    mount_page(&server, "Glitch", ResponseTemplate::new(404)).await;

    let output = pipeline(&server)
        .run_names(vec!["Glitch".to_string(), "Bulbasaur".to_string()])
        .await;

    assert_eq!(output.stats.attempted, 2);
    assert_eq!(output.stats.extracted, 1);
    assert_eq!(output.stats.failed(), 1);
    assert_eq!(output.stats.failures[0].entity, "Glitch");
    assert!(output.stats.failures[0].reason.contains("404"));
    assert_eq!(output.stats.failures[0].category, ErrorCategory::Network);
    assert!(!output.stats.failures[0].recoverable);

    // The successful entity is still in the graph
    assert_eq!(output.graph.len(), 6);
    assert!(output.stats.report().contains("Glitch"));
}

#[tokio::test]
async fn test_page_without_infobox_is_skipped() {
    let server = MockServer::start().await;
    mount_page(&server, "Glitch", ResponseTemplate::new(200).set_body_string(NO_INFOBOX_HTML)).await;

    let output = pipeline(&server).run_names(vec!["Glitch".to_string()]).await;

    assert_eq!(output.stats.failed(), 1);
    assert!(output.stats.failures[0].reason.contains("infobox not found"));
    assert_eq!(output.stats.failures[0].category, ErrorCategory::Parsing);
    assert!(output.graph.is_empty());
}

#[tokio::test]
async fn test_partial_infobox_asserts_sentinels() {
    let server = MockServer::start().await;
    mount_page(&server, "Unown", ResponseTemplate::new(200).set_body_string(PARTIAL_INFOBOX_HTML)).await;

    let output = pipeline(&server).run_names(vec!["Unown".to_string()]).await;

    assert_eq!(output.stats.extracted, 1);
    assert_eq!(output.stats.partial, 1);

    let subject = Term::iri("http://example.org/pokemon/Unown");
    assert_eq!(
        output.graph.object(&subject, HAS_HEIGHT),
        Some(&Term::literal("Height not found"))
    );
    assert_eq!(
        output.graph.object(&subject, HAS_TYPE),
        Some(&Term::literal("Psychic"))
    );
}

// ============================================================================
// Listing Failure Tests
// ============================================================================

#[tokio::test]
async fn test_listing_server_error_aborts_run() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(API_PATH))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let result = pipeline(&server).run().await;

    assert!(matches!(
        result,
        Err(CrawlerError::Fetch(FetchError::MaxRetriesExceeded {
            last_status: Some(500),
            ..
        }))
    ));
}

#[tokio::test]
async fn test_listing_invalid_json_aborts_run() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(API_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;

    let result = pipeline(&server).run().await;

    assert!(matches!(
        result,
        Err(CrawlerError::Parse(ParseError::InvalidJson(_)))
    ));
}

#[tokio::test]
async fn test_listing_without_query_is_empty() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(API_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"batchcomplete": ""}"#))
        .mount(&server)
        .await;

    let output = pipeline(&server).run().await.unwrap();
    assert_eq!(output.stats.listed, 0);
    assert!(output.graph.is_empty());
}

// ============================================================================
// Publish Failure Tests
// ============================================================================

#[tokio::test]
async fn test_rejected_publish_keeps_local_file() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/Pokemon/data"))
        .respond_with(ResponseTemplate::new(400).set_body_string("Parse error: [line: 1]"))
        .expect(1)
        .mount(&server)
        .await;

    let temp_dir = TempDir::new().unwrap();
    let local_path = temp_dir.path().join("pokemon.ttl");

    let result = Publisher::new(store_client(&server))
        .publish(&small_graph(), &local_path)
        .await;

    match result {
        Err(PublishError::Rejected { status, reason }) => {
            assert_eq!(status, 400);
            assert!(reason.contains("Bad Request"));
            assert!(reason.contains("Parse error"));
        }
        other => panic!("Expected Rejected, got: {other:?}"),
    }

    let local = std::fs::read_to_string(&local_path).unwrap();
    assert!(local.contains("ex:Bulbasaur"));
}

#[tokio::test]
async fn test_unreachable_store_keeps_local_file() {
    let temp_dir = TempDir::new().unwrap();
    let local_path = temp_dir.path().join("pokemon.ttl");
    let store = StoreClient::new("http://127.0.0.1:1", "Pokemon", Duration::from_secs(2)).unwrap();

    let result = Publisher::new(store).publish(&small_graph(), &local_path).await;

    assert!(matches!(result, Err(PublishError::Http(_))));
    assert!(local_path.exists());
}

#[tokio::test]
async fn test_unwritable_local_path_sends_nothing() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    // A regular file used as a parent directory
    let temp_dir = TempDir::new().unwrap();
    let blocker = temp_dir.path().join("blocker");
    std::fs::write(&blocker, "").unwrap();

    let result = Publisher::new(store_client(&server))
        .publish(&small_graph(), &blocker.join("pokemon.ttl"))
        .await;

    assert!(matches!(result, Err(PublishError::LocalWrite { .. })));
}

// ============================================================================
// Validator Tests
// ============================================================================

#[tokio::test]
async fn test_validator_store_error_is_fetch_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/Pokemon/data"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let temp_dir = TempDir::new().unwrap();
    let shapes = write_shapes(&temp_dir, ATTRIBUTE_SHAPES);

    let result = SchemaValidator::new(store_client(&server), shapes).validate().await;

    match result {
        Err(ValidationError::Fetch { origin, reason }) => {
            assert!(origin.ends_with("/Pokemon/data"));
            assert!(reason.contains("503"));
        }
        other => panic!("Expected Fetch error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_validator_reports_missing_attribute() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/Pokemon/data"))
        .respond_with(ResponseTemplate::new(200).set_body_string(MISSING_TYPE_TURTLE))
        .mount(&server)
        .await;

    let temp_dir = TempDir::new().unwrap();
    let shapes = write_shapes(&temp_dir, ATTRIBUTE_SHAPES);

    let report = SchemaValidator::new(store_client(&server), shapes)
        .validate()
        .await
        .unwrap();

    assert!(!report.conforms);
    assert_eq!(report.focus_nodes, 2);
    assert_eq!(report.results.len(), 1);

    let result = &report.results[0];
    assert_eq!(result.focus_node, Term::iri("http://example.org/pokemon/Ivysaur"));
    assert_eq!(result.severity, Severity::Violation);
    assert_eq!(
        result.path.as_ref().map(|p| p.to_string()),
        Some(format!("<{HAS_TYPE}>"))
    );

    let text = report.to_text();
    assert!(text.contains("Conforms: false"));
    assert!(text.contains("ex:Ivysaur"));
}

#[tokio::test]
async fn test_validator_conforming_graph() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/Pokemon/data"))
        .respond_with(ResponseTemplate::new(200).set_body_string(CONFORMING_TURTLE))
        .mount(&server)
        .await;

    let temp_dir = TempDir::new().unwrap();
    let shapes = write_shapes(&temp_dir, ATTRIBUTE_SHAPES);

    let report = SchemaValidator::new(store_client(&server), shapes)
        .validate()
        .await
        .unwrap();

    assert!(report.conforms);
    assert!(report.results.is_empty());
}

#[tokio::test]
async fn test_validator_invalid_store_turtle() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/Pokemon/data"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ex:Bulbasaur prop:hasName"))
        .mount(&server)
        .await;

    let temp_dir = TempDir::new().unwrap();
    let shapes = write_shapes(&temp_dir, ATTRIBUTE_SHAPES);

    let result = SchemaValidator::new(store_client(&server), shapes).validate().await;

    assert!(matches!(result, Err(ValidationError::Syntax { .. })));
}
