//! Pipeline integration tests
//!
//! Tests the complete flow:
//! 1. List the category (mock MediaWiki API)
//! 2. Fetch and extract each entity page (mock wiki)
//! 3. Assemble the graph with translations
//! 4. Publish Turtle to the store (mock Fuseki) and read it back for validation

use pokegraph::crawler::BuildPipeline;
use pokegraph::ontology::assembler::{
    AssemblerOptions, HAS_HEIGHT, HAS_NAME, HAS_TYPE, HAS_WEIGHT,
};
use pokegraph::ontology::graph::{Graph, Term, Triple, RDFS_LABEL};
use pokegraph::ontology::{parse_turtle_str, TurtleWriter};
use pokegraph::shacl::SchemaValidator;
use pokegraph::store::{Publisher, StoreClient, TURTLE_CONTENT_TYPE};
use pokegraph::translation::TranslationIndex;
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{header, method, path, path_regex, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::fixtures::{write_shapes, ATTRIBUTE_SHAPES};
use crate::common::{
    listing_json, mock_fetcher, mock_listing, API_PATH, BULBASAUR_HTML,
    BULBASAUR_NO_DIMENSIONS_HTML, BULBASAUR_TSV,
};

const BULBASAUR_IRI: &str = "http://example.org/pokemon/Bulbasaur";

// ============================================================================
// Helper Functions
// ============================================================================

async fn mount_listing(server: &MockServer, titles: &[&str]) {
    Mock::given(method("GET"))
        .and(path(API_PATH))
        .and(query_param("list", "categorymembers"))
        .respond_with(ResponseTemplate::new(200).set_body_string(listing_json(titles, None)))
        .mount(server)
        .await;
}

async fn mount_pages(server: &MockServer, html: &str) {
    Mock::given(method("GET"))
        .and(path_regex(r"^/wiki/"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/html; charset=UTF-8")
                .set_body_string(html),
        )
        .mount(server)
        .await;
}

fn pipeline(server: &MockServer, translations: TranslationIndex) -> BuildPipeline {
    BuildPipeline::new(
        mock_fetcher(&server.uri()),
        mock_listing(&server.uri()),
        translations,
        AssemblerOptions::default(),
    )
}

fn expected_bulbasaur_triples() -> Vec<Triple> {
    let subject = Term::iri(BULBASAUR_IRI);
    vec![
        Triple::new(subject.clone(), HAS_NAME, Term::literal("Bulbasaur")),
        Triple::new(subject.clone(), HAS_TYPE, Term::literal("Grass")),
        Triple::new(subject.clone(), HAS_HEIGHT, Term::literal("0.7 m")),
        Triple::new(subject.clone(), HAS_WEIGHT, Term::literal("6.9 kg")),
        Triple::new(subject.clone(), RDFS_LABEL, Term::lang_literal("Bulbizarre", "fr")),
        Triple::new(subject, RDFS_LABEL, Term::lang_literal("Bulbasaur", "en")),
    ]
}

fn assert_same_triples(graph: &Graph, expected: &[Triple]) {
    assert_eq!(graph.len(), expected.len(), "unexpected graph: {:?}", graph.iter().collect::<Vec<_>>());
    for triple in expected {
        assert!(graph.contains(triple), "missing triple {}", triple.to_ntriples());
    }
}

// ============================================================================
// Build Pipeline Tests
// ============================================================================

#[tokio::test]
async fn test_bulbasaur_end_to_end_graph() {
    let server = MockServer::start().await;
    mount_listing(&server, &["Bulbasaur (Pokémon)", "Pokémon (species)"]).await;
    mount_pages(&server, BULBASAUR_HTML).await;

    let output = pipeline(&server, TranslationIndex::parse_str(BULBASAUR_TSV))
        .run()
        .await
        .unwrap();

    assert_same_triples(&output.graph, &expected_bulbasaur_triples());

    assert_eq!(output.stats.listed, 1);
    assert_eq!(output.stats.attempted, 1);
    assert_eq!(output.stats.extracted, 1);
    assert_eq!(output.stats.failed(), 0);
    assert_eq!(output.stats.triples, 6);
}

#[tokio::test]
async fn test_missing_dimensions_end_to_end_graph() {
    let server = MockServer::start().await;
    mount_listing(&server, &["Bulbasaur (Pokémon)"]).await;
    mount_pages(&server, BULBASAUR_NO_DIMENSIONS_HTML).await;

    let output = pipeline(&server, TranslationIndex::parse_str(BULBASAUR_TSV))
        .run()
        .await
        .unwrap();

    let subject = Term::iri(BULBASAUR_IRI);
    let expected = vec![
        Triple::new(subject.clone(), HAS_NAME, Term::literal("Bulbasaur")),
        Triple::new(subject.clone(), HAS_TYPE, Term::literal("Grass")),
        Triple::new(subject.clone(), HAS_HEIGHT, Term::literal("Height not found")),
        Triple::new(subject.clone(), HAS_WEIGHT, Term::literal("Weight not found")),
        Triple::new(subject.clone(), RDFS_LABEL, Term::lang_literal("Bulbizarre", "fr")),
        Triple::new(subject, RDFS_LABEL, Term::lang_literal("Bulbasaur", "en")),
    ];
    assert_same_triples(&output.graph, &expected);

    assert_eq!(output.stats.extracted, 1);
    assert_eq!(output.stats.partial, 1);
    assert_eq!(output.stats.failed(), 0);
}

#[tokio::test]
async fn test_empty_listing_yields_empty_graph() {
    let server = MockServer::start().await;
    mount_listing(&server, &[]).await;

    Mock::given(method("GET"))
        .and(path_regex(r"^/wiki/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(BULBASAUR_HTML))
        .expect(0) // No page may be requested
        .mount(&server)
        .await;

    let output = pipeline(&server, TranslationIndex::parse_str(BULBASAUR_TSV))
        .run()
        .await
        .unwrap();

    assert!(output.graph.is_empty());
    assert_eq!(output.stats.listed, 0);
    assert_eq!(output.stats.attempted, 0);
    assert!(TurtleWriter::new().write(&output.graph).lines().all(|l| l.is_empty() || l.starts_with("@prefix")));
}

#[tokio::test]
async fn test_listing_follows_continuation() {
    let server = MockServer::start().await;

    // Second page, only matched with the continuation token
    Mock::given(method("GET"))
        .and(path(API_PATH))
        .and(query_param("cmcontinue", "page|IVYSAUR|2"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(listing_json(&["Ivysaur (Pokémon)"], None)),
        )
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(API_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string(listing_json(
            &["Bulbasaur (Pokémon)"],
            Some("page|IVYSAUR|2"),
        )))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    mount_pages(&server, BULBASAUR_HTML).await;

    let mut listing = mock_listing(&server.uri());
    listing.max_pages = 0;
    let output = BuildPipeline::new(
        mock_fetcher(&server.uri()),
        listing,
        TranslationIndex::default(),
        AssemblerOptions::default(),
    )
    .run()
    .await
    .unwrap();

    assert_eq!(output.stats.listed, 2);
    assert_eq!(output.stats.extracted, 2);

    let subjects: Vec<String> = output.graph.subjects().iter().map(|s| s.to_string()).collect();
    assert_eq!(
        subjects,
        vec![
            "<http://example.org/pokemon/Bulbasaur>".to_string(),
            "<http://example.org/pokemon/Ivysaur>".to_string(),
        ]
    );
}

#[tokio::test]
async fn test_limit_processes_first_entities() {
    let server = MockServer::start().await;
    mount_listing(&server, &["Bulbasaur (Pokémon)", "Ivysaur (Pokémon)", "Venusaur (Pokémon)"]).await;
    mount_pages(&server, BULBASAUR_HTML).await;

    let output = pipeline(&server, TranslationIndex::default())
        .with_limit(1)
        .run()
        .await
        .unwrap();

    assert_eq!(output.stats.listed, 3);
    assert_eq!(output.stats.attempted, 1);
    assert_eq!(output.graph.subjects().len(), 1);
}

#[tokio::test]
async fn test_repeated_entity_is_idempotent() {
    let server = MockServer::start().await;
    mount_pages(&server, BULBASAUR_HTML).await;

    let output = pipeline(&server, TranslationIndex::parse_str(BULBASAUR_TSV))
        .run_names(vec!["Bulbasaur".to_string(), "Bulbasaur".to_string()])
        .await;

    assert_eq!(output.stats.extracted, 2);
    assert_same_triples(&output.graph, &expected_bulbasaur_triples());
}

// ============================================================================
// Publish and Validate Tests
// ============================================================================

#[tokio::test]
async fn test_publish_then_validate_round_trip() {
    let wiki = MockServer::start().await;
    mount_listing(&wiki, &["Bulbasaur (Pokémon)"]).await;
    mount_pages(&wiki, BULBASAUR_HTML).await;

    let output = pipeline(&wiki, TranslationIndex::parse_str(BULBASAUR_TSV))
        .run()
        .await
        .unwrap();

    // Publish
    let store_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/Pokemon/data"))
        .and(header("content-type", TURTLE_CONTENT_TYPE))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&store_server)
        .await;

    let temp_dir = TempDir::new().unwrap();
    let local_path = temp_dir.path().join("pokemon.ttl");
    let store = StoreClient::new(&store_server.uri(), "Pokemon", Duration::from_secs(5)).unwrap();
    let report = Publisher::new(store.clone())
        .publish(&output.graph, &local_path)
        .await
        .unwrap();

    assert_eq!(report.status, Some(201));
    assert_eq!(report.triples, 6);
    assert_eq!(report.endpoint.as_deref(), Some(store.data_url()));

    // The POSTed body is the local file, byte for byte
    let requests = store_server.received_requests().await.unwrap();
    let posted = String::from_utf8(requests[0].body.clone()).unwrap();
    let local = std::fs::read_to_string(&local_path).unwrap();
    assert_eq!(posted, local);
    assert_same_triples(&parse_turtle_str(&posted).unwrap(), &expected_bulbasaur_triples());

    // Read back and validate
    Mock::given(method("GET"))
        .and(path("/Pokemon/data"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/turtle")
                .set_body_string(posted),
        )
        .mount(&store_server)
        .await;

    let shapes_path = write_shapes(&temp_dir, ATTRIBUTE_SHAPES);
    let validation = SchemaValidator::new(store, shapes_path)
        .validate()
        .await
        .unwrap();

    assert!(validation.conforms, "{}", validation.to_text());
    assert_eq!(validation.focus_nodes, 1);
}

#[tokio::test]
async fn test_shipped_shapes_accept_published_graph() {
    let server = MockServer::start().await;
    mount_pages(&server, BULBASAUR_HTML).await;

    let output = pipeline(&server, TranslationIndex::load("data/pokedex-i18n.tsv").unwrap())
        .run_names(vec!["Bulbasaur".to_string()])
        .await;

    Mock::given(method("GET"))
        .and(path("/Pokemon/data"))
        .respond_with(ResponseTemplate::new(200).set_body_string(TurtleWriter::new().write(&output.graph)))
        .mount(&server)
        .await;

    let store = StoreClient::new(&server.uri(), "Pokemon", Duration::from_secs(5)).unwrap();
    let report = SchemaValidator::new(store, "data/shapes.ttl")
        .validate()
        .await
        .unwrap();

    assert!(report.conforms, "{}", report.to_text());
}
