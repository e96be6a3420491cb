//! Test fixtures for integration tests
//!
//! Turtle documents standing in for the store's contents and shape files

/// Shape requiring exactly one value for every attribute
pub const ATTRIBUTE_SHAPES: &str = r#"
@prefix sh: <http://www.w3.org/ns/shacl#> .
@prefix xsd: <http://www.w3.org/2001/XMLSchema#> .
@prefix prop: <http://example.org/property/> .
@prefix shape: <http://example.org/shapes/> .

shape:PokemonShape a sh:NodeShape ;
    sh:targetSubjectsOf prop:hasName ;
    sh:property [ sh:path prop:hasName ; sh:minCount 1 ; sh:maxCount 1 ; sh:datatype xsd:string ] ;
    sh:property [ sh:path prop:hasType ; sh:minCount 1 ; sh:maxCount 1 ; sh:datatype xsd:string ] ;
    sh:property [ sh:path prop:hasHeight ; sh:minCount 1 ; sh:maxCount 1 ] ;
    sh:property [ sh:path prop:hasWeight ; sh:minCount 1 ; sh:maxCount 1 ] .
"#;

/// Store contents where every entity has all attributes
pub const CONFORMING_TURTLE: &str = r#"
@prefix ex: <http://example.org/pokemon/> .
@prefix prop: <http://example.org/property/> .
@prefix rdfs: <http://www.w3.org/2000/01/rdf-schema#> .

ex:Bulbasaur prop:hasName "Bulbasaur" ;
    prop:hasType "Grass" ;
    prop:hasHeight "0.7 m" ;
    prop:hasWeight "6.9 kg" ;
    rdfs:label "Bulbasaur"@en, "Bulbizarre"@fr .
"#;

/// Store contents where Ivysaur has no type
pub const MISSING_TYPE_TURTLE: &str = r#"
@prefix ex: <http://example.org/pokemon/> .
@prefix prop: <http://example.org/property/> .

ex:Bulbasaur prop:hasName "Bulbasaur" ;
    prop:hasType "Grass" ;
    prop:hasHeight "0.7 m" ;
    prop:hasWeight "6.9 kg" .

ex:Ivysaur prop:hasName "Ivysaur" ;
    prop:hasHeight "1.0 m" ;
    prop:hasWeight "13.0 kg" .
"#;

/// Write a shape document into a temporary directory
pub fn write_shapes(dir: &tempfile::TempDir, text: &str) -> std::path::PathBuf {
    let path = dir.path().join("shapes.ttl");
    std::fs::write(&path, text).unwrap();
    path
}
