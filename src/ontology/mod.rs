//! RDF graph model, Turtle I/O and graph assembly
//!
//! - [`graph`] - terms, triples, prefixes and the in-memory [`Graph`]
//! - [`turtle`] - pretty Turtle writer and `rio_turtle`-based reader
//! - [`assembler`] - turns extracted entities and translations into triples
//!
//! # Example
//!
//! ```
//! use pokegraph::models::ExtractedEntity;
//! use pokegraph::ontology::{AssemblerOptions, GraphAssembler, TurtleWriter};
//! use pokegraph::translation::TranslationIndex;
//!
//! let translations = TranslationIndex::parse_str(
//!     "pokemon\t001\tBulbasaur\tEnglish\npokemon\t001\tBulbizarre\tFrench\n",
//! );
//! let entity = ExtractedEntity::from_fields(
//!     "Bulbasaur",
//!     Some("Bulbasaur".to_string()),
//!     Some("Grass".to_string()),
//!     Some("0.7 m".to_string()),
//!     Some("6.9 kg".to_string()),
//! );
//!
//! let mut assembler = GraphAssembler::new(AssemblerOptions::default());
//! assembler.add_entity(&entity, &translations);
//!
//! let turtle = TurtleWriter::new().write(assembler.graph());
//! assert!(turtle.contains("\"Bulbizarre\"@fr"));
//! ```

pub mod assembler;
pub mod graph;
pub mod turtle;

pub use assembler::{AssemblerOptions, AssemblyOutcome, GraphAssembler};
pub use graph::{Graph, PrefixMap, Term, Triple};
pub use turtle::{parse_turtle, parse_turtle_str, TurtleReadError, TurtleWriter};
