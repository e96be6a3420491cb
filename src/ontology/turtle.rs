//! Turtle serialization and parsing
//!
//! [`TurtleWriter`] renders a [`Graph`] in a pretty, prefix-compacted form
//! (one block per subject, `;` between predicates, `,` between objects).
//! [`parse_turtle`] reads Turtle back into a [`Graph`] with `rio_turtle`.

use lazy_static::lazy_static;
use regex::Regex;
use rio_api::model::{Literal, Subject, Term as RioTerm};
use rio_api::parser::TriplesParser;
use rio_turtle::{TurtleError, TurtleParser};
use std::fmt::Write as _;
use std::io::BufRead;
use thiserror::Error;

use super::graph::{escape_literal, Graph, PrefixMap, Term, Triple, RDF_TYPE};

lazy_static! {
    static ref PN_LOCAL: Regex = Regex::new(
        r"^([A-Za-z0-9_]|%[0-9A-Fa-f]{2})(([A-Za-z0-9_.\-]|%[0-9A-Fa-f]{2})*([A-Za-z0-9_\-]|%[0-9A-Fa-f]{2}))?$"
    )
    .expect("Invalid regex pattern");
}

/// Errors raised while reading Turtle
#[derive(Error, Debug)]
pub enum TurtleReadError {
    /// Syntax error reported by the parser
    #[error("{0}")]
    Syntax(#[from] TurtleError),

    /// RDF-star quoted triples have no counterpart in [`Graph`]
    #[error("quoted triples are not supported")]
    QuotedTriple,
}

/// Pretty Turtle writer
#[derive(Debug, Clone)]
pub struct TurtleWriter {
    indent: String,
}

impl Default for TurtleWriter {
    fn default() -> Self {
        Self {
            indent: "    ".to_string(),
        }
    }
}

impl TurtleWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serialize the whole graph
    pub fn write(&self, graph: &Graph) -> String {
        let prefixes = graph.prefixes();
        let mut out = String::new();

        for (prefix, ns) in prefixes.iter() {
            let _ = writeln!(out, "@prefix {prefix}: <{ns}> .");
        }

        for subject in graph.subjects() {
            out.push('\n');
            out.push_str(&self.format_term(subject, prefixes));
            out.push('\n');

            let triples: Vec<&Triple> = graph.triples_for(subject).collect();
            let mut groups: Vec<(&str, Vec<&Term>)> = Vec::new();
            for triple in triples {
                match groups.last_mut() {
                    Some((p, objects)) if *p == triple.predicate => objects.push(&triple.object),
                    _ => groups.push((triple.predicate.as_str(), vec![&triple.object])),
                }
            }

            let last = groups.len().saturating_sub(1);
            for (i, (predicate, objects)) in groups.iter().enumerate() {
                let objects: Vec<String> = objects
                    .iter()
                    .map(|o| self.format_term(o, prefixes))
                    .collect();
                let terminator = if i == last { " ." } else { " ;" };
                let _ = writeln!(
                    out,
                    "{}{} {}{}",
                    self.indent,
                    self.format_predicate(predicate, prefixes),
                    objects.join(", "),
                    terminator
                );
            }
        }

        out
    }

    fn format_predicate(&self, predicate: &str, prefixes: &PrefixMap) -> String {
        if predicate == RDF_TYPE {
            "a".to_string()
        } else {
            format_iri(predicate, prefixes)
        }
    }

    /// Render one term, compacting IRIs where possible
    pub fn format_term(&self, term: &Term, prefixes: &PrefixMap) -> String {
        match term {
            Term::Iri(iri) => format_iri(iri, prefixes),
            Term::BlankNode(id) => format!("_:{id}"),
            Term::Literal {
                value,
                language,
                datatype,
            } => {
                let mut s = format!("\"{}\"", escape_literal(value));
                if let Some(lang) = language {
                    s.push('@');
                    s.push_str(lang);
                } else if let Some(dt) = datatype {
                    s.push_str("^^");
                    s.push_str(&format_iri(dt, prefixes));
                }
                s
            }
        }
    }
}

/// `prefix:local` when the local part is a valid `PN_LOCAL`, `<iri>` otherwise
pub fn format_iri(iri: &str, prefixes: &PrefixMap) -> String {
    match prefixes.compact(iri) {
        Some((prefix, local)) if local.is_empty() || PN_LOCAL.is_match(local) => {
            format!("{prefix}:{local}")
        }
        _ => format!("<{iri}>"),
    }
}

/// Parse Turtle into a graph carrying the standard prefixes plus the
/// document's own
pub fn parse_turtle<R: BufRead>(reader: R) -> Result<Graph, TurtleReadError> {
    let mut graph = Graph::new();
    let mut parser = TurtleParser::new(reader, None);

    parser.parse_all(&mut |t| -> Result<(), TurtleReadError> {
        let subject = match t.subject {
            Subject::NamedNode(n) => Term::iri(n.iri),
            Subject::BlankNode(b) => Term::blank(b.id),
            Subject::Triple(_) => return Err(TurtleReadError::QuotedTriple),
        };
        let object = match t.object {
            RioTerm::NamedNode(n) => Term::iri(n.iri),
            RioTerm::BlankNode(b) => Term::blank(b.id),
            RioTerm::Literal(Literal::Simple { value }) => Term::literal(value),
            RioTerm::Literal(Literal::LanguageTaggedString { value, language }) => {
                Term::lang_literal(value, language)
            }
            RioTerm::Literal(Literal::Typed { value, datatype }) => {
                Term::typed_literal(value, datatype.iri)
            }
            RioTerm::Triple(_) => return Err(TurtleReadError::QuotedTriple),
        };
        graph.insert(Triple::new(subject, t.predicate.iri, object));
        Ok(())
    })?;

    let mut declared: Vec<(&String, &String)> = parser.prefixes().iter().collect();
    declared.sort();
    for (prefix, ns) in declared {
        graph.prefixes_mut().bind(prefix.clone(), ns.clone());
    }

    Ok(graph)
}

/// Parse Turtle held in a string
pub fn parse_turtle_str(text: &str) -> Result<Graph, TurtleReadError> {
    parse_turtle(text.as_bytes())
}
