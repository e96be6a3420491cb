//! In-memory RDF graph
//!
//! A [`Graph`] is a set of [`Triple`]s plus a fixed prefix table. Set
//! semantics make re-asserting a triple a no-op, which is what keeps
//! [`GraphAssembler::add_entity`](super::assembler::GraphAssembler::add_entity)
//! idempotent.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// `rdf:` namespace
pub const RDF: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#";
/// `rdfs:` namespace
pub const RDFS: &str = "http://www.w3.org/2000/01/rdf-schema#";
/// `xsd:` namespace
pub const XSD: &str = "http://www.w3.org/2001/XMLSchema#";
/// `owl:` namespace
pub const OWL: &str = "http://www.w3.org/2002/07/owl#";
/// Entity namespace (`ex:`)
pub const EX: &str = "http://example.org/pokemon/";
/// Property namespace (`prop:`)
pub const PROP: &str = "http://example.org/property/";

pub const RDF_TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";
pub const RDF_FIRST: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#first";
pub const RDF_REST: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#rest";
pub const RDF_NIL: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#nil";
pub const RDF_LANG_STRING: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#langString";
pub const RDFS_LABEL: &str = "http://www.w3.org/2000/01/rdf-schema#label";
pub const RDFS_SUBCLASS_OF: &str = "http://www.w3.org/2000/01/rdf-schema#subClassOf";
pub const XSD_STRING: &str = "http://www.w3.org/2001/XMLSchema#string";
pub const OWL_SAME_AS: &str = "http://www.w3.org/2002/07/owl#sameAs";

/// RDF term
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Term {
    /// Absolute IRI
    Iri(String),

    /// Blank node label (without `_:`)
    BlankNode(String),

    /// Literal with an optional language tag or datatype IRI
    Literal {
        value: String,
        language: Option<String>,
        datatype: Option<String>,
    },
}

impl Term {
    pub fn iri(iri: impl Into<String>) -> Self {
        Self::Iri(iri.into())
    }

    pub fn blank(id: impl Into<String>) -> Self {
        Self::BlankNode(id.into())
    }

    /// Plain (`xsd:string`) literal
    pub fn literal(value: impl Into<String>) -> Self {
        Self::Literal {
            value: value.into(),
            language: None,
            datatype: None,
        }
    }

    /// Language-tagged literal; the tag is stored lowercase
    pub fn lang_literal(value: impl Into<String>, language: impl Into<String>) -> Self {
        Self::Literal {
            value: value.into(),
            language: Some(language.into().to_lowercase()),
            datatype: None,
        }
    }

    /// Typed literal
    pub fn typed_literal(value: impl Into<String>, datatype: impl Into<String>) -> Self {
        let datatype = datatype.into();
        Self::Literal {
            value: value.into(),
            language: None,
            datatype: (datatype != XSD_STRING).then_some(datatype),
        }
    }

    pub fn is_iri(&self) -> bool {
        matches!(self, Self::Iri(_))
    }

    pub fn is_blank(&self) -> bool {
        matches!(self, Self::BlankNode(_))
    }

    pub fn is_literal(&self) -> bool {
        matches!(self, Self::Literal { .. })
    }

    pub fn as_iri(&self) -> Option<&str> {
        match self {
            Self::Iri(iri) => Some(iri),
            _ => None,
        }
    }

    /// Lexical form of a literal
    pub fn literal_value(&self) -> Option<&str> {
        match self {
            Self::Literal { value, .. } => Some(value),
            _ => None,
        }
    }

    /// Language tag of a literal
    pub fn language(&self) -> Option<&str> {
        match self {
            Self::Literal { language, .. } => language.as_deref(),
            _ => None,
        }
    }

    /// Datatype IRI of a literal, `xsd:string` or `rdf:langString` when implicit
    pub fn datatype(&self) -> Option<&str> {
        match self {
            Self::Literal {
                language: Some(_), ..
            } => Some(RDF_LANG_STRING),
            Self::Literal {
                datatype: Some(dt), ..
            } => Some(dt),
            Self::Literal { .. } => Some(XSD_STRING),
            _ => None,
        }
    }
}

impl fmt::Display for Term {
    /// N-Triples rendering
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Iri(iri) => write!(f, "<{iri}>"),
            Self::BlankNode(id) => write!(f, "_:{id}"),
            Self::Literal {
                value,
                language,
                datatype,
            } => {
                write!(f, "\"{}\"", escape_literal(value))?;
                if let Some(lang) = language {
                    write!(f, "@{lang}")
                } else if let Some(dt) = datatype {
                    write!(f, "^^<{dt}>")
                } else {
                    Ok(())
                }
            }
        }
    }
}

/// RDF statement
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Triple {
    pub subject: Term,
    pub predicate: String,
    pub object: Term,
}

impl Triple {
    pub fn new(subject: Term, predicate: impl Into<String>, object: Term) -> Self {
        Self {
            subject,
            predicate: predicate.into(),
            object,
        }
    }

    /// Convert to N-Triples format string
    pub fn to_ntriples(&self) -> String {
        format!("{} <{}> {} .", self.subject, self.predicate, self.object)
    }
}

/// Ordered prefix table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrefixMap {
    entries: Vec<(String, String)>,
}

impl PrefixMap {
    /// The fixed prefixes every graph is created with
    pub fn standard() -> Self {
        Self {
            entries: [
                ("rdf", RDF),
                ("rdfs", RDFS),
                ("xsd", XSD),
                ("ex", EX),
                ("prop", PROP),
                ("owl", OWL),
            ]
            .into_iter()
            .map(|(p, ns)| (p.to_string(), ns.to_string()))
            .collect(),
        }
    }

    pub fn empty() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Bind a prefix unless it is already bound
    ///
    /// Returns `false` when the prefix exists; existing bindings never change.
    pub fn bind(&mut self, prefix: impl Into<String>, namespace: impl Into<String>) -> bool {
        let prefix = prefix.into();
        if self.namespace(&prefix).is_some() {
            return false;
        }
        self.entries.push((prefix, namespace.into()));
        true
    }

    pub fn namespace(&self, prefix: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(p, _)| p == prefix)
            .map(|(_, ns)| ns.as_str())
    }

    /// Expand `prefix:local` to an absolute IRI
    pub fn expand(&self, curie: &str) -> Option<String> {
        let (prefix, local) = curie.split_once(':')?;
        self.namespace(prefix).map(|ns| format!("{ns}{local}"))
    }

    /// Split an IRI into `(prefix, local)` using the longest matching namespace
    pub fn compact<'a>(&'a self, iri: &'a str) -> Option<(&'a str, &'a str)> {
        self.entries
            .iter()
            .filter(|(_, ns)| iri.starts_with(ns.as_str()))
            .max_by_key(|(_, ns)| ns.len())
            .map(|(p, ns)| (p.as_str(), &iri[ns.len()..]))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(p, ns)| (p.as_str(), ns.as_str()))
    }
}

impl Default for PrefixMap {
    fn default() -> Self {
        Self::standard()
    }
}

/// Set of triples with a fixed prefix table
#[derive(Debug, Clone, Default)]
pub struct Graph {
    triples: BTreeSet<Triple>,
    prefixes: PrefixMap,
}

impl Graph {
    /// Create an empty graph with the standard prefixes
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty graph with a custom prefix table
    pub fn with_prefixes(prefixes: PrefixMap) -> Self {
        Self {
            triples: BTreeSet::new(),
            prefixes,
        }
    }

    /// Assert a triple; returns `true` if it was not already present
    pub fn insert(&mut self, triple: Triple) -> bool {
        self.triples.insert(triple)
    }

    /// Assert a triple from its parts
    pub fn assert(&mut self, subject: Term, predicate: &str, object: Term) -> bool {
        self.insert(Triple::new(subject, predicate, object))
    }

    pub fn contains(&self, triple: &Triple) -> bool {
        self.triples.contains(triple)
    }

    pub fn len(&self) -> usize {
        self.triples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triples.is_empty()
    }

    pub fn prefixes(&self) -> &PrefixMap {
        &self.prefixes
    }

    pub(crate) fn prefixes_mut(&mut self) -> &mut PrefixMap {
        &mut self.prefixes
    }

    pub fn iter(&self) -> impl Iterator<Item = &Triple> {
        self.triples.iter()
    }

    /// Distinct subjects in graph order
    pub fn subjects(&self) -> Vec<&Term> {
        let mut subjects: Vec<&Term> = self.triples.iter().map(|t| &t.subject).collect();
        subjects.dedup();
        subjects
    }

    /// All triples about `subject`
    pub fn triples_for<'a>(&'a self, subject: &'a Term) -> impl Iterator<Item = &'a Triple> + 'a {
        self.triples.iter().filter(move |t| &t.subject == subject)
    }

    /// Objects of `subject predicate ?o`
    pub fn objects<'a>(
        &'a self,
        subject: &'a Term,
        predicate: &'a str,
    ) -> impl Iterator<Item = &'a Term> + 'a {
        self.triples
            .iter()
            .filter(move |t| &t.subject == subject && t.predicate == predicate)
            .map(|t| &t.object)
    }

    /// First object of `subject predicate ?o`
    pub fn object(&self, subject: &Term, predicate: &str) -> Option<&Term> {
        self.triples
            .iter()
            .find(|t| &t.subject == subject && t.predicate == predicate)
            .map(|t| &t.object)
    }

    /// Subjects of `?s predicate object`
    pub fn subjects_with<'a>(
        &'a self,
        predicate: &'a str,
        object: &'a Term,
    ) -> impl Iterator<Item = &'a Term> + 'a {
        self.triples
            .iter()
            .filter(move |t| t.predicate == predicate && &t.object == object)
            .map(|t| &t.subject)
    }

    /// All `(subject, object)` pairs for a predicate
    pub fn pairs<'a>(&'a self, predicate: &'a str) -> impl Iterator<Item = (&'a Term, &'a Term)> + 'a {
        self.triples
            .iter()
            .filter(move |t| t.predicate == predicate)
            .map(|t| (&t.subject, &t.object))
    }

    /// Read an RDF list starting at `head`
    ///
    /// Stops at `rdf:nil`, at a node without `rdf:first`, or on a cycle.
    pub fn list(&self, head: &Term) -> Vec<Term> {
        let mut items = Vec::new();
        let mut seen = BTreeSet::new();
        let mut node = head.clone();

        while node.as_iri() != Some(RDF_NIL) && seen.insert(node.clone()) {
            let Some(first) = self.object(&node, RDF_FIRST) else {
                break;
            };
            items.push(first.clone());
            match self.object(&node, RDF_REST) {
                Some(rest) => node = rest.clone(),
                None => break,
            }
        }

        items
    }

    /// Add every triple of `other` into this graph
    pub fn merge(&mut self, other: &Graph) -> usize {
        other
            .iter()
            .filter(|t| self.triples.insert((*t).clone()))
            .count()
    }
}

/// Escape a literal's lexical form for Turtle and N-Triples
pub fn escape_literal(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
        .replace('\r', "\\r")
        .replace('\t', "\\t")
}

/// Escape text for use as the last segment of an IRI
///
/// Spaces become `_`; anything outside the unreserved set is percent-encoded
/// byte by byte.
pub fn iri_escape(s: &str) -> String {
    s.trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '~') {
                c.to_string()
            } else if c == ' ' {
                "_".to_string()
            } else {
                let mut buf = [0u8; 4];
                let bytes = c.encode_utf8(&mut buf);
                bytes.bytes().map(|b| format!("%{b:02X}")).collect()
            }
        })
        .collect()
}
