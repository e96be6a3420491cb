//! Shape model and shape graph loading

use regex::{Regex, RegexBuilder};
use std::fmt;
use thiserror::Error;

use crate::ontology::graph::{Graph, Term, RDFS, RDF_TYPE};

/// Expands to a full SHACL vocabulary IRI
macro_rules! sh {
    ($local:literal) => {
        concat!("http://www.w3.org/ns/shacl#", $local)
    };
}
pub(crate) use sh;

/// SHACL namespace
pub const SH: &str = sh!("");

const RDFS_CLASS: &str = "http://www.w3.org/2000/01/rdf-schema#Class";
const OWL_CLASS: &str = "http://www.w3.org/2002/07/owl#Class";

/// Errors in the shape document itself
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ShapeError {
    /// A property shape without `sh:path`
    #[error("property shape {shape} has no sh:path")]
    MissingPath { shape: String },

    /// A path form other than a predicate or `sh:inversePath`
    #[error("property shape {shape} uses an unsupported path")]
    UnsupportedPath { shape: String },

    /// A constraint parameter with the wrong kind of value
    #[error("shape {shape}: invalid value for {parameter}: {value}")]
    InvalidParameter {
        shape: String,
        parameter: &'static str,
        value: String,
    },
}

/// Result severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize)]
pub enum Severity {
    Info,
    Warning,
    Violation,
}

impl Severity {
    fn from_iri(iri: &str) -> Option<Self> {
        [Self::Violation, Self::Warning, Self::Info]
            .into_iter()
            .find(|s| s.iri() == iri)
    }

    pub fn iri(&self) -> &'static str {
        match self {
            Self::Violation => sh!("Violation"),
            Self::Warning => sh!("Warning"),
            Self::Info => sh!("Info"),
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Violation => "Violation",
            Self::Warning => "Warning",
            Self::Info => "Info",
        };
        f.write_str(label)
    }
}

/// Property path
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub enum PropertyPath {
    Predicate(String),
    Inverse(String),
}

impl fmt::Display for PropertyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Predicate(p) => write!(f, "<{p}>"),
            Self::Inverse(p) => write!(f, "^<{p}>"),
        }
    }
}

/// How focus nodes are selected
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Class(String),
    Node(Term),
    SubjectsOf(String),
    ObjectsOf(String),
}

/// `sh:nodeKind` values
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Iri,
    BlankNode,
    Literal,
    BlankNodeOrIri,
    BlankNodeOrLiteral,
    IriOrLiteral,
}

impl NodeKind {
    fn from_iri(iri: &str) -> Option<Self> {
        [
            Self::Iri,
            Self::BlankNode,
            Self::Literal,
            Self::BlankNodeOrIri,
            Self::BlankNodeOrLiteral,
            Self::IriOrLiteral,
        ]
        .into_iter()
        .find(|k| k.iri() == iri)
    }

    pub fn iri(&self) -> &'static str {
        match self {
            Self::Iri => sh!("IRI"),
            Self::BlankNode => sh!("BlankNode"),
            Self::Literal => sh!("Literal"),
            Self::BlankNodeOrIri => sh!("BlankNodeOrIRI"),
            Self::BlankNodeOrLiteral => sh!("BlankNodeOrLiteral"),
            Self::IriOrLiteral => sh!("IRIOrLiteral"),
        }
    }

    pub fn matches(&self, term: &Term) -> bool {
        match self {
            Self::Iri => term.is_iri(),
            Self::BlankNode => term.is_blank(),
            Self::Literal => term.is_literal(),
            Self::BlankNodeOrIri => term.is_blank() || term.is_iri(),
            Self::BlankNodeOrLiteral => term.is_blank() || term.is_literal(),
            Self::IriOrLiteral => term.is_iri() || term.is_literal(),
        }
    }
}

/// One constraint of a shape
#[derive(Debug, Clone)]
pub enum Constraint {
    MinCount(usize),
    MaxCount(usize),
    Datatype(String),
    NodeKind(NodeKind),
    Class(String),
    MinLength(usize),
    MaxLength(usize),
    Pattern { regex: Regex, source: String },
    In(Vec<Term>),
    HasValue(Term),
    LanguageIn(Vec<String>),
    UniqueLang,
}

impl Constraint {
    /// Constraint component IRI reported in results
    pub fn component(&self) -> &'static str {
        match self {
            Self::MinCount(_) => sh!("MinCountConstraintComponent"),
            Self::MaxCount(_) => sh!("MaxCountConstraintComponent"),
            Self::Datatype(_) => sh!("DatatypeConstraintComponent"),
            Self::NodeKind(_) => sh!("NodeKindConstraintComponent"),
            Self::Class(_) => sh!("ClassConstraintComponent"),
            Self::MinLength(_) => sh!("MinLengthConstraintComponent"),
            Self::MaxLength(_) => sh!("MaxLengthConstraintComponent"),
            Self::Pattern { .. } => sh!("PatternConstraintComponent"),
            Self::In(_) => sh!("InConstraintComponent"),
            Self::HasValue(_) => sh!("HasValueConstraintComponent"),
            Self::LanguageIn(_) => sh!("LanguageInConstraintComponent"),
            Self::UniqueLang => sh!("UniqueLangConstraintComponent"),
        }
    }

    /// Constraints that only make sense on a property shape
    fn is_property_only(&self) -> bool {
        matches!(self, Self::MinCount(_) | Self::MaxCount(_) | Self::UniqueLang)
    }
}

/// Fields shared by node and property shapes
#[derive(Debug, Clone)]
pub struct ShapeCommon {
    pub id: Term,
    pub constraints: Vec<Constraint>,
    pub severity: Severity,
    pub message: Option<String>,
    pub deactivated: bool,
}

/// A property shape reached through `sh:property`
#[derive(Debug, Clone)]
pub struct PropertyShape {
    pub common: ShapeCommon,
    pub path: PropertyPath,
}

/// A node shape with its targets
#[derive(Debug, Clone)]
pub struct NodeShape {
    pub common: ShapeCommon,
    pub targets: Vec<Target>,
    pub properties: Vec<PropertyShape>,
}

/// All shapes of a shape document
#[derive(Debug, Clone, Default)]
pub struct ShapesGraph {
    shapes: Vec<NodeShape>,
}

impl ShapesGraph {
    /// Read node shapes and their property shapes from a graph
    ///
    /// A node shape is any subject typed `sh:NodeShape` or carrying a
    /// target or `sh:property`. A node shape that is also an `rdfs:Class`
    /// or `owl:Class` targets its own instances. A targeted subject with a
    /// `sh:path` is a property shape applied to its own focus nodes.
    ///
    /// # Errors
    ///
    /// Returns a [`ShapeError`] for a missing or unsupported path, or a
    /// constraint parameter of the wrong kind
    pub fn from_graph(graph: &Graph) -> Result<Self, ShapeError> {
        let node_shape = Term::iri(sh!("NodeShape"));
        let mut ids: Vec<Term> = graph.subjects_with(RDF_TYPE, &node_shape).cloned().collect();

        for predicate in [
            sh!("targetClass"),
            sh!("targetNode"),
            sh!("targetSubjectsOf"),
            sh!("targetObjectsOf"),
            sh!("property"),
        ] {
            ids.extend(graph.pairs(predicate).map(|(s, _)| s.clone()));
        }
        ids.sort();
        ids.dedup();

        let mut shapes = Vec::with_capacity(ids.len());
        for id in ids {
            shapes.push(read_node_shape(graph, id)?);
        }

        tracing::debug!(shapes = shapes.len(), "Loaded shapes graph");
        Ok(Self { shapes })
    }

    pub fn shapes(&self) -> &[NodeShape] {
        &self.shapes
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }
}

fn read_node_shape(graph: &Graph, id: Term) -> Result<NodeShape, ShapeError> {
    let mut targets = Vec::new();

    for class in graph.objects(&id, sh!("targetClass")) {
        if let Some(iri) = class.as_iri() {
            targets.push(Target::Class(iri.to_string()));
        }
    }
    for node in graph.objects(&id, sh!("targetNode")) {
        targets.push(Target::Node(node.clone()));
    }
    for predicate in graph.objects(&id, sh!("targetSubjectsOf")) {
        if let Some(iri) = predicate.as_iri() {
            targets.push(Target::SubjectsOf(iri.to_string()));
        }
    }
    for predicate in graph.objects(&id, sh!("targetObjectsOf")) {
        if let Some(iri) = predicate.as_iri() {
            targets.push(Target::ObjectsOf(iri.to_string()));
        }
    }

    if let Some(iri) = id.as_iri() {
        let is_class = graph
            .objects(&id, RDF_TYPE)
            .any(|t| matches!(t.as_iri(), Some(RDFS_CLASS | OWL_CLASS)));
        if is_class {
            targets.push(Target::Class(iri.to_string()));
        }
    }

    // A targeted property shape validates its own focus nodes
    if graph.object(&id, sh!("path")).is_some() {
        let property = read_property_shape(graph, id.clone())?;
        let common = ShapeCommon {
            id,
            constraints: Vec::new(),
            severity: property.common.severity,
            message: None,
            deactivated: property.common.deactivated,
        };
        return Ok(NodeShape {
            common,
            targets,
            properties: vec![property],
        });
    }

    let mut properties = Vec::new();
    for property in graph.objects(&id, sh!("property")) {
        properties.push(read_property_shape(graph, property.clone())?);
    }

    let mut common = read_common(graph, id)?;
    common.constraints.retain(|c| !c.is_property_only());

    Ok(NodeShape {
        common,
        targets,
        properties,
    })
}

fn read_property_shape(graph: &Graph, id: Term) -> Result<PropertyShape, ShapeError> {
    let shape = id.to_string();
    let path = match graph.object(&id, sh!("path")) {
        None => return Err(ShapeError::MissingPath { shape }),
        Some(Term::Iri(p)) => PropertyPath::Predicate(p.clone()),
        Some(node @ Term::BlankNode(_)) => match graph.object(node, sh!("inversePath")) {
            Some(Term::Iri(p)) => PropertyPath::Inverse(p.clone()),
            _ => return Err(ShapeError::UnsupportedPath { shape }),
        },
        Some(_) => return Err(ShapeError::UnsupportedPath { shape }),
    };

    Ok(PropertyShape {
        common: read_common(graph, id)?,
        path,
    })
}

fn read_common(graph: &Graph, id: Term) -> Result<ShapeCommon, ShapeError> {
    let shape = id.to_string();
    let invalid = |parameter: &'static str, value: &Term| ShapeError::InvalidParameter {
        shape: shape.clone(),
        parameter,
        value: value.to_string(),
    };

    let mut constraints = Vec::new();

    for value in graph.objects(&id, sh!("minCount")) {
        constraints.push(Constraint::MinCount(
            integer(value).ok_or_else(|| invalid("sh:minCount", value))?,
        ));
    }
    for value in graph.objects(&id, sh!("maxCount")) {
        constraints.push(Constraint::MaxCount(
            integer(value).ok_or_else(|| invalid("sh:maxCount", value))?,
        ));
    }
    for value in graph.objects(&id, sh!("datatype")) {
        let iri = value.as_iri().ok_or_else(|| invalid("sh:datatype", value))?;
        constraints.push(Constraint::Datatype(iri.to_string()));
    }
    for value in graph.objects(&id, sh!("nodeKind")) {
        let kind = value
            .as_iri()
            .and_then(NodeKind::from_iri)
            .ok_or_else(|| invalid("sh:nodeKind", value))?;
        constraints.push(Constraint::NodeKind(kind));
    }
    for value in graph.objects(&id, sh!("class")) {
        let iri = value.as_iri().ok_or_else(|| invalid("sh:class", value))?;
        constraints.push(Constraint::Class(iri.to_string()));
    }
    for value in graph.objects(&id, sh!("minLength")) {
        constraints.push(Constraint::MinLength(
            integer(value).ok_or_else(|| invalid("sh:minLength", value))?,
        ));
    }
    for value in graph.objects(&id, sh!("maxLength")) {
        constraints.push(Constraint::MaxLength(
            integer(value).ok_or_else(|| invalid("sh:maxLength", value))?,
        ));
    }

    let flags = graph
        .object(&id, sh!("flags"))
        .and_then(Term::literal_value)
        .unwrap_or("");
    for value in graph.objects(&id, sh!("pattern")) {
        let source = value
            .literal_value()
            .ok_or_else(|| invalid("sh:pattern", value))?;
        let regex = build_pattern(source, flags).ok_or_else(|| invalid("sh:pattern", value))?;
        constraints.push(Constraint::Pattern {
            regex,
            source: source.to_string(),
        });
    }

    for head in graph.objects(&id, sh!("in")) {
        constraints.push(Constraint::In(graph.list(head)));
    }
    for value in graph.objects(&id, sh!("hasValue")) {
        constraints.push(Constraint::HasValue(value.clone()));
    }
    for head in graph.objects(&id, sh!("languageIn")) {
        let ranges = graph
            .list(head)
            .iter()
            .map(|t| t.literal_value().map(str::to_lowercase))
            .collect::<Option<Vec<_>>>()
            .ok_or_else(|| invalid("sh:languageIn", head))?;
        constraints.push(Constraint::LanguageIn(ranges));
    }
    if graph.objects(&id, sh!("uniqueLang")).any(boolean) {
        constraints.push(Constraint::UniqueLang);
    }

    let severity = graph
        .object(&id, sh!("severity"))
        .and_then(Term::as_iri)
        .and_then(Severity::from_iri)
        .unwrap_or(Severity::Violation);

    let message = pick_message(graph.objects(&id, sh!("message")));
    let deactivated = graph.objects(&id, sh!("deactivated")).any(boolean);

    Ok(ShapeCommon {
        id,
        constraints,
        severity,
        message,
        deactivated,
    })
}

/// Prefer an untagged or English message
fn pick_message<'a>(messages: impl Iterator<Item = &'a Term>) -> Option<String> {
    let mut candidates: Vec<&Term> = messages.filter(|t| t.is_literal()).collect();
    candidates.sort_by_key(|t| match t.language() {
        None => 0,
        Some(lang) if lang == "en" || lang.starts_with("en-") => 1,
        Some(_) => 2,
    });
    candidates
        .first()
        .and_then(|t| t.literal_value())
        .map(str::to_string)
}

fn integer(term: &Term) -> Option<usize> {
    term.literal_value()?.trim().parse().ok()
}

fn boolean(term: &Term) -> bool {
    matches!(term.literal_value(), Some("true" | "1"))
}

fn build_pattern(source: &str, flags: &str) -> Option<Regex> {
    let mut builder = RegexBuilder::new(source);
    for flag in flags.chars() {
        match flag {
            'i' => builder.case_insensitive(true),
            'm' => builder.multi_line(true),
            's' => builder.dot_matches_new_line(true),
            'x' => builder.ignore_whitespace(true),
            _ => return None,
        };
    }
    builder.build().ok()
}

/// Whether `class` is `target` or a transitive `rdfs:subClassOf` of it
pub(crate) fn is_subclass_of(graph: &Graph, class: &Term, target: &str) -> bool {
    let subclass_of = format!("{RDFS}subClassOf");
    let mut stack = vec![class.clone()];
    let mut seen = std::collections::BTreeSet::new();

    while let Some(current) = stack.pop() {
        if current.as_iri() == Some(target) {
            return true;
        }
        if seen.insert(current.clone()) {
            stack.extend(graph.objects(&current, &subclass_of).cloned());
        }
    }
    false
}
