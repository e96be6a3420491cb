//! Validation results and their text rendering

use serde::Serialize;
use std::fmt::Write as _;

use super::shapes::{sh, PropertyPath, Severity};
use crate::ontology::graph::{PrefixMap, Term};
use crate::ontology::turtle::{format_iri, TurtleWriter};

/// One validation result
#[derive(Debug, Clone, Serialize)]
pub struct ValidationResult {
    pub focus_node: Term,

    /// `None` for node-level constraints
    pub path: Option<PropertyPath>,

    /// Offending value, when the constraint is about a single value
    pub value: Option<Term>,

    pub message: String,
    pub severity: Severity,
    pub source_shape: Term,

    /// Constraint component IRI
    pub constraint: String,
}

/// Outcome of a validation run
#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidationReport {
    pub conforms: bool,
    pub results: Vec<ValidationResult>,

    /// Number of focus nodes checked
    pub focus_nodes: usize,
}

impl ValidationReport {
    /// Build a report; `conforms` is true iff there are no results
    pub fn new(results: Vec<ValidationResult>, focus_nodes: usize) -> Self {
        Self {
            conforms: results.is_empty(),
            results,
            focus_nodes,
        }
    }

    /// Results of `Violation` severity
    pub fn violations(&self) -> impl Iterator<Item = &ValidationResult> {
        self.results
            .iter()
            .filter(|r| r.severity == Severity::Violation)
    }

    /// Results whose focus node is `node`
    pub fn results_for<'a>(&'a self, node: &'a Term) -> impl Iterator<Item = &'a ValidationResult> + 'a {
        self.results.iter().filter(move |r| &r.focus_node == node)
    }

    /// User-facing report
    pub fn to_text(&self) -> String {
        let mut prefixes = PrefixMap::standard();
        prefixes.bind("sh", sh!(""));
        let writer = TurtleWriter::new();

        let mut out = String::new();
        let _ = writeln!(out, "Conforms: {}", self.conforms);
        let _ = writeln!(out, "Focus nodes checked: {}", self.focus_nodes);

        if self.results.is_empty() {
            return out;
        }

        let _ = writeln!(out, "Results ({}):", self.results.len());
        for result in &self.results {
            let _ = writeln!(
                out,
                "  - [{}] {}",
                result.severity,
                writer.format_term(&result.focus_node, &prefixes)
            );
            if let Some(path) = &result.path {
                let rendered = match path {
                    PropertyPath::Predicate(p) => format_iri(p, &prefixes),
                    PropertyPath::Inverse(p) => format!("^{}", format_iri(p, &prefixes)),
                };
                let _ = writeln!(out, "      path: {rendered}");
            }
            if let Some(value) = &result.value {
                let _ = writeln!(out, "      value: {}", writer.format_term(value, &prefixes));
            }
            let _ = writeln!(
                out,
                "      constraint: {}",
                format_iri(&result.constraint, &prefixes)
            );
            let _ = writeln!(out, "      message: {}", result.message);
        }

        out
    }
}
