//! Constraint evaluation
//!
//! Pure functions over a data [`Graph`]; no I/O happens here.

use std::collections::{BTreeMap, BTreeSet};

use super::report::{ValidationReport, ValidationResult};
use super::shapes::{
    is_subclass_of, Constraint, NodeShape, PropertyPath, ShapeCommon, ShapesGraph, Target,
};
use crate::ontology::graph::{Graph, Term, RDF_TYPE, XSD};

impl ShapesGraph {
    /// Validate `data` against every active shape
    pub fn validate(&self, data: &Graph) -> ValidationReport {
        let mut results = Vec::new();
        let mut focus_total = BTreeSet::new();

        for shape in self.shapes() {
            if shape.common.deactivated {
                continue;
            }
            let focus_nodes = focus_nodes(shape, data);
            tracing::trace!(shape = %shape.common.id, focus_nodes = focus_nodes.len(), "Validating shape");

            for focus in &focus_nodes {
                validate_node(shape, focus, data, &mut results);
            }
            focus_total.extend(focus_nodes);
        }

        let report = ValidationReport::new(results, focus_total.len());
        tracing::debug!(
            conforms = report.conforms,
            results = report.results.len(),
            focus_nodes = report.focus_nodes,
            "Validation finished"
        );
        report
    }
}

/// Focus nodes of a shape, deduplicated
pub fn focus_nodes(shape: &NodeShape, data: &Graph) -> BTreeSet<Term> {
    let mut nodes = BTreeSet::new();

    for target in &shape.targets {
        match target {
            Target::Node(node) => {
                nodes.insert(node.clone());
            }
            Target::SubjectsOf(p) => nodes.extend(data.pairs(p).map(|(s, _)| s.clone())),
            Target::ObjectsOf(p) => nodes.extend(data.pairs(p).map(|(_, o)| o.clone())),
            Target::Class(class) => nodes.extend(instances_of(data, class)),
        }
    }

    nodes
}

fn instances_of(data: &Graph, class: &str) -> Vec<Term> {
    data.pairs(RDF_TYPE)
        .filter(|(_, c)| is_subclass_of(data, c, class))
        .map(|(s, _)| s.clone())
        .collect()
}

fn validate_node(shape: &NodeShape, focus: &Term, data: &Graph, results: &mut Vec<ValidationResult>) {
    let focus_values = std::slice::from_ref(focus);
    for constraint in &shape.common.constraints {
        check(&shape.common, None, constraint, focus, focus_values, data, results);
    }

    for property in &shape.properties {
        if property.common.deactivated {
            continue;
        }
        let values = path_values(&property.path, focus, data);
        for constraint in &property.common.constraints {
            check(
                &property.common,
                Some(&property.path),
                constraint,
                focus,
                &values,
                data,
                results,
            );
        }
    }
}

/// Value nodes reached from `focus` through `path`
pub fn path_values(path: &PropertyPath, focus: &Term, data: &Graph) -> Vec<Term> {
    let values: BTreeSet<Term> = match path {
        PropertyPath::Predicate(p) => data.objects(focus, p).cloned().collect(),
        PropertyPath::Inverse(p) => data.subjects_with(p, focus).cloned().collect(),
    };
    values.into_iter().collect()
}

fn check(
    shape: &ShapeCommon,
    path: Option<&PropertyPath>,
    constraint: &Constraint,
    focus: &Term,
    values: &[Term],
    data: &Graph,
    results: &mut Vec<ValidationResult>,
) {
    let mut report = |value: Option<&Term>, default_message: String| {
        results.push(ValidationResult {
            focus_node: focus.clone(),
            path: path.cloned(),
            value: value.cloned(),
            message: shape.message.clone().unwrap_or(default_message),
            severity: shape.severity,
            source_shape: shape.id.clone(),
            constraint: constraint.component().to_string(),
        });
    };

    match constraint {
        Constraint::MinCount(min) => {
            if values.len() < *min {
                report(
                    None,
                    format!("expected at least {min} value(s), found {}", values.len()),
                );
            }
        }
        Constraint::MaxCount(max) => {
            if values.len() > *max {
                report(
                    None,
                    format!("expected at most {max} value(s), found {}", values.len()),
                );
            }
        }
        Constraint::Datatype(datatype) => {
            for value in values {
                if value.datatype() != Some(datatype.as_str()) || !is_well_formed(value) {
                    report(Some(value), format!("value does not have datatype <{datatype}>"));
                }
            }
        }
        Constraint::NodeKind(kind) => {
            for value in values {
                if !kind.matches(value) {
                    report(Some(value), format!("value is not of node kind <{}>", kind.iri()));
                }
            }
        }
        Constraint::Class(class) => {
            for value in values {
                let typed = !value.is_literal()
                    && data
                        .objects(value, RDF_TYPE)
                        .any(|c| is_subclass_of(data, c, class));
                if !typed {
                    report(Some(value), format!("value is not an instance of <{class}>"));
                }
            }
        }
        Constraint::MinLength(min) => {
            for value in values {
                if string_value(value).map_or(true, |s| s.chars().count() < *min) {
                    report(Some(value), format!("value is shorter than {min} characters"));
                }
            }
        }
        Constraint::MaxLength(max) => {
            for value in values {
                if string_value(value).map_or(true, |s| s.chars().count() > *max) {
                    report(Some(value), format!("value is longer than {max} characters"));
                }
            }
        }
        Constraint::Pattern { regex, source } => {
            for value in values {
                if string_value(value).map_or(true, |s| !regex.is_match(s)) {
                    report(Some(value), format!("value does not match pattern \"{source}\""));
                }
            }
        }
        Constraint::In(allowed) => {
            for value in values {
                if !allowed.contains(value) {
                    report(Some(value), "value is not in the allowed list".to_string());
                }
            }
        }
        Constraint::HasValue(expected) => {
            if !values.contains(expected) {
                report(None, format!("missing required value {expected}"));
            }
        }
        Constraint::LanguageIn(ranges) => {
            for value in values {
                let allowed = value
                    .language()
                    .is_some_and(|tag| ranges.iter().any(|r| language_matches(tag, r)));
                if !allowed {
                    report(
                        Some(value),
                        format!("language tag is not one of {}", ranges.join(", ")),
                    );
                }
            }
        }
        Constraint::UniqueLang => {
            let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
            for tag in values.iter().filter_map(Term::language) {
                *counts.entry(tag).or_default() += 1;
            }
            for (tag, count) in counts.into_iter().filter(|(_, c)| *c > 1) {
                report(None, format!("language \"{tag}\" used by {count} values"));
            }
        }
    }
}

/// Lexical form of a literal, or the IRI string
fn string_value(term: &Term) -> Option<&str> {
    match term {
        Term::Iri(iri) => Some(iri),
        Term::Literal { value, .. } => Some(value),
        Term::BlankNode(_) => None,
    }
}

/// Basic language-range matching: exact tag, tag prefix, or `*`
fn language_matches(tag: &str, range: &str) -> bool {
    let tag = tag.to_ascii_lowercase();
    let range = range.to_ascii_lowercase();
    let range = range.as_str();
    range == "*"
        || tag == range
        || tag
            .strip_prefix(range)
            .is_some_and(|rest| rest.starts_with('-'))
}

/// Lexical check for the numeric and boolean XSD datatypes
fn is_well_formed(term: &Term) -> bool {
    let (Some(value), Some(datatype)) = (term.literal_value(), term.datatype()) else {
        return false;
    };
    let Some(local) = datatype.strip_prefix(XSD) else {
        return true;
    };

    match local {
        "integer" | "int" | "long" | "short" | "nonNegativeInteger" | "positiveInteger" => {
            value.parse::<i128>().is_ok()
        }
        "decimal" | "double" | "float" => value.parse::<f64>().is_ok(),
        "boolean" => matches!(value, "true" | "false" | "1" | "0"),
        _ => true,
    }
}
