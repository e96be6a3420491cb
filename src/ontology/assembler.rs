//! Graph assembly
//!
//! [`GraphAssembler`] owns the run's single [`Graph`]. Every mutation goes
//! through [`GraphAssembler::add_entity`], which takes `&mut self`, so there
//! is exactly one writer for the lifetime of the run.

use super::graph::{iri_escape, Graph, Term, EX, OWL_SAME_AS, PROP, RDFS_LABEL};
use crate::models::{EntityField, ExtractedEntity};
use crate::translation::{normalize_language, Rejection, TranslationIndex};

/// `prop:hasName`
pub const HAS_NAME: &str = "http://example.org/property/hasName";
/// `prop:hasType`
pub const HAS_TYPE: &str = "http://example.org/property/hasType";
/// `prop:hasHeight`
pub const HAS_HEIGHT: &str = "http://example.org/property/hasHeight";
/// `prop:hasWeight`
pub const HAS_WEIGHT: &str = "http://example.org/property/hasWeight";

/// Assembly options
#[derive(Debug, Clone)]
pub struct AssemblerOptions {
    /// Assert `owl:sameAs` to `{same_as_base}{escaped canonical name}`
    pub link_same_as: bool,

    /// Base IRI for `owl:sameAs` targets
    pub same_as_base: String,
}

impl Default for AssemblerOptions {
    fn default() -> Self {
        Self {
            link_same_as: false,
            same_as_base: String::from("http://dbpedia.org/resource/"),
        }
    }
}

impl From<&crate::config::GraphConfig> for AssemblerOptions {
    fn from(config: &crate::config::GraphConfig) -> Self {
        Self {
            link_same_as: config.link_same_as,
            same_as_base: config.same_as_base.clone(),
        }
    }
}

/// What one `add_entity` call asserted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AssemblyOutcome {
    /// New triples (0 when re-asserting identical input)
    pub inserted: usize,

    /// Labels asserted or already present
    pub labels: usize,

    /// Translations skipped as empty or excluded
    pub excluded: usize,

    /// Translations dropped for an invalid language tag
    pub invalid: usize,

    /// Whether the source name resolved to a translation identifier
    pub translated: bool,
}

/// Single owner of the run's graph
#[derive(Debug, Default)]
pub struct GraphAssembler {
    graph: Graph,
    options: AssemblerOptions,
    entities: usize,
}

/// Subject IRI for a source name: `ex:` + escaped name
pub fn subject_iri(source_name: &str) -> String {
    format!("{EX}{}", iri_escape(source_name))
}

impl GraphAssembler {
    /// Create an assembler around an empty graph
    pub fn new(options: AssemblerOptions) -> Self {
        Self {
            graph: Graph::new(),
            options,
            entities: 0,
        }
    }

    /// Assert an entity's attributes and labels
    ///
    /// Never fails: missing attributes already carry sentinel values and
    /// unusable translations are skipped.
    pub fn add_entity(
        &mut self,
        entity: &ExtractedEntity,
        translations: &TranslationIndex,
    ) -> AssemblyOutcome {
        let subject = Term::iri(subject_iri(&entity.source_name));
        let mut outcome = AssemblyOutcome::default();

        for (predicate, value) in [
            (HAS_NAME, &entity.canonical_name),
            (HAS_TYPE, &entity.category),
            (HAS_HEIGHT, &entity.height),
            (HAS_WEIGHT, &entity.weight),
        ] {
            if self
                .graph
                .assert(subject.clone(), predicate, Term::literal(value.as_str()))
            {
                outcome.inserted += 1;
            }
        }

        if let Some(id) = translations.find_id_by_english_name(&entity.source_name) {
            outcome.translated = true;

            for translation in translations.translations(id) {
                match normalize_language(&translation.language) {
                    Ok(tag) => {
                        outcome.labels += 1;
                        if self.graph.assert(
                            subject.clone(),
                            RDFS_LABEL,
                            Term::lang_literal(translation.name.as_str(), tag),
                        ) {
                            outcome.inserted += 1;
                        }
                    }
                    Err(Rejection::Empty | Rejection::Excluded) => outcome.excluded += 1,
                    Err(Rejection::Invalid) => {
                        tracing::trace!(
                            entity = %entity.source_name,
                            language = %translation.language,
                            "Dropping label with invalid language tag"
                        );
                        outcome.invalid += 1;
                    }
                }
            }
        }

        if self.options.link_same_as && !entity.is_sentinel(EntityField::Name) {
            let target = format!(
                "{}{}",
                self.options.same_as_base,
                iri_escape(&entity.canonical_name)
            );
            if self
                .graph
                .assert(subject.clone(), OWL_SAME_AS, Term::iri(target))
            {
                outcome.inserted += 1;
            }
        }

        self.entities += 1;
        tracing::debug!(
            entity = %entity.source_name,
            inserted = outcome.inserted,
            labels = outcome.labels,
            "Assembled entity"
        );

        outcome
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn into_graph(self) -> Graph {
        self.graph
    }

    /// Number of `add_entity` calls so far
    pub fn entity_count(&self) -> usize {
        self.entities
    }

    pub fn options(&self) -> &AssemblerOptions {
        &self.options
    }
}

/// Property IRI for a local name in the `prop:` namespace
pub fn property_iri(local: &str) -> String {
    format!("{PROP}{local}")
}
