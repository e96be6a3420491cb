// Core data structures for the pokegraph pipeline

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{ErrorCategory, PokegraphErrorTrait};
use crate::utils::truncate_text;

/// Attributes read from an entity's infobox
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityField {
    Name,
    Type,
    Height,
    Weight,
}

impl EntityField {
    /// Label used on the page and in the sentinel
    pub fn label(&self) -> &'static str {
        match self {
            Self::Name => "Name",
            Self::Type => "Type",
            Self::Height => "Height",
            Self::Weight => "Weight",
        }
    }

    /// Value asserted when the field is missing from the page
    pub fn sentinel(&self) -> &'static str {
        match self {
            Self::Name => "Name not found",
            Self::Type => "Type not found",
            Self::Height => "Height not found",
            Self::Weight => "Weight not found",
        }
    }

    /// The two dimension fields read from sibling tables
    pub fn dimensions() -> [Self; 2] {
        [Self::Height, Self::Weight]
    }
}

/// One entity as extracted from its page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedEntity {
    /// Name used to fetch the page and build the subject IRI
    pub source_name: String,

    /// Name as displayed in the infobox
    pub canonical_name: String,

    /// Primary type, e.g. "Grass"
    pub category: String,

    pub height: String,

    pub weight: String,
}

impl ExtractedEntity {
    /// Build from optional field values, filling in sentinels
    pub fn from_fields(
        source_name: impl Into<String>,
        name: Option<String>,
        category: Option<String>,
        height: Option<String>,
        weight: Option<String>,
    ) -> Self {
        let or_sentinel =
            |value: Option<String>, field: EntityField| value.unwrap_or_else(|| field.sentinel().to_string());

        Self {
            source_name: source_name.into(),
            canonical_name: or_sentinel(name, EntityField::Name),
            category: or_sentinel(category, EntityField::Type),
            height: or_sentinel(height, EntityField::Height),
            weight: or_sentinel(weight, EntityField::Weight),
        }
    }

    /// Value of a field
    pub fn field(&self, field: EntityField) -> &str {
        match field {
            EntityField::Name => &self.canonical_name,
            EntityField::Type => &self.category,
            EntityField::Height => &self.height,
            EntityField::Weight => &self.weight,
        }
    }

    /// Whether a field holds its sentinel
    pub fn is_sentinel(&self, field: EntityField) -> bool {
        self.field(field) == field.sentinel()
    }

    /// Fields that fell back to their sentinel
    pub fn missing_fields(&self) -> Vec<EntityField> {
        [
            EntityField::Name,
            EntityField::Type,
            EntityField::Height,
            EntityField::Weight,
        ]
        .into_iter()
        .filter(|f| self.is_sentinel(*f))
        .collect()
    }
}

/// An entity that could not be processed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityFailure {
    pub entity: String,
    pub reason: String,
    pub category: ErrorCategory,

    /// Whether a later run may succeed for this entity
    pub recoverable: bool,
}

/// Statistics of a build run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunStats {
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub listed: usize,
    pub attempted: usize,
    pub extracted: usize,
    pub partial: usize,
    pub labels: usize,
    pub triples: usize,
    pub deadline_hit: bool,
    pub failures: Vec<EntityFailure>,
}

impl RunStats {
    pub fn new() -> Self {
        Self {
            started_at: Utc::now(),
            finished_at: None,
            listed: 0,
            attempted: 0,
            extracted: 0,
            partial: 0,
            labels: 0,
            triples: 0,
            deadline_hit: false,
            failures: Vec::new(),
        }
    }

    pub fn record_failure<E: PokegraphErrorTrait>(&mut self, entity: &str, error: &E) {
        self.failures.push(EntityFailure {
            entity: entity.to_string(),
            reason: error.to_string(),
            category: error.category(),
            recoverable: error.is_recoverable(),
        });
    }

    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    /// Failures a rerun may fix, such as timeouts and 5xx answers
    pub fn recoverable_failures(&self) -> usize {
        self.failures.iter().filter(|f| f.recoverable).count()
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    /// Elapsed seconds between start and finish (or now)
    pub fn elapsed_secs(&self) -> f64 {
        let end = self.finished_at.unwrap_or_else(Utc::now);
        (end - self.started_at).num_milliseconds() as f64 / 1000.0
    }

    /// Text report listing per-entity failures
    pub fn report(&self) -> String {
        let mut out = format!(
            "Entities listed: {}\nAttempted: {}\nExtracted: {} ({} with missing fields)\nFailed: {}\nLabels: {}\nTriples in graph: {}\nElapsed: {:.1}s\n",
            self.listed,
            self.attempted,
            self.extracted,
            self.partial,
            self.failed(),
            self.labels,
            self.triples,
            self.elapsed_secs()
        );

        if self.deadline_hit {
            out.push_str("Run deadline reached before all entities were processed\n");
        }

        if !self.failures.is_empty() {
            out.push_str(&format!(
                "\nFailures ({} may succeed on a rerun):\n",
                self.recoverable_failures()
            ));
            for failure in &self.failures {
                out.push_str(&format!(
                    "  - {}: {} [{}]\n",
                    failure.entity,
                    truncate_text(&failure.reason, 120),
                    failure.category.label()
                ));
            }
        }

        out
    }
}

impl Default for RunStats {
    fn default() -> Self {
        Self::new()
    }
}
