//! Infobox extraction
//!
//! Each attribute is looked up independently; a miss leaves the field to
//! its sentinel instead of failing the page.

use scraper::{ElementRef, Html};

use crate::models::{EntityField, ExtractedEntity};
use crate::parser::sanitize::clean_text;
use crate::parser::selectors::InfoboxSelectors;
use crate::utils::error::ParseError;

/// Parser for a species page
pub struct InfoboxParser {
    selectors: InfoboxSelectors,
}

impl InfoboxParser {
    pub fn new() -> Self {
        Self {
            selectors: InfoboxSelectors::new(),
        }
    }

    /// Parse a page into an entity
    ///
    /// # Errors
    ///
    /// Returns `ParseError::InfoboxNotFound` when the page has no infobox
    /// table
    pub fn parse(&self, source_name: &str, html: &str) -> Result<ExtractedEntity, ParseError> {
        let document = Html::parse_document(html);

        let infobox = document
            .select(self.selectors.infobox)
            .next()
            .ok_or_else(|| ParseError::InfoboxNotFound {
                entity: source_name.to_string(),
            })?;

        let entity = ExtractedEntity::from_fields(
            source_name,
            self.extract_name(infobox),
            self.extract_type(infobox),
            self.extract_dimension(infobox, EntityField::Height),
            self.extract_dimension(infobox, EntityField::Weight),
        );

        let missing = entity.missing_fields();
        if !missing.is_empty() {
            tracing::debug!(
                entity = source_name,
                missing = ?missing,
                "Infobox fields missing, using sentinels"
            );
        }

        Ok(entity)
    }

    /// Text of the first bold element
    pub fn extract_name(&self, infobox: ElementRef<'_>) -> Option<String> {
        infobox
            .select(self.selectors.bold)
            .next()
            .and_then(element_text)
    }

    /// Text of the first link to a type page
    pub fn extract_type(&self, infobox: ElementRef<'_>) -> Option<String> {
        infobox
            .select(self.selectors.type_link)
            .next()
            .and_then(element_text)
    }

    /// Second cell of the table following the dimension's bold label
    ///
    /// Only `Height` and `Weight` have a dimension block; other fields
    /// return `None`.
    pub fn extract_dimension(&self, infobox: ElementRef<'_>, field: EntityField) -> Option<String> {
        if !EntityField::dimensions().contains(&field) {
            return None;
        }
        let label = field.label();

        let bold = infobox.select(self.selectors.bold).find(|b| {
            b.select(self.selectors.label_span)
                .any(|span| span.text().collect::<String>().contains(label))
        })?;

        let table = bold
            .next_siblings()
            .filter_map(ElementRef::wrap)
            .find(|e| e.value().name() == "table")?;

        table
            .select(self.selectors.value_cell)
            .next()
            .and_then(element_text)
    }
}

impl Default for InfoboxParser {
    fn default() -> Self {
        Self::new()
    }
}

fn element_text(element: ElementRef<'_>) -> Option<String> {
    clean_text(&element.text().collect::<String>())
}
