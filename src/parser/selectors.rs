//! CSS selectors for the Bulbapedia species infobox
//!
//! The infobox is the first table whose class list contains `roundy`.
//! Attribute lookups are scoped to that table.

use lazy_static::lazy_static;
use scraper::Selector;

// Helper macro to parse selectors safely at compile time
macro_rules! parse_selector {
    ($s:expr) => {
        Selector::parse($s).expect(concat!("Invalid CSS selector: ", $s))
    };
}

lazy_static! {
    static ref INFOBOX: Selector = parse_selector!("table[class*='roundy']");

    static ref BOLD: Selector = parse_selector!("b");

    static ref TYPE_LINK: Selector = parse_selector!("a[href*='(type)']");

    // Label of a dimension block: <b><a><span>Height</span></a></b>
    static ref LABEL_SPAN: Selector = parse_selector!("a > span");

    // Metric value in the sibling table: second cell of a row
    static ref VALUE_CELL: Selector = parse_selector!("tr > td:nth-of-type(2)");
}

/// Selectors used by the infobox parser
pub struct InfoboxSelectors {
    pub infobox: &'static Selector,
    pub bold: &'static Selector,
    pub type_link: &'static Selector,
    pub label_span: &'static Selector,
    pub value_cell: &'static Selector,
}

impl InfoboxSelectors {
    pub fn new() -> Self {
        Self {
            infobox: &INFOBOX,
            bold: &BOLD,
            type_link: &TYPE_LINK,
            label_span: &LABEL_SPAN,
            value_cell: &VALUE_CELL,
        }
    }
}

impl Default for InfoboxSelectors {
    fn default() -> Self {
        Self::new()
    }
}
