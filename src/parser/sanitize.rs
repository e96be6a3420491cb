//! Text cleanup for values read from the infobox

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref TAG: Regex = Regex::new(r"(?s)<[^>]*>").expect("Invalid regex pattern");
}

/// Clean a text node read from the parsed document
///
/// The DOM already holds decoded text, so entities are not decoded again.
/// Drops invisible formatting characters, turns non-breaking spaces into
/// plain spaces and trims. Returns `None` when nothing is left.
///
/// # Examples
///
/// ```
/// use pokegraph::parser::sanitize::clean_text;
///
/// assert_eq!(clean_text("  Pokémon\n"), Some("Pokémon".to_string()));
/// assert_eq!(clean_text("Ho-Oh &amp; Lugia"), Some("Ho-Oh &amp; Lugia".to_string()));
/// assert_eq!(clean_text(" \u{200B} "), None);
/// ```
pub fn clean_text(text: &str) -> Option<String> {
    let cleaned = remove_zero_width(text).replace('\u{00A0}', " ");
    let trimmed = cleaned.trim();

    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Plain text of a raw HTML fragment
///
/// Removes tags and decodes entities exactly once. Used for markup that
/// never went through the DOM, such as store error pages.
///
/// ```
/// use pokegraph::parser::sanitize::strip_markup;
///
/// assert_eq!(
///     strip_markup("<h2>HTTP ERROR 400</h2><pre>Bad IRI: &lt;x&gt;</pre>"),
///     "HTTP ERROR 400 Bad IRI: <x>"
/// );
/// ```
pub fn strip_markup(raw: &str) -> String {
    let without_tags = TAG.replace_all(raw, " ");
    let decoded = html_escape::decode_html_entities(&without_tags);
    let cleaned = remove_zero_width(&decoded).replace('\u{00A0}', " ");
    crate::utils::normalize_whitespace(&cleaned)
}

/// Remove zero-width spaces and similar invisible characters
///
/// Removes U+200B..U+200F, U+2028..U+202F and the BOM (U+FEFF).
///
/// # Examples
///
/// ```
/// use pokegraph::parser::sanitize::remove_zero_width;
///
/// assert_eq!(remove_zero_width("Bulba\u{200B}saur\u{FEFF}"), "Bulbasaur");
/// ```
pub fn remove_zero_width(text: &str) -> String {
    text.chars()
        .filter(|c| {
            !matches!(*c,
                '\u{200B}'..='\u{200F}' |
                '\u{2028}'..='\u{202F}' |
                '\u{FEFF}'
            )
        })
        .collect()
}
