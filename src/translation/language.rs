//! Language label normalization
//!
//! The translation table names languages the way a human would ("French",
//! "Chinese (Simplified)", "Official roomaji"). RDF literals need BCP 47
//! tags, so every label goes through [`normalize_language`]:
//!
//! 1. lowercase and trim;
//! 2. drop empty labels and the excluded romanized-Japanese marker;
//! 3. remap known language names to tags;
//! 4. keep the tag only if [`is_valid_language_tag`] accepts it.

use lazy_static::lazy_static;
use regex::Regex;
use std::collections::{HashMap, HashSet};

/// Label whose names are never turned into `rdfs:label` literals
pub const EXCLUDED_LANGUAGE: &str = "official roomaji";

lazy_static! {
    static ref LANGUAGE_REMAP: HashMap<&'static str, &'static str> = HashMap::from([
        ("english", "en"),
        ("french", "fr"),
        ("german", "de"),
        ("italian", "it"),
        ("spanish", "es"),
        ("japanese", "ja"),
        ("korean", "ko"),
        ("chinese", "zh"),
        ("chinese (simplified)", "zh-hans"),
        ("chinese (traditional)", "zh-hant"),
        ("chinese simplified", "zh-hans"),
        ("chinese traditional", "zh-hant"),
        ("simplified chinese", "zh-hans"),
        ("traditional chinese", "zh-hant"),
        ("chs", "zh-hans"),
        ("cht", "zh-hant"),
        ("portuguese", "pt"),
        ("brazilian portuguese", "pt-br"),
        ("russian", "ru"),
        ("dutch", "nl"),
        ("polish", "pl"),
        ("thai", "th"),
        ("czech", "cs"),
        ("hindi", "hi"),
    ]);

    /// Known ISO 639-1 primary subtags
    static ref KNOWN_LANGUAGES: HashSet<&'static str> = HashSet::from([
        "ar", "bg", "ca", "cs", "da", "de", "el", "en", "es", "et", "fa", "fi", "fr", "he",
        "hi", "hr", "hu", "id", "it", "ja", "ko", "lt", "lv", "ms", "nb", "nl", "no", "pl",
        "pt", "ro", "ru", "sk", "sl", "sr", "sv", "th", "tr", "uk", "vi", "zh",
    ]);

    static ref TAG_SHAPE: Regex =
        Regex::new(r"^([a-z]{2,3})(-[a-z]{4})?(-([a-z]{2}|[0-9]{3}))?$").expect("Invalid regex pattern");
}

/// Why a language label did not produce a tag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// Label was empty after trimming
    Empty,
    /// Label is the excluded romanization marker
    Excluded,
    /// Label did not map to a known, well-formed tag
    Invalid,
}

/// Check a lowercase BCP 47 tag against the known locale list
///
/// Accepts `language[-script][-region]` where the primary subtag is a known
/// ISO 639-1 code.
pub fn is_valid_language_tag(tag: &str) -> bool {
    TAG_SHAPE
        .captures(tag)
        .and_then(|caps| caps.get(1))
        .is_some_and(|primary| KNOWN_LANGUAGES.contains(primary.as_str()))
}

/// Turn a raw language label into a literal language tag
pub fn normalize_language(raw: &str) -> Result<String, Rejection> {
    let label = raw.trim().to_lowercase();

    if label.is_empty() {
        return Err(Rejection::Empty);
    }
    if label == EXCLUDED_LANGUAGE {
        return Err(Rejection::Excluded);
    }

    let tag = LANGUAGE_REMAP
        .get(label.as_str())
        .map(|t| (*t).to_string())
        .unwrap_or_else(|| label.replace('_', "-"));

    if is_valid_language_tag(&tag) {
        Ok(tag)
    } else {
        Err(Rejection::Invalid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remap_language_names() {
        assert_eq!(normalize_language("French").as_deref(), Ok("fr"));
        assert_eq!(normalize_language("  GERMAN ").as_deref(), Ok("de"));
        assert_eq!(
            normalize_language("Chinese (Simplified)").as_deref(),
            Ok("zh-hans")
        );
        assert_eq!(
            normalize_language("Chinese (Traditional)").as_deref(),
            Ok("zh-hant")
        );
    }

    #[test]
    fn test_tags_pass_through() {
        assert_eq!(normalize_language("fr").as_deref(), Ok("fr"));
        assert_eq!(normalize_language("pt_BR").as_deref(), Ok("pt-br"));
        assert_eq!(normalize_language("zh-Hant").as_deref(), Ok("zh-hant"));
    }

    #[test]
    fn test_excluded_and_empty() {
        assert_eq!(normalize_language("Official roomaji"), Err(Rejection::Excluded));
        assert_eq!(normalize_language("   "), Err(Rejection::Empty));
    }

    #[test]
    fn test_invalid_labels_rejected() {
        assert_eq!(normalize_language("Klingon"), Err(Rejection::Invalid));
        assert_eq!(normalize_language("xx"), Err(Rejection::Invalid));
        assert_eq!(normalize_language("fr-"), Err(Rejection::Invalid));
    }

    #[test]
    fn test_is_valid_language_tag() {
        assert!(is_valid_language_tag("en"));
        assert!(is_valid_language_tag("zh-hans"));
        assert!(is_valid_language_tag("en-gb"));
        assert!(is_valid_language_tag("es-419"));
        assert!(!is_valid_language_tag("english"));
        assert!(!is_valid_language_tag("en gb"));
        assert!(!is_valid_language_tag(""));
    }
}
