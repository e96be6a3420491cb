//! Multilingual name table
//!
//! Loads the tab-separated `recordType, identifier, displayName, language`
//! table into an immutable [`TranslationIndex`]. Only `pokemon` rows are
//! kept; rows with the wrong column count are skipped with a debug log.

pub mod language;

pub use language::{is_valid_language_tag, normalize_language, Rejection, EXCLUDED_LANGUAGE};

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::utils::error::DataFormatError;

/// Record type marker of the rows the index keeps
pub const RECORD_TYPE: &str = "pokemon";

/// Number of columns in a translation row
pub const COLUMN_COUNT: usize = 4;

/// Errors raised while loading the translation table
#[derive(Error, Debug)]
pub enum TranslationError {
    /// The table could not be read
    #[error("failed to read translation table {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// One translated display name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslatedName {
    pub name: String,
    pub language: String,
}

/// A parsed table row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationRow {
    pub record_type: String,
    pub id: String,
    pub name: String,
    pub language: String,
}

/// Counters gathered while loading
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadStats {
    pub lines: usize,
    pub kept: usize,
    pub other_record_type: usize,
    pub malformed: usize,
    /// Lines holding invalid UTF-8, decoded with replacement characters
    pub lossy: usize,
}

/// Lookup from identifier to translated names
#[derive(Debug, Clone, Default)]
pub struct TranslationIndex {
    entries: BTreeMap<String, Vec<TranslatedName>>,
    english: HashMap<String, String>,
    stats: LoadStats,
}

/// Split one line into its four columns
///
/// `line_no` is 1-based and only used for the error message.
pub fn parse_line(line: &str, line_no: usize) -> Result<TranslationRow, DataFormatError> {
    let line = line.strip_suffix('\r').unwrap_or(line);
    let columns: Vec<&str> = line.split('\t').collect();

    if columns.len() != COLUMN_COUNT {
        return Err(DataFormatError::ColumnCount {
            line: line_no,
            expected: COLUMN_COUNT,
            found: columns.len(),
        });
    }

    Ok(TranslationRow {
        record_type: columns[0].to_string(),
        id: columns[1].to_string(),
        name: columns[2].to_string(),
        language: columns[3].to_string(),
    })
}

impl TranslationIndex {
    /// Load the table from a file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, TranslationError> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|source| TranslationError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let index = Self::from_reader(file).map_err(|source| TranslationError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        tracing::info!(
            path = %path.display(),
            identifiers = index.len(),
            kept = index.stats.kept,
            malformed = index.stats.malformed,
            "Loaded translation table"
        );

        Ok(index)
    }

    /// Load the table from any reader
    ///
    /// Invalid UTF-8 never fails the load: the offending line is decoded
    /// lossily and goes through the usual row checks.
    pub fn from_reader<R: Read>(reader: R) -> std::io::Result<Self> {
        let mut index = Self::default();
        let mut reader = BufReader::new(reader);
        let mut buf = Vec::new();
        let mut line_no = 0;

        loop {
            buf.clear();
            if reader.read_until(b'\n', &mut buf)? == 0 {
                break;
            }
            line_no += 1;

            let bytes = buf.strip_suffix(b"\n").unwrap_or(&buf);
            let line = String::from_utf8_lossy(bytes);
            if let std::borrow::Cow::Owned(_) = line {
                tracing::debug!(line = line_no, "Invalid UTF-8 in translation row");
                index.stats.lossy += 1;
            }
            index.push_line(&line, line_no);
        }
        Ok(index)
    }

    /// Load the table from an in-memory string
    pub fn parse_str(content: &str) -> Self {
        let mut index = Self::default();
        for (i, line) in content.lines().enumerate() {
            index.push_line(line, i + 1);
        }
        index
    }

    fn push_line(&mut self, line: &str, line_no: usize) {
        self.stats.lines += 1;

        let row = match parse_line(line, line_no) {
            Ok(row) => row,
            Err(e) => {
                tracing::debug!(error = %e, "Skipping malformed translation row");
                self.stats.malformed += 1;
                return;
            }
        };

        if row.record_type != RECORD_TYPE {
            self.stats.other_record_type += 1;
            return;
        }

        self.insert(row.id, row.name, row.language);
    }

    /// Add one translation
    pub fn insert(
        &mut self,
        id: impl Into<String>,
        name: impl Into<String>,
        language: impl Into<String>,
    ) {
        let id = id.into();
        let name = name.into();
        let language = language.into();

        if language.trim().eq_ignore_ascii_case("english") {
            let key = name.to_lowercase();
            match self.english.get(&key) {
                Some(existing) if existing.as_str() <= id.as_str() => {}
                _ => {
                    self.english.insert(key, id.clone());
                }
            }
        }

        self.entries
            .entry(id)
            .or_default()
            .push(TranslatedName { name, language });
        self.stats.kept += 1;
    }

    /// Find the identifier whose English name matches, ignoring case
    ///
    /// When several identifiers share an English name the lowest identifier
    /// wins.
    pub fn find_id_by_english_name(&self, name: &str) -> Option<&str> {
        self.english.get(&name.to_lowercase()).map(String::as_str)
    }

    /// All translations for an identifier
    pub fn translations(&self, id: &str) -> &[TranslatedName] {
        self.entries.get(id).map(Vec::as_slice).unwrap_or_default()
    }

    /// Whether the identifier is present
    pub fn contains_id(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    /// Iterate identifiers in ascending order
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Number of identifiers
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn load_stats(&self) -> LoadStats {
        self.stats
    }
}
