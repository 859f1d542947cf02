//! Raw source records
//!
//! A [`RawRecord`] is one row or tag from a source file, keyed by field name.
//! Extractors read from it; the term model never sees it.

use crate::error::{IngestError, Result};
use indexmap::IndexMap;

/// Field name to raw string value, in source order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRecord {
    fields: IndexMap<String, String>,
    /// 1-based line in the source file, for error reporting
    line: usize,
}

impl RawRecord {
    pub fn new(line: usize) -> Self {
        Self {
            fields: IndexMap::new(),
            line,
        }
    }

    /// Pair a header row with a data row; extra values without a header are
    /// dropped and missing trailing values are absent
    pub fn from_row<'a, H, V>(headers: H, values: V, line: usize) -> Self
    where
        H: IntoIterator<Item = &'a str>,
        V: IntoIterator<Item = &'a str>,
    {
        let fields = headers
            .into_iter()
            .zip(values)
            .map(|(header, value)| (header.trim().to_string(), value.to_string()))
            .collect();
        Self { fields, line }
    }

    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(field.into(), value.into());
    }

    pub fn line(&self) -> usize {
        self.line
    }

    /// The trimmed value, treating empty strings as absent
    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields
            .get(field)
            .map(|value| value.trim())
            .filter(|value| !value.is_empty())
    }

    /// Like [`RawRecord::get`] but missing values are an error
    pub fn require(&self, field: &str) -> Result<&str> {
        self.get(field)
            .ok_or_else(|| IngestError::missing_field(field, self.line))
    }

    /// Split a delimited field into its non-empty, trimmed parts
    pub fn get_list(&self, field: &str, separator: char) -> Vec<&str> {
        self.get(field)
            .map(|value| {
                value
                    .split(separator)
                    .map(str::trim)
                    .filter(|part| !part.is_empty())
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields
            .iter()
            .map(|(field, value)| (field.as_str(), value.as_str()))
    }
}
