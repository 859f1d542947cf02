//! References to local and external entities

use crate::error::{OboError, Result};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

/// Prefix used for references defined inline by an ontology
pub const DEFAULT_PREFIX: &str = "obo";

/// A (prefix, identifier) pointer with an optional display name
///
/// Equality, ordering and hashing only consider the prefix and identifier.
/// The name is metadata carried along for writers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reference {
    prefix: String,
    identifier: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
}

impl Reference {
    /// Create a reference, rejecting an empty prefix or identifier
    pub fn new(prefix: impl Into<String>, identifier: impl Into<String>) -> Result<Self> {
        let prefix = prefix.into();
        let identifier = identifier.into();
        if prefix.trim().is_empty() || identifier.trim().is_empty() {
            return Err(OboError::InvalidReference { prefix, identifier });
        }
        Ok(Self {
            prefix,
            identifier,
            name: None,
        })
    }

    /// Build a reference from literals known to be non-empty
    pub(crate) fn from_static(
        prefix: &'static str,
        identifier: &'static str,
        name: &'static str,
    ) -> Self {
        Self {
            prefix: prefix.to_string(),
            identifier: identifier.to_string(),
            name: Some(name.to_string()),
        }
    }

    /// Attach a display name
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Attach a display name if one is available
    #[must_use]
    pub fn with_optional_name(mut self, name: Option<String>) -> Self {
        self.name = name;
        self
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Render as `prefix:identifier`
    pub fn curie(&self) -> String {
        format!("{}:{}", self.prefix, self.identifier)
    }

    /// Whether this reference was built with [`default_reference`]
    pub fn is_default(&self) -> bool {
        self.prefix == DEFAULT_PREFIX && self.identifier.contains('#')
    }

    /// The ontology prefix a default reference is scoped to
    pub fn default_scope(&self) -> Option<&str> {
        if !self.is_default() {
            return None;
        }
        self.identifier.split_once('#').map(|(scope, _)| scope)
    }

    /// The local part of a default reference, or the identifier otherwise
    pub fn local_identifier(&self) -> &str {
        if self.is_default() {
            if let Some((_, local)) = self.identifier.split_once('#') {
                return local;
            }
        }
        &self.identifier
    }
}

/// Build a reference scoped to an ontology's own namespace
///
/// Used for typedefs and metadata tags that an extractor defines inline rather
/// than importing from an external ontology.
pub fn default_reference(
    prefix: &str,
    identifier: &str,
    name: Option<&str>,
) -> Result<Reference> {
    if prefix.trim().is_empty() || identifier.trim().is_empty() {
        return Err(OboError::InvalidReference {
            prefix: prefix.to_string(),
            identifier: identifier.to_string(),
        });
    }
    let reference = Reference::new(DEFAULT_PREFIX, format!("{}#{}", prefix, identifier))?;
    Ok(reference.with_optional_name(name.map(str::to_string)))
}

impl PartialEq for Reference {
    fn eq(&self, other: &Self) -> bool {
        self.prefix == other.prefix && self.identifier == other.identifier
    }
}

impl Eq for Reference {}

impl Hash for Reference {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.prefix.hash(state);
        self.identifier.hash(state);
    }
}

impl PartialOrd for Reference {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Reference {
    fn cmp(&self, other: &Self) -> Ordering {
        (&self.prefix, &self.identifier).cmp(&(&other.prefix, &other.identifier))
    }
}

impl std::fmt::Display for Reference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.prefix, self.identifier)
    }
}

impl FromStr for Reference {
    type Err = OboError;

    /// Parse a CURIE, splitting on the first colon
    fn from_str(s: &str) -> Result<Self> {
        match s.trim().split_once(':') {
            Some((prefix, identifier)) => Reference::new(prefix.trim(), identifier.trim()),
            None => Err(OboError::InvalidReference {
                prefix: String::new(),
                identifier: s.to_string(),
            }),
        }
    }
}
