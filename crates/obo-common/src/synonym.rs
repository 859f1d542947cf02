//! Synonyms and synonym type declarations

use crate::error::{OboError, Result};
use crate::reference::{default_reference, Reference};
use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};
use std::sync::LazyLock;

/// Synonym scope (EXACT, BROAD, NARROW, RELATED)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum SynonymScope {
    #[default]
    Exact,
    Broad,
    Narrow,
    Related,
}

impl SynonymScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            SynonymScope::Exact => "EXACT",
            SynonymScope::Broad => "BROAD",
            SynonymScope::Narrow => "NARROW",
            SynonymScope::Related => "RELATED",
        }
    }
}

impl std::str::FromStr for SynonymScope {
    type Err = OboError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_uppercase().as_str() {
            "EXACT" => Ok(SynonymScope::Exact),
            "BROAD" => Ok(SynonymScope::Broad),
            "NARROW" => Ok(SynonymScope::Narrow),
            "RELATED" => Ok(SynonymScope::Related),
            _ => Err(OboError::Parse(format!("Unknown synonym scope: {}", s))),
        }
    }
}

impl std::fmt::Display for SynonymScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Declares an allowed synonym category for an ontology (e.g. "symbol")
///
/// Identity is the reference alone; the scope does not distinguish two
/// declarations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SynonymTypeDef {
    reference: Reference,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    scope: Option<SynonymScope>,
}

impl SynonymTypeDef {
    pub fn new(reference: Reference) -> Self {
        Self {
            reference,
            scope: None,
        }
    }

    /// Build a synonym type scoped to the given ontology
    pub fn default_for(prefix: &str, identifier: &str, name: Option<&str>) -> Result<Self> {
        Ok(Self::new(default_reference(prefix, identifier, name)?))
    }

    #[must_use]
    pub fn with_scope(mut self, scope: SynonymScope) -> Self {
        self.scope = Some(scope);
        self
    }

    pub fn reference(&self) -> &Reference {
        &self.reference
    }

    pub fn name(&self) -> Option<&str> {
        self.reference.name()
    }

    pub fn scope(&self) -> Option<SynonymScope> {
        self.scope
    }
}

impl PartialEq for SynonymTypeDef {
    fn eq(&self, other: &Self) -> bool {
        self.reference == other.reference
    }
}

impl Eq for SynonymTypeDef {}

impl Hash for SynonymTypeDef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.reference.hash(state);
    }
}

/// The generic synonym type used when a synonym carries none
pub static DEFAULT_SYNONYM_TYPE: LazyLock<SynonymTypeDef> = LazyLock::new(|| {
    SynonymTypeDef::new(Reference::from_static("oboInOwl", "SynonymType", "synonym type"))
});

/// An alternate name for a term
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Synonym {
    name: String,
    #[serde(default)]
    scope: SynonymScope,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    synonym_type: Option<Reference>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    provenance: Vec<Reference>,
}

impl Synonym {
    /// Create a synonym; the name must not be blank
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(OboError::InvalidSynonym("synonym name is empty".to_string()));
        }
        Ok(Self {
            name,
            scope: SynonymScope::default(),
            synonym_type: None,
            provenance: Vec::new(),
        })
    }

    /// Tag with a synonym type, adopting its default scope if it has one
    #[must_use]
    pub fn with_type(mut self, synonym_type: &SynonymTypeDef) -> Self {
        if let Some(scope) = synonym_type.scope() {
            self.scope = scope;
        }
        self.synonym_type = Some(synonym_type.reference().clone());
        self
    }

    #[must_use]
    pub fn with_scope(mut self, scope: SynonymScope) -> Self {
        self.scope = scope;
        self
    }

    #[must_use]
    pub fn with_provenance(mut self, provenance: Vec<Reference>) -> Self {
        self.provenance = provenance;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn scope(&self) -> SynonymScope {
        self.scope
    }

    /// The declared type, if any
    pub fn declared_type(&self) -> Option<&Reference> {
        self.synonym_type.as_ref()
    }

    /// The type, falling back to the generic synonym type
    pub fn synonym_type(&self) -> &Reference {
        self.synonym_type
            .as_ref()
            .unwrap_or_else(|| DEFAULT_SYNONYM_TYPE.reference())
    }

    pub fn provenance(&self) -> &[Reference] {
        &self.provenance
    }
}
