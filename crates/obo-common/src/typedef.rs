//! Relation types (typedefs) and the standard relations shared by all sources

use crate::error::Result;
use crate::reference::{default_reference, Reference};
use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};
use std::sync::LazyLock;

/// A named relation used as a predicate between terms, or between a term and
/// a literal value when `is_metadata_tag` is set
///
/// Two typedefs with the same reference denote the same relation, whatever
/// their other fields say.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypeDef {
    reference: Reference,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    definition: Option<String>,
    #[serde(default)]
    is_metadata_tag: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    inverse: Option<Reference>,
    #[serde(default)]
    is_transitive: bool,
}

impl TypeDef {
    pub fn new(reference: Reference) -> Self {
        Self {
            reference,
            definition: None,
            is_metadata_tag: false,
            inverse: None,
            is_transitive: false,
        }
    }

    /// Build a typedef scoped to the given ontology via [`default_reference`]
    pub fn default_for(prefix: &str, identifier: &str, name: Option<&str>) -> Result<Self> {
        Ok(Self::new(default_reference(prefix, identifier, name)?))
    }

    #[must_use]
    pub fn with_definition(mut self, definition: impl Into<String>) -> Self {
        self.definition = Some(definition.into());
        self
    }

    /// Mark as a metadata tag, used for literal annotations
    #[must_use]
    pub fn as_metadata_tag(mut self) -> Self {
        self.is_metadata_tag = true;
        self
    }

    #[must_use]
    pub fn with_inverse(mut self, inverse: Reference) -> Self {
        self.inverse = Some(inverse);
        self
    }

    #[must_use]
    pub fn transitive(mut self) -> Self {
        self.is_transitive = true;
        self
    }

    pub fn reference(&self) -> &Reference {
        &self.reference
    }

    pub fn name(&self) -> Option<&str> {
        self.reference.name()
    }

    pub fn definition(&self) -> Option<&str> {
        self.definition.as_deref()
    }

    pub fn is_metadata_tag(&self) -> bool {
        self.is_metadata_tag
    }

    pub fn inverse(&self) -> Option<&Reference> {
        self.inverse.as_ref()
    }

    pub fn is_transitive(&self) -> bool {
        self.is_transitive
    }

    pub fn curie(&self) -> String {
        self.reference.curie()
    }
}

impl PartialEq for TypeDef {
    fn eq(&self, other: &Self) -> bool {
        self.reference == other.reference
    }
}

impl Eq for TypeDef {}

impl Hash for TypeDef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.reference.hash(state);
    }
}

impl std::fmt::Display for TypeDef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.reference)
    }
}

fn relation(prefix: &'static str, identifier: &'static str, name: &'static str) -> TypeDef {
    TypeDef::new(Reference::from_static(prefix, identifier, name))
}

// ============================================================================
// Standard relations
// ============================================================================

pub static IS_A: LazyLock<TypeDef> =
    LazyLock::new(|| relation("rdfs", "subClassOf", "is_a").transitive());

pub static PART_OF: LazyLock<TypeDef> = LazyLock::new(|| {
    relation("BFO", "0000050", "part of")
        .with_inverse(Reference::from_static("BFO", "0000051", "has part"))
        .transitive()
});

pub static HAS_PART: LazyLock<TypeDef> = LazyLock::new(|| {
    relation("BFO", "0000051", "has part")
        .with_inverse(Reference::from_static("BFO", "0000050", "part of"))
        .transitive()
});

pub static HAS_PARTICIPANT: LazyLock<TypeDef> = LazyLock::new(|| {
    relation("RO", "0000057", "has participant")
        .with_inverse(Reference::from_static("RO", "0000056", "participates in"))
});

pub static PARTICIPATES_IN: LazyLock<TypeDef> = LazyLock::new(|| {
    relation("RO", "0000056", "participates in")
        .with_inverse(Reference::from_static("RO", "0000057", "has participant"))
});

pub static ENABLES: LazyLock<TypeDef> = LazyLock::new(|| {
    relation("RO", "0002327", "enables")
        .with_inverse(Reference::from_static("RO", "0002333", "enabled by"))
});

pub static ENABLED_BY: LazyLock<TypeDef> = LazyLock::new(|| {
    relation("RO", "0002333", "enabled by")
        .with_inverse(Reference::from_static("RO", "0002327", "enables"))
});

pub static HAS_MEMBER: LazyLock<TypeDef> = LazyLock::new(|| {
    relation("RO", "0002351", "has member")
        .with_inverse(Reference::from_static("RO", "0002350", "member of"))
});

pub static MEMBER_OF: LazyLock<TypeDef> = LazyLock::new(|| {
    relation("RO", "0002350", "member of")
        .with_inverse(Reference::from_static("RO", "0002351", "has member"))
});

pub static FROM_SPECIES: LazyLock<TypeDef> =
    LazyLock::new(|| relation("RO", "0002162", "in taxon"));

pub static HAS_TAXONOMY_RANK: LazyLock<TypeDef> =
    LazyLock::new(|| relation("TAXRANK", "1000000", "has rank"));

pub static TERM_REPLACED_BY: LazyLock<TypeDef> =
    LazyLock::new(|| relation("IAO", "0100001", "term replaced by"));

/// Qualifier for xrefs asserting semantic equivalence
pub static EXACT_MATCH: LazyLock<TypeDef> =
    LazyLock::new(|| relation("skos", "exactMatch", "exact match"));

/// Default qualifier for plain database cross-references
pub static HAS_DBXREF: LazyLock<TypeDef> =
    LazyLock::new(|| relation("oboInOwl", "hasDbXref", "database cross-reference"));

/// Typedefs every writer can resolve without them being declared
pub fn builtin_typedefs() -> [&'static TypeDef; 6] {
    [
        &*IS_A,
        &*FROM_SPECIES,
        &*TERM_REPLACED_BY,
        &*EXACT_MATCH,
        &*HAS_DBXREF,
        &*HAS_TAXONOMY_RANK,
    ]
}
