//! Error types for the OBO term model

use thiserror::Error;

/// Result type alias for term model operations
pub type Result<T> = std::result::Result<T, OboError>;

/// Main error type for the term model, registry and writer
#[derive(Error, Debug)]
pub enum OboError {
    #[error("Invalid reference: prefix {prefix:?}, identifier {identifier:?}")]
    InvalidReference { prefix: String, identifier: String },

    #[error("Invalid typedef {typedef}: expected a {expected} typedef")]
    InvalidTypeDef {
        typedef: String,
        expected: TypeDefKind,
    },

    #[error("Unresolved typedef {typedef} used by term {term}")]
    UnresolvedTypeDef { term: String, typedef: String },

    #[error("Unresolved synonym type {synonym_type} used by term {term}")]
    UnresolvedSynonymType { term: String, synonym_type: String },

    #[error("Invalid synonym: {0}")]
    InvalidSynonym(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Which side of the object/literal split a typedef was expected to be on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeDefKind {
    /// A relation between two entities
    Relation,
    /// A metadata tag annotating a literal value
    MetadataTag,
}

impl std::fmt::Display for TypeDefKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TypeDefKind::Relation => write!(f, "relation"),
            TypeDefKind::MetadataTag => write!(f, "metadata tag"),
        }
    }
}
