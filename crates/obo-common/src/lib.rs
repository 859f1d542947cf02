//! OBO Common Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! The term model shared by every source extractor, and the rules for writing
//! it out as OBO.
//!
//! # Overview
//!
//! - **References**: [`Reference`] (prefix, identifier, optional name) and
//!   ontology-local default references
//! - **Relations**: [`TypeDef`] plus the standard relations in [`typedef`]
//! - **Synonyms**: [`Synonym`] and [`SynonymTypeDef`]
//! - **Terms**: the [`Term`] aggregate and its append/annotate operations
//! - **Registry**: [`Obo`], which validates typedef usage and writes OBO or JSON
//! - **Escaping**: [`obo_escape`] and [`obo_escape_slim`]
//!
//! # Example
//!
//! ```
//! use obo_common::typedef::HAS_PARTICIPANT;
//! use obo_common::{Obo, Reference, Term};
//!
//! fn build() -> obo_common::Result<String> {
//!     let mut gene_set = Term::from_triple("msigdb", "M1", Some("HALLMARK_APOPTOSIS"))?;
//!     gene_set.annotate_object(&HAS_PARTICIPANT, Reference::new("ncbigene", "355")?)?;
//!     gene_set.set_species("9606")?;
//!
//!     let mut obo = Obo::new("msigdb");
//!     obo.add_typedef(HAS_PARTICIPANT.clone());
//!     obo.insert_term(gene_set);
//!
//!     let mut out = Vec::new();
//!     obo.write_obo(&mut out)?;
//!     Ok(String::from_utf8_lossy(&out).into_owned())
//! }
//! # assert!(build().unwrap().contains("relationship: RO:0000057 ncbigene:355"));
//! ```

pub mod error;
pub mod escape;
pub mod logging;
pub mod ontology;
pub mod reference;
pub mod synonym;
pub mod term;
pub mod typedef;
pub mod writer;

// Re-export commonly used types
pub use error::{OboError, Result, TypeDefKind};
pub use escape::{obo_escape, obo_escape_slim};
pub use ontology::Obo;
pub use reference::{default_reference, Reference};
pub use synonym::{Synonym, SynonymScope, SynonymTypeDef};
pub use term::{Term, Xref};
pub use typedef::TypeDef;
