//! The interface every source extractor implements

use crate::config::IngestConfig;
use crate::error::Result;
use chrono::Utc;
use obo_common::{Obo, Reference, SynonymTypeDef, Term, TypeDef};
use std::path::PathBuf;
use tracing::info;

/// Name written to the `auto-generated-by` header
pub const GENERATOR: &str = concat!("obo-ingest ", env!("CARGO_PKG_VERSION"));

/// A source that can be turned into an ontology
///
/// Implementors parse their input into terms; the provided [`TermSource::build`]
/// collects those terms together with the declared typedefs and synonym types
/// into a validated [`Obo`].
pub trait TermSource {
    /// Ontology prefix of the emitted terms (e.g. "msigdb")
    fn prefix(&self) -> &str;

    /// Human readable ontology name
    fn name(&self) -> &str;

    /// Version of the source data, if known
    fn data_version(&self) -> Option<&str> {
        None
    }

    /// Typedefs used by the emitted terms
    fn typedefs(&self) -> Result<Vec<TypeDef>> {
        Ok(Vec::new())
    }

    /// Synonym types used by the emitted terms
    fn synonym_typedefs(&self) -> Result<Vec<SynonymTypeDef>> {
        Ok(Vec::new())
    }

    /// Foreign prefixes and their URI prefixes
    fn idspaces(&self) -> Vec<(&'static str, &'static str)> {
        Vec::new()
    }

    /// Top-level terms of the hierarchy
    fn root_terms(&self) -> Vec<Reference> {
        Vec::new()
    }

    /// Parse the source into terms
    fn iter_terms(&self) -> Result<Vec<Term>>;

    /// Parse the source and assemble a validated ontology
    fn build(&self) -> Result<Obo> {
        let mut obo = Obo::new(self.prefix())
            .with_name(self.name())
            .with_data_version(self.data_version().map(str::to_string))
            .with_auto_generated_by(GENERATOR)
            .with_date(Utc::now());
        for typedef in self.typedefs()? {
            obo.add_typedef(typedef);
        }
        for synonym_typedef in self.synonym_typedefs()? {
            obo.add_synonym_typedef(synonym_typedef);
        }
        for (prefix, uri_prefix) in self.idspaces() {
            obo.add_idspace(prefix, uri_prefix);
        }
        for root in self.root_terms() {
            obo.add_root_term(root);
        }

        obo.extend_terms(self.iter_terms()?);
        obo.validate()?;

        info!(
            source = self.prefix(),
            version = self.data_version().unwrap_or("unknown"),
            terms = obo.len(),
            "Built ontology"
        );
        Ok(obo)
    }

    /// Build the ontology and write `{prefix}.obo` and `{prefix}.json` under
    /// the configured output directory
    fn export(&self, config: &IngestConfig) -> Result<(PathBuf, PathBuf)> {
        let obo = self.build()?;
        let obo_path = config.output_path(self.prefix(), "obo");
        let json_path = config.output_path(self.prefix(), "json");
        obo.write_obo_file(&obo_path)?;
        obo.write_json_file(&json_path)?;
        Ok((obo_path, json_path))
    }
}
