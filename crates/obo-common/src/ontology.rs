//! The ontology registry
//!
//! An [`Obo`] collects the terms emitted by one source together with the
//! typedefs and synonym types they use, plus the header metadata needed to
//! write an OBO document.

use crate::error::{OboError, Result};
use crate::reference::Reference;
use crate::synonym::{SynonymTypeDef, DEFAULT_SYNONYM_TYPE};
use crate::term::Term;
use crate::typedef::{builtin_typedefs, TypeDef};
use crate::writer;
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::Serialize;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::{debug, info, warn};

/// Terms plus the declarations needed to interpret them
#[derive(Debug, Clone)]
pub struct Obo {
    ontology: String,
    name: Option<String>,
    data_version: Option<String>,
    auto_generated_by: Option<String>,
    date: Option<DateTime<Utc>>,
    root_terms: Vec<Reference>,
    idspaces: IndexMap<String, String>,
    typedefs: IndexMap<Reference, TypeDef>,
    synonym_typedefs: IndexMap<Reference, SynonymTypeDef>,
    terms: IndexMap<Reference, Term>,
}

impl Obo {
    pub fn new(ontology: impl Into<String>) -> Self {
        Self {
            ontology: ontology.into(),
            name: None,
            data_version: None,
            auto_generated_by: None,
            date: None,
            root_terms: Vec::new(),
            idspaces: IndexMap::new(),
            typedefs: IndexMap::new(),
            synonym_typedefs: IndexMap::new(),
            terms: IndexMap::new(),
        }
    }

    // ------------------------------------------------------------------------
    // Header
    // ------------------------------------------------------------------------

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn with_data_version(mut self, version: Option<String>) -> Self {
        self.data_version = version;
        self
    }

    #[must_use]
    pub fn with_auto_generated_by(mut self, generator: impl Into<String>) -> Self {
        self.auto_generated_by = Some(generator.into());
        self
    }

    #[must_use]
    pub fn with_date(mut self, date: DateTime<Utc>) -> Self {
        self.date = Some(date);
        self
    }

    pub fn ontology(&self) -> &str {
        &self.ontology
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn data_version(&self) -> Option<&str> {
        self.data_version.as_deref()
    }

    pub fn auto_generated_by(&self) -> Option<&str> {
        self.auto_generated_by.as_deref()
    }

    pub fn date(&self) -> Option<&DateTime<Utc>> {
        self.date.as_ref()
    }

    // ------------------------------------------------------------------------
    // Declarations
    // ------------------------------------------------------------------------

    /// Declare a typedef; redeclaring the same reference replaces it
    pub fn add_typedef(&mut self, typedef: TypeDef) {
        self.typedefs.insert(typedef.reference().clone(), typedef);
    }

    pub fn add_synonym_typedef(&mut self, synonym_typedef: SynonymTypeDef) {
        self.synonym_typedefs
            .insert(synonym_typedef.reference().clone(), synonym_typedef);
    }

    /// Map a foreign prefix to its URI prefix for the header
    pub fn add_idspace(&mut self, prefix: impl Into<String>, uri_prefix: impl Into<String>) {
        self.idspaces.insert(prefix.into(), uri_prefix.into());
    }

    pub fn add_root_term(&mut self, root: Reference) {
        if !self.root_terms.contains(&root) {
            self.root_terms.push(root);
        }
    }

    pub fn typedefs(&self) -> impl Iterator<Item = &TypeDef> {
        self.typedefs.values()
    }

    pub fn synonym_typedefs(&self) -> impl Iterator<Item = &SynonymTypeDef> {
        self.synonym_typedefs.values()
    }

    pub fn idspaces(&self) -> impl Iterator<Item = (&str, &str)> {
        self.idspaces
            .iter()
            .map(|(prefix, uri)| (prefix.as_str(), uri.as_str()))
    }

    pub fn root_terms(&self) -> &[Reference] {
        &self.root_terms
    }

    /// Look up a typedef among the declared ones and the builtins
    pub fn resolve_typedef(&self, reference: &Reference) -> Option<&TypeDef> {
        self.typedefs.get(reference).or_else(|| {
            builtin_typedefs()
                .into_iter()
                .find(|typedef| typedef.reference() == reference)
        })
    }

    pub fn resolve_synonym_typedef(&self, reference: &Reference) -> Option<&SynonymTypeDef> {
        if reference == DEFAULT_SYNONYM_TYPE.reference() {
            return Some(&*DEFAULT_SYNONYM_TYPE);
        }
        self.synonym_typedefs.get(reference)
    }

    // ------------------------------------------------------------------------
    // Terms
    // ------------------------------------------------------------------------

    /// Add a term; a term with the same reference is replaced
    pub fn insert_term(&mut self, term: Term) -> Option<Term> {
        let replaced = self.terms.insert(term.reference().clone(), term);
        if let Some(previous) = &replaced {
            warn!(
                ontology = %self.ontology,
                term = %previous.curie(),
                "Duplicate term identifier, keeping the last one"
            );
        }
        replaced
    }

    pub fn extend_terms(&mut self, terms: impl IntoIterator<Item = Term>) {
        for term in terms {
            self.insert_term(term);
        }
    }

    pub fn get_term(&self, reference: &Reference) -> Option<&Term> {
        self.terms.get(reference)
    }

    pub fn terms(&self) -> impl ExactSizeIterator<Item = &Term> {
        self.terms.values()
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    // ------------------------------------------------------------------------
    // Validation
    // ------------------------------------------------------------------------

    /// Check that every typedef, xref qualifier and synonym type used by a
    /// term is declared or built in
    pub fn validate(&self) -> Result<()> {
        for term in self.terms.values() {
            for typedef in term.used_typedefs() {
                if self.resolve_typedef(typedef.reference()).is_none() {
                    return Err(OboError::UnresolvedTypeDef {
                        term: term.curie(),
                        typedef: typedef.curie(),
                    });
                }
            }
            for xref in term.xrefs() {
                if self.resolve_typedef(&xref.qualifier).is_none() {
                    return Err(OboError::UnresolvedTypeDef {
                        term: term.curie(),
                        typedef: xref.qualifier.curie(),
                    });
                }
            }
            for synonym in term.synonyms() {
                if self.resolve_synonym_typedef(synonym.synonym_type()).is_none() {
                    return Err(OboError::UnresolvedSynonymType {
                        term: term.curie(),
                        synonym_type: synonym.synonym_type().curie(),
                    });
                }
            }
        }
        debug!(ontology = %self.ontology, terms = self.terms.len(), "Validated ontology");
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Mappings
    // ------------------------------------------------------------------------

    /// Local identifier to name, for terms of this ontology that have a name
    pub fn id_name_mapping(&self) -> HashMap<String, String> {
        self.own_terms()
            .filter_map(|term| {
                term.name()
                    .map(|name| (term.identifier().to_string(), name.to_string()))
            })
            .collect()
    }

    /// Local identifier to definition
    pub fn id_definition_mapping(&self) -> HashMap<String, String> {
        self.own_terms()
            .filter_map(|term| {
                term.definition()
                    .map(|definition| (term.identifier().to_string(), definition.to_string()))
            })
            .collect()
    }

    /// Local identifier to parent CURIEs
    pub fn id_parents_mapping(&self) -> HashMap<String, Vec<String>> {
        self.own_terms()
            .filter(|term| term.parents().next().is_some())
            .map(|term| {
                (
                    term.identifier().to_string(),
                    term.parents().map(Reference::curie).collect(),
                )
            })
            .collect()
    }

    /// Local identifier to synonym names
    pub fn id_synonyms_mapping(&self) -> HashMap<String, Vec<String>> {
        self.own_terms()
            .filter(|term| !term.synonyms().is_empty())
            .map(|term| {
                (
                    term.identifier().to_string(),
                    term.synonyms()
                        .iter()
                        .map(|synonym| synonym.name().to_string())
                        .collect(),
                )
            })
            .collect()
    }

    /// Local identifier to the identifiers of its xrefs into `prefix`
    pub fn xrefs_mapping(&self, prefix: &str) -> HashMap<String, Vec<String>> {
        self.own_terms()
            .filter_map(|term| {
                let targets: Vec<String> = term
                    .xrefs()
                    .filter(|xref| xref.target.prefix() == prefix)
                    .map(|xref| xref.target.identifier().to_string())
                    .collect();
                (!targets.is_empty()).then(|| (term.identifier().to_string(), targets))
            })
            .collect()
    }

    /// Local identifier to the targets of one relation
    pub fn relation_mapping(&self, typedef: &TypeDef) -> HashMap<String, Vec<String>> {
        self.own_terms()
            .filter_map(|term| {
                let targets = term.objects(typedef);
                (!targets.is_empty()).then(|| {
                    (
                        term.identifier().to_string(),
                        targets.into_iter().map(Reference::curie).collect(),
                    )
                })
            })
            .collect()
    }

    /// Local identifiers of obsolete terms
    pub fn obsolete_ids(&self) -> Vec<String> {
        self.own_terms()
            .filter(|term| term.is_obsolete())
            .map(|term| term.identifier().to_string())
            .collect()
    }

    fn own_terms(&self) -> impl Iterator<Item = &Term> {
        self.terms
            .values()
            .filter(|term| term.prefix() == self.ontology)
    }

    // ------------------------------------------------------------------------
    // Output
    // ------------------------------------------------------------------------

    /// Write OBO 1.4 text; fails before writing anything if validation fails
    pub fn write_obo<W: Write>(&self, out: &mut W) -> Result<()> {
        self.validate()?;
        writer::write_document(self, out)
    }

    /// Validate, then write OBO text to `path`; nothing is created on failure
    pub fn write_obo_file(&self, path: &Path) -> Result<()> {
        self.validate()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut out = BufWriter::new(File::create(path)?);
        writer::write_document(self, &mut out)?;
        out.flush()?;
        info!(
            ontology = %self.ontology,
            terms = self.terms.len(),
            path = %path.display(),
            "Wrote OBO file"
        );
        Ok(())
    }

    /// The registry as a JSON value
    pub fn to_json(&self) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(self.document())?)
    }

    pub fn write_json<W: Write>(&self, out: W) -> Result<()> {
        serde_json::to_writer_pretty(out, &self.document())?;
        Ok(())
    }

    pub fn write_json_file(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut out = BufWriter::new(File::create(path)?);
        self.write_json(&mut out)?;
        out.flush()?;
        info!(ontology = %self.ontology, path = %path.display(), "Wrote JSON file");
        Ok(())
    }

    fn document(&self) -> OboDocument<'_> {
        OboDocument {
            ontology: &self.ontology,
            name: self.name.as_deref(),
            data_version: self.data_version.as_deref(),
            date: self.date.as_ref(),
            root_terms: &self.root_terms,
            idspaces: &self.idspaces,
            typedefs: self.typedefs.values().collect(),
            synonym_typedefs: self.synonym_typedefs.values().collect(),
            terms: self.terms.values().collect(),
        }
    }
}

/// Serialized shape of an [`Obo`]; reference-keyed maps become lists
#[derive(Serialize)]
struct OboDocument<'a> {
    ontology: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    data_version: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    date: Option<&'a DateTime<Utc>>,
    root_terms: &'a [Reference],
    idspaces: &'a IndexMap<String, String>,
    typedefs: Vec<&'a TypeDef>,
    synonym_typedefs: Vec<&'a SynonymTypeDef>,
    terms: Vec<&'a Term>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::synonym::Synonym;
    use crate::typedef::{HAS_PARTICIPANT, TERM_REPLACED_BY};

    fn term(identifier: &str, name: &str) -> Term {
        Term::from_triple("hgnc.genefamily", identifier, Some(name)).unwrap()
    }

    #[test]
    fn test_insert_term_last_wins() {
        let mut obo = Obo::new("hgnc.genefamily");
        assert!(obo.insert_term(term("1", "first")).is_none());
        let replaced = obo.insert_term(term("1", "second")).unwrap();
        assert_eq!(replaced.name(), Some("first"));
        assert_eq!(obo.len(), 1);
        assert_eq!(obo.id_name_mapping()["1"], "second");
    }

    #[test]
    fn test_validate_requires_declared_typedefs() {
        let mut obo = Obo::new("msigdb");
        let mut gene_set = Term::from_triple("msigdb", "M1", None).unwrap();
        gene_set
            .annotate_object(&HAS_PARTICIPANT, Reference::new("ncbigene", "1").unwrap())
            .unwrap();
        obo.insert_term(gene_set);

        let err = obo.validate().unwrap_err();
        assert!(matches!(err, OboError::UnresolvedTypeDef { .. }));
        let mut buffer = Vec::new();
        assert!(obo.write_obo(&mut buffer).is_err());
        assert!(buffer.is_empty());

        obo.add_typedef(HAS_PARTICIPANT.clone());
        obo.validate().unwrap();
    }

    #[test]
    fn test_builtin_typedefs_always_resolve() {
        let mut obo = Obo::new("eccode");
        let mut entry = Term::from_triple("eccode", "1.1.1.5", None).unwrap();
        entry
            .append_replaced_by(Reference::new("eccode", "1.1.1.303").unwrap())
            .unwrap();
        entry.set_species("9606").unwrap();
        entry.append_exact_match(Reference::new("go", "0005829").unwrap());
        entry.append_xref(Reference::new("kegg", "x").unwrap());
        obo.insert_term(entry);
        obo.validate().unwrap();
        assert!(obo.resolve_typedef(TERM_REPLACED_BY.reference()).is_some());
    }

    #[test]
    fn test_validate_synonym_types() {
        let symbol = SynonymTypeDef::default_for("hgnc.genefamily", "symbol", Some("symbol"))
            .unwrap();
        let mut obo = Obo::new("hgnc.genefamily");
        let mut family = term("3", "ABC transporters");
        family.append_synonym(Synonym::new("ABC").unwrap().with_type(&symbol));
        family.append_synonym(Synonym::new("ABC transporter family").unwrap());
        obo.insert_term(family);

        assert!(matches!(
            obo.validate(),
            Err(OboError::UnresolvedSynonymType { .. })
        ));
        obo.add_synonym_typedef(symbol);
        obo.validate().unwrap();
    }

    #[test]
    fn test_mappings_only_cover_own_terms() {
        let mut obo = Obo::new("hgnc.genefamily");
        let mut child = term("2", "child");
        child.append_parent(Reference::new("hgnc.genefamily", "1").unwrap());
        child.append_xref(Reference::new("go", "0005215").unwrap());
        obo.insert_term(term("1", "parent"));
        obo.insert_term(child);
        obo.insert_term(Term::from_triple("other", "9", Some("foreign")).unwrap());

        assert_eq!(obo.id_name_mapping().len(), 2);
        assert_eq!(obo.id_parents_mapping()["2"], vec!["hgnc.genefamily:1"]);
        assert_eq!(obo.xrefs_mapping("go")["2"], vec!["0005215"]);
        assert!(obo.obsolete_ids().is_empty());
    }

    #[test]
    fn test_definition_synonym_and_obsolete_mappings() {
        let mut obo = Obo::new("eccode");
        let mut retired = Term::from_triple("eccode", "1.1.1.5", None)
            .unwrap()
            .with_definition("Transferred entry");
        retired.set_obsolete(true);
        retired.append_synonym(Synonym::new("old name").unwrap());
        obo.insert_term(retired);
        obo.insert_term(Term::from_triple("eccode", "1.1.1.1", Some("ADH")).unwrap());

        assert_eq!(obo.id_definition_mapping()["1.1.1.5"], "Transferred entry");
        assert_eq!(obo.id_synonyms_mapping()["1.1.1.5"], vec!["old name"]);
        assert!(!obo.id_synonyms_mapping().contains_key("1.1.1.1"));
        assert_eq!(obo.obsolete_ids(), vec!["1.1.1.5"]);
    }

    #[test]
    fn test_relation_mapping() {
        let mut obo = Obo::new("msigdb");
        let mut gene_set = Term::from_triple("msigdb", "M1", None).unwrap();
        gene_set
            .annotate_object(&HAS_PARTICIPANT, Reference::new("ncbigene", "7").unwrap())
            .unwrap();
        obo.insert_term(gene_set);
        obo.insert_term(Term::from_triple("msigdb", "M2", None).unwrap());

        let mapping = obo.relation_mapping(&HAS_PARTICIPANT);
        assert_eq!(mapping.len(), 1);
        assert_eq!(mapping["M1"], vec!["ncbigene:7"]);
    }

    #[test]
    fn test_json_document() {
        let mut obo = Obo::new("bigg.compartment").with_name("BiGG compartments");
        obo.insert_term(Term::from_triple("bigg.compartment", "c", Some("cytosol")).unwrap());
        let value = obo.to_json().unwrap();
        assert_eq!(value["ontology"], "bigg.compartment");
        assert_eq!(value["terms"][0]["reference"]["identifier"], "c");
        assert_eq!(value["terms"][0]["reference"]["name"], "cytosol");
    }
}
