//! The Term aggregate
//!
//! A term is created by an extractor with at least a [`Reference`] and then
//! mutated through its append and annotate operations. Nothing is ever
//! removed; obsolescence is a flag.
//!
//! Collections follow two different disciplines:
//!
//! - sets (insertion-ordered, deduplicated): parents, alt ids, xrefs and
//!   object annotations
//! - sequences (duplicates kept): synonyms, provenance and literal annotations

use crate::error::{OboError, Result, TypeDefKind};
use crate::reference::Reference;
use crate::synonym::Synonym;
use crate::typedef::{TypeDef, EXACT_MATCH, HAS_DBXREF, TERM_REPLACED_BY};
use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

/// Prefix used for species tags
pub const NCBITAXON_PREFIX: &str = "NCBITaxon";

/// A cross-reference qualified by the relation it asserts
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Xref {
    pub target: Reference,
    pub qualifier: Reference,
}

impl Xref {
    /// Whether this xref asserts semantic equivalence
    pub fn is_exact_match(&self) -> bool {
        &self.qualifier == EXACT_MATCH.reference()
    }
}

/// A single entity within an ontology
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Term {
    reference: Reference,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    definition: Option<String>,
    #[serde(default)]
    is_obsolete: bool,
    #[serde(default)]
    parents: IndexSet<Reference>,
    #[serde(default)]
    alt_ids: IndexSet<Reference>,
    #[serde(default)]
    xrefs: IndexSet<Xref>,
    #[serde(default)]
    synonyms: Vec<Synonym>,
    #[serde(default)]
    provenance: Vec<Reference>,
    #[serde(default, with = "typedef_keyed")]
    relationships: IndexMap<TypeDef, IndexSet<Reference>>,
    #[serde(default, with = "typedef_keyed")]
    properties: IndexMap<TypeDef, Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    species: Option<Reference>,
}

impl Term {
    pub fn new(reference: Reference) -> Self {
        Self {
            reference,
            definition: None,
            is_obsolete: false,
            parents: IndexSet::new(),
            alt_ids: IndexSet::new(),
            xrefs: IndexSet::new(),
            synonyms: Vec::new(),
            provenance: Vec::new(),
            relationships: IndexMap::new(),
            properties: IndexMap::new(),
            species: None,
        }
    }

    /// Build a term from a freshly built reference
    pub fn from_triple(prefix: &str, identifier: &str, name: Option<&str>) -> Result<Self> {
        let reference =
            Reference::new(prefix, identifier)?.with_optional_name(name.map(str::to_string));
        Ok(Self::new(reference))
    }

    // ------------------------------------------------------------------------
    // Builders
    // ------------------------------------------------------------------------

    #[must_use]
    pub fn with_definition(mut self, definition: impl Into<String>) -> Self {
        self.definition = Some(definition.into());
        self
    }

    #[must_use]
    pub fn with_optional_definition(mut self, definition: Option<String>) -> Self {
        self.definition = definition;
        self
    }

    #[must_use]
    pub fn with_obsolete(mut self, is_obsolete: bool) -> Self {
        self.is_obsolete = is_obsolete;
        self
    }

    #[must_use]
    pub fn with_provenance(mut self, provenance: Vec<Reference>) -> Self {
        self.provenance = provenance;
        self
    }

    #[must_use]
    pub fn with_synonyms(mut self, synonyms: Vec<Synonym>) -> Self {
        self.synonyms = synonyms;
        self
    }

    #[must_use]
    pub fn with_parents(mut self, parents: impl IntoIterator<Item = Reference>) -> Self {
        for parent in parents {
            self.append_parent(parent);
        }
        self
    }

    // ------------------------------------------------------------------------
    // Mutation
    // ------------------------------------------------------------------------

    /// Add a broader term; returns false if it was already a parent
    pub fn append_parent(&mut self, parent: Reference) -> bool {
        self.parents.insert(parent)
    }

    /// Add an alternate identifier
    ///
    /// No check is made against the term's own identifier; extractors filter
    /// those out before calling.
    pub fn append_alt(&mut self, alt_id: Reference) -> bool {
        self.alt_ids.insert(alt_id)
    }

    /// Add a plain database cross-reference
    pub fn append_xref(&mut self, xref: Reference) -> bool {
        self.append_xref_with(xref, &HAS_DBXREF)
    }

    /// Add a cross-reference qualified by the given relation
    pub fn append_xref_with(&mut self, xref: Reference, qualifier: &TypeDef) -> bool {
        self.xrefs.insert(Xref {
            target: xref,
            qualifier: qualifier.reference().clone(),
        })
    }

    /// Add a cross-reference asserting semantic equivalence
    pub fn append_exact_match(&mut self, xref: Reference) -> bool {
        self.append_xref_with(xref, &EXACT_MATCH)
    }

    pub fn append_synonym(&mut self, synonym: Synonym) {
        self.synonyms.push(synonym);
    }

    pub fn append_provenance(&mut self, reference: Reference) {
        self.provenance.push(reference);
    }

    /// Record an edge to another entity; the typedef must be a relation
    ///
    /// Recording the same (typedef, target) pair twice keeps a single edge.
    pub fn annotate_object(&mut self, typedef: &TypeDef, target: Reference) -> Result<bool> {
        if typedef.is_metadata_tag() {
            return Err(OboError::InvalidTypeDef {
                typedef: typedef.curie(),
                expected: TypeDefKind::Relation,
            });
        }
        Ok(self
            .relationships
            .entry(typedef.clone())
            .or_default()
            .insert(target))
    }

    /// Append a literal value; the typedef must be a metadata tag
    ///
    /// Repeated values are kept.
    pub fn annotate_literal(&mut self, typedef: &TypeDef, value: impl Into<String>) -> Result<()> {
        if !typedef.is_metadata_tag() {
            return Err(OboError::InvalidTypeDef {
                typedef: typedef.curie(),
                expected: TypeDefKind::MetadataTag,
            });
        }
        self.properties
            .entry(typedef.clone())
            .or_default()
            .push(value.into());
        Ok(())
    }

    /// Mark this term as replaced by another one
    pub fn append_replaced_by(&mut self, replacement: Reference) -> Result<bool> {
        self.annotate_object(&TERM_REPLACED_BY, replacement)
    }

    /// Set the NCBI Taxonomy species tag, replacing any previous one
    pub fn set_species(&mut self, taxonomy_id: &str) -> Result<()> {
        self.species = Some(Reference::new(NCBITAXON_PREFIX, taxonomy_id)?);
        Ok(())
    }

    /// Set the species tag with a display name
    pub fn set_species_named(&mut self, taxonomy_id: &str, name: &str) -> Result<()> {
        self.species = Some(Reference::new(NCBITAXON_PREFIX, taxonomy_id)?.with_name(name));
        Ok(())
    }

    pub fn set_obsolete(&mut self, is_obsolete: bool) {
        self.is_obsolete = is_obsolete;
    }

    // ------------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------------

    pub fn reference(&self) -> &Reference {
        &self.reference
    }

    pub fn prefix(&self) -> &str {
        self.reference.prefix()
    }

    pub fn identifier(&self) -> &str {
        self.reference.identifier()
    }

    pub fn name(&self) -> Option<&str> {
        self.reference.name()
    }

    pub fn curie(&self) -> String {
        self.reference.curie()
    }

    pub fn definition(&self) -> Option<&str> {
        self.definition.as_deref()
    }

    pub fn is_obsolete(&self) -> bool {
        self.is_obsolete
    }

    pub fn parents(&self) -> impl ExactSizeIterator<Item = &Reference> {
        self.parents.iter()
    }

    pub fn alt_ids(&self) -> impl ExactSizeIterator<Item = &Reference> {
        self.alt_ids.iter()
    }

    pub fn xrefs(&self) -> impl ExactSizeIterator<Item = &Xref> {
        self.xrefs.iter()
    }

    /// Targets of xrefs qualified as exact matches
    pub fn exact_matches(&self) -> impl Iterator<Item = &Reference> {
        self.xrefs
            .iter()
            .filter(|xref| xref.is_exact_match())
            .map(|xref| &xref.target)
    }

    pub fn synonyms(&self) -> &[Synonym] {
        &self.synonyms
    }

    pub fn provenance(&self) -> &[Reference] {
        &self.provenance
    }

    /// Object annotations grouped by typedef, in insertion order
    pub fn relationships(&self) -> impl Iterator<Item = (&TypeDef, &IndexSet<Reference>)> {
        self.relationships.iter()
    }

    /// Targets recorded for one typedef
    pub fn objects(&self, typedef: &TypeDef) -> Vec<&Reference> {
        self.relationships
            .get(typedef)
            .map(|targets| targets.iter().collect())
            .unwrap_or_default()
    }

    /// Literal annotations grouped by typedef, in insertion order
    pub fn properties(&self) -> impl Iterator<Item = (&TypeDef, &Vec<String>)> {
        self.properties.iter()
    }

    /// Literal values recorded for one typedef
    pub fn literals(&self, typedef: &TypeDef) -> &[String] {
        self.properties
            .get(typedef)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn species(&self) -> Option<&Reference> {
        self.species.as_ref()
    }

    /// Every typedef this term uses, for registry resolution
    pub fn used_typedefs(&self) -> impl Iterator<Item = &TypeDef> {
        self.relationships.keys().chain(self.properties.keys())
    }
}

/// Serialize typedef-keyed maps as lists of `{typedef, values}` entries, since
/// JSON object keys must be strings
mod typedef_keyed {
    use crate::typedef::TypeDef;
    use indexmap::IndexMap;
    use serde::de::DeserializeOwned;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    #[derive(Serialize, Deserialize)]
    struct Entry<V> {
        typedef: TypeDef,
        values: V,
    }

    #[derive(Serialize)]
    struct EntryRef<'a, V> {
        typedef: &'a TypeDef,
        values: &'a V,
    }

    pub fn serialize<S, V>(map: &IndexMap<TypeDef, V>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
        V: Serialize,
    {
        serializer.collect_seq(
            map.iter()
                .map(|(typedef, values)| EntryRef { typedef, values }),
        )
    }

    pub fn deserialize<'de, D, V>(deserializer: D) -> Result<IndexMap<TypeDef, V>, D::Error>
    where
        D: Deserializer<'de>,
        V: DeserializeOwned,
    {
        let entries: Vec<Entry<V>> = Vec::deserialize(deserializer)?;
        Ok(entries
            .into_iter()
            .map(|entry| (entry.typedef, entry.values))
            .collect())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::typedef::{HAS_PARTICIPANT, PARTICIPATES_IN};

    fn metadata_tag() -> TypeDef {
        TypeDef::default_for("msigdb", "contributor", Some("contributor"))
            .unwrap()
            .as_metadata_tag()
    }

    #[test]
    fn test_from_triple() {
        let term = Term::from_triple("bigg.reaction", "R1", Some("Reaction 1")).unwrap();
        assert_eq!(term.reference().prefix(), "bigg.reaction");
        assert_eq!(term.reference().identifier(), "R1");
        assert_eq!(term.reference().name(), Some("Reaction 1"));
        assert!(Term::from_triple("", "R1", None).is_err());
    }

    #[test]
    fn test_append_parent_idempotent() {
        let mut term = Term::from_triple("hgnc.genefamily", "2", None).unwrap();
        assert!(term.append_parent(Reference::new("hgnc.genefamily", "1").unwrap()));
        assert!(!term.append_parent(
            Reference::new("hgnc.genefamily", "1")
                .unwrap()
                .with_name("other label")
        ));
        assert!(term.append_parent(Reference::new("hgnc.genefamily", "3").unwrap()));
        let parents: Vec<String> = term.parents().map(Reference::curie).collect();
        assert_eq!(parents, vec!["hgnc.genefamily:1", "hgnc.genefamily:3"]);
    }

    #[test]
    fn test_append_alt_set_semantics() {
        let mut term = Term::from_triple("bigg.reaction", "R1", None).unwrap();
        term.append_alt(Reference::new("bigg.reaction", "R1_old").unwrap());
        term.append_alt(Reference::new("bigg.reaction", "R1_old").unwrap());
        assert_eq!(term.alt_ids().len(), 1);
    }

    #[test]
    fn test_exact_match_distinct_from_xref() {
        let cytosol = Reference::new("go", "0005829").unwrap().with_name("cytosol");
        let mut term = Term::from_triple("bigg.compartment", "c", Some("cytosol")).unwrap();
        assert!(term.append_exact_match(cytosol.clone()));
        assert!(!term.append_exact_match(cytosol.clone()));
        // same target under a different qualifier is a different edge
        assert!(term.append_xref(cytosol.clone()));

        assert_eq!(term.xrefs().len(), 2);
        let exact: Vec<&Reference> = term.exact_matches().collect();
        assert_eq!(exact, vec![&cytosol]);
    }

    #[test]
    fn test_object_annotations_deduplicate() {
        let mut term = Term::from_triple("msigdb", "M1", None).unwrap();
        let gene = Reference::new("ncbigene", "1234").unwrap();
        assert!(term.annotate_object(&HAS_PARTICIPANT, gene.clone()).unwrap());
        assert!(!term.annotate_object(&HAS_PARTICIPANT, gene.clone()).unwrap());
        term.annotate_object(&HAS_PARTICIPANT, Reference::new("ncbigene", "5678").unwrap())
            .unwrap();
        assert_eq!(term.objects(&HAS_PARTICIPANT).len(), 2);
        assert!(term.objects(&PARTICIPATES_IN).is_empty());
    }

    #[test]
    fn test_literal_annotations_keep_duplicates() {
        let mut term = Term::from_triple("msigdb", "M1", None).unwrap();
        let contributor = metadata_tag();
        term.annotate_literal(&contributor, "Broad").unwrap();
        term.annotate_literal(&contributor, "Broad").unwrap();
        assert_eq!(term.literals(&contributor), ["Broad", "Broad"]);
    }

    #[test]
    fn test_typedef_direction_enforced() {
        let mut term = Term::from_triple("msigdb", "M1", None).unwrap();
        let err = term
            .annotate_object(&metadata_tag(), Reference::new("ncbigene", "1").unwrap())
            .unwrap_err();
        assert!(matches!(
            err,
            OboError::InvalidTypeDef {
                expected: TypeDefKind::Relation,
                ..
            }
        ));

        let err = term.annotate_literal(&HAS_PARTICIPANT, "x").unwrap_err();
        assert!(matches!(
            err,
            OboError::InvalidTypeDef {
                expected: TypeDefKind::MetadataTag,
                ..
            }
        ));
        assert_eq!(term.relationships().count(), 0);
        assert_eq!(term.properties().count(), 0);
    }

    #[test]
    fn test_set_species_last_wins() {
        let mut term = Term::from_triple("msigdb", "M1", None).unwrap();
        term.set_species("9606").unwrap();
        term.set_species("10090").unwrap();
        assert_eq!(term.species().unwrap().curie(), "NCBITaxon:10090");
        assert!(term.set_species("").is_err());
        // a failed call leaves the previous tag in place
        assert_eq!(term.species().unwrap().identifier(), "10090");
    }

    #[test]
    fn test_synonyms_and_provenance_are_sequences() {
        let mut term = Term::from_triple("depmap", "ACH-000001", None).unwrap();
        term.append_synonym(Synonym::new("NIHOVCAR3").unwrap());
        term.append_synonym(Synonym::new("NIHOVCAR3").unwrap());
        term.append_provenance(Reference::new("pubmed", "1").unwrap());
        term.append_provenance(Reference::new("pubmed", "1").unwrap());
        assert_eq!(term.synonyms().len(), 2);
        assert_eq!(term.provenance().len(), 2);
    }

    #[test]
    fn test_json_roundtrip_keeps_annotations() {
        let mut term = Term::from_triple("msigdb", "M1", Some("GENE_SET")).unwrap();
        term.annotate_object(&HAS_PARTICIPANT, Reference::new("ncbigene", "1").unwrap())
            .unwrap();
        term.annotate_literal(&metadata_tag(), "Broad").unwrap();

        let json = serde_json::to_string(&term).unwrap();
        let back: Term = serde_json::from_str(&json).unwrap();
        assert_eq!(back.objects(&HAS_PARTICIPANT).len(), 1);
        assert_eq!(back.literals(&metadata_tag()), ["Broad"]);
        assert_eq!(back.name(), Some("GENE_SET"));
    }
}
