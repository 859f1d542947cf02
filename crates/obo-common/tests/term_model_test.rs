//! Behaviour of the term model as seen by extractors

use obo_common::typedef::{EXACT_MATCH, HAS_PARTICIPANT, PART_OF};
use obo_common::{
    default_reference, Obo, OboError, Reference, Synonym, SynonymTypeDef, Term, TypeDef,
};
use std::collections::hash_map::DefaultHasher;
use std::collections::HashSet;
use std::hash::{Hash, Hasher};

fn hash_of(reference: &Reference) -> u64 {
    let mut hasher = DefaultHasher::new();
    reference.hash(&mut hasher);
    hasher.finish()
}

fn render(obo: &Obo) -> String {
    let mut out = Vec::new();
    obo.write_obo(&mut out).expect("write should succeed");
    String::from_utf8(out).expect("output is UTF-8")
}

// ============================================================================
// References
// ============================================================================

#[test]
fn test_reference_identity_ignores_name() {
    let named = Reference::new("go", "0005829").unwrap().with_name("cytosol");
    let bare = Reference::new("go", "0005829").unwrap();

    assert_eq!(named, bare);
    assert_eq!(hash_of(&named), hash_of(&bare));

    let set: HashSet<Reference> = [named, bare].into_iter().collect();
    assert_eq!(set.len(), 1);
}

#[test]
fn test_reference_rejects_empty_parts() {
    assert!(matches!(
        Reference::new("", "1"),
        Err(OboError::InvalidReference { .. })
    ));
    assert!(matches!(
        Reference::new("go", "  "),
        Err(OboError::InvalidReference { .. })
    ));
    assert!("go:".parse::<Reference>().is_err());
    assert_eq!(
        "go:0005829".parse::<Reference>().unwrap(),
        Reference::new("go", "0005829").unwrap()
    );
}

#[test]
fn test_from_triple() {
    let term = Term::from_triple("bigg.reaction", "R1", Some("Reaction 1")).unwrap();
    assert_eq!(term.reference().prefix(), "bigg.reaction");
    assert_eq!(term.reference().identifier(), "R1");
    assert_eq!(term.reference().name(), Some("Reaction 1"));
}

// ============================================================================
// Set and sequence semantics
// ============================================================================

#[test]
fn test_parents_deduplicate() {
    let mut term = Term::from_triple("hgnc.genefamily", "3", None).unwrap();
    assert!(term.append_parent(Reference::new("hgnc.genefamily", "1").unwrap()));
    assert!(!term.append_parent(
        Reference::new("hgnc.genefamily", "1")
            .unwrap()
            .with_name("Root family")
    ));
    assert_eq!(term.parents().len(), 1);
}

#[test]
fn test_object_annotations_deduplicate_but_literals_repeat() {
    let tag = TypeDef::default_for("msigdb", "contributor", Some("contributor"))
        .unwrap()
        .as_metadata_tag();
    let gene = Reference::new("ncbigene", "355").unwrap();

    let mut term = Term::from_triple("msigdb", "M1", None).unwrap();
    term.annotate_object(&HAS_PARTICIPANT, gene.clone()).unwrap();
    term.annotate_object(&HAS_PARTICIPANT, gene).unwrap();
    term.annotate_literal(&tag, "Broad").unwrap();
    term.annotate_literal(&tag, "Broad").unwrap();

    assert_eq!(term.objects(&HAS_PARTICIPANT).len(), 1);
    assert_eq!(term.literals(&tag), ["Broad", "Broad"]);
}

#[test]
fn test_annotation_kind_is_checked() {
    let tag = TypeDef::default_for("msigdb", "exact_source", None)
        .unwrap()
        .as_metadata_tag();
    let mut term = Term::from_triple("msigdb", "M1", None).unwrap();

    let err = term
        .annotate_object(&tag, Reference::new("go", "0006915").unwrap())
        .unwrap_err();
    assert!(matches!(err, OboError::InvalidTypeDef { .. }));

    let err = term.annotate_literal(&PART_OF, "x").unwrap_err();
    assert!(matches!(err, OboError::InvalidTypeDef { .. }));

    // rejected calls leave no trace
    assert_eq!(term.relationships().count(), 0);
    assert_eq!(term.properties().count(), 0);
}

#[test]
fn test_exact_match_is_distinguishable_from_xref() {
    let cytosol = Reference::new("go", "0005829").unwrap().with_name("cytosol");
    let mut term = Term::from_triple("bigg.compartment", "c", Some("cytosol")).unwrap();
    term.append_exact_match(cytosol.clone());
    term.append_xref(Reference::new("metanetx.compartment", "MNXC3").unwrap());

    let exact: Vec<&Reference> = term.exact_matches().collect();
    assert_eq!(exact, vec![&cytosol]);
    let plain: Vec<_> = term.xrefs().filter(|xref| !xref.is_exact_match()).collect();
    assert_eq!(plain.len(), 1);
    assert_eq!(plain[0].target.prefix(), "metanetx.compartment");
    assert_eq!(&plain[0].qualifier, obo_common::typedef::HAS_DBXREF.reference());
    assert_eq!(&term.xrefs().next().unwrap().qualifier, EXACT_MATCH.reference());
}

#[test]
fn test_alt_ids_are_not_filtered() {
    // callers decide whether the primary id belongs in the alt ids
    let mut term = Term::from_triple("bigg.reaction", "ALCD2x", None).unwrap();
    assert!(term.append_alt(Reference::new("bigg.reaction", "ALCD2x").unwrap()));
    assert!(!term.append_alt(Reference::new("bigg.reaction", "ALCD2x").unwrap()));
    assert_eq!(term.alt_ids().len(), 1);
}

// ============================================================================
// Registry and writer
// ============================================================================

#[test]
fn test_undeclared_typedef_is_reported() {
    let mut term = Term::from_triple("msigdb", "M1", None).unwrap();
    term.annotate_object(&HAS_PARTICIPANT, Reference::new("ncbigene", "1").unwrap())
        .unwrap();
    let mut obo = Obo::new("msigdb");
    obo.insert_term(term);

    assert!(matches!(
        obo.validate(),
        Err(OboError::UnresolvedTypeDef { .. })
    ));
    let mut out = Vec::new();
    assert!(obo.write_obo(&mut out).is_err());
    assert!(out.is_empty());

    obo.add_typedef(HAS_PARTICIPANT.clone());
    assert!(obo.validate().is_ok());
}

#[test]
fn test_undeclared_synonym_type_is_reported() {
    let symbol = SynonymTypeDef::default_for("hgnc.genefamily", "symbol", Some("symbol")).unwrap();
    let mut term = Term::from_triple("hgnc.genefamily", "3", Some("ABC transporters")).unwrap();
    term.append_synonym(Synonym::new("ABC").unwrap().with_type(&symbol));

    let mut obo = Obo::new("hgnc.genefamily");
    obo.insert_term(term);
    assert!(matches!(
        obo.validate(),
        Err(OboError::UnresolvedSynonymType { .. })
    ));

    obo.add_synonym_typedef(symbol);
    let text = render(&obo);
    assert!(text.contains("synonymtypedef: symbol \"symbol\""));
    assert!(text.contains("synonym: \"ABC\" EXACT symbol []"));
}

#[test]
fn test_document_layout() {
    let tag = TypeDef::default_for("msigdb", "category_code", Some("category code"))
        .unwrap()
        .as_metadata_tag();

    let mut term = Term::from_triple("msigdb", "M1", Some("HALLMARK_APOPTOSIS"))
        .unwrap()
        .with_definition("Genes mediating programmed cell death (apoptosis).")
        .with_provenance(vec![Reference::new("pubmed", "26771021").unwrap()]);
    term.annotate_literal(&tag, "H").unwrap();
    term.set_species("9606").unwrap();

    let mut obo = Obo::new("msigdb")
        .with_name("Molecular Signatures Database")
        .with_data_version(Some("7.5.1".to_string()));
    obo.add_typedef(tag);
    obo.insert_term(term);

    let text = render(&obo);
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[0], "format-version: 1.4");
    assert_eq!(lines[1], "data-version: 7.5.1");
    assert!(lines.contains(&"ontology: msigdb"));
    assert!(lines.contains(&"id: msigdb:M1"));
    assert!(lines.contains(
        &"def: \"Genes mediating programmed cell death \\(apoptosis\\).\" [pubmed:26771021]"
    ));
    assert!(lines.contains(&"property_value: category_code \"H\" xsd:string"));
    assert!(lines.contains(&"relationship: RO:0002162 NCBITaxon:9606"));
    assert!(lines.contains(&"[Typedef]"));
    assert!(lines.contains(&"is_metadata_tag: true"));
}

#[test]
fn test_default_reference_scope() {
    let reference = default_reference("silva.taxon", "has_taxonomic_classification", None).unwrap();
    assert!(reference.is_default());
    assert_eq!(reference.default_scope(), Some("silva.taxon"));
    assert_eq!(reference.local_identifier(), "has_taxonomic_classification");

    let plain = Reference::new("RO", "0002162").unwrap();
    assert!(!plain.is_default());
    assert_eq!(plain.local_identifier(), "0002162");
}

#[test]
fn test_json_document_lists_terms() {
    let mut term = Term::from_triple("eccode", "1.1.1.1", Some("Alcohol dehydrogenase")).unwrap();
    term.append_parent(Reference::new("eccode", "1.1.1").unwrap());

    let mut obo = Obo::new("eccode");
    obo.insert_term(term);

    let value = obo.to_json().unwrap();
    assert_eq!(value["ontology"], "eccode");
    let terms = value["terms"].as_array().unwrap();
    assert_eq!(terms.len(), 1);
}

#[test]
fn test_files_are_written_under_missing_directories() {
    let dir = tempfile::tempdir().unwrap();
    let mut obo = Obo::new("ccle");
    obo.insert_term(Term::from_triple("ccle", "22RV1_PROSTATE", Some("22Rv1")).unwrap());

    let obo_path = dir.path().join("out").join("ccle.obo");
    let json_path = dir.path().join("out").join("ccle.json");
    obo.write_obo_file(&obo_path).unwrap();
    obo.write_json_file(&json_path).unwrap();

    let text = std::fs::read_to_string(&obo_path).unwrap();
    assert!(text.contains("name: 22Rv1"));
    let json = std::fs::read_to_string(&json_path).unwrap();
    assert!(json.contains("22RV1_PROSTATE"));
}

#[test]
fn test_invalid_registry_creates_no_file() {
    let dir = tempfile::tempdir().unwrap();
    let mut term = Term::from_triple("msigdb", "M1", None).unwrap();
    term.annotate_object(&HAS_PARTICIPANT, Reference::new("ncbigene", "1").unwrap())
        .unwrap();
    let mut obo = Obo::new("msigdb");
    obo.insert_term(term);

    let path = dir.path().join("msigdb.obo");
    assert!(obo.write_obo_file(&path).is_err());
    assert!(!path.exists());
}
