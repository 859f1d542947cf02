//! OBO 1.4 text output
//!
//! Free text (names, definitions, synonym text, literal values) is escaped with
//! [`obo_escape_slim`]. CURIEs inside bracketed lists are written as-is, except
//! for the characters that would end the token or the list.

use crate::error::Result;
use crate::escape::obo_escape_slim;
use crate::ontology::Obo;
use crate::reference::Reference;
use crate::term::Term;
use crate::typedef::{TypeDef, FROM_SPECIES, HAS_DBXREF, TERM_REPLACED_BY};
use std::io::Write;

/// OBO format version emitted in the header
pub const FORMAT_VERSION: &str = "1.4";

/// `has ontology root term`, used to list root terms in the header
const ROOT_TERM_PROPERTY: &str = "IAO:0000700";

/// Date format used by the `date:` header tag
const OBO_DATE_FORMAT: &str = "%d:%m:%Y %H:%M";

pub(crate) fn write_document<W: Write>(obo: &Obo, out: &mut W) -> Result<()> {
    write_header(obo, out)?;
    for term in obo.terms() {
        writeln!(out)?;
        write_term(obo, term, out)?;
    }
    for typedef in stanza_typedefs(obo) {
        writeln!(out)?;
        write_typedef(obo, typedef, out)?;
    }
    Ok(())
}

/// Render a reference as it appears in an `id` position of this ontology
///
/// Default references scoped to the ontology print as their bare local id.
fn render_id(obo: &Obo, reference: &Reference) -> String {
    match reference.default_scope() {
        Some(scope) if scope == obo.ontology() => reference.local_identifier().to_string(),
        _ => reference.curie(),
    }
}

/// Escape the separators of a bracketed list inside one CURIE
fn escape_list_token(curie: &str) -> String {
    let mut escaped = String::with_capacity(curie.len());
    for c in curie.chars() {
        match c {
            ',' | ']' | '\\' => {
                escaped.push('\\');
                escaped.push(c);
            },
            c if c.is_whitespace() => escaped.push_str("\\W"),
            c => escaped.push(c),
        }
    }
    escaped
}

fn render_list(references: &[Reference]) -> String {
    let curies: Vec<String> = references
        .iter()
        .map(|reference| escape_list_token(&reference.curie()))
        .collect();
    format!("[{}]", curies.join(", "))
}

fn with_comment(rendered: String, reference: &Reference) -> String {
    match reference.name() {
        Some(name) => format!("{} ! {}", rendered, name),
        None => rendered,
    }
}

fn write_header<W: Write>(obo: &Obo, out: &mut W) -> Result<()> {
    writeln!(out, "format-version: {}", FORMAT_VERSION)?;
    if let Some(version) = obo.data_version() {
        writeln!(out, "data-version: {}", version)?;
    }
    if let Some(date) = obo.date() {
        writeln!(out, "date: {}", date.format(OBO_DATE_FORMAT))?;
    }
    if let Some(generator) = obo.auto_generated_by() {
        writeln!(out, "auto-generated-by: {}", generator)?;
    }
    for synonym_typedef in obo.synonym_typedefs() {
        let id = render_id(obo, synonym_typedef.reference());
        let name = obo_escape_slim(synonym_typedef.name().unwrap_or_default());
        match synonym_typedef.scope() {
            Some(scope) => writeln!(out, "synonymtypedef: {} \"{}\" {}", id, name, scope)?,
            None => writeln!(out, "synonymtypedef: {} \"{}\"", id, name)?,
        }
    }
    for (prefix, uri_prefix) in obo.idspaces() {
        writeln!(out, "idspace: {} {}", prefix, uri_prefix)?;
    }
    writeln!(out, "ontology: {}", obo.ontology())?;
    if let Some(name) = obo.name() {
        writeln!(
            out,
            "property_value: http://purl.org/dc/elements/1.1/title \"{}\" xsd:string",
            obo_escape_slim(name)
        )?;
    }
    for root in obo.root_terms() {
        writeln!(out, "property_value: {} {}", ROOT_TERM_PROPERTY, root.curie())?;
    }
    Ok(())
}

fn write_term<W: Write>(obo: &Obo, term: &Term, out: &mut W) -> Result<()> {
    writeln!(out, "[Term]")?;
    writeln!(out, "id: {}", term.curie())?;
    if let Some(name) = term.name() {
        writeln!(out, "name: {}", obo_escape_slim(name))?;
    }
    if term.definition().is_some() || !term.provenance().is_empty() {
        writeln!(
            out,
            "def: \"{}\" {}",
            obo_escape_slim(term.definition().unwrap_or_default()),
            render_list(term.provenance())
        )?;
    }
    if term.is_obsolete() {
        writeln!(out, "is_obsolete: true")?;
    }
    for alt_id in term.alt_ids() {
        writeln!(out, "alt_id: {}", alt_id.curie())?;
    }
    for parent in term.parents() {
        writeln!(out, "is_a: {}", with_comment(parent.curie(), parent))?;
    }
    for synonym in term.synonyms() {
        let mut line = format!(
            "synonym: \"{}\" {}",
            obo_escape_slim(synonym.name()),
            synonym.scope()
        );
        if let Some(synonym_type) = synonym.declared_type() {
            line.push(' ');
            line.push_str(&render_id(obo, synonym_type));
        }
        line.push(' ');
        line.push_str(&render_list(synonym.provenance()));
        writeln!(out, "{}", line)?;
    }
    for xref in term.xrefs() {
        if &xref.qualifier == HAS_DBXREF.reference() {
            writeln!(out, "xref: {}", xref.target.curie())?;
        } else {
            writeln!(
                out,
                "property_value: {} {}",
                render_id(obo, &xref.qualifier),
                xref.target.curie()
            )?;
        }
    }
    for (typedef, targets) in term.relationships() {
        for target in targets {
            if typedef == &*TERM_REPLACED_BY {
                writeln!(out, "replaced_by: {}", target.curie())?;
            } else {
                writeln!(
                    out,
                    "relationship: {} {}",
                    render_id(obo, typedef.reference()),
                    with_comment(target.curie(), target)
                )?;
            }
        }
    }
    for (typedef, values) in term.properties() {
        for value in values {
            writeln!(
                out,
                "property_value: {} \"{}\" xsd:string",
                render_id(obo, typedef.reference()),
                obo_escape_slim(value)
            )?;
        }
    }
    if let Some(species) = term.species() {
        writeln!(
            out,
            "relationship: {} {}",
            FROM_SPECIES.curie(),
            with_comment(species.curie(), species)
        )?;
    }
    Ok(())
}

/// Declared typedefs, plus `in taxon` when some term carries a species
fn stanza_typedefs(obo: &Obo) -> Vec<&TypeDef> {
    let mut typedefs: Vec<&TypeDef> = obo.typedefs().collect();
    let uses_species = obo.terms().any(|term| term.species().is_some());
    if uses_species && !typedefs.contains(&&*FROM_SPECIES) {
        typedefs.push(&*FROM_SPECIES);
    }
    typedefs
}

fn write_typedef<W: Write>(obo: &Obo, typedef: &TypeDef, out: &mut W) -> Result<()> {
    writeln!(out, "[Typedef]")?;
    writeln!(out, "id: {}", render_id(obo, typedef.reference()))?;
    if let Some(name) = typedef.name() {
        writeln!(out, "name: {}", obo_escape_slim(name))?;
    }
    if let Some(definition) = typedef.definition() {
        writeln!(out, "def: \"{}\" []", obo_escape_slim(definition))?;
    }
    if typedef.is_metadata_tag() {
        writeln!(out, "is_metadata_tag: true")?;
    }
    if typedef.is_transitive() {
        writeln!(out, "is_transitive: true")?;
    }
    if let Some(inverse) = typedef.inverse() {
        writeln!(out, "inverse_of: {}", with_comment(render_id(obo, inverse), inverse))?;
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::synonym::{Synonym, SynonymTypeDef};
    use crate::typedef::HAS_PARTICIPANT;

    fn render(obo: &Obo) -> String {
        let mut buffer = Vec::new();
        obo.write_obo(&mut buffer).unwrap();
        String::from_utf8(buffer).unwrap()
    }

    #[test]
    fn test_header() {
        let mut obo = Obo::new("bigg.compartment")
            .with_data_version(Some("1.6".to_string()))
            .with_auto_generated_by("obo-ingest");
        obo.add_idspace("go", "http://purl.obolibrary.org/obo/GO_");
        let text = render(&obo);
        assert!(text.starts_with("format-version: 1.4\ndata-version: 1.6\n"));
        assert!(text.contains("auto-generated-by: obo-ingest\n"));
        assert!(text.contains("idspace: go http://purl.obolibrary.org/obo/GO_\n"));
        assert!(text.contains("ontology: bigg.compartment\n"));
    }

    #[test]
    fn test_term_stanza() {
        let mut obo = Obo::new("hgnc.genefamily");
        let symbol =
            SynonymTypeDef::default_for("hgnc.genefamily", "symbol", Some("symbol")).unwrap();
        obo.add_synonym_typedef(symbol.clone());

        let mut family = Term::from_triple("hgnc.genefamily", "3", Some("ATP binding cassette"))
            .unwrap()
            .with_definition("Transporters: ABC, (see text)")
            .with_provenance(vec![Reference::new("pubmed", "11252153").unwrap()]);
        family.append_parent(Reference::new("hgnc.genefamily", "1").unwrap().with_name("Root"));
        family.append_synonym(Synonym::new("ABC").unwrap().with_type(&symbol));
        family.append_xref(Reference::new("go", "0042626").unwrap());
        family.append_exact_match(Reference::new("wikidata", "Q1").unwrap());
        obo.insert_term(family);

        let text = render(&obo);
        assert!(text.contains("synonymtypedef: symbol \"symbol\"\n"));
        assert!(text.contains("[Term]\nid: hgnc.genefamily:3\nname: ATP binding cassette\n"));
        assert!(text.contains(
            "def: \"Transporters\\: ABC\\, \\(see text\\)\" [pubmed:11252153]\n"
        ));
        assert!(text.contains("is_a: hgnc.genefamily:1 ! Root\n"));
        assert!(text.contains("synonym: \"ABC\" EXACT symbol []\n"));
        assert!(text.contains("xref: go:0042626\n"));
        assert!(text.contains("property_value: skos:exactMatch wikidata:Q1\n"));
    }

    #[test]
    fn test_relationships_and_literals() {
        let contributor = TypeDef::default_for("msigdb", "contributor", Some("contributor"))
            .unwrap()
            .as_metadata_tag();
        let mut obo = Obo::new("msigdb");
        obo.add_typedef(HAS_PARTICIPANT.clone());
        obo.add_typedef(contributor.clone());

        let mut gene_set = Term::from_triple("msigdb", "M1", Some("SET")).unwrap();
        gene_set
            .annotate_object(&HAS_PARTICIPANT, Reference::new("ncbigene", "1").unwrap())
            .unwrap();
        gene_set.annotate_literal(&contributor, "Broad Institute").unwrap();
        gene_set.set_species("9606").unwrap();
        gene_set
            .append_replaced_by(Reference::new("msigdb", "M2").unwrap())
            .unwrap();
        obo.insert_term(gene_set);

        let text = render(&obo);
        assert!(text.contains("relationship: RO:0000057 ncbigene:1\n"));
        assert!(text.contains("property_value: contributor \"Broad Institute\" xsd:string\n"));
        assert!(text.contains("relationship: RO:0002162 NCBITaxon:9606\n"));
        assert!(text.contains("replaced_by: msigdb:M2\n"));
        assert!(text.contains("[Typedef]\nid: contributor\nname: contributor\nis_metadata_tag: true\n"));
        assert!(text.contains("[Typedef]\nid: RO:0002162\nname: in taxon\n"));
    }

    #[test]
    fn test_bracket_lists_keep_curies_readable() {
        let mut obo = Obo::new("msigdb");
        let provenance = vec![
            Reference::new("pubmed", "26771021").unwrap(),
            Reference::new("doi", "10.1000/a,b] c").unwrap(),
        ];
        let mut term = Term::from_triple("msigdb", "M1", None)
            .unwrap()
            .with_definition("Gene set")
            .with_provenance(provenance.clone());
        term.append_synonym(Synonym::new("SET").unwrap().with_provenance(provenance));
        obo.insert_term(term);

        let text = render(&obo);
        let list = "[pubmed:26771021, doi:10.1000/a\\,b\\]\\Wc]";
        assert!(text.contains(&format!("def: \"Gene set\" {}\n", list)));
        assert!(text.contains(&format!("synonym: \"SET\" EXACT {}\n", list)));
    }

    #[test]
    fn test_newline_in_definition_is_escaped() {
        let mut obo = Obo::new("depmap");
        obo.insert_term(
            Term::from_triple("depmap", "ACH-1", None)
                .unwrap()
                .with_definition("line one\nline two"),
        );
        let text = render(&obo);
        assert!(text.contains("def: \"line one\\nline two\" []\n"));
    }
}
