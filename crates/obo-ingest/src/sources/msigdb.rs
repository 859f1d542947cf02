//! MSigDB gene sets
//!
//! The release is a zipped XML document with one self-closing `<GENESET .../>`
//! element per line. Lines are parsed one at a time so that a badly escaped
//! gene set only costs that one line.

use crate::config::IngestConfig;
use crate::decompression::{read_first_zip_entry, read_zip_entry};
use crate::error::Result;
use crate::record::RawRecord;
use crate::source::TermSource;
use obo_common::typedef::HAS_PARTICIPANT;
use obo_common::{Reference, Term, TypeDef};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use tracing::{debug, info, warn};

pub const PREFIX: &str = "msigdb";

const GENESET_TAG: &str = "<GENESET";

const GO_URL_PREFIX: &str = "http://amigo.geneontology.org/amigo/term/GO:";
const KEGG_URL_PREFIX: &str = "http://www.genome.jp/kegg/pathway/hsa/";
const KEGG_URL_SUFFIX: &str = ".html";

/// Attributes copied onto each gene set as literal annotations
const PROPERTIES: [(&str, &str, &str); 5] = [
    ("CATEGORY_CODE", "category_code", "category code"),
    ("SUB_CATEGORY_CODE", "sub_category_code", "sub-category code"),
    ("CONTRIBUTOR", "contributor", "contributor"),
    ("EXACT_SOURCE", "exact_source", "exact source"),
    ("EXTERNAL_DETAILS_URL", "external_details_url", "external details URL"),
];

/// Organisms that appear in MSigDB and their NCBI Taxonomy ids
const SPECIES: [(&str, &str); 5] = [
    ("Homo sapiens", "9606"),
    ("Mus musculus", "10090"),
    ("Rattus norvegicus", "10116"),
    ("Macaca mulatta", "9544"),
    ("Danio rerio", "7955"),
];

/// Attribute name paired with its metadata tag
pub fn property_typedefs() -> Result<Vec<(&'static str, TypeDef)>> {
    PROPERTIES
        .iter()
        .map(|(attribute, identifier, name)| {
            Ok((
                *attribute,
                TypeDef::default_for(PREFIX, identifier, Some(name))?.as_metadata_tag(),
            ))
        })
        .collect()
}

fn taxonomy_id(organism: &str) -> Option<&'static str> {
    SPECIES
        .iter()
        .find(|(name, _)| *name == organism)
        .map(|(_, taxonomy_id)| *taxonomy_id)
}

/// Parse one `<GENESET .../>` line into its attributes
///
/// Returns `Ok(None)` for lines holding some other element.
pub fn parse_geneset_line(line: &str, line_number: usize) -> Result<Option<RawRecord>> {
    let mut reader = Reader::from_str(line);
    loop {
        match reader.read_event()? {
            Event::Empty(element) | Event::Start(element)
                if element.name().as_ref() == b"GENESET" =>
            {
                return Ok(Some(attributes(&element, line_number)?));
            },
            Event::Eof => return Ok(None),
            _ => {},
        }
    }
}

fn attributes(element: &BytesStart<'_>, line_number: usize) -> Result<RawRecord> {
    let mut record = RawRecord::new(line_number);
    for attribute in element.attributes() {
        let attribute = attribute.map_err(quick_xml::Error::from)?;
        let key = String::from_utf8_lossy(attribute.key.as_ref()).into_owned();
        let value = attribute.unescape_value()?.into_owned();
        record.insert(key, value);
    }
    Ok(record)
}

/// Free-text description with literal `\d` and `\s` artifacts removed
fn definition(record: &RawRecord) -> Option<String> {
    record
        .get("DESCRIPTION_FULL")
        .or_else(|| record.get("DESCRIPTION_BRIEF"))
        .map(|text| text.replace("\\d", "").replace("\\s", ""))
}

fn provenance(record: &RawRecord) -> Result<Vec<Reference>> {
    let Some(pmid) = record.get("PMID") else {
        return Ok(Vec::new());
    };
    let prefix = if pmid.starts_with("GSE") { "gse" } else { "pubmed" };
    Ok(vec![Reference::new(prefix, pmid)?])
}

/// The external identifier a contributor-specific xref points at
fn contributor_xref(record: &RawRecord) -> Option<(&'static str, String)> {
    let contributor = record.get("CONTRIBUTOR")?;
    let exact_source = record.get("EXACT_SOURCE").map(str::to_string);
    let details = record.get("EXTERNAL_DETAILS_URL");

    let (prefix, identifier) = match contributor {
        "WikiPathways" => ("wikipathways", exact_source),
        "Reactome" => ("reactome", exact_source),
        "Gene Ontology" => (
            "go",
            exact_source.or_else(|| {
                details
                    .and_then(|url| url.strip_prefix(GO_URL_PREFIX))
                    .map(str::to_string)
            }),
        ),
        "KEGG" => (
            "kegg.pathway",
            exact_source.or_else(|| {
                details
                    .and_then(|url| url.strip_prefix(KEGG_URL_PREFIX))
                    .map(|rest| rest.strip_suffix(KEGG_URL_SUFFIX).unwrap_or(rest))
                    .map(str::to_string)
            }),
        ),
        _ => return None,
    };

    match identifier.filter(|identifier| !identifier.is_empty()) {
        Some(identifier) => Some((prefix, identifier)),
        None => {
            warn!(
                gene_set = record.get("SYSTEMATIC_NAME").unwrap_or_default(),
                contributor,
                details = details.unwrap_or_default(),
                "Missing contributor source"
            );
            None
        },
    }
}

/// Build a term from the attributes of one gene set
pub fn geneset_term(record: &RawRecord, properties: &[(&str, TypeDef)]) -> Result<Option<Term>> {
    let Some(identifier) = record.get("SYSTEMATIC_NAME") else {
        warn!(line = record.line(), "Skipping gene set without SYSTEMATIC_NAME");
        return Ok(None);
    };

    let mut term = Term::from_triple(PREFIX, identifier, record.get("STANDARD_NAME"))?
        .with_optional_definition(definition(record))
        .with_provenance(provenance(record)?)
        .with_obsolete(record.get("CATEGORY_CODE") == Some("ARCHIVED"));

    for (attribute, typedef) in properties {
        if let Some(value) = record.get(attribute) {
            term.annotate_literal(typedef, value)?;
        }
    }

    match record.get("ORGANISM").map(|organism| (organism, taxonomy_id(organism))) {
        Some((_, Some(taxonomy_id))) => term.set_species(taxonomy_id)?,
        Some((organism, None)) => warn!(gene_set = identifier, organism, "Unknown organism"),
        None => {},
    }

    if let Some((prefix, external_id)) = contributor_xref(record) {
        term.append_xref(Reference::new(prefix, external_id)?);
    }

    for gene in record.get_list("MEMBERS_EZID", ',') {
        term.annotate_object(&HAS_PARTICIPANT, Reference::new("ncbigene", gene)?)?;
    }
    Ok(Some(term))
}

/// Parse the text of the MSigDB XML document
pub fn parse_msigdb_xml(text: &str, limit: Option<usize>) -> Result<Vec<Term>> {
    let properties = property_typedefs()?;
    let mut terms = Vec::new();
    let mut skipped = 0usize;

    for (index, line) in text.lines().enumerate() {
        if limit.is_some_and(|limit| terms.len() >= limit) {
            break;
        }
        let line = line.trim();
        if !line.starts_with(GENESET_TAG) {
            continue;
        }
        let record = match parse_geneset_line(line, index + 1) {
            Ok(Some(record)) => record,
            Ok(None) => continue,
            Err(e) => {
                warn!(line = index + 1, error = %e, "Skipping malformed gene set");
                skipped += 1;
                continue;
            },
        };
        if let Some(term) = geneset_term(&record, &properties)? {
            terms.push(term);
        }
    }
    debug!(count = terms.len(), skipped, "Parsed MSigDB gene sets");
    Ok(terms)
}

/// Extractor for MSigDB
#[derive(Debug, Clone)]
pub struct MsigdbSource {
    path: PathBuf,
    version: Option<String>,
    limit: Option<usize>,
}

impl MsigdbSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            version: None,
            limit: None,
        }
    }

    /// `{raw_dir}/msigdb/{version}/msigdb_v{version}.Hs.xml.zip`
    pub fn from_config(config: &IngestConfig) -> Self {
        let version = config.version(PREFIX).map(str::to_string);
        let file = match &version {
            Some(version) => format!("msigdb_v{}.Hs.xml.zip", version),
            None => "msigdb.xml.zip".to_string(),
        };
        Self {
            path: config.source_path(PREFIX, None, file),
            version,
            limit: config.parse_limit,
        }
    }

    #[must_use]
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    #[must_use]
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    fn read_xml(&self) -> Result<String> {
        let file = BufReader::new(File::open(&self.path)?);
        let bytes = match &self.version {
            Some(version) => read_zip_entry(file, &format!("msigdb_v{}.Hs.xml", version))?,
            None => read_first_zip_entry(file)?.1,
        };
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

impl TermSource for MsigdbSource {
    fn prefix(&self) -> &str {
        PREFIX
    }

    fn name(&self) -> &str {
        "Molecular Signatures Database"
    }

    fn data_version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    fn typedefs(&self) -> Result<Vec<TypeDef>> {
        let mut typedefs = vec![HAS_PARTICIPANT.clone()];
        typedefs.extend(property_typedefs()?.into_iter().map(|(_, typedef)| typedef));
        Ok(typedefs)
    }

    fn iter_terms(&self) -> Result<Vec<Term>> {
        info!(path = %self.path.display(), version = ?self.version, "Parsing MSigDB");
        let xml = self.read_xml()?;
        let terms = parse_msigdb_xml(&xml, self.limit)?;
        info!(count = terms.len(), "Parsed MSigDB gene sets");
        Ok(terms)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn geneset(attributes: &str) -> String {
        format!(
            "<GENESET STANDARD_NAME=\"SET_NAME\" SYSTEMATIC_NAME=\"M1\" PMID=\"\" \
             ORGANISM=\"Homo sapiens\" CATEGORY_CODE=\"C2\" SUB_CATEGORY_CODE=\"CP\" \
             MEMBERS_EZID=\"\" DESCRIPTION_BRIEF=\"brief\" DESCRIPTION_FULL=\"\" {}/>",
            attributes
        )
    }

    fn parse_one(line: &str) -> Term {
        let record = parse_geneset_line(line, 1).unwrap().unwrap();
        geneset_term(&record, &property_typedefs().unwrap())
            .unwrap()
            .unwrap()
    }

    #[test]
    fn test_basic_gene_set() {
        let term = parse_one(&geneset(
            "CONTRIBUTOR=\"Broad Institute\" EXACT_SOURCE=\"\" EXTERNAL_DETAILS_URL=\"\"",
        ));
        assert_eq!(term.curie(), "msigdb:M1");
        assert_eq!(term.name(), Some("SET_NAME"));
        assert_eq!(term.definition(), Some("brief"));
        assert!(!term.is_obsolete());
        assert!(term.provenance().is_empty());
        assert_eq!(term.species().unwrap().curie(), "NCBITaxon:9606");
        assert_eq!(term.xrefs().len(), 0);

        let properties = property_typedefs().unwrap();
        let (_, category) = &properties[0];
        assert_eq!(term.literals(category), ["C2"]);
        let (_, contributor) = &properties[2];
        assert_eq!(term.literals(contributor), ["Broad Institute"]);
        // empty attributes are not annotated
        let (_, exact_source) = &properties[3];
        assert!(term.literals(exact_source).is_empty());
    }

    #[test]
    fn test_members_and_provenance() {
        let line = "<GENESET SYSTEMATIC_NAME=\"M2\" STANDARD_NAME=\"S\" PMID=\"GSE1234\" \
                    ORGANISM=\"Mus musculus\" MEMBERS_EZID=\"1,2,,3\" CATEGORY_CODE=\"ARCHIVED\"/>";
        let term = parse_one(line);
        assert!(term.is_obsolete());
        assert_eq!(term.provenance()[0].curie(), "gse:GSE1234");
        assert_eq!(term.species().unwrap().identifier(), "10090");
        assert_eq!(term.objects(&HAS_PARTICIPANT).len(), 3);

        let line = "<GENESET SYSTEMATIC_NAME=\"M3\" PMID=\"12345\" ORGANISM=\"Danio rerio\"/>";
        assert_eq!(parse_one(line).provenance()[0].curie(), "pubmed:12345");
    }

    #[test]
    fn test_contributor_xrefs() {
        let term = parse_one(&geneset(
            "CONTRIBUTOR=\"Gene Ontology\" EXACT_SOURCE=\"\" \
             EXTERNAL_DETAILS_URL=\"http://amigo.geneontology.org/amigo/term/GO:0006915\"",
        ));
        let xrefs: Vec<String> = term.xrefs().map(|x| x.target.curie()).collect();
        assert_eq!(xrefs, vec!["go:0006915"]);

        let term = parse_one(&geneset(
            "CONTRIBUTOR=\"KEGG\" EXACT_SOURCE=\"\" \
             EXTERNAL_DETAILS_URL=\"http://www.genome.jp/kegg/pathway/hsa/hsa00010.html\"",
        ));
        let xrefs: Vec<String> = term.xrefs().map(|x| x.target.curie()).collect();
        assert_eq!(xrefs, vec!["kegg.pathway:hsa00010"]);

        let term = parse_one(&geneset(
            "CONTRIBUTOR=\"Reactome\" EXACT_SOURCE=\"R-HSA-109581\" EXTERNAL_DETAILS_URL=\"\"",
        ));
        assert_eq!(term.xrefs().next().unwrap().target.curie(), "reactome:R-HSA-109581");

        // missing source is warned and skipped
        let term = parse_one(&geneset(
            "CONTRIBUTOR=\"WikiPathways\" EXACT_SOURCE=\"\" EXTERNAL_DETAILS_URL=\"\"",
        ));
        assert_eq!(term.xrefs().len(), 0);
    }

    #[test]
    fn test_definition_cleanup() {
        let line = "<GENESET SYSTEMATIC_NAME=\"M4\" DESCRIPTION_FULL=\"Genes up\\d in cells\\s.\" \
                    DESCRIPTION_BRIEF=\"brief\"/>";
        assert_eq!(parse_one(line).definition(), Some("Genes up in cells."));
    }

    #[test]
    fn test_document_skips_malformed_lines() {
        let document = format!(
            "<?xml version=\"1.0\"?>\n<MSIGDB NAME=\"msigdb\" VERSION=\"7.5.1\">\n{}\n\
             <GENESET SYSTEMATIC_NAME=\"M9\" STANDARD_NAME=\"A & B\"/>\n{}\n</MSIGDB>\n",
            geneset("CONTRIBUTOR=\"x\""),
            "<GENESET SYSTEMATIC_NAME=\"M10\" STANDARD_NAME=\"OK\"/>"
        );
        let terms = parse_msigdb_xml(&document, None).unwrap();
        let ids: Vec<&str> = terms.iter().map(Term::identifier).collect();
        assert_eq!(ids, vec!["M1", "M10"]);

        let terms = parse_msigdb_xml(&document, Some(1)).unwrap();
        assert_eq!(terms.len(), 1);
    }
}
