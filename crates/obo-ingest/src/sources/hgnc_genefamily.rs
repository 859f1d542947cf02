//! HGNC gene families
//!
//! Two CSV tables from the HGNC gene family database dump:
//!
//! - `family.csv`: `id, abbreviation, name, pubmed_ids, desc_comment, desc_go, ...`
//! - `hierarchy.csv`: `parent_fam_id, child_fam_id`

use crate::config::IngestConfig;
use crate::error::Result;
use crate::record::RawRecord;
use crate::source::TermSource;
use indexmap::IndexMap;
use obo_common::{Reference, Synonym, SynonymTypeDef, Term};
use std::io::Read;
use std::path::PathBuf;
use tracing::{debug, info, warn};

pub const PREFIX: &str = "hgnc.genefamily";
pub const FAMILY_FILE: &str = "family.csv";
pub const HIERARCHY_FILE: &str = "hierarchy.csv";

/// Prefix of the GO links in the `desc_go` column
const GO_PURL_PREFIX: &str = "http://purl.uniprot.org/go/";

/// Synonym type for family abbreviations
pub fn symbol_type() -> Result<SynonymTypeDef> {
    Ok(SynonymTypeDef::default_for(PREFIX, "symbol", Some("symbol"))?)
}

fn csv_records<R: Read>(reader: R) -> Result<Vec<RawRecord>> {
    let mut csv_reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
    let headers = csv_reader.headers()?.clone();
    let mut records = Vec::new();
    for (index, row) in csv_reader.records().enumerate() {
        let row = row?;
        records.push(RawRecord::from_row(headers.iter(), row.iter(), index + 2));
    }
    Ok(records)
}

/// Build a family term from one `family.csv` row
pub fn family_term(record: &RawRecord, symbol: &SynonymTypeDef) -> Result<Option<Term>> {
    let Some(identifier) = record.get("id") else {
        warn!(line = record.line(), "Skipping family without id");
        return Ok(None);
    };

    let provenance = record
        .get_list("pubmed_ids", ',')
        .into_iter()
        .map(|pubmed| Reference::new("pubmed", pubmed))
        .collect::<obo_common::Result<Vec<_>>>()?;

    let mut term = Term::from_triple(PREFIX, identifier, record.get("name"))?
        .with_optional_definition(record.get("desc_comment").map(str::to_string))
        .with_provenance(provenance);

    if let Some(desc_go) = record.get("desc_go") {
        match desc_go
            .strip_prefix(GO_PURL_PREFIX)
            .map(str::trim)
            .filter(|go_id| !go_id.is_empty())
        {
            Some(go_id) => {
                term.append_xref(Reference::new("go", go_id)?);
            },
            None => warn!(family = identifier, desc_go, "Unrecognized GO link"),
        }
    }
    if let Some(abbreviation) = record.get("abbreviation") {
        term.append_synonym(Synonym::new(abbreviation)?.with_type(symbol));
    }
    Ok(Some(term))
}

/// Parse `family.csv`
pub fn parse_families<R: Read>(reader: R) -> Result<Vec<Term>> {
    let symbol = symbol_type()?;
    let mut terms = Vec::new();
    for record in csv_records(reader)? {
        if let Some(term) = family_term(&record, &symbol)? {
            terms.push(term);
        }
    }
    debug!(count = terms.len(), "Parsed gene families");
    Ok(terms)
}

/// Parse `hierarchy.csv` into child id -> parent ids
pub fn parse_hierarchy<R: Read>(reader: R) -> Result<IndexMap<String, Vec<String>>> {
    let mut hierarchy: IndexMap<String, Vec<String>> = IndexMap::new();
    for record in csv_records(reader)? {
        match (record.get("parent_fam_id"), record.get("child_fam_id")) {
            (Some(parent), Some(child)) => {
                hierarchy
                    .entry(child.to_string())
                    .or_default()
                    .push(parent.to_string());
            },
            _ => warn!(line = record.line(), "Skipping incomplete hierarchy row"),
        }
    }
    Ok(hierarchy)
}

/// Attach parents to children, naming each parent after its own term
pub fn apply_hierarchy(terms: &mut [Term], hierarchy: &IndexMap<String, Vec<String>>) -> Result<()> {
    let names: IndexMap<String, Option<String>> = terms
        .iter()
        .map(|term| (term.identifier().to_string(), term.name().map(str::to_string)))
        .collect();

    for term in terms.iter_mut() {
        let Some(parent_ids) = hierarchy.get(term.identifier()) else {
            continue;
        };
        for parent_id in parent_ids {
            let Some(parent_name) = names.get(parent_id) else {
                warn!(child = term.identifier(), parent = %parent_id, "Unknown parent family");
                continue;
            };
            let parent = Reference::new(PREFIX, parent_id.as_str())?
                .with_optional_name(parent_name.clone());
            term.append_parent(parent);
        }
    }
    for child in hierarchy.keys().filter(|child| !names.contains_key(*child)) {
        warn!(child = %child, "Hierarchy references unknown child family");
    }
    Ok(())
}

/// Extractor for HGNC gene families
#[derive(Debug, Clone)]
pub struct HgncGeneFamilySource {
    family_path: PathBuf,
    hierarchy_path: PathBuf,
    version: Option<String>,
}

impl HgncGeneFamilySource {
    pub fn new(family_path: impl Into<PathBuf>, hierarchy_path: impl Into<PathBuf>) -> Self {
        Self {
            family_path: family_path.into(),
            hierarchy_path: hierarchy_path.into(),
            version: None,
        }
    }

    pub fn from_config(config: &IngestConfig) -> Self {
        Self {
            family_path: config.source_path(PREFIX, None, FAMILY_FILE),
            hierarchy_path: config.source_path(PREFIX, None, HIERARCHY_FILE),
            version: config.version(PREFIX).map(str::to_string),
        }
    }

    #[must_use]
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }
}

impl TermSource for HgncGeneFamilySource {
    fn prefix(&self) -> &str {
        PREFIX
    }

    fn name(&self) -> &str {
        "HGNC gene families"
    }

    fn data_version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    fn synonym_typedefs(&self) -> Result<Vec<SynonymTypeDef>> {
        Ok(vec![symbol_type()?])
    }

    fn iter_terms(&self) -> Result<Vec<Term>> {
        info!(path = %self.family_path.display(), "Parsing HGNC gene families");
        let mut terms = parse_families(std::fs::File::open(&self.family_path)?)?;
        let hierarchy = parse_hierarchy(std::fs::File::open(&self.hierarchy_path)?)?;
        apply_hierarchy(&mut terms, &hierarchy)?;
        info!(families = terms.len(), links = hierarchy.len(), "Parsed HGNC gene families");
        Ok(terms)
    }
}
