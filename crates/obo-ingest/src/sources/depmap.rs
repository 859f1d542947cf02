//! DepMap cell lines (`sample_info.csv`)

use crate::config::IngestConfig;
use crate::error::Result;
use crate::record::RawRecord;
use crate::source::TermSource;
use obo_common::typedef::EXACT_MATCH;
use obo_common::{Reference, Synonym, Term, TypeDef};
use std::io::Read;
use std::path::PathBuf;
use tracing::{debug, info, warn};

pub const PREFIX: &str = "depmap";
pub const FILE_NAME: &str = "sample_info.csv";

/// Repair an integer that went through a float column, e.g. `906826.0`
pub fn fix_mangled_int(value: &str) -> Option<String> {
    let number: f64 = value.trim().parse().ok()?;
    if !number.is_finite() {
        return None;
    }
    Some(format!("{}", number.trunc() as i64))
}

/// Build a term from one `sample_info.csv` row
pub fn cell_line_term(record: &RawRecord) -> Result<Option<Term>> {
    let Some(identifier) = record.get("DepMap_ID") else {
        warn!(line = record.line(), "Skipping cell line without DepMap_ID");
        return Ok(None);
    };

    let (name, stripped_name) = match (record.get("cell_line_name"), record.get("stripped_cell_line_name")) {
        (Some(name), stripped) => (Some(name), stripped),
        (None, stripped) => (stripped, None),
    };

    let mut term = Term::from_triple(PREFIX, identifier, name)?;
    if let Some(stripped_name) = stripped_name {
        term.append_synonym(Synonym::new(stripped_name)?);
    }
    for alias in record.get_list("alias", ',') {
        if Some(alias) == name {
            continue;
        }
        term.append_synonym(Synonym::new(alias)?);
    }

    if let Some(raw) = record.get("COSMICID") {
        match fix_mangled_int(raw) {
            Some(cosmic_id) => {
                term.append_exact_match(Reference::new("cosmic.cell", cosmic_id)?);
            },
            None => warn!(cell_line = identifier, cosmic_id = raw, "Unparseable COSMIC id"),
        }
    }
    if let Some(rrid) = record.get("RRID") {
        term.append_exact_match(Reference::new("cellosaurus", rrid)?);
    }
    Ok(Some(term))
}

/// Parse the sample info table
pub fn parse_sample_info<R: Read>(reader: R) -> Result<Vec<Term>> {
    let mut csv_reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
    let headers = csv_reader.headers()?.clone();

    let mut terms = Vec::new();
    for (index, row) in csv_reader.records().enumerate() {
        let row = row?;
        let record = RawRecord::from_row(headers.iter(), row.iter(), index + 2);
        if let Some(term) = cell_line_term(&record)? {
            terms.push(term);
        }
    }
    debug!(count = terms.len(), "Parsed DepMap cell lines");
    Ok(terms)
}

/// Extractor for DepMap cell lines
#[derive(Debug, Clone)]
pub struct DepmapSource {
    path: PathBuf,
    version: Option<String>,
}

impl DepmapSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            version: None,
        }
    }

    pub fn from_config(config: &IngestConfig) -> Self {
        Self {
            path: config.source_path(PREFIX, None, FILE_NAME),
            version: config.version(PREFIX).map(str::to_string),
        }
    }

    #[must_use]
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }
}

impl TermSource for DepmapSource {
    fn prefix(&self) -> &str {
        PREFIX
    }

    fn name(&self) -> &str {
        "DepMap Cell Lines"
    }

    fn data_version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    fn typedefs(&self) -> Result<Vec<TypeDef>> {
        Ok(vec![EXACT_MATCH.clone()])
    }

    fn iter_terms(&self) -> Result<Vec<Term>> {
        info!(path = %self.path.display(), "Parsing DepMap sample info");
        let terms = parse_sample_info(std::fs::File::open(&self.path)?)?;
        info!(count = terms.len(), "Parsed DepMap cell lines");
        Ok(terms)
    }
}
