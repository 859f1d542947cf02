//! Cancer Cell Line Encyclopedia cell lines, from the cBioPortal study archive
//!
//! The archive `ccle_broad_{version}.tar.gz` holds
//! `ccle_broad_{version}/data_clinical_sample.txt`: four `#` comment lines,
//! a header row, then tab-separated samples. Columns are read by position:
//! 0 is the sample id, 5 the DepMap id and 6 the cell line name.

use crate::config::IngestConfig;
use crate::decompression::read_tar_gz_entry;
use crate::error::Result;
use crate::source::TermSource;
use obo_common::{Reference, Term};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::PathBuf;
use tracing::{debug, info, warn};

pub const PREFIX: &str = "ccle";
pub const DEFAULT_VERSION: &str = "2019";

const COMMENT_LINES: usize = 4;
const ID_COLUMN: usize = 0;
const DEPMAP_COLUMN: usize = 5;
const NAME_COLUMN: usize = 6;

/// Path of the sample table inside the archive
pub fn inner_path(version: &str) -> String {
    format!("ccle_broad_{}/data_clinical_sample.txt", version)
}

fn cell(row: &csv::StringRecord, column: usize) -> Option<&str> {
    row.get(column).map(str::trim).filter(|value| !value.is_empty())
}

/// Parse the clinical sample table
pub fn parse_samples<R: BufRead>(mut reader: R) -> Result<Vec<Term>> {
    let mut comment = String::new();
    for _ in 0..COMMENT_LINES {
        comment.clear();
        reader.read_line(&mut comment)?;
    }

    let mut csv_reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .quoting(false)
        .flexible(true)
        .from_reader(reader);

    let mut terms = Vec::new();
    for (index, row) in csv_reader.records().enumerate() {
        let row = row?;
        let Some(identifier) = cell(&row, ID_COLUMN) else {
            warn!(line = index + COMMENT_LINES + 2, "Skipping sample without id");
            continue;
        };
        let mut term = Term::from_triple(PREFIX, identifier, cell(&row, NAME_COLUMN))?;
        if let Some(depmap_id) = cell(&row, DEPMAP_COLUMN) {
            term.append_xref(Reference::new("depmap", depmap_id)?);
        }
        terms.push(term);
    }
    debug!(count = terms.len(), "Parsed CCLE samples");
    Ok(terms)
}

/// Extractor for CCLE cell lines
#[derive(Debug, Clone)]
pub struct CcleSource {
    path: PathBuf,
    version: String,
}

impl CcleSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            version: DEFAULT_VERSION.to_string(),
        }
    }

    /// `{raw_dir}/ccle/{version}/ccle_broad_{version}.tar.gz`
    pub fn from_config(config: &IngestConfig) -> Self {
        let version = config.version(PREFIX).unwrap_or(DEFAULT_VERSION).to_string();
        Self {
            path: config.source_path(
                PREFIX,
                Some(version.as_str()),
                format!("ccle_broad_{}.tar.gz", version),
            ),
            version,
        }
    }

    #[must_use]
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }
}

impl TermSource for CcleSource {
    fn prefix(&self) -> &str {
        PREFIX
    }

    fn name(&self) -> &str {
        "Cancer Cell Line Encyclopedia Cell Line"
    }

    fn data_version(&self) -> Option<&str> {
        Some(self.version.as_str())
    }

    fn iter_terms(&self) -> Result<Vec<Term>> {
        let entry = inner_path(&self.version);
        info!(path = %self.path.display(), entry = %entry, "Parsing CCLE samples");
        let contents = read_tar_gz_entry(BufReader::new(File::open(&self.path)?), &entry)?;
        parse_samples(contents.as_slice())
    }
}
