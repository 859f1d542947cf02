//! BiGG universal reactions (`bigg_models_reactions.txt`)
//!
//! Tab-separated with a header row:
//! `bigg_id  name  reaction_string  model_list  database_links  old_bigg_ids`

use super::{annotate_database_links, annotate_models, split_list};
use crate::config::IngestConfig;
use crate::error::Result;
use crate::record::RawRecord;
use crate::source::TermSource;
use obo_common::typedef::{ENABLED_BY, PARTICIPATES_IN};
use obo_common::{Reference, Term, TypeDef};
use std::io::Read;
use std::path::PathBuf;
use tracing::{debug, info, warn};

pub const PREFIX: &str = "bigg.reaction";
pub const FILE_NAME: &str = "bigg_models_reactions.txt";

/// Build a term from one row, or `None` if the row has no id
pub fn reaction_term(record: &RawRecord) -> Result<Option<Term>> {
    let Some(bigg_id) = record.get("bigg_id") else {
        warn!(line = record.line(), "Skipping reaction without bigg_id");
        return Ok(None);
    };

    let mut term = Term::from_triple(PREFIX, bigg_id, record.get("name"))?
        .with_optional_definition(record.get("reaction_string").map(str::to_string));

    for old_id in split_list(record.get("old_bigg_ids")) {
        if old_id == bigg_id {
            continue;
        }
        term.append_alt(Reference::new(PREFIX, old_id)?);
    }
    annotate_models(&mut term, record.get("model_list"));
    annotate_database_links(
        &mut term,
        record.get("database_links"),
        &[("eccode", &*ENABLED_BY)],
    );
    Ok(Some(term))
}

/// Parse the reactions dump
pub fn parse_reactions<R: Read>(reader: R, limit: Option<usize>) -> Result<Vec<Term>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .quoting(false)
        .flexible(true)
        .from_reader(reader);
    let headers = csv_reader.headers()?.clone();

    let mut terms = Vec::new();
    for (index, row) in csv_reader.records().enumerate() {
        if limit.is_some_and(|limit| terms.len() >= limit) {
            debug!(limit = ?limit, "Reached parse limit");
            break;
        }
        let row = row?;
        // header is line 1
        let record = RawRecord::from_row(headers.iter(), row.iter(), index + 2);
        if let Some(term) = reaction_term(&record)? {
            terms.push(term);
        }
    }
    Ok(terms)
}

/// Extractor for BiGG reactions
#[derive(Debug, Clone)]
pub struct BiggReactionSource {
    path: PathBuf,
    version: Option<String>,
    limit: Option<usize>,
}

impl BiggReactionSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            version: None,
            limit: None,
        }
    }

    pub fn from_config(config: &IngestConfig) -> Self {
        Self {
            path: config.source_path(PREFIX, None, FILE_NAME),
            version: config.version(PREFIX).map(str::to_string),
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
}

impl TermSource for BiggReactionSource {
    fn prefix(&self) -> &str {
        PREFIX
    }

    fn name(&self) -> &str {
        "BiGG reactions"
    }

    fn data_version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    fn typedefs(&self) -> Result<Vec<TypeDef>> {
        Ok(vec![PARTICIPATES_IN.clone(), ENABLED_BY.clone()])
    }

    fn idspaces(&self) -> Vec<(&'static str, &'static str)> {
        vec![
            (PREFIX, "http://bigg.ucsd.edu/models/universal/reactions/"),
            (super::MODEL_PREFIX, "http://bigg.ucsd.edu/models/"),
        ]
    }

    fn iter_terms(&self) -> Result<Vec<Term>> {
        info!(path = %self.path.display(), "Parsing BiGG reactions");
        let file = std::fs::File::open(&self.path)?;
        let terms = parse_reactions(file, self.limit)?;
        info!(count = terms.len(), "Parsed BiGG reactions");
        Ok(terms)
    }
}
