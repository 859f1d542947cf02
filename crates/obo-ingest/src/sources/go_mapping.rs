//! GO mapping files (`ec2go`, `interpro2go` and friends)
//!
//! Each non-comment line maps one external identifier to one GO term:
//!
//! ```text
//! EC:1.1.1.1 > GO:alcohol dehydrogenase (NAD+) activity ; GO:0004022
//! InterPro:IPR000003 Retinoid X receptor/HNF4 > GO:DNA binding ; GO:0003677
//! ```

use crate::decompression::open_maybe_gzip;
use crate::error::{IngestError, Result};
use indexmap::{IndexMap, IndexSet};
use std::io::BufRead;
use std::path::Path;
use tracing::{debug, warn};

/// A GO term a mapping line points at
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GoTarget {
    /// Local GO identifier, without the `GO:` prefix
    pub go_id: String,
    pub go_name: String,
}

/// External identifier to the GO terms it maps to
pub type GoMapping = IndexMap<String, IndexSet<GoTarget>>;

/// Split one mapping line into the external identifier and its GO target
///
/// `prefix` is the external prefix as written in the file, e.g. "EC".
pub fn process_go_mapping_line(line: &str, prefix: &str) -> Option<(String, GoTarget)> {
    let line = line.trim();
    let rest = line
        .strip_prefix(prefix)
        .and_then(|rest| rest.strip_prefix(':'))
        .unwrap_or(line);

    let (left, go_id) = rest.rsplit_once(';')?;
    let go_id = go_id.trim();
    let go_id = go_id.strip_prefix("GO:").unwrap_or(go_id);

    let (source, go_name) = left.rsplit_once('>')?;
    let go_name = go_name.trim();
    let go_name = go_name.strip_prefix("GO:").unwrap_or(go_name);

    let identifier = source.split_whitespace().next()?;
    if go_id.is_empty() {
        return None;
    }
    Some((
        identifier.to_string(),
        GoTarget {
            go_id: go_id.to_string(),
            go_name: go_name.to_string(),
        },
    ))
}

/// Parse a whole mapping file; `!` lines are comments, malformed lines are
/// skipped with a warning
pub fn parse_go_mapping<R: BufRead>(reader: R, prefix: &str) -> Result<GoMapping> {
    let mut mapping = GoMapping::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() || line.starts_with('!') {
            continue;
        }
        match process_go_mapping_line(&line, prefix) {
            Some((identifier, target)) => {
                mapping.entry(identifier).or_default().insert(target);
            },
            None => {
                let err = IngestError::invalid_format(index + 1, "expected '<id> > GO:<name> ; GO:<id>'");
                warn!(error = %err, line = %line, "Skipping GO mapping line");
            },
        }
    }
    debug!(prefix, entries = mapping.len(), "Parsed GO mapping");
    Ok(mapping)
}

/// Read a GO mapping file from disk
pub fn get_go_mapping(path: &Path, prefix: &str) -> Result<GoMapping> {
    parse_go_mapping(open_maybe_gzip(path)?, prefix)
}
