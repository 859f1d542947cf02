//! ExPASy ENZYME nomenclature
//!
//! # Files
//!
//! - `enzclass.txt`: the class tree, one class per line, e.g.
//!   `1. 1. 1.-    With NAD(+) or NAD(P)(+) as acceptor.`
//! - `enzyme.dat`: one entry per enzyme, each a block of two-letter line
//!   codes terminated by `//`
//! - `ec2go`: GO molecular functions enabled by each EC number
//!
//! # Line codes used from `enzyme.dat`
//!
//! | Code | Meaning                                   |
//! |------|-------------------------------------------|
//! | ID   | EC number                                 |
//! | DE   | Name, or a deleted/transferred marker     |
//! | AN   | Alternate name                            |
//! | CA   | Catalytic activity                        |
//! | PR   | PROSITE documentation entry               |
//! | DR   | Swiss-Prot accession and entry name pairs |

use super::go_mapping::{get_go_mapping, GoMapping};
use crate::config::IngestConfig;
use crate::error::Result;
use crate::source::TermSource;
use indexmap::IndexMap;
use obo_common::typedef::{ENABLES, HAS_MEMBER, TERM_REPLACED_BY};
use obo_common::{Reference, Synonym, Term, TypeDef};
use regex::Regex;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::PathBuf;
use tracing::{debug, info, warn};

pub const PREFIX: &str = "eccode";
pub const CLASS_FILE: &str = "enzclass.txt";
pub const DATABASE_FILE: &str = "enzyme.dat";
pub const EC2GO_FILE: &str = "ec2go";

const DELETED: &str = "Deleted entry";
const TRANSFERRED: &str = "Transferred entry:";
const TRANSFER_SEPARATOR: &str = r",\s*|\s+and\s+";

// ============================================================================
// Class tree
// ============================================================================

/// Normalize a possibly padded EC code such as `1. 1. -.-`
///
/// Returns the normalized code and the code of its parent class.
pub fn normalize_ec_code(raw: &str) -> (String, Option<String>) {
    let compact = raw.replace([' ', '-'], "");
    let levels: Vec<&str> = compact.split('.').filter(|level| !level.is_empty()).collect();
    let parent = match levels.split_last() {
        Some((_, ancestors)) if !ancestors.is_empty() => Some(ancestors.join(".")),
        _ => None,
    };
    (levels.join("."), parent)
}

/// Parse `enzclass.txt` into class terms keyed by EC code
pub fn parse_enzclass<R: BufRead>(reader: R) -> Result<IndexMap<String, Term>> {
    let mut classes: IndexMap<String, Term> = IndexMap::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        if !line.starts_with(|c: char| c.is_ascii_digit()) {
            continue;
        }
        let (Some(code), Some(name)) = (line.get(..7), line.get(11..)) else {
            warn!(line = index + 1, text = %line, "Skipping short class line");
            continue;
        };
        let (ec_code, parent) = normalize_ec_code(code);
        let name = name.trim().trim_end_matches('.');

        let mut term = Term::from_triple(PREFIX, &ec_code, Some(name))?;
        if let Some(parent) = parent {
            match classes.get(&parent) {
                Some(parent_term) => {
                    term.append_parent(parent_term.reference().clone());
                },
                None => warn!(class = %ec_code, parent = %parent, "Class listed before its parent"),
            }
        }
        classes.insert(ec_code, term);
    }
    debug!(count = classes.len(), "Parsed enzyme classes");
    Ok(classes)
}

// ============================================================================
// Enzyme entries
// ============================================================================

/// What an entry's description says about its status
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryStatus {
    Active { name: Option<String> },
    Deleted,
    /// Replaced by the listed EC codes
    Transferred(Vec<String>),
}

/// One `ID` .. `//` block of `enzyme.dat`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnzymeEntry {
    pub ec_code: String,
    /// `DE` lines joined with spaces
    pub description: String,
    pub alternate_names: Vec<String>,
    pub catalytic_activity: Vec<String>,
    /// PROSITE documentation ids
    pub domains: Vec<String>,
    /// Swiss-Prot (accession, entry name) pairs
    pub proteins: Vec<(String, String)>,
}

impl EnzymeEntry {
    fn new(ec_code: &str) -> Self {
        Self {
            ec_code: ec_code.trim().to_string(),
            ..Default::default()
        }
    }

    /// Interpret the description
    pub fn status(&self, separator: &Regex) -> EntryStatus {
        let description = self.description.trim();
        if description.trim_end_matches('.') == DELETED {
            return EntryStatus::Deleted;
        }
        if let Some(targets) = description.strip_prefix(TRANSFERRED) {
            let mut targets: Vec<String> = separator
                .split(targets.trim().trim_end_matches('.'))
                .map(|target| target.trim().trim_start_matches("and ").trim())
                .filter(|target| !target.is_empty())
                .map(str::to_string)
                .collect();
            targets.sort();
            return EntryStatus::Transferred(targets);
        }
        let name = description.trim_end_matches('.');
        EntryStatus::Active {
            name: (!name.is_empty()).then(|| name.to_string()),
        }
    }

    /// The class this entry sits under, e.g. `1.1.1` for `1.1.1.1`
    pub fn parent_code(&self) -> Option<&str> {
        self.ec_code.rsplit_once('.').map(|(parent, _)| parent)
    }

    fn push(&mut self, code: &str, value: &str) {
        match code {
            "DE" => {
                if !self.description.is_empty() {
                    self.description.push(' ');
                }
                self.description.push_str(value);
            },
            "AN" => self.alternate_names.push(value.trim_end_matches('.').to_string()),
            "CA" => self.catalytic_activity.push(value.to_string()),
            "PR" => {
                let domain = value
                    .strip_prefix("PROSITE;")
                    .unwrap_or(value)
                    .trim()
                    .trim_end_matches(';');
                if !domain.is_empty() {
                    self.domains.push(domain.to_string());
                }
            },
            "DR" => {
                for pair in value.split(';') {
                    let pair = pair.trim();
                    if pair.is_empty() {
                        continue;
                    }
                    match pair
                        .split_once(',')
                        .map(|(accession, entry_name)| (accession.trim(), entry_name.trim()))
                        .filter(|(accession, entry_name)| !accession.is_empty() && !entry_name.is_empty())
                    {
                        Some((accession, entry_name)) => self
                            .proteins
                            .push((accession.to_string(), entry_name.to_string())),
                        None => warn!(ec_code = %self.ec_code, pair, "Malformed DR pair"),
                    }
                }
            },
            _ => {},
        }
    }
}

/// Parse `enzyme.dat` into entries; lines before the first `ID` are the
/// file's preamble and ignored
pub fn parse_enzyme_dat<R: BufRead>(reader: R) -> Result<Vec<EnzymeEntry>> {
    let mut entries = Vec::new();
    let mut current: Option<EnzymeEntry> = None;

    for line in reader.lines() {
        let line = line?;
        let line = line.trim();
        let code = line.get(..2).unwrap_or(line);
        let value = line.get(5..).unwrap_or_default().trim_end();

        match code {
            "ID" => {
                entries.extend(current.take());
                current = Some(EnzymeEntry::new(value));
            },
            "//" => entries.extend(current.take()),
            _ => {
                if let Some(entry) = current.as_mut() {
                    entry.push(code, value);
                }
            },
        }
    }
    entries.extend(current);
    debug!(count = entries.len(), "Parsed enzyme entries");
    Ok(entries)
}

/// Build the term for one enzyme entry, or `None` for an active entry
/// without a name
pub fn enzyme_term(
    entry: &EnzymeEntry,
    classes: &IndexMap<String, Term>,
    ec2go: &GoMapping,
    separator: &Regex,
) -> Result<Option<Term>> {
    if entry.ec_code.is_empty() {
        warn!("Skipping enzyme entry without an EC code");
        return Ok(None);
    }
    let name = match entry.status(separator) {
        EntryStatus::Deleted => {
            return Ok(Some(Term::from_triple(PREFIX, &entry.ec_code, None)?.with_obsolete(true)));
        },
        EntryStatus::Transferred(targets) => {
            let mut term = Term::from_triple(PREFIX, &entry.ec_code, None)?.with_obsolete(true);
            for target in targets {
                term.append_replaced_by(Reference::new(PREFIX, target)?)?;
            }
            return Ok(Some(term));
        },
        EntryStatus::Active { name: None } => {
            warn!(ec_code = %entry.ec_code, "Skipping enzyme without a name");
            return Ok(None);
        },
        EntryStatus::Active { name: Some(name) } => name,
    };

    let definition = (!entry.catalytic_activity.is_empty())
        .then(|| entry.catalytic_activity.join(" "));
    let synonyms = entry
        .alternate_names
        .iter()
        .map(Synonym::new)
        .collect::<obo_common::Result<Vec<_>>>()?;
    let mut term = Term::from_triple(PREFIX, &entry.ec_code, Some(name.as_str()))?
        .with_optional_definition(definition)
        .with_synonyms(synonyms);

    match entry.parent_code().and_then(|parent| classes.get(parent)) {
        Some(parent) => {
            term.append_parent(parent.reference().clone());
        },
        None => warn!(ec_code = %entry.ec_code, "Enzyme has no known parent class"),
    }

    for domain in &entry.domains {
        term.annotate_object(&HAS_MEMBER, Reference::new("prosite", domain.as_str())?)?;
    }
    for (accession, entry_name) in &entry.proteins {
        let protein = Reference::new("uniprot", accession.as_str())?.with_name(entry_name.as_str());
        term.annotate_object(&HAS_MEMBER, protein)?;
    }
    for target in ec2go.get(&entry.ec_code).into_iter().flatten() {
        let function = Reference::new("go", target.go_id.as_str())?.with_name(target.go_name.as_str());
        term.annotate_object(&ENABLES, function)?;
    }
    Ok(Some(term))
}

/// Combine the class tree, enzyme entries and GO mapping into terms
pub fn enzyme_terms(
    classes: IndexMap<String, Term>,
    entries: &[EnzymeEntry],
    ec2go: &GoMapping,
) -> Result<Vec<Term>> {
    let separator = Regex::new(TRANSFER_SEPARATOR)?;
    let mut enzymes = Vec::with_capacity(entries.len());
    for entry in entries {
        if let Some(term) = enzyme_term(entry, &classes, ec2go, &separator)? {
            enzymes.push(term);
        }
    }
    let mut terms: Vec<Term> = classes.into_values().collect();
    terms.extend(enzymes);
    Ok(terms)
}

// ============================================================================
// Source
// ============================================================================

/// Extractor for ExPASy ENZYME
#[derive(Debug, Clone)]
pub struct ExpasySource {
    class_path: PathBuf,
    database_path: PathBuf,
    ec2go_path: Option<PathBuf>,
    version: Option<String>,
}

impl ExpasySource {
    pub fn new(class_path: impl Into<PathBuf>, database_path: impl Into<PathBuf>) -> Self {
        Self {
            class_path: class_path.into(),
            database_path: database_path.into(),
            ec2go_path: None,
            version: None,
        }
    }

    pub fn from_config(config: &IngestConfig) -> Self {
        Self {
            class_path: config.source_path(PREFIX, None, CLASS_FILE),
            database_path: config.source_path(PREFIX, None, DATABASE_FILE),
            ec2go_path: Some(config.source_path(PREFIX, None, EC2GO_FILE)),
            version: config.version(PREFIX).map(str::to_string),
        }
    }

    /// Read GO annotations from an `ec2go` file
    #[must_use]
    pub fn with_ec2go(mut self, path: impl Into<PathBuf>) -> Self {
        self.ec2go_path = Some(path.into());
        self
    }

    #[must_use]
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    fn ec2go(&self) -> Result<GoMapping> {
        match &self.ec2go_path {
            Some(path) => get_go_mapping(path, "EC"),
            None => Ok(GoMapping::new()),
        }
    }
}

impl TermSource for ExpasySource {
    fn prefix(&self) -> &str {
        PREFIX
    }

    fn name(&self) -> &str {
        "Enzyme Nomenclature"
    }

    fn data_version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    fn typedefs(&self) -> Result<Vec<TypeDef>> {
        Ok(vec![HAS_MEMBER.clone(), ENABLES.clone(), TERM_REPLACED_BY.clone()])
    }

    fn root_terms(&self) -> Vec<Reference> {
        (1..=7)
            .filter_map(|class| Reference::new(PREFIX, class.to_string()).ok())
            .collect()
    }

    fn iter_terms(&self) -> Result<Vec<Term>> {
        info!(path = %self.class_path.display(), "Parsing enzyme classes");
        let classes = parse_enzclass(BufReader::new(File::open(&self.class_path)?))?;

        info!(path = %self.database_path.display(), "Parsing enzyme database");
        let entries = parse_enzyme_dat(BufReader::new(File::open(&self.database_path)?))?;

        let ec2go = self.ec2go()?;
        let terms = enzyme_terms(classes, &entries, &ec2go)?;
        info!(count = terms.len(), go_mapped = ec2go.len(), "Parsed ExPASy");
        Ok(terms)
    }
}
