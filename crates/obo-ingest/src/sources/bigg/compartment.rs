//! BiGG compartments, scraped from the saved compartments page
//!
//! The page holds a single `table.myTable` whose data rows are
//! `<td>identifier</td><td>name</td>`.

use crate::config::IngestConfig;
use crate::error::{IngestError, Result};
use crate::source::TermSource;
use obo_common::{Reference, Term};
use scraper::{Html, Selector};
use std::path::PathBuf;
use tracing::{debug, info, warn};

pub const PREFIX: &str = "bigg.compartment";
pub const FILE_NAME: &str = "compartments.html";

/// Known compartments and the GO cellular component each one denotes
const GO_MAPPING: [(&str, &str, &str); 15] = [
    ("c", "0005829", "cytosol"),
    ("e", "0005615", "extracellular space"),
    ("p", "0042597", "periplasmic space"),
    ("m", "0005739", "mitochondrion"),
    ("r", "0005783", "endoplasmic reticulum"),
    ("v", "0005773", "vacuole"),
    ("n", "0005634", "nucleus"),
    ("g", "0005794", "Golgi apparatus"),
    ("u", "0009579", "thylakoid"),
    ("l", "0005764", "lysosome"),
    ("h", "0009507", "chloroplast"),
    ("f", "0005929", "cilium"),
    ("s", "1990413", "eyespot apparatus"),
    ("um", "0042651", "thylakoid membrane"),
    ("y", "0070069", "cytochrome complex"),
];

/// The GO cellular component a compartment code maps to, if known
pub fn go_component(identifier: &str) -> Option<Reference> {
    GO_MAPPING
        .iter()
        .find(|(code, _, _)| *code == identifier)
        .and_then(|(_, go_id, name)| Reference::new("go", *go_id).ok().map(|r| r.with_name(*name)))
}

/// Extract (identifier, name) pairs from the compartments page
pub fn parse_compartments(html: &str) -> Result<Vec<(String, String)>> {
    let document = Html::parse_document(html);
    let table_selector = selector("table.myTable")?;
    let row_selector = selector("tr")?;
    let cell_selector = selector("td")?;

    let Some(table) = document.select(&table_selector).next() else {
        return Err(IngestError::invalid_format(0, "no table.myTable in compartments page"));
    };

    let mut compartments = Vec::new();
    for row in table.select(&row_selector) {
        let cells: Vec<String> = row
            .select(&cell_selector)
            .map(|cell| cell.text().collect::<String>().trim().to_string())
            .collect();
        match cells.as_slice() {
            [] => continue,
            [identifier, name] if !identifier.is_empty() => {
                compartments.push((identifier.clone(), name.clone()));
            },
            _ => warn!(cells = ?cells, "Skipping malformed compartment row"),
        }
    }
    debug!(count = compartments.len(), "Parsed compartments table");
    Ok(compartments)
}

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| IngestError::Selector(format!("{}: {}", css, e)))
}

/// Build terms from parsed compartments
pub fn compartment_terms(compartments: &[(String, String)]) -> Result<Vec<Term>> {
    let mut terms = Vec::with_capacity(compartments.len());
    for (identifier, name) in compartments {
        let name = (!name.is_empty()).then_some(name.as_str());
        let mut term = Term::from_triple(PREFIX, identifier, name)?;
        if let Some(component) = go_component(identifier) {
            term.append_exact_match(component);
        }
        terms.push(term);
    }
    Ok(terms)
}

/// Extractor for BiGG compartments
#[derive(Debug, Clone)]
pub struct BiggCompartmentSource {
    path: PathBuf,
    version: Option<String>,
}

impl BiggCompartmentSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            version: None,
        }
    }

    /// Locate the saved page under the configured raw directory
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

impl TermSource for BiggCompartmentSource {
    fn prefix(&self) -> &str {
        PREFIX
    }

    fn name(&self) -> &str {
        "BiGG compartments"
    }

    fn data_version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    fn idspaces(&self) -> Vec<(&'static str, &'static str)> {
        vec![
            (PREFIX, "http://bigg.ucsd.edu/compartments/"),
            ("go", "http://purl.obolibrary.org/obo/GO_"),
        ]
    }

    fn iter_terms(&self) -> Result<Vec<Term>> {
        info!(path = %self.path.display(), "Parsing BiGG compartments");
        let html = std::fs::read_to_string(&self.path)?;
        compartment_terms(&parse_compartments(&html)?)
    }
}
