//! SILVA small subunit taxonomy
//!
//! Two tab-separated files, either of which may be gzip-compressed:
//!
//! - taxonomy (no header): `path  taxon_id  rank  remark  release`, where
//!   `path` is the `;`-terminated lineage, e.g. `Bacteria;Actinomycetota;`
//! - taxmap (with header): `primaryAccession  start  stop  path
//!   organism_name  taxid`
//!
//! Ranks are mapped through a caller-supplied table; SILVA rank names that
//! are missing from it are reported and left unranked.

use crate::config::IngestConfig;
use crate::decompression::open_maybe_gzip;
use crate::error::Result;
use crate::record::RawRecord;
use crate::source::TermSource;
use indexmap::IndexMap;
use obo_common::typedef::HAS_TAXONOMY_RANK;
use obo_common::{Reference, Term, TypeDef};
use std::io::Read;
use std::path::PathBuf;
use tracing::{debug, info, warn};

pub const PREFIX: &str = "silva.taxon";
pub const ENA_PREFIX: &str = "ena.embl";
pub const TAXONOMY_FILE: &str = "tax_slv_ssu.txt.gz";
pub const TAXMAP_FILE: &str = "taxmap_slv_ssu_ref_nr.txt.gz";

const TAXONOMY_COLUMNS: [&str; 5] = ["path", "taxon_id", "rank", "remark", "release"];

/// Relation from an ENA accession to the taxon SILVA classifies it under
pub fn has_taxonomic_classification() -> Result<TypeDef> {
    Ok(TypeDef::default_for(
        PREFIX,
        "has_taxonomic_classification",
        Some("has taxonomic classification"),
    )?
    .with_definition(
        "Indicates that the genome sequence represented by an ENA accession is \
         classified under this taxon by SILVA.",
    ))
}

/// Lineage elements of a taxonomy path, without empty parts
fn lineage(path: &str) -> Vec<&str> {
    path.split(';')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect()
}

/// Canonical `;`-terminated key for a lineage
fn path_key(parts: &[&str]) -> String {
    let mut key = parts.join(";");
    key.push(';');
    key
}

fn tsv_reader<R: Read>(reader: R, has_headers: bool) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .quoting(false)
        .flexible(true)
        .has_headers(has_headers)
        .from_reader(reader)
}

/// Parse the taxonomy file into taxon terms keyed by taxon id
///
/// Parents are looked up by lineage, so a parent must appear before its
/// children; SILVA exports are sorted that way.
pub fn parse_taxonomy<R: Read>(
    reader: R,
    ranks: &IndexMap<String, Reference>,
) -> Result<IndexMap<String, Term>> {
    let mut path_to_id: IndexMap<String, String> = IndexMap::new();
    let mut terms: IndexMap<String, Term> = IndexMap::new();

    for (index, row) in tsv_reader(reader, false).records().enumerate() {
        let row = row?;
        let record = RawRecord::from_row(TAXONOMY_COLUMNS, row.iter(), index + 1);
        let (Some(path), Some(taxon_id)) = (record.get("path"), record.get("taxon_id")) else {
            warn!(line = record.line(), "Skipping taxonomy row without path or taxon id");
            continue;
        };
        let parts = lineage(path);
        let Some((name, ancestors)) = parts.split_last() else {
            warn!(line = record.line(), path, "Empty taxonomy path");
            continue;
        };

        let mut term = Term::from_triple(PREFIX, taxon_id, Some(*name))?;

        let rank = record.get("rank").unwrap_or_default();
        match ranks.get(rank.to_lowercase().as_str()) {
            Some(taxrank) => {
                term.annotate_object(&HAS_TAXONOMY_RANK, taxrank.clone())?;
            },
            None => warn!(line = record.line(), taxon_id, rank, "Unknown rank"),
        }

        if !ancestors.is_empty() {
            match path_to_id.get(&path_key(ancestors)) {
                Some(parent_id) => {
                    term.append_parent(Reference::new(PREFIX, parent_id.as_str())?);
                },
                None => debug!(taxon_id, path, "No parent taxon for lineage"),
            }
        }

        path_to_id.insert(path_key(&parts), taxon_id.to_string());
        terms.insert(taxon_id.to_string(), term);
    }
    debug!(count = terms.len(), "Parsed SILVA taxonomy");
    Ok(terms)
}

/// Parse the taxmap file into ENA accession terms classified under known taxa
pub fn parse_taxmap<R: Read>(
    reader: R,
    taxa: &IndexMap<String, Term>,
    classification: &TypeDef,
) -> Result<Vec<Term>> {
    let mut csv_reader = tsv_reader(reader, true);
    let headers = csv_reader.headers()?.clone();

    let mut terms = Vec::new();
    let mut unknown = 0usize;
    for (index, row) in csv_reader.records().enumerate() {
        let row = row?;
        let record = RawRecord::from_row(headers.iter(), row.iter(), index + 2);
        let (Some(accession), Some(taxon_id)) =
            (record.get("primaryAccession"), record.get("taxid"))
        else {
            continue;
        };
        let Some(taxon) = taxa.get(taxon_id) else {
            warn!(line = record.line(), accession, taxon_id, "Taxmap references unknown taxon");
            unknown += 1;
            continue;
        };

        let mut term = Term::from_triple(ENA_PREFIX, accession, record.get("organism_name"))?;
        term.annotate_object(classification, taxon.reference().clone())?;
        terms.push(term);
    }
    debug!(count = terms.len(), unknown, "Parsed SILVA taxmap");
    Ok(terms)
}

/// Extractor for the SILVA taxonomy
#[derive(Debug, Clone)]
pub struct SilvaSource {
    taxonomy_path: PathBuf,
    taxmap_path: PathBuf,
    ranks: IndexMap<String, Reference>,
    version: Option<String>,
}

impl SilvaSource {
    pub fn new(taxonomy_path: impl Into<PathBuf>, taxmap_path: impl Into<PathBuf>) -> Self {
        Self {
            taxonomy_path: taxonomy_path.into(),
            taxmap_path: taxmap_path.into(),
            ranks: IndexMap::new(),
            version: None,
        }
    }

    pub fn from_config(config: &IngestConfig) -> Self {
        Self {
            taxonomy_path: config.source_path(PREFIX, None, TAXONOMY_FILE),
            taxmap_path: config.source_path(PREFIX, None, TAXMAP_FILE),
            ranks: IndexMap::new(),
            version: config.version(PREFIX).map(str::to_string),
        }
    }

    /// Map lower-cased SILVA rank names (e.g. "phylum") to rank terms
    #[must_use]
    pub fn with_ranks(mut self, ranks: impl IntoIterator<Item = (String, Reference)>) -> Self {
        self.ranks = ranks
            .into_iter()
            .map(|(rank, reference)| (rank.to_lowercase(), reference))
            .collect();
        self
    }

    #[must_use]
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }
}

impl TermSource for SilvaSource {
    fn prefix(&self) -> &str {
        PREFIX
    }

    fn name(&self) -> &str {
        "SILVA taxonomy"
    }

    fn data_version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    fn typedefs(&self) -> Result<Vec<TypeDef>> {
        Ok(vec![HAS_TAXONOMY_RANK.clone(), has_taxonomic_classification()?])
    }

    fn idspaces(&self) -> Vec<(&'static str, &'static str)> {
        vec![
            (
                PREFIX,
                "https://www.arb-silva.de/no_cache/download/archive/current/Exports/taxonomy/",
            ),
            (ENA_PREFIX, "https://www.ebi.ac.uk/ena/browser/view/"),
        ]
    }

    fn root_terms(&self) -> Vec<Reference> {
        [("2", "Archaea"), ("3", "Bacteria"), ("4", "Eukaryota")]
            .into_iter()
            .filter_map(|(identifier, name)| {
                Reference::new(PREFIX, identifier).ok().map(|r| r.with_name(name))
            })
            .collect()
    }

    fn iter_terms(&self) -> Result<Vec<Term>> {
        info!(path = %self.taxonomy_path.display(), ranks = self.ranks.len(), "Parsing SILVA taxonomy");
        let taxa = parse_taxonomy(open_maybe_gzip(&self.taxonomy_path)?, &self.ranks)?;

        info!(path = %self.taxmap_path.display(), "Parsing SILVA taxmap");
        let accessions = parse_taxmap(
            open_maybe_gzip(&self.taxmap_path)?,
            &taxa,
            &has_taxonomic_classification()?,
        )?;

        info!(taxa = taxa.len(), accessions = accessions.len(), "Parsed SILVA");
        let mut terms: Vec<Term> = taxa.into_values().collect();
        terms.extend(accessions);
        Ok(terms)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    const TAXONOMY: &str = "\
Archaea;\t2\tdomain\t\t138
Bacteria;\t3\tdomain\t\t138
Bacteria;Actinomycetota;\t100\tphylum\t\t138
Bacteria;Actinomycetota;Weird;\t101\tclade\t\t138
Orphan;Lonely;\t102\tphylum\t\t138
";

    const TAXMAP: &str = "\
primaryAccession\tstart\tstop\tpath\torganism_name\ttaxid
AB001\t1\t1500\tBacteria;Actinomycetota;\tStreptomyces sp.\t100
AB002\t1\t1400\tBacteria;\tUnknown thing\t999
\t1\t10\tBacteria;\tno accession\t3
";

    fn ranks() -> IndexMap<String, Reference> {
        IndexMap::from([
            (
                "domain".to_string(),
                Reference::new("TAXRANK", "0000037").unwrap().with_name("domain"),
            ),
            (
                "phylum".to_string(),
                Reference::new("TAXRANK", "0000001").unwrap().with_name("phylum"),
            ),
        ])
    }

    #[test]
    fn test_taxonomy_lineage_and_ranks() {
        let taxa = parse_taxonomy(TAXONOMY.as_bytes(), &ranks()).unwrap();
        assert_eq!(taxa.len(), 5);

        let phylum = &taxa["100"];
        assert_eq!(phylum.name(), Some("Actinomycetota"));
        let parents: Vec<String> = phylum.parents().map(Reference::curie).collect();
        assert_eq!(parents, vec!["silva.taxon:3"]);
        assert_eq!(phylum.objects(&HAS_TAXONOMY_RANK)[0].curie(), "TAXRANK:0000001");

        // unknown rank leaves the taxon unranked
        let clade = &taxa["101"];
        assert!(clade.objects(&HAS_TAXONOMY_RANK).is_empty());
        assert_eq!(clade.parents().next().unwrap().identifier(), "100");

        // lineage with no known parent
        assert_eq!(taxa["102"].parents().len(), 0);
        assert_eq!(taxa["2"].parents().len(), 0);
    }

    #[test]
    fn test_taxmap_accessions() {
        let taxa = parse_taxonomy(TAXONOMY.as_bytes(), &ranks()).unwrap();
        let classification = has_taxonomic_classification().unwrap();
        let accessions = parse_taxmap(TAXMAP.as_bytes(), &taxa, &classification).unwrap();

        assert_eq!(accessions.len(), 1);
        let accession = &accessions[0];
        assert_eq!(accession.curie(), "ena.embl:AB001");
        assert_eq!(accession.name(), Some("Streptomyces sp."));
        assert_eq!(accession.objects(&classification)[0].curie(), "silva.taxon:100");
        assert!(accession.objects(&HAS_TAXONOMY_RANK).is_empty());
    }

    #[test]
    fn test_classification_is_a_relation() {
        let classification = has_taxonomic_classification().unwrap();
        assert!(!classification.is_metadata_tag());
        assert_eq!(
            classification.reference().default_scope(),
            Some("silva.taxon")
        );
        assert_eq!(
            classification.reference().local_identifier(),
            "has_taxonomic_classification"
        );
    }
}
