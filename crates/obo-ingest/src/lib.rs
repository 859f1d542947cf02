//! OBO Ingest Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Extractors that turn already-downloaded biological data files into
//! [`obo_common`] ontologies.
//!
//! # Supported Data Sources
//!
//! - **BiGG**: compartments (HTML table) and universal reactions (TSV)
//! - **HGNC**: gene families and their hierarchy (CSV)
//! - **MSigDB**: gene sets (zipped XML)
//! - **SILVA**: small subunit taxonomy and ENA accession map (TSV, optionally gzipped)
//! - **ExPASy**: ENZYME classes and entries, with `ec2go` annotations
//! - **CCLE**: cell lines from the cBioPortal study archive (tar.gz)
//! - **DepMap**: cell line sample info (CSV)
//!
//! # Example
//!
//! ```no_run
//! use obo_ingest::sources::MsigdbSource;
//! use obo_ingest::{IngestConfig, TermSource};
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = IngestConfig::load()?.with_version("msigdb", "7.5.1");
//!     let (obo_path, _json_path) = MsigdbSource::from_config(&config).export(&config)?;
//!     tracing::info!(path = %obo_path.display(), "Exported MSigDB");
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod decompression;
pub mod error;
pub mod record;
pub mod source;
pub mod sources;

pub use config::IngestConfig;
pub use error::{IngestError, Result};
pub use record::RawRecord;
pub use source::TermSource;
