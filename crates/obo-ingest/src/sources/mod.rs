//! Source extractors
//!
//! Each module turns one upstream download into [`Term`](obo_common::Term)s
//! and exposes a `*Source` type implementing
//! [`TermSource`](crate::source::TermSource).

pub mod bigg;
pub mod ccle;
pub mod depmap;
pub mod expasy;
pub mod go_mapping;
pub mod hgnc_genefamily;
pub mod msigdb;
pub mod silva;

pub use bigg::{BiggCompartmentSource, BiggReactionSource};
pub use ccle::CcleSource;
pub use depmap::DepmapSource;
pub use expasy::ExpasySource;
pub use hgnc_genefamily::HgncGeneFamilySource;
pub use msigdb::MsigdbSource;
pub use silva::SilvaSource;
