//! BiGG Models: compartments and universal reactions
//!
//! Both sources share the helpers below for the `;`-separated list columns of
//! the BiGG namespace dumps.

pub mod compartment;
pub mod reaction;

pub use compartment::BiggCompartmentSource;
pub use reaction::BiggReactionSource;

use obo_common::typedef::PARTICIPATES_IN;
use obo_common::{Reference, Term, TypeDef};
use tracing::warn;
use url::Url;

pub const MODEL_PREFIX: &str = "bigg.model";

/// Split a `;`-separated BiGG list, dropping empty parts
pub(crate) fn split_list(value: Option<&str>) -> Vec<&str> {
    value
        .map(|value| {
            value
                .split(';')
                .map(str::trim)
                .filter(|part| !part.is_empty())
                .collect()
        })
        .unwrap_or_default()
}

/// Each model a reaction appears in becomes `participates_in bigg.model:*`
pub(crate) fn annotate_models(term: &mut Term, model_list: Option<&str>) {
    for model in split_list(model_list) {
        match Reference::new(MODEL_PREFIX, model) {
            Ok(reference) => {
                if let Err(e) = term.annotate_object(&PARTICIPATES_IN, reference) {
                    warn!(term = %term.curie(), error = %e, "Failed to annotate model");
                }
            },
            Err(e) => warn!(term = %term.curie(), error = %e, "Invalid model identifier"),
        }
    }
}

/// Parse an identifiers.org link into a reference
///
/// Accepts both the path form (`http://identifiers.org/ec-code/1.1.1.1`) and
/// the CURIE form (`https://identifiers.org/ec-code:1.1.1.1`).
pub fn parse_identifiers_url(link: &str) -> Option<Reference> {
    let url = Url::parse(link.trim()).ok()?;
    if !url.host_str()?.ends_with("identifiers.org") {
        return None;
    }
    let path = url.path().trim_start_matches('/');
    let (prefix, identifier) = match path.split_once('/') {
        Some((prefix, identifier)) => (prefix, identifier),
        None => path.split_once(':')?,
    };
    Reference::new(normalize_prefix(prefix), identifier).ok()
}

/// Map identifiers.org collection names onto the prefixes used for terms
fn normalize_prefix(prefix: &str) -> String {
    match prefix.to_lowercase().as_str() {
        "ec-code" | "ec" => "eccode".to_string(),
        other => other.to_string(),
    }
}

/// Parse a `DB: url; url; DB2: url` links column
///
/// Links whose prefix appears in `property_map` become object annotations
/// with the mapped typedef; everything else becomes an xref. Links that are
/// not identifiers.org URLs are skipped with a warning.
pub(crate) fn annotate_database_links(
    term: &mut Term,
    database_links: Option<&str>,
    property_map: &[(&str, &TypeDef)],
) {
    for part in split_list(database_links) {
        let link = match part.split_once(": ") {
            Some((_, link)) if !part.starts_with("http") => link,
            _ => part,
        };
        let Some(reference) = parse_identifiers_url(link) else {
            warn!(term = %term.curie(), link, "Skipping unparseable database link");
            continue;
        };
        let typedef = property_map
            .iter()
            .find(|(prefix, _)| *prefix == reference.prefix())
            .map(|(_, typedef)| *typedef);
        match typedef {
            Some(typedef) => {
                if let Err(e) = term.annotate_object(typedef, reference) {
                    warn!(term = %term.curie(), error = %e, "Failed to annotate database link");
                }
            },
            None => {
                term.append_xref(reference);
            },
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use obo_common::typedef::ENABLED_BY;

    #[test]
    fn test_split_list() {
        assert_eq!(split_list(Some("a; b;;c ")), vec!["a", "b", "c"]);
        assert!(split_list(None).is_empty());
    }

    #[test]
    fn test_parse_identifiers_url() {
        let reference = parse_identifiers_url("http://identifiers.org/ec-code/1.1.1.1").unwrap();
        assert_eq!(reference.curie(), "eccode:1.1.1.1");

        let reference =
            parse_identifiers_url("http://identifiers.org/kegg.reaction/R00754").unwrap();
        assert_eq!(reference.curie(), "kegg.reaction:R00754");

        let reference =
            parse_identifiers_url("http://identifiers.org/biocyc/META:ALCOHOL-DEHYDROG-RXN")
                .unwrap();
        assert_eq!(reference.prefix(), "biocyc");
        assert_eq!(reference.identifier(), "META:ALCOHOL-DEHYDROG-RXN");

        let reference = parse_identifiers_url("https://identifiers.org/rhea:10736").unwrap();
        assert_eq!(reference.curie(), "rhea:10736");

        assert!(parse_identifiers_url("http://example.org/rhea/1").is_none());
        assert!(parse_identifiers_url("not a url").is_none());
    }

    #[test]
    fn test_annotate_database_links() {
        let mut term = Term::from_triple("bigg.reaction", "ADH", None).unwrap();
        annotate_database_links(
            &mut term,
            Some(
                "KEGG Reaction: http://identifiers.org/kegg.reaction/R00754; \
                 EC Number: http://identifiers.org/ec-code/1.1.1.1; \
                 http://identifiers.org/ec-code/1.1.1.71; RHEA: garbage",
            ),
            &[("eccode", &*ENABLED_BY)],
        );
        let xrefs: Vec<String> = term.xrefs().map(|x| x.target.curie()).collect();
        assert_eq!(xrefs, vec!["kegg.reaction:R00754"]);
        let enzymes: Vec<String> = term
            .objects(&ENABLED_BY)
            .into_iter()
            .map(Reference::curie)
            .collect();
        assert_eq!(enzymes, vec!["eccode:1.1.1.1", "eccode:1.1.1.71"]);
    }

    #[test]
    fn test_annotate_models() {
        let mut term = Term::from_triple("bigg.reaction", "ADH", None).unwrap();
        annotate_models(&mut term, Some("iJO1366; e_coli_core; iJO1366"));
        assert_eq!(term.objects(&PARTICIPATES_IN).len(), 2);
    }
}
