//! The machinetag grammar.
//!
//! A machinetag is the canonical text form of a taxonomy tag:
//!
//! - flag form: `namespace:predicate`
//! - valued form: `namespace:predicate="entry"`
//!
//! Components are written as-is. A component containing `:`, `=` or `"`
//! cannot be represented and will not parse back to the same parts.

use std::sync::LazyLock;

use regex::Regex;

use crate::{Entry, Error, Predicate, Result, Taxonomy};

static VALUED_FORM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^([^:]*):([^=]*)="([^"]*)"$"#).expect("valid machinetag pattern")
});

static FLAG_FORM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([^:]*):([^=]*)$").expect("valid machinetag pattern")
});

/// Renders a machinetag from its parts.
///
/// # Examples
///
/// ```
/// use misp_taxonomies::make_machinetag;
///
/// assert_eq!(make_machinetag("tlp", "white", None), "tlp:white");
/// assert_eq!(make_machinetag("tlp", "tlp", Some("amber")), r#"tlp:tlp="amber""#);
/// ```
pub fn make_machinetag(namespace: &str, predicate: &str, entry: Option<&str>) -> String {
    match entry {
        Some(entry) => format!("{}:{}=\"{}\"", namespace, predicate, entry),
        None => format!("{}:{}", namespace, predicate),
    }
}

/// The textual parts of a machinetag.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MachinetagParts<'a> {
    pub namespace: &'a str,
    pub predicate: &'a str,
    /// The quoted entry. An empty quoted entry is reported as `None`.
    pub entry: Option<&'a str>,
}

/// Splits a machinetag into its parts.
///
/// Input containing `=` must match the valued form, anything else the flag
/// form. Fails with [`Error::MachinetagFormat`] otherwise.
pub fn parse(machinetag: &str) -> Result<MachinetagParts<'_>> {
    let malformed = || Error::MachinetagFormat {
        machinetag: machinetag.to_string(),
    };
    if machinetag.contains('=') {
        let captures = VALUED_FORM.captures(machinetag).ok_or_else(malformed)?;
        let (_, [namespace, predicate, entry]) = captures.extract();
        Ok(MachinetagParts {
            namespace,
            predicate,
            entry: Some(entry).filter(|entry| !entry.is_empty()),
        })
    } else {
        let captures = FLAG_FORM.captures(machinetag).ok_or_else(malformed)?;
        let (_, [namespace, predicate]) = captures.extract();
        Ok(MachinetagParts {
            namespace,
            predicate,
            entry: None,
        })
    }
}

/// The components of a machinetag, as used for searching.
///
/// Splits on `:`, `=` and `"`, dropping empty pieces.
pub fn tokens(machinetag: &str) -> impl Iterator<Item = &str> {
    machinetag
        .split([':', '=', '"'])
        .filter(|token| !token.is_empty())
}

/// A machinetag resolved against a catalog.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Resolved<'a> {
    pub taxonomy: &'a Taxonomy,
    pub predicate: &'a Predicate,
    /// `None` for flag machinetags.
    pub entry: Option<&'a Entry>,
}

impl Resolved<'_> {
    /// Renders the machinetag this resolution came from.
    pub fn machinetag(&self) -> String {
        self.taxonomy.make_machinetag(
            self.predicate.value(),
            self.entry.map(|entry| entry.value()),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flag_form() {
        let parts = parse("tlp:white").unwrap();
        assert_eq!(
            parts,
            MachinetagParts {
                namespace: "tlp",
                predicate: "white",
                entry: None,
            }
        );
    }

    #[test]
    fn test_parse_valued_form() {
        let parts = parse(r#"admiralty-scale:source-reliability="a""#).unwrap();
        assert_eq!(parts.namespace, "admiralty-scale");
        assert_eq!(parts.predicate, "source-reliability");
        assert_eq!(parts.entry, Some("a"));
    }

    #[test]
    fn test_parse_keeps_spaces_and_colons_in_entry() {
        let parts = parse(r#"ns:pred="Amber: limited disclosure""#).unwrap();
        assert_eq!(parts.entry, Some("Amber: limited disclosure"));
    }

    #[test]
    fn test_parse_empty_entry_is_flag() {
        let parts = parse(r#"ns:pred="""#).unwrap();
        assert_eq!(parts.entry, None);
    }

    #[test]
    fn test_parse_rejects_malformed_input() {
        for input in [
            "no-colon",
            "ns:pred=entry",
            r#"ns:pred="entry"#,
            r#"ns:pred="a"b""#,
            r#"ns:pred="entry" "#,
        ] {
            let err = parse(input).unwrap_err();
            assert!(
                matches!(err, Error::MachinetagFormat { ref machinetag } if machinetag == input),
                "{}: {:?}",
                input,
                err
            );
        }
    }

    #[test]
    fn test_make_then_parse() {
        let rendered = make_machinetag("ns", "pred", Some("entry"));
        assert_eq!(rendered, r#"ns:pred="entry""#);
        let parts = parse(&rendered).unwrap();
        assert_eq!(
            (parts.namespace, parts.predicate, parts.entry),
            ("ns", "pred", Some("entry"))
        );
    }

    #[test]
    fn test_tokens() {
        let found: Vec<_> = tokens(r#"tlp:tlp="amber""#).collect();
        assert_eq!(found, ["tlp", "tlp", "amber"]);
        let found: Vec<_> = tokens("ns:flag").collect();
        assert_eq!(found, ["ns", "flag"]);
    }
}
