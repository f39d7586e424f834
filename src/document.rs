//! JSON document shapes for manifests and taxonomies.
//!
//! # Manifest
//!
//! ```json
//! {
//!   "url": "https://raw.githubusercontent.com/MISP/misp-taxonomies/main/",
//!   "version": "20240101",
//!   "license": "CC-0",
//!   "description": "Manifest file of MISP taxonomies available.",
//!   "path": "machinetag.json",
//!   "taxonomies": [
//!     {"name": "tlp", "description": "The Traffic Light Protocol", "version": 5}
//!   ]
//! }
//! ```
//!
//! # Taxonomy
//!
//! ```json
//! {
//!   "namespace": "tlp",
//!   "description": "The Traffic Light Protocol",
//!   "version": 5,
//!   "exclusive": true,
//!   "predicates": [
//!     {"value": "red", "expanded": "(TLP:RED) Not for disclosure", "colour": "#CC0033"}
//!   ]
//! }
//! ```
//!
//! Optional fields that are missing, `null` or empty are accepted on input
//! and left out on output.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::Entry;

/// An opaque version token, carried through as written.
///
/// Published taxonomies use integers, manifests use date strings. Any other
/// JSON value, `null` included, is kept as [`Version::Other`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Version {
    /// An integer version, e.g. `5`.
    Integer(i64),
    /// A fractional version, e.g. `1.5`.
    Float(f64),
    /// A textual version, e.g. `"20240101"`.
    Text(String),
    /// Any other JSON value, kept verbatim.
    Other(Value),
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Version::Integer(v) => write!(f, "{}", v),
            Version::Float(v) => write!(f, "{}", v),
            Version::Text(v) => write!(f, "{}", v),
            Version::Other(v) => write!(f, "{}", v),
        }
    }
}

impl Default for Version {
    fn default() -> Self { Version::Text(String::new()) }
}

/// A numerical weight attached to a predicate or an entry.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NumericalValue {
    /// A whole number, e.g. `100`.
    Integer(i64),
    /// A fractional number, e.g. `0.5`.
    Float(f64),
}

impl fmt::Display for NumericalValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NumericalValue::Integer(v) => write!(f, "{}", v),
            NumericalValue::Float(v) => write!(f, "{}", v),
        }
    }
}

/// True if an optional string is missing or empty.
pub(crate) fn is_blank(field: &Option<String>) -> bool {
    field.as_deref().is_none_or(str::is_empty)
}

/// Reads an optional string, treating `""` like a missing field.
pub(crate) fn blank_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(present(Option::<String>::deserialize(deserializer)?))
}

/// Drops an empty string.
pub(crate) fn present(field: Option<String>) -> Option<String> {
    field.filter(|value| !value.is_empty())
}

/// A predicate as it appears in the `predicates` list.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PredicateDocument {
    /// The predicate key, the part of a machinetag between `:` and `=`.
    pub value: String,
    /// A human-readable label.
    #[serde(default, deserialize_with = "blank_as_none", skip_serializing_if = "is_blank")]
    pub expanded: Option<String>,
    /// A longer description of the predicate.
    #[serde(default, deserialize_with = "blank_as_none", skip_serializing_if = "is_blank")]
    pub description: Option<String>,
    /// A display colour, usually `#RRGGBB`.
    #[serde(default, deserialize_with = "blank_as_none", skip_serializing_if = "is_blank")]
    pub colour: Option<String>,
    /// Whether at most one entry of this predicate may be applied at once.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclusive: Option<bool>,
    /// A numerical weight for the predicate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub numerical_value: Option<NumericalValue>,
}

/// A block of the `values` list: the entries of one predicate.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ValuesBlock {
    /// The value of the predicate owning these entries.
    pub predicate: String,
    /// The entries, in document order.
    pub entry: Vec<Entry>,
}

/// A complete taxonomy document.
///
/// This is the form [`Taxonomy::to_document`](crate::Taxonomy::to_document)
/// produces; reading a document goes through [`Taxonomy::from_json`](crate::Taxonomy::from_json),
/// which tolerates the irregularities of published files.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TaxonomyDocument {
    /// The taxonomy name, the part of a machinetag before `:`.
    pub namespace: String,
    /// What the taxonomy classifies.
    pub description: String,
    /// The taxonomy's own version.
    pub version: Version,
    /// A human-readable name for the taxonomy.
    #[serde(default, deserialize_with = "blank_as_none", skip_serializing_if = "is_blank")]
    pub expanded: Option<String>,
    /// Reference URLs.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub refs: Vec<String>,
    /// What the taxonomy applies to (the `type` field).
    #[serde(
        rename = "type",
        default,
        deserialize_with = "blank_as_none",
        skip_serializing_if = "is_blank"
    )]
    pub kind: Option<String>,
    /// Whether at most one predicate of this taxonomy may be applied at once.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclusive: Option<bool>,
    /// The predicates, in document order.
    pub predicates: Vec<PredicateDocument>,
    /// The entries of each predicate that has any.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<ValuesBlock>,
}

/// The header of a taxonomy document as read from disk or network.
///
/// `predicates` and `values` stay untyped so that bare-string predicates and
/// a non-list `values` field can be skipped the way existing documents
/// expect.
#[derive(Debug, Deserialize)]
pub(crate) struct RawTaxonomyDocument {
    pub namespace: String,
    pub description: String,
    pub version: Version,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub expanded: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub refs: Vec<String>,
    #[serde(rename = "type", default, deserialize_with = "blank_as_none")]
    pub kind: Option<String>,
    #[serde(default)]
    pub exclusive: Option<bool>,
    pub predicates: Vec<Value>,
    #[serde(default)]
    pub values: Option<Value>,
}

/// A `values` block whose entries are not parsed yet.
#[derive(Debug, Deserialize)]
pub(crate) struct RawValuesBlock {
    pub predicate: String,
    #[serde(default)]
    pub entry: Vec<Value>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

/// A taxonomy listed in the manifest.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ManifestTaxonomy {
    /// The taxonomy's directory name, which must equal its namespace.
    pub name: String,
    /// A summary of the taxonomy.
    #[serde(default, deserialize_with = "blank_as_none", skip_serializing_if = "is_blank")]
    pub description: Option<String>,
    /// The taxonomy version the manifest was generated from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<Version>,
}

/// Root structure of a `MANIFEST.json` file.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ManifestDocument {
    /// Base location of the taxonomy documents, used for remote manifests.
    #[serde(default, deserialize_with = "blank_as_none", skip_serializing_if = "is_blank")]
    pub url: Option<String>,
    /// The version of the taxonomy collection.
    pub version: Version,
    /// The license the taxonomies are published under.
    pub license: String,
    /// A summary of the collection.
    pub description: String,
    /// File name of each taxonomy document inside its taxonomy directory.
    pub path: String,
    /// The taxonomies to load, in order.
    pub taxonomies: Vec<ManifestTaxonomy>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_manifest() {
        let json = r#"{
            "url": "https://example.com/taxonomies/",
            "version": "20240101",
            "license": "CC-0",
            "description": "Test manifest",
            "path": "machinetag.json",
            "taxonomies": [
                {"name": "tlp", "description": "Traffic Light Protocol", "version": 5},
                {"name": "admiralty-scale"}
            ]
        }"#;

        let manifest: ManifestDocument = serde_json::from_str(json).unwrap();
        assert_eq!(manifest.taxonomies.len(), 2);
        assert_eq!(manifest.taxonomies[0].name, "tlp");
        assert_eq!(manifest.taxonomies[0].version, Some(Version::Integer(5)));
        assert_eq!(manifest.version, Version::Text("20240101".into()));
        assert_eq!(manifest.path, "machinetag.json");
    }

    #[test]
    fn test_version_is_carried_as_written() {
        let versions: Vec<Version> =
            serde_json::from_str(r#"[3, 1.5, "2.0.1"]"#).unwrap();
        assert_eq!(versions[0], Version::Integer(3));
        assert_eq!(versions[1], Version::Float(1.5));
        assert_eq!(versions[2].to_string(), "2.0.1");
        assert_eq!(serde_json::to_string(&versions).unwrap(), r#"[3,1.5,"2.0.1"]"#);
    }

    #[test]
    fn test_unusual_version_is_kept() {
        let versions: Vec<Version> = serde_json::from_str(r#"[null, true, [1, 2]]"#).unwrap();
        assert_eq!(versions[0], Version::Other(Value::Null));
        assert_eq!(versions[1], Version::Other(Value::Bool(true)));
        assert_eq!(versions[2].to_string(), "[1,2]");
        assert_eq!(serde_json::to_string(&versions).unwrap(), "[null,true,[1,2]]");
    }

    #[test]
    fn test_blank_fields_are_omitted() {
        let predicate = PredicateDocument {
            value: "red".into(),
            expanded: Some(String::new()),
            description: None,
            colour: Some("#CC0033".into()),
            exclusive: Some(false),
            numerical_value: Some(NumericalValue::Integer(-2)),
        };
        let json = serde_json::to_value(&predicate).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "value": "red",
                "colour": "#CC0033",
                "exclusive": false,
                "numerical_value": -2
            })
        );
    }

    #[test]
    fn test_raw_document_tolerates_null_refs() {
        let raw: RawTaxonomyDocument = serde_json::from_value(serde_json::json!({
            "namespace": "x",
            "description": "d",
            "version": 1,
            "refs": null,
            "predicates": ["bare", {"value": "p"}]
        }))
        .unwrap();
        assert!(raw.refs.is_empty());
        assert_eq!(raw.predicates.len(), 2);
        assert!(raw.values.is_none());
    }
}
