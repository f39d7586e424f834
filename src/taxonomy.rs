use std::collections::HashMap;
use std::fmt::{Display, Formatter};

use serde_json::Value;

use crate::{
    Entry, Error, Keyed, KeyedCollection, KeyedStore, Predicate, PredicateDocument,
    Result, TaxonomyDocument, ValuesBlock, Version,
    document::{RawTaxonomyDocument, RawValuesBlock},
    machinetag,
};

/// A namespace of predicates and entries.
///
/// A `Taxonomy` is built once from its JSON document and is immutable
/// afterwards. It owns its predicates, keyed by [`Predicate::value`], in the
/// order the document lists them.
///
/// # Examples
///
/// ```
/// use misp_taxonomies::Taxonomy;
///
/// let tlp = Taxonomy::from_json(
///     r#"{
///         "namespace": "tlp",
///         "description": "Traffic Light Protocol",
///         "version": 5,
///         "predicates": [{"value": "white"}, {"value": "red"}]
///     }"#,
/// )
/// .unwrap();
///
/// assert_eq!(tlp.machinetags(), ["tlp:white", "tlp:red"]);
/// assert!(!tlp.has_entries());
/// assert_eq!(tlp.amount_entries(), 2);
/// ```
#[derive(Clone, Debug)]
pub struct Taxonomy {
    /// The namespace, unique within a catalog.
    name: String,
    description: String,
    version: Version,
    expanded: Option<String>,
    refs: Vec<String>,
    kind: Option<String>,
    exclusive: Option<bool>,
    predicates: KeyedStore<Predicate>,
    /// The document this taxonomy was built from, kept for schema validation.
    #[cfg(feature = "schema-validation")]
    source: Value,
}

impl Taxonomy {
    /// Builds a taxonomy from a decoded JSON document.
    ///
    /// The `values` blocks are first grouped by predicate, accumulating
    /// blocks that name the same predicate. Each declared predicate then
    /// receives its group of entries, or none. Blocks naming an undeclared
    /// predicate are dropped.
    ///
    /// # Errors
    ///
    /// - [`Error::Schema`] if a required field is missing or mistyped.
    /// - [`Error::DuplicatePredicate`] / [`Error::DuplicateEntry`] if two
    ///   predicates, or two entries of one predicate, share a value.
    pub fn from_value(value: Value) -> Result<Self> {
        #[cfg(feature = "schema-validation")]
        let source = value.clone();
        let raw: RawTaxonomyDocument =
            serde_json::from_value(value).map_err(|source| Error::Schema {
                context: "taxonomy document".to_string(),
                source,
            })?;

        let mut entries_by_predicate = group_values(&raw.namespace, raw.values)?;

        let mut predicates = KeyedStore::new();
        for (index, item) in raw.predicates.into_iter().enumerate() {
            if item.is_string() {
                continue;
            }
            let document: PredicateDocument =
                serde_json::from_value(item).map_err(|source| Error::Schema {
                    context: format!("predicate #{} of `{}`", index, raw.namespace),
                    source,
                })?;
            let entries = entries_by_predicate
                .remove(&document.value)
                .unwrap_or_default();
            let predicate_value = document.value.clone();
            let predicate = Predicate::new(document, entries).map_err(|entry| {
                Error::DuplicateEntry {
                    namespace: raw.namespace.clone(),
                    predicate: predicate_value,
                    entry: entry.value().to_string(),
                }
            })?;
            predicates.try_insert(predicate).map_err(|predicate| {
                Error::DuplicatePredicate {
                    namespace: raw.namespace.clone(),
                    predicate: predicate.value().to_string(),
                }
            })?;
        }

        for orphan in entries_by_predicate.keys() {
            tracing::debug!(
                namespace = %raw.namespace,
                predicate = %orphan,
                "dropping values for undeclared predicate"
            );
        }

        Ok(Self {
            name: raw.namespace,
            description: raw.description,
            version: raw.version,
            expanded: raw.expanded,
            refs: raw.refs,
            kind: raw.kind,
            exclusive: raw.exclusive,
            predicates,
            #[cfg(feature = "schema-validation")]
            source,
        })
    }

    /// Parses a JSON string and builds a taxonomy with
    /// [`Taxonomy::from_value`].
    ///
    /// Fails with [`Error::Json`] if the text is not JSON at all.
    pub fn from_json(json: &str) -> Result<Self> {
        let value = serde_json::from_str(json).map_err(|source| Error::Json {
            locator: "taxonomy document".to_string(),
            source,
        })?;
        Self::from_value(value)
    }

    /// The namespace of this taxonomy.
    pub fn name(&self) -> &str { &self.name }

    /// What the taxonomy classifies.
    pub fn description(&self) -> &str { &self.description }

    /// The version token, as written in the document.
    pub fn version(&self) -> &Version { &self.version }

    /// A human-readable name, if the document gives one.
    pub fn expanded(&self) -> Option<&str> { self.expanded.as_deref() }

    /// Reference URLs, possibly empty.
    pub fn refs(&self) -> &[String] { &self.refs }

    /// The freeform `type` of the taxonomy.
    pub fn kind(&self) -> Option<&str> { self.kind.as_deref() }

    /// Whether at most one predicate should be applied at once.
    pub fn exclusive(&self) -> Option<bool> { self.exclusive }

    /// The JSON document this taxonomy was built from.
    #[cfg(feature = "schema-validation")]
    pub fn source_document(&self) -> &Value { &self.source }

    /// Returns true if at least one predicate owns at least one entry.
    pub fn has_entries(&self) -> bool {
        self.predicates.values().any(|predicate| !predicate.is_flag())
    }

    /// The number of entries across all predicates, or the number of
    /// predicates when no predicate has entries.
    pub fn amount_entries(&self) -> usize {
        if self.has_entries() {
            self.predicates.values().map(|predicate| predicate.len()).sum()
        } else {
            self.predicates.len()
        }
    }

    /// Encodes a machinetag in this taxonomy's namespace.
    ///
    /// The components are not checked against the taxonomy; see
    /// [`make_machinetag`](crate::make_machinetag).
    pub fn make_machinetag(&self, predicate: &str, entry: Option<&str>) -> String {
        machinetag::make_machinetag(&self.name, predicate, entry)
    }

    /// Every machinetag this taxonomy can produce, in document order.
    ///
    /// Flag predicates yield `namespace:predicate`; predicates with entries
    /// yield one `namespace:predicate="entry"` per entry.
    pub fn machinetags(&self) -> Vec<String> { self.render(Entry::value) }

    /// Like [`Taxonomy::machinetags`], with each entry's expanded label in
    /// place of its value.
    pub fn machinetags_expanded(&self) -> Vec<String> { self.render(Entry::label) }

    fn render(&self, label: fn(&Entry) -> &str) -> Vec<String> {
        let mut machinetags = Vec::with_capacity(self.amount_entries());
        for predicate in self.predicates.values() {
            if predicate.is_flag() {
                machinetags.push(self.make_machinetag(predicate.value(), None));
            } else {
                machinetags.extend(predicate.values().map(|entry| {
                    self.make_machinetag(predicate.value(), Some(label(entry)))
                }));
            }
        }
        machinetags
    }

    /// Exports this taxonomy in document form.
    ///
    /// Entries move back into `values` blocks, one block per predicate with
    /// entries. Absent and empty optional fields are left out on
    /// serialization.
    pub fn to_document(&self) -> TaxonomyDocument {
        TaxonomyDocument {
            namespace: self.name.clone(),
            description: self.description.clone(),
            version: self.version.clone(),
            expanded: self.expanded.clone(),
            refs: self.refs.clone(),
            kind: self.kind.clone(),
            exclusive: self.exclusive,
            predicates: self.predicates.values().map(Predicate::to_document).collect(),
            values: self
                .predicates
                .values()
                .filter(|predicate| !predicate.is_flag())
                .map(|predicate| ValuesBlock {
                    predicate: predicate.value().to_string(),
                    entry: predicate.values().cloned().collect(),
                })
                .collect(),
        }
    }

    /// Exports this taxonomy as a JSON value. See [`Taxonomy::to_document`].
    pub fn to_value(&self) -> Result<Value> {
        serde_json::to_value(self.to_document()).map_err(|source| Error::Json {
            locator: format!("taxonomy `{}`", self.name),
            source,
        })
    }

    /// Exports this taxonomy as a compact JSON string.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(&self.to_document()).map_err(|source| Error::Json {
            locator: format!("taxonomy `{}`", self.name),
            source,
        })
    }

    /// Validates the source document against a JSON schema.
    ///
    /// Fails with [`Error::SchemaViolation`] listing every violation, or
    /// [`Error::InvalidSchema`] if `schema` does not compile.
    #[cfg(feature = "schema-validation")]
    pub fn validate_with_schema(&self, schema: &Value) -> Result<()> {
        crate::schema::validate(&self.name, &self.source, schema)
    }
}

/// Groups the `values` blocks of a document by predicate.
fn group_values(
    namespace: &str,
    values: Option<Value>,
) -> Result<HashMap<String, Vec<Entry>>> {
    let mut entries_by_predicate: HashMap<String, Vec<Entry>> = HashMap::new();
    let Some(Value::Array(blocks)) = values else {
        return Ok(entries_by_predicate);
    };
    for (index, block) in blocks.into_iter().enumerate() {
        let block: RawValuesBlock =
            serde_json::from_value(block).map_err(|source| Error::Schema {
                context: format!("values block #{} of `{}`", index, namespace),
                source,
            })?;
        let group = entries_by_predicate.entry(block.predicate).or_default();
        for entry in block.entry {
            let entry: Entry = serde_json::from_value(entry).map_err(|source| {
                Error::Schema {
                    context: format!("an entry in values block #{} of `{}`", index, namespace),
                    source,
                }
            })?;
            group.push(entry);
        }
    }
    Ok(entries_by_predicate)
}

impl Keyed for Taxonomy {
    fn key(&self) -> &str { &self.name }
}

impl KeyedCollection for Taxonomy {
    type Item = Predicate;

    fn store(&self) -> &KeyedStore<Predicate> { &self.predicates }
}

impl PartialEq for Taxonomy {
    /// Taxonomies are equal when their content is, whatever document
    /// layout they were read from.
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.description == other.description
            && self.version == other.version
            && self.expanded == other.expanded
            && self.refs == other.refs
            && self.kind == other.kind
            && self.exclusive == other.exclusive
            && self.predicates == other.predicates
    }
}

impl Display for Taxonomy {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.machinetags().join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::NumericalValue;

    fn tlp() -> Taxonomy {
        Taxonomy::from_value(json!({
            "namespace": "tlp",
            "description": "The Traffic Light Protocol",
            "version": 5,
            "expanded": "Traffic Light Protocol",
            "refs": ["https://www.first.org/tlp/"],
            "exclusive": true,
            "predicates": [
                {"value": "white", "colour": "#ffffff"},
                {"value": "tlp", "expanded": "TLP level"},
                {"value": "red", "numerical_value": 90}
            ],
            "values": [
                {"predicate": "tlp", "entry": [
                    {"value": "amber", "expanded": "Amber TLP"}
                ]},
                {"predicate": "tlp", "entry": [
                    {"value": "green"}
                ]}
            ]
        }))
        .unwrap()
    }

    #[test]
    fn test_flag_taxonomy_machinetags() {
        let taxonomy = Taxonomy::from_value(json!({
            "namespace": "tlp",
            "description": "d",
            "version": 1,
            "predicates": [{"value": "white"}, {"value": "red"}]
        }))
        .unwrap();
        assert_eq!(taxonomy.machinetags(), ["tlp:white", "tlp:red"]);
        assert_eq!(taxonomy.machinetags_expanded(), ["tlp:white", "tlp:red"]);
        assert!(!taxonomy.has_entries());
        assert_eq!(taxonomy.amount_entries(), 2);
    }

    #[test]
    fn test_values_blocks_are_accumulated() {
        let taxonomy = tlp();
        let predicate = taxonomy.get("tlp").unwrap();
        assert_eq!(predicate.keys().collect::<Vec<_>>(), ["amber", "green"]);
        assert_eq!(
            taxonomy.machinetags(),
            ["tlp:white", "tlp:tlp=\"amber\"", "tlp:tlp=\"green\"", "tlp:red"]
        );
        assert_eq!(
            taxonomy.machinetags_expanded(),
            ["tlp:white", "tlp:tlp=\"Amber TLP\"", "tlp:tlp=\"green\"", "tlp:red"]
        );
    }

    #[test]
    fn test_amount_entries_counts_entries_only() {
        let taxonomy = tlp();
        assert!(taxonomy.has_entries());
        assert_eq!(taxonomy.amount_entries(), 2);
    }

    #[test]
    fn test_metadata_is_carried() {
        let taxonomy = tlp();
        assert_eq!(taxonomy.name(), "tlp");
        assert_eq!(taxonomy.version(), &Version::Integer(5));
        assert_eq!(taxonomy.expanded(), Some("Traffic Light Protocol"));
        assert_eq!(taxonomy.refs(), ["https://www.first.org/tlp/"]);
        assert_eq!(taxonomy.exclusive(), Some(true));
        assert_eq!(
            taxonomy.get("red").unwrap().numerical_value(),
            Some(NumericalValue::Integer(90))
        );
        assert_eq!(taxonomy.get("white").unwrap().colour(), Some("#ffffff"));
    }

    #[test]
    fn test_missing_required_field() {
        for field in ["namespace", "description", "version", "predicates"] {
            let mut document = json!({
                "namespace": "x",
                "description": "d",
                "version": 1,
                "predicates": []
            });
            document.as_object_mut().unwrap().remove(field);
            let err = Taxonomy::from_value(document).unwrap_err();
            assert!(matches!(err, Error::Schema { .. }), "{}: {:?}", field, err);
            assert!(err.to_string().contains(field), "{}", err);
        }
    }

    #[test]
    fn test_predicate_without_value() {
        let err = Taxonomy::from_value(json!({
            "namespace": "x",
            "description": "d",
            "version": 1,
            "predicates": [{"expanded": "nameless"}]
        }))
        .unwrap_err();
        assert!(matches!(err, Error::Schema { .. }));
    }

    #[test]
    fn test_entry_without_value() {
        let err = Taxonomy::from_value(json!({
            "namespace": "x",
            "description": "d",
            "version": 1,
            "predicates": [{"value": "p"}],
            "values": [{"predicate": "p", "entry": [{"expanded": "nameless"}]}]
        }))
        .unwrap_err();
        assert!(matches!(err, Error::Schema { .. }));
    }

    #[test]
    fn test_undeclared_predicate_values_are_dropped() {
        let taxonomy = Taxonomy::from_value(json!({
            "namespace": "x",
            "description": "d",
            "version": 1,
            "predicates": [{"value": "p"}],
            "values": [{"predicate": "q", "entry": [{"value": "e"}]}]
        }))
        .unwrap();
        assert_eq!(taxonomy.machinetags(), ["x:p"]);
        assert!(!taxonomy.has_entries());
    }

    #[test]
    fn test_duplicate_entry_is_an_error() {
        let err = Taxonomy::from_value(json!({
            "namespace": "x",
            "description": "d",
            "version": 1,
            "predicates": [{"value": "p"}],
            "values": [
                {"predicate": "p", "entry": [{"value": "e"}]},
                {"predicate": "p", "entry": [{"value": "e", "expanded": "again"}]}
            ]
        }))
        .unwrap_err();
        match err {
            Error::DuplicateEntry {
                namespace,
                predicate,
                entry,
            } => {
                assert_eq!(namespace, "x");
                assert_eq!(predicate, "p");
                assert_eq!(entry, "e");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_duplicate_predicate_is_an_error() {
        let err = Taxonomy::from_value(json!({
            "namespace": "x",
            "description": "d",
            "version": 1,
            "predicates": [{"value": "p"}, {"value": "p"}]
        }))
        .unwrap_err();
        assert!(matches!(err, Error::DuplicatePredicate { .. }));
    }

    #[test]
    fn test_bare_string_predicates_and_odd_values_are_skipped() {
        let taxonomy = Taxonomy::from_value(json!({
            "namespace": "x",
            "description": "d",
            "version": "1.0",
            "predicates": ["legacy", {"value": "p"}],
            "values": {"not": "a list"}
        }))
        .unwrap();
        assert_eq!(taxonomy.machinetags(), ["x:p"]);
    }

    #[test]
    fn test_null_version_is_carried_through() {
        let taxonomy = Taxonomy::from_value(json!({
            "namespace": "x",
            "description": "d",
            "version": null,
            "predicates": [{"value": "p"}]
        }))
        .unwrap();
        assert_eq!(taxonomy.version(), &Version::Other(Value::Null));
        assert_eq!(taxonomy.to_value().unwrap()["version"], Value::Null);
        assert_eq!(
            Taxonomy::from_value(taxonomy.to_value().unwrap()).unwrap(),
            taxonomy
        );
    }

    #[test]
    fn test_document_round_trip() {
        let taxonomy = tlp();
        let again = Taxonomy::from_value(taxonomy.to_value().unwrap()).unwrap();
        assert_eq!(again, taxonomy);
        assert_eq!(again.machinetags(), taxonomy.machinetags());
    }

    #[test]
    fn test_export_drops_blank_fields() {
        let taxonomy = Taxonomy::from_value(json!({
            "namespace": "x",
            "description": "d",
            "version": 1,
            "expanded": "",
            "refs": [],
            "type": null,
            "predicates": [{"value": "p", "colour": "", "description": null}]
        }))
        .unwrap();
        assert_eq!(
            taxonomy.to_value().unwrap(),
            json!({
                "namespace": "x",
                "description": "d",
                "version": 1,
                "predicates": [{"value": "p"}]
            })
        );
    }

    #[test]
    fn test_display_lists_machinetags() {
        let taxonomy = tlp();
        assert_eq!(
            taxonomy.to_string(),
            "tlp:white\ntlp:tlp=\"amber\"\ntlp:tlp=\"green\"\ntlp:red"
        );
    }
}
