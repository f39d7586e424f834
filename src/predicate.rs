use std::fmt::{Display, Formatter};

use crate::{
    Entry, Keyed, KeyedCollection, KeyedStore, NumericalValue, PredicateDocument,
};

/// A named classifier within a taxonomy.
///
/// A `Predicate` owns zero or more [`Entry`] values, keyed by
/// [`Entry::value`]. A predicate without entries is a *flag*: it renders as
/// `namespace:predicate` rather than `namespace:predicate="entry"`.
///
/// `exclusive` states that at most one entry of the predicate should be
/// attached to a tagged object. It is carried as information only.
#[derive(Clone, Debug, PartialEq)]
pub struct Predicate {
    /// The key, unique within the owning taxonomy.
    value: String,
    expanded: Option<String>,
    description: Option<String>,
    colour: Option<String>,
    exclusive: Option<bool>,
    numerical_value: Option<NumericalValue>,
    /// Entries in document order.
    entries: KeyedStore<Entry>,
}

impl Predicate {
    /// Builds a predicate and attaches its entries.
    ///
    /// Returns the rejected entry if two entries share a value.
    pub(crate) fn new<T>(document: PredicateDocument, entries: T) -> Result<Self, Entry>
    where
        T: IntoIterator<Item = Entry>,
    {
        let mut store = KeyedStore::new();
        for entry in entries {
            store.try_insert(entry)?;
        }
        Ok(Self {
            value: document.value,
            expanded: document.expanded,
            description: document.description,
            colour: document.colour,
            exclusive: document.exclusive,
            numerical_value: document.numerical_value,
            entries: store,
        })
    }

    /// The key of this predicate, the part of a machinetag between `:` and
    /// `=`.
    pub fn value(&self) -> &str { &self.value }

    /// The human-readable label, if any.
    pub fn expanded(&self) -> Option<&str> { self.expanded.as_deref() }

    /// A longer description of the predicate.
    pub fn description(&self) -> Option<&str> { self.description.as_deref() }

    /// The display colour, usually `#RRGGBB`.
    pub fn colour(&self) -> Option<&str> { self.colour.as_deref() }

    /// Whether at most one entry should be applied at once.
    pub fn exclusive(&self) -> Option<bool> { self.exclusive }

    /// The numerical weight, if any.
    pub fn numerical_value(&self) -> Option<NumericalValue> { self.numerical_value }

    /// Returns true if this predicate has no entries.
    pub fn is_flag(&self) -> bool { self.entries.is_empty() }

    /// The `predicates` item describing this predicate, without its entries.
    pub fn to_document(&self) -> PredicateDocument {
        PredicateDocument {
            value: self.value.clone(),
            expanded: self.expanded.clone(),
            description: self.description.clone(),
            colour: self.colour.clone(),
            exclusive: self.exclusive,
            numerical_value: self.numerical_value,
        }
    }
}

impl Keyed for Predicate {
    fn key(&self) -> &str { &self.value }
}

impl KeyedCollection for Predicate {
    type Item = Entry;

    fn store(&self) -> &KeyedStore<Entry> { &self.entries }
}

impl Display for Predicate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn document(value: &str) -> PredicateDocument {
        serde_json::from_value(serde_json::json!({ "value": value })).unwrap()
    }

    #[test]
    fn test_flag_predicate() {
        let predicate = Predicate::new(document("white"), []).unwrap();
        assert!(predicate.is_flag());
        assert_eq!(predicate.len(), 0);
        assert_eq!(predicate.to_string(), "white");
    }

    #[test]
    fn test_entries_are_keyed_by_value() {
        let predicate = Predicate::new(
            document("tlp"),
            [Entry::new("amber"), Entry::new("red").with_expanded("TLP:RED")],
        )
        .unwrap();
        assert!(!predicate.is_flag());
        assert_eq!(predicate.keys().collect::<Vec<_>>(), ["amber", "red"]);
        assert_eq!(predicate.get("red").unwrap().expanded(), Some("TLP:RED"));
        assert!(!predicate.contains_key("green"));
    }

    #[test]
    fn test_duplicate_entry_is_rejected() {
        let rejected = Predicate::new(
            document("tlp"),
            [Entry::new("amber"), Entry::new("amber").with_expanded("again")],
        )
        .unwrap_err();
        assert_eq!(rejected.value(), "amber");
        assert_eq!(rejected.expanded(), Some("again"));
    }

    #[test]
    fn test_to_document_omits_entries() {
        let predicate = Predicate::new(document("tlp"), [Entry::new("amber")]).unwrap();
        assert_eq!(predicate.to_document(), document("tlp"));
    }
}
