use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::{
    Keyed, NumericalValue,
    document::{blank_as_none, is_blank, present},
};

/// A leaf value of a predicate.
///
/// An `Entry` is identified by its `value`, which is unique within its
/// predicate and is what appears between quotes in a machinetag such as
/// `tlp:tlp="amber"`. The remaining fields are display and export metadata.
///
/// # Examples
///
/// ```
/// use misp_taxonomies::Entry;
///
/// let entry: Entry = serde_json::from_str(
///     r#"{"value": "amber", "expanded": "TLP:AMBER", "colour": ""}"#,
/// )
/// .unwrap();
/// assert_eq!(entry.value(), "amber");
/// assert_eq!(entry.expanded(), Some("TLP:AMBER"));
///
/// // Empty optional fields are left out when exporting.
/// assert_eq!(
///     serde_json::to_string(&entry).unwrap(),
///     r#"{"value":"amber","expanded":"TLP:AMBER"}"#
/// );
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    /// The key, unique within the owning predicate.
    value: String,
    #[serde(default, deserialize_with = "blank_as_none", skip_serializing_if = "is_blank")]
    expanded: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none", skip_serializing_if = "is_blank")]
    colour: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none", skip_serializing_if = "is_blank")]
    description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    numerical_value: Option<NumericalValue>,
}

impl Entry {
    /// Creates an entry with no metadata.
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            expanded: None,
            colour: None,
            description: None,
            numerical_value: None,
        }
    }

    /// Sets the human-readable label. An empty label clears it.
    pub fn with_expanded(mut self, expanded: impl Into<String>) -> Self {
        self.expanded = present(Some(expanded.into()));
        self
    }

    /// Sets the display colour. An empty colour clears it.
    pub fn with_colour(mut self, colour: impl Into<String>) -> Self {
        self.colour = present(Some(colour.into()));
        self
    }

    /// Sets the description. An empty description clears it.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = present(Some(description.into()));
        self
    }

    /// Sets the numerical weight.
    pub fn with_numerical_value(mut self, numerical_value: NumericalValue) -> Self {
        self.numerical_value = Some(numerical_value);
        self
    }

    /// The key of this entry, as it appears between quotes in a machinetag.
    pub fn value(&self) -> &str { &self.value }

    /// The human-readable label, if one is set and non-empty.
    pub fn expanded(&self) -> Option<&str> { self.expanded.as_deref() }

    /// The display colour, usually `#RRGGBB`.
    pub fn colour(&self) -> Option<&str> { self.colour.as_deref() }

    /// A longer description of the entry.
    pub fn description(&self) -> Option<&str> { self.description.as_deref() }

    /// The numerical weight, if any.
    pub fn numerical_value(&self) -> Option<NumericalValue> { self.numerical_value }

    /// The label used in expanded machinetags: `expanded` when available,
    /// the raw value otherwise.
    pub fn label(&self) -> &str { self.expanded().unwrap_or(&self.value) }
}

impl Keyed for Entry {
    fn key(&self) -> &str { &self.value }
}

impl Display for Entry {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.value)
    }
}
