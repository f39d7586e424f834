//! Error types for taxonomy loading and machinetag handling.
//!
//! Construction errors (`Schema`, `Duplicate*`, `Consistency`, transport
//! failures) abort the whole catalog build. `MachinetagFormat` and `Lookup`
//! are local to a single decode call.

use std::fmt;
use std::io;
use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

/// The level of a machinetag that failed to resolve.
///
/// Carried by [`Error::Lookup`] so callers can tell an unknown taxonomy from
/// an unknown predicate or entry inside a known one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Component {
    /// The taxonomy namespace, the part before `:`.
    Namespace,
    /// The predicate, between `:` and `=`.
    Predicate,
    /// The quoted entry after `=`.
    Entry,
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Component::Namespace => write!(f, "namespace"),
            Component::Predicate => write!(f, "predicate"),
            Component::Entry => write!(f, "entry"),
        }
    }
}

/// Errors that can occur when loading taxonomies or resolving machinetags.
#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    /// A document is missing a required field or has a field of the wrong
    /// type.
    #[error("{context} does not have the expected shape: {source}")]
    #[diagnostic(
        code(taxonomies::schema),
        help(
            "Taxonomy documents need `namespace`, `description`, `version` and \
             `predicates`; every predicate and entry needs a `value`."
        )
    )]
    Schema {
        /// What was being read, such as a manifest or a predicate.
        context: String,
        /// The underlying deserialization error.
        #[source]
        source: serde_json::Error,
    },

    #[error("predicate `{predicate}` is declared twice in taxonomy `{namespace}`")]
    #[diagnostic(code(taxonomies::duplicate_predicate))]
    /// Two predicates of one taxonomy share a value.
    DuplicatePredicate {
        /// The taxonomy being built.
        namespace: String,
        /// The repeated predicate value.
        predicate: String,
    },

    #[error("entry `{entry}` is declared twice for predicate `{namespace}:{predicate}`")]
    #[diagnostic(code(taxonomies::duplicate_entry))]
    /// Two entries of one predicate share a value.
    DuplicateEntry {
        /// The taxonomy being built.
        namespace: String,
        /// The predicate owning the entries.
        predicate: String,
        /// The repeated entry value.
        entry: String,
    },

    #[error("taxonomy `{name}` is listed twice")]
    #[diagnostic(code(taxonomies::duplicate_taxonomy))]
    /// Two taxonomies of one catalog share a namespace.
    DuplicateTaxonomy {
        /// The repeated name.
        name: String,
    },

    #[error(
        "the manifest lists taxonomy `{manifest_name}` but its document declares namespace `{namespace}`"
    )]
    #[diagnostic(
        code(taxonomies::consistency),
        help("Rename the manifest entry or the document's `namespace` so they agree.")
    )]
    /// A document's namespace differs from the name the manifest lists it
    /// under.
    Consistency {
        /// The name in the manifest.
        manifest_name: String,
        /// The namespace found in the document.
        namespace: String,
    },

    #[error("cannot fetch `{locator}`: remote loading is not available in this build")]
    #[diagnostic(
        code(taxonomies::dependency_unavailable),
        help("Rebuild with the `remote` feature, or point at a local manifest.")
    )]
    /// A remote document was requested from a build without the `remote`
    /// feature. Raised before any network access.
    DependencyUnavailable {
        /// The location that could not be fetched.
        locator: String,
    },

    #[error("`{machinetag}` is not a machinetag")]
    #[diagnostic(
        code(taxonomies::machinetag_format),
        help("Machinetags look like `namespace:predicate` or `namespace:predicate=\"entry\"`.")
    )]
    /// The text matches neither machinetag form.
    MachinetagFormat {
        /// The rejected text.
        machinetag: String,
    },

    #[error("unknown {component} `{key}`")]
    #[diagnostic(code(taxonomies::lookup))]
    /// A machinetag is well formed but names something the catalog lacks.
    Lookup {
        /// The first level that failed to resolve.
        component: Component,
        /// The unresolved key at that level.
        key: String,
    },

    #[error("cannot read {}", .path.display())]
    #[diagnostic(code(taxonomies::io))]
    /// A local document could not be read.
    Io {
        /// The file that could not be read.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },

    #[error("invalid JSON in {locator}")]
    #[diagnostic(code(taxonomies::json))]
    /// A document was read but is not valid JSON.
    Json {
        /// Where the document came from.
        locator: String,
        /// The underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to fetch {url}: {message}")]
    #[diagnostic(code(taxonomies::fetch))]
    /// A remote document could not be fetched.
    Fetch {
        /// The requested URL.
        url: String,
        /// What went wrong, as reported by the HTTP client.
        message: String,
    },

    #[error("taxonomy `{namespace}` violates the schema: {}", .violations.join("; "))]
    #[diagnostic(code(taxonomies::schema_violation))]
    /// A taxonomy document does not conform to a JSON schema.
    SchemaViolation {
        /// The offending taxonomy.
        namespace: String,
        /// One `instance_path: message` line per violation.
        violations: Vec<String>,
    },

    #[error("invalid JSON schema: {message}")]
    #[diagnostic(code(taxonomies::invalid_schema))]
    /// The JSON schema itself could not be compiled.
    InvalidSchema {
        /// The compiler's message.
        message: String,
    },
}

impl Error {
    pub(crate) fn lookup(component: Component, key: &str) -> Self {
        Error::Lookup {
            component,
            key: key.to_string(),
        }
    }
}

/// A `Result` with this crate's [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_message_names_component() {
        let err = Error::lookup(Component::Predicate, "white");
        assert_eq!(err.to_string(), "unknown predicate `white`");
    }

    #[test]
    fn test_schema_violation_joins_messages() {
        let err = Error::SchemaViolation {
            namespace: "tlp".into(),
            violations: vec!["/a: bad".into(), "/b: worse".into()],
        };
        assert_eq!(
            err.to_string(),
            "taxonomy `tlp` violates the schema: /a: bad; /b: worse"
        );
    }
}
