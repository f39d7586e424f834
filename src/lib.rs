//! MISP taxonomies: load, render, search and resolve machinetags.
//!
//! A taxonomy is a three-level tree: a namespace owns predicates, and a
//! predicate owns optional entries. Each (namespace, predicate[, entry])
//! triple has a canonical text form, the *machinetag*:
//!
//! - `namespace:predicate` for a predicate without entries
//! - `namespace:predicate="entry"` for an entry
//!
//! # Basic Usage
//!
//! ```rust
//! use misp_taxonomies::{CatalogInfo, KeyedCollection, Taxonomy, TaxonomyCatalog};
//!
//! let tlp = Taxonomy::from_json(
//!     r#"{
//!         "namespace": "tlp",
//!         "description": "Traffic Light Protocol",
//!         "version": 5,
//!         "predicates": [{"value": "tlp"}],
//!         "values": [
//!             {"predicate": "tlp", "entry": [{"value": "amber", "expanded": "Amber TLP"}]}
//!         ]
//!     }"#,
//! )
//! .unwrap();
//!
//! assert_eq!(tlp.machinetags(), [r#"tlp:tlp="amber""#]);
//! assert_eq!(tlp.machinetags_expanded(), [r#"tlp:tlp="Amber TLP""#]);
//!
//! let catalog = TaxonomyCatalog::from_taxonomies(CatalogInfo::default(), [tlp]).unwrap();
//! let resolved = catalog.revert_machinetag(r#"tlp:tlp="amber""#).unwrap();
//! assert_eq!(resolved.entry.unwrap().expanded(), Some("Amber TLP"));
//! assert_eq!(catalog.get("tlp").unwrap().len(), 1);
//! ```
//!
//! # Loading a Manifest
//!
//! A manifest lists taxonomies by name; each document is read from
//! `{base}/{name}/{path}` with the same transport as the manifest:
//!
//! ```rust,ignore
//! use misp_taxonomies::TaxonomyCatalog;
//!
//! // Local checkout of https://github.com/MISP/misp-taxonomies
//! let catalog = TaxonomyCatalog::from_manifest_path("misp-taxonomies/MANIFEST.json")?;
//!
//! // Or the published manifest (requires the `remote` feature, on by default)
//! let catalog = TaxonomyCatalog::load_default()?;
//!
//! for tag in catalog.search("phish") {
//!     println!("{tag}");
//! }
//! ```
//!
//! # Features
//!
//! - `remote` (default): fetch manifests and documents over HTTP(S). Without
//!   it, remote locations fail with [`Error::DependencyUnavailable`].
//! - `schema-validation`: validate raw taxonomy documents against a JSON
//!   schema with `validate_with_schema`.
//! - `cli` (default): the `misp-taxonomies` command-line tool.

mod error;
pub use error::{Component, Error, Result};

mod keyed;
pub use keyed::{Keyed, KeyedCollection, KeyedStore};

mod document;
pub use document::{
    ManifestDocument, ManifestTaxonomy, NumericalValue, PredicateDocument,
    TaxonomyDocument, ValuesBlock, Version,
};

mod entry;
pub use entry::Entry;

mod predicate;
pub use predicate::Predicate;

mod taxonomy;
pub use taxonomy::Taxonomy;

pub mod machinetag;
pub use machinetag::{MachinetagParts, Resolved, make_machinetag};

mod source;
pub use source::{DocumentSource, Locator};

mod config;
pub use config::{DEFAULT_MANIFEST_URL, MANIFEST_ENV_VAR, ManifestLocation};

mod catalog;
pub use catalog::{CatalogInfo, TaxonomyCatalog};

#[cfg(feature = "schema-validation")]
mod schema;
