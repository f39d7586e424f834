use std::fmt::{Display, Formatter};
use std::path::Path;

#[cfg(feature = "schema-validation")]
use serde_json::Value;

use crate::{
    Component, Error, KeyedCollection, KeyedStore, Locator, ManifestDocument,
    ManifestLocation, Result, Taxonomy, Version,
    machinetag::{self, Resolved},
};

/// Metadata of a catalog, taken from its manifest.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CatalogInfo {
    /// The version of the taxonomy collection.
    pub version: Version,
    /// The license the taxonomies are published under.
    pub license: String,
    /// A summary of the collection.
    pub description: String,
    /// Where the taxonomy documents were resolved from, or `None` for a
    /// catalog assembled in memory.
    pub base_location: Option<Locator>,
}

/// The full collection of loaded taxonomies, keyed by namespace.
///
/// A catalog is built once, all or nothing: any failure while loading the
/// manifest or one of its taxonomies aborts construction. Once built it is
/// read-only and can be shared between threads freely.
///
/// # Examples
///
/// ```
/// use misp_taxonomies::{CatalogInfo, Taxonomy, TaxonomyCatalog};
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
/// let catalog = TaxonomyCatalog::from_taxonomies(CatalogInfo::default(), [tlp]).unwrap();
///
/// assert_eq!(catalog.search("RE"), ["tlp:red"]);
///
/// let resolved = catalog.revert_machinetag("tlp:white").unwrap();
/// assert_eq!(resolved.predicate.value(), "white");
/// assert!(resolved.entry.is_none());
/// ```
#[derive(Clone, Debug)]
pub struct TaxonomyCatalog {
    info: CatalogInfo,
    /// Taxonomies in manifest order, keyed by namespace.
    taxonomies: KeyedStore<Taxonomy>,
}

impl TaxonomyCatalog {
    /// Builds a catalog from already constructed taxonomies.
    ///
    /// Fails with [`Error::DuplicateTaxonomy`] if two taxonomies share a
    /// namespace.
    pub fn from_taxonomies<T>(info: CatalogInfo, taxonomies: T) -> Result<Self>
    where
        T: IntoIterator<Item = Taxonomy>,
    {
        let mut store = KeyedStore::new();
        for taxonomy in taxonomies {
            store.try_insert(taxonomy).map_err(|taxonomy| Error::DuplicateTaxonomy {
                name: taxonomy.name().to_string(),
            })?;
        }
        Ok(Self {
            info,
            taxonomies: store,
        })
    }

    /// Loads the manifest at `location` and every taxonomy it lists.
    ///
    /// Taxonomy documents are read from `{base}/{name}/{path}`, with the same
    /// transport as the manifest. `base` is the manifest's directory for a
    /// local manifest and the manifest's `url` for a remote one.
    ///
    /// Fails on the first document that cannot be loaded or built, and with
    /// [`Error::Consistency`] when a document's namespace differs from the
    /// name the manifest lists it under.
    pub fn load(location: &ManifestLocation) -> Result<Self> {
        let source = location.document_source();
        let manifest_locator = location.locator();
        source.ensure_available(&manifest_locator)?;

        let manifest: ManifestDocument =
            serde_json::from_value(source.load(&manifest_locator)?).map_err(|e| {
                Error::Schema {
                    context: format!("manifest {}", manifest_locator),
                    source: e,
                }
            })?;

        let base_location = match (location, &manifest.url) {
            (ManifestLocation::Remote(_), Some(url)) => Locator::Url(url.clone()),
            _ => location.parent(),
        };
        tracing::debug!(
            manifest = %manifest_locator,
            base = %base_location,
            taxonomies = manifest.taxonomies.len(),
            "loading taxonomy catalog"
        );

        let mut taxonomies = KeyedStore::new();
        for listed in &manifest.taxonomies {
            let locator = base_location.join(&listed.name, &manifest.path);
            let taxonomy = Taxonomy::from_value(source.load(&locator)?)?;
            if taxonomy.name() != listed.name {
                return Err(Error::Consistency {
                    manifest_name: listed.name.clone(),
                    namespace: taxonomy.name().to_string(),
                });
            }
            tracing::trace!(
                namespace = %listed.name,
                predicates = taxonomy.len(),
                "taxonomy loaded"
            );
            taxonomies.try_insert(taxonomy).map_err(|taxonomy| {
                Error::DuplicateTaxonomy {
                    name: taxonomy.name().to_string(),
                }
            })?;
        }

        Ok(Self {
            info: CatalogInfo {
                version: manifest.version,
                license: manifest.license,
                description: manifest.description,
                base_location: Some(base_location),
            },
            taxonomies,
        })
    }

    /// Loads the catalog from a local `MANIFEST.json`.
    pub fn from_manifest_path(path: impl AsRef<Path>) -> Result<Self> {
        Self::load(&ManifestLocation::Local(path.as_ref().to_path_buf()))
    }

    /// Loads the catalog from a manifest URL. Requires the `remote` feature.
    pub fn from_manifest_url(url: &str) -> Result<Self> {
        Self::load(&ManifestLocation::Remote(url.to_string()))
    }

    /// Loads the catalog from [`ManifestLocation::default_location`].
    pub fn load_default() -> Result<Self> {
        Self::load(&ManifestLocation::default_location())
    }

    /// The manifest metadata of this catalog.
    pub fn info(&self) -> &CatalogInfo { &self.info }

    /// The version of the taxonomy collection.
    pub fn version(&self) -> &Version { &self.info.version }

    /// The license the taxonomies are published under.
    pub fn license(&self) -> &str { &self.info.license }

    /// A summary of the collection.
    pub fn description(&self) -> &str { &self.info.description }

    /// Where taxonomy documents were loaded from, if the catalog was loaded.
    pub fn base_location(&self) -> Option<&Locator> { self.info.base_location.as_ref() }

    /// Every machinetag of every taxonomy, one list per taxonomy.
    pub fn all_machinetags(&self, expanded: bool) -> Vec<Vec<String>> {
        self.taxonomies
            .values()
            .map(|taxonomy| render(taxonomy, expanded))
            .collect()
    }

    /// Finds machinetags with a component that starts or ends with `query`.
    ///
    /// Components are the namespace, predicate and entry of each tag, and
    /// the comparison ignores case. Results follow catalog order, then tag
    /// order within each taxonomy; each tag appears at most once. An empty
    /// query matches every tag.
    pub fn search(&self, query: &str) -> Vec<String> { self.search_with(query, false) }

    /// Like [`TaxonomyCatalog::search`], over expanded machinetags.
    pub fn search_expanded(&self, query: &str) -> Vec<String> {
        self.search_with(query, true)
    }

    fn search_with(&self, query: &str, expanded: bool) -> Vec<String> {
        let query = query.to_lowercase();
        self.taxonomies
            .values()
            .flat_map(|taxonomy| render(taxonomy, expanded))
            .filter(|tag| {
                machinetag::tokens(tag).any(|token| {
                    let token = token.to_lowercase();
                    token.starts_with(&query) || token.ends_with(&query)
                })
            })
            .collect()
    }

    /// Resolves a machinetag to the taxonomy, predicate and entry it names.
    ///
    /// Fails with [`Error::MachinetagFormat`] if the text is not a
    /// machinetag, and with [`Error::Lookup`] if a component is unknown.
    pub fn revert_machinetag(&self, text: &str) -> Result<Resolved<'_>> {
        let parts = machinetag::parse(text)?;
        let taxonomy = self
            .get(parts.namespace)
            .ok_or_else(|| Error::lookup(Component::Namespace, parts.namespace))?;
        let predicate = taxonomy
            .get(parts.predicate)
            .ok_or_else(|| Error::lookup(Component::Predicate, parts.predicate))?;
        let entry = match parts.entry {
            Some(entry) => Some(
                predicate
                    .get(entry)
                    .ok_or_else(|| Error::lookup(Component::Entry, entry))?,
            ),
            None => None,
        };
        Ok(Resolved {
            taxonomy,
            predicate,
            entry,
        })
    }

    /// Validates every taxonomy's source document against `schema`,
    /// stopping at the first taxonomy that does not conform.
    #[cfg(feature = "schema-validation")]
    pub fn validate_with_schema(&self, schema: &Value) -> Result<()> {
        self.taxonomies
            .values()
            .try_for_each(|taxonomy| taxonomy.validate_with_schema(schema))
    }
}

fn render(taxonomy: &Taxonomy, expanded: bool) -> Vec<String> {
    if expanded {
        taxonomy.machinetags_expanded()
    } else {
        taxonomy.machinetags()
    }
}

impl KeyedCollection for TaxonomyCatalog {
    type Item = Taxonomy;

    fn store(&self) -> &KeyedStore<Taxonomy> { &self.taxonomies }
}

impl Display for TaxonomyCatalog {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for taxonomy in self.taxonomies.values() {
            write!(f, "{}\n\n", taxonomy)?;
        }
        Ok(())
    }
}
