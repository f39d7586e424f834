use std::env;
use std::path::{Path, PathBuf};

use crate::{DocumentSource, Locator};

/// The public MISP taxonomies manifest.
pub const DEFAULT_MANIFEST_URL: &str =
    "https://raw.githubusercontent.com/MISP/misp-taxonomies/main/MANIFEST.json";

/// Environment variable that overrides the default manifest location.
pub const MANIFEST_ENV_VAR: &str = "MISP_TAXONOMIES_MANIFEST";

/// Where a catalog's manifest lives.
///
/// The location decides the [`DocumentSource`] used for the manifest and for
/// every taxonomy document it lists.
///
/// # Examples
///
/// ```
/// use misp_taxonomies::{DocumentSource, ManifestLocation};
///
/// let remote = ManifestLocation::from_locator("https://example.com/MANIFEST.json");
/// assert_eq!(remote.document_source(), DocumentSource::RemoteFetch);
///
/// let local = ManifestLocation::from_locator("misp-taxonomies/MANIFEST.json");
/// assert_eq!(local.document_source(), DocumentSource::LocalFile);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ManifestLocation {
    /// A `MANIFEST.json` on the local filesystem.
    Local(PathBuf),
    /// A manifest URL.
    Remote(String),
}

impl ManifestLocation {
    /// Interprets `http://` and `https://` locators as remote, anything else
    /// as a local path.
    pub fn from_locator(locator: &str) -> Self {
        if locator.starts_with("http://") || locator.starts_with("https://") {
            ManifestLocation::Remote(locator.to_string())
        } else {
            ManifestLocation::Local(PathBuf::from(locator))
        }
    }

    /// Resolves the manifest to use when none is given.
    ///
    /// In order: the `MISP_TAXONOMIES_MANIFEST` environment variable, a
    /// `MANIFEST.json` in [`ManifestLocation::default_directory`] if one
    /// exists, and finally [`DEFAULT_MANIFEST_URL`].
    pub fn default_location() -> Self {
        if let Ok(locator) = env::var(MANIFEST_ENV_VAR)
            && !locator.is_empty()
        {
            return Self::from_locator(&locator);
        }
        let local = Self::default_directory().join("MANIFEST.json");
        if local.is_file() {
            return ManifestLocation::Local(local);
        }
        ManifestLocation::Remote(DEFAULT_MANIFEST_URL.to_string())
    }

    /// Returns the default local directory: `<data dir>/misp-taxonomies/`
    ///
    /// Falls back to `./misp-taxonomies/` if the data directory cannot be
    /// determined.
    pub fn default_directory() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("misp-taxonomies")
    }

    /// The transport used for the manifest and all its documents.
    pub fn document_source(&self) -> DocumentSource { self.locator().document_source() }

    /// The locator passed to the [`DocumentSource`].
    pub fn locator(&self) -> Locator {
        match self {
            ManifestLocation::Local(path) => Locator::Path(path.clone()),
            ManifestLocation::Remote(url) => Locator::Url(url.clone()),
        }
    }

    /// The location taxonomy documents are resolved against when the
    /// manifest does not name one.
    ///
    /// For a local manifest this is its canonical directory; for a remote one
    /// the URL with its last segment removed.
    pub(crate) fn parent(&self) -> Locator {
        match self {
            ManifestLocation::Local(path) => {
                let absolute = path.canonicalize().unwrap_or_else(|_| path.clone());
                Locator::Path(absolute.parent().unwrap_or(Path::new(".")).to_path_buf())
            }
            ManifestLocation::Remote(url) => match url.rsplit_once('/') {
                Some((parent, _)) => Locator::Url(parent.to_string()),
                None => Locator::Url(url.clone()),
            },
        }
    }
}

impl From<PathBuf> for ManifestLocation {
    fn from(path: PathBuf) -> Self { ManifestLocation::Local(path) }
}
