//! Transports for manifest and taxonomy documents.
//!
//! A catalog picks one [`DocumentSource`] from its manifest location and
//! uses it for every document it loads.

use std::fmt::{Display, Formatter};
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::{Error, Result};

/// Where a single document lives.
///
/// Local paths stay paths end to end, so directories whose names are not
/// valid UTF-8 load like any other.
///
/// # Examples
///
/// ```
/// use std::path::Path;
///
/// use misp_taxonomies::Locator;
///
/// let remote = Locator::Url("https://example.com/taxonomies/".into());
/// assert_eq!(
///     remote.join("tlp", "machinetag.json").to_string(),
///     "https://example.com/taxonomies/tlp/machinetag.json"
/// );
///
/// let local = Locator::Path("/data".into());
/// assert_eq!(
///     local.join("tlp", "machinetag.json"),
///     Locator::Path(Path::new("/data/tlp/machinetag.json").to_path_buf())
/// );
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Locator {
    /// A file on the local filesystem.
    Path(PathBuf),
    /// An HTTP(S) URL.
    Url(String),
}

impl Locator {
    /// The locator of a taxonomy document: `{self}/{name}/{path}`.
    pub fn join(&self, name: &str, path: &str) -> Locator {
        match self {
            Locator::Path(base) => Locator::Path(base.join(name).join(path)),
            Locator::Url(base) => {
                Locator::Url(format!("{}/{}/{}", base.trim_end_matches('/'), name, path))
            }
        }
    }

    /// The transport able to load this locator.
    pub fn document_source(&self) -> DocumentSource {
        match self {
            Locator::Path(_) => DocumentSource::LocalFile,
            Locator::Url(_) => DocumentSource::RemoteFetch,
        }
    }
}

impl Display for Locator {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Locator::Path(path) => write!(f, "{}", path.display()),
            Locator::Url(url) => write!(f, "{}", url),
        }
    }
}

/// How documents are fetched.
///
/// A catalog picks one source from its manifest location and uses it for the
/// manifest and for every taxonomy document the manifest lists.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DocumentSource {
    /// Read and parse files from the local filesystem.
    LocalFile,
    /// Fetch and parse documents over HTTP(S).
    RemoteFetch,
}

impl DocumentSource {
    /// Returns true if this build can load documents from this source.
    pub fn is_available(&self) -> bool {
        match self {
            DocumentSource::LocalFile => true,
            DocumentSource::RemoteFetch => cfg!(feature = "remote"),
        }
    }

    /// Fails with [`Error::DependencyUnavailable`] if this build cannot
    /// load from this source.
    pub fn ensure_available(&self, locator: &Locator) -> Result<()> {
        if self.is_available() {
            Ok(())
        } else {
            Err(Error::DependencyUnavailable {
                locator: locator.to_string(),
            })
        }
    }

    /// Loads and parses the JSON document at `locator`.
    ///
    /// A local source reads a URL locator as a relative path; a remote
    /// source refuses path locators with [`Error::Fetch`].
    pub fn load(&self, locator: &Locator) -> Result<Value> {
        tracing::trace!(source = ?self, %locator, "loading document");
        self.ensure_available(locator)?;
        match (self, locator) {
            (DocumentSource::LocalFile, Locator::Path(path)) => load_path(path),
            (DocumentSource::LocalFile, Locator::Url(url)) => load_path(Path::new(url)),
            (DocumentSource::RemoteFetch, Locator::Url(url)) => load_url(url),
            (DocumentSource::RemoteFetch, Locator::Path(path)) => Err(Error::Fetch {
                url: path.display().to_string(),
                message: "not a URL".to_string(),
            }),
        }
    }
}

fn load_path(path: &Path) -> Result<Value> {
    let content = fs::read_to_string(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| Error::Json {
        locator: path.display().to_string(),
        source,
    })
}

#[cfg(feature = "remote")]
fn load_url(url: &str) -> Result<Value> {
    let agent = ureq::AgentBuilder::new()
        .timeout(std::time::Duration::from_secs(30))
        .build();
    let response = agent.get(url).call().map_err(|e| Error::Fetch {
        url: url.into(),
        message: e.to_string(),
    })?;
    let body = response.into_string().map_err(|e| Error::Fetch {
        url: url.into(),
        message: format!("read body: {e}"),
    })?;
    serde_json::from_str(&body).map_err(|source| Error::Json {
        locator: url.to_string(),
        source,
    })
}

#[cfg(not(feature = "remote"))]
fn load_url(url: &str) -> Result<Value> {
    Err(Error::DependencyUnavailable {
        locator: url.to_string(),
    })
}
