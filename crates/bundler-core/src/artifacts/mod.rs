//! Artifact requirements, sources, and retrieval
//!
//! This module provides:
//! - The fixed set of artifacts a bundle is built from (`ArtifactKey`)
//! - Requirement sets mapping each key to a URL (`Requirements`)
//! - Where those URLs point: remote origin or local mirror (`ArtifactSource`)
//! - The resolved contents returned by the fetch stage (`ResolvedArtifacts`)

pub mod fetcher;

use crate::error::{BundleError, Result};
use crate::product::ProductConfig;
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use url::Url;

pub use fetcher::{ArtifactFetcher, FetchProgress};

/// URLs whose path ends with this suffix are retrieved as raw bytes
pub const BINARY_SUFFIX: &str = ".mem";

/// The four artifacts a bundle is assembled from
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ArtifactKey {
    /// Public `Quiet` API glue code
    Glue,
    /// Emscripten loader for the compiled module
    Loader,
    /// Memory initializer image of the compiled module
    MemoryImage,
    /// JSON catalog of modem profiles
    Profiles,
}

impl ArtifactKey {
    pub const ALL: [ArtifactKey; 4] = [
        ArtifactKey::Glue,
        ArtifactKey::Loader,
        ArtifactKey::MemoryImage,
        ArtifactKey::Profiles,
    ];

    /// File name of the artifact under the source base URL
    pub fn file_name(&self) -> &'static str {
        match self {
            ArtifactKey::Glue => "quiet.js",
            ArtifactKey::Loader => "quiet-emscripten.js",
            ArtifactKey::MemoryImage => "quiet-emscripten.js.mem",
            ArtifactKey::Profiles => "quiet-profiles.json",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ArtifactKey::Glue => "glue code",
            ArtifactKey::Loader => "loader code",
            ArtifactKey::MemoryImage => "memory image",
            ArtifactKey::Profiles => "profile catalog",
        }
    }
}

impl fmt::Display for ArtifactKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Whether a URL is retrieved as bytes rather than text
pub fn is_binary(url: &Url) -> bool {
    url.path().ends_with(BINARY_SUFFIX)
}

/// Content of a retrieved artifact
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Artifact {
    Text(String),
    Binary(Vec<u8>),
}

impl Artifact {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Artifact::Text(text) => Some(text),
            Artifact::Binary(_) => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Artifact::Binary(bytes) => Some(bytes),
            Artifact::Text(_) => None,
        }
    }
}

/// Artifact source - either remote URL or local directory
#[derive(Debug, Clone)]
pub enum ArtifactSource {
    Remote(Url),
    Local(PathBuf),
}

impl ArtifactSource {
    /// Create a remote source from a product config, honouring its env override
    pub fn from_config<C: ProductConfig>(config: &C) -> Result<Self> {
        let url_str = std::env::var(config.source_url_env())
            .unwrap_or_else(|_| config.default_source_url().to_string());
        Self::remote(&url_str)
    }

    /// Create a remote source from a URL string
    pub fn remote(url_str: &str) -> Result<Self> {
        let url = Url::parse(url_str)
            .map_err(|e| BundleError::Config(format!("Invalid source URL {}: {}", url_str, e)))?;
        Ok(Self::Remote(url))
    }

    /// Create a local source from a directory holding the artifact files
    pub fn local(path: PathBuf) -> Self {
        Self::Local(path)
    }

    /// Base URL the artifact file names are resolved against
    pub fn base_url(&self) -> Result<Url> {
        match self {
            ArtifactSource::Remote(url) => Ok(url.clone()),
            ArtifactSource::Local(path) => {
                let absolute = std::path::absolute(path).map_err(|e| {
                    BundleError::Config(format!("Invalid source directory {}: {}", path.display(), e))
                })?;
                Url::from_directory_path(&absolute).map_err(|_| {
                    BundleError::Config(format!(
                        "Source directory cannot be expressed as a URL: {}",
                        absolute.display()
                    ))
                })
            }
        }
    }
}

impl fmt::Display for ArtifactSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArtifactSource::Remote(url) => write!(f, "{}", url),
            ArtifactSource::Local(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Build a URL by appending a path segment, preserving query parameters
fn build_url(base: &Url, path_segment: &str) -> Result<Url> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| BundleError::Config(format!("URL cannot have path segments: {}", base)))?
        .pop_if_empty()
        .push(path_segment);
    Ok(url)
}

/// Mapping from every artifact key to the URL it is fetched from
#[derive(Debug, Clone)]
pub struct Requirements {
    entries: BTreeMap<ArtifactKey, Url>,
}

impl Requirements {
    /// Validate an explicit key-to-URL mapping.
    ///
    /// All four keys must be present and exactly one URL may carry the binary
    /// suffix: the memory image's.
    pub fn new(entries: BTreeMap<ArtifactKey, Url>) -> Result<Self> {
        if let Some(missing) = ArtifactKey::ALL.iter().find(|k| !entries.contains_key(k)) {
            return Err(BundleError::Config(format!(
                "No URL configured for the {}",
                missing
            )));
        }

        let binary: Vec<ArtifactKey> = entries
            .iter()
            .filter(|(_, url)| is_binary(url))
            .map(|(key, _)| *key)
            .collect();

        match binary.as_slice() {
            [ArtifactKey::MemoryImage] => Ok(Self { entries }),
            [] => Err(BundleError::Config(format!(
                "No requirement URL ends with '{}'; the memory image cannot be identified",
                BINARY_SUFFIX
            ))),
            [other] => Err(BundleError::Config(format!(
                "The {} URL ends with '{}' but only the memory image may be binary",
                other, BINARY_SUFFIX
            ))),
            _ => Err(BundleError::Config(format!(
                "{} requirement URLs end with '{}'; exactly one is allowed",
                binary.len(),
                BINARY_SUFFIX
            ))),
        }
    }

    /// Standard requirement set: every artifact file name under one base URL
    pub fn from_base(base: &Url) -> Result<Self> {
        let mut entries = BTreeMap::new();
        for key in ArtifactKey::ALL {
            entries.insert(key, build_url(base, key.file_name())?);
        }
        Self::new(entries)
    }

    /// Standard requirement set for a source
    pub fn from_source(source: &ArtifactSource) -> Result<Self> {
        Self::from_base(&source.base_url()?)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn url(&self, key: ArtifactKey) -> Option<&Url> {
        self.entries.get(&key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (ArtifactKey, &Url)> {
        self.entries.iter().map(|(key, url)| (*key, url))
    }
}

/// Contents produced by the fetch stage, one entry per requirement key
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedArtifacts {
    entries: BTreeMap<ArtifactKey, Artifact>,
}

impl ResolvedArtifacts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a retrieved artifact. Returns the previous content if the key was already set.
    pub fn insert(&mut self, key: ArtifactKey, artifact: Artifact) -> Option<Artifact> {
        self.entries.insert(key, artifact)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: ArtifactKey) -> Option<&Artifact> {
        self.entries.get(&key)
    }

    /// Text content of `key`, or `ArtifactMismatch`
    pub fn text(&self, key: ArtifactKey) -> Result<&str> {
        self.get(key)
            .and_then(Artifact::as_text)
            .ok_or(BundleError::ArtifactMismatch {
                key,
                expected: "text",
            })
    }

    /// Byte content of `key`, or `ArtifactMismatch`
    pub fn bytes(&self, key: ArtifactKey) -> Result<&[u8]> {
        self.get(key)
            .and_then(Artifact::as_bytes)
            .ok_or(BundleError::ArtifactMismatch {
                key,
                expected: "binary",
            })
    }
}
