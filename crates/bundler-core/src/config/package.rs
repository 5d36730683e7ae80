//! `package.json` reading

use crate::error::{BundleError, Result};
use serde::Deserialize;
use std::path::Path;
use tokio::fs;

/// The subset of `package.json` the bundler cares about
#[derive(Debug, Clone, Deserialize)]
pub struct PackageManifest {
    pub name: String,
}

/// Read the package name used to label log output
pub async fn read_package_name(path: &Path) -> Result<String> {
    let content = fs::read_to_string(path)
        .await
        .map_err(|source| BundleError::Read {
            path: path.to_path_buf(),
            source,
        })?;
    let manifest: PackageManifest =
        serde_json::from_str(&content).map_err(|source| BundleError::ParseFailure {
            what: "package manifest",
            source,
        })?;
    Ok(manifest.name)
}
