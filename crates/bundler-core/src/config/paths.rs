//! Input and output file locations for a bundle run

use std::path::{Path, PathBuf};

/// Package manifest supplying the log label
pub const PACKAGE_MANIFEST: &str = "package.json";
/// Declaration template holding the `ProfileName` placeholder
pub const DECLARATION_TEMPLATE: &str = "template.index.d.ts";
/// Generated declaration file
pub const DECLARATIONS: &str = "index.d.ts";
/// Generated bundle module
pub const BUNDLE: &str = "_bundle.js";

/// Files read and written by a bundle run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundlePaths {
    pub package_manifest: PathBuf,
    pub declaration_template: PathBuf,
    pub declarations: PathBuf,
    pub bundle: PathBuf,
}

impl BundlePaths {
    /// Default file names inside a project directory
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            package_manifest: dir.join(PACKAGE_MANIFEST),
            declaration_template: dir.join(DECLARATION_TEMPLATE),
            declarations: dir.join(DECLARATIONS),
            bundle: dir.join(BUNDLE),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_dir_defaults() {
        let paths = BundlePaths::in_dir(Path::new("pkg"));
        assert_eq!(paths.bundle, Path::new("pkg/_bundle.js"));
        assert_eq!(paths.declarations, Path::new("pkg/index.d.ts"));
        assert_eq!(paths.declaration_template, Path::new("pkg/template.index.d.ts"));
        assert_eq!(paths.package_manifest, Path::new("pkg/package.json"));
    }
}
