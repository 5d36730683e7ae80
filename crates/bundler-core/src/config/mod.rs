//! Local configuration: output/input paths and the package manifest

pub mod package;
pub mod paths;

pub use package::{read_package_name, PackageManifest};
pub use paths::BundlePaths;
