// src/discovery/manifest.rs

use std::path::{Path, PathBuf};

use crate::errors::{Result, RosdocError};
use crate::fs::FileSystem;

/// A package found in the source tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageManifest {
    pub name: String,
    pub manifest_path: PathBuf,
}

/// Read and parse a `package.xml`.
pub fn read_manifest(fs: &dyn FileSystem, path: &Path) -> Result<PackageManifest> {
    let content = fs.read_to_string(path)?;
    let name = parse_package_name(&content, path)?;
    Ok(PackageManifest {
        name,
        manifest_path: path.to_path_buf(),
    })
}

/// Extract the package name: the text of the `<name>` element directly
/// under the root element.
///
/// `path` is only used for error reporting.
pub fn parse_package_name(xml: &str, path: &Path) -> Result<String> {
    let doc = roxmltree::Document::parse(xml).map_err(|source| RosdocError::XmlError {
        path: path.to_path_buf(),
        source,
    })?;

    doc.root_element()
        .children()
        .find(|n| n.has_tag_name("name"))
        .and_then(|n| n.text())
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .ok_or_else(|| RosdocError::PackageNameMissing(path.to_path_buf()))
}
