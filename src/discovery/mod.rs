// src/discovery/mod.rs

//! Finding ROS packages in a source tree and their installed executables.
//!
//! - [`manifest`] parses `package.xml` files.
//! - [`ament`] resolves a package's install prefix through the ament
//!   resource index and lists the executables under `lib/<package>`.

pub mod ament;
pub mod manifest;

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::config::DiscoverySettings;
use crate::errors::{Result, RosdocError};
use crate::fs::FileSystem;

pub use ament::{AmentIndex, Executable};
pub use manifest::{parse_package_name, read_manifest, PackageManifest};

/// File name of a ROS package manifest.
pub const MANIFEST_FILE_NAME: &str = "package.xml";

/// Marker file that hides a directory tree from colcon.
pub const COLCON_IGNORE_MARKER: &str = "COLCON_IGNORE";

/// Recursively find ROS package manifests under `src_path` and extract the
/// package names.
///
/// Manifests that cannot be parsed, or that lack a `<name>`, are reported
/// and skipped. Directory entries are visited in sorted order so the result
/// is deterministic. When two manifests declare the same name the first one
/// wins.
pub fn find_ros_packages(
    fs: &dyn FileSystem,
    src_path: &Path,
    filter: &DiscoverySettings,
) -> Result<Vec<PackageManifest>> {
    if !fs.is_dir(src_path) {
        return Err(RosdocError::ConfigError(format!(
            "source path {src_path:?} is not a directory"
        )));
    }

    let mut manifest_paths = Vec::new();
    walk(fs, src_path, filter.respect_colcon_ignore, &mut manifest_paths);

    let mut seen = HashSet::new();
    let mut packages = Vec::new();

    for path in manifest_paths {
        let relative = path.strip_prefix(src_path).unwrap_or(&path);
        if filter.exclude.is_match(relative) {
            debug!(manifest = ?path, "manifest excluded by pattern");
            continue;
        }

        let manifest = match read_manifest(fs, &path) {
            Ok(manifest) => manifest,
            Err(RosdocError::PackageNameMissing(p)) => {
                warn!(manifest = ?p, "package name not found");
                continue;
            }
            Err(err) => {
                warn!(manifest = ?path, error = %err, "error parsing package manifest");
                continue;
            }
        };

        if !filter.wants_package(&manifest.name) {
            debug!(package = %manifest.name, "package filtered out");
            continue;
        }

        if !seen.insert(manifest.name.clone()) {
            warn!(
                package = %manifest.name,
                manifest = ?manifest.manifest_path,
                "duplicate package name; keeping the first manifest"
            );
            continue;
        }

        packages.push(manifest);
    }

    Ok(packages)
}

fn walk(fs: &dyn FileSystem, dir: &Path, respect_colcon_ignore: bool, out: &mut Vec<PathBuf>) {
    if respect_colcon_ignore && fs.exists(&dir.join(COLCON_IGNORE_MARKER)) {
        debug!(dir = ?dir, "skipping directory marked COLCON_IGNORE");
        return;
    }

    let mut entries = match fs.read_dir(dir) {
        Ok(entries) => entries,
        Err(err) => {
            warn!(dir = ?dir, error = %err, "cannot read directory; skipping");
            return;
        }
    };
    entries.sort();

    for entry in entries {
        if fs.is_dir(&entry) {
            walk(fs, &entry, respect_colcon_ignore, out);
        } else if entry.file_name().is_some_and(|n| n == MANIFEST_FILE_NAME) {
            out.push(entry);
        }
    }
}
