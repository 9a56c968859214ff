// src/discovery/ament.rs

//! Executable lookup through the ament resource index.
//!
//! A package is installed under the first prefix of `AMENT_PREFIX_PATH`
//! that contains `share/ament_index/resource_index/packages/<package>`.
//! Its executables are the executable files below `<prefix>/lib/<package>`.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::errors::{Result, RosdocError};
use crate::fs::FileSystem;

pub const AMENT_PREFIX_PATH_ENV: &str = "AMENT_PREFIX_PATH";

const PACKAGES_RESOURCE_DIR: &str = "share/ament_index/resource_index/packages";

/// An installed executable of a package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Executable {
    /// File name, as passed to `ros2 run <package> <name>`.
    pub name: String,
    /// Full path, used to launch it.
    pub path: PathBuf,
}

#[derive(Debug, Clone, Default)]
pub struct AmentIndex {
    prefixes: Vec<PathBuf>,
}

impl AmentIndex {
    pub fn new(prefixes: Vec<PathBuf>) -> Self {
        Self { prefixes }
    }

    /// Build the index from `AMENT_PREFIX_PATH`.
    pub fn from_env() -> Self {
        let prefixes: Vec<PathBuf> = std::env::var_os(AMENT_PREFIX_PATH_ENV)
            .map(|value| {
                std::env::split_paths(&value)
                    .filter(|p| !p.as_os_str().is_empty())
                    .collect()
            })
            .unwrap_or_default();

        if prefixes.is_empty() {
            warn!("{AMENT_PREFIX_PATH_ENV} is not set; no installed packages can be found");
        }
        Self::new(prefixes)
    }

    /// Install prefix of a package.
    pub fn package_prefix(&self, fs: &dyn FileSystem, package: &str) -> Result<PathBuf> {
        self.prefixes
            .iter()
            .find(|prefix| fs.exists(&prefix.join(PACKAGES_RESOURCE_DIR).join(package)))
            .cloned()
            .ok_or_else(|| RosdocError::PackageNotFound(package.to_string()))
    }

    /// All executables installed for a package, in `ros2 pkg executables`
    /// order: a directory's files sorted by name, then its subdirectories.
    pub fn executables(&self, fs: &dyn FileSystem, package: &str) -> Result<Vec<Executable>> {
        let prefix = self.package_prefix(fs, package)?;
        let lib_dir = prefix.join("lib").join(package);
        debug!(package, lib_dir = ?lib_dir, "listing package executables");

        if !fs.is_dir(&lib_dir) {
            return Ok(Vec::new());
        }

        let mut paths = Vec::new();
        collect_executables(fs, &lib_dir, &mut paths)?;

        Ok(paths
            .into_iter()
            .filter_map(|path| {
                let name = path.file_name()?.to_str()?.to_string();
                Some(Executable { name, path })
            })
            .collect())
    }
}

fn collect_executables(fs: &dyn FileSystem, dir: &Path, out: &mut Vec<PathBuf>) -> Result<()> {
    let mut entries = fs.read_dir(dir)?;
    entries.sort();

    let (subdirs, files): (Vec<_>, Vec<_>) = entries.into_iter().partition(|e| fs.is_dir(e));
    out.extend(files.into_iter().filter(|f| fs.is_executable(f)));

    for subdir in subdirs {
        let hidden = subdir
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.starts_with('.'));
        if !hidden {
            collect_executables(fs, &subdir, out)?;
        }
    }
    Ok(())
}
