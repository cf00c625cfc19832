//! Package Discovery
//!
//! Maps an input directory to exactly one package: either a Cargo package
//! (manifest with a `[package]` table, sources under `src/`) or a plain
//! directory of module files.

use crate::error::LoadError;
use serde_derive::Deserialize;
use std::path::{Path, PathBuf};

/* Only the tables discovery cares about */
#[derive(Deserialize, Debug)]
struct Manifest {
    package: Option<ManifestPackage>,
    workspace: Option<toml::Table>,
}

#[derive(Deserialize, Debug)]
struct ManifestPackage {
    name: String,
}

/* Where a package's sources live and what it is called */
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageLocation {
    pub name: String,
    pub source_root: PathBuf,
}

impl PackageLocation {
    /* Locate the single package rooted at `dir` */
    pub fn discover(dir: &Path) -> Result<Self, LoadError> {
        if !dir.is_dir() {
            return Err(LoadError::NoPackage(dir.to_path_buf()));
        }

        let manifest_path = dir.join("Cargo.toml");
        if manifest_path.is_file() {
            let contents =
                std::fs::read_to_string(&manifest_path).map_err(|source| LoadError::Io {
                    path: manifest_path.clone(),
                    source,
                })?;
            let manifest: Manifest =
                toml::from_str(&contents).map_err(|source| LoadError::Manifest {
                    path: manifest_path.clone(),
                    source,
                })?;

            return match (manifest.package, manifest.workspace) {
                (Some(package), _) => Ok(Self {
                    name: package.name,
                    source_root: dir.join("src"),
                }),
                (None, Some(_)) => Err(LoadError::MultiplePackages(dir.to_path_buf())),
                (None, None) => Err(LoadError::NoPackage(dir.to_path_buf())),
            };
        }

        /* Plain directory: name it after the directory itself */
        let canonical = dir.canonicalize().map_err(|source| LoadError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        let name = canonical
            .file_name()
            .map(|n| n.to_string_lossy().replace('-', "_"))
            .unwrap_or_else(|| "crate".to_string());

        Ok(Self {
            name,
            source_root: dir.to_path_buf(),
        })
    }
}

/* Module path of a source file relative to the package's source root */
pub fn module_path_for(source_root: &Path, file: &Path) -> String {
    let mut segments = vec!["crate".to_string()];
    let Ok(relative) = file.strip_prefix(source_root) else {
        return segments.join("::");
    };

    let mut components: Vec<String> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().to_string())
        .collect();

    if let Some(last) = components.pop() {
        let stem = Path::new(&last)
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
        components.push(stem);
    }

    if matches!(
        components.last().map(String::as_str),
        Some("lib") | Some("main") | Some("mod")
    ) {
        components.pop();
    }

    segments.extend(components);
    segments.join("::")
}

/* Directory holding the files of a source file's child modules */
pub fn child_dir(file: &Path) -> PathBuf {
    let parent = file.parent().unwrap_or(Path::new(""));
    match file.file_stem().and_then(|s| s.to_str()) {
        Some("lib") | Some("main") | Some("mod") | None => parent.to_path_buf(),
        Some(stem) => parent.join(stem),
    }
}
