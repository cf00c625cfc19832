use crate::cfg::CfgFlags;
use crate::error::{DeclarationError, LoadError};
use crate::file::SourceFile;
use crate::package::{module_path_for, PackageLocation};
use ssz_types::{Package, TypeDescriptor};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/* Flag the loader treats as enabled; generated files opt out with it */
pub const DEFAULT_CFG_FLAG: &str = "sszgen";

/* Loads one package and snapshots its struct declarations */
pub struct PackageLoader {
    /* Directory the package is rooted at */
    dir: PathBuf,

    /* cfg flags evaluated as enabled while reading sources */
    flags: Vec<String>,
}

impl PackageLoader {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            flags: vec![DEFAULT_CFG_FLAG.to_string()],
        }
    }

    /* Replace the generator cfg flag */
    pub fn with_cfg(mut self, flag: impl Into<String>) -> Self {
        self.flags = vec![flag.into()];
        self
    }

    pub fn load(&self) -> Result<Package, LoadError> {
        let location = PackageLocation::discover(&self.dir)?;
        tracing::debug!(
            package = %location.name,
            source_root = %location.source_root.display(),
            "discovered package"
        );

        let files = self.source_files(&location.source_root)?;
        if files.is_empty() {
            return Err(LoadError::NoPackage(self.dir.clone()));
        }

        let flags = CfgFlags::new(self.flags.iter().cloned());
        let mut types: Vec<TypeDescriptor> = Vec::new();
        let mut errors: Vec<DeclarationError> = Vec::new();
        let mut origins: Vec<&Path> = Vec::new();

        let mut parsed = Vec::with_capacity(files.len());
        let mut disabled: Vec<PathBuf> = Vec::new();
        for path in &files {
            let contents = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
                path: path.clone(),
                source,
            })?;
            let file = syn::parse_file(&contents);
            if let Ok(file) = &file {
                let source_file = self.source_file(&location, path, &flags);
                disabled.extend(source_file.disabled_modules(file, &mut errors));
            }
            parsed.push((path, file));
        }

        for (path, file) in parsed {
            if disabled.iter().any(|off| path.starts_with(off)) {
                tracing::debug!(path = %path.display(), "skipping module disabled by cfg");
                continue;
            }
            let file = match file {
                Ok(file) => file,
                Err(err) => {
                    errors.push(DeclarationError::new(path, format!("parse error: {}", err)));
                    continue;
                }
            };

            let before = types.len();
            self.source_file(&location, path, &flags)
                .collect(&file, &mut types, &mut errors);
            origins.resize(types.len(), path.as_path());
            tracing::debug!(
                path = %path.display(),
                types = types.len() - before,
                "loaded source file"
            );
        }

        check_duplicates(&types, &origins, &mut errors);

        if !errors.is_empty() {
            for err in &errors {
                tracing::error!("{}", err);
            }
            return Err(LoadError::DeclarationErrors {
                package: location.name,
                errors,
            });
        }

        Ok(Package {
            name: location.name,
            source_root: location.source_root,
            types,
        })
    }

    fn source_file<'a>(
        &self,
        location: &PackageLocation,
        path: &'a Path,
        flags: &'a CfgFlags,
    ) -> SourceFile<'a> {
        SourceFile {
            path,
            module_path: module_path_for(&location.source_root, path),
            flags,
        }
    }

    /* `.rs` files of the library crate under the source root, in a stable order */
    fn source_files(&self, source_root: &Path) -> Result<Vec<PathBuf>, LoadError> {
        if !source_root.is_dir() {
            return Ok(Vec::new());
        }

        /* `main.rs` and `bin/` are separate crates next to a library */
        let has_lib = source_root.join("lib.rs").is_file();

        let mut files = Vec::new();
        let walker = WalkDir::new(source_root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| entry.depth() == 0 || !is_skipped(entry, has_lib));
        for entry in walker {
            let entry = entry?;
            if entry.file_type().is_file()
                && entry.path().extension().is_some_and(|ext| ext == "rs")
            {
                files.push(entry.into_path());
            }
        }
        Ok(files)
    }
}

fn is_skipped(entry: &DirEntry, has_lib: bool) -> bool {
    let name = entry.file_name().to_string_lossy();
    if !entry.file_type().is_dir() {
        return has_lib && entry.depth() == 1 && name == "main.rs";
    }
    name.starts_with('.') || name == "target" || (entry.depth() == 1 && name == "bin")
}

/* Struct names share one namespace across the package */
fn check_duplicates(
    types: &[TypeDescriptor],
    origins: &[&Path],
    errors: &mut Vec<DeclarationError>,
) {
    let mut seen: HashMap<&str, &str> = HashMap::new();
    for (desc, path) in types.iter().zip(origins) {
        if let Some(previous) = seen.insert(&desc.name, &desc.module_path) {
            errors.push(DeclarationError::new(
                *path,
                format!(
                    "type {} declared in both {} and {}",
                    desc.name, previous, desc.module_path
                ),
            ));
        }
    }
}
