use std::collections::BTreeSet;

/// Run-wide accumulator for the paths emitted code refers to.
#[derive(Debug)]
pub struct GenContext {
    package: String,
    runtime_crate: String,
    uses: BTreeSet<String>,
}

impl GenContext {
    pub fn new(package: impl Into<String>, runtime_crate: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            runtime_crate: runtime_crate.into(),
            uses: BTreeSet::new(),
        }
    }

    /* Record a full path to import */
    pub fn use_path(&mut self, path: impl Into<String>) {
        self.uses.insert(path.into());
    }

    /* Record an item of the runtime crate and return the name to refer to it by */
    pub fn use_runtime<'n>(&mut self, item: &'n str) -> &'n str {
        self.uses.insert(format!("{}::{}", self.runtime_crate, item));
        item
    }

    pub fn package(&self) -> &str {
        &self.package
    }

    /* One `use` line per recorded path, sorted */
    pub fn render_imports(&self) -> String {
        self.uses
            .iter()
            .map(|path| format!("use {};\n", path))
            .collect()
    }

    /* Package doc line followed by the imports */
    pub fn header(&self) -> String {
        format!(
            "//! SSZ encoding for package `{}`.\n\n{}",
            self.package,
            self.render_imports()
        )
    }
}
