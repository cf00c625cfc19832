//! Output assembly: joining per-type chunks, best-effort formatting and
//! the generated-file marker.

/* Written after formatting; the formatter would drop plain comments */
pub const GENERATED_MARKER: &str = "// Code generated by sszgen. DO NOT EDIT.\n\n";

/// The rendered parts of one run, before formatting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Generated {
    /* Package doc line plus imports */
    pub header: String,
    /* Imports only, for output that is `include!`d */
    pub imports: String,
    /* One `impl` block per selected type, in selection order */
    pub chunks: Vec<String>,
}

impl Generated {
    /* Standalone module source: header then every chunk */
    pub fn assemble(&self) -> String {
        join(&self.header, &self.chunks)
    }

    /* Source without inner attributes or docs, safe to `include!` */
    pub fn assemble_body(&self) -> String {
        join(&self.imports, &self.chunks)
    }
}

fn join(prefix: &str, chunks: &[String]) -> String {
    let mut code = String::from(prefix);
    if !chunks.is_empty() {
        code.push('\n');
        code.push_str(&chunks.join("\n\n"));
    }
    code
}

/// Pretty-prints Rust source. Unparseable input is returned unchanged.
pub fn format_source(code: &str) -> String {
    match syn::parse_file(code) {
        Ok(file) => prettyplease::unparse(&file),
        Err(err) => {
            tracing::warn!(error = %err, "generated code did not parse, leaving it unformatted");
            code.to_string()
        }
    }
}

/* Marker comment and the cfg guard that hides the file from later runs */
pub fn annotate(code: &str, cfg_flag: &str) -> String {
    format!(
        "{}#![cfg(not({}))]\n\n{}",
        GENERATED_MARKER, cfg_flag, code
    )
}
