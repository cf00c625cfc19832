/* Codegen command - generate SSZ encoders for one package */

use crate::config::Config;
use anyhow::Context;
use std::io::Write;
use std::path::Path;

/* Output name that selects standard output */
pub const STDOUT: &str = "-";

/* Execute the codegen command */
pub fn run(config: &Config, out: &str) -> anyhow::Result<()> {
  tracing::debug!(
    dir = %config.dir.display(),
    type_name = ?config.type_name,
    out,
    "generating encoders"
  );

  let code = config
    .process()
    .with_context(|| format!("failed to generate code for {}", config.dir.display()))?;
  write_output(out, code.as_bytes())
}

/* Write to stdout for "-", otherwise create (or replace) the file, owner-only on unix */
pub fn write_output(out: &str, contents: &[u8]) -> anyhow::Result<()> {
  if out == STDOUT {
    let mut stdout = std::io::stdout().lock();
    stdout.write_all(contents)?;
    stdout.flush()?;
    return Ok(());
  }

  let path = Path::new(out);
  let mut options = std::fs::OpenOptions::new();
  options.write(true).create(true).truncate(true);
  #[cfg(unix)]
  {
    use std::os::unix::fs::OpenOptionsExt;
    options.mode(0o600);
  }

  let mut file = options
    .open(path)
    .with_context(|| format!("failed to create {}", path.display()))?;
  file
    .write_all(contents)
    .with_context(|| format!("failed to write {}", path.display()))?;
  tracing::debug!(path = %path.display(), bytes = contents.len(), "wrote output");
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;
  use tempfile::TempDir;

  #[test]
  fn writes_file_output() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("out_ssz.rs");
    let out = path.to_str().unwrap();

    write_output(out, b"first").unwrap();
    write_output(out, b"second").unwrap();
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "second");
  }

  #[cfg(unix)]
  #[test]
  fn new_file_is_owner_only() {
    use std::os::unix::fs::PermissionsExt;

    let dir = TempDir::new().unwrap();
    let path = dir.path().join("out_ssz.rs");
    write_output(path.to_str().unwrap(), b"code").unwrap();
    let mode = std::fs::metadata(&path).unwrap().permissions().mode();
    assert_eq!(mode & 0o777, 0o600);
  }

  #[test]
  fn missing_parent_directory_is_an_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("missing").join("out.rs");
    let err = write_output(path.to_str().unwrap(), b"code").unwrap_err();
    assert!(err.to_string().starts_with("failed to create"));
  }
}
