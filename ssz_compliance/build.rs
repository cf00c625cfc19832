//! Build script that runs sszgen over this crate's own sources and
//! writes the generated codec to OUT_DIR.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

fn main() {
    let manifest_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR").unwrap());

    println!("cargo::rerun-if-changed=build.rs");
    println!("cargo::rerun-if-changed=src");

    let generated = ssz_gen::Config::new(&manifest_dir)
        .generate()
        .unwrap_or_else(|err| panic!("sszgen failed: {}", err));

    /* Included into a module, so no inner attributes or docs */
    let code = ssz_gen::format_source(&generated.assemble_body());

    let out_dir = env::var("OUT_DIR").unwrap();
    let dest_path = Path::new(&out_dir).join("ssz_codec.rs");
    fs::write(&dest_path, code).unwrap();
}
