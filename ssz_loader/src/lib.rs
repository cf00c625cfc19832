//! Package Loading and Declaration Resolution
//!
//! This crate locates exactly one Rust package on disk, parses its sources
//! and turns every struct declaration into an immutable
//! [`TypeDescriptor`](ssz_types::TypeDescriptor) snapshot for the generator.
//! Nothing downstream ever touches `syn` directly.

pub mod cfg;
pub mod error;
pub mod file;
pub mod package;
pub mod resolver;

// Re-export commonly used types at the crate root
pub use error::{DeclarationError, LoadError};
pub use package::PackageLocation;
pub use resolver::{PackageLoader, DEFAULT_CFG_FLAG};

// Re-export ssz_types for convenience
pub use ssz_types;
