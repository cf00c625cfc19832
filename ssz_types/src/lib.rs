//! SSZ Type Descriptors
//!
//! This crate contains the structural description of the declarations the
//! generator works on. It provides pure data structures produced by the
//! package loader and consumed by the generator, without any file I/O or
//! code generation logic.

pub mod types;

// Re-export commonly used types at the crate root
pub use types::*;
