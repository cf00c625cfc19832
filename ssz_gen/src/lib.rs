//! SSZ Encoder Generation
//!
//! Turns the struct declarations of one Rust package into `impl Ssz` blocks:
//! each selected type is classified, laid out into an encoding plan and
//! rendered against the `ssz_runtime` helpers. [`Config`] drives a run.

pub mod classifier;
pub mod cmds;
pub mod config;
pub mod context;
pub mod emit;
pub mod output;
pub mod plan;
pub mod selector;

pub use classifier::{ClassifyError, Classifier};
pub use config::{Config, GenError, DEFAULT_RUNTIME_CRATE};
pub use context::GenContext;
pub use emit::{emit_impl, EmitError, Emitter};
pub use output::{annotate, format_source, Generated};
pub use plan::{EncodingPlan, Placement, PlanError, PlannedField};
pub use selector::{select, SelectError};

pub use ssz_loader;
pub use ssz_types;
