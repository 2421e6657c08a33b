//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - the validated run configuration (`RunOptions`, `MaskPolicy`, `Connectedness`)
//! - the output attribute type (`FieldType`)
//! - per-stage outcomes (`Stage`, `Outcome`, `PipelineResult`)

pub mod types;

pub use types::*;
