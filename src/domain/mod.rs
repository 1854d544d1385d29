//! Domain types for the content pipeline.
//!
//! This module contains the core data structures:
//! - RunParameters: caller inputs for a run
//! - StageRole: the three fixed stages
//! - RunResult: what a run hands back

pub mod params;
pub mod result;
pub mod role;

// Re-export commonly used types
pub use params::{InvalidParameters, RunParameters, WordCountRange};
pub use result::{ApiKind, RunResult, RunStatus};
pub use role::StageRole;
