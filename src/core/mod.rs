//! Core orchestration logic.
//!
//! This module contains:
//! - Stage: stage definitions and the ordered pipeline
//! - Context: per-run stage outputs
//! - Fallback: simulated results
//! - Orchestrator: main execution engine

pub mod context;
pub mod fallback;
pub mod orchestrator;
pub mod stage;

// Re-export commonly used types
pub use context::{StageContext, StageOutput};
pub use fallback::FallbackGenerator;
pub use orchestrator::{Orchestrator, StageFailure, DEFAULT_MAX_SNIPPETS};
pub use stage::{render_template, Pipeline, PipelineError, Research, StageSpec};
