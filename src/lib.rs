//! quillcrew - three-stage content pipeline
//!
//! A writer, an editor and an SEO specialist each make one LLM call, in
//! that order, with the writer and SEO stages grounded by web search. If
//! any call fails, the run falls back to deterministic simulated content.
//!
//! # Architecture
//!
//! - Stages run strictly in sequence; each sees only the previous stage's text
//! - Collaborators (LLM, search) sit behind traits and report typed errors
//! - A run ends as a full success or a simulation, never a partial result
//!
//! # Modules
//!
//! - `adapters`: External services (Gemini, Serper)
//! - `core`: Orchestration logic (Pipeline, Orchestrator, Fallback)
//! - `domain`: Data structures (RunParameters, RunResult, StageRole)
//! - `config`: Credentials and settings
//! - `cli`: Command-line interface
//!
//! # Usage
//!
//! ```bash
//! # Generate content
//! quillcrew run --topic "The Future of AI in Healthcare" --words 1000 --save
//!
//! # Simulated content, no API calls
//! quillcrew simulate --topic "Rust" --content-type article
//!
//! # Inspect the stages
//! quillcrew stages
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;

// Re-export main types at crate root for convenience
pub use adapters::{CompletionError, CompletionService, SearchError, SearchTool};
pub use core::{FallbackGenerator, Orchestrator, Pipeline, StageSpec};
pub use domain::{ApiKind, InvalidParameters, RunParameters, RunResult, RunStatus, StageRole};
