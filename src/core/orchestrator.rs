//! Main orchestrator for pipeline execution.
//!
//! Runs the Writer, Editor and SEO stages in order, handing each stage's
//! output to the next. The first collaborator failure abandons the run and
//! the fallback generator produces the result instead; a run is either a
//! full success or a simulation, never partial.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Instant;

use thiserror::Error;
use tracing::{debug, error, info, instrument, warn};

use crate::adapters::{CompletionError, CompletionService, SearchError, SearchTool};
use crate::domain::{ApiKind, InvalidParameters, RunParameters, RunResult, StageRole};

use super::context::StageContext;
use super::fallback::FallbackGenerator;
use super::stage::{Pipeline, PipelineError, Research, StageSpec};

/// Default number of search snippets spliced into a stage
pub const DEFAULT_MAX_SNIPPETS: usize = 5;

/// A collaborator failure that aborted a run
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StageFailure {
    #[error("Stage {stage} completion failed: {source}")]
    Completion {
        stage: StageRole,
        #[source]
        source: CompletionError,
    },

    #[error("Stage {stage} search failed: {source}")]
    Search {
        stage: StageRole,
        #[source]
        source: SearchError,
    },
}

impl StageFailure {
    /// Stage that was running when the failure happened
    pub fn stage(&self) -> StageRole {
        match self {
            Self::Completion { stage, .. } | Self::Search { stage, .. } => *stage,
        }
    }
}

/// Main pipeline orchestrator
pub struct Orchestrator {
    pipeline: Arc<Pipeline>,
    completion: Arc<dyn CompletionService>,
    search: Arc<dyn SearchTool>,
    fallback: FallbackGenerator,
    max_snippets: usize,
}

impl Orchestrator {
    /// Create an orchestrator running the built-in pipeline
    pub fn new(completion: Arc<dyn CompletionService>, search: Arc<dyn SearchTool>) -> Self {
        Self {
            pipeline: Arc::new(Pipeline::standard()),
            completion,
            search,
            fallback: FallbackGenerator::new(),
            max_snippets: DEFAULT_MAX_SNIPPETS,
        }
    }

    /// Create an orchestrator running a custom pipeline
    pub fn with_pipeline(
        pipeline: Pipeline,
        completion: Arc<dyn CompletionService>,
        search: Arc<dyn SearchTool>,
    ) -> Result<Self, PipelineError> {
        pipeline.validate()?;
        Ok(Self {
            pipeline: Arc::new(pipeline),
            ..Self::new(completion, search)
        })
    }

    /// Limit how many search snippets reach a stage
    pub fn with_max_snippets(mut self, max_snippets: usize) -> Self {
        self.max_snippets = max_snippets;
        self
    }

    /// Pipeline this orchestrator runs
    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    /// Execute one run.
    ///
    /// Only invalid parameters are reported as an error; collaborator
    /// failures turn into a simulation result.
    #[instrument(skip(self, params), fields(pipeline = %self.pipeline.name, topic = %params.topic))]
    pub async fn run(&self, params: RunParameters) -> Result<RunResult, InvalidParameters> {
        let range = params.validate()?;
        info!(word_count = %range, "Starting content pipeline");

        let run_start = Instant::now();
        let mut apis_used = BTreeSet::new();

        match self.execute_stages(&params, &mut apis_used).await {
            Ok(context) => {
                let stages_completed = context.completed_roles();
                let payload = context.into_last().map(|o| o.text).unwrap_or_default();
                info!(
                    duration_ms = run_start.elapsed().as_millis() as u64,
                    "Pipeline completed successfully"
                );
                Ok(RunResult::success(params, payload, stages_completed, apis_used))
            }
            Err(failure) => {
                warn!(
                    stage = %failure.stage(),
                    error = %failure,
                    "Collaborator failed, falling back to simulation mode"
                );
                Ok(self
                    .fallback
                    .generate(&params)
                    .with_fallback_reason(failure.to_string()))
            }
        }
    }

    /// Run every stage in order, stopping at the first failure
    async fn execute_stages(
        &self,
        params: &RunParameters,
        apis_used: &mut BTreeSet<ApiKind>,
    ) -> Result<StageContext, StageFailure> {
        let mut context = StageContext::new();

        for (index, stage) in self.pipeline.stages().iter().enumerate() {
            let stage_start = Instant::now();
            let previous = context.previous(index).map(|o| (o.role, o.text.as_str()));

            let text = self
                .execute_stage(stage, params, previous, apis_used)
                .await?;

            info!(
                stage = %stage.role,
                output_len = text.len(),
                duration_ms = stage_start.elapsed().as_millis() as u64,
                "Stage completed"
            );
            context.record(index, stage.role, text);
        }

        Ok(context)
    }

    /// Run a single stage: optional search, then one completion call
    async fn execute_stage(
        &self,
        stage: &StageSpec,
        params: &RunParameters,
        previous: Option<(StageRole, &str)>,
        apis_used: &mut BTreeSet<ApiKind>,
    ) -> Result<String, StageFailure> {
        let research = match stage.render_search_query(params) {
            Some(query) => {
                debug!(stage = %stage.role, %query, "Searching");
                apis_used.insert(ApiKind::Search);
                let mut snippets = self.search.search(&query).await.map_err(|source| {
                    error!(stage = %stage.role, error = %source, "Search failed");
                    StageFailure::Search {
                        stage: stage.role,
                        source,
                    }
                })?;
                snippets.truncate(self.max_snippets);
                Some(Research { query, snippets })
            }
            None => None,
        };

        let instructions = stage.build_instructions(params, research.as_ref(), previous);

        debug!(stage = %stage.role, instructions_len = instructions.len(), "Requesting completion");
        apis_used.insert(ApiKind::Llm);
        self.completion
            .generate(stage.title(), &stage.goal, &stage.backstory, &instructions)
            .await
            .map_err(|source| {
                error!(stage = %stage.role, error = %source, "Completion failed");
                StageFailure::Completion {
                    stage: stage.role,
                    source,
                }
            })
    }
}
