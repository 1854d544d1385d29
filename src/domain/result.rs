//! The result handed back to the caller of a run.
//!
//! A RunResult is built once, at the end of a run, and never changed
//! afterwards. Fields are private; callers read them through accessors.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::params::RunParameters;
use super::role::StageRole;

/// Message reported on a successful run
pub const SUCCESS_MESSAGE: &str = "Content created successfully!";

/// Message reported on a simulated run
pub const SIMULATION_MESSAGE: &str = "Multi-agent system working in simulation mode";

/// Outcome mode of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    /// All three stages ran against the real collaborators
    Success,

    /// The deterministic fallback produced the payload
    Simulation,
}

/// External collaborator kinds a run may touch
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApiKind {
    /// LLM completion service
    Llm,

    /// Web search tool
    Search,
}

/// Final result of one run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunResult {
    id: Uuid,
    status: RunStatus,
    payload: String,
    stages_completed: Vec<StageRole>,
    parameters: RunParameters,
    apis_used: BTreeSet<ApiKind>,
    message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    fallback_reason: Option<String>,
    created_at: DateTime<Utc>,
}

impl RunResult {
    /// Result of a run where every stage completed
    pub fn success(
        parameters: RunParameters,
        payload: String,
        stages_completed: Vec<StageRole>,
        apis_used: BTreeSet<ApiKind>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            status: RunStatus::Success,
            payload,
            stages_completed,
            parameters,
            apis_used,
            message: SUCCESS_MESSAGE.to_string(),
            fallback_reason: None,
            created_at: Utc::now(),
        }
    }

    /// Result produced by the fallback template
    pub fn simulation(parameters: RunParameters, payload: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            status: RunStatus::Simulation,
            payload,
            stages_completed: Vec::new(),
            parameters,
            apis_used: BTreeSet::new(),
            message: SIMULATION_MESSAGE.to_string(),
            fallback_reason: None,
            created_at: Utc::now(),
        }
    }

    /// Attach the collaborator failure that forced simulation mode
    pub fn with_fallback_reason(mut self, reason: impl Into<String>) -> Self {
        self.fallback_reason = Some(reason.into());
        self
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn status(&self) -> RunStatus {
        self.status
    }

    pub fn payload(&self) -> &str {
        &self.payload
    }

    pub fn stages_completed(&self) -> &[StageRole] {
        &self.stages_completed
    }

    pub fn parameters(&self) -> &RunParameters {
        &self.parameters
    }

    pub fn apis_used(&self) -> &BTreeSet<ApiKind> {
        &self.apis_used
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Why the run fell back to simulation, if it did because of a failure
    pub fn fallback_reason(&self) -> Option<&str> {
        self.fallback_reason.as_deref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn is_success(&self) -> bool {
        self.status == RunStatus::Success
    }

    /// File name a caller can use when saving the payload
    pub fn suggested_file_name(&self) -> String {
        let prefix = match self.status {
            RunStatus::Success => "content",
            RunStatus::Simulation => "simulated_content",
        };
        format!("{}_{}.txt", prefix, self.created_at.format("%Y%m%d_%H%M%S"))
    }
}
