//! Recording collaborators shared by the integration tests.

#![allow(dead_code)]

use std::sync::Mutex;

use async_trait::async_trait;
use quillcrew::adapters::{CompletionError, CompletionService, SearchError, SearchTool};

/// One recorded completion request
#[derive(Debug, Clone)]
pub struct CompletionCall {
    pub role: String,
    pub goal: String,
    pub instructions: String,
}

/// Completion service that answers "response #n" and can fail on a chosen call
pub struct ScriptedCompletion {
    calls: Mutex<Vec<CompletionCall>>,
    fail_on: Option<usize>,
    echo: bool,
}

impl ScriptedCompletion {
    /// Always succeeds
    pub fn succeeding() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            fail_on: None,
            echo: false,
        }
    }

    /// Fails on the n-th call (1-based)
    pub fn failing_on(call: usize) -> Self {
        Self {
            fail_on: Some(call),
            ..Self::succeeding()
        }
    }

    /// Answers with the instructions it was given
    pub fn echoing() -> Self {
        Self {
            echo: true,
            ..Self::succeeding()
        }
    }

    pub fn calls(&self) -> Vec<CompletionCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl CompletionService for ScriptedCompletion {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn generate(
        &self,
        role: &str,
        goal: &str,
        _backstory: &str,
        instructions: &str,
    ) -> Result<String, CompletionError> {
        let n = {
            let mut calls = self.calls.lock().unwrap();
            calls.push(CompletionCall {
                role: role.to_string(),
                goal: goal.to_string(),
                instructions: instructions.to_string(),
            });
            calls.len()
        };

        if self.fail_on == Some(n) {
            return Err(CompletionError::Quota("model overloaded".to_string()));
        }

        if self.echo {
            return Ok(instructions.to_string());
        }

        Ok(format!("response #{}", n))
    }
}

/// Search tool returning fixed snippets, optionally failing every call or
/// only a chosen one
pub struct ScriptedSearch {
    queries: Mutex<Vec<String>>,
    snippets: Vec<String>,
    fail_all: bool,
    fail_on: Option<usize>,
}

impl ScriptedSearch {
    pub fn with_snippets(count: usize) -> Self {
        Self {
            queries: Mutex::new(Vec::new()),
            snippets: (1..=count).map(|i| format!("snippet {}", i)).collect(),
            fail_all: false,
            fail_on: None,
        }
    }

    pub fn failing() -> Self {
        Self {
            fail_all: true,
            ..Self::with_snippets(0)
        }
    }

    /// Fails on the n-th call (1-based), succeeds otherwise
    pub fn failing_on(call: usize, snippets: usize) -> Self {
        Self {
            fail_on: Some(call),
            ..Self::with_snippets(snippets)
        }
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl SearchTool for ScriptedSearch {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn search(&self, query: &str) -> Result<Vec<String>, SearchError> {
        let n = {
            let mut queries = self.queries.lock().unwrap();
            queries.push(query.to_string());
            queries.len()
        };

        if self.fail_all || self.fail_on == Some(n) {
            return Err(SearchError::Transport("connection refused".to_string()));
        }

        Ok(self.snippets.clone())
    }
}
