//! Per-run record of stage outputs.

use crate::domain::StageRole;

/// Output produced by one stage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageOutput {
    pub role: StageRole,
    pub text: String,
}

/// Stage outputs of a single run, indexed by stage position.
///
/// Outputs are only ever appended, in stage order.
#[derive(Debug, Default)]
pub struct StageContext {
    outputs: Vec<StageOutput>,
}

impl StageContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the output of the stage at `index`.
    ///
    /// Panics if `index` is not the next free slot; stages run strictly in
    /// order, so anything else is a bug in the caller.
    pub fn record(&mut self, index: usize, role: StageRole, text: String) {
        assert_eq!(
            index,
            self.outputs.len(),
            "stage {} recorded out of order",
            role
        );
        self.outputs.push(StageOutput { role, text });
    }

    /// Output the stage at `index` receives as its input, if any
    pub fn previous(&self, index: usize) -> Option<&StageOutput> {
        index.checked_sub(1).and_then(|i| self.outputs.get(i))
    }

    /// Roles of completed stages, in order
    pub fn completed_roles(&self) -> Vec<StageRole> {
        self.outputs.iter().map(|o| o.role).collect()
    }

    /// Take the final output, consuming the context
    pub fn into_last(mut self) -> Option<StageOutput> {
        self.outputs.pop()
    }
}
