//! Stage roles of the content pipeline.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One of the three fixed pipeline stages.
///
/// The derived ordering is the execution order: `Writer < Editor < Seo`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageRole {
    /// Drafts the content from the run parameters
    Writer,

    /// Polishes the writer's draft
    Editor,

    /// Optimizes the edited draft for search and social
    Seo,
}

impl StageRole {
    /// All roles in execution order
    pub const ORDER: [StageRole; 3] = [StageRole::Writer, StageRole::Editor, StageRole::Seo];

    /// Human-readable role title given to the completion service
    pub fn title(self) -> &'static str {
        match self {
            Self::Writer => "Content Writer",
            Self::Editor => "Content Editor",
            Self::Seo => "SEO Specialist",
        }
    }

    /// Position of this role in the pipeline
    pub fn index(self) -> usize {
        match self {
            Self::Writer => 0,
            Self::Editor => 1,
            Self::Seo => 2,
        }
    }
}

impl fmt::Display for StageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Writer => "writer",
            Self::Editor => "editor",
            Self::Seo => "seo",
        };
        f.pad(name)
    }
}
