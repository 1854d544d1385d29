//! Deterministic stand-in content used when a run cannot reach its
//! collaborators.

use crate::domain::{RunParameters, RunResult};

/// Builds simulated results from run parameters alone
#[derive(Debug, Clone, Copy, Default)]
pub struct FallbackGenerator;

impl FallbackGenerator {
    pub fn new() -> Self {
        Self
    }

    /// Simulated result for `params`. Performs no I/O and cannot fail.
    pub fn generate(&self, params: &RunParameters) -> RunResult {
        RunResult::simulation(params.clone(), render(params))
    }
}

/// The simulated document. Depends on `params` only.
pub fn render(params: &RunParameters) -> String {
    let RunParameters {
        topic,
        audience,
        content_type,
        word_count,
    } = params;

    format!(
        "# {topic}

## Introduction

This is a simulated content piece about {topic}, designed for {audience}.
The content would be structured as a {content_type} with approximately {word_count} words.

## Key Points

- **Point 1**: Why {topic} matters to {audience} right now
- **Point 2**: The core ideas behind {topic}, explained without jargon
- **Point 3**: Practical steps {audience} can take today
- **Point 4**: Where {topic} is heading next

## Conclusion

{topic} offers real opportunities for {audience}, and a well-researched
{content_type} is a good way to explore them.

## Workflow

- Writer Agent creates content (LLM + web search)
- Editor Agent reviews and improves (LLM)
- SEO Agent optimizes for search engines (LLM + web search)

---

*This is simulated content. For real content generation, ensure your API keys are properly configured.*
"
    )
}
