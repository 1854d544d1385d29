//! Stage definitions and the fixed three-stage pipeline.
//!
//! A pipeline is always Writer, then Editor, then SEO. The built-in
//! definition can be replaced by a YAML file with the same shape, which
//! must pass the same validation.

use std::path::Path;
use std::sync::OnceLock;

use anyhow::{Context, Result};
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::params::PLACEHOLDERS;
use crate::domain::{RunParameters, StageRole};

/// Matches `{name}` placeholders in templates
fn placeholder_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("placeholder regex is valid"))
}

/// Substitute run parameters into a template.
///
/// Returns a new string; the template itself is never modified. Unknown
/// placeholders are left as written.
pub fn render_template(template: &str, params: &RunParameters) -> String {
    placeholder_regex()
        .replace_all(template, |caps: &Captures| {
            params
                .field(&caps[1])
                .map(str::to_string)
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

/// Placeholder names used by a template, in order of appearance
pub fn placeholders(template: &str) -> Vec<String> {
    placeholder_regex()
        .captures_iter(template)
        .map(|caps| caps[1].to_string())
        .collect()
}

/// Static description of one stage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageSpec {
    /// Which stage this is
    pub role: StageRole,

    /// What the stage is trying to achieve
    pub goal: String,

    /// Persona given to the completion service
    pub backstory: String,

    /// Instruction template; may reference run parameters as `{name}`
    pub instructions: String,

    /// Description of the output the stage must produce; may reference
    /// run parameters like `instructions`
    pub expected_output: String,

    /// Search query template; stages without one never search
    #[serde(default)]
    pub search_query: Option<String>,
}

/// Web research gathered for a stage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Research {
    pub query: String,
    pub snippets: Vec<String>,
}

impl StageSpec {
    /// Role title sent to the completion service
    pub fn title(&self) -> &'static str {
        self.role.title()
    }

    /// Whether this stage is granted the search tool
    pub fn uses_search(&self) -> bool {
        self.search_query.is_some()
    }

    /// Rendered search query, if the stage searches
    pub fn render_search_query(&self, params: &RunParameters) -> Option<String> {
        self.search_query
            .as_deref()
            .map(|template| render_template(template, params))
    }

    /// Assemble the full instructions for one invocation.
    ///
    /// Order: rendered template, research snippets, previous stage output,
    /// expected output.
    pub fn build_instructions(
        &self,
        params: &RunParameters,
        research: Option<&Research>,
        previous: Option<(StageRole, &str)>,
    ) -> String {
        let mut out = render_template(&self.instructions, params).trim().to_string();

        if let Some(research) = research {
            out.push_str(&format!(
                "\n\nWeb research for \"{}\":\n",
                research.query
            ));
            if research.snippets.is_empty() {
                out.push_str("(no results)\n");
            }
            for (i, snippet) in research.snippets.iter().enumerate() {
                out.push_str(&format!("{}. {}\n", i + 1, snippet));
            }
        }

        if let Some((role, text)) = previous {
            out.push_str(&format!(
                "\n\nPrevious stage input ({}):\n{}\n",
                role.title(),
                text.trim()
            ));
        }

        out.push_str(&format!(
            "\n\nExpected output: {}",
            render_template(&self.expected_output, params).trim()
        ));
        out
    }
}

/// The ordered Writer → Editor → SEO pipeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pipeline {
    /// Pipeline name (shown by the CLI)
    pub name: String,

    /// Human-readable description
    #[serde(default)]
    pub description: String,

    stages: [StageSpec; 3],
}

impl Pipeline {
    /// Build a pipeline from three stages, checking its invariants
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        stages: [StageSpec; 3],
    ) -> Result<Self, PipelineError> {
        let pipeline = Self {
            name: name.into(),
            description: description.into(),
            stages,
        };
        pipeline.validate()?;
        Ok(pipeline)
    }

    /// The built-in content team pipeline
    pub fn standard() -> Self {
        Self {
            name: "content-team".to_string(),
            description: "Writer drafts, editor polishes, SEO specialist optimizes".to_string(),
            stages: [writer_stage(), editor_stage(), seo_stage()],
        }
    }

    /// Load a pipeline from a YAML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read pipeline file: {}", path.display()))?;

        Self::from_yaml(&content)
            .with_context(|| format!("Invalid pipeline file: {}", path.display()))
    }

    /// Parse and validate a pipeline from YAML content
    pub fn from_yaml(content: &str) -> Result<Self> {
        let pipeline: Self =
            serde_yaml::from_str(content).context("Failed to parse pipeline YAML")?;
        pipeline.validate()?;
        Ok(pipeline)
    }

    /// Check the ordering, search grants and placeholders
    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.name.trim().is_empty() {
            return Err(PipelineError::EmptyName);
        }

        for (index, (stage, expected)) in self.stages.iter().zip(StageRole::ORDER).enumerate() {
            if stage.role != expected {
                return Err(PipelineError::OutOfOrder {
                    index,
                    expected,
                    found: stage.role,
                });
            }

            if stage.role == StageRole::Editor && stage.uses_search() {
                return Err(PipelineError::EditorSearch);
            }

            let templates = [&stage.instructions, &stage.expected_output]
                .into_iter()
                .chain(stage.search_query.as_ref());
            for template in templates {
                if let Some(unknown) = placeholders(template)
                    .into_iter()
                    .find(|name| !PLACEHOLDERS.contains(&name.as_str()))
                {
                    return Err(PipelineError::UnknownPlaceholder {
                        role: stage.role,
                        placeholder: unknown,
                    });
                }
            }
        }

        Ok(())
    }

    /// Stages in execution order
    pub fn stages(&self) -> &[StageSpec; 3] {
        &self.stages
    }

    /// Get a stage by role
    pub fn stage(&self, role: StageRole) -> &StageSpec {
        &self.stages[role.index()]
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::standard()
    }
}

/// Invalid pipeline definitions
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PipelineError {
    #[error("Pipeline name cannot be empty")]
    EmptyName,

    #[error("Stage {index} must be {expected}, found {found}")]
    OutOfOrder {
        index: usize,
        expected: StageRole,
        found: StageRole,
    },

    #[error("The editor stage cannot use web search")]
    EditorSearch,

    #[error("Stage {role} references unknown placeholder '{{{placeholder}}}'")]
    UnknownPlaceholder { role: StageRole, placeholder: String },
}

fn writer_stage() -> StageSpec {
    StageSpec {
        role: StageRole::Writer,
        goal: "Create engaging, well-structured, and original content based on given topics and requirements".to_string(),
        backstory: "You are an experienced content writer with 10+ years of experience in creating \
compelling blog posts, articles, and social media content. You have a talent for making complex \
topics accessible and engaging for various audiences. You excel at research, storytelling, and \
adapting your writing style to different brands and purposes."
            .to_string(),
        instructions: "Create original, engaging content on the given topic. The content should be:
- Well-researched and informative
- Engaging and easy to read
- Structured with clear headings and sections
- Tailored to the target audience
- Original and plagiarism-free

Topic: {topic}
Target Audience: {audience}
Content Type: {content_type}
Word Count: {word_count}

Provide the complete content with proper formatting."
            .to_string(),
        expected_output: "A complete, well-structured piece of content ready for editing".to_string(),
        search_query: Some("{topic}".to_string()),
    }
}

fn editor_stage() -> StageSpec {
    StageSpec {
        role: StageRole::Editor,
        goal: "Review, edit, and improve content quality, ensuring clarity, accuracy, and brand consistency".to_string(),
        backstory: "You are a meticulous content editor with extensive experience in proofreading, \
fact-checking, and improving content quality. You have an eye for detail and ensure all content \
meets high standards for grammar, style, clarity, and factual accuracy. You work with various \
content types and maintain brand voice consistency."
            .to_string(),
        instructions: "Review and edit the content provided by the writer. Focus on:
- Grammar, spelling, and punctuation
- Sentence structure and flow
- Clarity and readability
- Fact-checking and accuracy
- Brand voice consistency
- Overall content quality

The content is a {content_type} for {audience}, targeting {word_count} words.
Provide the edited version with explanations of major changes made."
            .to_string(),
        expected_output: "A polished, error-free version of the content with editing notes".to_string(),
        search_query: None,
    }
}

fn seo_stage() -> StageSpec {
    StageSpec {
        role: StageRole::Seo,
        goal: "Optimize content for search engines and social media, ensuring maximum visibility and engagement".to_string(),
        backstory: "You are a digital marketing expert specializing in SEO and social media \
optimization. You have deep knowledge of search algorithms, keyword research, and social media \
best practices. You excel at making content discoverable while maintaining readability and user \
experience."
            .to_string(),
        instructions: "Optimize the edited content for search engines and social media. Include:
- Relevant keywords naturally integrated
- SEO-friendly title and meta description
- Social media snippets (Twitter, LinkedIn, Facebook)
- Internal linking suggestions
- Call-to-action optimization
- Readability improvements

Provide the final optimized content with SEO recommendations."
            .to_string(),
        expected_output: "SEO-optimized content with social media versions and optimization recommendations".to_string(),
        search_query: Some("{topic} SEO keywords".to_string()),
    }
}
