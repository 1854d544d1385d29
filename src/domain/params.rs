//! Run parameters supplied by the caller.
//!
//! Parameters are validated once, before any collaborator is contacted.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Audience used when the caller does not name one
pub const DEFAULT_AUDIENCE: &str = "general audience";

/// Content type used when the caller does not name one
pub const DEFAULT_CONTENT_TYPE: &str = "blog post";

/// Word count range used when the caller does not name one
pub const DEFAULT_WORD_COUNT: &str = "800-1000";

/// Inputs for one pipeline run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunParameters {
    /// Subject of the content
    pub topic: String,

    /// Who the content is written for
    pub audience: String,

    /// Kind of content (blog post, article, report...)
    pub content_type: String,

    /// Desired length as "<low>-<high>"
    pub word_count: String,
}

impl RunParameters {
    /// Create parameters with every field given
    pub fn new(
        topic: impl Into<String>,
        audience: impl Into<String>,
        content_type: impl Into<String>,
        word_count: impl Into<String>,
    ) -> Self {
        Self {
            topic: topic.into(),
            audience: audience.into(),
            content_type: content_type.into(),
            word_count: word_count.into(),
        }
    }

    /// Create parameters for a topic, defaulting everything else
    pub fn for_topic(topic: impl Into<String>) -> Self {
        Self::new(topic, DEFAULT_AUDIENCE, DEFAULT_CONTENT_TYPE, DEFAULT_WORD_COUNT)
    }

    /// Check every field, returning the parsed word count range
    pub fn validate(&self) -> Result<WordCountRange, InvalidParameters> {
        for (field, value) in [
            ("topic", &self.topic),
            ("audience", &self.audience),
            ("content_type", &self.content_type),
        ] {
            if value.trim().is_empty() {
                return Err(InvalidParameters::EmptyField { field });
            }
        }

        self.word_count.parse()
    }

    /// Look up a field by its placeholder name
    pub fn field(&self, name: &str) -> Option<&str> {
        match name {
            "topic" => Some(&self.topic),
            "audience" => Some(&self.audience),
            "content_type" => Some(&self.content_type),
            "word_count" => Some(&self.word_count),
            _ => None,
        }
    }
}

/// Placeholder names a template may reference
pub const PLACEHOLDERS: [&str; 4] = ["topic", "audience", "content_type", "word_count"];

/// Parsed "<low>-<high>" word count range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WordCountRange {
    pub low: u32,
    pub high: u32,
}

impl WordCountRange {
    /// Build a range centered on `target`, `spread` words either side
    pub fn around(target: u32, spread: u32) -> Result<Self, InvalidParameters> {
        let low = target.saturating_sub(spread).max(1);
        let high = target.saturating_add(spread);
        if low >= high {
            return Err(InvalidParameters::InvertedWordCount { low, high });
        }
        Ok(Self { low, high })
    }
}

impl FromStr for WordCountRange {
    type Err = InvalidParameters;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || InvalidParameters::MalformedWordCount {
            value: s.to_string(),
        };

        let (low, high) = s.split_once('-').ok_or_else(malformed)?;
        let low: u32 = low.trim().parse().map_err(|_| malformed())?;
        let high: u32 = high.trim().parse().map_err(|_| malformed())?;

        if low >= high {
            return Err(InvalidParameters::InvertedWordCount { low, high });
        }

        Ok(Self { low, high })
    }
}

impl fmt::Display for WordCountRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.low, self.high)
    }
}

/// Malformed or missing run parameters
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidParameters {
    #[error("Parameter '{field}' must not be empty")]
    EmptyField { field: &'static str },

    #[error("Word count '{value}' is not of the form <low>-<high>")]
    MalformedWordCount { value: String },

    #[error("Word count range is inverted: {low} must be below {high}")]
    InvertedWordCount { low: u32, high: u32 },
}
