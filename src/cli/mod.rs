//! Command-line interface for quillcrew.
//!
//! Provides commands for running the content pipeline, producing simulated
//! content, inspecting the stages, smoke-testing the collaborators and
//! showing the resolved configuration.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::warn;

use crate::adapters::{GeminiClient, SerperClient};
use crate::config::{self, ResolvedConfig};
use crate::core::{FallbackGenerator, Orchestrator, Pipeline};
use crate::domain::params::{DEFAULT_AUDIENCE, DEFAULT_CONTENT_TYPE, DEFAULT_WORD_COUNT};
use crate::domain::{RunParameters, RunResult, RunStatus, WordCountRange};

pub mod output;

/// Words added either side of `--words` to form a range
pub const WORD_SPREAD: u32 = 200;

/// quillcrew - writer, editor and SEO agents for content creation
#[derive(Parser, Debug)]
#[command(name = "quillcrew")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the writer → editor → SEO pipeline
    Run {
        #[command(flatten)]
        content: ContentArgs,

        #[command(flatten)]
        output: OutputArgs,

        /// Pipeline override file (YAML)
        #[arg(long)]
        pipeline: Option<PathBuf>,

        /// Give up on the collaborators after this many seconds and simulate
        #[arg(long)]
        timeout: Option<u64>,
    },

    /// Produce simulated content without calling any API
    Simulate {
        #[command(flatten)]
        content: ContentArgs,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// List the pipeline stages
    Stages {
        /// Pipeline override file (YAML)
        #[arg(long)]
        pipeline: Option<PathBuf>,
    },

    /// Run a small test topic through the pipeline
    Check {
        /// Give up after this many seconds
        #[arg(long, default_value = "300")]
        timeout: u64,
    },

    /// Show resolved configuration (debug)
    Config,
}

/// Parameters describing the content to create
#[derive(Args, Debug, Clone)]
pub struct ContentArgs {
    /// Topic for the content
    #[arg(short, long)]
    pub topic: String,

    /// Target audience
    #[arg(short, long, default_value = DEFAULT_AUDIENCE)]
    pub audience: String,

    /// Content type (blog post, article, report, whitepaper...)
    #[arg(short, long, default_value = DEFAULT_CONTENT_TYPE)]
    pub content_type: String,

    /// Word count range, e.g. 800-1000
    #[arg(short, long, conflicts_with = "words")]
    pub word_count: Option<String>,

    /// Target word count; expands to a range of ±200 words
    #[arg(long)]
    pub words: Option<u32>,
}

impl ContentArgs {
    /// Convert to run parameters
    pub fn into_params(self) -> Result<RunParameters> {
        let word_count = match (self.word_count, self.words) {
            (Some(range), _) => range,
            (None, Some(words)) => WordCountRange::around(words, WORD_SPREAD)?.to_string(),
            (None, None) => DEFAULT_WORD_COUNT.to_string(),
        };

        Ok(RunParameters::new(
            self.topic,
            self.audience,
            self.content_type,
            word_count,
        ))
    }
}

/// Where and how to present the result
#[derive(Args, Debug, Clone, Default)]
pub struct OutputArgs {
    /// Write the content to this file
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Save the content to the configured output directory
    #[arg(long, conflicts_with = "output")]
    pub save: bool,

    /// Print the full result as JSON
    #[arg(long)]
    pub json: bool,

    /// Strip HTML from the content
    #[arg(long, conflicts_with = "json")]
    pub plain: bool,
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(self) -> Result<()> {
        match self.command {
            Commands::Run {
                content,
                output,
                pipeline,
                timeout,
            } => run_content(content, output, pipeline, timeout).await,
            Commands::Simulate { content, output } => simulate(content, output).await,
            Commands::Stages { pipeline } => show_stages(pipeline),
            Commands::Check { timeout } => check(timeout).await,
            Commands::Config => show_config(),
        }
    }
}

/// Run the pipeline for the given parameters
async fn run_content(
    content: ContentArgs,
    output: OutputArgs,
    pipeline: Option<PathBuf>,
    timeout: Option<u64>,
) -> Result<()> {
    let params = content.into_params()?;
    params.validate()?;

    let cfg = config::config()?;
    let orchestrator = build_orchestrator(cfg, pipeline.as_deref())?;

    eprintln!("Topic:      {}", params.topic);
    eprintln!("Audience:   {}", params.audience);
    eprintln!("Type:       {}", params.content_type);
    eprintln!("Word count: {}", params.word_count);
    eprintln!("Model:      {}", cfg.llm.model);
    eprintln!();

    let result = execute_run(&orchestrator, params, timeout.map(Duration::from_secs)).await?;
    report(&result, &output).await
}

/// Produce simulated content
async fn simulate(content: ContentArgs, output: OutputArgs) -> Result<()> {
    let params = content.into_params()?;
    params.validate()?;

    let result = FallbackGenerator::new().generate(&params);
    report(&result, &output).await
}

/// Smoke-test the collaborators with a fixed small topic
async fn check(timeout: u64) -> Result<()> {
    let cfg = config::config()?;
    let orchestrator = build_orchestrator(cfg, None)?;
    let params = RunParameters::new("Test Topic", "test audience", "blog post", "500-600");

    let result = execute_run(&orchestrator, params, Some(Duration::from_secs(timeout))).await?;

    match result.status() {
        RunStatus::Success => {
            println!("System check successful: all stages completed");
            Ok(())
        }
        RunStatus::Simulation => {
            println!("System check completed in simulation mode");
            if let Some(reason) = result.fallback_reason() {
                println!("  Reason: {}", reason);
            }
            std::process::exit(1);
        }
    }
}

/// Build an orchestrator backed by the HTTP collaborators.
///
/// Fails when credentials are missing, before anything is sent.
fn build_orchestrator(cfg: &ResolvedConfig, pipeline: Option<&Path>) -> Result<Orchestrator> {
    let (Some(google_key), Some(serper_key)) = (
        cfg.credentials.google_api_key.as_deref(),
        cfg.credentials.serper_api_key.as_deref(),
    ) else {
        anyhow::bail!(
            "API keys not configured: {} (set them in the environment or a .env file)",
            cfg.credentials.missing().join(", ")
        );
    };

    let completion = Arc::new(GeminiClient::new(cfg.llm.gemini_config(google_key))?);
    let search = Arc::new(SerperClient::new(cfg.search.serper_config(serper_key))?);
    let pipeline = load_pipeline(pipeline.or(cfg.pipeline_file.as_deref()))?;

    let orchestrator = Orchestrator::with_pipeline(pipeline, completion, search)
        .context("Invalid pipeline definition")?
        .with_max_snippets(cfg.search.max_snippets);

    Ok(orchestrator)
}

/// Run, optionally bounded by a timeout that falls back to simulation
async fn execute_run(
    orchestrator: &Orchestrator,
    params: RunParameters,
    timeout: Option<Duration>,
) -> Result<RunResult> {
    let Some(limit) = timeout else {
        return Ok(orchestrator.run(params).await?);
    };

    match tokio::time::timeout(limit, orchestrator.run(params.clone())).await {
        Ok(result) => Ok(result?),
        Err(_) => {
            warn!(timeout_secs = limit.as_secs(), "Run timed out, falling back to simulation mode");
            Ok(FallbackGenerator::new()
                .generate(&params)
                .with_fallback_reason(format!("Run timed out after {:?}", limit)))
        }
    }
}

/// Print the result and save it if requested
async fn report(result: &RunResult, output: &OutputArgs) -> Result<()> {
    let content = if output.plain {
        output::plain_text(result.payload())
    } else {
        result.payload().to_string()
    };

    if output.json {
        println!(
            "{}",
            serde_json::to_string_pretty(result).context("Failed to serialize result")?
        );
    } else {
        println!("{}", content);
    }

    match result.status() {
        RunStatus::Success => {
            let stages: Vec<String> = result
                .stages_completed()
                .iter()
                .map(|s| s.to_string())
                .collect();
            eprintln!(
                "\n[Run {} completed successfully: {}]",
                result.id(),
                stages.join(" → ")
            );
        }
        RunStatus::Simulation => {
            eprintln!("\n[Run {}: {}]", result.id(), result.message());
            if let Some(reason) = result.fallback_reason() {
                eprintln!("[Reason: {}]", reason);
            }
        }
    }

    let target = match (&output.output, output.save) {
        (Some(path), _) => Some(path.clone()),
        (None, true) => Some(config::config()?.output_dir.join(result.suggested_file_name())),
        (None, false) => None,
    };

    if let Some(path) = target {
        output::write_payload(&path, &content).await?;
        eprintln!("[Saved to {}]", path.display());
    }

    Ok(())
}

/// List stages of the active pipeline
fn show_stages(pipeline: Option<PathBuf>) -> Result<()> {
    let pipeline = select_pipeline(pipeline.as_deref(), config::config)?;

    println!("Pipeline: {}", pipeline.name);
    if !pipeline.description.is_empty() {
        println!("  {}", pipeline.description);
    }
    println!();

    for (i, stage) in pipeline.stages().iter().enumerate() {
        let search = match &stage.search_query {
            Some(query) => format!("search: \"{}\"", query),
            None => "no search".to_string(),
        };
        println!("{}. {:<8} {:<16} {}", i + 1, stage.role, stage.title(), search);
        println!("   Goal: {}", stage.goal);
    }

    Ok(())
}

/// Pipeline named on the command line, else the configured one.
///
/// Configuration is only consulted without an explicit file, and a broken
/// config file is an error rather than a silent fall back to the built-in.
fn select_pipeline<'a>(
    explicit: Option<&Path>,
    cfg: impl FnOnce() -> Result<&'a ResolvedConfig>,
) -> Result<Pipeline> {
    match explicit {
        Some(path) => Pipeline::from_file(path),
        None => load_pipeline(cfg()?.pipeline_file.as_deref()),
    }
}

/// Load a pipeline override, or the built-in pipeline
fn load_pipeline(path: Option<&Path>) -> Result<Pipeline> {
    match path {
        Some(path) => Pipeline::from_file(path),
        None => Ok(Pipeline::standard()),
    }
}

/// Show resolved configuration
fn show_config() -> Result<()> {
    let cfg = config::config()?;
    let key_state = |key: &Option<String>| if key.is_some() { "set" } else { "MISSING" };

    println!("quillcrew configuration");
    println!();
    println!(
        "Config file: {}",
        cfg.config_file
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "(none - using defaults)".to_string())
    );
    println!();
    println!("Credentials:");
    println!("  {}: {}", config::GOOGLE_API_KEY, key_state(&cfg.credentials.google_api_key));
    println!("  {}: {}", config::SERPER_API_KEY, key_state(&cfg.credentials.serper_api_key));
    println!();
    println!("LLM:");
    println!("  Model:       {}", cfg.llm.model);
    println!("  Endpoint:    {}", cfg.llm.base_url);
    println!("  Temperature: {}", cfg.llm.temperature);
    println!("  Timeout:     {}s", cfg.llm.timeout_seconds);
    println!();
    println!("Search:");
    println!("  Endpoint:     {}", cfg.search.base_url);
    println!("  Max snippets: {}", cfg.search.max_snippets);
    println!("  Timeout:      {}s", cfg.search.timeout_seconds);
    println!();
    println!("Output directory: {}", cfg.output_dir.display());
    println!(
        "Pipeline:         {}",
        cfg.pipeline_file
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "(built-in)".to_string())
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_run() {
        let cli = Cli::try_parse_from([
            "quillcrew",
            "run",
            "--topic",
            "Rust",
            "--words",
            "1000",
            "--save",
        ])
        .unwrap();

        let Commands::Run { content, output, .. } = cli.command else {
            panic!("expected run command");
        };
        assert!(output.save);

        let params = content.into_params().unwrap();
        assert_eq!(params.word_count, "800-1200");
        assert_eq!(params.audience, DEFAULT_AUDIENCE);
        assert_eq!(params.content_type, DEFAULT_CONTENT_TYPE);
    }

    #[test]
    fn test_word_count_and_words_conflict() {
        let result = Cli::try_parse_from([
            "quillcrew",
            "simulate",
            "-t",
            "Rust",
            "-w",
            "800-1000",
            "--words",
            "900",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_json_and_plain_conflict() {
        let result = Cli::try_parse_from([
            "quillcrew", "simulate", "-t", "Rust", "--json", "--plain",
        ]);
        assert!(result.is_err());

        let cli = Cli::try_parse_from(["quillcrew", "simulate", "-t", "Rust", "--plain"]).unwrap();
        let Commands::Simulate { output, .. } = cli.command else {
            panic!("expected simulate command");
        };
        assert!(output.plain);
        assert!(!output.json);
    }

    #[test]
    fn test_default_word_count() {
        let cli = Cli::try_parse_from(["quillcrew", "simulate", "-t", "Rust", "-c", "report"]).unwrap();
        let Commands::Simulate { content, .. } = cli.command else {
            panic!("expected simulate command");
        };
        let params = content.into_params().unwrap();
        assert_eq!(params.word_count, DEFAULT_WORD_COUNT);
        assert_eq!(params.content_type, "report");
    }

    fn bare_config() -> ResolvedConfig {
        ResolvedConfig {
            credentials: config::Credentials::default(),
            llm: config::LlmSettings::default(),
            search: config::SearchSettings::default(),
            output_dir: PathBuf::from("output"),
            pipeline_file: None,
            config_file: None,
        }
    }

    #[test]
    fn test_stage_listing_surfaces_config_errors() {
        let err = select_pipeline(None, || {
            Err(anyhow::anyhow!("Failed to parse config file: .quillcrew/config.yaml"))
        })
        .unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));

        let cfg = bare_config();
        let pipeline = select_pipeline(None, || Ok(&cfg)).unwrap();
        assert_eq!(pipeline, Pipeline::standard());
    }

    #[test]
    fn test_explicit_pipeline_skips_config() {
        let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("pipelines/newsletter.yaml");
        let pipeline = select_pipeline(Some(&path), || {
            Err(anyhow::anyhow!("config should not be loaded"))
        })
        .unwrap();
        assert_eq!(pipeline.name, "newsletter");
    }

    #[test]
    fn test_missing_credentials_rejected() {
        let cfg = bare_config();

        let err = build_orchestrator(&cfg, None).err().unwrap();
        assert!(err.to_string().contains("GOOGLE_API_KEY"));
        assert!(err.to_string().contains("SERPER_API_KEY"));
    }

    #[tokio::test]
    async fn test_timeout_falls_back() {
        use crate::adapters::{CompletionError, CompletionService, SearchError, SearchTool};
        use async_trait::async_trait;

        struct Slow;

        #[async_trait]
        impl CompletionService for Slow {
            fn name(&self) -> &str {
                "slow"
            }

            async fn generate(
                &self,
                _role: &str,
                _goal: &str,
                _backstory: &str,
                _instructions: &str,
            ) -> Result<String, CompletionError> {
                tokio::time::sleep(Duration::from_secs(60)).await;
                Ok(String::new())
            }
        }

        #[async_trait]
        impl SearchTool for Slow {
            fn name(&self) -> &str {
                "slow"
            }

            async fn search(&self, _query: &str) -> Result<Vec<String>, SearchError> {
                Ok(Vec::new())
            }
        }

        let orchestrator = Orchestrator::new(Arc::new(Slow), Arc::new(Slow));
        let params = RunParameters::for_topic("Rust");
        let result = execute_run(&orchestrator, params, Some(Duration::from_millis(20)))
            .await
            .unwrap();

        assert_eq!(result.status(), RunStatus::Simulation);
        assert_eq!(result.fallback_reason(), Some("Run timed out after 20ms"));
    }
}
