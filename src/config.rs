//! Configuration for quillcrew.
//!
//! Configuration sources (highest priority first):
//! 1. Environment variables (GOOGLE_API_KEY, SERPER_API_KEY, QUILLCREW_MODEL,
//!    QUILLCREW_OUTPUT_DIR), including values from a `.env` file
//! 2. Config file (.quillcrew/config.yaml)
//! 3. Defaults
//!
//! Config file discovery:
//! - Searches current directory and parents for .quillcrew/config.yaml
//! - Falls back to the user config directory (e.g. ~/.config/quillcrew/config.yaml)
//! - Paths in the config file are relative to the project root (the parent of .quillcrew/)

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::adapters::{gemini, serper, GeminiConfig, SerperConfig};
use crate::core::DEFAULT_MAX_SNIPPETS;

/// Environment variable holding the Gemini API key
pub const GOOGLE_API_KEY: &str = "GOOGLE_API_KEY";

/// Environment variable holding the Serper API key
pub const SERPER_API_KEY: &str = "SERPER_API_KEY";

/// Environment variable overriding the model
pub const MODEL_ENV: &str = "QUILLCREW_MODEL";

/// Environment variable overriding the output directory
pub const OUTPUT_DIR_ENV: &str = "QUILLCREW_OUTPUT_DIR";

/// Global cached configuration (stores Result to handle init errors)
static CONFIG: OnceLock<Result<ResolvedConfig, String>> = OnceLock::new();

/// Raw config file schema (matches YAML structure)
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigFile {
    pub version: String,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub output: OutputConfig,
    /// Pipeline override file (relative to the project root)
    #[serde(default)]
    pub pipeline: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LlmConfig {
    pub model: Option<String>,
    pub base_url: Option<String>,
    pub temperature: Option<f32>,
    pub max_output_tokens: Option<u32>,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchConfig {
    pub base_url: Option<String>,
    pub max_snippets: Option<usize>,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OutputConfig {
    pub dir: Option<String>,
}

/// API keys for the two collaborators
#[derive(Clone, Default)]
pub struct Credentials {
    pub google_api_key: Option<String>,
    pub serper_api_key: Option<String>,
}

impl Credentials {
    /// Names of the environment variables that are not set
    pub fn missing(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.google_api_key.is_none() {
            missing.push(GOOGLE_API_KEY);
        }
        if self.serper_api_key.is_none() {
            missing.push(SERPER_API_KEY);
        }
        missing
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = |key: &Option<String>| if key.is_some() { "set" } else { "missing" };
        f.debug_struct("Credentials")
            .field("google_api_key", &state(&self.google_api_key))
            .field("serper_api_key", &state(&self.serper_api_key))
            .finish()
    }
}

/// Resolved LLM settings
#[derive(Debug, Clone)]
pub struct LlmSettings {
    pub model: String,
    pub base_url: String,
    pub temperature: f32,
    pub max_output_tokens: Option<u32>,
    pub timeout_seconds: u64,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            model: gemini::DEFAULT_MODEL.to_string(),
            base_url: gemini::DEFAULT_BASE_URL.to_string(),
            temperature: 0.7,
            max_output_tokens: None,
            timeout_seconds: 120,
        }
    }
}

impl LlmSettings {
    /// Client config for the given key
    pub fn gemini_config(&self, api_key: &str) -> GeminiConfig {
        GeminiConfig {
            api_key: api_key.to_string(),
            model: self.model.clone(),
            base_url: self.base_url.clone(),
            temperature: self.temperature,
            max_output_tokens: self.max_output_tokens,
            timeout: Duration::from_secs(self.timeout_seconds),
        }
    }
}

/// Resolved search settings
#[derive(Debug, Clone)]
pub struct SearchSettings {
    pub base_url: String,
    pub max_snippets: usize,
    pub timeout_seconds: u64,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            base_url: serper::DEFAULT_BASE_URL.to_string(),
            max_snippets: DEFAULT_MAX_SNIPPETS,
            timeout_seconds: 30,
        }
    }
}

impl SearchSettings {
    /// Client config for the given key
    pub fn serper_config(&self, api_key: &str) -> SerperConfig {
        SerperConfig {
            api_key: api_key.to_string(),
            base_url: self.base_url.clone(),
            timeout: Duration::from_secs(self.timeout_seconds),
        }
    }
}

/// Resolved configuration with absolute paths
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub credentials: Credentials,
    pub llm: LlmSettings,
    pub search: SearchSettings,
    /// Where saved content goes
    pub output_dir: PathBuf,
    /// Pipeline override file, if configured
    pub pipeline_file: Option<PathBuf>,
    /// Path to config file (if found)
    pub config_file: Option<PathBuf>,
}

/// Find config file by searching current directory and parents
fn find_config_file(start: &Path) -> Option<PathBuf> {
    let mut current = start.to_path_buf();

    loop {
        let config_path = current.join(".quillcrew").join("config.yaml");
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            break;
        }
    }

    dirs::config_dir()
        .map(|dir| dir.join("quillcrew").join("config.yaml"))
        .filter(|path| path.exists())
}

/// Load and parse config file
fn load_config_file(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Resolve a path that may be relative to `base`
fn resolve_path(base: &Path, path_str: &str) -> PathBuf {
    let path = PathBuf::from(path_str);
    if path.is_absolute() {
        path
    } else {
        base.join(path)
    }
}

/// Directory that relative paths in a config file resolve against.
///
/// For `<project>/.quillcrew/config.yaml` this is the project root; for a
/// file in the user config directory it is the directory holding the file.
fn config_base_dir(path: &Path) -> &Path {
    let parent = path.parent().unwrap_or(Path::new("."));
    if parent.file_name().is_some_and(|name| name == ".quillcrew") {
        parent.parent().unwrap_or(parent)
    } else {
        parent
    }
}

/// Combine an optional config file with environment lookups
fn resolve(
    config: Option<(&Path, ConfigFile)>,
    cwd: &Path,
    env: impl Fn(&str) -> Option<String>,
) -> ResolvedConfig {
    let env = |name: &str| env(name).filter(|v| !v.trim().is_empty());

    let credentials = Credentials {
        google_api_key: env(GOOGLE_API_KEY),
        serper_api_key: env(SERPER_API_KEY),
    };

    let mut llm = LlmSettings::default();
    let mut search = SearchSettings::default();
    let mut output_dir = cwd.join("output");
    let mut pipeline_file = None;
    let mut config_file = None;

    if let Some((path, file)) = config {
        let base_dir = config_base_dir(path);

        if let Some(model) = file.llm.model {
            llm.model = model;
        }
        if let Some(base_url) = file.llm.base_url {
            llm.base_url = base_url;
        }
        if let Some(temperature) = file.llm.temperature {
            llm.temperature = temperature;
        }
        llm.max_output_tokens = file.llm.max_output_tokens;
        if let Some(timeout) = file.llm.timeout_seconds {
            llm.timeout_seconds = timeout;
        }

        if let Some(base_url) = file.search.base_url {
            search.base_url = base_url;
        }
        if let Some(max_snippets) = file.search.max_snippets {
            search.max_snippets = max_snippets;
        }
        if let Some(timeout) = file.search.timeout_seconds {
            search.timeout_seconds = timeout;
        }

        if let Some(ref dir) = file.output.dir {
            output_dir = resolve_path(base_dir, dir);
        }
        pipeline_file = file.pipeline.as_deref().map(|p| resolve_path(base_dir, p));
        config_file = Some(path.to_path_buf());
    }

    if let Some(model) = env(MODEL_ENV) {
        llm.model = model;
    }
    if let Some(dir) = env(OUTPUT_DIR_ENV) {
        output_dir = PathBuf::from(dir);
    }

    ResolvedConfig {
        credentials,
        llm,
        search,
        output_dir,
        pipeline_file,
        config_file,
    }
}

/// Load configuration from all sources
fn load_config() -> Result<ResolvedConfig> {
    // A missing .env is fine
    dotenvy::dotenv().ok();

    let cwd = std::env::current_dir().context("Failed to determine current directory")?;

    let config = match find_config_file(&cwd) {
        Some(path) => {
            let file = load_config_file(&path)?;
            Some((path, file))
        }
        None => None,
    };

    Ok(resolve(
        config.as_ref().map(|(path, file)| (path.as_path(), file.clone())),
        &cwd,
        |name| std::env::var(name).ok(),
    ))
}

/// Get the global configuration (loads once, then cached)
pub fn config() -> Result<&'static ResolvedConfig> {
    let result = CONFIG.get_or_init(|| load_config().map_err(|e| format!("{:#}", e)));

    match result {
        Ok(config) => Ok(config),
        Err(e) => anyhow::bail!("{}", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::TempDir;

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults_without_file() {
        let cwd = PathBuf::from("/work");
        let config = resolve(None, &cwd, env_from(&[]));

        assert_eq!(config.llm.model, "gemini-2.0-flash-exp");
        assert_eq!(config.llm.timeout_seconds, 120);
        assert_eq!(config.search.max_snippets, 5);
        assert_eq!(config.output_dir, PathBuf::from("/work/output"));
        assert!(config.config_file.is_none());
        assert_eq!(
            config.credentials.missing(),
            vec![GOOGLE_API_KEY, SERPER_API_KEY]
        );
    }

    #[test]
    fn test_env_credentials_and_overrides() {
        let cwd = PathBuf::from("/work");
        let config = resolve(
            None,
            &cwd,
            env_from(&[
                (GOOGLE_API_KEY, "g-key"),
                (SERPER_API_KEY, "  "),
                (MODEL_ENV, "gemini-2.5-flash"),
                (OUTPUT_DIR_ENV, "/tmp/out"),
            ]),
        );

        assert_eq!(config.credentials.google_api_key.as_deref(), Some("g-key"));
        // Blank values count as missing
        assert_eq!(config.credentials.missing(), vec![SERPER_API_KEY]);
        assert_eq!(config.llm.model, "gemini-2.5-flash");
        assert_eq!(config.output_dir, PathBuf::from("/tmp/out"));
    }

    #[test]
    fn test_config_file_parsing_and_resolution() {
        let temp = TempDir::new().unwrap();
        let dot_dir = temp.path().join(".quillcrew");
        std::fs::create_dir_all(&dot_dir).unwrap();

        let config_path = dot_dir.join("config.yaml");
        let mut file = std::fs::File::create(&config_path).unwrap();
        writeln!(
            file,
            r#"
version: "1.0"
llm:
  model: gemini-1.5-pro
  temperature: 0.3
  max_output_tokens: 4096
search:
  max_snippets: 3
output:
  dir: drafts
pipeline: pipelines/team.yaml
"#
        )
        .unwrap();

        let parsed = load_config_file(&config_path).unwrap();
        assert_eq!(parsed.version, "1.0");
        assert_eq!(parsed.llm.model.as_deref(), Some("gemini-1.5-pro"));

        let config = resolve(
            Some((config_path.as_path(), parsed)),
            temp.path(),
            env_from(&[(MODEL_ENV, "from-env")]),
        );

        // Env wins over file
        assert_eq!(config.llm.model, "from-env");
        assert_eq!(config.llm.temperature, 0.3);
        assert_eq!(config.llm.max_output_tokens, Some(4096));
        assert_eq!(config.search.max_snippets, 3);
        assert_eq!(config.output_dir, temp.path().join("drafts"));
        assert_eq!(
            config.pipeline_file,
            Some(temp.path().join("pipelines/team.yaml"))
        );
        assert_eq!(config.config_file, Some(config_path));
    }

    #[test]
    fn test_user_config_dir_paths_resolve_next_to_file() {
        let config_path = PathBuf::from("/home/u/.config/quillcrew/config.yaml");
        let file: ConfigFile = serde_yaml::from_str(
            "version: \"1.0\"\noutput:\n  dir: drafts\npipeline: team.yaml\n",
        )
        .unwrap();

        let config = resolve(
            Some((config_path.as_path(), file)),
            Path::new("/work"),
            env_from(&[]),
        );

        assert_eq!(
            config.output_dir,
            PathBuf::from("/home/u/.config/quillcrew/drafts")
        );
        assert_eq!(
            config.pipeline_file,
            Some(PathBuf::from("/home/u/.config/quillcrew/team.yaml"))
        );
    }

    #[test]
    fn test_config_base_dir() {
        assert_eq!(
            config_base_dir(Path::new("/repo/.quillcrew/config.yaml")),
            Path::new("/repo")
        );
        assert_eq!(
            config_base_dir(Path::new("/home/u/.config/quillcrew/config.yaml")),
            Path::new("/home/u/.config/quillcrew")
        );
    }

    #[test]
    fn test_find_config_in_parent() {
        let temp = TempDir::new().unwrap();
        let dot_dir = temp.path().join(".quillcrew");
        std::fs::create_dir_all(&dot_dir).unwrap();
        std::fs::write(dot_dir.join("config.yaml"), "version: \"1.0\"\n").unwrap();

        let nested = temp.path().join("a").join("b");
        std::fs::create_dir_all(&nested).unwrap();

        assert_eq!(
            find_config_file(&nested),
            Some(dot_dir.join("config.yaml"))
        );
    }

    #[test]
    fn test_settings_to_client_configs() {
        let llm = LlmSettings::default();
        let gemini = llm.gemini_config("k");
        assert_eq!(gemini.api_key, "k");
        assert_eq!(gemini.timeout, Duration::from_secs(120));

        let serper = SearchSettings::default().serper_config("s");
        assert_eq!(serper.base_url, "https://google.serper.dev");
        assert_eq!(serper.timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_credentials_debug_hides_keys() {
        let creds = Credentials {
            google_api_key: Some("secret-value".to_string()),
            serper_api_key: None,
        };
        let printed = format!("{:?}", creds);
        assert!(!printed.contains("secret-value"));
        assert!(printed.contains("set"));
        assert!(printed.contains("missing"));
    }

    #[test]
    fn test_resolve_relative_path() {
        let base = PathBuf::from("/home/user/project");

        assert_eq!(
            resolve_path(&base, "./subdir"),
            PathBuf::from("/home/user/project/./subdir")
        );
        assert_eq!(
            resolve_path(&base, "/absolute/path"),
            PathBuf::from("/absolute/path")
        );
    }
}
