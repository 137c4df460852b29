//! Configuration loading with env-var overrides.
//!
//! Reads `config/default.toml` relative to the current working directory,
//! then applies `MYNAH_WORK_DIR` and `MYNAH_LOG_LEVEL` env overrides. The
//! LLM API key is sourced from `LLM_API_KEY` only, never from TOML. A
//! missing config file is not an error; built-in defaults apply.

use std::{env, fs, path::PathBuf};

use serde::Deserialize;

use crate::error::AppError;

const CONFIG_PATH: &str = "config/default.toml";

/// OpenAI / OpenAI-compatible provider configuration (`[llm.openai]`).
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    /// Full chat completions endpoint URL.
    pub api_base_url: String,
    /// Model name passed in the request body.
    pub model: String,
    /// Sampling temperature (ignored for models that forbid it).
    pub temperature: f32,
    /// Per-request HTTP timeout in seconds.
    pub timeout_seconds: u64,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            model: default_model(),
            temperature: default_temperature(),
            timeout_seconds: default_llm_timeout(),
        }
    }
}

/// Completion-client configuration (`[llm]`).
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// Which provider is active (`"dummy"` or `"openai"`).
    /// Maps to `default` in the TOML so alternative provider sections can
    /// coexist without being loaded.
    pub provider: String,
    pub openai: OpenAiConfig,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            openai: OpenAiConfig::default(),
        }
    }
}

/// Document-helper configuration (`[helpers.document]`).
#[derive(Debug, Clone)]
pub struct DocumentConfig {
    /// Query strategy: `"full-text"` or `"retrieval"`.
    pub mode: String,
    /// Number of chunks returned per retrieval query.
    pub top_k: usize,
    /// Maximum chunk size, in characters.
    pub chunk_max_chars: usize,
    /// Overlap between consecutive chunks, in characters.
    pub chunk_overlap: usize,
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            mode: default_document_mode(),
            top_k: default_top_k(),
            chunk_max_chars: default_chunk_max_chars(),
            chunk_overlap: default_chunk_overlap(),
        }
    }
}

/// Tabular-helper configuration (`[helpers.tabular]`).
#[derive(Debug, Clone)]
pub struct TabularConfig {
    /// Append completion-client commentary to each analysis.
    pub commentary: bool,
}

impl Default for TabularConfig {
    fn default() -> Self {
        Self { commentary: true }
    }
}

/// Web-helper configuration (`[helpers.web]`).
#[derive(Debug, Clone)]
pub struct WebConfig {
    /// GET request timeout in seconds.
    pub timeout_seconds: u64,
    /// Fetched bodies are truncated to this many characters before prompting.
    pub max_body_chars: usize,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: default_web_timeout(),
            max_body_chars: default_max_body_chars(),
        }
    }
}

/// Per-helper configuration (`[helpers]`).
#[derive(Debug, Clone, Default)]
pub struct HelpersConfig {
    pub document: DocumentConfig,
    pub tabular: TabularConfig,
    pub web: WebConfig,
}

/// Fully-resolved assistant configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub assistant_name: String,
    /// Working directory for generated artifacts (already expanded, no `~`).
    pub work_dir: PathBuf,
    pub log_level: String,
    pub llm: LlmConfig,
    pub helpers: HelpersConfig,
    /// API key from the `LLM_API_KEY` env var; `None` for keyless providers.
    /// Never sourced from TOML.
    pub llm_api_key: Option<String>,
}

// ── Raw TOML shapes ─────────────────────────────────────────────────────────

#[derive(Deserialize, Default)]
struct RawConfig {
    #[serde(default)]
    assistant: RawAssistant,
    #[serde(default)]
    llm: RawLlm,
    #[serde(default)]
    helpers: RawHelpers,
}

#[derive(Deserialize)]
struct RawAssistant {
    #[serde(default = "default_assistant_name")]
    name: String,
    #[serde(default = "default_work_dir")]
    work_dir: String,
    #[serde(default = "default_log_level")]
    log_level: String,
}

impl Default for RawAssistant {
    fn default() -> Self {
        Self {
            name: default_assistant_name(),
            work_dir: default_work_dir(),
            log_level: default_log_level(),
        }
    }
}

#[derive(Deserialize)]
struct RawLlm {
    #[serde(default = "default_provider", rename = "default")]
    provider: String,
    #[serde(default)]
    openai: RawOpenAi,
}

impl Default for RawLlm {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            openai: RawOpenAi::default(),
        }
    }
}

#[derive(Deserialize)]
struct RawOpenAi {
    #[serde(default = "default_api_base_url")]
    api_base_url: String,
    #[serde(default = "default_model")]
    model: String,
    #[serde(default = "default_temperature")]
    temperature: f32,
    #[serde(default = "default_llm_timeout")]
    timeout_seconds: u64,
}

impl Default for RawOpenAi {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            model: default_model(),
            temperature: default_temperature(),
            timeout_seconds: default_llm_timeout(),
        }
    }
}

#[derive(Deserialize, Default)]
struct RawHelpers {
    #[serde(default)]
    document: RawDocument,
    #[serde(default)]
    tabular: RawTabular,
    #[serde(default)]
    web: RawWeb,
}

#[derive(Deserialize)]
struct RawDocument {
    #[serde(default = "default_document_mode")]
    mode: String,
    #[serde(default = "default_top_k")]
    top_k: usize,
    #[serde(default = "default_chunk_max_chars")]
    chunk_max_chars: usize,
    #[serde(default = "default_chunk_overlap")]
    chunk_overlap: usize,
}

impl Default for RawDocument {
    fn default() -> Self {
        Self {
            mode: default_document_mode(),
            top_k: default_top_k(),
            chunk_max_chars: default_chunk_max_chars(),
            chunk_overlap: default_chunk_overlap(),
        }
    }
}

#[derive(Deserialize)]
struct RawTabular {
    #[serde(default = "default_true")]
    commentary: bool,
}

impl Default for RawTabular {
    fn default() -> Self {
        Self { commentary: true }
    }
}

#[derive(Deserialize)]
struct RawWeb {
    #[serde(default = "default_web_timeout")]
    timeout_seconds: u64,
    #[serde(default = "default_max_body_chars")]
    max_body_chars: usize,
}

impl Default for RawWeb {
    fn default() -> Self {
        Self {
            timeout_seconds: default_web_timeout(),
            max_body_chars: default_max_body_chars(),
        }
    }
}

// ── Serde defaults ──────────────────────────────────────────────────────────

fn default_assistant_name() -> String {
    "mynah".to_string()
}

fn default_work_dir() -> String {
    "~/.mynah".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_provider() -> String {
    "dummy".to_string()
}

fn default_api_base_url() -> String {
    "https://api.openai.com/v1/chat/completions".to_string()
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_temperature() -> f32 {
    0.8
}

fn default_llm_timeout() -> u64 {
    60
}

fn default_document_mode() -> String {
    "full-text".to_string()
}

fn default_top_k() -> usize {
    3
}

fn default_chunk_max_chars() -> usize {
    2000
}

fn default_chunk_overlap() -> usize {
    200
}

fn default_web_timeout() -> u64 {
    10
}

fn default_max_body_chars() -> usize {
    3000
}

fn default_true() -> bool {
    true
}

// ── Loading ─────────────────────────────────────────────────────────────────

/// Load configuration from `config/default.toml`, falling back to built-in
/// defaults when the file is absent.
pub fn load() -> Result<Config, AppError> {
    let raw = match fs::read_to_string(CONFIG_PATH) {
        Ok(data) => toml::from_str::<RawConfig>(&data)
            .map_err(|e| AppError::Config(format!("malformed {CONFIG_PATH}: {e}")))?,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => RawConfig::default(),
        Err(e) => return Err(AppError::Config(format!("cannot read {CONFIG_PATH}: {e}"))),
    };
    resolve(raw)
}

/// Parse configuration from a TOML string. Used by tests and embedders.
pub fn from_toml_str(data: &str) -> Result<Config, AppError> {
    let raw = toml::from_str::<RawConfig>(data)
        .map_err(|e| AppError::Config(format!("malformed config: {e}")))?;
    resolve(raw)
}

fn resolve(raw: RawConfig) -> Result<Config, AppError> {
    let work_dir = env::var("MYNAH_WORK_DIR").unwrap_or(raw.assistant.work_dir);
    let work_dir = expand_tilde(&work_dir)?;

    let log_level = env::var("MYNAH_LOG_LEVEL").unwrap_or(raw.assistant.log_level);

    // Key comes from the environment only; an empty value counts as unset.
    let llm_api_key = env::var("LLM_API_KEY").ok().filter(|k| !k.trim().is_empty());

    let document = raw.helpers.document;
    if document.chunk_overlap >= document.chunk_max_chars {
        return Err(AppError::Config(format!(
            "helpers.document: chunk_overlap ({}) must be smaller than chunk_max_chars ({})",
            document.chunk_overlap, document.chunk_max_chars
        )));
    }

    Ok(Config {
        assistant_name: raw.assistant.name,
        work_dir,
        log_level,
        llm: LlmConfig {
            provider: raw.llm.provider,
            openai: OpenAiConfig {
                api_base_url: raw.llm.openai.api_base_url,
                model: raw.llm.openai.model,
                temperature: raw.llm.openai.temperature,
                timeout_seconds: raw.llm.openai.timeout_seconds,
            },
        },
        helpers: HelpersConfig {
            document: DocumentConfig {
                mode: document.mode,
                top_k: document.top_k,
                chunk_max_chars: document.chunk_max_chars,
                chunk_overlap: document.chunk_overlap,
            },
            tabular: TabularConfig {
                commentary: raw.helpers.tabular.commentary,
            },
            web: WebConfig {
                timeout_seconds: raw.helpers.web.timeout_seconds,
                max_body_chars: raw.helpers.web.max_body_chars,
            },
        },
        llm_api_key,
    })
}

fn expand_tilde(path: &str) -> Result<PathBuf, AppError> {
    if let Some(rest) = path.strip_prefix("~/") {
        let home = dirs::home_dir()
            .ok_or_else(|| AppError::Config("cannot resolve home directory for '~'".into()))?;
        Ok(home.join(rest))
    } else if path == "~" {
        dirs::home_dir().ok_or_else(|| AppError::Config("cannot resolve home directory for '~'".into()))
    } else {
        Ok(PathBuf::from(path))
    }
}
