// Configuration for the chat client
//
// Configuration is loaded in order of precedence:
// 1. Environment variables (highest priority)
// 2. Config file (~/.config/trinity/config.toml)
// 3. Built-in defaults (lowest priority)
//
// The API credential is environment-only (OPENAI_API_KEY) so it never ends
// up in a config file by accident.

use crate::llm::DEFAULT_API_BASE;
use crate::session::SYSTEM_PROMPT;
use crate::theme::RainColor;
use serde::Deserialize;
use std::path::PathBuf;

/// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    pub level: String,

    /// Write logs to rotating files (the TUI owns the terminal, so this is
    /// the only way to see logs from a live session)
    pub file_enabled: bool,

    /// Directory for log files
    pub file_dir: PathBuf,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file_enabled: false,
            file_dir: dirs::data_local_dir()
                .map(|p| p.join("trinity").join("logs"))
                .unwrap_or_else(|| PathBuf::from("logs")),
        }
    }
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// API credential; environment-only, required unless demo_mode is set
    pub api_key: Option<String>,

    /// Base URL of the chat completions API
    pub api_base: String,

    /// Model requested from the API; switchable at runtime with /model
    pub model: String,

    /// Baseline token budget per response (raised per-request for long
    /// prompts, capped at 300)
    pub max_tokens: u32,

    /// System prompt sent as the first turn
    pub system_prompt: String,

    /// Rain color; switchable at runtime with /color
    pub color: RainColor,

    /// Demo mode: canned replies, no API key needed
    pub demo_mode: bool,

    /// Per-request timeout in seconds
    pub request_timeout_secs: u64,

    /// Logging configuration
    pub logging: LoggingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            api_base: DEFAULT_API_BASE.to_string(),
            model: "gpt-3.5-turbo".to_string(),
            max_tokens: 150,
            system_prompt: SYSTEM_PROMPT.to_string(),
            color: RainColor::default(),
            demo_mode: false,
            request_timeout_secs: 60,
            logging: LoggingConfig::default(),
        }
    }
}

/// Logging settings as loaded from the config file
#[derive(Debug, Deserialize, Default)]
struct FileLogging {
    level: Option<String>,
    file_enabled: Option<bool>,
    file_dir: Option<String>,
}

/// Config file structure (subset of Config that makes sense to persist)
#[derive(Debug, Deserialize, Default)]
struct FileConfig {
    api_base: Option<String>,
    model: Option<String>,
    max_tokens: Option<u32>,
    system_prompt: Option<String>,
    color: Option<String>,
    request_timeout_secs: Option<u64>,

    /// Optional [logging] section
    logging: Option<FileLogging>,
}

impl Config {
    /// Get the config file path: ~/.config/trinity/config.toml
    /// Uses Unix-style ~/.config on all platforms for consistency
    pub fn config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|p| p.join(".config").join("trinity").join("config.toml"))
    }

    /// Create a commented config template if none exists, so users can
    /// discover the options
    pub fn ensure_config_exists() {
        let Some(path) = Self::config_path() else {
            return;
        };
        if path.exists() {
            return;
        }
        if let Some(parent) = path.parent() {
            if std::fs::create_dir_all(parent).is_err() {
                return; // Config is optional
            }
        }

        let template = r#"# trinity configuration
# Uncomment and modify options as needed.
# The API key is environment-only: export OPENAI_API_KEY=sk-...

# Model requested from the API (also switchable at runtime with /model)
# model = "gpt-3.5-turbo"

# Rain color: green, red, blue, cyan, magenta, yellow, white
# color = "green"

# Baseline token budget per response
# max_tokens = 150

# Base URL of the chat completions API
# api_base = "https://api.openai.com/v1"

# Per-request timeout in seconds
# request_timeout_secs = 60

# Override the persona sent as the system prompt
# system_prompt = "You are Trinity from The Matrix. ..."

# [logging]
# level = "info"
# file_enabled = false
# file_dir = "~/.local/share/trinity/logs"
"#;
        let _ = std::fs::write(&path, template);
    }

    /// Load configuration: defaults, then the config file, then environment
    /// variables on top.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(path) = Self::config_path() {
            if let Ok(contents) = std::fs::read_to_string(&path) {
                match toml::from_str::<FileConfig>(&contents) {
                    Ok(file) => config.apply_file(file),
                    Err(e) => {
                        // Logging is not up yet; stderr is still ours here
                        eprintln!("Warning: ignoring malformed {}: {}", path.display(), e);
                    }
                }
            }
        }

        config.apply_env();
        config
    }

    fn apply_file(&mut self, file: FileConfig) {
        if let Some(api_base) = file.api_base {
            self.api_base = api_base;
        }
        if let Some(model) = file.model {
            self.model = model;
        }
        if let Some(max_tokens) = file.max_tokens {
            self.max_tokens = max_tokens;
        }
        if let Some(system_prompt) = file.system_prompt {
            self.system_prompt = system_prompt;
        }
        if let Some(color) = file.color {
            match RainColor::from_name(&color) {
                Some(parsed) => self.color = parsed,
                None => eprintln!(
                    "Warning: unknown color {:?} in config, using {}",
                    color,
                    self.color.name()
                ),
            }
        }
        if let Some(timeout) = file.request_timeout_secs {
            self.request_timeout_secs = timeout;
        }
        if let Some(logging) = file.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(file_enabled) = logging.file_enabled {
                self.logging.file_enabled = file_enabled;
            }
            if let Some(file_dir) = logging.file_dir {
                self.logging.file_dir = PathBuf::from(file_dir);
            }
        }
    }

    fn apply_env(&mut self) {
        if let Ok(key) = std::env::var("OPENAI_API_KEY") {
            if !key.trim().is_empty() {
                self.api_key = Some(key);
            }
        }
        if let Ok(api_base) = std::env::var("TRINITY_API_BASE") {
            self.api_base = api_base;
        }
        if let Ok(model) = std::env::var("TRINITY_MODEL") {
            self.model = model;
        }
        if let Ok(color) = std::env::var("TRINITY_COLOR") {
            match RainColor::from_name(&color) {
                Some(parsed) => self.color = parsed,
                None => eprintln!(
                    "Warning: unknown TRINITY_COLOR {:?}, using {}",
                    color,
                    self.color.name()
                ),
            }
        }
        if let Ok(demo) = std::env::var("TRINITY_DEMO") {
            self.demo_mode = matches!(demo.trim(), "1" | "true" | "yes");
        }
        if let Ok(timeout) = std::env::var("TRINITY_TIMEOUT_SECS") {
            match timeout.parse() {
                Ok(parsed) => self.request_timeout_secs = parsed,
                Err(_) => eprintln!("Warning: TRINITY_TIMEOUT_SECS is not a number, ignoring"),
            }
        }
        if let Ok(level) = std::env::var("TRINITY_LOG") {
            self.logging.level = level;
        }
    }

    /// Render the effective configuration as TOML (for `config --show` and
    /// `config --reset`)
    pub fn to_toml(&self) -> String {
        format!(
            r#"# trinity configuration
# The API key is environment-only: export OPENAI_API_KEY=sk-...

model = {model:?}
color = {color:?}
max_tokens = {max_tokens}
api_base = {api_base:?}
request_timeout_secs = {timeout}
system_prompt = {system_prompt:?}

[logging]
level = {level:?}
file_enabled = {file_enabled}
file_dir = {file_dir:?}
"#,
            model = self.model,
            color = self.color.name(),
            max_tokens = self.max_tokens,
            api_base = self.api_base,
            timeout = self.request_timeout_secs,
            system_prompt = self.system_prompt,
            level = self.logging.level,
            file_enabled = self.logging.file_enabled,
            file_dir = self.logging.file_dir.display().to_string(),
        )
    }
}
