use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Status of config file loading
#[derive(Debug, Clone)]
pub enum ConfigLoadStatus {
    /// Config loaded successfully from existing file
    Loaded,
    /// Created default config file (first run)
    Created,
    /// Error occurred during loading, using defaults.
    Error(String),
}

/// Hosted provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Display name used in console messages.
    pub name: String,
    /// Base URL of an OpenAI-compatible API; `/models` is appended.
    pub base_url: String,
    /// Environment variable holding the API key.
    pub api_key_env: String,
    /// Request timeout. Unset means the HTTP client default.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            name: "Groq".to_string(),
            base_url: "https://api.groq.com/openai/v1".to_string(),
            api_key_env: "GROQ_API_KEY".to_string(),
            timeout_secs: None,
        }
    }
}

impl ProviderConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub provider: ProviderConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Partial provider configuration for project overrides.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct PartialProviderConfig {
    pub name: Option<String>,
    pub base_url: Option<String>,
    pub api_key_env: Option<String>,
    pub timeout_secs: Option<u64>,
}

/// Partial logging configuration for project overrides.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct PartialLoggingConfig {
    pub level: Option<String>,
}

/// Project-specific configuration where every field is optional.
/// Parsed from `.agentic` files. Fields that are `None` inherit from the global config.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct PartialConfig {
    pub provider: PartialProviderConfig,
    pub logging: PartialLoggingConfig,
}

/// Merge a global config with a project-level partial config.
/// Project values override global values where present.
pub fn merge_config(global: &Config, project: &PartialConfig) -> Config {
    Config {
        provider: ProviderConfig {
            name: project
                .provider
                .name
                .clone()
                .unwrap_or_else(|| global.provider.name.clone()),
            base_url: project
                .provider
                .base_url
                .clone()
                .unwrap_or_else(|| global.provider.base_url.clone()),
            api_key_env: project
                .provider
                .api_key_env
                .clone()
                .unwrap_or_else(|| global.provider.api_key_env.clone()),
            timeout_secs: project
                .provider
                .timeout_secs
                .or(global.provider.timeout_secs),
        },
        logging: LoggingConfig {
            level: project
                .logging
                .level
                .clone()
                .unwrap_or_else(|| global.logging.level.clone()),
        },
    }
}

/// Loaded configuration with metadata
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: Config,
    pub config_path: PathBuf,
    pub project_config_path: Option<PathBuf>,
    pub status: ConfigLoadStatus,
    /// Problem with the project file, reported once logging is up.
    pub project_error: Option<String>,
}

/// Get the platform-appropriate config directory
fn get_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("dev", "agentic", "agentic").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the full path to the config file
pub fn get_config_path() -> Option<PathBuf> {
    get_config_dir().map(|dir| dir.join("config.toml"))
}

/// Get the project config path (.agentic in current working directory).
pub fn get_project_config_path() -> Option<PathBuf> {
    let path = env::current_dir().ok()?.join(".agentic");
    if path.exists() { Some(path) } else { None }
}

/// Load a project config (.agentic) from the given path.
fn load_project_config(path: &Path) -> Result<PartialConfig, String> {
    let contents =
        fs::read_to_string(path).map_err(|e| format!("Failed to read .agentic: {}", e))?;

    toml::from_str::<PartialConfig>(&contents).map_err(|e| format!("Invalid .agentic: {}", e))
}

/// Load configuration from file, environment, and defaults.
///
/// Runs before logging is initialized, so problems are carried in the
/// returned status instead of being logged here.
pub fn load_config() -> LoadedConfig {
    let config_path = match get_config_path() {
        Some(path) => path,
        None => {
            return LoadedConfig {
                config: apply_env_overrides(Config::default()),
                config_path: PathBuf::from("config.toml"),
                project_config_path: None,
                status: ConfigLoadStatus::Error("Could not determine config directory".to_string()),
                project_error: None,
            };
        }
    };

    let (mut config, status) = load_or_create_config(&config_path);

    let project_config_path = get_project_config_path();
    let mut project_error = None;
    if let Some(ref project_path) = project_config_path {
        match load_project_config(project_path) {
            Ok(partial) => config = merge_config(&config, &partial),
            // Keep using global config only
            Err(e) => project_error = Some(e),
        }
    }

    LoadedConfig {
        config: apply_env_overrides(config),
        config_path,
        project_config_path,
        status,
        project_error,
    }
}

/// Logs how the configuration was assembled.
pub fn log_load_result(loaded: &LoadedConfig) {
    match &loaded.status {
        ConfigLoadStatus::Loaded => info!(path = ?loaded.config_path, "config_loaded"),
        ConfigLoadStatus::Created => info!(path = ?loaded.config_path, "config_created"),
        ConfigLoadStatus::Error(e) => {
            warn!(path = ?loaded.config_path, error = %e, "config_error_using_defaults")
        }
    }

    if let Some(ref project_path) = loaded.project_config_path {
        match &loaded.project_error {
            Some(e) => warn!(path = ?project_path, error = %e, "project_config_error"),
            None => info!(path = ?project_path, "project_config_loaded"),
        }
    }

    debug!(
        base_url = %loaded.config.provider.base_url,
        api_key_env = %loaded.config.provider.api_key_env,
        "provider_config"
    );
}

/// Load config from file, or create default if not exists
fn load_or_create_config(config_path: &Path) -> (Config, ConfigLoadStatus) {
    match fs::read_to_string(config_path) {
        Ok(contents) => match toml::from_str::<Config>(&contents) {
            Ok(config) => (config, ConfigLoadStatus::Loaded),
            Err(e) => (
                Config::default(),
                ConfigLoadStatus::Error(format!("Malformed TOML: {}", e)),
            ),
        },
        Err(e) if e.kind() == io::ErrorKind::NotFound => create_default_config(config_path),
        Err(e) if e.kind() == io::ErrorKind::PermissionDenied => (
            Config::default(),
            ConfigLoadStatus::Error("Permission denied reading config".to_string()),
        ),
        Err(e) => (
            Config::default(),
            ConfigLoadStatus::Error(format!("Read error: {}", e)),
        ),
    }
}

/// Create the default config file
fn create_default_config(config_path: &Path) -> (Config, ConfigLoadStatus) {
    let config = Config::default();

    if let Some(parent) = config_path.parent()
        && let Err(e) = fs::create_dir_all(parent)
    {
        return (
            config,
            ConfigLoadStatus::Error(format!("Could not create config directory: {}", e)),
        );
    }

    let toml_content = match toml::to_string_pretty(&config) {
        Ok(s) => s,
        Err(e) => {
            return (
                config,
                ConfigLoadStatus::Error(format!("Serialization error: {}", e)),
            );
        }
    };

    match fs::write(config_path, &toml_content) {
        Ok(()) => (config, ConfigLoadStatus::Created),
        Err(e) if e.kind() == io::ErrorKind::PermissionDenied => (
            config,
            ConfigLoadStatus::Error("Permission denied creating config".to_string()),
        ),
        Err(e) => (
            config,
            ConfigLoadStatus::Error(format!("Write error: {}", e)),
        ),
    }
}

/// Apply environment variable overrides to config
fn apply_env_overrides(config: Config) -> Config {
    apply_overrides_from(config, |key| env::var(key).ok())
}

fn apply_overrides_from(mut config: Config, lookup: impl Fn(&str) -> Option<String>) -> Config {
    if let Some(url) = lookup("AGENTIC_BASE_URL") {
        config.provider.base_url = url;
    }

    if let Some(level) = lookup("AGENTIC_LOG") {
        config.logging.level = level;
    }

    config
}
