use std::path::{Path, PathBuf};

use tokio::sync::Semaphore;
use tracing_subscriber::filter::LevelFilter;

use crate::config::schema::{Config, CONFIG_VERSION};
use crate::error::ConfigError;

/// Environment variable that overrides the config file location.
pub const CONFIG_ENV_VAR: &str = "MEDIAGUARD_CONFIG";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Json,
    Yaml,
}

impl ConfigFormat {
    /// Picks the format from the file extension. Anything that is not
    /// `.yaml`/`.yml` is read as JSON.
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
            .as_deref()
        {
            Some("yaml") | Some("yml") => ConfigFormat::Yaml,
            _ => ConfigFormat::Json,
        }
    }
}

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source: e,
    })?;

    load_config_from_str(&content, ConfigFormat::from_path(path))
}

pub fn load_config_from_str(content: &str, format: ConfigFormat) -> Result<Config, ConfigError> {
    let config: Config = match format {
        ConfigFormat::Json => serde_json::from_str(content)?,
        ConfigFormat::Yaml => serde_yaml::from_str(content)?,
    };

    validate_config(&config)?;

    Ok(config)
}

pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.version != CONFIG_VERSION {
        return Err(invalid(format!(
            "Unsupported config version: {}",
            config.version
        )));
    }

    if config.pipeline.creator_ref.trim().is_empty() {
        return Err(invalid("pipeline.creatorRef must not be empty"));
    }

    match config.pipeline.max_concurrent_jobs {
        Some(0) => return Err(invalid("pipeline.maxConcurrentJobs must be at least 1")),
        Some(limit) if limit > Semaphore::MAX_PERMITS => {
            return Err(invalid(format!(
                "pipeline.maxConcurrentJobs must be at most {}, got {}",
                Semaphore::MAX_PERMITS,
                limit
            )))
        }
        _ => {}
    }

    if config.validation.max_asset_bytes == 0 {
        return Err(invalid("validation.maxAssetBytes must be greater than 0"));
    }

    if config.validation.allowed_mime_prefixes.is_empty() {
        return Err(invalid("validation.allowedMimePrefixes must not be empty"));
    }
    for prefix in &config.validation.allowed_mime_prefixes {
        if prefix.len() < 2 || !prefix.ends_with('/') {
            return Err(invalid(format!(
                "Invalid MIME prefix '{}': expected a top-level type such as 'video/'",
                prefix
            )));
        }
    }

    if config.events.channel_capacity == 0 {
        return Err(invalid("events.channelCapacity must be greater than 0"));
    }

    if config.logging.level.parse::<LevelFilter>().is_err() {
        return Err(invalid(format!(
            "Unknown log level: {}",
            config.logging.level
        )));
    }

    Ok(())
}

fn invalid(message: impl Into<String>) -> ConfigError {
    ConfigError::Validation {
        message: message.into(),
    }
}

/// Platform config location, e.g. `~/.config/mediaguard/config.json`.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("mediaguard").join("config.json"))
}

/// Explicit path first, then `MEDIAGUARD_CONFIG`, then the platform default
/// if that file exists.
pub fn resolve_config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }

    if let Some(value) = std::env::var_os(CONFIG_ENV_VAR) {
        if !value.is_empty() {
            return Some(PathBuf::from(value));
        }
    }

    default_config_path().filter(|path| path.is_file())
}
