use std::time::Duration;

use serde::{Deserialize, Serialize};

pub const CONFIG_VERSION: &str = "1.0";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default)]
    pub pipeline: PipelineConfig,
    #[serde(default)]
    pub simulation: SimulationConfig,
    #[serde(default)]
    pub validation: ValidationConfig,
    #[serde(default)]
    pub events: EventsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_version() -> String {
    CONFIG_VERSION.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: default_version(),
            pipeline: PipelineConfig::default(),
            simulation: SimulationConfig::default(),
            validation: ValidationConfig::default(),
            events: EventsConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineConfig {
    /// Creator reference passed to signature generation.
    #[serde(default = "default_creator_ref")]
    pub creator_ref: String,
    /// Upper bound on jobs running at once. Unbounded when absent.
    #[serde(default)]
    pub max_concurrent_jobs: Option<usize>,
}

fn default_creator_ref() -> String {
    "creator".to_string()
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            creator_ref: default_creator_ref(),
            max_concurrent_jobs: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationConfig {
    #[serde(default = "default_step_delay_ms")]
    pub step_delay_ms: u64,
    #[serde(default = "default_platform_id")]
    pub platform_id: String,
}

fn default_step_delay_ms() -> u64 {
    100
}

fn default_platform_id() -> String {
    "mediaguard".to_string()
}

impl SimulationConfig {
    pub fn step_delay(&self) -> Duration {
        Duration::from_millis(self.step_delay_ms)
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            step_delay_ms: default_step_delay_ms(),
            platform_id: default_platform_id(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationConfig {
    #[serde(default = "default_max_asset_bytes")]
    pub max_asset_bytes: u64,
    #[serde(default = "default_allowed_mime_prefixes")]
    pub allowed_mime_prefixes: Vec<String>,
}

fn default_max_asset_bytes() -> u64 {
    5 * 1024 * 1024 * 1024
}

fn default_allowed_mime_prefixes() -> Vec<String> {
    vec![
        "video/".to_string(),
        "image/".to_string(),
        "audio/".to_string(),
    ]
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            max_asset_bytes: default_max_asset_bytes(),
            allowed_mime_prefixes: default_allowed_mime_prefixes(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventsConfig {
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
}

fn default_channel_capacity() -> usize {
    256
}

impl Default for EventsConfig {
    fn default() -> Self {
        Self {
            channel_capacity: default_channel_capacity(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}
