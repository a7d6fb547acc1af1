use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MediaGuardError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Job store error: {0}")]
    Store(#[from] StoreError),

    #[error("Logging setup failed: {0}")]
    Logging(String),

    #[error("No async runtime available: {0}")]
    Runtime(String),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config JSON: {0}")]
    ParseJson(#[from] serde_json::Error),

    #[error("Failed to parse config YAML: {0}")]
    ParseYaml(#[from] serde_yaml::Error),

    #[error("Config validation failed: {message}")]
    Validation { message: String },
}

/// Rejections raised by `process_media` before a job is created.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Asset MIME type is missing")]
    MissingMimeType,

    #[error("Malformed asset MIME type '{0}'")]
    MalformedMimeType(String),

    #[error("Unsupported asset MIME type '{0}'")]
    UnsupportedMimeType(String),

    #[error("Asset is empty")]
    EmptyAsset,

    #[error("Asset size {size} exceeds limit of {limit} bytes")]
    AssetTooLarge { size: u64, limit: u64 },

    #[error("Invalid output format '{0}'")]
    InvalidOutputFormat(String),

    #[error("Invalid resolution '{0}'")]
    InvalidResolution(String),

    #[error("Duplicate {field} entry '{value}'")]
    Duplicate { field: &'static str, value: String },

    #[error("Failed to read asset '{path}': {reason}")]
    UnreadableAsset { path: PathBuf, reason: String },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Job not found: {0}")]
    NotFound(String),

    #[error("Job {0} is finished and can no longer change")]
    Terminal(String),
}

pub type Result<T> = std::result::Result<T, MediaGuardError>;
