pub mod loader;
pub mod schema;

pub use loader::{
    default_config_path, load_config, load_config_from_str, resolve_config_path, validate_config,
    ConfigFormat, CONFIG_ENV_VAR,
};
pub use schema::{
    Config, EventsConfig, LogFormat, LoggingConfig, PipelineConfig, SimulationConfig,
    ValidationConfig,
};
