//! Builders for test configs and submissions.

#![allow(dead_code)]

use mediaguard::config::Config;
use mediaguard::{AssetDescriptor, ProcessingOptions, QualityPreset};

/// Builder for `Config`, starting from test-friendly values.
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Defaults with zero simulation delay.
    pub fn new() -> Self {
        let mut config = Config::default();
        config.simulation.step_delay_ms = 0;
        Self { config }
    }

    pub fn creator_ref(mut self, creator_ref: &str) -> Self {
        self.config.pipeline.creator_ref = creator_ref.to_string();
        self
    }

    pub fn max_concurrent_jobs(mut self, limit: usize) -> Self {
        self.config.pipeline.max_concurrent_jobs = Some(limit);
        self
    }

    pub fn step_delay_ms(mut self, delay: u64) -> Self {
        self.config.simulation.step_delay_ms = delay;
        self
    }

    pub fn max_asset_bytes(mut self, limit: u64) -> Self {
        self.config.validation.max_asset_bytes = limit;
        self
    }

    pub fn channel_capacity(mut self, capacity: usize) -> Self {
        self.config.events.channel_capacity = capacity;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for `ProcessingOptions`.
pub struct OptionsBuilder {
    options: ProcessingOptions,
}

impl OptionsBuilder {
    /// DMCA protection on, everything else default.
    pub fn new() -> Self {
        let mut options = ProcessingOptions::default();
        options.protection.dmca_protection = true;
        Self { options }
    }

    pub fn dmca(mut self, enabled: bool) -> Self {
        self.options.protection.dmca_protection = enabled;
        self
    }

    pub fn copyright(mut self, enabled: bool) -> Self {
        self.options.protection.copyright_registration = enabled;
        self
    }

    pub fn preset(mut self, preset: QualityPreset) -> Self {
        self.options.quality_preset = preset;
        self
    }

    pub fn formats(mut self, formats: &[&str]) -> Self {
        self.options.output_formats = formats.iter().map(|f| f.to_string()).collect();
        self
    }

    pub fn resolutions(mut self, resolutions: &[&str]) -> Self {
        self.options.resolutions = resolutions.iter().map(|r| r.to_string()).collect();
        self
    }

    pub fn ai_enhancement(mut self, enabled: bool) -> Self {
        self.options.enable_ai_enhancement = enabled;
        self
    }

    pub fn build(self) -> ProcessingOptions {
        self.options
    }
}

impl Default for OptionsBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// The 50 MB MP4 used throughout the scenarios.
pub fn sample_video() -> AssetDescriptor {
    AssetDescriptor::new("video/mp4", 50_000_000).with_name("sample.mp4")
}
