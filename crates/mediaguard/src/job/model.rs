use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::pipeline::catalog::{StageKind, STAGE_CATALOG};

/// Status of a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    #[default]
    Queued,
    Processing,
    Completed,
    Failed,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Queued => "queued",
            JobStatus::Processing => "processing",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
        }
    }

    /// Terminal states never change again.
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Status of a single stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum StageStatus {
    #[default]
    Pending,
    Processing,
    Completed,
    Failed,
}

/// Detail attached to a stage that was configured off.
pub const SKIPPED_DETAIL: &str = "skipped";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stage {
    pub kind: StageKind,
    pub name: String,
    pub status: StageStatus,
    /// Stage-local progress, 0-100.
    pub progress: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl Stage {
    pub fn pending(kind: StageKind) -> Self {
        Self {
            kind,
            name: kind.name().to_string(),
            status: StageStatus::Pending,
            progress: 0,
            detail: None,
        }
    }

    pub fn is_skipped(&self) -> bool {
        self.status == StageStatus::Completed && self.detail.as_deref() == Some(SKIPPED_DETAIL)
    }
}

/// Protection flags, fixed at submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProtectionOptions {
    #[serde(default)]
    pub dmca_protection: bool,
    #[serde(default)]
    pub copyright_registration: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QualityPreset {
    Fast,
    #[default]
    Balanced,
    HighQuality,
}

impl std::fmt::Display for QualityPreset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QualityPreset::Fast => write!(f, "fast"),
            QualityPreset::Balanced => write!(f, "balanced"),
            QualityPreset::HighQuality => write!(f, "high_quality"),
        }
    }
}

impl std::str::FromStr for QualityPreset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "fast" => Ok(QualityPreset::Fast),
            "balanced" => Ok(QualityPreset::Balanced),
            "high_quality" | "high-quality" => Ok(QualityPreset::HighQuality),
            other => Err(format!("unknown quality preset '{}'", other)),
        }
    }
}

/// Options supplied with a submission.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessingOptions {
    #[serde(flatten)]
    pub protection: ProtectionOptions,
    #[serde(default)]
    pub quality_preset: QualityPreset,
    #[serde(default)]
    pub output_formats: Vec<String>,
    #[serde(default)]
    pub resolutions: Vec<String>,
    #[serde(default, rename = "enableAIEnhancement")]
    pub enable_ai_enhancement: bool,
}

/// Describes the uploaded asset. The bytes themselves never enter the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetDescriptor {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub mime_type: String,
    pub size_bytes: u64,
}

impl AssetDescriptor {
    pub fn new(mime_type: impl Into<String>, size_bytes: u64) -> Self {
        Self {
            name: None,
            mime_type: mime_type.into(),
            size_bytes,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Builds a descriptor from a file on disk, guessing the MIME type from the extension.
    pub fn from_path(path: &Path) -> Result<Self, ValidationError> {
        let metadata = std::fs::metadata(path).map_err(|e| ValidationError::UnreadableAsset {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        if !metadata.is_file() {
            return Err(ValidationError::UnreadableAsset {
                path: path.to_path_buf(),
                reason: "not a regular file".to_string(),
            });
        }

        let mime_type = Self::detect_mime_type(path).unwrap_or_default();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string());

        log::debug!(
            "Described asset {} as {} ({} bytes)",
            crate::sanitize::redact_path(path),
            if mime_type.is_empty() { "<unknown>" } else { mime_type.as_str() },
            metadata.len()
        );

        Ok(Self {
            name,
            mime_type,
            size_bytes: metadata.len(),
        })
    }

    /// Size in mebibytes, for human-readable summaries.
    pub fn size_mb(&self) -> f64 {
        self.size_bytes as f64 / 1024.0 / 1024.0
    }

    /// Returns `None` for unknown extensions.
    fn detect_mime_type(path: &Path) -> Option<String> {
        mime_guess::from_path(path).first().map(|m| m.to_string())
    }
}

/// Snapshot of a media processing job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: String,
    pub status: JobStatus,
    /// Aggregate progress, 0-100, never decreasing.
    pub overall_progress: u8,
    pub stages: Vec<Stage>,
    pub asset: AssetDescriptor,
    pub options: ProcessingOptions,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signature_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dmca_registration_id: Option<String>,
    /// Failure message (set on failure).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
}

impl Job {
    /// Creates a queued job with every catalog stage pending.
    pub fn new(asset: AssetDescriptor, options: ProcessingOptions) -> Self {
        Self {
            id: Self::generate_id(),
            status: JobStatus::Queued,
            overall_progress: 0,
            stages: STAGE_CATALOG.iter().map(|kind| Stage::pending(*kind)).collect(),
            asset,
            options,
            signature_id: None,
            dmca_registration_id: None,
            error: None,
            created_at: Utc::now(),
            started_at: None,
            finished_at: None,
        }
    }

    fn generate_id() -> String {
        format!("job_{}", uuid::Uuid::new_v4().simple())
    }

    pub fn protection_options(&self) -> ProtectionOptions {
        self.options.protection
    }

    pub fn is_finished(&self) -> bool {
        self.status.is_terminal()
    }

    pub fn stage(&self, kind: StageKind) -> &Stage {
        &self.stages[kind.band_index()]
    }

    pub(crate) fn stage_mut(&mut self, kind: StageKind) -> &mut Stage {
        &mut self.stages[kind.band_index()]
    }

    /// The stage currently running, if any.
    pub fn current_stage(&self) -> Option<&Stage> {
        self.stages
            .iter()
            .find(|s| s.status == StageStatus::Processing)
    }
}
