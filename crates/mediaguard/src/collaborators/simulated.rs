//! Time-delayed collaborator stand-ins.
//!
//! They report progress in fixed increments with a sleep between steps and
//! derive their stage details from the job's options. A zero delay makes
//! them resolve as fast as the runtime allows.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;

use crate::job::model::{AssetDescriptor, QualityPreset};
use crate::pipeline::catalog::{StageKind, StageOwner};
use crate::pipeline::context::{StageProgress, StageRequest};
use crate::sanitize;

use super::{
    CollaboratorError, DistributionBackend, DmcaRegistration, EncodingBackend,
    ForensicSignature, ProtectionService,
};

const DEFAULT_FORMATS: [&str; 3] = ["MP4", "WebM", "MOV"];
const DEFAULT_RESOLUTIONS: [&str; 3] = ["4K", "1080p", "720p"];
const TRACKING_TOKEN_COUNT: usize = 8;

/// Progress increment used when simulating a stage.
pub fn step_size(stage: StageKind) -> usize {
    match stage {
        StageKind::FileAnalysis => 10,
        StageKind::ForensicSignature => 20,
        StageKind::Transcoding => 5,
        StageKind::FormatConversion => 15,
        StageKind::ResolutionOptimization => 12,
        StageKind::QualityEnhancement => 8,
        StageKind::DmcaRegistration => 25,
        StageKind::UploadDistribution => 10,
    }
}

async fn pause(delay: Duration) {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}

/// Reports 0, step, 2*step, ... up to 100 with a pause after each report.
async fn run_steps(progress: &StageProgress, delay: Duration) {
    let step = step_size(progress.stage());
    for value in (0..=100usize).step_by(step) {
        progress.report(value as u8).await;
        pause(delay).await;
    }
}

fn random_suffix(len: usize) -> String {
    let raw = uuid::Uuid::new_v4().simple().to_string();
    raw.chars().take(len).collect()
}

fn codecs_for(preset: QualityPreset) -> &'static [&'static str] {
    match preset {
        QualityPreset::Fast => &["H.264"],
        QualityPreset::Balanced => &["H.264", "H.265/HEVC"],
        QualityPreset::HighQuality => &["H.264", "H.265/HEVC", "VP9", "AV1"],
    }
}

fn requested_or_default(requested: &[String], defaults: &[&str]) -> String {
    if requested.is_empty() {
        defaults.join(", ")
    } else {
        requested.join(", ")
    }
}

/// Simulated codec backend.
pub struct SimulatedEncoder {
    step_delay: Duration,
}

impl SimulatedEncoder {
    pub fn new(step_delay: Duration) -> Self {
        Self { step_delay }
    }

    fn detail(stage: StageKind, request: &StageRequest<'_>) -> String {
        let options = request.options;
        match stage {
            StageKind::FileAnalysis => format!(
                "{}, {:.2}MB",
                request.asset.mime_type,
                request.asset.size_mb()
            ),
            StageKind::Transcoding => {
                format!("Encoded to: {}", codecs_for(options.quality_preset).join(", "))
            }
            StageKind::FormatConversion => format!(
                "Formats: {}",
                requested_or_default(&options.output_formats, &DEFAULT_FORMATS)
            ),
            StageKind::ResolutionOptimization => format!(
                "Resolutions: {}",
                requested_or_default(&options.resolutions, &DEFAULT_RESOLUTIONS)
            ),
            StageKind::QualityEnhancement => {
                if options.enable_ai_enhancement {
                    "Enhanced: AI Upscaling, Noise Reduction".to_string()
                } else {
                    "Enhanced: Noise Reduction, Color Correction".to_string()
                }
            }
            other => format!("{} done", other.name()),
        }
    }
}

#[async_trait]
impl EncodingBackend for SimulatedEncoder {
    async fn run_stage(
        &self,
        stage: StageKind,
        request: &StageRequest<'_>,
        progress: &StageProgress,
    ) -> Result<String, CollaboratorError> {
        if stage.owner() != StageOwner::Encoder {
            return Err(CollaboratorError::Rejected(format!(
                "encoder does not handle '{}'",
                stage
            )));
        }

        run_steps(progress, self.step_delay).await;
        Ok(Self::detail(stage, request))
    }
}

/// Simulated signature and DMCA service.
pub struct SimulatedProtection {
    platform_id: String,
    step_delay: Duration,
}

impl SimulatedProtection {
    pub fn new(platform_id: &str, step_delay: Duration) -> Self {
        Self {
            platform_id: platform_id.to_string(),
            step_delay,
        }
    }

}

#[async_trait]
impl ProtectionService for SimulatedProtection {
    async fn generate_signature(
        &self,
        asset: &AssetDescriptor,
        creator_ref: &str,
        progress: &StageProgress,
    ) -> Result<ForensicSignature, CollaboratorError> {
        run_steps(progress, self.step_delay).await;

        let now = Utc::now();
        let tracking_tokens = (0..TRACKING_TOKEN_COUNT)
            .map(|_| format!("px_{}", random_suffix(10)))
            .collect();

        Ok(ForensicSignature {
            signature_id: format!("sig_{}_{}", now.timestamp_millis(), random_suffix(12)),
            content_fingerprint: sanitize::fingerprint(&(
                &asset.mime_type,
                asset.size_bytes,
                &asset.name,
                creator_ref,
            )),
            created_at: now,
            creator_ref: creator_ref.to_string(),
            platform_id: self.platform_id.clone(),
            watermark_token: format!("wm_{}", random_suffix(16)),
            tracking_tokens,
        })
    }

    async fn register_dmca(
        &self,
        signature_id: &str,
        progress: &StageProgress,
    ) -> Result<DmcaRegistration, CollaboratorError> {
        if signature_id.is_empty() {
            return Err(CollaboratorError::Rejected(
                "empty signature id".to_string(),
            ));
        }

        run_steps(progress, self.step_delay).await;

        Ok(DmcaRegistration {
            registration_id: format!(
                "dmca_{}_{}",
                Utc::now().timestamp_millis(),
                random_suffix(8)
            ),
        })
    }
}

/// Simulated storage/distribution backend.
pub struct SimulatedDistribution {
    step_delay: Duration,
}

impl SimulatedDistribution {
    pub fn new(step_delay: Duration) -> Self {
        Self { step_delay }
    }
}

#[async_trait]
impl DistributionBackend for SimulatedDistribution {
    async fn distribute(
        &self,
        _request: &StageRequest<'_>,
        progress: &StageProgress,
    ) -> Result<String, CollaboratorError> {
        run_steps(progress, self.step_delay).await;
        Ok("Distributed to all platforms".to_string())
    }
}
