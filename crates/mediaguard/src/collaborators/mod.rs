//! Interfaces of the external services the pipeline delegates work to.
//!
//! The pipeline only depends on the shape of these calls. Encoding,
//! watermarking, legal registration and storage all live behind them.

pub mod simulated;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::job::model::AssetDescriptor;
use crate::pipeline::catalog::StageKind;
use crate::pipeline::context::{StageProgress, StageRequest};

pub use simulated::{SimulatedDistribution, SimulatedEncoder, SimulatedProtection};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CollaboratorError {
    #[error("{backend} failed: {message}")]
    Backend {
        backend: &'static str,
        message: String,
    },

    #[error("{0} is unavailable")]
    Unavailable(String),

    #[error("Request rejected: {0}")]
    Rejected(String),
}

/// Opaque protection record produced for an asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForensicSignature {
    pub signature_id: String,
    pub content_fingerprint: String,
    pub created_at: DateTime<Utc>,
    pub creator_ref: String,
    pub platform_id: String,
    pub watermark_token: String,
    pub tracking_tokens: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DmcaRegistration {
    pub registration_id: String,
}

/// Forensic signature generation and DMCA registration.
///
/// Both calls receive the progress handle of the stage they run in.
#[async_trait]
pub trait ProtectionService: Send + Sync {
    async fn generate_signature(
        &self,
        asset: &AssetDescriptor,
        creator_ref: &str,
        progress: &StageProgress,
    ) -> Result<ForensicSignature, CollaboratorError>;

    async fn register_dmca(
        &self,
        signature_id: &str,
        progress: &StageProgress,
    ) -> Result<DmcaRegistration, CollaboratorError>;
}

/// Codec backend for analysis, transcoding, conversion, resolution and
/// quality stages. Reports local progress and returns the stage detail.
#[async_trait]
pub trait EncodingBackend: Send + Sync {
    async fn run_stage(
        &self,
        stage: StageKind,
        request: &StageRequest<'_>,
        progress: &StageProgress,
    ) -> Result<String, CollaboratorError>;
}

/// Storage and distribution backend for the final stage.
#[async_trait]
pub trait DistributionBackend: Send + Sync {
    async fn distribute(
        &self,
        request: &StageRequest<'_>,
        progress: &StageProgress,
    ) -> Result<String, CollaboratorError>;
}

/// The set of collaborators a pipeline runs against.
#[derive(Clone)]
pub struct Collaborators {
    pub encoder: Arc<dyn EncodingBackend>,
    pub protection: Arc<dyn ProtectionService>,
    pub distribution: Arc<dyn DistributionBackend>,
}

impl Collaborators {
    pub fn new(
        encoder: Arc<dyn EncodingBackend>,
        protection: Arc<dyn ProtectionService>,
        distribution: Arc<dyn DistributionBackend>,
    ) -> Self {
        Self {
            encoder,
            protection,
            distribution,
        }
    }

    /// Time-delayed stand-ins for every backend.
    pub fn simulated(settings: &crate::config::SimulationConfig) -> Self {
        let delay = settings.step_delay();
        Self::new(
            Arc::new(SimulatedEncoder::new(delay)),
            Arc::new(SimulatedProtection::new(&settings.platform_id, delay)),
            Arc::new(SimulatedDistribution::new(delay)),
        )
    }
}
