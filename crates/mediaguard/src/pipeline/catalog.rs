//! Fixed, ordered catalog of pipeline stages.
//!
//! Progress bands are positional: the stage at index `i` owns the slice
//! `[i * 100 / N, (i + 1) * 100 / N)` of overall progress. Reordering or
//! resizing the catalog changes every band, so both are fixed.

use serde::{Deserialize, Serialize};

/// One step of the media pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageKind {
    FileAnalysis,
    ForensicSignature,
    Transcoding,
    FormatConversion,
    ResolutionOptimization,
    QualityEnhancement,
    DmcaRegistration,
    UploadDistribution,
}

/// Which collaborator performs a stage's work.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageOwner {
    Encoder,
    Protection,
    Distribution,
}

/// Stages in execution order. The position is the band index.
pub const STAGE_CATALOG: [StageKind; 8] = [
    StageKind::FileAnalysis,
    StageKind::ForensicSignature,
    StageKind::Transcoding,
    StageKind::FormatConversion,
    StageKind::ResolutionOptimization,
    StageKind::QualityEnhancement,
    StageKind::DmcaRegistration,
    StageKind::UploadDistribution,
];

/// Number of stages every job carries.
pub const STAGE_COUNT: usize = STAGE_CATALOG.len();

impl StageKind {
    /// Display name shown to consumers.
    pub fn name(&self) -> &'static str {
        match self {
            StageKind::FileAnalysis => "File Analysis",
            StageKind::ForensicSignature => "Forensic Signature Generation",
            StageKind::Transcoding => "Transcoding & Encoding",
            StageKind::FormatConversion => "Format Conversion",
            StageKind::ResolutionOptimization => "Resolution Optimization",
            StageKind::QualityEnhancement => "Quality Enhancement",
            StageKind::DmcaRegistration => "DMCA Registration",
            StageKind::UploadDistribution => "Upload & Distribution",
        }
    }

    /// Position in the catalog, which is also the progress band index.
    pub fn band_index(&self) -> usize {
        match self {
            StageKind::FileAnalysis => 0,
            StageKind::ForensicSignature => 1,
            StageKind::Transcoding => 2,
            StageKind::FormatConversion => 3,
            StageKind::ResolutionOptimization => 4,
            StageKind::QualityEnhancement => 5,
            StageKind::DmcaRegistration => 6,
            StageKind::UploadDistribution => 7,
        }
    }

    pub fn owner(&self) -> StageOwner {
        match self {
            StageKind::ForensicSignature | StageKind::DmcaRegistration => StageOwner::Protection,
            StageKind::UploadDistribution => StageOwner::Distribution,
            _ => StageOwner::Encoder,
        }
    }
}

impl std::fmt::Display for StageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}
