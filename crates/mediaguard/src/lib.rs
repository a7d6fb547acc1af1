pub mod broadcast;
pub mod collaborators;
pub mod config;
pub mod error;
pub mod job;
pub mod logging;
pub mod pipeline;
pub mod processor;
pub mod sanitize;
pub mod validation;

pub use broadcast::{JobEventKind, JobProgressBroadcaster, JobProgressEvent};
pub use collaborators::{
    CollaboratorError, Collaborators, DistributionBackend, DmcaRegistration, EncodingBackend,
    ForensicSignature, ProtectionService,
};
pub use config::{load_config, Config};
pub use error::{ConfigError, MediaGuardError, Result, StoreError, ValidationError};
pub use job::{
    AssetDescriptor, Job, JobCounts, JobStatus, JobStore, ProcessingOptions, ProtectionOptions,
    QualityPreset, Stage, StageStatus,
};
pub use pipeline::{PipelineRunner, StageKind, StageProgress, StageRequest, STAGE_CATALOG};
pub use processor::MediaProcessor;
