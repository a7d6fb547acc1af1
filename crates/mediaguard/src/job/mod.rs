pub mod model;
pub mod store;

pub use model::{
    AssetDescriptor, Job, JobStatus, ProcessingOptions, ProtectionOptions, QualityPreset, Stage,
    StageStatus, SKIPPED_DETAIL,
};
pub use store::{JobCounts, JobStore};
