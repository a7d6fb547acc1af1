pub mod catalog;
pub mod context;
pub mod error;
pub mod progress;
pub mod runner;

pub use catalog::{StageKind, StageOwner, STAGE_CATALOG, STAGE_COUNT};
pub use context::{StageProgress, StageRequest};
pub use error::StageError;
pub use progress::{
    in_flight_progress, overall_progress, BroadcastProgress, NoopProgress, ProgressEvent,
    ProgressReporter,
};
pub use runner::PipelineRunner;
