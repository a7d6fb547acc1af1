//! Broadcasting of job progress events for streaming consumers.

pub mod job_progress;

pub use job_progress::{JobEventKind, JobProgressBroadcaster, JobProgressEvent, JobProgressTracker};
