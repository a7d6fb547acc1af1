use thiserror::Error;

use crate::collaborators::CollaboratorError;
use crate::error::StoreError;

use super::catalog::StageKind;

/// Why a stage could not finish. Any of these fails the whole job.
#[derive(Error, Debug)]
pub enum StageError {
    #[error("{stage} failed: {source}")]
    Collaborator {
        stage: StageKind,
        #[source]
        source: CollaboratorError,
    },

    #[error("DMCA registration requires a forensic signature")]
    MissingSignature,

    #[error("Job store rejected update: {0}")]
    Store(#[from] StoreError),
}

impl StageError {
    pub fn collaborator(stage: StageKind, source: CollaboratorError) -> Self {
        StageError::Collaborator { stage, source }
    }
}
