use docforge_client::ClientError;
use docforge_core::{DomainError, JobId, JobStatus, RecordKey};

/// Fatal outcome of a generation run.
///
/// Timeouts and cancellation are not errors; see `GenerationOutcome`.
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("invalid request: {0}")]
    InvalidRequest(#[from] DomainError),

    #[error("a document is already being generated for {0}")]
    AlreadyInFlight(RecordKey),

    #[error("submission rejected: {message}")]
    Submission {
        message: String,
        #[source]
        source: ClientError,
    },

    #[error("status check for job {job_id} failed after {attempts} attempts: {message}")]
    StatusCheck {
        job_id: JobId,
        attempts: u32,
        message: String,
    },

    #[error("document generation failed for job {job_id}: {message}")]
    GenerationFailed { job_id: JobId, message: String },

    #[error("failed to retrieve completed document for job {job_id}: {source}")]
    Retrieval {
        job_id: JobId,
        #[source]
        source: ClientError,
    },

    #[error("job {job_id} is {status}; no artifact to retrieve")]
    NotReady { job_id: JobId, status: JobStatus },

    #[error("generation task aborted: {0}")]
    Aborted(String),
}

impl GenerationError {
    pub fn job_id(&self) -> Option<&JobId> {
        match self {
            GenerationError::StatusCheck { job_id, .. }
            | GenerationError::GenerationFailed { job_id, .. }
            | GenerationError::Retrieval { job_id, .. }
            | GenerationError::NotReady { job_id, .. } => Some(job_id),
            _ => None,
        }
    }
}
