//! The backend contract for document-generation jobs.

use async_trait::async_trait;

use docforge_core::{GenerationRequest, JobId, JobSnapshot, RecordKey, SubmittedJob};

use crate::error::ClientError;

/// Raw artifact download.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Download {
    pub content_type: Option<String>,
    /// Filename from `Content-Disposition`, when the backend sends one.
    pub filename: Option<String>,
    pub bytes: Vec<u8>,
}

/// Remote side of the generation protocol.
///
/// Implementations must not retry internally: retry and polling policy
/// belongs to the caller.
#[async_trait]
pub trait JobBackend: Send + Sync + 'static {
    /// Start a generation job. Not idempotent: each call creates a new job.
    async fn submit(&self, request: &GenerationRequest) -> Result<SubmittedJob, ClientError>;

    /// Check the status of a job once.
    async fn job_status(&self, record: &RecordKey, job_id: &JobId) -> Result<JobSnapshot, ClientError>;

    /// Download the artifact of a completed job.
    async fn download(&self, record: &RecordKey, job_id: &JobId) -> Result<Download, ClientError>;
}
