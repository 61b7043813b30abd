use tracing::debug;

use docforge_client::JobBackend;
use docforge_core::{Artifact, Job, JobStatus};

use crate::error::GenerationError;

/// Fetch the artifact of a completed job.
///
/// Only valid for `done` jobs; anything else is rejected without a request.
pub async fn retrieve_artifact<B>(backend: &B, job: &Job) -> Result<Artifact, GenerationError>
where
    B: JobBackend + ?Sized,
{
    if job.status != JobStatus::Done {
        return Err(GenerationError::NotReady {
            job_id: job.job_id.clone(),
            status: job.status,
        });
    }

    let download = backend
        .download(&job.record_key(), &job.job_id)
        .await
        .map_err(|source| GenerationError::Retrieval {
            job_id: job.job_id.clone(),
            source,
        })?;
    let filename = download
        .filename
        .filter(|f| !f.trim().is_empty())
        .unwrap_or_else(|| job.filename.clone());

    debug!(job_id = %job.job_id, %filename, bytes = download.bytes.len(), "artifact retrieved");

    let mut artifact = Artifact::new(job.job_id.clone(), filename, download.bytes);
    if let Some(content_type) = download.content_type {
        artifact = artifact.with_content_type(content_type);
    }
    Ok(artifact)
}
