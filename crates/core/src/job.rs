//! Generation jobs as seen by the client.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::document::{GenerationRequest, RecordKey, RecordKind};
use crate::id::{JobId, SourceRecordId};

/// Job status reported by the backend.
///
/// Unknown strings deserialize to `Processing`: anything that is not `done`
/// or `failed` means the job is still running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum JobStatus {
    /// Accepted, not started yet
    Pending,
    /// Being generated
    Processing,
    /// Artifact available
    Done,
    /// Generation failed on the backend
    Failed,
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Done | JobStatus::Failed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Processing => "processing",
            JobStatus::Done => "done",
            JobStatus::Failed => "failed",
        }
    }
}

impl From<String> for JobStatus {
    fn from(value: String) -> Self {
        match value.trim().to_lowercase().as_str() {
            "pending" | "queued" => JobStatus::Pending,
            "done" => JobStatus::Done,
            "failed" => JobStatus::Failed,
            _ => JobStatus::Processing,
        }
    }
}

impl From<JobStatus> for String {
    fn from(value: JobStatus) -> Self {
        value.as_str().to_string()
    }
}

impl core::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One status-check response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobSnapshot {
    pub status: JobStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl JobSnapshot {
    pub fn new(status: JobStatus) -> Self {
        Self {
            status,
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            status: JobStatus::Failed,
            error: Some(error.into()),
        }
    }
}

/// Backend acknowledgement of a submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmittedJob {
    pub job_id: JobId,
    pub status: JobStatus,
    pub filename: String,
}

/// A submitted generation job.
///
/// Identity (`job_id`) is fixed at creation. Once a terminal status has been
/// observed, later snapshots are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    pub job_id: JobId,
    pub kind: RecordKind,
    pub source_record_id: SourceRecordId,
    pub filename: String,
    pub status: JobStatus,
    pub error: Option<String>,
    pub submitted_at: DateTime<Utc>,
    /// Number of snapshots applied via [`Job::observe`].
    pub observations: u32,
}

impl Job {
    /// Build the client-side job from the submission acknowledgement.
    ///
    /// Falls back to the template name when the backend sends no filename.
    pub fn from_submission(request: &GenerationRequest, submitted: SubmittedJob) -> Self {
        let filename = if submitted.filename.trim().is_empty() {
            request.template.name.clone()
        } else {
            submitted.filename
        };

        Self {
            job_id: submitted.job_id,
            kind: request.kind.clone(),
            source_record_id: request.source_record_id.clone(),
            filename,
            status: submitted.status,
            error: None,
            submitted_at: Utc::now(),
            observations: 0,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    pub fn record_key(&self) -> RecordKey {
        RecordKey {
            kind: self.kind.clone(),
            source_record_id: self.source_record_id.clone(),
        }
    }

    /// Apply a status snapshot. Returns `false` if the job was already terminal.
    pub fn observe(&mut self, snapshot: &JobSnapshot) -> bool {
        if self.is_terminal() {
            return false;
        }
        self.status = snapshot.status;
        self.observations += 1;
        self.error = match snapshot.status {
            JobStatus::Failed => snapshot.error.clone(),
            _ => None,
        };
        true
    }
}
