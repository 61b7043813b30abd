//! Bounded, fixed-interval status polling.

use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use docforge_client::JobBackend;
use docforge_core::{Job, JobStatus};

use crate::policy::PollPolicy;

/// Message used when the backend reports `failed` without saying why.
pub const GENERIC_FAILURE_MESSAGE: &str = "Document generation failed";

/// How polling ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    /// Backend reported `done`.
    Done { attempts: u32 },
    /// Backend reported `failed`.
    Failed { attempts: u32, message: String },
    /// Attempt budget exhausted without a terminal status.
    TimedOut { attempts: u32 },
    /// Attempt budget exhausted and the last status check itself failed.
    StatusCheckFailed { attempts: u32, last_error: String },
    /// Cancellation was requested.
    Cancelled { attempts: u32 },
}

impl PollOutcome {
    pub fn attempts(&self) -> u32 {
        match self {
            PollOutcome::Done { attempts }
            | PollOutcome::Failed { attempts, .. }
            | PollOutcome::TimedOut { attempts }
            | PollOutcome::StatusCheckFailed { attempts, .. }
            | PollOutcome::Cancelled { attempts } => *attempts,
        }
    }
}

fn failure_message(job: &Job) -> String {
    job.error
        .as_deref()
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .unwrap_or(GENERIC_FAILURE_MESSAGE)
        .to_string()
}

/// Poll `job` until it reaches a terminal status, the attempt budget runs
/// out, or `cancel` fires.
///
/// Each attempt waits `policy.interval()` and then issues one status check;
/// checks never overlap. A failed check counts as an attempt and polling
/// continues on the same schedule. A job that is already terminal resolves
/// without any request.
pub async fn poll_until_terminal<B>(
    backend: &B,
    job: &mut Job,
    policy: &PollPolicy,
    cancel: &CancellationToken,
) -> PollOutcome
where
    B: JobBackend + ?Sized,
{
    match job.status {
        JobStatus::Done => return PollOutcome::Done { attempts: 0 },
        JobStatus::Failed => {
            return PollOutcome::Failed {
                attempts: 0,
                message: failure_message(job),
            };
        }
        _ => {}
    }

    let record = job.record_key();
    let mut last_error: Option<String> = None;

    for attempt in 1..=policy.max_attempts() {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => return PollOutcome::Cancelled { attempts: attempt - 1 },
            _ = tokio::time::sleep(policy.interval()) => {}
        }

        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => return PollOutcome::Cancelled { attempts: attempt },
            result = backend.job_status(&record, &job.job_id) => result,
        };

        match result {
            Ok(snapshot) => {
                last_error = None;
                job.observe(&snapshot);
                match job.status {
                    JobStatus::Done => return PollOutcome::Done { attempts: attempt },
                    JobStatus::Failed => {
                        return PollOutcome::Failed {
                            attempts: attempt,
                            message: failure_message(job),
                        };
                    }
                    status => {
                        debug!(job_id = %job.job_id, attempt, %status, "job still running");
                    }
                }
            }
            Err(e) => {
                warn!(
                    job_id = %job.job_id,
                    attempt,
                    max_attempts = policy.max_attempts(),
                    error = %e,
                    "status check failed; will retry"
                );
                last_error = Some(e.user_message());
            }
        }
    }

    let attempts = policy.max_attempts();
    match last_error {
        Some(last_error) => PollOutcome::StatusCheckFailed {
            attempts,
            last_error,
        },
        None => PollOutcome::TimedOut { attempts },
    }
}
