//! Submit → poll → retrieve, with one notice per run outcome.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use docforge_client::JobBackend;
use docforge_core::{Artifact, GenerationRequest, Job, RecordKey};

use crate::error::GenerationError;
use crate::in_flight::{InFlightGuard, InFlightRegistry};
use crate::notify::{Notice, NoticeKind, NotificationSink};
use crate::poller::{PollOutcome, poll_until_terminal};
use crate::policy::PollPolicy;
use crate::retriever::retrieve_artifact;

pub const TIMED_OUT_MESSAGE: &str =
    "Document generation is taking longer than expected; check back later";

/// Non-fatal end of a generation run.
#[derive(Debug)]
pub enum GenerationOutcome {
    /// The job finished and its artifact was downloaded.
    Completed { job: Job, artifact: Artifact },
    /// Attempt budget exhausted; the job may still finish server-side.
    TimedOut { job: Job },
    /// Watching stopped on request. The server-side job is not cancelled.
    Cancelled { job: Job },
}

impl GenerationOutcome {
    pub fn job(&self) -> &Job {
        match self {
            GenerationOutcome::Completed { job, .. }
            | GenerationOutcome::TimedOut { job }
            | GenerationOutcome::Cancelled { job } => job,
        }
    }

    pub fn artifact(&self) -> Option<&Artifact> {
        match self {
            GenerationOutcome::Completed { artifact, .. } => Some(artifact),
            _ => None,
        }
    }
}

/// Drives document generation against a backend, reporting to a sink.
pub struct DocumentGenerator<B: ?Sized, S: ?Sized> {
    backend: Arc<B>,
    sink: Arc<S>,
    policy: PollPolicy,
    in_flight: InFlightRegistry,
}

impl<B: ?Sized, S: ?Sized> Clone for DocumentGenerator<B, S> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
            sink: Arc::clone(&self.sink),
            policy: self.policy,
            in_flight: self.in_flight.clone(),
        }
    }
}

impl<B, S> DocumentGenerator<B, S>
where
    B: JobBackend + ?Sized,
    S: NotificationSink + ?Sized,
{
    pub fn new(backend: Arc<B>, sink: Arc<S>) -> Self {
        Self {
            backend,
            sink,
            policy: PollPolicy::default(),
            in_flight: InFlightRegistry::new(),
        }
    }

    pub fn with_policy(mut self, policy: PollPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> &PollPolicy {
        &self.policy
    }

    /// Records with a run in progress. Shared by clones of this generator.
    pub fn in_flight(&self) -> &InFlightRegistry {
        &self.in_flight
    }

    /// Run one generation to completion on the current task.
    ///
    /// Every path emits exactly one outcome notice (plus a `Started` notice
    /// once the job is accepted). Timeouts and cancellation are `Ok`.
    pub async fn generate(
        &self,
        request: GenerationRequest,
        cancel: &CancellationToken,
    ) -> Result<GenerationOutcome, GenerationError> {
        let guard = self.claim(&request)?;
        self.run(&request, guard, cancel).await
    }

    /// Start a generation on a background task.
    ///
    /// Validation and the in-flight check happen before this returns, so a
    /// duplicate request fails here rather than inside the task.
    pub fn spawn(&self, request: GenerationRequest) -> Result<GenerationHandle, GenerationError> {
        let guard = self.claim(&request)?;
        let cancel = CancellationToken::new();

        let this = self.clone();
        let token = cancel.clone();
        let join = tokio::spawn(async move { this.run(&request, guard, &token).await });

        Ok(GenerationHandle { cancel, join })
    }

    fn claim(&self, request: &GenerationRequest) -> Result<InFlightGuard, GenerationError> {
        let record = request.record_key();

        if let Err(e) = request.validate() {
            self.notify(Notice::new(NoticeKind::InvalidRequest, record, e.to_string()));
            return Err(e.into());
        }

        self.in_flight.try_acquire(record.clone()).inspect_err(|_| {
            self.notify(Notice::new(
                NoticeKind::AlreadyInFlight,
                record.clone(),
                format!("A document is already being generated for {record}"),
            ));
        })
    }

    async fn run(
        &self,
        request: &GenerationRequest,
        _guard: InFlightGuard,
        cancel: &CancellationToken,
    ) -> Result<GenerationOutcome, GenerationError> {
        let record = request.record_key();

        let submitted = match self.backend.submit(request).await {
            Ok(submitted) => submitted,
            Err(source) => {
                let message = source.user_message();
                warn!(%record, error = %source, "submission rejected");
                self.notify(Notice::new(NoticeKind::SubmissionRejected, record, message.clone()));
                return Err(GenerationError::Submission { message, source });
            }
        };

        let mut job = Job::from_submission(request, submitted);
        info!(%record, job_id = %job.job_id, filename = %job.filename, "generation job submitted");
        self.notify(
            Notice::new(NoticeKind::Started, record.clone(), format!("Generating {}", job.filename))
                .with_job(job.job_id.clone()),
        );

        let outcome = poll_until_terminal(self.backend.as_ref(), &mut job, &self.policy, cancel).await;
        debug!(job_id = %job.job_id, ?outcome, "polling finished");

        match outcome {
            PollOutcome::Done { .. } => self.finish(record, job).await,
            PollOutcome::Failed { message, .. } => {
                self.notify_job(NoticeKind::GenerationFailed, record, &job, message.clone());
                Err(GenerationError::GenerationFailed {
                    job_id: job.job_id,
                    message,
                })
            }
            PollOutcome::TimedOut { attempts } => {
                warn!(job_id = %job.job_id, attempts, "gave up waiting for job");
                self.notify_job(NoticeKind::TimedOut, record, &job, TIMED_OUT_MESSAGE);
                Ok(GenerationOutcome::TimedOut { job })
            }
            PollOutcome::StatusCheckFailed {
                attempts,
                last_error,
            } => {
                self.notify_job(
                    NoticeKind::StatusCheckFailed,
                    record,
                    &job,
                    format!("Could not check document status: {last_error}"),
                );
                Err(GenerationError::StatusCheck {
                    job_id: job.job_id,
                    attempts,
                    message: last_error,
                })
            }
            PollOutcome::Cancelled { attempts } => {
                info!(job_id = %job.job_id, attempts, "stopped watching job");
                let message = format!("Stopped waiting for {}", job.filename);
                self.notify_job(NoticeKind::Cancelled, record, &job, message);
                Ok(GenerationOutcome::Cancelled { job })
            }
        }
    }

    async fn finish(&self, record: RecordKey, job: Job) -> Result<GenerationOutcome, GenerationError> {
        match retrieve_artifact(self.backend.as_ref(), &job).await {
            Ok(artifact) => {
                info!(job_id = %job.job_id, bytes = artifact.len(), "document ready");
                let message = format!("{} is ready", artifact.filename);
                self.notify_job(NoticeKind::Ready, record, &job, message);
                Ok(GenerationOutcome::Completed { job, artifact })
            }
            Err(e) => {
                let message = match &e {
                    GenerationError::Retrieval { source, .. } => format!(
                        "Failed to retrieve completed document: {}",
                        source.user_message()
                    ),
                    other => other.to_string(),
                };
                self.notify_job(NoticeKind::RetrievalFailed, record, &job, message);
                Err(e)
            }
        }
    }

    fn notify_job(&self, kind: NoticeKind, record: RecordKey, job: &Job, message: impl Into<String>) {
        self.notify(Notice::new(kind, record, message).with_job(job.job_id.clone()));
    }

    fn notify(&self, notice: Notice) {
        self.sink.notify(notice);
    }
}

/// A generation running on a background task.
#[derive(Debug)]
pub struct GenerationHandle {
    cancel: CancellationToken,
    join: JoinHandle<Result<GenerationOutcome, GenerationError>>,
}

impl GenerationHandle {
    /// Stop watching the job. The run resolves to `GenerationOutcome::Cancelled`
    /// unless it already finished.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }

    pub async fn join(self) -> Result<GenerationOutcome, GenerationError> {
        self.join
            .await
            .map_err(|e| GenerationError::Aborted(e.to_string()))?
    }
}
