//! Scripted in-process backend for tests.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;

use docforge_client::{ClientError, Download, JobBackend};
use docforge_core::{
    GenerationRequest, JobId, JobSnapshot, JobStatus, RecordKey, RecordKind, SourceRecordId,
    SubmittedJob, TemplateCode, TemplateRef,
};

/// One scripted status-check response.
#[derive(Debug, Clone)]
pub enum Step {
    Status(JobSnapshot),
    /// The status call itself fails (network/5xx).
    Fail(String),
}

impl Step {
    pub fn processing() -> Self {
        Step::Status(JobSnapshot::new(JobStatus::Processing))
    }

    pub fn done() -> Self {
        Step::Status(JobSnapshot::new(JobStatus::Done))
    }

    pub fn failed(message: &str) -> Self {
        Step::Status(JobSnapshot::failed(message))
    }
}

#[derive(Debug)]
struct Calls {
    submits: u32,
    /// (start, end) of every status check.
    status_checks: Vec<(Instant, Instant)>,
    downloads: u32,
}

#[derive(Debug)]
pub struct ScriptedBackend {
    steps: Mutex<VecDeque<Step>>,
    /// Returned once the script is exhausted.
    fallback: Step,
    submit_error: Option<ClientError>,
    download_error: Option<String>,
    check_latency: Duration,
    calls: Mutex<Calls>,
}

impl ScriptedBackend {
    pub fn new(steps: impl IntoIterator<Item = Step>) -> Self {
        Self {
            steps: Mutex::new(steps.into_iter().collect()),
            fallback: Step::processing(),
            submit_error: None,
            download_error: None,
            check_latency: Duration::ZERO,
            calls: Mutex::new(Calls {
                submits: 0,
                status_checks: Vec::new(),
                downloads: 0,
            }),
        }
    }

    /// Every status check reports `processing`.
    pub fn always_processing() -> Self {
        Self::new(Vec::<Step>::new())
    }

    pub fn rejecting_submission(message: &str) -> Self {
        let mut backend = Self::always_processing();
        backend.submit_error = Some(ClientError::api(422, message));
        backend
    }

    pub fn with_download_error(mut self, message: &str) -> Self {
        self.download_error = Some(message.to_string());
        self
    }

    pub fn with_check_latency(mut self, latency: Duration) -> Self {
        self.check_latency = latency;
        self
    }

    pub fn submits(&self) -> u32 {
        self.calls.lock().unwrap().submits
    }

    pub fn status_checks(&self) -> Vec<(Instant, Instant)> {
        self.calls.lock().unwrap().status_checks.clone()
    }

    pub fn downloads(&self) -> u32 {
        self.calls.lock().unwrap().downloads
    }
}

#[async_trait]
impl JobBackend for ScriptedBackend {
    async fn submit(&self, request: &GenerationRequest) -> Result<SubmittedJob, ClientError> {
        let n = {
            let mut calls = self.calls.lock().unwrap();
            calls.submits += 1;
            calls.submits
        };
        if let Some(ClientError::Api { status, message }) = &self.submit_error {
            return Err(ClientError::api(*status, message.clone()));
        }
        Ok(SubmittedJob {
            job_id: JobId::parse(format!("job-{n}")).unwrap(),
            status: JobStatus::Pending,
            filename: format!("{}.docx", request.template.code),
        })
    }

    async fn job_status(&self, _record: &RecordKey, _job_id: &JobId) -> Result<JobSnapshot, ClientError> {
        let start = Instant::now();
        if !self.check_latency.is_zero() {
            tokio::time::sleep(self.check_latency).await;
        }
        let step = self
            .steps
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone());
        self.calls
            .lock()
            .unwrap()
            .status_checks
            .push((start, Instant::now()));

        match step {
            Step::Status(snapshot) => Ok(snapshot),
            Step::Fail(message) => Err(ClientError::api(503, message)),
        }
    }

    async fn download(&self, _record: &RecordKey, job_id: &JobId) -> Result<Download, ClientError> {
        self.calls.lock().unwrap().downloads += 1;
        if let Some(message) = &self.download_error {
            return Err(ClientError::api(500, message.clone()));
        }
        Ok(Download {
            content_type: Some("application/vnd.openxmlformats-officedocument.wordprocessingml.document".into()),
            filename: None,
            bytes: format!("doc:{job_id}").into_bytes(),
        })
    }
}

pub fn request(record: &str) -> GenerationRequest {
    GenerationRequest::new(
        RecordKind::Referat,
        SourceRecordId::parse(record).unwrap(),
        TemplateRef::new(TemplateCode::parse("NOTA").unwrap(), "Nota justificativa"),
    )
}
