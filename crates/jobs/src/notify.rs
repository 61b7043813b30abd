//! User-visible notices about generation runs.

use std::sync::Mutex;

use serde::Serialize;
use tokio::sync::broadcast;
use tracing::{error, info, warn};

use docforge_core::{JobId, RecordKey};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// What happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeKind {
    /// Job accepted, polling started
    Started,
    /// Artifact retrieved
    Ready,
    /// Watching stopped on request
    Cancelled,
    /// Attempt budget exhausted; the job may still finish server-side
    TimedOut,
    /// A generation for the same record is already running
    AlreadyInFlight,
    InvalidRequest,
    SubmissionRejected,
    GenerationFailed,
    RetrievalFailed,
    StatusCheckFailed,
}

impl NoticeKind {
    pub fn level(&self) -> NoticeLevel {
        match self {
            NoticeKind::Started | NoticeKind::Cancelled => NoticeLevel::Info,
            NoticeKind::Ready => NoticeLevel::Success,
            NoticeKind::TimedOut | NoticeKind::AlreadyInFlight => NoticeLevel::Warning,
            NoticeKind::InvalidRequest
            | NoticeKind::SubmissionRejected
            | NoticeKind::GenerationFailed
            | NoticeKind::RetrievalFailed
            | NoticeKind::StatusCheckFailed => NoticeLevel::Error,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub kind: NoticeKind,
    pub level: NoticeLevel,
    pub record: RecordKey,
    pub job_id: Option<JobId>,
    pub message: String,
}

impl Notice {
    pub fn new(kind: NoticeKind, record: RecordKey, message: impl Into<String>) -> Self {
        Self {
            kind,
            level: kind.level(),
            record,
            job_id: None,
            message: message.into(),
        }
    }

    pub fn with_job(mut self, job_id: JobId) -> Self {
        self.job_id = Some(job_id);
        self
    }
}

/// Receiver of notices (toast/alert system, log, event stream, ...).
///
/// Implementations must not block: notices are emitted from the polling task.
pub trait NotificationSink: Send + Sync + 'static {
    fn notify(&self, notice: Notice);
}

/// In-memory sink for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryNotificationSink {
    inner: Mutex<Vec<Notice>>,
}

impl InMemoryNotificationSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn all(&self) -> Vec<Notice> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn count_level(&self, level: NoticeLevel) -> usize {
        self.all().iter().filter(|n| n.level == level).count()
    }

    pub fn kinds(&self) -> Vec<NoticeKind> {
        self.all().iter().map(|n| n.kind).collect()
    }
}

impl NotificationSink for InMemoryNotificationSink {
    fn notify(&self, notice: Notice) {
        self.inner.lock().unwrap_or_else(|e| e.into_inner()).push(notice);
    }
}

/// Writes every notice to the log at a matching level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotificationSink;

impl NotificationSink for TracingNotificationSink {
    fn notify(&self, notice: Notice) {
        let record = notice.record.to_string();
        let job_id = notice.job_id.as_ref().map(|j| j.to_string()).unwrap_or_default();
        let kind = format!("{:?}", notice.kind);

        match notice.level {
            NoticeLevel::Info | NoticeLevel::Success => {
                info!(%record, %job_id, %kind, "{}", notice.message)
            }
            NoticeLevel::Warning => warn!(%record, %job_id, %kind, "{}", notice.message),
            NoticeLevel::Error => error!(%record, %job_id, %kind, "{}", notice.message),
        }
    }
}

/// Fans notices out to live subscribers.
///
/// Lossy: with no subscribers, or when a subscriber lags, notices are dropped.
#[derive(Debug, Clone)]
pub struct BroadcastNotificationSink {
    tx: broadcast::Sender<Notice>,
}

impl BroadcastNotificationSink {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notice> {
        self.tx.subscribe()
    }
}

impl NotificationSink for BroadcastNotificationSink {
    fn notify(&self, notice: Notice) {
        let _ = self.tx.send(notice);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docforge_core::{RecordKind, SourceRecordId};

    fn record() -> RecordKey {
        RecordKey {
            kind: RecordKind::Submission,
            source_record_id: SourceRecordId::parse("5").unwrap(),
        }
    }

    #[test]
    fn level_follows_kind() {
        let notice = Notice::new(NoticeKind::TimedOut, record(), "slow");
        assert_eq!(notice.level, NoticeLevel::Warning);
        assert_eq!(NoticeKind::Ready.level(), NoticeLevel::Success);
        assert_eq!(NoticeKind::RetrievalFailed.level(), NoticeLevel::Error);
    }

    #[test]
    fn in_memory_sink_records_in_order() {
        let sink = InMemoryNotificationSink::new();
        sink.notify(Notice::new(NoticeKind::Started, record(), "a"));
        sink.notify(Notice::new(NoticeKind::Ready, record(), "b"));

        assert_eq!(sink.kinds(), vec![NoticeKind::Started, NoticeKind::Ready]);
        assert_eq!(sink.count_level(NoticeLevel::Error), 0);
    }

    #[test]
    fn notice_serializes_with_snake_case_kind() {
        let notice = Notice::new(NoticeKind::GenerationFailed, record(), "boom")
            .with_job(JobId::parse("j1").unwrap());
        let json = serde_json::to_value(&notice).unwrap();
        assert_eq!(json["kind"], "generation_failed");
        assert_eq!(json["level"], "error");
        assert_eq!(json["job_id"], "j1");
    }

    #[tokio::test]
    async fn broadcast_sink_fans_out() {
        let sink = BroadcastNotificationSink::new(8);
        let mut a = sink.subscribe();
        let mut b = sink.subscribe();

        sink.notify(Notice::new(NoticeKind::Started, record(), "go"));

        assert_eq!(a.recv().await.unwrap().kind, NoticeKind::Started);
        assert_eq!(b.recv().await.unwrap().message, "go");
    }

    #[test]
    fn broadcast_without_subscribers_does_not_fail() {
        let sink = BroadcastNotificationSink::new(1);
        sink.notify(Notice::new(NoticeKind::Ready, record(), "nobody listens"));
    }
}
