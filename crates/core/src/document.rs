//! Generation requests: which record, which template.

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};
use crate::id::{SourceRecordId, TemplateCode, segment_problem};

/// Kind of record that owns generated documents.
///
/// Determines the resource path segment on the backend.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    /// Form submissions (`/submissions/...`).
    Submission,
    /// Procurement referate (`/referate/...`).
    Referat,
    /// Any other resource exposing the same document endpoints.
    Custom { segment: String },
}

impl RecordKind {
    pub fn custom(segment: impl Into<String>) -> Self {
        Self::Custom {
            segment: segment.into(),
        }
    }

    pub fn path_segment(&self) -> &str {
        match self {
            RecordKind::Submission => "submissions",
            RecordKind::Referat => "referate",
            RecordKind::Custom { segment } => segment,
        }
    }
}

impl core::fmt::Display for RecordKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.path_segment())
    }
}

impl core::str::FromStr for RecordKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "submission" | "submissions" => Ok(RecordKind::Submission),
            "referat" | "referate" => Ok(RecordKind::Referat),
            other => match segment_problem(other) {
                Some(problem) => Err(DomainError::validation(format!(
                    "record kind {problem} (got {other:?})"
                ))),
                None => Ok(RecordKind::custom(other)),
            },
        }
    }
}

/// Template a document is rendered from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateRef {
    pub code: TemplateCode,
    /// Display name, sent to the backend and used for the default filename.
    pub name: String,
}

impl TemplateRef {
    pub fn new(code: TemplateCode, name: impl Into<String>) -> Self {
        Self {
            code,
            name: name.into(),
        }
    }
}

/// A request to generate one document for one record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub kind: RecordKind,
    pub source_record_id: SourceRecordId,
    pub template: TemplateRef,
}

impl GenerationRequest {
    pub fn new(kind: RecordKind, source_record_id: SourceRecordId, template: TemplateRef) -> Self {
        Self {
            kind,
            source_record_id,
            template,
        }
    }

    /// Check the request before any I/O happens.
    pub fn validate(&self) -> DomainResult<()> {
        if self.template.name.trim().is_empty() {
            return Err(DomainError::validation("template name must not be empty"));
        }
        if let RecordKind::Custom { segment } = &self.kind {
            if segment_problem(segment.trim()).is_some() || segment.trim() != segment {
                return Err(DomainError::validation(format!(
                    "invalid record kind segment: {segment:?}"
                )));
            }
        }
        Ok(())
    }

    /// Key identifying the record this request targets (used for in-flight tracking).
    pub fn record_key(&self) -> RecordKey {
        RecordKey {
            kind: self.kind.clone(),
            source_record_id: self.source_record_id.clone(),
        }
    }
}

/// `(kind, record id)` pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RecordKey {
    pub kind: RecordKind,
    pub source_record_id: SourceRecordId,
}

impl core::fmt::Display for RecordKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}/{}", self.kind, self.source_record_id)
    }
}
