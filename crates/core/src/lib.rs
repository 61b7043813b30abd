//! `docforge-core`: domain types for asynchronous document generation.
//!
//! This crate contains **pure domain** types (no I/O, no runtime).

pub mod artifact;
pub mod document;
pub mod error;
pub mod id;
pub mod job;

pub use artifact::Artifact;
pub use document::{GenerationRequest, RecordKey, RecordKind, TemplateRef};
pub use error::{DomainError, DomainResult};
pub use id::{JobId, SourceRecordId, TemplateCode};
pub use job::{Job, JobSnapshot, JobStatus, SubmittedJob};
