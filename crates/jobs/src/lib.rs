//! `docforge-jobs`
//!
//! **Responsibility:** drive document-generation jobs from submission to a
//! terminal state.
//!
//! ## Components
//!
//! - `PollPolicy` / `poll_until_terminal`: fixed-interval, bounded polling
//! - `NotificationSink`: where user-visible notices go
//! - `InFlightRegistry`: at most one generation per record at a time
//! - `StagedArtifact`: temporary on-disk copy of a downloaded document
//! - `DocumentGenerator`: submit → poll → retrieve → notify

pub mod error;
pub mod generator;
pub mod in_flight;
pub mod notify;
pub mod poller;
pub mod policy;
pub mod retriever;
pub mod staging;

#[cfg(test)]
mod test_support;

pub use error::GenerationError;
pub use generator::{DocumentGenerator, GenerationHandle, GenerationOutcome};
pub use in_flight::{InFlightGuard, InFlightRegistry};
pub use notify::{
    BroadcastNotificationSink, InMemoryNotificationSink, Notice, NoticeKind, NoticeLevel,
    NotificationSink, TracingNotificationSink,
};
pub use poller::{PollOutcome, poll_until_terminal};
pub use policy::PollPolicy;
pub use retriever::retrieve_artifact;
pub use staging::{StagedArtifact, save_into};
pub use tokio_util::sync::CancellationToken;
