//! `docforge-client`
//!
//! **Responsibility:** the backend contract for document-generation jobs and
//! its HTTP implementation.
//!
//! - `JobBackend`: submit / status / download, the only way the rest of the
//!   workspace talks to the backend
//! - `HttpJobBackend`: `reqwest` implementation with optional bearer auth
//! - `ClientConfig`: environment-driven connection settings

pub mod backend;
pub mod config;
pub mod error;
pub mod http;

pub use backend::{Download, JobBackend};
pub use config::ClientConfig;
pub use error::ClientError;
pub use http::HttpJobBackend;
