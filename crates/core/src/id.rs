//! Strongly-typed identifiers used across the domain.
//!
//! All identifiers are opaque strings owned by the backend. They end up in
//! URL path segments, so they are trimmed and must be non-empty and free of
//! `/`.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Identifier of the record a document is generated for (submission, referat, ...).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SourceRecordId(String);

/// Identifier of a generation job, assigned by the backend at submission.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(String);

/// Code of a document template known to the backend.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TemplateCode(String);

/// Why `value` cannot be used as a single URL path segment, if it cannot.
pub(crate) fn segment_problem(value: &str) -> Option<&'static str> {
    if value.is_empty() {
        Some("must not be empty")
    } else if value.contains('/') {
        Some("must not contain '/'")
    } else if value == "." || value == ".." {
        Some("must not be a relative path segment")
    } else {
        None
    }
}

fn check_segment(name: &str, raw: &str) -> Result<String, DomainError> {
    let value = raw.trim();
    match segment_problem(value) {
        Some(problem) => Err(DomainError::invalid_id(format!("{name}: {problem} (got {value:?})"))),
        None => Ok(value.to_string()),
    }
}

macro_rules! impl_string_newtype {
    ($t:ty, $name:literal) => {
        impl $t {
            /// Parse and validate an identifier.
            pub fn parse(raw: impl AsRef<str>) -> Result<Self, DomainError> {
                check_segment($name, raw.as_ref()).map(Self)
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl AsRef<str> for $t {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl From<$t> for String {
            fn from(value: $t) -> Self {
                value.0
            }
        }

        impl FromStr for $t {
            type Err = DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::parse(s)
            }
        }
    };
}

impl_string_newtype!(SourceRecordId, "SourceRecordId");
impl_string_newtype!(JobId, "JobId");
impl_string_newtype!(TemplateCode, "TemplateCode");
