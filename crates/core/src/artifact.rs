use crate::id::JobId;

/// Binary document produced by a completed job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub job_id: JobId,
    pub filename: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl Artifact {
    pub fn new(job_id: JobId, filename: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            job_id,
            filename: filename.into(),
            content_type: None,
            bytes,
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Filename safe to join onto a local directory.
    ///
    /// Path separators and control characters become `_`; an empty or
    /// dot-only name falls back to `<job_id>.bin`.
    pub fn safe_filename(&self) -> String {
        let cleaned: String = self
            .filename
            .trim()
            .chars()
            .map(|c| match c {
                '/' | '\\' | ':' => '_',
                c if c.is_control() => '_',
                c => c,
            })
            .collect();

        if cleaned.chars().all(|c| c == '.' || c == '_') {
            format!("{}.bin", self.job_id)
        } else {
            cleaned
        }
    }
}
