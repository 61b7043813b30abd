//! Exposing downloaded artifacts on disk.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use docforge_core::Artifact;

/// An artifact written to a temporary file.
///
/// The file is deleted when this value is dropped, unless it was moved out
/// with [`StagedArtifact::persist`].
#[derive(Debug)]
pub struct StagedArtifact {
    file: NamedTempFile,
    filename: String,
}

impl StagedArtifact {
    pub fn stage(artifact: &Artifact) -> io::Result<Self> {
        let filename = artifact.safe_filename();
        let suffix = Path::new(&filename)
            .extension()
            .map(|ext| format!(".{}", ext.to_string_lossy()))
            .unwrap_or_default();

        let mut file = tempfile::Builder::new()
            .prefix("docforge-")
            .suffix(&suffix)
            .tempfile()?;
        file.write_all(&artifact.bytes)?;
        file.flush()?;

        Ok(Self { file, filename })
    }

    /// Temporary location, valid while `self` is alive.
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Move the file into `dir` under its filename and stop tracking it.
    pub fn persist(self, dir: &Path) -> io::Result<PathBuf> {
        fs::create_dir_all(dir)?;
        let dest = dir.join(&self.filename);

        match self.file.persist(&dest) {
            Ok(_) => Ok(dest),
            // Rename fails across filesystems; copy instead. The temp file is
            // removed when `e.file` drops.
            Err(e) => {
                fs::copy(e.file.path(), &dest)?;
                Ok(dest)
            }
        }
    }
}

/// Write `artifact` into `dir` under its sanitised filename.
pub fn save_into(artifact: &Artifact, dir: &Path) -> io::Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let dest = dir.join(artifact.safe_filename());
    fs::write(&dest, &artifact.bytes)?;
    Ok(dest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use docforge_core::JobId;

    fn artifact() -> Artifact {
        Artifact::new(JobId::parse("job-1").unwrap(), "Referat 12.pdf", b"%PDF-1.7".to_vec())
    }

    #[test]
    fn staged_file_is_removed_on_drop() {
        let staged = StagedArtifact::stage(&artifact()).unwrap();
        let path = staged.path().to_path_buf();

        assert_eq!(fs::read(&path).unwrap(), b"%PDF-1.7");
        assert_eq!(path.extension().unwrap(), "pdf");

        drop(staged);
        assert!(!path.exists());
    }

    #[test]
    fn persist_moves_file_into_directory() {
        let dir = tempfile::tempdir().unwrap();
        let staged = StagedArtifact::stage(&artifact()).unwrap();
        let temp_path = staged.path().to_path_buf();

        let dest = staged.persist(&dir.path().join("out")).unwrap();

        assert_eq!(dest, dir.path().join("out").join("Referat 12.pdf"));
        assert_eq!(fs::read(&dest).unwrap(), b"%PDF-1.7");
        assert!(!temp_path.exists());
    }

    #[test]
    fn save_into_uses_safe_filename() {
        let dir = tempfile::tempdir().unwrap();
        let mut artifact = artifact();
        artifact.filename = "../escape.pdf".into();

        let dest = save_into(&artifact, dir.path()).unwrap();

        assert_eq!(dest, dir.path().join(".._escape.pdf"));
        assert!(dest.exists());
    }
}
