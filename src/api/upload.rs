//! Upload staging - uploaded file bytes live in a temp file for one request

use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::debug;

/// Temp copy of an uploaded file. Removed from disk when dropped, so every
/// exit path of the request cleans it up.
pub struct StagedUpload {
    file: NamedTempFile,
    original_name: Option<String>,
    size: usize,
}

impl StagedUpload {
    pub fn stage(dir: &Path, data: &[u8], original_name: Option<String>) -> std::io::Result<Self> {
        fs::create_dir_all(dir)?;
        let mut file = tempfile::Builder::new()
            .prefix("upload-")
            .suffix(".csv")
            .tempfile_in(dir)?;
        file.write_all(data)?;
        file.flush()?;

        debug!(path = %file.path().display(), bytes = data.len(), "Staged upload");
        Ok(Self {
            file,
            original_name,
            size: data.len(),
        })
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    pub fn original_name(&self) -> Option<&str> {
        self.original_name.as_deref()
    }

    pub fn size(&self) -> usize {
        self.size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_staged_file_is_removed_on_drop() {
        let dir = tempfile::tempdir().unwrap();
        let upload = StagedUpload::stage(dir.path(), b"id\n1\n", Some("ids.csv".to_string())).unwrap();
        let path = upload.path().to_path_buf();

        assert!(path.starts_with(dir.path()));
        assert_eq!(fs::read(&path).unwrap(), b"id\n1\n");
        assert_eq!(upload.original_name(), Some("ids.csv"));
        assert_eq!(upload.size(), 5);

        drop(upload);
        assert!(!path.exists());
    }

    #[test]
    fn test_stage_creates_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("uploads").join("incoming");
        let upload = StagedUpload::stage(&nested, b"a\n", None).unwrap();
        assert!(upload.path().starts_with(&nested));
    }
}
