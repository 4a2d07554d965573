use crate::error::ApiError;
use std::path::{Path, PathBuf};

/// Extensions accepted for upload, lowercase with the leading dot
pub const ALLOWED_EXTENSIONS: [&str; 4] = [".pdf", ".png", ".jpg", ".jpeg"];

/// How an accepted upload is processed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Pdf,
    Image,
}

/// Check an upload's filename and classify it by extension (case-insensitive).
pub fn validate_filename(filename: &str) -> Result<FileKind, ApiError> {
    if filename.is_empty() {
        return Err(ApiError::EmptyFilename);
    }

    let ext = Path::new(filename)
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy().to_lowercase()))
        .unwrap_or_default();

    match ext.as_str() {
        ".pdf" => Ok(FileKind::Pdf),
        ".png" | ".jpg" | ".jpeg" => Ok(FileKind::Image),
        _ => Err(ApiError::InvalidFileType(ext)),
    }
}

/// Where an upload is stored in the scratch directory.
///
/// Only the final path component of the client's filename is kept, so a
/// name like `../../etc/cron.d/x.png` cannot escape the directory. Uploads
/// with the same name overwrite each other.
pub fn scratch_path(scratch_dir: &Path, filename: &str) -> Result<PathBuf, ApiError> {
    let name = Path::new(filename)
        .file_name()
        .ok_or_else(|| ApiError::Internal(format!("Unusable upload filename: {:?}", filename)))?;
    Ok(scratch_dir.join(name))
}

/// Write the upload to the scratch directory, returning where it landed
pub async fn persist(scratch_dir: &Path, filename: &str, data: &[u8]) -> Result<PathBuf, ApiError> {
    let path = scratch_path(scratch_dir, filename)?;
    tokio::fs::write(&path, data)
        .await
        .map_err(|e| ApiError::Internal(format!("Failed to save {:?}: {}", path, e)))?;
    tracing::info!("File saved successfully: {}", path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_accepts_allowed_extensions_case_insensitively() {
        assert_eq!(validate_filename("resume.pdf").unwrap(), FileKind::Pdf);
        assert_eq!(validate_filename("RESUME.PDF").unwrap(), FileKind::Pdf);
        assert_eq!(validate_filename("scan.PNG").unwrap(), FileKind::Image);
        assert_eq!(validate_filename("photo.jpg").unwrap(), FileKind::Image);
        assert_eq!(validate_filename("photo.Jpeg").unwrap(), FileKind::Image);
    }

    #[test]
    fn test_rejects_other_extensions() {
        for name in ["malware.exe", "resume.docx", "resume", "resume.pdf.zip", ".pdf"] {
            assert!(
                matches!(validate_filename(name), Err(ApiError::InvalidFileType(_))),
                "{} should be rejected",
                name
            );
        }
    }

    #[test]
    fn test_empty_filename() {
        assert!(matches!(validate_filename(""), Err(ApiError::EmptyFilename)));
    }

    #[test]
    fn test_allowed_extensions_all_validate() {
        for ext in ALLOWED_EXTENSIONS {
            assert!(validate_filename(&format!("cv{}", ext)).is_ok());
        }
    }

    #[test]
    fn test_scratch_path_keeps_only_file_name() {
        let dir = Path::new("uploads");
        assert_eq!(
            scratch_path(dir, "resume.pdf").unwrap(),
            PathBuf::from("uploads/resume.pdf")
        );
        assert_eq!(
            scratch_path(dir, "../../etc/evil.png").unwrap(),
            PathBuf::from("uploads/evil.png")
        );
    }

    #[tokio::test]
    async fn test_persist_overwrites_same_name() {
        let dir = TempDir::new().unwrap();

        persist(dir.path(), "cv.png", b"first").await.unwrap();
        let path = persist(dir.path(), "cv.png", b"second").await.unwrap();

        assert_eq!(std::fs::read(path).unwrap(), b"second");
    }

    #[tokio::test]
    async fn test_persist_failure_is_internal() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("missing");

        let result = persist(&missing, "cv.png", b"data").await;
        assert!(matches!(result, Err(ApiError::Internal(_))));
    }
}
