//! Local disk storage for uploaded files

use bytes::Buf;
use chrono::{DateTime, Local};
use futures::{Stream, StreamExt};
use std::fmt::Display;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs::{self, File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tracing::warn;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("No file was uploaded")]
    MissingFile,

    #[error("File exceeds the upload limit of {0} bytes")]
    TooLarge(u64),

    #[error("Invalid file name")]
    InvalidFilename,

    #[error("Malformed upload: {0}")]
    Multipart(String),

    #[error("Failed to store file: {0}")]
    Io(#[from] std::io::Error),
}

/// Reduce a client supplied filename to its final path component.
///
/// Both `/` and `\` count as separators. Returns `None` when nothing usable
/// remains.
pub fn sanitize_filename(raw: &str) -> Option<String> {
    let name = raw
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim()
        .trim_matches(char::from(0));

    if name.is_empty() || name == "." || name == ".." {
        return None;
    }
    Some(name.to_string())
}

/// `<YYYYmmddHHMMSS>_<name>`
pub fn stored_name(filename: &str, now: DateTime<Local>) -> String {
    format!("{}_{}", now.format("%Y%m%d%H%M%S"), filename)
}

/// Directory that receives uploads, with a per-file size limit
#[derive(Debug, Clone)]
pub struct UploadDir {
    root: PathBuf,
    max_bytes: u64,
}

impl UploadDir {
    pub fn new(root: impl Into<PathBuf>, max_bytes: u64) -> Self {
        Self {
            root: root.into(),
            max_bytes,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn max_bytes(&self) -> u64 {
        self.max_bytes
    }

    pub async fn ensure_exists(&self) -> Result<(), UploadError> {
        fs::create_dir_all(&self.root).await?;
        Ok(())
    }

    /// Stream `chunks` into a new file named after `filename`.
    ///
    /// Returns the path of the stored file. A partially written file is
    /// removed when the stream fails or exceeds the size limit.
    pub async fn save<S, B, E>(&self, filename: &str, mut chunks: S) -> Result<PathBuf, UploadError>
    where
        S: Stream<Item = Result<B, E>> + Unpin,
        B: Buf,
        E: Display,
    {
        let (path, mut file) = self.create_unique(filename).await?;

        let mut written: u64 = 0;
        let outcome: Result<(), UploadError> = async {
            while let Some(chunk) = chunks.next().await {
                let mut chunk = chunk.map_err(|e| UploadError::Multipart(e.to_string()))?;
                written += chunk.remaining() as u64;
                if written > self.max_bytes {
                    return Err(UploadError::TooLarge(self.max_bytes));
                }
                while chunk.has_remaining() {
                    let part = chunk.chunk();
                    file.write_all(part).await?;
                    let len = part.len();
                    chunk.advance(len);
                }
            }
            file.flush().await?;
            Ok(())
        }
        .await;

        if let Err(e) = outcome {
            drop(file);
            if let Err(io) = fs::remove_file(&path).await {
                warn!(path = %path.display(), error = %io, "failed to remove partial upload");
            }
            return Err(e);
        }
        Ok(path)
    }

    async fn create_unique(&self, filename: &str) -> Result<(PathBuf, File), UploadError> {
        let base = stored_name(filename, Local::now());
        let path = self.root.join(&base);
        match OpenOptions::new().write(true).create_new(true).open(&path).await {
            Ok(file) => Ok((path, file)),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                // Same name within the same second
                let suffix = Uuid::new_v4().simple().to_string();
                let path = self.root.join(format!("{}_{}", &suffix[..8], base));
                let file = OpenOptions::new()
                    .write(true)
                    .create_new(true)
                    .open(&path)
                    .await?;
                Ok((path, file))
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// Open a stored file for streaming, with its length.
///
/// `Ok(None)` when it no longer exists.
pub async fn open_stored(path: &Path) -> Result<Option<(File, u64)>, UploadError> {
    let file = match File::open(path).await {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    let len = file.metadata().await?.len();
    Ok(Some((file, len)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use chrono::TimeZone;
    use std::convert::Infallible;

    fn chunks(parts: &[&'static [u8]]) -> impl Stream<Item = Result<Bytes, Infallible>> + Unpin {
        futures::stream::iter(
            parts
                .iter()
                .map(|p| Ok(Bytes::from_static(p)))
                .collect::<Vec<_>>(),
        )
    }

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("report.pdf").as_deref(), Some("report.pdf"));
        assert_eq!(
            sanitize_filename("../../etc/passwd").as_deref(),
            Some("passwd")
        );
        assert_eq!(
            sanitize_filename("C:\\Users\\me\\spec.docx").as_deref(),
            Some("spec.docx")
        );
        assert_eq!(sanitize_filename("dir/"), None);
        assert_eq!(sanitize_filename(".."), None);
        assert_eq!(sanitize_filename("   "), None);
    }

    #[test]
    fn test_stored_name() {
        let now = Local.with_ymd_and_hms(2024, 3, 9, 7, 5, 1).unwrap();
        assert_eq!(stored_name("a.txt", now), "20240309070501_a.txt");
    }

    #[tokio::test]
    async fn test_save_and_read_back() {
        let dir = tempfile::tempdir().unwrap();
        let uploads = UploadDir::new(dir.path(), 1024);

        let path = uploads
            .save("notes.txt", chunks(&[b"hello ", b"world"]))
            .await
            .unwrap();

        assert!(path.starts_with(dir.path()));
        assert!(path
            .file_name()
            .unwrap()
            .to_string_lossy()
            .ends_with("_notes.txt"));
        let (_, len) = open_stored(&path).await.unwrap().unwrap();
        assert_eq!(len, 11);
        assert_eq!(fs::read(&path).await.unwrap(), b"hello world");
    }

    #[tokio::test]
    async fn test_same_name_twice_keeps_both() {
        let dir = tempfile::tempdir().unwrap();
        let uploads = UploadDir::new(dir.path(), 1024);

        let first = uploads.save("x.bin", chunks(&[b"1"])).await.unwrap();
        let second = uploads.save("x.bin", chunks(&[b"2"])).await.unwrap();

        assert_ne!(first, second);
        assert_eq!(fs::read(&first).await.unwrap(), b"1");
        assert_eq!(fs::read(&second).await.unwrap(), b"2");
    }

    #[tokio::test]
    async fn test_oversized_upload_is_removed() {
        let dir = tempfile::tempdir().unwrap();
        let uploads = UploadDir::new(dir.path(), 4);

        let err = uploads
            .save("big.bin", chunks(&[b"abc", b"def"]))
            .await
            .unwrap_err();

        assert!(matches!(err, UploadError::TooLarge(4)));
        let mut entries = fs::read_dir(dir.path()).await.unwrap();
        assert!(entries.next_entry().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_missing_file_opens_as_none() {
        let dir = tempfile::tempdir().unwrap();
        assert!(open_stored(&dir.path().join("gone.txt"))
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_ensure_exists_creates_nested_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let uploads = UploadDir::new(dir.path().join("a/b"), 10);
        uploads.ensure_exists().await.unwrap();
        assert!(uploads.root().is_dir());
    }
}
