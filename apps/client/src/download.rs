use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::debug;

use crate::errors::ClientError;

/// One of the artifacts the backend produces per submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileType {
    Pdf,
    Html,
    Json,
    CoverLetter,
}

impl FileType {
    pub const ALL: [FileType; 4] = [
        FileType::Pdf,
        FileType::Html,
        FileType::Json,
        FileType::CoverLetter,
    ];

    /// Path token in `/download/{timestamp}/{token}`.
    pub fn token(self) -> &'static str {
        match self {
            FileType::Pdf => "pdf",
            FileType::Html => "html",
            FileType::Json => "json",
            FileType::CoverLetter => "cover_letter",
        }
    }

    /// Name the file is saved under, e.g. `resume_20240101_120000.pdf`.
    pub fn file_name(self, timestamp: &str) -> String {
        match self {
            FileType::CoverLetter => format!("cover_letter_{timestamp}.txt"),
            other => format!("resume_{timestamp}.{}", other.token()),
        }
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

impl FromStr for FileType {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        FileType::ALL
            .into_iter()
            .find(|t| t.token() == raw.trim())
            .ok_or_else(|| {
                format!("unknown file type '{raw}' (expected pdf, html, json or cover_letter)")
            })
    }
}

/// Destination for downloaded bytes.
pub trait FileSink: Send + Sync {
    fn save(&self, file_name: &str, contents: &[u8]) -> Result<PathBuf, ClientError>;
}

/// Saves downloads into a directory.
///
/// Bytes go to a temporary file next to the target first and are renamed into
/// place; the temporary file is removed on drop if anything fails.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl FileSink for DirectorySink {
    fn save(&self, file_name: &str, contents: &[u8]) -> Result<PathBuf, ClientError> {
        std::fs::create_dir_all(&self.dir)?;

        let mut staged = NamedTempFile::new_in(&self.dir)?;
        staged.write_all(contents)?;
        staged.flush()?;

        let target = self.dir.join(file_name);
        staged.persist(&target).map_err(|e| ClientError::Io(e.error))?;

        debug!(path = %target.display(), bytes = contents.len(), "saved download");
        Ok(target)
    }
}
