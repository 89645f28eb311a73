//! Scratch area for per-execution diagnostic records
//!
//! Each execution may drop a small text record (language, filename, timestamp,
//! source) into a process-wide temporary directory. The record is owned by a
//! guard that deletes the file when it goes out of scope, so cleanup happens
//! on every exit path of an execution. The directory itself is removed when
//! the `ScratchArea` is dropped at shutdown.

use crate::languages::Language;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Prefix of the process-wide scratch directory
pub const SCRATCH_PREFIX: &str = "codemaster_";

const RULE: &str = "==================================================";

/// Process-wide temporary directory holding diagnostic records
#[derive(Debug)]
pub struct ScratchArea {
    root: TempDir,
    files_dir: PathBuf,
}

/// Contents of one diagnostic record
#[derive(Debug, Clone, Copy)]
pub struct DiagnosticEntry<'a> {
    pub execution_id: &'a str,
    pub language: Language,
    pub filename: &'a str,
    pub source: &'a str,
}

/// Guard for a written diagnostic record; deletes the file on drop
#[derive(Debug)]
pub struct DiagnosticRecord {
    path: PathBuf,
}

impl ScratchArea {
    /// Create the scratch area under the system temp directory
    pub fn create() -> io::Result<Self> {
        let root = tempfile::Builder::new().prefix(SCRATCH_PREFIX).tempdir()?;
        Self::from_root(root)
    }

    /// Create the scratch area under `parent`
    pub fn create_in(parent: impl AsRef<Path>) -> io::Result<Self> {
        let root = tempfile::Builder::new()
            .prefix(SCRATCH_PREFIX)
            .tempdir_in(parent)?;
        Self::from_root(root)
    }

    fn from_root(root: TempDir) -> io::Result<Self> {
        let files_dir = root.path().join("files");
        fs::create_dir_all(&files_dir)?;
        Ok(Self { root, files_dir })
    }

    pub fn path(&self) -> &Path {
        self.root.path()
    }

    pub fn files_dir(&self) -> &Path {
        &self.files_dir
    }

    /// Write a diagnostic record and return the guard that owns it
    pub fn record(&self, entry: &DiagnosticEntry<'_>) -> io::Result<DiagnosticRecord> {
        let path = self.files_dir.join(format!("{}.log", entry.execution_id));
        let body = format!(
            "Execution Log - {id}\nLanguage: {language}\nFilename: {filename}\nTimestamp: {ts}\nCode Length: {len} characters\n{rule}\n{source}\n{rule}\n",
            id = entry.execution_id,
            language = entry.language,
            filename = entry.filename,
            ts = chrono::Utc::now().to_rfc3339(),
            len = entry.source.chars().count(),
            rule = RULE,
            source = entry.source,
        );
        fs::write(&path, body)?;
        Ok(DiagnosticRecord { path })
    }
}

impl DiagnosticRecord {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for DiagnosticRecord {
    fn drop(&mut self) {
        match fs::remove_file(&self.path) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!(
                path = %self.path.display(),
                error = %e,
                "Failed to remove diagnostic record"
            ),
        }
    }
}
