use crate::fields::{FieldSet, Mode};
use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thiserror::Error;

/// A single planned rename. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct RenameOperation {
    /// Full path to the source file
    pub source_path: PathBuf,
    /// Original file name
    pub source_name: String,
    /// New file name, as assembled by the grammar
    pub target_name: String,
    /// Full path to the target (source directory joined with the new name)
    pub target_path: PathBuf,
    pub mode: Mode,
    /// Fields the target name was assembled from
    pub fields: FieldSet,
}

impl RenameOperation {
    pub fn new(source_path: PathBuf, target_name: String, mode: Mode, fields: FieldSet) -> Self {
        let source_name = source_path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        let target_path = source_path
            .parent()
            .map(|p| p.join(&target_name))
            .unwrap_or_else(|| PathBuf::from(&target_name));

        Self {
            source_path,
            source_name,
            target_name,
            target_path,
            mode,
            fields,
        }
    }
}

/// Why a single file was not renamed
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RenameError {
    #[error("Target name '{target}' escapes the directory of {path}")]
    PathSafety { path: PathBuf, target: String },

    #[error("Target already exists: {0}")]
    Collision(PathBuf),

    #[error("Source file is missing: {0}")]
    SourceMissing(PathBuf),

    #[error("Could not back up {path}: {message}")]
    Backup { path: PathBuf, message: String },

    #[error("Rename to {target} failed: {message}")]
    Rename { target: PathBuf, message: String },

    #[error("Rename failed ({message}) and the original could not be restored; a copy is kept at {backup}")]
    RestoreFailed { backup: PathBuf, message: String },
}

/// Final state of one file in a batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileStatus {
    /// Renamed; the backup was discarded
    Committed,
    /// A mutation was attempted and undone
    RolledBack(RenameError),
    /// Refused before anything was touched (path safety, collision, missing source)
    Rejected(RenameError),
    /// Target equals source, nothing to do
    Unchanged,
    /// The batch was cancelled before this file was started
    NotProcessed,
}

impl FileStatus {
    pub fn is_failure(&self) -> bool {
        matches!(self, FileStatus::RolledBack(_) | FileStatus::Rejected(_))
    }

    pub fn reason(&self) -> Option<&RenameError> {
        match self {
            FileStatus::RolledBack(e) | FileStatus::Rejected(e) => Some(e),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FileOutcome {
    pub source_path: PathBuf,
    pub target_path: PathBuf,
    pub status: FileStatus,
}

/// One committed rename, enough to reverse it
#[derive(Debug, Clone, PartialEq)]
pub struct BatchEntry {
    pub original_path: PathBuf,
    pub renamed_path: PathBuf,
    pub mode: Mode,
    pub fields: FieldSet,
}

/// The undoable record of one executed batch (committed entries only)
#[derive(Debug, Clone, PartialEq)]
pub struct BatchRecord {
    pub executed_at: DateTime<Local>,
    pub entries: Vec<BatchEntry>,
}

impl BatchRecord {
    pub fn new() -> Self {
        Self {
            executed_at: Local::now(),
            entries: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

impl Default for BatchRecord {
    fn default() -> Self {
        Self::new()
    }
}

/// Result of a whole batch: one outcome per operation, in order
#[derive(Debug, Clone)]
pub struct BatchOutcome {
    pub outcomes: Vec<FileOutcome>,
    pub record: BatchRecord,
}

impl BatchOutcome {
    pub fn count(&self, pred: impl Fn(&FileStatus) -> bool) -> usize {
        self.outcomes.iter().filter(|o| pred(&o.status)).count()
    }

    pub fn committed(&self) -> usize {
        self.count(|s| *s == FileStatus::Committed)
    }

    pub fn failed(&self) -> usize {
        self.count(FileStatus::is_failure)
    }

    pub fn not_processed(&self) -> usize {
        self.count(|s| *s == FileStatus::NotProcessed)
    }

    pub fn outcome_for(&self, source: &Path) -> Option<&FileOutcome> {
        self.outcomes.iter().find(|o| o.source_path == source)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("Another rename batch is already running")]
    Busy,
}

/// Shared flag for cancelling a batch between files
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}
