use std::path::{Component, Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, error, info, warn};

use super::fs::{FileSystem, StdFileSystem};
use super::types::{
    BatchEntry, BatchOutcome, BatchRecord, CancelToken, EngineError, FileOutcome, FileStatus,
    RenameError, RenameOperation,
};

const BACKUP_SUFFIX: &str = "fishrename-bak";

/// Executes rename batches with per-file backup and rollback.
///
/// Each file goes `Pending -> BackedUp -> Renamed -> Committed`, or on
/// failure `BackedUp -> RestoreOnFailure -> RolledBack`. A failing file
/// never stops the rest of the batch. Only one batch runs at a time.
pub struct RenameEngine<F: FileSystem = StdFileSystem> {
    fs: F,
    busy: AtomicBool,
}

/// Clears the busy flag when a batch ends, however it ends
struct BatchGuard<'a>(&'a AtomicBool);

impl Drop for BatchGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl Default for RenameEngine<StdFileSystem> {
    fn default() -> Self {
        Self::new(StdFileSystem)
    }
}

impl<F: FileSystem> RenameEngine<F> {
    pub fn new(fs: F) -> Self {
        Self {
            fs,
            busy: AtomicBool::new(false),
        }
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::SeqCst)
    }

    pub fn execute(
        &self,
        operations: &[RenameOperation],
        cancel: &CancelToken,
    ) -> Result<BatchOutcome, EngineError> {
        self.execute_with(operations, cancel, |_, _, _| {})
    }

    /// Run a batch, calling `on_file(index, total, outcome)` after each file
    pub fn execute_with(
        &self,
        operations: &[RenameOperation],
        cancel: &CancelToken,
        mut on_file: impl FnMut(usize, usize, &FileOutcome),
    ) -> Result<BatchOutcome, EngineError> {
        if self
            .busy
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            warn!("Rejected rename batch: another batch is running");
            return Err(EngineError::Busy);
        }
        let _guard = BatchGuard(&self.busy);

        let total = operations.len();
        info!("Executing rename batch of {} files", total);

        let mut outcomes = Vec::with_capacity(total);
        let mut record = BatchRecord::new();

        for (i, op) in operations.iter().enumerate() {
            let status = if cancel.is_cancelled() {
                FileStatus::NotProcessed
            } else {
                self.process(op)
            };

            if status == FileStatus::Committed {
                record.entries.push(BatchEntry {
                    original_path: op.source_path.clone(),
                    renamed_path: op.target_path.clone(),
                    mode: op.mode,
                    fields: op.fields.clone(),
                });
            }

            let outcome = FileOutcome {
                source_path: op.source_path.clone(),
                target_path: op.target_path.clone(),
                status,
            };
            on_file(i + 1, total, &outcome);
            outcomes.push(outcome);
        }

        let outcome = BatchOutcome { outcomes, record };
        info!(
            committed = outcome.committed(),
            failed = outcome.failed(),
            not_processed = outcome.not_processed(),
            "Rename batch finished"
        );
        Ok(outcome)
    }

    /// One file, from pre-flight checks to its final state
    fn process(&self, op: &RenameOperation) -> FileStatus {
        if let Err(e) = self.preflight(op) {
            warn!("Rejected {}: {}", op.source_name, e);
            return FileStatus::Rejected(e);
        }
        if op.source_path == op.target_path {
            debug!("Unchanged: {}", op.source_name);
            return FileStatus::Unchanged;
        }

        let backup = self.backup_path(&op.source_path);
        if let Err(e) = self.fs.copy(&op.source_path, &backup) {
            // Nothing was moved; the source is untouched
            let _ = self.fs.remove_file(&backup);
            let reason = RenameError::Backup {
                path: op.source_path.clone(),
                message: e.to_string(),
            };
            warn!("Rolled back {}: {}", op.source_name, reason);
            return FileStatus::RolledBack(reason);
        }
        debug!(backup = ?backup, "Backed up {}", op.source_name);

        match self.fs.rename(&op.source_path, &op.target_path) {
            Ok(()) => {
                if let Err(e) = self.fs.remove_file(&backup) {
                    warn!("Could not remove backup {:?}: {}", backup, e);
                }
                info!("Renamed: {} -> {}", op.source_name, op.target_name);
                FileStatus::Committed
            }
            Err(e) => {
                let message = e.to_string();
                let status = self.restore(op, &backup, message);
                warn!("Rolled back {}: {:?}", op.source_name, status);
                status
            }
        }
    }

    /// Checks repeated right before each mutation
    fn preflight(&self, op: &RenameOperation) -> Result<(), RenameError> {
        let mut components = Path::new(&op.target_name).components();
        let single_normal = matches!(
            (components.next(), components.next()),
            (Some(Component::Normal(_)), None)
        );
        if !single_normal || !self.fs.same_directory(&op.source_path, &op.target_path) {
            return Err(RenameError::PathSafety {
                path: op.source_path.clone(),
                target: op.target_name.clone(),
            });
        }

        if !self.fs.exists(&op.source_path) {
            return Err(RenameError::SourceMissing(op.source_path.clone()));
        }
        if op.target_path != op.source_path && self.fs.exists(&op.target_path) {
            return Err(RenameError::Collision(op.target_path.clone()));
        }
        Ok(())
    }

    /// `.<name>.fishrename-bak`, numbered when taken
    fn backup_path(&self, source: &Path) -> PathBuf {
        let name = source
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        let dir = source.parent().unwrap_or_else(|| Path::new(""));

        let mut candidate = dir.join(format!(".{}.{}", name, BACKUP_SUFFIX));
        let mut n = 1;
        while self.fs.exists(&candidate) {
            candidate = dir.join(format!(".{}.{}-{}", name, BACKUP_SUFFIX, n));
            n += 1;
        }
        candidate
    }

    /// Bring the source back after a failed rename.
    ///
    /// At least one copy always survives: the backup is only removed once
    /// the source is confirmed back in place.
    fn restore(&self, op: &RenameOperation, backup: &Path, message: String) -> FileStatus {
        let rolled_back = RenameError::Rename {
            target: op.target_path.clone(),
            message: message.clone(),
        };

        if !self.fs.exists(&op.source_path) {
            let restored = if self.fs.exists(&op.target_path) {
                // The move half-happened; put the file back where it was
                self.fs
                    .rename(&op.target_path, &op.source_path)
                    .or_else(|_| self.fs.copy(backup, &op.source_path))
            } else {
                self.fs.copy(backup, &op.source_path)
            };

            if let Err(e) = restored {
                error!(
                    "Could not restore {}: {}. Backup kept at {:?}",
                    op.source_name, e, backup
                );
                return FileStatus::RolledBack(RenameError::RestoreFailed {
                    backup: backup.to_path_buf(),
                    message,
                });
            }
        }

        if let Err(e) = self.fs.remove_file(backup) {
            warn!("Could not remove backup {:?}: {}", backup, e);
        }
        FileStatus::RolledBack(rolled_back)
    }
}
