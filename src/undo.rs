use crate::rename::{
    BatchRecord, CancelToken, EngineError, FileOutcome, FileStatus, FileSystem, RenameEngine,
    RenameOperation,
};
use tracing::{info, warn};

/// Result of an undo request
#[derive(Debug, Clone, PartialEq)]
pub enum UndoResult {
    NothingToUndo,
    /// Every entry was reversed and the buffer is now empty
    Completed { restored: usize },
    /// Some entries could not be reversed; they stay in the buffer
    Partial {
        restored: usize,
        failed: Vec<FileOutcome>,
    },
}

/// Single-slot undo buffer holding the most recent committed batch.
///
/// In memory only; nothing survives the process.
#[derive(Debug, Default)]
pub struct UndoManager {
    slot: Option<BatchRecord>,
}

impl UndoManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a finished batch. Batches with no committed entries leave the
    /// previous record in place. Returns whether the slot was replaced.
    pub fn record(&mut self, record: BatchRecord) -> bool {
        if record.is_empty() {
            return false;
        }
        info!(
            entries = record.len(),
            "Stored batch from {} for undo",
            record.executed_at.format("%Y-%m-%d %H:%M:%S")
        );
        self.slot = Some(record);
        true
    }

    pub fn last(&self) -> Option<&BatchRecord> {
        self.slot.as_ref()
    }

    pub fn can_undo(&self) -> bool {
        self.slot.is_some()
    }

    /// Reverse the stored batch, newest rename first.
    ///
    /// Runs through the engine, so each reversal gets the same pre-flight
    /// checks and backup as a forward rename.
    pub fn undo<F: FileSystem>(&mut self, engine: &RenameEngine<F>) -> Result<UndoResult, EngineError> {
        let Some(mut record) = self.slot.take() else {
            info!("Nothing to undo");
            return Ok(UndoResult::NothingToUndo);
        };

        // Entries and operations share the same (reversed) order
        record.entries.reverse();
        let operations: Vec<RenameOperation> = record
            .entries
            .iter()
            .map(|entry| {
                let original_name = entry
                    .original_path
                    .file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_default();
                RenameOperation::new(
                    entry.renamed_path.clone(),
                    original_name,
                    entry.mode,
                    entry.fields.clone(),
                )
            })
            .collect();

        let outcome = match engine.execute(&operations, &CancelToken::new()) {
            Ok(outcome) => outcome,
            Err(e) => {
                record.entries.reverse();
                self.slot = Some(record);
                return Err(e);
            }
        };

        let mut failed = Vec::new();
        let mut remaining = Vec::new();
        for (entry, result) in record.entries.into_iter().zip(outcome.outcomes) {
            match result.status {
                FileStatus::Committed | FileStatus::Unchanged => {}
                _ => {
                    warn!(
                        "Could not undo {:?}: {:?}",
                        entry.renamed_path, result.status
                    );
                    remaining.push(entry);
                    failed.push(result);
                }
            }
        }

        let restored = operations.len() - failed.len();
        if remaining.is_empty() {
            info!("Undo complete: {} files restored", restored);
            return Ok(UndoResult::Completed { restored });
        }

        // Keep the failed entries in their original order
        remaining.reverse();
        record.entries = remaining;
        self.slot = Some(record);
        warn!(
            "Undo partial: {} restored, {} still pending",
            restored,
            failed.len()
        );
        Ok(UndoResult::Partial { restored, failed })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::{FieldSet, Mode};
    use crate::rename::StdFileSystem;
    use std::fs;
    use std::path::Path;
    use tempfile::tempdir;

    fn op(dir: &Path, from: &str, to: &str) -> RenameOperation {
        RenameOperation::new(dir.join(from), to.to_string(), Mode::Basic, FieldSet::default())
    }

    fn rename_batch(
        engine: &RenameEngine<StdFileSystem>,
        dir: &Path,
        pairs: &[(&str, &str)],
    ) -> BatchRecord {
        for (from, _) in pairs {
            fs::write(dir.join(from), *from).unwrap();
        }
        let ops: Vec<_> = pairs.iter().map(|(f, t)| op(dir, f, t)).collect();
        engine.execute(&ops, &CancelToken::new()).unwrap().record
    }

    #[test]
    fn test_undo_restores_all_and_clears() {
        let dir = tempdir().unwrap();
        let engine = RenameEngine::default();
        let mut undo = UndoManager::new();

        let record = rename_batch(&engine, dir.path(), &[("a.jpg", "x_a.jpg"), ("b.jpg", "x_b.jpg")]);
        assert!(undo.record(record));

        let result = undo.undo(&engine).unwrap();

        assert_eq!(result, UndoResult::Completed { restored: 2 });
        assert!(dir.path().join("a.jpg").exists());
        assert!(dir.path().join("b.jpg").exists());
        assert!(!dir.path().join("x_a.jpg").exists());
        assert!(!undo.can_undo());
    }

    #[test]
    fn test_second_undo_is_noop() {
        let dir = tempdir().unwrap();
        let engine = RenameEngine::default();
        let mut undo = UndoManager::new();

        undo.record(rename_batch(&engine, dir.path(), &[("a.jpg", "x_a.jpg")]));
        undo.undo(&engine).unwrap();

        assert_eq!(undo.undo(&engine).unwrap(), UndoResult::NothingToUndo);
        assert!(dir.path().join("a.jpg").exists());
    }

    #[test]
    fn test_empty_undo_buffer() {
        let engine = RenameEngine::default();
        assert_eq!(
            UndoManager::new().undo(&engine).unwrap(),
            UndoResult::NothingToUndo
        );
    }

    #[test]
    fn test_partial_undo_keeps_failed_entries() {
        let dir = tempdir().unwrap();
        let engine = RenameEngine::default();
        let mut undo = UndoManager::new();

        undo.record(rename_batch(
            &engine,
            dir.path(),
            &[("a.jpg", "x_a.jpg"), ("b.jpg", "x_b.jpg"), ("c.jpg", "x_c.jpg")],
        ));

        // Moved away externally in the meantime
        fs::rename(dir.path().join("x_b.jpg"), dir.path().join("moved.jpg")).unwrap();

        let result = undo.undo(&engine).unwrap();

        match result {
            UndoResult::Partial { restored, failed } => {
                assert_eq!(restored, 2);
                assert_eq!(failed.len(), 1);
                assert_eq!(failed[0].source_path, dir.path().join("x_b.jpg"));
            }
            other => panic!("Expected partial undo, got {:?}", other),
        }

        let kept = undo.last().unwrap();
        assert_eq!(kept.len(), 1);
        assert_eq!(kept.entries[0].original_path, dir.path().join("b.jpg"));

        // Put it back and retry: the remaining entry now reverses
        fs::rename(dir.path().join("moved.jpg"), dir.path().join("x_b.jpg")).unwrap();
        assert_eq!(undo.undo(&engine).unwrap(), UndoResult::Completed { restored: 1 });
        assert!(dir.path().join("b.jpg").exists());
    }

    #[test]
    fn test_undo_refuses_to_overwrite() {
        let dir = tempdir().unwrap();
        let engine = RenameEngine::default();
        let mut undo = UndoManager::new();

        undo.record(rename_batch(&engine, dir.path(), &[("a.jpg", "x_a.jpg")]));
        fs::write(dir.path().join("a.jpg"), "newcomer").unwrap();

        let result = undo.undo(&engine).unwrap();

        assert!(matches!(result, UndoResult::Partial { restored: 0, .. }));
        assert_eq!(fs::read_to_string(dir.path().join("a.jpg")).unwrap(), "newcomer");
        assert!(dir.path().join("x_a.jpg").exists());
    }

    #[test]
    fn test_empty_batch_does_not_replace_record() {
        let dir = tempdir().unwrap();
        let engine = RenameEngine::default();
        let mut undo = UndoManager::new();

        undo.record(rename_batch(&engine, dir.path(), &[("a.jpg", "x_a.jpg")]));
        assert!(!undo.record(BatchRecord::new()));
        assert_eq!(undo.last().unwrap().len(), 1);
    }

    #[test]
    fn test_new_batch_replaces_record() {
        let dir = tempdir().unwrap();
        let engine = RenameEngine::default();
        let mut undo = UndoManager::new();

        undo.record(rename_batch(&engine, dir.path(), &[("a.jpg", "x_a.jpg")]));
        undo.record(rename_batch(&engine, dir.path(), &[("b.jpg", "x_b.jpg")]));

        undo.undo(&engine).unwrap();
        assert!(dir.path().join("b.jpg").exists());
        assert!(dir.path().join("x_a.jpg").exists());
    }
}
