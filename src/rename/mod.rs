mod engine;
mod fs;
mod types;

pub use engine::RenameEngine;
pub use fs::{FileSystem, StdFileSystem};
pub use types::{
    BatchEntry, BatchOutcome, BatchRecord, CancelToken, EngineError, FileOutcome, FileStatus,
    RenameError, RenameOperation,
};
