pub mod cli;
pub mod config;
pub mod error;
pub mod fields;
pub mod grammar;
pub mod logging;
pub mod metadata;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod reference;
pub mod rename;
pub mod scanner;
pub mod undo;
pub mod validator;

pub use error::{AppError, ExitCode};
pub use fields::{Confidence, EditRequest, Field, FieldSet, Identification, Mode, Timestamp};
pub use grammar::{assemble, detect_layout, parse, AssembleError, Layout, ParseError};
pub use reference::{ReferenceData, ReferenceError, ReferenceLookup};
pub use rename::{BatchOutcome, BatchRecord, CancelToken, EngineError, FileStatus, RenameEngine};
pub use scanner::{collect_images, ImageEntry, ScannerError};
pub use undo::{UndoManager, UndoResult};
pub use validator::{validate, Severity, ValidationReport};
