mod codes;

pub use codes::ExitCode;

use crate::config::ConfigError;
use crate::reference::ReferenceError;
use crate::rename::EngineError;
use crate::scanner::ScannerError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Path not found: {path}")]
    PathNotFound { path: PathBuf },

    #[error("Permission denied: {path}")]
    PermissionDenied { path: PathBuf },

    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Reference data error: {0}")]
    Reference(#[from] ReferenceError),

    #[error("No files can be renamed")]
    NothingToRename { total: usize },

    #[error("GPS could not be written to any file")]
    MetadataFailed { failed: usize },

    #[error("{failed} of {total} files failed")]
    PartialFailure { failed: usize, total: usize },

    #[error("All {failed} renames failed")]
    RenameFailed { failed: usize },

    #[error("Another rename batch is already running")]
    Busy,

    #[error("{0}")]
    Other(String),
}

impl AppError {
    pub fn exit_code(&self) -> ExitCode {
        match self {
            AppError::PathNotFound { .. } => ExitCode::PathNotFound,
            AppError::PermissionDenied { .. } => ExitCode::PermissionError,
            AppError::InvalidArguments(_) => ExitCode::InvalidArguments,
            AppError::Config(_) => ExitCode::ConfigError,
            AppError::Reference(_) => ExitCode::ReferenceDataError,
            AppError::NothingToRename { .. } => ExitCode::NothingToRename,
            AppError::MetadataFailed { .. } => ExitCode::MetadataError,
            AppError::PartialFailure { .. } => ExitCode::PartialFailure,
            AppError::RenameFailed { .. } | AppError::Busy => ExitCode::RenameError,
            AppError::Other(_) => ExitCode::GeneralError,
        }
    }

    pub fn detailed_message(&self) -> String {
        match self {
            AppError::PathNotFound { path } => {
                format!(
                    "The specified path does not exist:\n  {}\n\n\
                     Please verify the path and try again.",
                    path.display()
                )
            }

            AppError::PermissionDenied { path } => {
                format!(
                    "Permission denied when accessing:\n  {}\n\n\
                     Please check file permissions.",
                    path.display()
                )
            }

            AppError::InvalidArguments(message) => {
                format!("{}\n\nRun with --help for usage.", message)
            }

            AppError::Config(err) => {
                format!(
                    "{}\n\n\
                     Set FISHRENAME_DATA_DIR (or pass --data-dir) to the directory\n\
                     holding the reference files.",
                    err
                )
            }

            AppError::Reference(err) => {
                format!(
                    "{}\n\n\
                     Reference files are semicolon-separated CSV (UTF-8) plus a JSON\n\
                     labels file. Check the file and its header row.",
                    err
                )
            }

            AppError::NothingToRename { total } => {
                format!(
                    "None of the {} files can be renamed.\n\n\
                     Every file was skipped or has blocking errors; see the list above.",
                    total
                )
            }

            AppError::MetadataFailed { failed } => {
                format!(
                    "Writing GPS coordinates failed for all {} files.\n\n\
                     Check that exiftool is installed (or set FISHRENAME_EXIFTOOL)\n\
                     and that the files are writable.",
                    failed
                )
            }

            AppError::PartialFailure { failed, total } => {
                format!(
                    "{} of {} files could not be renamed; the others were renamed.\n\
                     Failed files were left at their original names.",
                    failed, total
                )
            }

            AppError::RenameFailed { failed } => {
                format!(
                    "All {} renames failed. No file was changed.\n\n\
                     Check file permissions and ensure no files are open.",
                    failed
                )
            }

            AppError::Busy => String::from(
                "Another rename batch is already running. Wait for it to finish.",
            ),

            AppError::Other(message) => message.clone(),
        }
    }
}

impl From<ScannerError> for AppError {
    fn from(err: ScannerError) -> Self {
        match err {
            ScannerError::PathNotFound(path) => AppError::PathNotFound { path },
            ScannerError::PermissionDenied(path) => AppError::PermissionDenied { path },
            ScannerError::IoError(e) => AppError::Other(format!("I/O error: {}", e)),
        }
    }
}

impl From<EngineError> for AppError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::Busy => AppError::Busy,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        let err = AppError::PathNotFound {
            path: PathBuf::from("/test"),
        };
        assert_eq!(err.exit_code(), ExitCode::PathNotFound);

        let err = AppError::PartialFailure { failed: 1, total: 3 };
        assert_eq!(err.exit_code(), ExitCode::PartialFailure);

        assert_eq!(AppError::Busy.exit_code(), ExitCode::RenameError);
        assert_eq!(
            AppError::Config(ConfigError::NoDataDir).exit_code(),
            ExitCode::ConfigError
        );
    }

    #[test]
    fn test_detailed_message_includes_context() {
        let err = AppError::Reference(ReferenceError::MissingColumn {
            path: PathBuf::from("sites.csv"),
            column: "Site string".to_string(),
        });

        let msg = err.detailed_message();
        assert!(msg.contains("sites.csv"));
        assert!(msg.contains("Site string"));
        assert!(msg.contains("semicolon"));
    }

    #[test]
    fn test_scanner_error_conversion() {
        let app_err: AppError = ScannerError::PathNotFound(PathBuf::from("/missing")).into();
        assert_eq!(app_err.exit_code(), ExitCode::PathNotFound);
    }

    #[test]
    fn test_engine_error_conversion() {
        let app_err: AppError = EngineError::Busy.into();
        assert!(matches!(app_err, AppError::Busy));
    }
}
