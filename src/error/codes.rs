#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    Success = 0,
    GeneralError = 1,
    InvalidArguments = 2,
    PathNotFound = 3,
    ReferenceDataError = 4,
    NothingToRename = 5,
    MetadataError = 6,
    PermissionError = 7,
    PartialFailure = 8,
    RenameError = 9,
    ConfigError = 10,
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> i32 {
        code as i32
    }
}
