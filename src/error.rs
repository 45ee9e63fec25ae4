use thiserror::Error;

#[derive(Error, Debug)]
pub enum AutoUpdateError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Project validation failed: {0}")]
    ProjectValidation(String),

    #[error("Update feed request failed: {0}")]
    Feed(String),

    #[error("Unknown ecosystem: {0}")]
    UnknownEcosystem(String),

    #[error("Ecosystem '{0}' does not support version updates")]
    VersionUpdatesDeclined(String),

    #[error("Ecosystem '{0}' is already registered")]
    DuplicateEcosystem(String),

    #[error("Plugin returned mismatched file pair: '{original}' vs '{updated}'")]
    MismatchedFilePair { original: String, updated: String },

    #[error("Ecosystem '{ecosystem}' returned {returned} file pairs for {expected} requirement updates")]
    UnexpectedFileCount {
        ecosystem: String,
        expected: usize,
        returned: usize,
    },

    #[error("Patch failed for {path}: {reason}")]
    Patch { path: String, reason: String },

    #[error("Checksum mismatch for {path}: expected {expected}, found {actual}")]
    ChecksumMismatch {
        path: String,
        expected: String,
        actual: String,
    },

    #[error("Command execution failed: {0}")]
    CommandExecution(String),

    #[error("Invalid dependency file path: {0}")]
    InvalidPath(String),

    #[error("Test suite failed: {0}")]
    TestSuiteFailed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, AutoUpdateError>;
