//! Error types for alkaline-cloudconvert.

use std::path::PathBuf;
use std::time::Duration;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while talking to CloudConvert or handling files.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No API key has been configured yet.
    #[error("no CloudConvert API key configured")]
    MissingCredential,

    /// The service rejected the API key (HTTP 401).
    #[error("CloudConvert rejected the API key: {message}")]
    Authentication { message: String },

    /// The service could not be reached or answered with something unexpected.
    #[error("CloudConvert service error: {message}")]
    Service { message: String },

    /// The catalog has no conversion for the given input format.
    #[error("no output formats available for .{input_format} files")]
    NoFormatsAvailable { input_format: String },

    /// The conversion job could not be created.
    #[error("failed to create conversion job: {message}")]
    JobCreation { message: String },

    /// The input file could not be uploaded to the import task.
    #[error("failed to upload {}: {message}", path.display())]
    Upload { path: PathBuf, message: String },

    /// The remote job reached the `error` state.
    #[error("conversion job {job_id} failed: {message}")]
    Conversion { job_id: String, message: String },

    /// The converted artifact could not be fetched or written.
    #[error("failed to download {url}: {message}")]
    Download { url: String, message: String },

    /// The destination file exists and the overwrite policy refuses to replace it.
    #[error("output file already exists: {}", path.display())]
    OutputExists { path: PathBuf },

    /// The job did not reach a terminal state within the polling bounds.
    #[error("conversion job {job_id} did not finish after {attempts} status checks ({elapsed:?})")]
    TimedOut {
        job_id: String,
        attempts: u32,
        elapsed: Duration,
    },

    /// The caller cancelled the operation.
    #[error("operation cancelled")]
    Cancelled,

    /// Invalid input provided.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Coarse classification of an [`Error`], used by front ends to pick the
/// next action (ask for a key, replace the key, show an empty state...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    MissingCredential,
    Authentication,
    Service,
    NoFormatsAvailable,
    JobCreation,
    Upload,
    Conversion,
    Download,
    OutputExists,
    TimedOut,
    Cancelled,
    InvalidInput,
    Io,
}

impl Error {
    /// Create a service error.
    pub fn service(message: impl Into<String>) -> Self {
        Self::Service {
            message: message.into(),
        }
    }

    /// Create a job creation error.
    pub fn job_creation(message: impl Into<String>) -> Self {
        Self::JobCreation {
            message: message.into(),
        }
    }

    /// Create an upload error.
    pub fn upload(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Upload {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a download error.
    pub fn download(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Download {
            url: url.into(),
            message: message.into(),
        }
    }

    /// The kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingCredential => ErrorKind::MissingCredential,
            Self::Authentication { .. } => ErrorKind::Authentication,
            Self::Service { .. } => ErrorKind::Service,
            Self::NoFormatsAvailable { .. } => ErrorKind::NoFormatsAvailable,
            Self::JobCreation { .. } => ErrorKind::JobCreation,
            Self::Upload { .. } => ErrorKind::Upload,
            Self::Conversion { .. } => ErrorKind::Conversion,
            Self::Download { .. } => ErrorKind::Download,
            Self::OutputExists { .. } => ErrorKind::OutputExists,
            Self::TimedOut { .. } => ErrorKind::TimedOut,
            Self::Cancelled => ErrorKind::Cancelled,
            Self::InvalidInput(_) => ErrorKind::InvalidInput,
            Self::Io(_) => ErrorKind::Io,
        }
    }

    /// Whether the error is about the API key (missing or rejected).
    pub fn is_credential_problem(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::MissingCredential | ErrorKind::Authentication
        )
    }
}
