//! Conversion job client for the CloudConvert v2 API.
//!
//! The crate drives one remote conversion end-to-end per file:
//!
//! 1. [`CloudConvertClient::list_supported_formats`] -- output formats for a
//!    file's extension.
//! 2. [`CloudConvertClient::convert`] -- create an import/convert/export job,
//!    upload the file, poll until the job finishes.
//! 3. [`CloudConvertClient::download`] -- stream the converted artifact to
//!    disk.
//!
//! [`CloudConvertClient::convert_many`] and
//! [`CloudConvertClient::download_many`] apply the same steps sequentially to
//! several files and keep failures isolated per file.
//!
//! Every failure is returned as a classified [`Error`]; nothing is retried.

mod api;
mod batch;
mod client;
mod credential;
mod download;
mod error;
mod options;
mod types;

pub use batch::{BatchOutcome, FileFailure};
pub use client::{ClientOptions, CloudConvertClient, DEFAULT_BASE_URL, DEFAULT_REQUEST_TIMEOUT};
pub use credential::Credential;
pub use download::DOWNLOAD_CHUNK_SIZE;
pub use error::{Error, ErrorKind, Result};
pub use options::{
    output_path, OutputOptions, OverwritePolicy, PollOptions, DEFAULT_MAX_POLL_ATTEMPTS,
    DEFAULT_POLL_INTERVAL, DEFAULT_POLL_TIMEOUT,
};
pub use types::{
    input_format, normalize_format, ConversionRequest, ConvertedFile, DownloadedFile, JobHandle,
    JobState,
};

// Re-exported so callers do not need a direct tokio-util dependency.
pub use tokio_util::sync::CancellationToken;
