//! Sequential multi-file operations.
//!
//! Files are processed one after another; a failing file never stops the
//! rest. Successes and failures are collected separately so a front end can
//! report every failure at once.

use std::path::{Path, PathBuf};

use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::client::CloudConvertClient;
use crate::error::{Error, Result};
use crate::types::{ConversionRequest, ConvertedFile, DownloadedFile};

/// A file that could not be processed, with the reason.
#[derive(Debug)]
pub struct FileFailure {
    pub path: PathBuf,
    pub error: Error,
}

/// Aggregate result of a multi-file operation.
#[derive(Debug)]
pub struct BatchOutcome<T> {
    pub succeeded: Vec<T>,
    pub failed: Vec<FileFailure>,
}

impl<T> Default for BatchOutcome<T> {
    fn default() -> Self {
        Self {
            succeeded: Vec::new(),
            failed: Vec::new(),
        }
    }
}

impl<T> BatchOutcome<T> {
    pub fn record(&mut self, path: &Path, result: Result<T>) {
        match result {
            Ok(value) => self.succeeded.push(value),
            Err(error) => self.failed.push(FileFailure {
                path: path.to_path_buf(),
                error,
            }),
        }
    }

    /// True when no file failed.
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn len(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every failure on its own line as `<file>: <error>`, or `None` when all
    /// files succeeded.
    pub fn failure_summary(&self) -> Option<String> {
        if self.failed.is_empty() {
            return None;
        }
        let lines: Vec<String> = self
            .failed
            .iter()
            .map(|f| format!("{}: {}", f.path.display(), f.error))
            .collect();
        Some(lines.join("\n"))
    }
}

impl CloudConvertClient {
    /// Convert every request in order.
    pub async fn convert_many(
        &self,
        requests: &[ConversionRequest],
        cancel: &CancellationToken,
    ) -> BatchOutcome<ConvertedFile> {
        self.convert_many_with(requests, cancel, |_, _| {}).await
    }

    /// Like [`convert_many`](Self::convert_many), calling `on_file` after each
    /// file. Once `cancel` fires, remaining files are recorded as
    /// [`Error::Cancelled`] without touching the network.
    pub async fn convert_many_with<F>(
        &self,
        requests: &[ConversionRequest],
        cancel: &CancellationToken,
        mut on_file: F,
    ) -> BatchOutcome<ConvertedFile>
    where
        F: FnMut(&Path, &Result<ConvertedFile>),
    {
        let mut outcome = BatchOutcome::default();

        for request in requests {
            let result = if cancel.is_cancelled() {
                Err(Error::Cancelled)
            } else {
                self.convert(request, cancel).await
            };

            if let Err(e) = &result {
                warn!(file = %request.input().display(), error = %e, "File not converted");
            }
            on_file(request.input(), &result);
            outcome.record(request.input(), result);
        }

        outcome
    }

    /// Download every converted file in order.
    pub async fn download_many(
        &self,
        results: &[ConvertedFile],
        target_format: &str,
        cancel: &CancellationToken,
    ) -> BatchOutcome<DownloadedFile> {
        self.download_many_with(results, target_format, cancel, |_, _| {})
            .await
    }

    /// Like [`download_many`](Self::download_many), calling `on_file` after
    /// each file.
    pub async fn download_many_with<F>(
        &self,
        results: &[ConvertedFile],
        target_format: &str,
        cancel: &CancellationToken,
        mut on_file: F,
    ) -> BatchOutcome<DownloadedFile>
    where
        F: FnMut(&Path, &Result<DownloadedFile>),
    {
        let mut outcome = BatchOutcome::default();

        for converted in results {
            let result = if cancel.is_cancelled() {
                Err(Error::Cancelled)
            } else {
                self.download(&converted.url, &converted.input, target_format, cancel)
                    .await
            };

            if let Err(e) = &result {
                warn!(file = %converted.input.display(), error = %e, "File not downloaded");
            }
            on_file(converted.input.as_path(), &result);
            outcome.record(&converted.input, result);
        }

        outcome
    }
}
