//! Background conversion tasks.
//!
//! Network work runs on a spawned tokio task so a front end stays responsive.
//! Progress is reported through an unbounded channel of [`TaskEvent`]s and
//! the task can be stopped early through its [`TaskHandle`].

use alkaline_cloudconvert::{
    BatchOutcome, CancellationToken, CloudConvertClient, ConversionRequest, ConvertedFile,
    DownloadedFile, Error, ErrorKind,
};
use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// A spawned task together with the token that cancels it.
pub struct TaskHandle<T> {
    join: JoinHandle<T>,
    cancel: CancellationToken,
}

impl<T> TaskHandle<T> {
    /// Ask the task to stop. In-flight requests are abandoned and remaining
    /// files are reported as cancelled.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Wait for the task to complete.
    pub async fn join(self) -> anyhow::Result<T> {
        self.join
            .await
            .map_err(|e| anyhow::anyhow!("background task failed: {}", e))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Convert,
    Download,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Convert => write!(f, "convert"),
            Stage::Download => write!(f, "download"),
        }
    }
}

/// Per-file progress reported while a conversion task runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskEvent {
    Converted {
        input: PathBuf,
        url: String,
    },
    Downloaded {
        input: PathBuf,
        path: PathBuf,
        bytes: u64,
    },
    Failed {
        input: PathBuf,
        stage: Stage,
        kind: ErrorKind,
        message: String,
    },
}

impl TaskEvent {
    fn failed(input: &Path, stage: Stage, error: &Error) -> Self {
        TaskEvent::Failed {
            input: input.to_path_buf(),
            stage,
            kind: error.kind(),
            message: error.to_string(),
        }
    }
}

/// Everything a finished conversion task produced.
#[derive(Debug)]
pub struct TaskReport {
    pub converted: BatchOutcome<ConvertedFile>,
    /// `None` when downloading was not requested.
    pub downloaded: Option<BatchOutcome<DownloadedFile>>,
}

impl TaskReport {
    pub fn is_success(&self) -> bool {
        self.converted.is_success()
            && self
                .downloaded
                .as_ref()
                .map_or(true, BatchOutcome::is_success)
    }

    /// Conversion and download failures, one per line.
    pub fn failure_summary(&self) -> Option<String> {
        let lines: Vec<String> = [
            self.converted.failure_summary(),
            self.downloaded
                .as_ref()
                .and_then(BatchOutcome::failure_summary),
        ]
        .into_iter()
        .flatten()
        .collect();

        if lines.is_empty() {
            None
        } else {
            Some(lines.join("\n"))
        }
    }
}

/// Convert `requests` in the background, then download the results when
/// `download` is set.
///
/// Files are handled one after another. The receiver gets one event per file
/// and stage; it may be dropped without affecting the task.
pub fn spawn_conversion(
    client: Arc<CloudConvertClient>,
    requests: Vec<ConversionRequest>,
    target_format: String,
    download: bool,
) -> (TaskHandle<TaskReport>, mpsc::UnboundedReceiver<TaskEvent>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let cancel = CancellationToken::new();
    let task_cancel = cancel.clone();

    let join = tokio::spawn(async move {
        let converted = client
            .convert_many_with(&requests, &task_cancel, |input, result| {
                let event = match result {
                    Ok(file) => TaskEvent::Converted {
                        input: input.to_path_buf(),
                        url: file.url.clone(),
                    },
                    Err(e) => TaskEvent::failed(input, Stage::Convert, e),
                };
                let _ = tx.send(event);
            })
            .await;

        tracing::info!(
            converted = converted.succeeded.len(),
            failed = converted.failed.len(),
            "Conversion pass finished"
        );

        let downloaded = if download {
            let outcome = client
                .download_many_with(
                    &converted.succeeded,
                    &target_format,
                    &task_cancel,
                    |input, result| {
                        let event = match result {
                            Ok(file) => TaskEvent::Downloaded {
                                input: input.to_path_buf(),
                                path: file.path.clone(),
                                bytes: file.bytes,
                            },
                            Err(e) => TaskEvent::failed(input, Stage::Download, e),
                        };
                        let _ = tx.send(event);
                    },
                )
                .await;
            Some(outcome)
        } else {
            None
        };

        TaskReport {
            converted,
            downloaded,
        }
    });

    (TaskHandle { join, cancel }, rx)
}

/// Fetch the output formats for `path` in the background.
pub fn spawn_format_lookup(
    client: Arc<CloudConvertClient>,
    path: PathBuf,
) -> TaskHandle<alkaline_cloudconvert::Result<BTreeSet<String>>> {
    let cancel = CancellationToken::new();
    let task_cancel = cancel.clone();

    let join = tokio::spawn(async move {
        tokio::select! {
            formats = client.list_supported_formats(&path) => formats,
            _ = task_cancel.cancelled() => Err(Error::Cancelled),
        }
    });

    TaskHandle { join, cancel }
}
