//! CloudConvert v2 wire types (private).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub(crate) const IMPORT_TASK: &str = "import-my-file";
pub(crate) const CONVERT_TASK: &str = "convert-my-file";
pub(crate) const EXPORT_TASK: &str = "export-my-file";

#[derive(Debug, Deserialize)]
pub(crate) struct Envelope<T> {
    pub data: T,
}

#[derive(Debug, Deserialize)]
pub(crate) struct FormatEntry {
    pub input_format: String,
    pub output_format: String,
}

/// Body of `POST /jobs`.
#[derive(Debug, Serialize)]
pub(crate) struct CreateJob<'a> {
    pub tasks: BTreeMap<&'static str, TaskSpec<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "operation")]
pub(crate) enum TaskSpec<'a> {
    #[serde(rename = "import/upload")]
    ImportUpload,
    #[serde(rename = "convert")]
    Convert {
        input: &'static str,
        output_format: &'a str,
    },
    #[serde(rename = "export/url")]
    ExportUrl { input: &'static str },
}

impl<'a> CreateJob<'a> {
    /// import (upload) -> convert -> export (public URL)
    pub fn upload_convert_export(output_format: &'a str) -> Self {
        let mut tasks = BTreeMap::new();
        tasks.insert(IMPORT_TASK, TaskSpec::ImportUpload);
        tasks.insert(
            CONVERT_TASK,
            TaskSpec::Convert {
                input: IMPORT_TASK,
                output_format,
            },
        );
        tasks.insert(EXPORT_TASK, TaskSpec::ExportUrl { input: CONVERT_TASK });
        Self { tasks }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum RemoteStatus {
    Waiting,
    Processing,
    Finished,
    Error,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Job {
    pub id: String,
    pub status: Option<RemoteStatus>,
    #[serde(default)]
    pub tasks: Vec<Task>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Task {
    pub name: String,
    pub status: Option<RemoteStatus>,
    pub message: Option<String>,
    pub code: Option<String>,
    pub result: Option<TaskResult>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TaskResult {
    pub form: Option<UploadForm>,
    #[serde(default)]
    pub files: Vec<ExportedFile>,
}

/// Pre-signed upload destination returned by the import task.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct UploadForm {
    pub url: String,
    #[serde(default)]
    pub parameters: serde_json::Map<String, serde_json::Value>,
}

impl UploadForm {
    /// Form fields as strings. Non-string values keep their JSON rendering.
    pub fn fields(&self) -> Vec<(String, String)> {
        self.parameters
            .iter()
            .map(|(key, value)| {
                let value = match value {
                    serde_json::Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                (key.clone(), value)
            })
            .collect()
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ExportedFile {
    pub url: String,
}

impl Job {
    pub fn task(&self, name: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.name == name)
    }

    pub fn upload_form(&self) -> Option<&UploadForm> {
        self.task(IMPORT_TASK)
            .and_then(|t| t.result.as_ref())
            .and_then(|r| r.form.as_ref())
    }

    pub fn export_url(&self) -> Option<&str> {
        self.task(EXPORT_TASK)
            .and_then(|t| t.result.as_ref())
            .and_then(|r| r.files.first())
            .map(|f| f.url.as_str())
    }

    /// Best description of why the job failed.
    pub fn failure_message(&self) -> String {
        self.tasks
            .iter()
            .find(|t| t.status == Some(RemoteStatus::Error))
            .map(|t| match (&t.code, &t.message) {
                (Some(code), Some(message)) => format!("{}: {code}: {message}", t.name),
                (None, Some(message)) => format!("{}: {message}", t.name),
                (Some(code), None) => format!("{}: {code}", t.name),
                (None, None) => format!("{} failed", t.name),
            })
            .unwrap_or_else(|| "job ended in error state".to_string())
    }
}

/// Error body returned by the API on non-2xx responses.
#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorBody {
    pub message: String,
}
