//! Public data types shared by the client operations.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Lower-cased extension of `path`, used as the CloudConvert input format.
pub fn input_format(path: &Path) -> Result<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty())
        .map(|ext| ext.to_ascii_lowercase())
        .ok_or_else(|| {
            Error::InvalidInput(format!(
                "cannot infer input format of {}: no file extension",
                path.display()
            ))
        })
}

/// Normalise a target format token (`" PDF "` becomes `"pdf"`).
pub fn normalize_format(format: &str) -> Result<String> {
    let format = format.trim().trim_start_matches('.').to_ascii_lowercase();
    if format.is_empty() {
        return Err(Error::InvalidInput("target format cannot be empty".into()));
    }
    Ok(format)
}

/// One file to convert into one target format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionRequest {
    input: PathBuf,
    target_format: String,
}

impl ConversionRequest {
    /// Build a request, checking that the input is an existing file and the
    /// target format is not blank.
    pub fn new(input: impl Into<PathBuf>, target_format: &str) -> Result<Self> {
        let input = input.into();
        if !input.is_file() {
            return Err(Error::InvalidInput(format!(
                "input file does not exist: {}",
                input.display()
            )));
        }
        Ok(Self {
            input,
            target_format: normalize_format(target_format)?,
        })
    }

    /// Build one request per input, all with the same target format.
    pub fn batch<I, P>(inputs: I, target_format: &str) -> Result<Vec<Self>>
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        inputs
            .into_iter()
            .map(|input| Self::new(input, target_format))
            .collect()
    }

    pub fn input(&self) -> &Path {
        &self.input
    }

    pub fn target_format(&self) -> &str {
        &self.target_format
    }
}

/// Identifier of a remote job, valid for a single conversion.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct JobHandle(String);

impl JobHandle {
    pub(crate) fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Where a single conversion currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    Created,
    Uploading,
    Polling,
    Finished,
    Failed,
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Created => "created",
            Self::Uploading => "uploading",
            Self::Polling => "polling",
            Self::Finished => "finished",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// A finished conversion: the input it came from and where to fetch the result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertedFile {
    pub input: PathBuf,
    pub job: JobHandle,
    pub url: String,
}

/// A converted artifact written to local storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadedFile {
    pub path: PathBuf,
    pub bytes: u64,
}
