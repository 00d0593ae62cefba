//! The files a user picked and the format they want.
//!
//! A [`Selection`] is a plain value passed from step to step (list formats,
//! convert, download) instead of living in shared mutable state.

use alkaline_cloudconvert::{normalize_format, ConversionRequest};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum SelectionError {
    #[error("no files selected")]
    NoFiles,

    #[error("file does not exist: {}", .0.display())]
    MissingFile(PathBuf),

    #[error("no target format selected")]
    NoFormat,

    #[error(
        "conversion of {} to {format} is not supported (available: {})",
        file.display(),
        available.join(", ")
    )]
    Unsupported {
        file: PathBuf,
        format: String,
        available: Vec<String>,
    },

    #[error(transparent)]
    Client(#[from] alkaline_cloudconvert::Error),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    files: Vec<PathBuf>,
    target_format: Option<String>,
}

impl Selection {
    /// Select `files`; every entry must be an existing file.
    pub fn new(files: Vec<PathBuf>) -> Result<Self, SelectionError> {
        if files.is_empty() {
            return Err(SelectionError::NoFiles);
        }
        if let Some(missing) = files.iter().find(|f| !f.is_file()) {
            return Err(SelectionError::MissingFile(missing.clone()));
        }
        Ok(Self {
            files,
            target_format: None,
        })
    }

    /// The file whose extension drives the format list.
    pub fn primary(&self) -> &Path {
        &self.files[0]
    }

    pub fn with_format(mut self, format: &str) -> Result<Self, SelectionError> {
        self.target_format = Some(normalize_format(format)?);
        Ok(self)
    }

    pub fn target_format(&self) -> Option<&str> {
        self.target_format.as_deref()
    }

    /// Check the chosen format against the formats offered for the primary file.
    pub fn ensure_supported(&self, available: &BTreeSet<String>) -> Result<(), SelectionError> {
        let format = self.target_format.as_deref().ok_or(SelectionError::NoFormat)?;
        if available.iter().any(|f| f.eq_ignore_ascii_case(format)) {
            return Ok(());
        }
        Err(SelectionError::Unsupported {
            file: self.primary().to_path_buf(),
            format: format.to_string(),
            available: available.iter().cloned().collect(),
        })
    }

    /// One conversion request per selected file.
    pub fn requests(&self) -> Result<Vec<ConversionRequest>, SelectionError> {
        let format = self.target_format.as_deref().ok_or(SelectionError::NoFormat)?;
        Ok(ConversionRequest::batch(self.files.iter().cloned(), format)?)
    }
}
