//! Tunables for polling and output placement.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{Error, Result};

/// Default time between two status checks.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);
/// Default upper bound on status checks for one job.
pub const DEFAULT_MAX_POLL_ATTEMPTS: u32 = 900;
/// Default upper bound on the time spent polling one job.
pub const DEFAULT_POLL_TIMEOUT: Duration = Duration::from_secs(30 * 60);

/// Bounds on the status polling loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollOptions {
    /// Delay between two status checks.
    pub interval: Duration,
    /// Maximum number of status checks before giving up.
    pub max_attempts: u32,
    /// Maximum time spent polling before giving up.
    pub timeout: Duration,
}

impl Default for PollOptions {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            max_attempts: DEFAULT_MAX_POLL_ATTEMPTS,
            timeout: DEFAULT_POLL_TIMEOUT,
        }
    }
}

/// What to do when the download destination already exists.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OverwritePolicy {
    /// Fail with [`Error::OutputExists`].
    #[default]
    Refuse,
    /// Truncate and replace the existing file.
    Replace,
}

impl OverwritePolicy {
    pub fn from_flag(overwrite: bool) -> Self {
        if overwrite {
            Self::Replace
        } else {
            Self::Refuse
        }
    }
}

/// Where downloaded artifacts are written.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutputOptions {
    /// Directory for every output; `None` writes next to the input file.
    pub directory: Option<PathBuf>,
    pub overwrite: OverwritePolicy,
}

/// Destination for the artifact converted from `base`:
/// `<dir>/<base stem>.<target_format>`, where `<dir>` is `directory` when set
/// and the parent of `base` otherwise.
pub fn output_path(base: &Path, target_format: &str, directory: Option<&Path>) -> Result<PathBuf> {
    let stem = base
        .file_stem()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| {
            Error::InvalidInput(format!("no file name in {}", base.display()))
        })?;

    let dir = directory
        .or_else(|| base.parent())
        .unwrap_or_else(|| Path::new(""));

    let mut file_name = stem.to_os_string();
    file_name.push(".");
    file_name.push(target_format);
    Ok(dir.join(file_name))
}
