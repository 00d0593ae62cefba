use alkaline_cloudconvert::{
    ClientOptions, Credential, OutputOptions, OverwritePolicy, PollOptions, DEFAULT_BASE_URL,
};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub polling: PollingConfig,

    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// CloudConvert API key (overridden by CLOUDCONVERT_API_TOKEN)
    #[serde(default)]
    pub api_key: String,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Timeout for a single HTTP request, in seconds (default: 60)
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}
fn default_request_timeout() -> u64 {
    60
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_base_url(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PollingConfig {
    /// Delay between job status checks, in milliseconds (default: 2000)
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,

    /// Give up after this many status checks (default: 900)
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Give up after this many seconds of polling (default: 1800)
    #[serde(default = "default_poll_timeout")]
    pub timeout_secs: u64,
}

fn default_interval_ms() -> u64 {
    2000
}
fn default_max_attempts() -> u32 {
    900
}
fn default_poll_timeout() -> u64 {
    1800
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
            max_attempts: default_max_attempts(),
            timeout_secs: default_poll_timeout(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OutputConfig {
    /// Write converted files here instead of next to their input
    #[serde(default)]
    pub directory: Option<PathBuf>,

    /// Replace existing files instead of refusing to download
    #[serde(default)]
    pub overwrite: bool,
}

impl Config {
    /// The configured API key, if one is set.
    pub fn credential(&self) -> Option<Credential> {
        Credential::new(self.api.api_key.as_str()).ok()
    }

    pub fn poll_options(&self) -> PollOptions {
        PollOptions {
            interval: Duration::from_millis(self.polling.interval_ms),
            max_attempts: self.polling.max_attempts,
            timeout: Duration::from_secs(self.polling.timeout_secs),
        }
    }

    pub fn output_options(&self) -> OutputOptions {
        OutputOptions {
            directory: self.output.directory.clone(),
            overwrite: OverwritePolicy::from_flag(self.output.overwrite),
        }
    }

    pub fn client_options(&self) -> ClientOptions {
        ClientOptions {
            base_url: self.api.base_url.clone(),
            request_timeout: Duration::from_secs(self.api.request_timeout_secs),
            poll: self.poll_options(),
            output: self.output_options(),
        }
    }
}
