//! Shared test harness for application tests.
//!
//! [`FakeCloudConvert`] mounts the endpoints one conversion touches on a
//! [`MockServer`]; [`write_config`] points a config file at it.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use alkaline::config::{self, Config};
use alkaline_cloudconvert::CloudConvertClient;
use serde_json::{json, Value};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const API_KEY: &str = "test-key";
pub const JOB_ID: &str = "job-1";

pub struct FakeCloudConvert {
    pub server: MockServer,
}

impl FakeCloudConvert {
    pub async fn start() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    pub fn base_url(&self) -> String {
        format!("{}/v2", self.server.uri())
    }

    /// Config with the test key, fast polling and this server as API base.
    pub fn config(&self) -> Config {
        let mut config = Config::default();
        config.api.api_key = API_KEY.to_string();
        config.api.base_url = self.base_url();
        config.api.request_timeout_secs = 5;
        config.polling.interval_ms = 10;
        config.polling.max_attempts = 50;
        config.polling.timeout_secs = 10;
        config
    }

    pub fn client(&self) -> Arc<CloudConvertClient> {
        Arc::new(config::build_client(&self.config()).unwrap())
    }

    pub async fn mount_formats(&self, input_format: &str, outputs: &[&str]) {
        let data: Vec<Value> = outputs
            .iter()
            .map(|out| json!({ "input_format": input_format, "output_format": out }))
            .collect();
        Mock::given(method("GET"))
            .and(path("/v2/convert/formats"))
            .and(query_param("filter[input_format]", input_format))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": data })))
            .mount(&self.server)
            .await;
    }

    /// Job creation, upload, an immediately finished job and its artifact.
    pub async fn mount_conversion(&self, artifact: &[u8]) {
        let uri = self.server.uri();

        Mock::given(method("POST"))
            .and(path("/v2/jobs"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "data": {
                    "id": JOB_ID,
                    "status": "waiting",
                    "tasks": [{
                        "name": "import-my-file",
                        "status": "waiting",
                        "result": { "form": { "url": format!("{uri}/upload"), "parameters": {} } }
                    }]
                }
            })))
            .mount(&self.server)
            .await;

        Mock::given(method("POST"))
            .and(path("/upload"))
            .respond_with(ResponseTemplate::new(201))
            .mount(&self.server)
            .await;

        Mock::given(method("GET"))
            .and(path(format!("/v2/jobs/{JOB_ID}")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": {
                    "id": JOB_ID,
                    "status": "finished",
                    "tasks": [{
                        "name": "export-my-file",
                        "status": "finished",
                        "result": { "files": [{ "url": format!("{uri}/artifact") }] }
                    }]
                }
            })))
            .mount(&self.server)
            .await;

        Mock::given(method("GET"))
            .and(path("/artifact"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(artifact.to_vec()))
            .mount(&self.server)
            .await;
    }

    /// Number of requests received for `path`.
    pub async fn hits(&self, request_path: &str) -> usize {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .filter(|r| r.url.path() == request_path)
            .count()
    }
}

/// Write a config file pointing at `base_url` into `dir`.
pub fn write_config(dir: &Path, base_url: &str, api_key: &str) -> PathBuf {
    let path = dir.join("alkaline.toml");
    let contents = format!(
        r#"
[api]
api_key = "{api_key}"
base_url = "{base_url}"
request_timeout_secs = 5

[polling]
interval_ms = 10
max_attempts = 50
timeout_secs = 10
"#
    );
    std::fs::write(&path, contents).unwrap();
    path
}

/// Write `contents` to `dir/name` and return the path.
pub fn input_file(dir: &Path, name: &str, contents: &[u8]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).unwrap();
    path
}

pub fn fast_timeout() -> Duration {
    Duration::from_secs(10)
}
