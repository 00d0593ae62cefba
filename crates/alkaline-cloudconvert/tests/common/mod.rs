//! Shared test harness for client integration tests.
//!
//! Provides [`FakeCloudConvert`], a [`MockServer`] pre-wired with helpers that
//! mount the CloudConvert endpoints a conversion touches, and a client
//! pointed at it.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::time::Duration;

use alkaline_cloudconvert::{
    ClientOptions, CloudConvertClient, Credential, OutputOptions, PollOptions,
};
use serde_json::{json, Value};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const API_KEY: &str = "test-key";
pub const JOB_ID: &str = "job-1";

/// Polling fast enough for tests, bounded well above what they need.
pub fn fast_poll() -> PollOptions {
    PollOptions {
        interval: Duration::from_millis(10),
        max_attempts: 50,
        timeout: Duration::from_secs(10),
    }
}

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

    pub fn upload_url(&self) -> String {
        format!("{}/upload/{JOB_ID}", self.server.uri())
    }

    pub fn artifact_url(&self) -> String {
        format!("{}/files/{JOB_ID}/artifact", self.server.uri())
    }

    /// Client with the test key, fast polling and default output options.
    pub fn client(&self) -> CloudConvertClient {
        self.client_with(fast_poll(), OutputOptions::default())
    }

    pub fn client_with(&self, poll: PollOptions, output: OutputOptions) -> CloudConvertClient {
        let options = ClientOptions {
            base_url: self.base_url(),
            request_timeout: Duration::from_secs(5),
            poll,
            output,
        };
        CloudConvertClient::with_options(Some(Credential::new(API_KEY).unwrap()), options)
            .unwrap()
    }

    pub fn created_job(&self) -> Value {
        json!({
            "data": {
                "id": JOB_ID,
                "status": "waiting",
                "tasks": [
                    {
                        "name": "import-my-file",
                        "operation": "import/upload",
                        "status": "waiting",
                        "result": {
                            "form": {
                                "url": self.upload_url(),
                                "parameters": {
                                    "expires": 1700000000,
                                    "signature": "signature-value"
                                }
                            }
                        }
                    },
                    { "name": "convert-my-file", "operation": "convert", "status": "waiting" },
                    { "name": "export-my-file", "operation": "export/url", "status": "waiting" }
                ]
            }
        })
    }

    pub fn job_with_status(&self, status: &str) -> Value {
        json!({
            "data": {
                "id": JOB_ID,
                "status": status,
                "tasks": [
                    { "name": "import-my-file", "status": "finished" },
                    { "name": "convert-my-file", "status": status },
                    { "name": "export-my-file", "status": "waiting" }
                ]
            }
        })
    }

    pub fn finished_job(&self) -> Value {
        json!({
            "data": {
                "id": JOB_ID,
                "status": "finished",
                "tasks": [
                    { "name": "import-my-file", "status": "finished" },
                    { "name": "convert-my-file", "status": "finished" },
                    {
                        "name": "export-my-file",
                        "status": "finished",
                        "result": {
                            "files": [{ "filename": "artifact", "url": self.artifact_url() }]
                        }
                    }
                ]
            }
        })
    }

    pub async fn mount_create_job(&self) {
        Mock::given(method("POST"))
            .and(path("/v2/jobs"))
            .and(header("authorization", format!("Bearer {API_KEY}").as_str()))
            .respond_with(ResponseTemplate::new(201).set_body_json(self.created_job()))
            .mount(&self.server)
            .await;
    }

    pub async fn mount_upload(&self, status: u16) {
        Mock::given(method("POST"))
            .and(path(format!("/upload/{JOB_ID}")))
            .respond_with(ResponseTemplate::new(status))
            .mount(&self.server)
            .await;
    }

    pub async fn mount_status(&self, body: Value) {
        Mock::given(method("GET"))
            .and(path(format!("/v2/jobs/{JOB_ID}")))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&self.server)
            .await;
    }

    pub async fn mount_artifact(&self, bytes: &[u8]) {
        Mock::given(method("GET"))
            .and(path(format!("/files/{JOB_ID}/artifact")))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(bytes.to_vec()))
            .mount(&self.server)
            .await;
    }

    /// Everything a successful conversion of one file needs.
    pub async fn mount_happy_path(&self, artifact: &[u8]) {
        self.mount_create_job().await;
        self.mount_upload(201).await;
        self.mount_status(self.finished_job()).await;
        self.mount_artifact(artifact).await;
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

/// Write `contents` to `dir/name` and return the path.
pub fn input_file(dir: &Path, name: &str, contents: &[u8]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).unwrap();
    path
}

/// Serve a single response that announces `declared` body bytes but only
/// sends `body`. The connection is then closed, or held open when `stall`
/// is set. Returns the artifact URL.
pub async fn truncated_artifact(declared: usize, body: Vec<u8>, stall: bool) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut request = [0u8; 4096];
        let _ = socket.read(&mut request).await;

        let head = format!(
            "HTTP/1.1 200 OK\r\nContent-Type: application/octet-stream\r\nContent-Length: {declared}\r\n\r\n"
        );
        socket.write_all(head.as_bytes()).await.unwrap();
        socket.write_all(&body).await.unwrap();
        socket.flush().await.unwrap();

        if stall {
            tokio::time::sleep(Duration::from_secs(30)).await;
        }
    });

    format!("http://{addr}/artifact")
}
