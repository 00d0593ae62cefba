//! CloudConvert v2 job client.
//!
//! One [`CloudConvertClient::convert`] call drives a single remote job through
//! create -> upload -> poll. Nothing is retried: every failure is classified
//! into an [`Error`] and handed back to the caller.

use std::collections::BTreeSet;
use std::path::Path;
use std::time::{Duration, Instant};

use parking_lot::RwLock;
use reqwest::header::AUTHORIZATION;
use reqwest::multipart::{Form, Part};
use reqwest::{Response, StatusCode};
use tokio_util::io::ReaderStream;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::api::{ApiErrorBody, CreateJob, Envelope, FormatEntry, Job, RemoteStatus, UploadForm};
use crate::credential::Credential;
use crate::error::{Error, Result};
use crate::options::{OutputOptions, PollOptions};
use crate::types::{input_format, ConversionRequest, ConvertedFile, JobHandle, JobState};

/// Production API endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.cloudconvert.com/v2";
/// Timeout applied to every HTTP request.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Construction options for [`CloudConvertClient`].
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// API root, without trailing slash (tests point this at a mock server).
    pub base_url: String,
    pub request_timeout: Duration,
    pub poll: PollOptions,
    pub output: OutputOptions,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            poll: PollOptions::default(),
            output: OutputOptions::default(),
        }
    }
}

/// Client for the CloudConvert conversion-job lifecycle.
///
/// The client is `Send + Sync` and keeps no per-conversion state, so one
/// instance can be shared behind an `Arc` by any number of tasks. The API key
/// can be replaced at any time with [`set_credential`](Self::set_credential).
///
/// # Examples
///
/// ```no_run
/// use alkaline_cloudconvert::{
///     CancellationToken, CloudConvertClient, ConversionRequest, Credential,
/// };
///
/// # async fn run() -> alkaline_cloudconvert::Result<()> {
/// let client = CloudConvertClient::new(Some(Credential::new("api-key")?))?;
/// let request = ConversionRequest::new("/docs/report.docx", "pdf")?;
/// let cancel = CancellationToken::new();
/// let converted = client.convert(&request, &cancel).await?;
/// let file = client
///     .download(&converted.url, &converted.input, "pdf", &cancel)
///     .await?;
/// println!("saved {}", file.path.display());
/// # Ok(())
/// # }
/// ```
pub struct CloudConvertClient {
    pub(crate) http: reqwest::Client,
    base_url: String,
    credential: RwLock<Option<Credential>>,
    poll: PollOptions,
    pub(crate) output: OutputOptions,
}

/// A freshly created job together with its upload destination.
struct CreatedJob {
    handle: JobHandle,
    form: UploadForm,
}

impl CloudConvertClient {
    /// Create a client against the production API with default options.
    pub fn new(credential: Option<Credential>) -> Result<Self> {
        Self::with_options(credential, ClientOptions::default())
    }

    /// Create a client with explicit options.
    pub fn with_options(credential: Option<Credential>, options: ClientOptions) -> Result<Self> {
        if options.poll.max_attempts == 0 {
            return Err(Error::InvalidInput(
                "poll max_attempts must be at least 1".into(),
            ));
        }

        let http = reqwest::Client::builder()
            .timeout(options.request_timeout)
            .build()
            .map_err(|e| Error::service(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url: options.base_url.trim_end_matches('/').to_string(),
            credential: RwLock::new(credential),
            poll: options.poll,
            output: options.output,
        })
    }

    /// Replace the API key used by subsequent requests.
    pub fn set_credential(&self, credential: Credential) {
        *self.credential.write() = Some(credential);
    }

    /// Whether an API key is configured.
    pub fn has_credential(&self) -> bool {
        self.credential.read().is_some()
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorization(&self) -> Result<String> {
        self.credential
            .read()
            .as_ref()
            .map(Credential::bearer)
            .ok_or(Error::MissingCredential)
    }

    /// Output formats CloudConvert offers for the file's input format.
    ///
    /// Only the extension of `input` is inspected. The result is sorted and
    /// free of duplicates; an empty catalog answer is reported as
    /// [`Error::NoFormatsAvailable`].
    pub async fn list_supported_formats(&self, input: &Path) -> Result<BTreeSet<String>> {
        let input_format = input_format(input)?;
        let authorization = self.authorization()?;

        debug!(input_format = %input_format, "Fetching supported output formats");

        let response = self
            .http
            .get(self.url("/convert/formats"))
            .header(AUTHORIZATION, authorization)
            .query(&[("filter[input_format]", input_format.as_str())])
            .send()
            .await
            .map_err(|e| Error::service(format!("failed to fetch format catalog: {e}")))?;
        let response = check_status(response, Error::service).await?;

        let catalog: Envelope<Vec<FormatEntry>> = response
            .json()
            .await
            .map_err(|e| Error::service(format!("unexpected format catalog response: {e}")))?;

        let formats: BTreeSet<String> = catalog
            .data
            .into_iter()
            .filter(|entry| entry.input_format.eq_ignore_ascii_case(&input_format))
            .map(|entry| entry.output_format)
            .collect();

        if formats.is_empty() {
            return Err(Error::NoFormatsAvailable { input_format });
        }

        debug!(input_format = %input_format, count = formats.len(), "Supported formats loaded");
        Ok(formats)
    }

    /// Convert one file: create the job, upload the input, poll to completion.
    ///
    /// Returns the URL of the converted artifact. The poll loop honours
    /// [`PollOptions`] and stops with [`Error::Cancelled`] as soon as `cancel`
    /// fires.
    pub async fn convert(
        &self,
        request: &ConversionRequest,
        cancel: &CancellationToken,
    ) -> Result<ConvertedFile> {
        let input = request.input();
        let size = tokio::fs::metadata(input)
            .await
            .map_err(|e| {
                Error::InvalidInput(format!("cannot read {}: {e}", input.display()))
            })?
            .len();
        ensure_active(cancel)?;

        let CreatedJob { handle, form } = self.create_job(request.target_format()).await?;
        info!(
            job_id = %handle,
            file = %input.display(),
            format = request.target_format(),
            state = %JobState::Created,
            "Conversion job created"
        );

        let result = self.run_job(&handle, &form, input, size, cancel).await;
        match &result {
            Ok(_) => info!(job_id = %handle, state = %JobState::Finished, "Conversion finished"),
            Err(e) => warn!(job_id = %handle, state = %JobState::Failed, error = %e, "Conversion failed"),
        }

        Ok(ConvertedFile {
            input: input.to_path_buf(),
            url: result?,
            job: handle,
        })
    }

    async fn run_job(
        &self,
        handle: &JobHandle,
        form: &UploadForm,
        input: &Path,
        size: u64,
        cancel: &CancellationToken,
    ) -> Result<String> {
        ensure_active(cancel)?;
        debug!(job_id = %handle, state = %JobState::Uploading, bytes = size, "Uploading input");
        tokio::select! {
            uploaded = self.upload(form, input, size) => uploaded?,
            _ = cancel.cancelled() => return Err(Error::Cancelled),
        }

        debug!(job_id = %handle, state = %JobState::Polling, "Waiting for job to finish");
        self.wait_for_job(handle, cancel).await
    }

    async fn create_job(&self, target_format: &str) -> Result<CreatedJob> {
        let authorization = self.authorization()?;
        let body = CreateJob::upload_convert_export(target_format);

        let response = self
            .http
            .post(self.url("/jobs"))
            .header(AUTHORIZATION, authorization)
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::job_creation(e.to_string()))?;
        let response = check_status(response, Error::job_creation).await?;

        let job: Envelope<Job> = response
            .json()
            .await
            .map_err(|e| Error::job_creation(format!("unexpected response: {e}")))?;
        let job = job.data;

        let form = job
            .upload_form()
            .cloned()
            .ok_or_else(|| Error::job_creation(format!("job {} has no upload form", job.id)))?;

        Ok(CreatedJob {
            handle: JobHandle::new(job.id),
            form,
        })
    }

    /// Stream the input file into the import task's pre-signed form.
    async fn upload(&self, form: &UploadForm, input: &Path, size: u64) -> Result<()> {
        let file = tokio::fs::File::open(input)
            .await
            .map_err(|e| Error::upload(input, format!("cannot open file: {e}")))?;

        let file_name = input
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());

        let body = reqwest::Body::wrap_stream(ReaderStream::new(file));
        let part = Part::stream_with_length(body, size).file_name(file_name);

        let mut multipart = Form::new();
        for (name, value) in form.fields() {
            multipart = multipart.text(name, value);
        }
        let multipart = multipart.part("file", part);

        let response = self
            .http
            .post(&form.url)
            .multipart(multipart)
            .send()
            .await
            .map_err(|e| Error::upload(input, e.to_string()))?;
        check_status(response, |message| Error::upload(input, message)).await?;

        Ok(())
    }

    async fn job_status(&self, handle: &JobHandle) -> Result<Job> {
        let authorization = self.authorization()?;

        let response = self
            .http
            .get(self.url(&format!("/jobs/{handle}")))
            .header(AUTHORIZATION, authorization)
            .send()
            .await
            .map_err(|e| Error::service(format!("failed to get status of job {handle}: {e}")))?;
        let response = check_status(response, Error::service).await?;

        let job: Envelope<Job> = response
            .json()
            .await
            .map_err(|e| Error::service(format!("unexpected job status response: {e}")))?;
        Ok(job.data)
    }

    /// Poll the job until it finishes, fails, runs out of attempts or time, or
    /// is cancelled. The first check happens immediately.
    async fn wait_for_job(&self, handle: &JobHandle, cancel: &CancellationToken) -> Result<String> {
        let started = Instant::now();
        let mut attempts = 0u32;

        loop {
            attempts += 1;
            let job = tokio::select! {
                job = self.job_status(handle) => job?,
                _ = cancel.cancelled() => return Err(Error::Cancelled),
            };

            match job.status {
                Some(RemoteStatus::Finished) => {
                    return job.export_url().map(str::to_string).ok_or_else(|| {
                        Error::service(format!("job {handle} finished without an export URL"))
                    });
                }
                Some(RemoteStatus::Error) => {
                    return Err(Error::Conversion {
                        job_id: handle.to_string(),
                        message: job.failure_message(),
                    });
                }
                status => {
                    debug!(job_id = %handle, attempt = attempts, ?status, "Job still running");
                }
            }

            let elapsed = started.elapsed();
            if attempts >= self.poll.max_attempts || elapsed >= self.poll.timeout {
                return Err(Error::TimedOut {
                    job_id: handle.to_string(),
                    attempts,
                    elapsed,
                });
            }

            tokio::select! {
                _ = tokio::time::sleep(self.poll.interval) => {}
                _ = cancel.cancelled() => return Err(Error::Cancelled),
            }
        }
    }
}

fn ensure_active(cancel: &CancellationToken) -> Result<()> {
    if cancel.is_cancelled() {
        return Err(Error::Cancelled);
    }
    Ok(())
}

/// Pass successful responses through; turn everything else into an error.
///
/// HTTP 401 is always an authentication failure, whatever the stage.
pub(crate) async fn check_status(
    response: Response,
    on_failure: impl FnOnce(String) -> Error,
) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let detail = serde_json::from_str::<ApiErrorBody>(&body)
        .map(|b| b.message)
        .unwrap_or_else(|_| body.trim().to_string());
    let message = if detail.is_empty() {
        format!("HTTP {status}")
    } else {
        format!("HTTP {status}: {detail}")
    };

    if status == StatusCode::UNAUTHORIZED {
        return Err(Error::Authentication { message });
    }
    Err(on_failure(message))
}
