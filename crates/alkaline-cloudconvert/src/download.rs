//! Fetching converted artifacts to local storage.

use std::io::ErrorKind as IoErrorKind;
use std::path::Path;

use futures::StreamExt;
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::client::{check_status, CloudConvertClient};
use crate::error::{Error, Result};
use crate::options::{output_path, OverwritePolicy};
use crate::types::{normalize_format, DownloadedFile};

/// Size of the slices written to disk while streaming a download.
pub const DOWNLOAD_CHUNK_SIZE: usize = 8 * 1024;

impl CloudConvertClient {
    /// Download a converted artifact next to `destination_base`.
    ///
    /// The file is written to `<dir>/<stem of destination_base>.<target_format>`
    /// (see [`output_path`]). The body is streamed in [`DOWNLOAD_CHUNK_SIZE`]
    /// slices, so memory use does not grow with the artifact. A file left
    /// incomplete by a broken stream or by `cancel` firing is removed.
    pub async fn download(
        &self,
        result_url: &str,
        destination_base: &Path,
        target_format: &str,
        cancel: &CancellationToken,
    ) -> Result<DownloadedFile> {
        let target_format = normalize_format(target_format)?;
        let path = output_path(
            destination_base,
            &target_format,
            self.output.directory.as_deref(),
        )?;

        if self.output.overwrite == OverwritePolicy::Refuse {
            let exists = tokio::fs::try_exists(&path).await.map_err(|e| {
                Error::download(result_url, format!("cannot check {}: {e}", path.display()))
            })?;
            if exists {
                return Err(Error::OutputExists { path });
            }
        }

        debug!(url = result_url, path = %path.display(), "Downloading converted file");

        // Export URLs are pre-signed; no bearer header.
        let response = tokio::select! {
            response = self.http.get(result_url).send() => {
                response.map_err(|e| Error::download(result_url, e.to_string()))?
            }
            _ = cancel.cancelled() => return Err(Error::Cancelled),
        };
        let response = check_status(response, |message| Error::download(result_url, message))
            .await?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                Error::download(
                    result_url,
                    format!("cannot create directory {}: {e}", parent.display()),
                )
            })?;
        }
        let file = self.open_output(&path, result_url).await?;

        match write_body(response, file, result_url, cancel).await {
            Ok(bytes) => {
                info!(path = %path.display(), bytes, "Download complete");
                Ok(DownloadedFile { path, bytes })
            }
            Err(e) => {
                if let Err(remove_err) = tokio::fs::remove_file(&path).await {
                    debug!(path = %path.display(), error = %remove_err, "Could not remove partial download");
                }
                Err(e)
            }
        }
    }

    async fn open_output(&self, path: &Path, url: &str) -> Result<File> {
        let mut options = OpenOptions::new();
        options.write(true);
        match self.output.overwrite {
            OverwritePolicy::Refuse => options.create_new(true),
            OverwritePolicy::Replace => options.create(true).truncate(true),
        };

        options.open(path).await.map_err(|e| {
            if e.kind() == IoErrorKind::AlreadyExists {
                Error::OutputExists {
                    path: path.to_path_buf(),
                }
            } else {
                Error::download(url, format!("cannot create {}: {e}", path.display()))
            }
        })
    }
}

async fn write_body(
    response: reqwest::Response,
    mut file: File,
    url: &str,
    cancel: &CancellationToken,
) -> Result<u64> {
    let mut stream = response.bytes_stream();
    let mut written = 0u64;

    loop {
        let next = tokio::select! {
            next = stream.next() => next,
            _ = cancel.cancelled() => return Err(Error::Cancelled),
        };
        let Some(chunk) = next else { break };
        let chunk =
            chunk.map_err(|e| Error::download(url, format!("connection interrupted: {e}")))?;
        for piece in chunk.chunks(DOWNLOAD_CHUNK_SIZE) {
            file.write_all(piece).await?;
            written += piece.len() as u64;
        }
    }

    file.flush().await?;
    Ok(written)
}
