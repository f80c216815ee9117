//! Document upload client for the `/upload` endpoint.
//!
//! A single multipart round trip: send the file, await a JSON verdict.
//! No streaming, no retry.

use std::path::Path;

use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use tokio::fs;
use tracing::{debug, warn};

use crate::client::ClientError;
use crate::http::{add_extra_headers, build_http_client, endpoint_url};
use crate::options::TransportOptions;

const UPLOAD_PATH: &str = "/upload";

/// Server verdict on an upload.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadResponse {
    #[serde(default)]
    pub success: bool,
    pub message: Option<String>,
    pub error: Option<String>,
}

/// Client for the upload endpoint.
///
/// # Example
/// ```no_run
/// use docchat::options::TransportOptions;
/// use docchat::upload::UploadClient;
///
/// # async fn run() -> Result<(), docchat::ClientError> {
/// let client = UploadClient::new(TransportOptions::new("http://localhost:5000"));
/// let response = client.upload_file("report.pdf").await?;
/// println!("{}", response.message.unwrap_or_default());
/// # Ok(())
/// # }
/// ```
pub struct UploadClient {
    transport_options: TransportOptions,
}

impl UploadClient {
    pub fn new(transport_options: TransportOptions) -> Self {
        Self { transport_options }
    }

    pub fn transport_options(&self) -> &TransportOptions {
        &self.transport_options
    }

    /// Upload a document with explicit options.
    ///
    /// An empty file name or empty contents is rejected with
    /// [`ClientError::Config`] before any network activity. A failure
    /// reported by the server, whether as a non-success status or as
    /// `success=false` in the body, surfaces as [`ClientError::Server`]
    /// carrying the server's error message when it sent one.
    pub async fn request(
        file_name: &str,
        contents: Vec<u8>,
        transport_options: &TransportOptions,
    ) -> Result<UploadResponse, ClientError> {
        if file_name.trim().is_empty() {
            return Err(ClientError::Config("no file selected".to_string()));
        }
        if contents.is_empty() {
            return Err(ClientError::Config(format!(
                "file '{}' is empty",
                file_name
            )));
        }

        let url = endpoint_url(&transport_options.http.base_url, UPLOAD_PATH);
        let http_client = build_http_client(transport_options)?;

        let part = Part::bytes(contents)
            .file_name(file_name.to_string())
            .mime_str("application/pdf")
            .map_err(|e| ClientError::Config(format!("invalid upload part: {}", e)))?;
        let form = Form::new().part("file", part);

        let mut req = http_client.post(&url).multipart(form);
        req = add_extra_headers(req, &transport_options.http.extra_headers);

        debug!(%url, file_name, "uploading document");
        let response = req.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            warn!(%status, "upload rejected");
            // Failure bodies carry {"error": "..."} when the server got far
            // enough to produce one.
            if let Ok(parsed) = serde_json::from_str::<UploadResponse>(&body) {
                if let Some(error) = parsed.error {
                    return Err(ClientError::Server(error));
                }
            }
            return Err(ClientError::Transport { status });
        }

        let parsed: UploadResponse = serde_json::from_str(&body)?;
        if !parsed.success {
            let message = parsed
                .error
                .or(parsed.message)
                .unwrap_or_else(|| "upload failed".to_string());
            return Err(ClientError::Server(message));
        }

        Ok(parsed)
    }

    /// Upload a document using the client's stored options.
    pub async fn upload(
        &self,
        file_name: &str,
        contents: Vec<u8>,
    ) -> Result<UploadResponse, ClientError> {
        Self::request(file_name, contents, &self.transport_options).await
    }

    /// Read a file from disk and upload it.
    pub async fn upload_file(&self, path: impl AsRef<Path>) -> Result<UploadResponse, ClientError> {
        let path = path.as_ref();
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| {
                ClientError::Config(format!("invalid file name in path '{}'", path.display()))
            })?;

        let contents = fs::read(path)
            .await
            .map_err(|e| ClientError::Config(format!("cannot read '{}': {}", path.display(), e)))?;

        self.upload(file_name, contents).await
    }
}
