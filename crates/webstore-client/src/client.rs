use crate::response::{PublishOutcome, parse_publish_response, parse_upload_response};
use crate::Result;
use http::header::{AUTHORIZATION, CONTENT_LENGTH};
use std::path::PathBuf;
use tokio_util::io::ReaderStream;
use webstore_core::{AccessToken, Endpoints, UploadJob, resolve_package};

/// Header carrying the items API version
pub const API_VERSION_HEADER: &str = "x-goog-api-version";
const API_VERSION: &str = "2";

/// HTTP client for the items upload and publish endpoints
#[derive(Debug, Clone)]
pub struct WebstoreClient {
    http: reqwest::Client,
    endpoints: Endpoints,
}

impl WebstoreClient {
    pub fn new(endpoints: Endpoints) -> Self {
        Self::with_client(reqwest::Client::new(), endpoints)
    }

    pub fn with_client(http: reqwest::Client, endpoints: Endpoints) -> Self {
        Self { http, endpoints }
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    /// Stream the job's package to the upload endpoint.
    ///
    /// Returns the package path that was actually sent.
    pub async fn upload(&self, job: &UploadJob, token: &AccessToken) -> Result<PathBuf> {
        tracing::info!("Updating app ({}): {}", job.name, job.app_id);

        let package = resolve_package(&job.package)?;
        let package = std::path::absolute(&package).unwrap_or(package);
        tracing::info!("Path to ZIP ({}): {}", job.name, package.display());

        let file = tokio::fs::File::open(&package).await?;
        let size = file.metadata().await?.len();
        let body = reqwest::Body::wrap_stream(ReaderStream::new(file));

        tracing::info!("Uploading {}..", job.name);
        let resp = self
            .http
            .put(self.endpoints.item_upload_url(&job.app_id))
            .header(AUTHORIZATION, token.bearer())
            .header(API_VERSION_HEADER, API_VERSION)
            .header(CONTENT_LENGTH, size)
            .body(body)
            .send()
            .await?;

        let status = resp.status();
        let text = resp.text().await?;
        tracing::debug!("Upload endpoint answered {} for {}", status, job.name);

        parse_upload_response(&text)?;
        tracing::info!("Uploading done ({})", job.name);

        Ok(package)
    }

    /// Publish an uploaded item. Failures are reported as warnings.
    pub async fn publish(&self, job: &UploadJob, token: &AccessToken) -> PublishOutcome {
        tracing::info!("Publishing ({}) {}..", job.name, job.app_id);

        let mut req = self
            .http
            .post(self.endpoints.item_publish_url(&job.app_id))
            .header(AUTHORIZATION, token.bearer())
            .header(API_VERSION_HEADER, API_VERSION)
            .header(CONTENT_LENGTH, 0);

        if let Some(target) = &job.publish_target {
            req = req.query(&[("publishTarget", target)]);
        }

        let outcome = match req.send().await {
            Ok(resp) => match resp.text().await {
                Ok(text) => parse_publish_response(&text),
                Err(e) => PublishOutcome::Warning(e.to_string()),
            },
            Err(e) => PublishOutcome::Warning(e.to_string()),
        };

        match &outcome {
            PublishOutcome::Warning(msg) => tracing::warn!(
                "Error while publishing ({}). Please check configuration at Developer Dashboard: {}",
                job.name,
                msg
            ),
            _ => tracing::info!("Publishing done ({})", job.name),
        }

        outcome
    }
}
