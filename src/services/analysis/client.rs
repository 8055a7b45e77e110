use crate::config::ClientConfig;
use crate::error::AppError;
use crate::models::upload_types::UploadCandidate;
use futures::future::BoxFuture;
use futures::FutureExt;

/// Status and body of a `/predict` response, before interpretation.
#[derive(Debug, Clone, PartialEq)]
pub struct RawResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl RawResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// The remote classification service, as seen by the controller.
///
/// Dropping a returned future must abandon the underlying request.
pub trait ClassifyTransport: Send + Sync + 'static {
    fn classify<'a>(
        &'a self,
        upload: &'a UploadCandidate,
        gradcam: bool,
    ) -> BoxFuture<'a, Result<RawResponse, AppError>>;

    fn health(&self) -> BoxFuture<'_, Result<serde_json::Value, AppError>>;
}

#[derive(Clone, Debug)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(config: &ClientConfig) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("mri-lense/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AppError {
                message: format!("Failed to build HTTP client: {}", e),
            })?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn post_predict(
        &self,
        upload: &UploadCandidate,
        gradcam: bool,
    ) -> Result<RawResponse, AppError> {
        let part = reqwest::multipart::Part::bytes(upload.bytes.clone())
            .file_name(upload.display_name.clone())
            .mime_str(&upload.mime_type)
            .map_err(|e| AppError {
                message: format!("Invalid MIME type {}: {}", upload.mime_type, e),
            })?;
        let form = reqwest::multipart::Form::new().part("file", part);

        let url = format!("{}/predict", self.base_url);
        tracing::debug!(%url, gradcam, bytes = upload.size_bytes, "posting image");

        let response = self
            .client
            .post(&url)
            .query(&[("gradcam", gradcam)])
            .multipart(form)
            .send()
            .await
            .map_err(|e| AppError {
                message: format!("Failed to reach classification service: {}", e),
            })?;

        let status = response.status().as_u16();
        let body = response.bytes().await.map_err(|e| AppError {
            message: format!("Failed to read response body: {}", e),
        })?;

        Ok(RawResponse {
            status,
            body: body.to_vec(),
        })
    }

    async fn get_health(&self) -> Result<serde_json::Value, AppError> {
        let url = format!("{}/health", self.base_url);
        let response = self.client.get(&url).send().await?;
        let status = response.status();
        let value: serde_json::Value = response.json().await.map_err(|e| AppError {
            message: format!("Health probe returned HTTP {} without JSON: {}", status, e),
        })?;
        Ok(value)
    }
}

impl ClassifyTransport for HttpTransport {
    fn classify<'a>(
        &'a self,
        upload: &'a UploadCandidate,
        gradcam: bool,
    ) -> BoxFuture<'a, Result<RawResponse, AppError>> {
        self.post_predict(upload, gradcam).boxed()
    }

    fn health(&self) -> BoxFuture<'_, Result<serde_json::Value, AppError>> {
        self.get_health().boxed()
    }
}
