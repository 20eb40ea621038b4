//! Presigned object storage writes.
//!
//! The upload goes straight to the storage provider, not through the
//! catalog API, so it uses its own [`reqwest::Client`] with no cookie jar
//! and no anti-forgery header.

use std::time::Duration;

use assethub_core::upload::PresignResult;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};

use crate::error::UploadError;

/// Writes one payload to a presigned storage target.
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// `PUT` `payload` to `target.upload_url`. Any non-2xx status is an
    /// error; nothing is retried.
    async fn put_object(
        &self,
        target: &PresignResult,
        content_type: &str,
        payload: Vec<u8>,
    ) -> Result<(), UploadError>;
}

/// HTTP implementation of [`ObjectStorage`].
pub struct StorageClient {
    client: reqwest::Client,
}

impl StorageClient {
    /// Create a cookie-less client whose requests time out after
    /// `request_timeout`.
    pub fn new(request_timeout: Duration) -> Result<Self, UploadError> {
        let client = reqwest::Client::builder().timeout(request_timeout).build()?;
        Ok(Self { client })
    }

    /// Reuse an existing [`reqwest::Client`]. It must not carry API
    /// cookies or default auth headers.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

/// Headers for the storage PUT: the derived content type first, then the
/// presign headers, which override it when they name the same header.
pub fn upload_headers(target: &PresignResult, content_type: &str) -> Result<HeaderMap, UploadError> {
    let mut headers = HeaderMap::new();
    let ct = HeaderValue::from_str(content_type)
        .map_err(|_| UploadError::InvalidHeader(CONTENT_TYPE.to_string()))?;
    headers.insert(CONTENT_TYPE, ct);

    for (name, value) in &target.headers {
        let header_name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|_| UploadError::InvalidHeader(name.clone()))?;
        let header_value =
            HeaderValue::from_str(value).map_err(|_| UploadError::InvalidHeader(name.clone()))?;
        headers.insert(header_name, header_value);
    }
    Ok(headers)
}

#[async_trait]
impl ObjectStorage for StorageClient {
    #[tracing::instrument(skip(self, target, payload), fields(bytes = payload.len()))]
    async fn put_object(
        &self,
        target: &PresignResult,
        content_type: &str,
        payload: Vec<u8>,
    ) -> Result<(), UploadError> {
        let headers = upload_headers(target, content_type)?;

        let response = self
            .client
            .put(&target.upload_url)
            .headers(headers)
            .body(payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            tracing::warn!(status = status.as_u16(), "Storage upload rejected");
            return Err(UploadError::Status {
                status: status.as_u16(),
                body,
            });
        }

        tracing::debug!(status = status.as_u16(), "Storage upload complete");
        Ok(())
    }
}
