use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Client;
use reqwest::multipart::{Form, Part};
use serde::Serialize;
use url::Url;

use crate::config::ClientConfig;
use super::errors::{ApiError, Result};

/// Transfer collaborator consumed by the upload pipeline: one call moves
/// one payload. Calls are independently retryable at the caller's
/// discretion; nothing here retries on its own.
#[async_trait]
pub trait UploadClient: Send + Sync {
    /// Post one file as a multipart form and return the server's response
    /// body.
    async fn post_multipart(
        &self,
        bytes: Bytes,
        filename: &str,
        mime_type: &str,
        destination: &str,
    ) -> Result<String>;

    /// Post a JSON document and return the server's response body.
    async fn post_json(&self, payload: serde_json::Value, destination: &str) -> Result<String>;
}

/// `UploadClient` over plain HTTP. Destinations are paths joined onto the
/// configured base URL.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    base_url: String,
}

impl HttpClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
        }
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
        })
    }

    /// Serialize `record` and post it, mapping serialization failures to
    /// [`ApiError::Encoding`].
    pub async fn post_record<T: Serialize + Sync>(
        &self,
        record: &T,
        destination: &str,
    ) -> Result<String> {
        let payload =
            serde_json::to_value(record).map_err(|err| ApiError::Encoding(err.to_string()))?;
        self.post_json(payload, destination).await
    }

    fn endpoint(&self, destination: &str) -> Result<Url> {
        let joined = format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            destination.trim_start_matches('/')
        );
        Url::parse(&joined).map_err(|_| ApiError::InvalidUrl)
    }

    async fn read_body(response: reqwest::Response) -> Result<String> {
        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::InvalidResponseStatus(status.as_u16()));
        }
        let body = response.bytes().await?;
        String::from_utf8(body.to_vec()).map_err(|_| ApiError::CorruptResponse)
    }
}

#[async_trait]
impl UploadClient for HttpClient {
    async fn post_multipart(
        &self,
        bytes: Bytes,
        filename: &str,
        mime_type: &str,
        destination: &str,
    ) -> Result<String> {
        let url = self.endpoint(destination)?;
        let part = Part::stream(bytes)
            .file_name(filename.to_owned())
            .mime_str(mime_type)
            .map_err(|err| ApiError::Encoding(err.to_string()))?;
        let form = Form::new().part("media", part);

        let response = self.client.post(url).multipart(form).send().await?;
        Self::read_body(response).await
    }

    async fn post_json(&self, payload: serde_json::Value, destination: &str) -> Result<String> {
        let url = self.endpoint(destination)?;
        let response = self.client.post(url).json(&payload).send().await?;
        Self::read_body(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_join() {
        let client = HttpClient::new("http://media.local:8080/api/");
        let url = client.endpoint("/workshop/upload").unwrap();
        assert_eq!(url.as_str(), "http://media.local:8080/api/workshop/upload");
    }

    #[test]
    fn test_endpoint_invalid_base() {
        let client = HttpClient::new("not a base url");
        assert!(matches!(client.endpoint("upload"), Err(ApiError::InvalidUrl)));
    }
}
