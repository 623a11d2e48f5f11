use super::types::{File, UploadFileResponse};
use crate::error::TransportErrorKind;
use crate::models::DEFAULT_BASE_URL;
use crate::{Error, Result};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

const UPLOAD_URL_HEADER: &str = "x-goog-upload-url";

/// Lightweight Gemini REST client for `generateContent` and file uploads.
pub struct GeminiHttpClient {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
    timeout: Duration,
}

impl GeminiHttpClient {
    /// Construct a Gemini client.
    ///
    /// `model` may be given with or without the `models/` prefix.
    pub fn new(api_key: String, model: String, timeout: Duration) -> Self {
        Self::new_with_client(api_key, model, timeout, Client::new())
    }

    pub fn new_with_client(
        api_key: String,
        model: String,
        timeout: Duration,
        client: Client,
    ) -> Self {
        let model = model.strip_prefix("models/").unwrap_or(&model).to_string();

        Self {
            client,
            api_key,
            model,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout,
        }
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    /// Returns the configured model ID without the `models/` prefix.
    pub fn model(&self) -> &str {
        &self.model
    }

    async fn check_status(response: Response) -> Result<Response> {
        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status();
        let error_text = response.text().await.unwrap_or_default();
        tracing::error!("Gemini API error (status {}): {}", status, error_text);
        Err(Error::transport(
            TransportErrorKind::Api,
            format!("Gemini API error (status {}): {}", status, error_text),
        ))
    }

    async fn parse_body<Resp: DeserializeOwned>(response: Response) -> Result<Resp> {
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| {
            tracing::error!("Failed to parse Gemini response: {}\nBody: {}", e, body);
            Error::transport(
                TransportErrorKind::Decode,
                format!("Failed to parse Gemini response: {}", e),
            )
        })
    }

    async fn post_to_url<Req: Serialize, Resp: DeserializeOwned>(
        &self,
        url: String,
        request: &Req,
    ) -> Result<Resp> {
        let response = self
            .client
            .post(&url)
            .timeout(self.timeout)
            .header("x-goog-api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(request)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Failed to send request to Gemini: {}", e);
                e
            })?;

        let response = Self::check_status(response).await?;
        Self::parse_body(response).await
    }

    /// Calls Gemini's `generateContent` endpoint.
    pub async fn generate_content<Req: Serialize, Resp: DeserializeOwned>(
        &self,
        request: &Req,
    ) -> Result<Resp> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );
        tracing::debug!("Sending generateContent request to {}", url);
        self.post_to_url(url, request).await
    }

    /// Uploads `data` through the resumable files protocol: one call to open
    /// the session, one call carrying the bytes that also finalizes it.
    pub async fn upload_file(
        &self,
        data: Vec<u8>,
        mime_type: &str,
        display_name: Option<&str>,
    ) -> Result<File> {
        let metadata = match display_name {
            Some(name) => serde_json::json!({ "file": { "displayName": name } }),
            None => serde_json::json!({ "file": {} }),
        };

        let start = self
            .client
            .post(format!("{}/upload/v1beta/files", self.base_url))
            .timeout(self.timeout)
            .header("x-goog-api-key", &self.api_key)
            .header("X-Goog-Upload-Protocol", "resumable")
            .header("X-Goog-Upload-Command", "start")
            .header("X-Goog-Upload-Header-Content-Length", data.len().to_string())
            .header("X-Goog-Upload-Header-Content-Type", mime_type)
            .json(&metadata)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Failed to start Gemini upload: {}", e);
                e
            })?;
        let start = Self::check_status(start).await?;

        let upload_url = start
            .headers()
            .get(UPLOAD_URL_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .ok_or_else(|| {
                Error::transport(
                    TransportErrorKind::Decode,
                    "Gemini upload start response carried no upload URL",
                )
            })?;

        tracing::debug!("Sending {} bytes to Gemini upload session", data.len());

        let finish = self
            .client
            .post(&upload_url)
            .timeout(self.timeout)
            .header("X-Goog-Upload-Command", "upload, finalize")
            .header("X-Goog-Upload-Offset", "0")
            .body(data)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Failed to send bytes to Gemini upload session: {}", e);
                e
            })?;
        let finish = Self::check_status(finish).await?;

        let uploaded: UploadFileResponse = Self::parse_body(finish).await?;
        Ok(uploaded.file)
    }
}
