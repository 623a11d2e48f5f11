//! Entry point tying transport, uploads and chat together.

use crate::chat::ChatSession;
use crate::extract::extract_text;
use crate::models::{Config, ContentPart, Request, Response};
use crate::request;
use crate::transport::{Deadline, GeminiTransport, Transport, UploadTransport};
use crate::upload::UploadManager;
use crate::{Error, Result};
use std::sync::Arc;
use tracing::info;

/// Owned client handle. Nothing here is process-global; create one and pass
/// it to whatever needs it.
pub struct GenAiClient {
    generation: Arc<dyn Transport>,
    uploads: UploadManager,
}

impl GenAiClient {
    /// Build a client from concrete transports.
    ///
    /// This is primarily useful for tests and harnesses that need to inject
    /// mocks.
    pub fn with_transports(
        generation: Arc<dyn Transport>,
        uploads: Arc<dyn UploadTransport>,
    ) -> Self {
        Self {
            generation,
            uploads: UploadManager::new(uploads),
        }
    }

    /// Construct a Gemini-backed client. Every call, including both legs of
    /// an upload, must finish within `config.timeout`.
    pub fn from_config(config: &Config) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| Error::Configuration(format!("Failed to build HTTP client: {}", e)))?;

        let gemini = GeminiTransport::new_with_client(
            config.api_key.clone(),
            config.model.clone(),
            config.timeout,
            http_client,
        )
        .with_base_url(config.base_url.clone());

        info!(
            "Gemini client ready (model: {}, timeout: {:?})",
            gemini.model(),
            config.timeout
        );

        let transport = Arc::new(Deadline::new(gemini, config.timeout));
        Ok(Self::with_transports(transport.clone(), transport))
    }

    pub async fn generate(&self, request: &Request) -> Result<Response> {
        self.generation.send(request).await
    }

    /// Send `request` and return the primary text of the reply.
    pub async fn generate_text(&self, request: &Request) -> Result<String> {
        let response = self.generate(request).await?;
        extract_text(&response)
    }

    /// One-shot text prompt with no config.
    pub async fn prompt(&self, text: &str) -> Result<String> {
        let request = request::build(vec![ContentPart::text(text)], None, None, None)?;
        self.generate_text(&request).await
    }

    pub fn uploads(&self) -> &UploadManager {
        &self.uploads
    }

    pub fn start_chat(&self) -> ChatSession {
        ChatSession::new(self.generation.clone())
    }
}
