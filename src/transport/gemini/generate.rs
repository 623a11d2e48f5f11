use super::client::GeminiHttpClient;
use super::types::{GenerateContentRequest, GenerateContentResponse};
use crate::models::{Request, Response};
use crate::transport::Transport;
use crate::Result;
use async_trait::async_trait;
use std::time::Duration;

/// [`Transport`] backed by the Gemini REST API.
pub struct GeminiTransport {
    pub(super) http: GeminiHttpClient,
}

impl GeminiTransport {
    pub fn new(api_key: String, model: String, timeout: Duration) -> Self {
        Self::new_with_client(api_key, model, timeout, reqwest::Client::new())
    }

    pub fn new_with_client(
        api_key: String,
        model: String,
        timeout: Duration,
        client: reqwest::Client,
    ) -> Self {
        Self {
            http: GeminiHttpClient::new_with_client(api_key, model, timeout, client),
        }
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.http = self.http.with_base_url(base_url);
        self
    }

    pub fn model(&self) -> &str {
        self.http.model()
    }
}

#[async_trait]
impl Transport for GeminiTransport {
    async fn send(&self, request: &Request) -> Result<Response> {
        tracing::debug!(
            "Generating with {} ({} parts, {} history turns)",
            self.model(),
            request.parts().len(),
            request.history().len()
        );

        let payload = GenerateContentRequest::from(request);
        let response: GenerateContentResponse = self.http.generate_content(&payload).await?;
        Response::try_from(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TransportErrorKind;
    use crate::extract::extract_text;
    use crate::models::{GenerationConfig, Turn};
    use crate::request::RequestBuilder;
    use crate::Error;
    use wiremock::matchers::{body_partial_json, header, method, path, path_regex};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const DEFAULT_MODEL: &str = "gemini-2.0-flash";
    const GENERATE_CONTENT_PATH_REGEX: &str = r"/v1beta/models/.+:generateContent";

    fn make_transport(server: &MockServer, api_key: &str, model: &str) -> GeminiTransport {
        GeminiTransport::new(
            api_key.to_string(),
            model.to_string(),
            Duration::from_secs(5),
        )
        .with_base_url(server.uri())
    }

    #[tokio::test]
    async fn test_send_parses_response() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path_regex(GENERATE_CONTENT_PATH_REGEX))
            .and(header("x-goog-api-key", "test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "candidates": [{
                    "content": {
                        "role": "model",
                        "parts": [{ "text": "Paris" }]
                    },
                    "finishReason": "STOP"
                }]
            })))
            .mount(&server)
            .await;

        let transport = make_transport(&server, "test-key", DEFAULT_MODEL);
        let request = RequestBuilder::new()
            .text("What is the capital of France?")
            .build()
            .unwrap();

        let response = transport.send(&request).await.unwrap();
        assert_eq!(extract_text(&response).unwrap(), "Paris");
    }

    #[tokio::test]
    async fn test_send_posts_history_config_and_system_instruction() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path_regex(GENERATE_CONTENT_PATH_REGEX))
            .and(body_partial_json(serde_json::json!({
                "contents": [
                    { "role": "user", "parts": [{ "text": "Hi" }] },
                    { "role": "model", "parts": [{ "text": "Hello" }] },
                    { "role": "user", "parts": [{ "text": "List planets" }] }
                ],
                "systemInstruction": { "parts": [{ "text": "Astronomy only." }] },
                "generationConfig": { "responseMimeType": "application/json" }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "candidates": [{
                    "content": { "parts": [{ "text": "[\"Mercury\"]" }] }
                }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let transport = make_transport(&server, "test-key", DEFAULT_MODEL);
        let request = RequestBuilder::new()
            .history(vec![
                Turn::user(vec!["Hi".into()]),
                Turn::model(vec!["Hello".into()]),
            ])
            .text("List planets")
            .system_instruction("Astronomy only.")
            .config(GenerationConfig::json())
            .build()
            .unwrap();

        let response = transport.send(&request).await.unwrap();
        assert_eq!(extract_text(&response).unwrap(), "[\"Mercury\"]");
    }

    #[tokio::test]
    async fn test_api_error_returns_transport_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path_regex(GENERATE_CONTENT_PATH_REGEX))
            .respond_with(ResponseTemplate::new(403).set_body_string("forbidden"))
            .mount(&server)
            .await;

        let transport = make_transport(&server, "bad-key", DEFAULT_MODEL);
        let request = RequestBuilder::new().text("hi").build().unwrap();

        let err = transport.send(&request).await.unwrap_err();
        assert!(matches!(
            err,
            Error::Transport {
                kind: TransportErrorKind::Api,
                ..
            }
        ));
        assert!(err.to_string().contains("403"));
    }

    #[tokio::test]
    async fn test_api_error_without_body_keeps_status() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path_regex(GENERATE_CONTENT_PATH_REGEX))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let transport = make_transport(&server, "test-key", DEFAULT_MODEL);
        let request = RequestBuilder::new().text("hi").build().unwrap();

        let err = transport.send(&request).await.unwrap_err();
        assert!(matches!(
            err,
            Error::Transport {
                kind: TransportErrorKind::Api,
                ..
            }
        ));
        assert!(err.to_string().contains("503"));
    }

    #[tokio::test]
    async fn test_unparseable_body_returns_decode_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path_regex(GENERATE_CONTENT_PATH_REGEX))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let transport = make_transport(&server, "test-key", DEFAULT_MODEL);
        let request = RequestBuilder::new().text("hi").build().unwrap();

        let err = transport.send(&request).await.unwrap_err();
        assert!(matches!(
            err,
            Error::Transport {
                kind: TransportErrorKind::Decode,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_slow_server_returns_timeout() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path_regex(GENERATE_CONTENT_PATH_REGEX))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "candidates": [] }))
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&server)
            .await;

        let transport = GeminiTransport::new(
            "test-key".to_string(),
            DEFAULT_MODEL.to_string(),
            Duration::from_millis(50),
        )
        .with_base_url(server.uri());
        let request = RequestBuilder::new().text("hi").build().unwrap();

        let err = transport.send(&request).await.unwrap_err();
        assert!(matches!(
            err,
            Error::Transport {
                kind: TransportErrorKind::Timeout,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_blocked_prompt_surfaces_as_empty_response() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path_regex(GENERATE_CONTENT_PATH_REGEX))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "promptFeedback": { "blockReason": "SAFETY" }
            })))
            .mount(&server)
            .await;

        let transport = make_transport(&server, "test-key", DEFAULT_MODEL);
        let request = RequestBuilder::new().text("hi").build().unwrap();

        let response = transport.send(&request).await.unwrap();
        let err = extract_text(&response).unwrap_err();
        assert!(matches!(err, Error::EmptyResponse(_)));
    }

    #[tokio::test]
    async fn test_strips_models_prefix_from_model_id() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1beta/models/gemini-2.0-flash-exp:generateContent"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "candidates": [{
                    "content": { "parts": [{ "text": "ok" }] }
                }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let transport = make_transport(&server, "test-key", "models/gemini-2.0-flash-exp");
        assert_eq!(transport.model(), "gemini-2.0-flash-exp");

        let request = RequestBuilder::new().text("hi").build().unwrap();
        transport.send(&request).await.unwrap();
    }
}
