use super::generate::GeminiTransport;
use crate::models::UploadedResource;
use crate::transport::UploadTransport;
use crate::Result;
use async_trait::async_trait;

#[async_trait]
impl UploadTransport for GeminiTransport {
    async fn upload(
        &self,
        data: Vec<u8>,
        media_type: &str,
        display_name: Option<&str>,
    ) -> Result<UploadedResource> {
        tracing::debug!(
            "Uploading {} bytes ({}) to Gemini files",
            data.len(),
            media_type
        );

        let file = self.http.upload_file(data, media_type, display_name).await?;

        if let Some(state) = file.state.as_deref() {
            if state != "ACTIVE" {
                tracing::warn!("Uploaded file {} is in state {}", file.name, state);
            }
        }

        Ok(UploadedResource {
            uri: file.uri,
            media_type: file.mime_type,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use std::time::Duration;
    use wiremock::matchers::{body_bytes, header, header_exists, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn make_transport(server: &MockServer) -> GeminiTransport {
        GeminiTransport::new(
            "test-key".to_string(),
            "gemini-2.0-flash".to_string(),
            Duration::from_secs(5),
        )
        .with_base_url(server.uri())
    }

    #[tokio::test]
    async fn test_upload_runs_resumable_protocol() {
        let server = MockServer::start().await;
        let session_url = format!("{}/upload-session/abc", server.uri());

        Mock::given(method("POST"))
            .and(path("/upload/v1beta/files"))
            .and(header("x-goog-api-key", "test-key"))
            .and(header("X-Goog-Upload-Protocol", "resumable"))
            .and(header("X-Goog-Upload-Command", "start"))
            .and(header("X-Goog-Upload-Header-Content-Length", "4"))
            .and(header("X-Goog-Upload-Header-Content-Type", "image/png"))
            .respond_with(
                ResponseTemplate::new(200).insert_header("x-goog-upload-url", session_url.as_str()),
            )
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/upload-session/abc"))
            .and(header_exists("X-Goog-Upload-Command"))
            .and(header("X-Goog-Upload-Offset", "0"))
            .and(body_bytes(vec![0x89, 0x50, 0x4E, 0x47]))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "file": {
                    "name": "files/abc",
                    "uri": "https://generativelanguage.googleapis.com/v1beta/files/abc",
                    "mimeType": "image/png",
                    "state": "ACTIVE"
                }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let transport = make_transport(&server);
        let resource = transport
            .upload(vec![0x89, 0x50, 0x4E, 0x47], "image/png", Some("cat.png"))
            .await
            .unwrap();

        assert_eq!(
            resource.uri,
            "https://generativelanguage.googleapis.com/v1beta/files/abc"
        );
        assert_eq!(resource.media_type, "image/png");
    }

    #[tokio::test]
    async fn test_upload_rejected_by_server() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/upload/v1beta/files"))
            .respond_with(ResponseTemplate::new(400).set_body_string("unsupported mime type"))
            .mount(&server)
            .await;

        let transport = make_transport(&server);
        let err = transport
            .upload(vec![1, 2, 3], "application/x-nope", None)
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Transport { .. }));
        assert!(err.to_string().contains("unsupported mime type"));
    }

    #[tokio::test]
    async fn test_upload_without_session_url_fails() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/upload/v1beta/files"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let transport = make_transport(&server);
        let err = transport
            .upload(vec![1, 2, 3], "image/png", None)
            .await
            .unwrap_err();

        assert!(err.to_string().contains("no upload URL"));
    }
}
