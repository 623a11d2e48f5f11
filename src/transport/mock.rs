use super::{Transport, UploadTransport};
use crate::error::TransportErrorKind;
use crate::models::{Request, Response, UploadedResource};
use crate::{Error, Result};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use uuid::Uuid;

enum Scripted {
    Response(Response),
    TransportError(TransportErrorKind, String),
}

/// In-memory transport that replays scripted replies and records every call.
///
/// Clones share state, so a test can keep one handle for assertions while
/// the other is moved into the code under test.
#[derive(Clone)]
pub struct MockTransport {
    replies: Arc<Mutex<VecDeque<Scripted>>>,
    requests: Arc<Mutex<Vec<Request>>>,
    uploads: Arc<Mutex<Vec<(usize, String)>>>,
    upload_rejection: Arc<Mutex<Option<String>>>,
    delay: Option<Duration>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MockTransport {
    pub fn new() -> Self {
        Self {
            replies: Arc::new(Mutex::new(VecDeque::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
            uploads: Arc::new(Mutex::new(Vec::new())),
            upload_rejection: Arc::new(Mutex::new(None)),
            delay: None,
        }
    }

    pub fn with_response(self, response: Response) -> Self {
        lock(&self.replies).push_back(Scripted::Response(response));
        self
    }

    pub fn with_text_response(self, text: impl Into<String>) -> Self {
        self.with_response(Response::text(text))
    }

    pub fn with_transport_error(
        self,
        kind: TransportErrorKind,
        message: impl Into<String>,
    ) -> Self {
        lock(&self.replies).push_back(Scripted::TransportError(kind, message.into()));
        self
    }

    /// Reject every subsequent upload with `message`.
    pub fn with_upload_rejection(self, message: impl Into<String>) -> Self {
        *lock(&self.upload_rejection) = Some(message.into());
        self
    }

    /// Sleep before answering, to exercise deadlines.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn get_call_count(&self) -> usize {
        lock(&self.requests).len()
    }

    pub fn get_requests(&self) -> Vec<Request> {
        lock(&self.requests).clone()
    }

    /// `(byte length, media type)` of every upload received.
    pub fn get_uploads(&self) -> Vec<(usize, String)> {
        lock(&self.uploads).clone()
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: &Request) -> Result<Response> {
        lock(&self.requests).push(request.clone());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let next = lock(&self.replies).pop_front();
        match next {
            Some(Scripted::Response(response)) => Ok(response),
            Some(Scripted::TransportError(kind, message)) => Err(Error::transport(kind, message)),
            // Default mock response
            None => Ok(Response::text(format!(
                "mock response to: {}",
                request.prompt_text().unwrap_or_default()
            ))),
        }
    }
}

#[async_trait]
impl UploadTransport for MockTransport {
    async fn upload(
        &self,
        data: Vec<u8>,
        media_type: &str,
        _display_name: Option<&str>,
    ) -> Result<UploadedResource> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if let Some(message) = lock(&self.upload_rejection).clone() {
            return Err(Error::transport(TransportErrorKind::Api, message));
        }

        lock(&self.uploads).push((data.len(), media_type.to_string()));

        Ok(UploadedResource {
            uri: format!("https://mock-files.example.com/v1beta/files/{}", Uuid::new_v4()),
            media_type: media_type.to_string(),
        })
    }
}
