//! Network boundary for generation and upload calls
//!
//! Everything above this module talks to the service through these two
//! traits, so the Gemini REST client can be swapped for [`MockTransport`]
//! in tests.

pub mod gemini;
pub mod mock;

pub use gemini::GeminiTransport;
pub use mock::MockTransport;

use crate::error::TransportErrorKind;
use crate::models::{Request, Response, UploadedResource};
use crate::{Error, Result};
use async_trait::async_trait;
use std::time::Duration;

#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: &Request) -> Result<Response>;
}

#[async_trait]
pub trait UploadTransport: Send + Sync {
    async fn upload(
        &self,
        data: Vec<u8>,
        media_type: &str,
        display_name: Option<&str>,
    ) -> Result<UploadedResource>;
}

/// Races every call against a timer; expiry becomes a timeout transport error.
pub struct Deadline<T> {
    inner: T,
    limit: Duration,
}

impl<T> Deadline<T> {
    pub fn new(inner: T, limit: Duration) -> Self {
        Self { inner, limit }
    }

    fn expired(&self) -> Error {
        tracing::error!("Call exceeded deadline of {:?}", self.limit);
        Error::transport(
            TransportErrorKind::Timeout,
            format!("no response within {:?}", self.limit),
        )
    }
}

#[async_trait]
impl<T: Transport> Transport for Deadline<T> {
    async fn send(&self, request: &Request) -> Result<Response> {
        tokio::time::timeout(self.limit, self.inner.send(request))
            .await
            .map_err(|_| self.expired())?
    }
}

#[async_trait]
impl<T: UploadTransport> UploadTransport for Deadline<T> {
    async fn upload(
        &self,
        data: Vec<u8>,
        media_type: &str,
        display_name: Option<&str>,
    ) -> Result<UploadedResource> {
        tokio::time::timeout(
            self.limit,
            self.inner.upload(data, media_type, display_name),
        )
        .await
        .map_err(|_| self.expired())?
    }
}
