//! Multi-turn conversations.

use crate::extract::extract_text;
use crate::models::{ContentPart, GenerationConfig, Request, Turn};
use crate::request;
use crate::transport::Transport;
use crate::Result;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatState {
    /// No exchange has completed yet.
    Empty,
    Active,
}

/// A conversation whose history grows by one user turn and one model turn
/// per successful [`send`](ChatSession::send).
///
/// A failed send leaves the history exactly as it was; the user turn that
/// triggered it is not kept. Sends take `&mut self`, so one session never
/// has two requests in flight. Wrap the session in a `tokio::sync::Mutex`
/// to share it between tasks.
pub struct ChatSession {
    transport: Arc<dyn Transport>,
    history: Vec<Turn>,
    config: Option<GenerationConfig>,
    system_instruction: Option<String>,
}

impl ChatSession {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            history: Vec::new(),
            config: None,
            system_instruction: None,
        }
    }

    /// Generation config applied to every send.
    pub fn with_config(mut self, config: GenerationConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn with_system_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.system_instruction = Some(instruction.into());
        self
    }

    pub fn state(&self) -> ChatState {
        if self.history.is_empty() {
            ChatState::Empty
        } else {
            ChatState::Active
        }
    }

    pub fn history(&self) -> &[Turn] {
        &self.history
    }

    pub async fn send(&mut self, text: &str) -> Result<String> {
        self.send_parts(vec![ContentPart::text(text)]).await
    }

    /// Send a multimodal user turn.
    pub async fn send_parts(&mut self, parts: Vec<ContentPart>) -> Result<String> {
        let request = request::build(
            parts,
            self.config.clone(),
            self.system_instruction.clone(),
            Some(self.history.clone()),
        )?;

        let response = self.transport.send(&request).await.map_err(|e| {
            tracing::warn!(
                "Chat send failed, history left at {} turns: {}",
                self.history.len(),
                e
            );
            e
        })?;
        let text = extract_text(&response)?;

        let model_parts = response
            .candidates
            .into_iter()
            .next()
            .map(|candidate| candidate.parts)
            .unwrap_or_default();

        if self.history.is_empty() {
            tracing::info!("Chat session active");
        }
        let Request { parts, .. } = request;
        self.history.push(Turn::user(parts));
        self.history.push(Turn::model(model_parts));

        Ok(text)
    }
}
