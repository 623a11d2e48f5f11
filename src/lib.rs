//! Prompt-request client for the Gemini generative-language API
//!
//! Builds requests from prompts, attachments and generation settings, sends
//! them through an injectable transport, and extracts text or structured
//! output. Multi-turn chat and file uploads sit on the same core.

pub mod chat;
pub mod client;
pub mod error;
pub mod extract;
pub mod mime;
pub mod models;
pub mod request;
pub mod transport;
pub mod upload;

pub use chat::{ChatSession, ChatState};
pub use client::GenAiClient;
pub use error::{Error, Result, TransportErrorKind};
pub use extract::{extract_binary, extract_text};
pub use models::{
    Config, ContentPart, GenerationConfig, Modality, Request, Response, Role, SafetySetting, Turn,
    UploadedResource,
};
pub use request::RequestBuilder;
pub use upload::UploadManager;
