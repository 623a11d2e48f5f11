//! Data models and structures
//!
//! Defines the provider-neutral request/response shapes the client works
//! with, plus the environment configuration.

use crate::{mime, Error, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// One unit of input or output content.
#[derive(Debug, Clone, PartialEq)]
pub enum ContentPart {
    Text(String),
    InlineBinary { data: Vec<u8>, media_type: String },
    /// Reference to a resource previously uploaded through the files API.
    RemoteRef { uri: String, media_type: String },
}

impl ContentPart {
    pub fn text(text: impl Into<String>) -> Self {
        ContentPart::Text(text.into())
    }

    pub fn inline(data: Vec<u8>, media_type: impl Into<String>) -> Self {
        ContentPart::InlineBinary {
            data,
            media_type: media_type.into(),
        }
    }

    /// Inline bytes whose media type is sniffed from the magic bytes.
    pub fn inline_image(data: Vec<u8>) -> Self {
        let media_type = mime::detect_media_type(&data).to_string();
        ContentPart::InlineBinary { data, media_type }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            ContentPart::Text(text) => Some(text),
            _ => None,
        }
    }
}

impl From<&str> for ContentPart {
    fn from(text: &str) -> Self {
        ContentPart::Text(text.to_string())
    }
}

impl From<String> for ContentPart {
    fn from(text: String) -> Self {
        ContentPart::Text(text)
    }
}

impl From<&UploadedResource> for ContentPart {
    fn from(resource: &UploadedResource) -> Self {
        ContentPart::RemoteRef {
            uri: resource.uri.clone(),
            media_type: resource.media_type.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Model,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Model => "model",
        }
    }
}

/// A single exchanged message in a conversation.
#[derive(Debug, Clone, PartialEq)]
pub struct Turn {
    pub role: Role,
    pub parts: Vec<ContentPart>,
}

impl Turn {
    pub fn user(parts: Vec<ContentPart>) -> Self {
        Self {
            role: Role::User,
            parts,
        }
    }

    pub fn model(parts: Vec<ContentPart>) -> Self {
        Self {
            role: Role::Model,
            parts,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Modality {
    Text,
    Image,
}

/// Sampling and output-format parameters for a single request.
///
/// Every field is independently optional; unset fields are left to the
/// server default and omitted from the wire payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_k: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_mime_type: Option<String>,
    /// Only honored by the server together with a JSON mime type.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_schema: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_modalities: Option<Vec<Modality>>,
}

pub const JSON_MIME_TYPE: &str = "application/json";

impl GenerationConfig {
    /// Ask for raw JSON output with no schema constraint.
    pub fn json() -> Self {
        Self {
            response_mime_type: Some(JSON_MIME_TYPE.to_string()),
            ..Self::default()
        }
    }

    pub fn json_with_schema(schema: serde_json::Value) -> Self {
        Self {
            response_schema: Some(schema),
            ..Self::json()
        }
    }

    /// Parse `schema` as JSON and attach it. Malformed text is an
    /// [`Error::InvalidRequest`].
    pub fn json_with_schema_str(schema: &str) -> Result<Self> {
        let schema: serde_json::Value = serde_json::from_str(schema)
            .map_err(|e| Error::InvalidRequest(format!("Malformed response schema: {}", e)))?;
        Ok(Self::json_with_schema(schema))
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_top_k(mut self, top_k: u32) -> Self {
        self.top_k = Some(top_k);
        self
    }

    pub fn with_top_p(mut self, top_p: f32) -> Self {
        self.top_p = Some(top_p);
        self
    }

    pub fn with_max_output_tokens(mut self, max_output_tokens: u32) -> Self {
        self.max_output_tokens = Some(max_output_tokens);
        self
    }

    pub fn with_response_modalities(mut self, modalities: Vec<Modality>) -> Self {
        self.response_modalities = Some(modalities);
        self
    }

    pub fn is_json(&self) -> bool {
        self.response_mime_type.as_deref() == Some(JSON_MIME_TYPE)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum HarmCategory {
    #[serde(rename = "HARM_CATEGORY_HARASSMENT")]
    Harassment,
    #[serde(rename = "HARM_CATEGORY_HATE_SPEECH")]
    HateSpeech,
    #[serde(rename = "HARM_CATEGORY_SEXUALLY_EXPLICIT")]
    SexuallyExplicit,
    #[serde(rename = "HARM_CATEGORY_DANGEROUS_CONTENT")]
    DangerousContent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HarmBlockThreshold {
    BlockLowAndAbove,
    BlockMediumAndAbove,
    BlockOnlyHigh,
    BlockNone,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SafetySetting {
    pub category: HarmCategory,
    pub threshold: HarmBlockThreshold,
}

impl SafetySetting {
    /// The same threshold applied to every harm category.
    pub fn all(threshold: HarmBlockThreshold) -> Vec<SafetySetting> {
        [
            HarmCategory::Harassment,
            HarmCategory::HateSpeech,
            HarmCategory::SexuallyExplicit,
            HarmCategory::DangerousContent,
        ]
        .into_iter()
        .map(|category| SafetySetting {
            category,
            threshold,
        })
        .collect()
    }
}

/// A fully assembled generation request. Build one with
/// [`crate::request::build`] or [`crate::request::RequestBuilder`].
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    pub(crate) parts: Vec<ContentPart>,
    pub(crate) system_instruction: Option<String>,
    pub(crate) config: Option<GenerationConfig>,
    pub(crate) history: Vec<Turn>,
    pub(crate) safety_settings: Vec<SafetySetting>,
}

impl Request {
    /// Content of the current user turn, never empty.
    pub fn parts(&self) -> &[ContentPart] {
        &self.parts
    }

    pub fn system_instruction(&self) -> Option<&str> {
        self.system_instruction.as_deref()
    }

    pub fn config(&self) -> Option<&GenerationConfig> {
        self.config.as_ref()
    }

    pub fn history(&self) -> &[Turn] {
        &self.history
    }

    pub fn safety_settings(&self) -> &[SafetySetting] {
        &self.safety_settings
    }

    /// First text part of the current turn, if any.
    pub fn prompt_text(&self) -> Option<&str> {
        self.parts.iter().find_map(ContentPart::as_text)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub parts: Vec<ContentPart>,
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Response {
    pub candidates: Vec<Candidate>,
    /// Set when the prompt itself was rejected (e.g. `SAFETY`).
    pub block_reason: Option<String>,
}

impl Response {
    /// A single-candidate response carrying `text`.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            candidates: vec![Candidate {
                parts: vec![ContentPart::Text(text.into())],
                finish_reason: Some("STOP".to_string()),
            }],
            block_reason: None,
        }
    }

    pub fn blocked(reason: impl Into<String>) -> Self {
        Self {
            candidates: Vec::new(),
            block_reason: Some(reason.into()),
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }
}

/// Reference to a file held by the remote files service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedResource {
    pub uri: String,
    pub media_type: String,
}

// Configuration
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup("GEMINI_API_KEY")
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| Error::Configuration("GEMINI_API_KEY not set".to_string()))?;

        let timeout = match lookup("GEMINI_TIMEOUT_SECS") {
            Some(raw) => {
                let secs: u64 = raw.trim().parse().map_err(|_| {
                    Error::Configuration(format!("GEMINI_TIMEOUT_SECS is not a number: {}", raw))
                })?;
                if secs == 0 {
                    return Err(Error::Configuration(
                        "GEMINI_TIMEOUT_SECS must be greater than zero".to_string(),
                    ));
                }
                Duration::from_secs(secs)
            }
            None => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        };

        Ok(Self {
            api_key,
            model: lookup("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            base_url: lookup("GEMINI_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            timeout,
        })
    }
}
