//! Gemini REST payload types and their mapping to the neutral models.

use crate::error::TransportErrorKind;
use crate::models::{self, ContentPart, GenerationConfig, SafetySetting, Turn};
use crate::{Error, Result};
use base64::Engine as _;
use serde::{Deserialize, Serialize};

/// Gemini content container used in both requests and responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

/// Untagged union of content parts.
///
/// Variant order matters for `#[serde(untagged)]` decoding; `Other` swallows
/// part kinds this client does not model (function calls, thoughts, ...).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Part {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
    FileData {
        #[serde(rename = "fileData")]
        file_data: FileData,
    },
    Other(serde_json::Value),
}

/// Base64 inline payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineData {
    pub mime_type: String,
    pub data: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileData {
    pub mime_type: String,
    pub file_uri: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest<'a> {
    pub contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<&'a GenerationConfig>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub safety_settings: Vec<SafetySetting>,
}

/// Top-level `generateContent` response envelope.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    pub prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub content: Option<Content>,
    pub finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback {
    pub block_reason: Option<String>,
}

/// Body of the finalize step of a resumable upload.
#[derive(Debug, Deserialize)]
pub struct UploadFileResponse {
    pub file: File,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct File {
    #[serde(default)]
    pub name: String,
    pub uri: String,
    pub mime_type: String,
    pub state: Option<String>,
}

impl From<&ContentPart> for Part {
    fn from(part: &ContentPart) -> Self {
        match part {
            ContentPart::Text(text) => Part::Text { text: text.clone() },
            ContentPart::InlineBinary { data, media_type } => Part::InlineData {
                inline_data: InlineData {
                    mime_type: media_type.clone(),
                    data: base64::engine::general_purpose::STANDARD.encode(data),
                },
            },
            ContentPart::RemoteRef { uri, media_type } => Part::FileData {
                file_data: FileData {
                    mime_type: media_type.clone(),
                    file_uri: uri.clone(),
                },
            },
        }
    }
}

fn content(role: Option<&str>, parts: &[ContentPart]) -> Content {
    Content {
        role: role.map(str::to_string),
        parts: parts.iter().map(Part::from).collect(),
    }
}

impl<'a> From<&'a models::Request> for GenerateContentRequest<'a> {
    fn from(request: &'a models::Request) -> Self {
        let mut contents: Vec<Content> = request
            .history()
            .iter()
            .map(|turn: &Turn| content(Some(turn.role.as_str()), &turn.parts))
            .collect();
        contents.push(content(Some("user"), request.parts()));

        Self {
            contents,
            system_instruction: request.system_instruction().map(|text| Content {
                role: None,
                parts: vec![Part::Text {
                    text: text.to_string(),
                }],
            }),
            generation_config: request.config(),
            safety_settings: request.safety_settings().to_vec(),
        }
    }
}

/// Map a wire part onto the neutral model; unsupported kinds yield `None`.
fn into_content_part(part: Part) -> Result<Option<ContentPart>> {
    Ok(match part {
        Part::Text { text } => Some(ContentPart::Text(text)),
        Part::InlineData { inline_data } => {
            let data = base64::engine::general_purpose::STANDARD
                .decode(&inline_data.data)
                .map_err(|e| {
                    Error::transport(
                        TransportErrorKind::Decode,
                        format!("Failed to decode Gemini inline data: {}", e),
                    )
                })?;
            Some(ContentPart::InlineBinary {
                data,
                media_type: inline_data.mime_type,
            })
        }
        Part::FileData { file_data } => Some(ContentPart::RemoteRef {
            uri: file_data.file_uri,
            media_type: file_data.mime_type,
        }),
        Part::Other(value) => {
            tracing::debug!("Skipping unsupported Gemini part: {}", value);
            None
        }
    })
}

impl TryFrom<GenerateContentResponse> for models::Response {
    type Error = Error;

    fn try_from(response: GenerateContentResponse) -> Result<Self> {
        let mut candidates = Vec::with_capacity(response.candidates.len());
        for candidate in response.candidates {
            let mut parts = Vec::new();
            for part in candidate.content.map(|c| c.parts).unwrap_or_default() {
                if let Some(part) = into_content_part(part)? {
                    parts.push(part);
                }
            }
            candidates.push(models::Candidate {
                parts,
                finish_reason: candidate.finish_reason,
            });
        }

        Ok(models::Response {
            candidates,
            block_reason: response.prompt_feedback.and_then(|f| f.block_reason),
        })
    }
}
