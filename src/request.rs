//! Request assembly.

use crate::models::{ContentPart, GenerationConfig, Request, SafetySetting, Turn};
use crate::{Error, Result};

/// Assemble a request from the current turn's parts and optional extras.
///
/// Fails with [`Error::InvalidRequest`] when `parts` is empty. The response
/// schema, if any, is passed through untouched; the server validates it.
pub fn build(
    parts: Vec<ContentPart>,
    config: Option<GenerationConfig>,
    system_instruction: Option<String>,
    history: Option<Vec<Turn>>,
) -> Result<Request> {
    if parts.is_empty() {
        return Err(Error::InvalidRequest(
            "a request needs at least one content part".to_string(),
        ));
    }

    if let Some(config) = &config {
        if config.response_schema.is_some() && !config.is_json() {
            tracing::warn!(
                "response_schema set with mime type {:?}; the server only honors it for application/json",
                config.response_mime_type
            );
        }
    }

    Ok(Request {
        parts,
        system_instruction,
        config,
        history: history.unwrap_or_default(),
        safety_settings: Vec::new(),
    })
}

/// Fluent front-end over [`build`].
#[derive(Debug, Default, Clone)]
pub struct RequestBuilder {
    parts: Vec<ContentPart>,
    config: Option<GenerationConfig>,
    system_instruction: Option<String>,
    history: Option<Vec<Turn>>,
    safety_settings: Vec<SafetySetting>,
}

impl RequestBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(self, text: impl Into<String>) -> Self {
        self.part(ContentPart::Text(text.into()))
    }

    pub fn part(mut self, part: impl Into<ContentPart>) -> Self {
        self.parts.push(part.into());
        self
    }

    pub fn parts(mut self, parts: impl IntoIterator<Item = ContentPart>) -> Self {
        self.parts.extend(parts);
        self
    }

    pub fn config(mut self, config: GenerationConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn system_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.system_instruction = Some(instruction.into());
        self
    }

    pub fn history(mut self, history: Vec<Turn>) -> Self {
        self.history = Some(history);
        self
    }

    pub fn safety_setting(mut self, setting: SafetySetting) -> Self {
        self.safety_settings.push(setting);
        self
    }

    pub fn safety_settings(mut self, settings: impl IntoIterator<Item = SafetySetting>) -> Self {
        self.safety_settings.extend(settings);
        self
    }

    pub fn build(self) -> Result<Request> {
        let mut request = build(
            self.parts,
            self.config,
            self.system_instruction,
            self.history,
        )?;
        request.safety_settings = self.safety_settings;
        Ok(request)
    }
}
