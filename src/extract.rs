//! Pulling usable output out of a [`Response`].
//!
//! These helpers never parse the text they return. JSON mode output comes
//! back as the raw JSON string.

use crate::models::{Candidate, ContentPart, Response};
use crate::{Error, Result};

fn first_candidate(response: &Response) -> Result<&Candidate> {
    let candidate = response.candidates.first().ok_or_else(|| {
        Error::EmptyResponse(match &response.block_reason {
            Some(reason) => format!("prompt blocked ({})", reason),
            None => "no candidates returned".to_string(),
        })
    })?;

    if candidate.parts.is_empty() {
        return Err(Error::EmptyResponse(match &candidate.finish_reason {
            Some(reason) => format!("candidate has no content (finish reason {})", reason),
            None => "candidate has no content".to_string(),
        }));
    }

    Ok(candidate)
}

/// Text of the first candidate, with all of its text parts concatenated.
pub fn extract_text(response: &Response) -> Result<String> {
    let candidate = first_candidate(response)?;
    Ok(candidate
        .parts
        .iter()
        .filter_map(ContentPart::as_text)
        .collect())
}

/// First inline binary payload of the first candidate, with its media type.
pub fn extract_binary(response: &Response) -> Result<(&[u8], &str)> {
    let candidate = first_candidate(response)?;
    candidate
        .parts
        .iter()
        .find_map(|part| match part {
            ContentPart::InlineBinary { data, media_type } => {
                Some((data.as_slice(), media_type.as_str()))
            }
            _ => None,
        })
        .ok_or_else(|| Error::EmptyResponse("no inline data in response".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_text_returns_exact_text() {
        assert_eq!(extract_text(&Response::text("hello")).unwrap(), "hello");
    }

    #[test]
    fn test_extract_text_fails_on_empty_candidates() {
        let err = extract_text(&Response::empty()).unwrap_err();
        assert!(matches!(err, Error::EmptyResponse(_)));
    }

    #[test]
    fn test_extract_text_reports_block_reason() {
        let err = extract_text(&Response::blocked("SAFETY")).unwrap_err();
        assert!(matches!(err, Error::EmptyResponse(_)));
        assert!(err.to_string().contains("SAFETY"));
    }

    #[test]
    fn test_extract_text_fails_on_candidate_without_parts() {
        let response = Response {
            candidates: vec![Candidate {
                parts: vec![],
                finish_reason: Some("SAFETY".to_string()),
            }],
            block_reason: None,
        };
        let err = extract_text(&response).unwrap_err();
        assert!(matches!(err, Error::EmptyResponse(_)));
    }

    #[test]
    fn test_extract_text_concatenates_text_parts() {
        let response = Response {
            candidates: vec![Candidate {
                parts: vec![
                    ContentPart::text("Hello, "),
                    ContentPart::inline(vec![1, 2, 3], "image/png"),
                    ContentPart::text("world"),
                ],
                finish_reason: None,
            }],
            block_reason: None,
        };
        assert_eq!(extract_text(&response).unwrap(), "Hello, world");
    }

    #[test]
    fn test_extract_text_returns_json_unparsed() {
        let raw = "[{\"reason\": \"r\", \"link\": \"l\"}]";
        assert_eq!(extract_text(&Response::text(raw)).unwrap(), raw);
    }

    #[test]
    fn test_extract_binary_finds_image() {
        let response = Response {
            candidates: vec![Candidate {
                parts: vec![
                    ContentPart::text("Here is your picture"),
                    ContentPart::inline(vec![0x89, 0x50, 0x4E, 0x47], "image/png"),
                ],
                finish_reason: None,
            }],
            block_reason: None,
        };
        let (data, media_type) = extract_binary(&response).unwrap();
        assert_eq!(data, &[0x89, 0x50, 0x4E, 0x47]);
        assert_eq!(media_type, "image/png");
    }

    #[test]
    fn test_extract_binary_fails_on_text_only() {
        let err = extract_binary(&Response::text("no picture")).unwrap_err();
        assert!(matches!(err, Error::EmptyResponse(_)));
    }
}
