//! Wire types for the `generateContent` endpoint.

use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub(super) struct GenerateContentRequestDto<'a> {
    contents: [ContentDto<'a>; 1],
}

#[derive(Debug, Serialize)]
struct ContentDto<'a> {
    parts: [RequestPartDto<'a>; 1],
}

#[derive(Debug, Serialize)]
struct RequestPartDto<'a> {
    text: &'a str,
}

impl<'a> GenerateContentRequestDto<'a> {
    pub(super) fn from_prompt(prompt: &'a str) -> Self {
        Self {
            contents: [ContentDto {
                parts: [RequestPartDto { text: prompt }],
            }],
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct GenerateContentResponseDto {
    #[serde(default)]
    candidates: Vec<CandidateDto>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedbackDto>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CandidateDto {
    #[serde(default)]
    content: Option<CandidateContentDto>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContentDto {
    #[serde(default)]
    parts: Vec<ResponsePartDto>,
}

#[derive(Debug, Deserialize)]
struct ResponsePartDto {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedbackDto {
    #[serde(default)]
    block_reason: Option<String>,
}

impl GenerateContentResponseDto {
    /// Concatenated text of the first candidate.
    pub(super) fn into_text(self) -> Result<String, String> {
        let block_reason = self
            .prompt_feedback
            .and_then(|feedback| feedback.block_reason);
        let Some(candidate) = self.candidates.into_iter().next() else {
            return Err(match block_reason {
                Some(reason) => format!("prompt blocked: {reason}"),
                None => "reply contained no candidates".to_owned(),
            });
        };

        let text: String = candidate
            .content
            .map(|content| content.parts)
            .unwrap_or_default()
            .into_iter()
            .filter_map(|part| part.text)
            .collect();
        if text.trim().is_empty() {
            let reason = candidate.finish_reason.unwrap_or_else(|| "UNKNOWN".to_owned());
            return Err(format!("candidate carried no text (finish reason {reason})"));
        }
        Ok(text)
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct ErrorEnvelopeDto {
    pub(super) error: ErrorBodyDto,
}

#[derive(Debug, Deserialize)]
pub(super) struct ErrorBodyDto {
    #[serde(default)]
    pub(super) message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn decode(value: serde_json::Value) -> GenerateContentResponseDto {
        serde_json::from_value(value).expect("response decodes")
    }

    #[test]
    fn serialises_single_text_part() {
        let body = serde_json::to_value(GenerateContentRequestDto::from_prompt("hello"))
            .expect("request serialises");
        assert_eq!(body, json!({ "contents": [{ "parts": [{ "text": "hello" }] }] }));
    }

    #[test]
    fn joins_text_parts_of_first_candidate() {
        let response = decode(json!({
            "candidates": [
                { "content": { "parts": [{ "text": "{\"a\":" }, { "text": " 1}" }] },
                  "finishReason": "STOP" },
                { "content": { "parts": [{ "text": "ignored" }] } }
            ]
        }));
        assert_eq!(response.into_text().as_deref(), Ok("{\"a\": 1}"));
    }

    #[test]
    fn reports_blocked_prompts() {
        let response = decode(json!({ "promptFeedback": { "blockReason": "SAFETY" } }));
        assert_eq!(response.into_text(), Err("prompt blocked: SAFETY".to_owned()));
    }

    #[test]
    fn reports_empty_candidates() {
        let response = decode(json!({
            "candidates": [{ "content": { "parts": [] }, "finishReason": "MAX_TOKENS" }]
        }));
        let error = response.into_text().expect_err("no text");
        assert!(error.contains("MAX_TOKENS"));
    }
}
