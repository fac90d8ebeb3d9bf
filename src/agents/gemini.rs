//! Blocking client and wire types for the Gemini `generateContent` endpoint

use color_eyre::Result;
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::time::Duration;

use crate::agents::{FunctionCall, ModelReply};
use crate::config::{GeminiConfig, env_var};

const CONNECT_TIMEOUT_SECS: u64 = 10;

// -- Request types --

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GenerationConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<Tool>>,
}

/// A turn: role plus ordered parts. Also used verbatim for session history.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

impl Content {
    pub fn user_text(text: impl Into<String>) -> Self {
        Self {
            role: Some("user".to_string()),
            parts: vec![Part::text(text)],
        }
    }

    /// System instructions carry parts only, no role
    pub fn instruction(text: impl Into<String>) -> Self {
        Self {
            role: None,
            parts: vec![Part::text(text)],
        }
    }

    /// Concatenated visible text of every part (thought parts excluded)
    #[must_use]
    pub fn text(&self) -> String {
        self.parts
            .iter()
            .filter(|part| !part.thought.unwrap_or(false))
            .filter_map(|part| part.text.as_deref())
            .collect()
    }
}

/// One part of a turn. Gemini distinguishes variants by which field is present.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inline_data: Option<InlineData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function_call: Option<FunctionCallPart>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thought: Option<bool>,
    /// Opaque signature that must be echoed back with the turn it arrived in
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thought_signature: Option<String>,
}

impl Part {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::default()
        }
    }

    pub fn inline_data(mime_type: impl Into<String>, base64_data: impl Into<String>) -> Self {
        Self {
            inline_data: Some(InlineData {
                mime_type: mime_type.into(),
                data: base64_data.into(),
            }),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InlineData {
    pub mime_type: String,
    /// Base64-encoded payload
    pub data: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FunctionCallPart {
    pub name: String,
    #[serde(default)]
    pub args: JsonValue,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_schema: Option<JsonValue>,
}

impl GenerationConfig {
    /// Structured output constrained to `schema`
    pub fn json(schema: JsonValue) -> Self {
        Self {
            response_mime_type: Some("application/json".to_string()),
            response_schema: Some(schema),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Tool {
    pub function_declarations: Vec<FunctionDeclaration>,
}

/// A callable tool schema offered to the model
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FunctionDeclaration {
    pub name: String,
    pub description: String,
    pub parameters: JsonValue,
}

// -- Response types --

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    #[serde(default)]
    pub prompt_feedback: Option<PromptFeedback>,
    #[serde(default)]
    pub error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<Content>,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback {
    #[serde(default)]
    pub block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ApiError {
    #[serde(default)]
    pub code: Option<i64>,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ApiError,
}

/// Pulls the first candidate's content out of a response, as a model turn
pub fn first_candidate_content(response: GenerateContentResponse) -> Result<Content> {
    if let Some(error) = response.error {
        return Err(color_eyre::eyre::eyre!(
            "Gemini error {}: {}",
            error.code.unwrap_or_default(),
            error.message
        ));
    }
    if let Some(reason) = response
        .prompt_feedback
        .and_then(|feedback| feedback.block_reason)
    {
        return Err(color_eyre::eyre::eyre!("Gemini blocked the prompt: {}", reason));
    }

    let candidate = response
        .candidates
        .into_iter()
        .next()
        .ok_or_else(|| color_eyre::eyre::eyre!("Gemini response missing candidates"))?;
    let mut content = candidate.content.ok_or_else(|| {
        color_eyre::eyre::eyre!(
            "Gemini candidate missing content (finish reason: {})",
            candidate.finish_reason.as_deref().unwrap_or("unknown")
        )
    })?;
    content.role = Some("model".to_string());
    Ok(content)
}

/// Converts a model turn into text plus function calls, in emission order
#[must_use]
pub fn reply_from_content(content: &Content) -> ModelReply {
    let function_calls = content
        .parts
        .iter()
        .filter_map(|part| part.function_call.as_ref())
        .map(|call| FunctionCall {
            name: call.name.clone(),
            args: call.args.clone(),
        })
        .collect();
    ModelReply {
        function_calls,
        ..ModelReply::text(content.text())
    }
}

/// Thin HTTP wrapper; the API key is resolved on every call
pub struct GeminiClient {
    http: Client,
    config: GeminiConfig,
    env_lookup: fn(&str) -> Option<String>,
}

impl GeminiClient {
    pub fn new(config: &GeminiConfig) -> Result<Self> {
        Ok(Self {
            http: build_client(config.timeout_secs)?,
            config: config.clone(),
            env_lookup: env_var,
        })
    }

    pub fn generate(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse> {
        let api_key = self
            .config
            .resolve_api_key_with(self.env_lookup)
            .ok_or_else(|| color_eyre::eyre::eyre!("Gemini API key not configured"))?;

        let url = format!(
            "{}/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            model
        );
        tracing::debug!(%model, turns = request.contents.len(), "gemini request");

        let response = self
            .http
            .post(&url)
            .header("x-goog-api-key", api_key)
            .json(request)
            .send()?;

        let status = response.status();
        let body = response.text()?;
        if !status.is_success() {
            let details = serde_json::from_str::<ErrorEnvelope>(&body)
                .map(|envelope| envelope.error.message)
                .unwrap_or(body);
            return Err(color_eyre::eyre::eyre!(
                "Gemini API error: {} {}",
                status,
                details
            ));
        }

        Ok(serde_json::from_str(&body)?)
    }
}

/// Builds a `reqwest::blocking::Client` with connect and total timeouts
pub fn build_client(timeout_secs: u64) -> Result<Client> {
    Ok(Client::builder()
        .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
        .timeout(Duration::from_secs(timeout_secs.max(1)))
        .build()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_serializes_gemini_field_names() {
        let request = GenerateContentRequest {
            contents: vec![Content::user_text("hi")],
            system_instruction: Some(Content::instruction("persona")),
            generation_config: Some(GenerationConfig::json(json!({"type": "OBJECT"}))),
            tools: Some(vec![Tool {
                function_declarations: vec![FunctionDeclaration {
                    name: "get_lunar_calendar".to_string(),
                    description: "lunar".to_string(),
                    parameters: json!({"type": "OBJECT"}),
                }],
            }]),
        };

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["contents"][0]["role"], "user");
        assert_eq!(value["contents"][0]["parts"][0]["text"], "hi");
        assert_eq!(value["systemInstruction"]["parts"][0]["text"], "persona");
        assert!(value["systemInstruction"].get("role").is_none());
        assert_eq!(
            value["generationConfig"]["responseMimeType"],
            "application/json"
        );
        assert_eq!(value["generationConfig"]["responseSchema"]["type"], "OBJECT");
        assert_eq!(
            value["tools"][0]["functionDeclarations"][0]["name"],
            "get_lunar_calendar"
        );
    }

    #[test]
    fn test_inline_data_part_shape() {
        let value = serde_json::to_value(Part::inline_data("image/png", "AAAA")).unwrap();
        assert_eq!(value, json!({"inlineData": {"mimeType": "image/png", "data": "AAAA"}}));
    }

    #[test]
    fn test_reply_keeps_function_call_order() {
        let body = json!({
            "candidates": [{
                "content": {
                    "role": "model",
                    "parts": [
                        {"text": "讓我查一下。"},
                        {"functionCall": {"name": "get_lunar_calendar", "args": {"date": "2024-06-01"}},
                         "thoughtSignature": "sig"},
                        {"functionCall": {"name": "calculate_natal_chart", "args": {"birth_time": "1990-05-01T08:30"}}}
                    ]
                },
                "finishReason": "STOP"
            }]
        });
        let response: GenerateContentResponse = serde_json::from_value(body).unwrap();
        let content = first_candidate_content(response).unwrap();
        let reply = reply_from_content(&content);

        assert_eq!(reply.text, "讓我查一下。");
        let names: Vec<&str> = reply
            .function_calls
            .iter()
            .map(|call| call.name.as_str())
            .collect();
        assert_eq!(names, ["get_lunar_calendar", "calculate_natal_chart"]);
        assert_eq!(reply.function_calls[0].args["date"], "2024-06-01");
        assert_eq!(content.parts[1].thought_signature.as_deref(), Some("sig"));
    }

    #[test]
    fn test_thought_parts_are_not_visible_text() {
        let content = Content {
            role: Some("model".to_string()),
            parts: vec![
                Part {
                    text: Some("internal".to_string()),
                    thought: Some(true),
                    ..Part::default()
                },
                Part::text("答案"),
            ],
        };
        assert_eq!(content.text(), "答案");
    }

    #[test]
    fn test_blocked_prompt_is_an_error() {
        let body = json!({"promptFeedback": {"blockReason": "SAFETY"}});
        let response: GenerateContentResponse = serde_json::from_value(body).unwrap();
        let error = first_candidate_content(response).unwrap_err();
        assert!(error.to_string().contains("SAFETY"));
    }

    #[test]
    fn test_empty_candidates_is_an_error() {
        let response = GenerateContentResponse::default();
        assert!(first_candidate_content(response).is_err());
    }

    #[test]
    fn test_missing_key_fails_before_network() {
        let config = GeminiConfig {
            api_key: String::new(),
            base_url: "http://127.0.0.1:9".to_string(),
            ..GeminiConfig::default()
        };
        let client = GeminiClient {
            env_lookup: |_| None,
            ..GeminiClient::new(&config).unwrap()
        };
        let request = GenerateContentRequest {
            contents: vec![Content::user_text("hi")],
            system_instruction: None,
            generation_config: None,
            tools: None,
        };
        let error = client.generate("gemini-test", &request).unwrap_err();
        assert!(error.to_string().contains("API key not configured"));
    }
}
