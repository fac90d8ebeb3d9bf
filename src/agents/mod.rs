pub mod gemini;

use crate::app::chat::tools;
use crate::app::{DailyHoroscope, UserProfile};
use crate::config::GeminiConfig;
use crate::prompt;
use crate::services::{horoscope, vision};
use base64::{Engine as _, engine::general_purpose::STANDARD};
use chrono::NaiveDate;
use color_eyre::Result;
use gemini::{Content, GeminiClient, GenerateContentRequest, GenerationConfig, Part, Tool};
use serde_json::Value as JsonValue;
use std::sync::Arc;

/// A tool invocation requested by the model
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionCall {
    pub name: String,
    pub args: JsonValue,
}

/// Everything a single chat turn returned
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ModelReply {
    pub text: String,
    pub function_calls: Vec<FunctionCall>,
}

impl ModelReply {
    /// Creates a simple text-only reply (no tool calls)
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            text: content.into(),
            function_calls: Vec::new(),
        }
    }

    /// Returns true if the model requested tool calls
    #[must_use]
    pub fn has_function_calls(&self) -> bool {
        !self.function_calls.is_empty()
    }
}

/// Conversation state held for one chat screen visit.
///
/// The handle is opaque to callers: they send text and get a reply back.
/// A failed send leaves the conversation as it was before the call.
pub trait ChatSession: Send {
    fn send(&mut self, message: &str) -> Result<ModelReply>;
}

/// Entry point for every remote model operation
#[derive(Clone)]
pub struct ModelGateway {
    client: Arc<GeminiClient>,
    chat_model: String,
    flash_model: String,
}

impl ModelGateway {
    pub fn new(config: &GeminiConfig) -> Result<Self> {
        Ok(Self {
            client: Arc::new(GeminiClient::new(config)?),
            chat_model: config.chat_model.clone(),
            flash_model: config.flash_model.clone(),
        })
    }

    /// One structured-output request; malformed output is an error, never repaired
    pub fn generate_daily_horoscope(&self, profile: &UserProfile) -> Result<DailyHoroscope> {
        let request = daily_horoscope_request(profile, chrono::Local::now().date_naive());
        let response = self.client.generate(&self.flash_model, &request)?;
        let content = gemini::first_candidate_content(response)?;
        let parsed = horoscope::parse_horoscope(&content.text())?;
        tracing::info!(date = %parsed.date, score = parsed.overall_score, "horoscope generated");
        Ok(parsed)
    }

    /// One multimodal request; the instruction carries no profile context
    pub fn analyze_face(&self, image_bytes: &[u8]) -> Result<String> {
        let mime_type = vision::detect_mime_type(image_bytes)?;
        let request = face_analysis_request(mime_type, image_bytes);
        let response = self.client.generate(&self.flash_model, &request)?;
        let content = gemini::first_candidate_content(response)?;
        tracing::info!(mime_type, bytes = image_bytes.len(), "face analysis completed");
        Ok(content.text())
    }

    /// Opens a consultation whose persona is fixed to `profile` as it is right now
    #[must_use]
    pub fn start_chat_session(&self, profile: &UserProfile) -> GeminiChatSession {
        tracing::info!(model = %self.chat_model, "chat session opened");
        GeminiChatSession {
            client: Arc::clone(&self.client),
            model: self.chat_model.clone(),
            system_instruction: prompt::build_system_instruction(Some(profile)),
            tools: vec![Tool {
                function_declarations: tools::function_declarations(),
            }],
            history: Vec::new(),
        }
    }
}

/// Structured-output request for `profile`'s forecast on `today`
#[must_use]
pub fn daily_horoscope_request(profile: &UserProfile, today: NaiveDate) -> GenerateContentRequest {
    GenerateContentRequest {
        contents: vec![Content::user_text(prompt::horoscope_request(profile, today))],
        system_instruction: Some(Content::instruction(prompt::build_system_instruction(Some(
            profile,
        )))),
        generation_config: Some(GenerationConfig::json(horoscope::response_schema())),
        tools: None,
    }
}

/// Task text plus the inline image. Face readings are profile-agnostic.
#[must_use]
pub fn face_analysis_request(mime_type: &str, image_bytes: &[u8]) -> GenerateContentRequest {
    GenerateContentRequest {
        contents: vec![Content {
            role: Some("user".to_string()),
            parts: vec![
                Part::text(prompt::VISION_PROMPT),
                Part::inline_data(mime_type, STANDARD.encode(image_bytes)),
            ],
        }],
        system_instruction: Some(Content::instruction(prompt::build_system_instruction(None))),
        generation_config: None,
        tools: None,
    }
}

/// Gemini chat session; the endpoint is stateless so the turns live here
pub struct GeminiChatSession {
    client: Arc<GeminiClient>,
    model: String,
    system_instruction: String,
    tools: Vec<Tool>,
    history: Vec<Content>,
}

impl GeminiChatSession {
    /// The request for the next turn: full history, fixed persona, declared tools
    fn next_request(&self) -> GenerateContentRequest {
        GenerateContentRequest {
            contents: self.history.clone(),
            system_instruction: Some(Content::instruction(self.system_instruction.clone())),
            generation_config: None,
            tools: Some(self.tools.clone()),
        }
    }
}

impl ChatSession for GeminiChatSession {
    fn send(&mut self, message: &str) -> Result<ModelReply> {
        self.history.push(Content::user_text(message));
        let request = self.next_request();

        let outcome = self
            .client
            .generate(&self.model, &request)
            .and_then(gemini::first_candidate_content);
        match outcome {
            Ok(content) => {
                let reply = gemini::reply_from_content(&content);
                self.history.push(content);
                Ok(reply)
            }
            Err(error) => {
                self.history.pop();
                Err(error)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::test_support::sample_profile;

    fn offline_gateway() -> ModelGateway {
        ModelGateway::new(&GeminiConfig {
            api_key: "test-key".to_string(),
            base_url: "http://127.0.0.1:9".to_string(),
            timeout_secs: 2,
            ..GeminiConfig::default()
        })
        .unwrap()
    }

    fn instruction_text(request: &GenerateContentRequest) -> String {
        request
            .system_instruction
            .as_ref()
            .map(Content::text)
            .unwrap_or_default()
    }

    #[test]
    fn test_horoscope_request_is_structured_and_personal() {
        let profile = sample_profile();
        let today = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let request = daily_horoscope_request(&profile, today);

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value["generationConfig"]["responseMimeType"],
            "application/json"
        );
        assert_eq!(
            value["generationConfig"]["responseSchema"],
            horoscope::response_schema()
        );
        assert!(request.tools.is_none());

        let instruction = instruction_text(&request);
        assert!(instruction.contains(&profile.name));
        assert!(instruction.contains(&profile.birth_place));
        assert!(request.contents[0].text().contains("2024-06-01"));
    }

    #[test]
    fn test_face_request_has_no_user_block() {
        let image = [0x89, b'P', b'N', b'G'];
        let request = face_analysis_request("image/png", &image);

        assert_eq!(instruction_text(&request), prompt::build_system_instruction(None));
        assert!(!instruction_text(&request).contains("當前諮詢用戶資料"));
        assert!(request.generation_config.is_none());

        let parts = &request.contents[0].parts;
        assert_eq!(parts[0].text.as_deref(), Some(prompt::VISION_PROMPT));
        let inline = parts[1].inline_data.as_ref().unwrap();
        assert_eq!(inline.mime_type, "image/png");
        assert_eq!(inline.data, STANDARD.encode(image));
    }

    #[test]
    fn test_chat_persona_fixed_at_open() {
        let mut profile = sample_profile();
        profile.name = "星野".to_string();
        let session = offline_gateway().start_chat_session(&profile);
        profile.name = "月見".to_string();

        let request = session.next_request();
        let instruction = instruction_text(&request);
        assert!(instruction.contains("星野"));
        assert!(!instruction.contains("月見"));

        let declared: Vec<&str> = request.tools.as_ref().unwrap()[0]
            .function_declarations
            .iter()
            .map(|declaration| declaration.name.as_str())
            .collect();
        assert_eq!(
            declared,
            [tools::CALCULATE_NATAL_CHART, tools::GET_LUNAR_CALENDAR]
        );
    }

    #[test]
    fn test_failed_send_rolls_back_user_turn() {
        let mut session = offline_gateway().start_chat_session(&sample_profile());

        assert!(session.send("今天適合簽約嗎？").is_err());
        assert!(session.history.is_empty());
        assert!(session.next_request().contents.is_empty());
    }
}
