use anyhow::{anyhow, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use shared::settings::ProviderAuth;
use std::env;
use std::time::Duration;

use crate::data_url;

/// Persona, formatting and safety rules sent with every request.
pub const SYSTEM_INSTRUCTION: &str = "You are StudyAI, an advanced multilingual AI assistant built for students worldwide.

Rules:
1. Support all languages. Automatically detect and respond in the user's language.
2. Provide clear, simple, and student-friendly explanations.
3. Avoid harmful, illegal, or adult content.
4. When answering academic questions:
   - Explain step by step
   - Give examples
   - Keep answers easy to understand
5. Format your response in clean Markdown. Use bolding for key terms, lists for steps, and code blocks for code.

Tone:
- Friendly
- Smart
- Helpful teacher style

Always prioritize learning and clarity.";

/// Slightly creative but focused. Fixed for every request.
const TEMPERATURE: f32 = 0.7;

/// Shown when the service answers with no usable text.
pub const EMPTY_RESPONSE_PLACEHOLDER: &str =
    "I couldn't generate a text response. Please try again.";

#[derive(Debug, Serialize, Deserialize)]
struct GeminiContent {
    role: String,
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiPart {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    inline_data: Option<GeminiInlineData>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiInlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiGenerationConfig {
    temperature: f32,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    system_instruction: GeminiContent,
    generation_config: GeminiGenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiCandidatePart {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiCandidateContent {
    parts: Vec<GeminiCandidatePart>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiCandidateContent>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

/// Single-call adapter to the Gemini `generateContent` endpoint.
pub struct GeminiClient {
    http: Client,
    auth_token: String,
    model: String,
}

impl GeminiClient {
    pub fn new(model: &str) -> Result<Self> {
        let key = env::var("GEMINI_API_KEY").map_err(|_| anyhow!("GEMINI_API_KEY not set"))?;
        Ok(Self {
            http: Client::builder().timeout(Duration::from_secs(45)).build()?,
            auth_token: key,
            model: model.to_string(),
        })
    }

    pub fn from_auth(model: &str, auth: &ProviderAuth) -> Result<Self> {
        let auth_token = if let Some(api_key) = &auth.api_key {
            api_key.clone()
        } else if let Some(oauth) = &auth.oauth {
            oauth.access_token.clone()
        } else {
            // Try environment variable as fallback
            env::var("GEMINI_API_KEY")
                .map_err(|_| anyhow!("No Gemini authentication configured"))?
        };

        Ok(Self {
            http: Client::builder().timeout(Duration::from_secs(45)).build()?,
            auth_token,
            model: model.to_string(),
        })
    }

    /// Send one student question, optionally with an inline image, and return
    /// the generated answer. The system instruction and temperature are fixed.
    ///
    /// No retry: a network or service failure surfaces as an error and the
    /// caller produces the user-visible fallback.
    pub async fn generate(&self, prompt: &str, image: Option<&str>) -> Result<String> {
        let url = format!(
            "https://generativelanguage.googleapis.com/v1beta/models/{}:generateContent?key={}",
            self.model, self.auth_token
        );
        let req = build_request(prompt, image);
        let resp = self.http.post(url).json(&req).send().await?;
        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            let body = body.trim();
            if body.is_empty() {
                return Err(anyhow!("gemini error: {}", status));
            }
            let body = if body.len() > 800 {
                format!("{}...", &body[..800])
            } else {
                body.to_string()
            };
            return Err(anyhow!("gemini error: {}\n{}", status, body));
        }
        let body: GeminiResponse = resp.json().await?;
        Ok(extract_text(body))
    }
}

/// Assemble the wire request: an optional inline-image part ahead of the text
/// part, plus the fixed system instruction and sampling config.
///
/// A malformed image encoding is dropped and the text-only request still goes
/// out.
fn build_request(prompt: &str, image: Option<&str>) -> GeminiRequest {
    let mut parts: Vec<GeminiPart> = Vec::new();

    if let Some(raw) = image {
        match data_url::parse(raw) {
            Some(decoded) => parts.push(GeminiPart {
                text: None,
                inline_data: Some(GeminiInlineData {
                    mime_type: decoded.mime_type,
                    data: decoded.data,
                }),
            }),
            None => tracing::warn!("dropping malformed image attachment from request"),
        }
    }

    if !prompt.is_empty() {
        parts.push(GeminiPart {
            text: Some(prompt.to_string()),
            inline_data: None,
        });
    }

    GeminiRequest {
        contents: vec![GeminiContent {
            role: "user".to_string(),
            parts,
        }],
        system_instruction: GeminiContent {
            role: "system".to_string(),
            parts: vec![GeminiPart {
                text: Some(SYSTEM_INSTRUCTION.to_string()),
                inline_data: None,
            }],
        },
        generation_config: GeminiGenerationConfig {
            temperature: TEMPERATURE,
        },
    }
}

/// First candidate's first text part, or the fixed placeholder when the
/// service returned nothing usable.
fn extract_text(body: GeminiResponse) -> String {
    let text = body
        .candidates
        .first()
        .and_then(|c| c.content.as_ref())
        .and_then(|c| c.parts.first())
        .map(|p| p.text.clone())
        .unwrap_or_default();
    if text.is_empty() {
        EMPTY_RESPONSE_PLACEHOLDER.to_string()
    } else {
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_puts_image_part_before_text() {
        let req = build_request("what is this?", Some("data:image/png;base64,AAAA"));
        let value = serde_json::to_value(&req).unwrap();
        let parts = &value["contents"][0]["parts"];
        assert_eq!(parts[0]["inline_data"]["mime_type"], "image/png");
        assert_eq!(parts[0]["inline_data"]["data"], "AAAA");
        assert_eq!(parts[1]["text"], "what is this?");
    }

    #[test]
    fn test_request_attaches_fixed_instruction_and_temperature() {
        let req = build_request("hi", None);
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(
            value["system_instruction"]["parts"][0]["text"],
            SYSTEM_INSTRUCTION
        );
        assert!((value["generation_config"]["temperature"].as_f64().unwrap() - 0.7).abs() < 1e-6);
    }

    #[test]
    fn test_malformed_image_degrades_to_text_only() {
        let req = build_request("solve x+1=2", Some("not-a-data-url"));
        let value = serde_json::to_value(&req).unwrap();
        let parts = value["contents"][0]["parts"].as_array().unwrap();
        assert_eq!(parts.len(), 1);
        assert_eq!(parts[0]["text"], "solve x+1=2");
    }

    #[test]
    fn test_image_only_request_has_single_part() {
        let req = build_request("", Some("data:image/jpeg;base64,BBBB"));
        let value = serde_json::to_value(&req).unwrap();
        let parts = value["contents"][0]["parts"].as_array().unwrap();
        assert_eq!(parts.len(), 1);
        assert!(parts[0].get("text").is_none());
    }

    #[test]
    fn test_extract_text_returns_candidate_text() {
        let body: GeminiResponse = serde_json::from_value(serde_json::json!({
            "candidates": [{"content": {"parts": [{"text": "2 + 2 = **4**"}]}}]
        }))
        .unwrap();
        assert_eq!(extract_text(body), "2 + 2 = **4**");
    }

    #[test]
    fn test_extract_text_placeholder_on_empty_result() {
        let no_candidates: GeminiResponse = serde_json::from_value(serde_json::json!({})).unwrap();
        assert_eq!(extract_text(no_candidates), EMPTY_RESPONSE_PLACEHOLDER);

        let empty_text: GeminiResponse = serde_json::from_value(serde_json::json!({
            "candidates": [{"content": {"parts": [{"text": ""}]}}]
        }))
        .unwrap();
        assert_eq!(extract_text(empty_text), EMPTY_RESPONSE_PLACEHOLDER);
    }
}
