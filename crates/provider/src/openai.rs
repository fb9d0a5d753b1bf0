//! OpenAI-compatible remote analyzer.
//!
//! Sends the ticket text to a chat-completions endpoint with a system prompt
//! demanding a strict JSON reply, then extracts the first balanced JSON
//! object from the model output. Works against api.openai.com as well as any
//! OpenAI-compatible endpoint (Ollama, vLLM, etc.).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use triage_common::{Result, TriageError};

use crate::client::TicketAnalyzer;

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// System prompt instructing the model to emit the classification shape.
const ANALYSIS_SYSTEM_PROMPT: &str = r#"You are a support-ticket triage classifier.

Analyze the user's ticket and respond ONLY with a JSON object, no other text, with this exact structure:

{
  "summary": "one-sentence restatement of the problem",
  "category": "Network|Billing|Login|Performance|Bug",
  "severity": "Low|Medium|High|Critical",
  "key_entities": ["up to three significant terms from the ticket"],
  "reasoning": "brief explanation of the classification"
}

Severity rules:
- "Critical": outage, crash, data loss, service completely down
- "High": a feature is unusable or erroring for the user
- "Medium": degraded behavior, slowness
- "Low": questions, cosmetic issues, everything else"#;

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
}

#[derive(Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

pub struct OpenAiAnalyzer {
    base_url: String,
    model: String,
    api_key: Option<String>,
    http_client: reqwest::Client,
}

impl OpenAiAnalyzer {
    pub fn new(base_url: Option<String>, model: String, api_key: Option<String>) -> Self {
        Self {
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            model,
            api_key,
            http_client: reqwest::Client::new(),
        }
    }

    fn build_request(&self, text: &str) -> ChatRequest {
        ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: ANALYSIS_SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: text.to_string(),
                },
            ],
            // Low temperature for consistent classification
            temperature: 0.2,
        }
    }
}

#[async_trait]
impl TicketAnalyzer for OpenAiAnalyzer {
    async fn analyze(&self, text: &str) -> Result<serde_json::Value> {
        let url = format!("{}/chat/completions", self.base_url);
        let body = self.build_request(text);

        let mut http_req = self.http_client.post(&url).json(&body);
        if let Some(ref key) = self.api_key {
            http_req = http_req.bearer_auth(key);
        }

        let response = http_req
            .send()
            .await
            .map_err(|e| TriageError::Transport(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            return Err(TriageError::Transport(format!(
                "API error {status}: {body_text}"
            )));
        }

        let chat: ChatResponse = response
            .json()
            .await
            .map_err(|e| TriageError::Transport(format!("unparseable response: {e}")))?;

        let content = chat
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| TriageError::Transport("no choices in response".to_string()))?;

        let json_str = extract_json_object(&content).ok_or_else(|| {
            TriageError::Transport(format!(
                "no JSON object in model reply: {}",
                content.chars().take(200).collect::<String>()
            ))
        })?;

        serde_json::from_str(json_str)
            .map_err(|e| TriageError::Transport(format!("invalid JSON in model reply: {e}")))
    }

    fn name(&self) -> &str {
        "openai"
    }
}

/// Extract the first balanced JSON object from a string that may contain
/// surrounding prose.
fn extract_json_object(s: &str) -> Option<&str> {
    let start = s.find('{')?;
    let mut depth = 0;
    let mut end = start;

    for (i, c) in s[start..].char_indices() {
        match c {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    end = start + i + 1;
                    break;
                }
            }
            _ => {}
        }
    }

    if depth == 0 && end > start {
        Some(&s[start..end])
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extract_json_object_simple() {
        let input = r#"{"category":"Network","severity":"High"}"#;
        assert_eq!(extract_json_object(input), Some(input));
    }

    #[test]
    fn extract_json_object_with_surrounding_text() {
        let input = r#"Here is the classification: {"category":"Bug"} Hope that helps!"#;
        assert_eq!(extract_json_object(input), Some(r#"{"category":"Bug"}"#));
    }

    #[test]
    fn extract_json_object_nested() {
        let input = r#"{"category":"Bug","meta":{"nested":true}}"#;
        assert_eq!(extract_json_object(input), Some(input));
    }

    #[test]
    fn extract_json_object_incomplete() {
        assert_eq!(extract_json_object(r#"{"category":"Bug"#), None);
        assert_eq!(extract_json_object("no json here"), None);
    }

    #[test]
    fn request_body_matches_chat_completions_format() {
        let analyzer = OpenAiAnalyzer::new(None, "gpt-4o-mini".to_string(), Some("sk-test".into()));
        let body = analyzer.build_request("VPN is broken");
        let json = serde_json::to_value(&body).unwrap();

        assert_eq!(json["model"], "gpt-4o-mini");
        let messages = json["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0]["role"], "system");
        assert_eq!(messages[1]["role"], "user");
        assert_eq!(messages[1]["content"], "VPN is broken");
    }

    #[test]
    fn default_base_url_is_openai() {
        let analyzer = OpenAiAnalyzer::new(None, "gpt-4o-mini".to_string(), None);
        assert_eq!(analyzer.base_url, "https://api.openai.com/v1");
    }
}
