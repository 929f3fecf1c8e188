use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::constants::{AI_PERSONA, MAX_MESSAGE_LENGTH};
use crate::utils::messages::{format_error, format_warning};
use crate::utils::string_utils::split_message;

const API_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

#[derive(Debug, thiserror::Error)]
pub enum AiError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API returned status {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("the model returned no text")]
    EmptyAnswer,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    system_instruction: Content,
    contents: Vec<Content>,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

fn build_request(question: &str) -> GenerateRequest {
    GenerateRequest {
        system_instruction: Content {
            role: None,
            parts: vec![Part {
                text: Some(AI_PERSONA.to_string()),
            }],
        },
        contents: vec![Content {
            role: Some("user".to_string()),
            parts: vec![Part {
                text: Some(question.to_string()),
            }],
        }],
    }
}

/// Concatenated text of the first candidate
fn extract_answer(response: GenerateResponse) -> Result<String, AiError> {
    let answer: String = response
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|p| p.text)
                .collect::<Vec<_>>()
                .join("")
        })
        .unwrap_or_default();

    if answer.trim().is_empty() {
        return Err(AiError::EmptyAnswer);
    }
    Ok(answer)
}

/// Question answering through the Gemini `generateContent` endpoint.
///
/// Stateless, one request per question.
pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
}

impl GeminiClient {
    pub fn new(http: reqwest::Client, api_key: String, model: String) -> Self {
        Self {
            http,
            api_key,
            model,
        }
    }

    pub async fn ask(&self, question: &str) -> Result<String, AiError> {
        debug!("Sending question to {} ({} chars)", self.model, question.chars().count());

        let response = self
            .http
            .post(format!("{}/{}:generateContent", API_BASE_URL, self.model))
            .query(&[("key", self.api_key.as_str())])
            .json(&build_request(question))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("Gemini answered with status {}", status);
            return Err(AiError::Status { status, body });
        }

        extract_answer(response.json().await?)
    }
}

/// Answer a question as reply-sized chunks, turning failures into a reply
pub async fn answer_in_chunks(client: Option<&GeminiClient>, question: &str) -> Vec<String> {
    let Some(client) = client else {
        return vec![format_warning("خدمة الذكاء الاصطناعي غير مفعّلة")];
    };

    match client.ask(question).await {
        Ok(answer) => split_message(&answer, MAX_MESSAGE_LENGTH),
        Err(e) => {
            warn!("AI request failed: {}", e);
            vec![format_error("تعذّر الحصول على إجابة حالياً، حاول لاحقاً")]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_shape() {
        let json = serde_json::to_value(build_request("ما هي أركان الإسلام؟")).unwrap();
        assert_eq!(
            json["systemInstruction"]["parts"][0]["text"],
            serde_json::Value::String(AI_PERSONA.to_string())
        );
        assert!(json["systemInstruction"].get("role").is_none());
        assert_eq!(json["contents"][0]["role"], "user");
        assert_eq!(json["contents"][0]["parts"][0]["text"], "ما هي أركان الإسلام؟");
    }

    #[test]
    fn test_extract_answer_joins_parts() {
        let response: GenerateResponse = serde_json::from_str(
            r#"{"candidates":[{"content":{"role":"model","parts":[{"text":"Hello "},{"text":"there"}]}}]}"#,
        )
        .unwrap();
        assert_eq!(extract_answer(response).unwrap(), "Hello there");
    }

    #[tokio::test]
    async fn test_answer_without_client() {
        let chunks = answer_in_chunks(None, "hello").await;
        assert_eq!(chunks.len(), 1);
        assert!(chunks[0].starts_with("⚠️"));
    }

    #[test]
    fn test_extract_answer_empty() {
        let response: GenerateResponse = serde_json::from_str(r#"{"candidates":[]}"#).unwrap();
        assert!(matches!(extract_answer(response), Err(AiError::EmptyAnswer)));

        let blocked: GenerateResponse =
            serde_json::from_str(r#"{"candidates":[{"finishReason":"SAFETY"}]}"#).unwrap();
        assert!(matches!(extract_answer(blocked), Err(AiError::EmptyAnswer)));
    }
}
