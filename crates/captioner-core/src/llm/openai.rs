//! OpenAI caption provider using the Chat Completions API.
//!
//! Sends the instruction text and the image (as a data URL) in a single user
//! message. Any Chat Completions-compatible gateway works via the endpoint.

use super::provider::{CaptionProvider, CaptionRequest, CaptionResponse};
use crate::error::PipelineError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";

/// OpenAI provider using Chat Completions API.
pub struct OpenAiProvider {
    api_key: String,
    model: String,
    client: reqwest::Client,
    endpoint: String,
    timeout: Duration,
}

impl OpenAiProvider {
    pub fn new(api_key: &str, model: &str) -> Self {
        Self::with_endpoint(api_key, model, DEFAULT_ENDPOINT)
    }

    /// Create with a custom Chat Completions endpoint.
    pub fn with_endpoint(api_key: &str, model: &str, endpoint: &str) -> Self {
        Self {
            api_key: api_key.to_string(),
            model: model.to_string(),
            client: reqwest::Client::new(),
            endpoint: endpoint.to_string(),
            timeout: Duration::from_secs(60),
        }
    }

    /// Override the HTTP request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Map a reqwest failure onto the pipeline error that describes it:
    /// timeouts and unreachable hosts keep their kind so they can be retried.
    fn transport_error(
        &self,
        e: reqwest::Error,
        request: &CaptionRequest,
        context: &str,
    ) -> PipelineError {
        if e.is_timeout() {
            PipelineError::Timeout {
                path: request.path.clone(),
                timeout_ms: self.timeout.as_millis() as u64,
            }
        } else if e.is_connect() || e.is_request() {
            PipelineError::Connection {
                message: error_chain(&e),
            }
        } else {
            PipelineError::Service {
                message: format!("{context}: {}", error_chain(&e)),
                status_code: None,
            }
        }
    }
}

/// Render an error with all of its sources, outermost first.
///
/// reqwest's own `Display` stops at "error sending request for url (..)";
/// the actual cause (refused, reset, DNS) lives in the source chain.
fn error_chain(error: &dyn std::error::Error) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

// --- Request types ---

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Serialize)]
struct ChatMessage {
    role: String,
    content: Vec<ChatContent>,
}

#[derive(Serialize)]
#[serde(tag = "type")]
enum ChatContent {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(rename = "image_url")]
    ImageUrl { image_url: ImageUrl },
}

#[derive(Serialize)]
struct ImageUrl {
    url: String,
}

// --- Response types ---

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
    #[serde(default)]
    model: Option<String>,
    usage: Option<ChatUsage>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ChatUsage {
    total_tokens: u32,
}

#[async_trait]
impl CaptionProvider for OpenAiProvider {
    fn name(&self) -> &str {
        "openai"
    }

    async fn generate(&self, request: &CaptionRequest) -> Result<CaptionResponse, PipelineError> {
        let start = Instant::now();

        let body = ChatRequest {
            model: self.model.clone(),
            max_tokens: request.max_tokens,
            temperature: request.temperature,
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: vec![
                    ChatContent::Text {
                        text: request.prompt.clone(),
                    },
                    ChatContent::ImageUrl {
                        image_url: ImageUrl {
                            url: request.image.data_url(),
                        },
                    },
                ],
            }],
        };

        let resp = self
            .client
            .post(&self.endpoint)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| self.transport_error(e, request, "Caption request failed"))?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(PipelineError::Service {
                message: format!("Caption service HTTP {status}: {text}"),
                status_code: Some(status.as_u16()),
            });
        }

        let chat_resp: ChatResponse = resp
            .json()
            .await
            .map_err(|e| self.transport_error(e, request, "Failed to parse caption response"))?;

        // Empty text is passed through; the batch decides what a missing caption means.
        let text = chat_resp
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default();

        Ok(CaptionResponse {
            text: text.trim().to_string(),
            model: chat_resp.model.unwrap_or_else(|| self.model.clone()),
            tokens_used: chat_resp.usage.map(|u| u.total_tokens),
            latency_ms: start.elapsed().as_millis() as u64,
        })
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_body_shape() {
        let body = ChatRequest {
            model: "gpt-4o".to_string(),
            max_tokens: 100,
            temperature: None,
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: vec![
                    ChatContent::Text {
                        text: "Describe SW_A".to_string(),
                    },
                    ChatContent::ImageUrl {
                        image_url: ImageUrl {
                            url: "data:image/jpeg;base64,AQID".to_string(),
                        },
                    },
                ],
            }],
        };
        let json = serde_json::to_value(&body).unwrap();

        assert_eq!(json["model"], "gpt-4o");
        assert_eq!(json["max_tokens"], 100);
        assert!(json.get("temperature").is_none());
        let content = &json["messages"][0]["content"];
        assert_eq!(content[0]["type"], "text");
        assert_eq!(content[0]["text"], "Describe SW_A");
        assert_eq!(content[1]["type"], "image_url");
        assert_eq!(content[1]["image_url"]["url"], "data:image/jpeg;base64,AQID");
    }

    #[test]
    fn test_response_parses_without_usage() {
        let resp: ChatResponse = serde_json::from_str(
            r#"{"choices":[{"message":{"role":"assistant","content":" A red sweater. "}}]}"#,
        )
        .unwrap();
        assert!(resp.model.is_none());
        assert!(resp.usage.is_none());
        assert_eq!(
            resp.choices[0].message.content.as_deref(),
            Some(" A red sweater. ")
        );
    }

    #[derive(Debug)]
    struct SendFailure(std::io::Error);

    impl std::fmt::Display for SendFailure {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.write_str("error sending request for url (http://127.0.0.1:9/)")
        }
    }

    impl std::error::Error for SendFailure {
        fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
            Some(&self.0)
        }
    }

    #[test]
    fn test_error_chain_includes_cause() {
        let err = SendFailure(std::io::Error::new(
            std::io::ErrorKind::ConnectionRefused,
            "Connection refused (os error 111)",
        ));
        assert_eq!(
            error_chain(&err),
            "error sending request for url (http://127.0.0.1:9/): Connection refused (os error 111)"
        );
    }

    #[test]
    fn test_timeout_override() {
        let provider = OpenAiProvider::new("key", "gpt-4o").with_timeout(Duration::from_secs(5));
        assert_eq!(provider.timeout(), Duration::from_secs(5));
    }
}
