//! Client for the Anthropic Messages API

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{ApiKey, GenerationError, GeneratorConfig, QuestionGenerator};

/// Sends prompts to `{base_url}/v1/messages`
#[derive(Debug, Clone)]
pub struct AnthropicClient {
    http: reqwest::Client,
    api_key: ApiKey,
    config: GeneratorConfig,
}

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f64,
    messages: Vec<Message<'a>>,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

impl AnthropicClient {
    pub fn new(api_key: ApiKey, config: GeneratorConfig) -> Result<Self, GenerationError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()?;
        Ok(Self {
            http,
            api_key,
            config,
        })
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    fn endpoint(&self) -> String {
        format!("{}/v1/messages", self.config.base_url.trim_end_matches('/'))
    }

    fn request_body<'a>(&'a self, prompt: &'a str) -> MessagesRequest<'a> {
        MessagesRequest {
            model: &self.config.model,
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
            messages: vec![Message {
                role: "user",
                content: prompt,
            }],
        }
    }
}

/// Pull the generated text out of a Messages API response body
///
/// The first content block must be text.
fn parse_response(body: &str) -> Result<String, GenerationError> {
    let response: MessagesResponse = serde_json::from_str(body)
        .map_err(|e| GenerationError::UnexpectedResponse(format!("malformed body: {}", e)))?;

    let first = response
        .content
        .into_iter()
        .next()
        .ok_or_else(|| GenerationError::UnexpectedResponse("response has no content".to_string()))?;

    match (first.kind.as_str(), first.text) {
        ("text", Some(text)) => Ok(text),
        (kind, _) => Err(GenerationError::UnexpectedResponse(format!(
            "expected a text block, got `{}`",
            kind
        ))),
    }
}

impl QuestionGenerator for AnthropicClient {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        let endpoint = self.endpoint();
        debug!(%endpoint, model = %self.config.model, prompt_bytes = prompt.len(), "sending prompt");

        let response = self
            .http
            .post(&endpoint)
            .header("x-api-key", self.api_key.expose())
            .header("anthropic-version", self.config.api_version.as_str())
            .json(&self.request_body(prompt))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(GenerationError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let text = parse_response(&body)?;
        info!(chars = text.len(), "received generated questions");
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> AnthropicClient {
        let key = ApiKey::new("sk-test").expect("Should accept");
        AnthropicClient::new(key, GeneratorConfig::default().with_base_url("http://localhost:9/"))
            .expect("Should build client")
    }

    #[test]
    fn test_endpoint_trims_trailing_slash() {
        assert_eq!(client().endpoint(), "http://localhost:9/v1/messages");
    }

    #[test]
    fn test_request_body_shape() {
        let client = client();
        let body = serde_json::to_value(client.request_body("Lisez le texte.")).unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "model": "claude-sonnet-4-5-20250929",
                "max_tokens": 4096,
                "temperature": 0.7,
                "messages": [{"role": "user", "content": "Lisez le texte."}],
            })
        );
    }

    #[test]
    fn test_parse_text_response() {
        let body = r#"{"id":"msg_1","content":[{"type":"text","text":"questions:\n  - id: 1"}]}"#;
        assert_eq!(parse_response(body).unwrap(), "questions:\n  - id: 1");
    }

    #[test]
    fn test_parse_non_text_block() {
        let body = r#"{"content":[{"type":"tool_use","id":"t","name":"x","input":{}}]}"#;
        let err = parse_response(body).unwrap_err();
        assert!(matches!(err, GenerationError::UnexpectedResponse(ref m) if m.contains("tool_use")));
    }

    #[test]
    fn test_parse_empty_content() {
        assert!(matches!(
            parse_response(r#"{"content":[]}"#),
            Err(GenerationError::UnexpectedResponse(_))
        ));
    }

    #[test]
    fn test_parse_malformed_body() {
        assert!(matches!(
            parse_response("<html>bad gateway</html>"),
            Err(GenerationError::UnexpectedResponse(_))
        ));
    }
}
