use std::time::Duration;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use haggle_core::config::{LlmConfig, LlmProvider};
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde_json::{json, Value};
use tracing::warn;

const OPENAI_DEFAULT_BASE_URL: &str = "https://api.openai.com";
const ANTHROPIC_DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
const ANTHROPIC_VERSION: &str = "2023-06-01";
const MAX_COMPLETION_TOKENS: u32 = 200;

#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String>;
}

/// Completion client for the configured provider. One reqwest client,
/// per-request timeout from config, bounded retries on transport errors.
pub struct HttpLlmClient {
    client: Client,
    provider: LlmProvider,
    api_key: Option<SecretString>,
    base_url: Option<String>,
    model: String,
    max_retries: u32,
}

impl HttpLlmClient {
    pub fn from_config(config: &LlmConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("failed to build llm http client")?;

        Ok(Self {
            client,
            provider: config.provider,
            api_key: config.api_key.clone(),
            base_url: config.base_url.clone(),
            model: config.model.clone(),
            max_retries: config.max_retries,
        })
    }

    fn endpoint(&self) -> String {
        match self.provider {
            LlmProvider::OpenAi => {
                let base = self.base_url.as_deref().unwrap_or(OPENAI_DEFAULT_BASE_URL);
                format!("{}/v1/chat/completions", base.trim_end_matches('/'))
            }
            LlmProvider::Anthropic => {
                let base = self.base_url.as_deref().unwrap_or(ANTHROPIC_DEFAULT_BASE_URL);
                format!("{}/v1/messages", base.trim_end_matches('/'))
            }
            LlmProvider::Ollama => {
                let base = self.base_url.as_deref().unwrap_or("http://localhost:11434");
                format!("{}/api/generate", base.trim_end_matches('/'))
            }
        }
    }

    fn request_body(&self, prompt: &str) -> Value {
        match self.provider {
            LlmProvider::OpenAi => json!({
                "model": self.model,
                "messages": [{"role": "user", "content": prompt}],
                "max_tokens": MAX_COMPLETION_TOKENS,
            }),
            LlmProvider::Anthropic => json!({
                "model": self.model,
                "max_tokens": MAX_COMPLETION_TOKENS,
                "messages": [{"role": "user", "content": prompt}],
            }),
            LlmProvider::Ollama => json!({
                "model": self.model,
                "prompt": prompt,
                "stream": false,
            }),
        }
    }

    async fn complete_once(&self, prompt: &str) -> Result<String> {
        let mut request = self.client.post(self.endpoint()).json(&self.request_body(prompt));

        request = match (self.provider, &self.api_key) {
            (LlmProvider::OpenAi, Some(key)) => request.bearer_auth(key.expose_secret()),
            (LlmProvider::Anthropic, Some(key)) => request
                .header("x-api-key", key.expose_secret())
                .header("anthropic-version", ANTHROPIC_VERSION),
            _ => request,
        };

        let response = request.send().await.context("llm request failed")?;
        let status = response.status();
        if !status.is_success() {
            bail!("llm provider returned status {status}");
        }

        let payload: Value = response.json().await.context("llm reply was not valid json")?;
        parse_reply(self.provider, &payload)
    }
}

#[async_trait]
impl LlmClient for HttpLlmClient {
    async fn complete(&self, prompt: &str) -> Result<String> {
        let mut last_error = None;
        for attempt in 0..=self.max_retries {
            match self.complete_once(prompt).await {
                Ok(text) => return Ok(text),
                Err(error) => {
                    warn!(
                        event_name = "llm.completion.retry",
                        attempt,
                        max_retries = self.max_retries,
                        error = %error,
                        "llm completion attempt failed"
                    );
                    last_error = Some(error);
                }
            }
        }
        Err(last_error.unwrap_or_else(|| anyhow::anyhow!("llm completion failed")))
    }
}

fn parse_reply(provider: LlmProvider, payload: &Value) -> Result<String> {
    let text = match provider {
        LlmProvider::OpenAi => payload
            .pointer("/choices/0/message/content")
            .and_then(Value::as_str),
        LlmProvider::Anthropic => payload.pointer("/content/0/text").and_then(Value::as_str),
        LlmProvider::Ollama => payload.get("response").and_then(Value::as_str),
    };

    match text.map(str::trim) {
        Some(text) if !text.is_empty() => Ok(text.to_owned()),
        _ => bail!("llm reply carried no completion text"),
    }
}

#[cfg(test)]
mod tests {
    use haggle_core::config::LlmProvider;
    use serde_json::json;

    use super::parse_reply;

    #[test]
    fn openai_reply_is_extracted_from_the_first_choice() {
        let payload = json!({
            "choices": [{"message": {"role": "assistant", "content": " How about $90? "}}]
        });
        let text = parse_reply(LlmProvider::OpenAi, &payload).unwrap();
        assert_eq!(text, "How about $90?");
    }

    #[test]
    fn anthropic_reply_is_extracted_from_the_first_content_block() {
        let payload = json!({
            "content": [{"type": "text", "text": "I can meet you at $90."}]
        });
        let text = parse_reply(LlmProvider::Anthropic, &payload).unwrap();
        assert_eq!(text, "I can meet you at $90.");
    }

    #[test]
    fn ollama_reply_is_extracted_from_the_response_field() {
        let payload = json!({"model": "llama3.1", "response": "Let's settle on $90.", "done": true});
        let text = parse_reply(LlmProvider::Ollama, &payload).unwrap();
        assert_eq!(text, "Let's settle on $90.");
    }

    #[test]
    fn empty_or_missing_completion_text_is_an_error() {
        assert!(parse_reply(LlmProvider::OpenAi, &json!({"choices": []})).is_err());
        assert!(parse_reply(LlmProvider::Ollama, &json!({"response": "   "})).is_err());
        assert!(parse_reply(LlmProvider::Anthropic, &json!({"content": [{}]})).is_err());
    }
}
