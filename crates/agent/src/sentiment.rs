use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use haggle_core::config::SentimentConfig;
use haggle_core::{CollaboratorError, SentimentSource};
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde_json::{json, Value};

/// Remote polarity endpoint. Contract: `POST {base_url}/v1/polarity` with
/// `{"text": ...}` answered by `{"polarity": f}` where `f` is in
/// [-1.0, 1.0]. The service clamps out-of-range values; this client only
/// rejects replies with no usable number.
pub struct HttpSentimentSource {
    client: Client,
    base_url: String,
    api_key: Option<SecretString>,
    timeout_secs: u64,
}

impl HttpSentimentSource {
    pub fn from_config(config: &SentimentConfig) -> Result<Self> {
        let base_url = config
            .base_url
            .clone()
            .ok_or_else(|| anyhow!("sentiment.base_url is not configured"))?;
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("failed to build sentiment http client")?;

        Ok(Self {
            client,
            base_url,
            api_key: config.api_key.clone(),
            timeout_secs: config.timeout_secs,
        })
    }
}

#[async_trait]
impl SentimentSource for HttpSentimentSource {
    async fn polarity(&self, text: &str) -> Result<f64, CollaboratorError> {
        let endpoint = format!("{}/v1/polarity", self.base_url.trim_end_matches('/'));
        let mut request = self.client.post(endpoint).json(&json!({ "text": text }));
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key.expose_secret());
        }

        let response = request.send().await.map_err(|error| {
            if error.is_timeout() {
                CollaboratorError::Timeout { timeout_secs: self.timeout_secs }
            } else {
                CollaboratorError::Unavailable(error.into())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(CollaboratorError::Unavailable(anyhow!(
                "sentiment endpoint returned status {status}"
            )));
        }

        let payload: Value = response.json().await.map_err(|error| {
            CollaboratorError::MalformedReply { detail: error.to_string() }
        })?;
        parse_polarity(&payload)
    }
}

/// Local stand-in when no sentiment endpoint is configured: every message
/// scores 0.0 and therefore lands in the low discount tier.
#[derive(Clone, Copy, Debug, Default)]
pub struct NeutralSentiment;

#[async_trait]
impl SentimentSource for NeutralSentiment {
    async fn polarity(&self, _text: &str) -> Result<f64, CollaboratorError> {
        Ok(0.0)
    }
}

fn parse_polarity(payload: &Value) -> Result<f64, CollaboratorError> {
    match payload.get("polarity").and_then(Value::as_f64) {
        Some(polarity) if polarity.is_finite() => Ok(polarity),
        _ => Err(CollaboratorError::MalformedReply {
            detail: "reply carried no finite `polarity` number".to_string(),
        }),
    }
}
