use std::sync::Arc;

use haggle_agent::formatter::LlmFormatter;
use haggle_agent::llm::HttpLlmClient;
use haggle_agent::sentiment::{HttpSentimentSource, NeutralSentiment};
use haggle_core::config::{AppConfig, ConfigError, FormatterMode, LoadOptions};
use haggle_core::negotiation::discount::DiscountSchedule;
use haggle_core::{
    CounterofferFormatter, NegotiationService, SentimentSource, TemplateFormatter, Terms,
};
use thiserror::Error;
use tracing::info;

pub struct Application {
    pub config: AppConfig,
    pub service: Arc<NegotiationService>,
    pub formatter_mode: &'static str,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("collaborator setup failed: {0}")]
    Collaborator(#[source] anyhow::Error),
}

pub async fn bootstrap(options: LoadOptions) -> Result<Application, BootstrapError> {
    let config = AppConfig::load(options)?;
    bootstrap_with_config(config)
}

pub fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(
        event_name = "system.bootstrap.start",
        correlation_id = "bootstrap",
        "starting application bootstrap"
    );

    let terms = Terms::default();
    let schedule = DiscountSchedule::default();

    let sentiment: Arc<dyn SentimentSource> = match &config.sentiment.base_url {
        Some(base_url) => {
            info!(
                event_name = "system.bootstrap.sentiment_remote",
                correlation_id = "bootstrap",
                base_url = %base_url,
                "using remote sentiment source"
            );
            Arc::new(
                HttpSentimentSource::from_config(&config.sentiment)
                    .map_err(BootstrapError::Collaborator)?,
            )
        }
        None => {
            info!(
                event_name = "system.bootstrap.sentiment_neutral",
                correlation_id = "bootstrap",
                "no sentiment endpoint configured, scoring every message neutral"
            );
            Arc::new(NeutralSentiment)
        }
    };

    let (formatter, formatter_mode): (Arc<dyn CounterofferFormatter>, &'static str) =
        match config.formatter.mode {
            FormatterMode::Template => (Arc::new(TemplateFormatter), "template"),
            FormatterMode::Llm => {
                let client =
                    HttpLlmClient::from_config(&config.llm).map_err(BootstrapError::Collaborator)?;
                (Arc::new(LlmFormatter::new(Arc::new(client), &terms)), "llm")
            }
        };

    info!(
        event_name = "system.bootstrap.ready",
        correlation_id = "bootstrap",
        formatter_mode,
        "negotiation service wired"
    );

    Ok(Application {
        config,
        service: Arc::new(NegotiationService::new(terms, schedule, sentiment, formatter)),
        formatter_mode,
    })
}
