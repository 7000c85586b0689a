use std::sync::Arc;

use async_trait::async_trait;
use haggle_core::{CollaboratorError, CounterofferFormatter, Terms};
use rust_decimal::Decimal;

use crate::llm::LlmClient;

/// Words a counteroffer through the configured LLM. The amounts are fixed
/// by the engine before this runs; the model only supplies phrasing, and
/// any failure is reported so the service can fall back to its local
/// template.
pub struct LlmFormatter {
    client: Arc<dyn LlmClient>,
    initial_price: Decimal,
}

impl LlmFormatter {
    pub fn new(client: Arc<dyn LlmClient>, terms: &Terms) -> Self {
        Self { client, initial_price: terms.initial_price }
    }

    fn prompt(&self, user_offer: Decimal, counteroffer: Decimal) -> String {
        format!(
            "You are a supplier negotiating a price with a customer. \
             The initial price for the product is ${initial}. The customer has \
             offered ${offer}. You have settled on a counteroffer of ${counter}. \
             Reply with one short, friendly sentence presenting exactly \
             ${counter} as your counteroffer.",
            initial = self.initial_price,
            offer = user_offer,
            counter = counteroffer,
        )
    }
}

#[async_trait]
impl CounterofferFormatter for LlmFormatter {
    async fn format(
        &self,
        user_offer: Decimal,
        counteroffer: Decimal,
    ) -> Result<String, CollaboratorError> {
        let reply = self
            .client
            .complete(&self.prompt(user_offer, counteroffer))
            .await
            .map_err(CollaboratorError::Unavailable)?;

        let reply = reply.trim();
        if reply.is_empty() {
            return Err(CollaboratorError::MalformedReply {
                detail: "llm returned an empty counteroffer message".to_string(),
            });
        }
        Ok(reply.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use anyhow::{anyhow, Result};
    use async_trait::async_trait;
    use haggle_core::{CounterofferFormatter, Terms};
    use rust_decimal::Decimal;

    use super::LlmFormatter;
    use crate::llm::LlmClient;

    struct EchoClient;

    #[async_trait]
    impl LlmClient for EchoClient {
        async fn complete(&self, prompt: &str) -> Result<String> {
            Ok(format!("echo: {prompt}"))
        }
    }

    struct BlankClient;

    #[async_trait]
    impl LlmClient for BlankClient {
        async fn complete(&self, _prompt: &str) -> Result<String> {
            Ok("   ".to_string())
        }
    }

    struct DownClient;

    #[async_trait]
    impl LlmClient for DownClient {
        async fn complete(&self, _prompt: &str) -> Result<String> {
            Err(anyhow!("connection refused"))
        }
    }

    #[tokio::test]
    async fn prompt_carries_the_fixed_amounts() {
        let formatter = LlmFormatter::new(Arc::new(EchoClient), &Terms::default());
        let message =
            formatter.format(Decimal::from(70), Decimal::from(90)).await.unwrap();

        assert!(message.contains("offered $70"));
        assert!(message.contains("counteroffer of $90"));
        assert!(message.contains("initial price for the product is $100"));
    }

    #[tokio::test]
    async fn blank_and_failed_replies_surface_as_collaborator_errors() {
        let blank = LlmFormatter::new(Arc::new(BlankClient), &Terms::default());
        assert!(blank.format(Decimal::from(70), Decimal::from(90)).await.is_err());

        let down = LlmFormatter::new(Arc::new(DownClient), &Terms::default());
        assert!(down.format(Decimal::from(70), Decimal::from(90)).await.is_err());
    }
}
