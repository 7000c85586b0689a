use std::sync::Arc;

use async_trait::async_trait;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use tracing::{debug, warn};

use super::discount::DiscountSchedule;
use super::engine::{decide, Decision};
use super::store::SessionStore;
use super::Terms;
use crate::errors::{CollaboratorError, InputError};

/// Session key used when the caller sends no `user_id`. All anonymous
/// rounds share one session; callers wanting continuity supply a key.
pub const ANONYMOUS_USER: &str = "anonymous";

/// Maps free text to a polarity score in [-1.0, 1.0]. The service treats
/// the score as an opaque signal: any failure downgrades to neutral
/// polarity rather than failing the round.
#[async_trait]
pub trait SentimentSource: Send + Sync {
    async fn polarity(&self, text: &str) -> Result<f64, CollaboratorError>;
}

/// Produces the buyer-facing wording of a counteroffer. Only consulted on
/// the counter branch, strictly after session state is committed; failure
/// degrades to the local template and never corrupts committed state.
#[async_trait]
pub trait CounterofferFormatter: Send + Sync {
    async fn format(
        &self,
        user_offer: Decimal,
        counteroffer: Decimal,
    ) -> Result<String, CollaboratorError>;
}

/// Default local wording, also the fallback when a delegated formatter
/// fails or times out.
#[derive(Clone, Copy, Debug, Default)]
pub struct TemplateFormatter;

pub(crate) fn counter_template(counteroffer: Decimal) -> String {
    format!("Counteroffer: ${counteroffer}.")
}

#[async_trait]
impl CounterofferFormatter for TemplateFormatter {
    async fn format(
        &self,
        _user_offer: Decimal,
        counteroffer: Decimal,
    ) -> Result<String, CollaboratorError> {
        Ok(counter_template(counteroffer))
    }
}

/// Result of one negotiation round, ready for transport mapping.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RoundOutcome {
    Accepted { price: Decimal, message: String },
    Rejected { counteroffer: Decimal, message: String },
    Countered { counteroffer: Decimal, message: String, formatter_degraded: bool },
}

impl RoundOutcome {
    pub fn message(&self) -> &str {
        match self {
            Self::Accepted { message, .. }
            | Self::Rejected { message, .. }
            | Self::Countered { message, .. } => message,
        }
    }

    pub fn counteroffer(&self) -> Option<Decimal> {
        match self {
            Self::Accepted { .. } => None,
            Self::Rejected { counteroffer, .. } | Self::Countered { counteroffer, .. } => {
                Some(*counteroffer)
            }
        }
    }
}

/// Orchestrates one round: validate, score sentiment, decide under the
/// per-user lock, then word the reply.
pub struct NegotiationService {
    terms: Terms,
    schedule: DiscountSchedule,
    store: SessionStore,
    sentiment: Arc<dyn SentimentSource>,
    formatter: Arc<dyn CounterofferFormatter>,
}

impl NegotiationService {
    pub fn new(
        terms: Terms,
        schedule: DiscountSchedule,
        sentiment: Arc<dyn SentimentSource>,
        formatter: Arc<dyn CounterofferFormatter>,
    ) -> Self {
        let store = SessionStore::new(&terms);
        Self { terms, schedule, store, sentiment, formatter }
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    pub async fn negotiate(
        &self,
        user_id: Option<&str>,
        user_offer: f64,
        user_message: &str,
    ) -> Result<RoundOutcome, InputError> {
        let user_id = validate_user_id(user_id)?;
        let offer = validate_offer(user_offer)?;
        if user_message.trim().is_empty() {
            return Err(InputError::EmptyMessage);
        }

        // Sentiment needs no session state, so it runs before any lock.
        let polarity = match self.sentiment.polarity(user_message).await {
            Ok(score) => score.clamp(-1.0, 1.0),
            Err(error) => {
                warn!(
                    event_name = "negotiation.sentiment.degraded",
                    user_id,
                    error = %error,
                    "sentiment source failed, defaulting to neutral polarity"
                );
                0.0
            }
        };
        let discount = self.schedule.discount(polarity);

        // Read-decide-write under the per-user lock; other users' rounds
        // proceed in parallel.
        let cell = self.store.entry(user_id);
        let decision = {
            let mut reference = cell.lock().await;
            let decision = decide(&self.terms, *reference, offer, discount);
            if let Some(updated) = decision.updated_reference() {
                *reference = updated;
            }
            decision
        };

        debug!(
            event_name = "negotiation.round.decided",
            user_id,
            polarity,
            discount = %discount,
            amount = %decision.amount(),
            "negotiation round decided"
        );

        // The external formatter runs only after the session write is
        // committed, so a slow or failed call cannot hold the lock.
        Ok(match decision {
            Decision::Accept { price } => RoundOutcome::Accepted {
                price,
                message: format!("Deal accepted at ${price}!"),
            },
            Decision::Reject { counter } => RoundOutcome::Rejected {
                counteroffer: counter,
                message: "Offer too low, unable to accept.".to_owned(),
            },
            Decision::Counter { counteroffer } => {
                match self.formatter.format(offer, counteroffer).await {
                    Ok(message) => RoundOutcome::Countered {
                        counteroffer,
                        message,
                        formatter_degraded: false,
                    },
                    Err(error) => {
                        warn!(
                            event_name = "negotiation.formatter.degraded",
                            user_id,
                            error = %error,
                            "formatter failed, falling back to local template"
                        );
                        RoundOutcome::Countered {
                            counteroffer,
                            message: counter_template(counteroffer),
                            formatter_degraded: true,
                        }
                    }
                }
            }
        })
    }
}

fn validate_user_id(user_id: Option<&str>) -> Result<&str, InputError> {
    match user_id {
        Some(id) if id.trim().is_empty() => Err(InputError::BlankUserId),
        Some(id) => Ok(id),
        None => Ok(ANONYMOUS_USER),
    }
}

fn validate_offer(user_offer: f64) -> Result<Decimal, InputError> {
    if !user_offer.is_finite() {
        return Err(InputError::NonFiniteOffer { raw: user_offer.to_string() });
    }
    Decimal::from_f64(user_offer)
        .map(|offer| offer.round_dp(2).normalize())
        .ok_or(InputError::NonFiniteOffer { raw: user_offer.to_string() })
}
