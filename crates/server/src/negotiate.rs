//! Negotiation API.
//!
//! - `POST /negotiate` — one negotiation round.
//!
//! Request: `{"user_offer": <number>, "user_message": <text>,
//! "user_id": <optional key>}`. Omitting `user_id` continues the shared
//! anonymous session. Replies are `{"message": ...}` for an accepted
//! deal and `{"message": ..., "counteroffer": <amount>}` for rejections
//! and counters; invalid input yields `{"error": ...}` with 400.

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    routing::post,
    Json, Router,
};
use haggle_core::{InputError, NegotiationService, RoundOutcome};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;
use uuid::Uuid;

#[derive(Clone)]
pub struct NegotiateState {
    service: Arc<NegotiationService>,
}

#[derive(Debug, Deserialize)]
pub struct NegotiateRequest {
    // Accepted as raw JSON so a non-numeric offer maps to the documented
    // invalid-input reply instead of a generic deserialization rejection.
    pub user_offer: Option<Value>,
    pub user_message: Option<String>,
    pub user_id: Option<String>,
}

#[derive(Debug, PartialEq, Eq, Serialize)]
pub struct NegotiateResponse {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub counteroffer: Option<Decimal>,
}

#[derive(Debug, PartialEq, Eq, Serialize)]
pub struct NegotiateError {
    pub error: String,
}

pub fn router(service: Arc<NegotiationService>) -> Router {
    Router::new()
        .route("/negotiate", post(negotiate))
        .with_state(NegotiateState { service })
}

pub async fn negotiate(
    State(state): State<NegotiateState>,
    Json(request): Json<NegotiateRequest>,
) -> Result<(StatusCode, Json<NegotiateResponse>), (StatusCode, Json<NegotiateError>)> {
    let correlation_id = Uuid::new_v4().to_string();

    let offer = request
        .user_offer
        .as_ref()
        .and_then(Value::as_f64)
        .ok_or_else(|| reject(&correlation_id, &InputError::NonNumericOffer))?;
    let message = request.user_message.as_deref().unwrap_or("");

    let outcome = state
        .service
        .negotiate(request.user_id.as_deref(), offer, message)
        .await
        .map_err(|error| reject(&correlation_id, &error))?;

    info!(
        event_name = "api.negotiate.round",
        correlation_id,
        user_id = request.user_id.as_deref().unwrap_or("anonymous"),
        outcome = outcome_label(&outcome),
        "negotiation round completed"
    );

    Ok((
        StatusCode::OK,
        Json(NegotiateResponse {
            counteroffer: outcome.counteroffer(),
            message: match outcome {
                RoundOutcome::Accepted { message, .. }
                | RoundOutcome::Rejected { message, .. }
                | RoundOutcome::Countered { message, .. } => message,
            },
        }),
    ))
}

fn outcome_label(outcome: &RoundOutcome) -> &'static str {
    match outcome {
        RoundOutcome::Accepted { .. } => "accepted",
        RoundOutcome::Rejected { .. } => "rejected",
        RoundOutcome::Countered { formatter_degraded: false, .. } => "countered",
        RoundOutcome::Countered { formatter_degraded: true, .. } => "countered_degraded",
    }
}

fn reject(correlation_id: &str, error: &InputError) -> (StatusCode, Json<NegotiateError>) {
    info!(
        event_name = "api.negotiate.invalid_input",
        correlation_id,
        error = %error,
        "negotiation request refused"
    );
    (StatusCode::BAD_REQUEST, Json(NegotiateError { error: error.user_message().to_owned() }))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::extract::State;
    use axum::http::StatusCode;
    use axum::Json;
    use haggle_agent::sentiment::NeutralSentiment;
    use haggle_core::negotiation::discount::DiscountSchedule;
    use haggle_core::{NegotiationService, TemplateFormatter, Terms};
    use rust_decimal::Decimal;
    use serde_json::json;

    use super::{negotiate, NegotiateRequest, NegotiateState};

    fn state() -> NegotiateState {
        NegotiateState {
            service: Arc::new(NegotiationService::new(
                Terms::default(),
                DiscountSchedule::default(),
                Arc::new(NeutralSentiment),
                Arc::new(TemplateFormatter),
            )),
        }
    }

    fn request(offer: serde_json::Value, message: Option<&str>, user: Option<&str>) -> NegotiateRequest {
        NegotiateRequest {
            user_offer: Some(offer),
            user_message: message.map(str::to_owned),
            user_id: user.map(str::to_owned),
        }
    }

    // Neutral sentiment scores 0.0, so every round runs with the low-tier
    // discount of 5 and a final price of 95.

    #[tokio::test]
    async fn accepted_offer_returns_the_deal_message_without_a_counteroffer() {
        let (status, Json(body)) =
            negotiate(State(state()), Json(request(json!(95), Some("sounds good"), Some("u-1"))))
                .await
                .expect("valid round should succeed");

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.message, "Deal accepted at $95!");
        assert_eq!(body.counteroffer, None);
    }

    #[tokio::test]
    async fn low_offer_is_rejected_with_the_floor_counter() {
        let (status, Json(body)) =
            negotiate(State(state()), Json(request(json!(40), Some("final offer"), Some("u-1"))))
                .await
                .expect("valid round should succeed");

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.message, "Offer too low, unable to accept.");
        assert_eq!(body.counteroffer, Some(Decimal::from(50)));
    }

    #[tokio::test]
    async fn negotiable_offer_is_countered_with_the_template_message() {
        let (status, Json(body)) =
            negotiate(State(state()), Json(request(json!(70), Some("can you go lower"), Some("u-1"))))
                .await
                .expect("valid round should succeed");

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.message, "Counteroffer: $95.");
        assert_eq!(body.counteroffer, Some(Decimal::from(95)));
    }

    #[tokio::test]
    async fn non_numeric_offer_is_refused_without_touching_state() {
        let state = state();
        let error = negotiate(
            State(state.clone()),
            Json(request(json!("abc"), Some("hello"), Some("u-1"))),
        )
        .await
        .err()
        .expect("string offer must be refused");

        assert_eq!(error.0, StatusCode::BAD_REQUEST);
        assert_eq!(
            error.1 .0.error,
            "Invalid input. Please provide a numeric value for user offer."
        );
        assert_eq!(state.service.store().session_count(), 0);
    }

    #[tokio::test]
    async fn missing_message_is_refused() {
        let error = negotiate(State(state()), Json(request(json!(70), None, Some("u-1"))))
            .await
            .err()
            .expect("missing message must be refused");

        assert_eq!(error.0, StatusCode::BAD_REQUEST);
        assert_eq!(error.1 .0.error, "Invalid input. Please provide a message to analyze.");
    }

    #[tokio::test]
    async fn missing_user_id_keeps_anonymous_continuity() {
        let state = state();

        let (_, Json(first)) =
            negotiate(State(state.clone()), Json(request(json!(70), Some("round one"), None)))
                .await
                .expect("valid round should succeed");
        assert_eq!(first.counteroffer, Some(Decimal::from(95)));

        // Reference moved to 95; next final price is 90.
        let (_, Json(second)) =
            negotiate(State(state.clone()), Json(request(json!(80), Some("round two"), None)))
                .await
                .expect("valid round should succeed");
        assert_eq!(second.counteroffer, Some(Decimal::from(90)));
        assert_eq!(state.service.store().session_count(), 1);
    }
}
