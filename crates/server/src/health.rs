use std::sync::Arc;

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use chrono::Utc;
use haggle_core::NegotiationService;
use serde::Serialize;
use tracing::{error, info};

#[derive(Clone)]
pub struct HealthState {
    service: Arc<NegotiationService>,
    formatter_mode: &'static str,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub detail: String,
    pub formatter_mode: &'static str,
    pub live_sessions: usize,
    pub checked_at: String,
}

pub fn router(service: Arc<NegotiationService>, formatter_mode: &'static str) -> Router {
    Router::new()
        .route("/health", get(health))
        .with_state(HealthState { service, formatter_mode })
}

pub async fn spawn(
    bind_address: &str,
    port: u16,
    service: Arc<NegotiationService>,
    formatter_mode: &'static str,
) -> std::io::Result<()> {
    let address = format!("{bind_address}:{port}");
    let listener = tokio::net::TcpListener::bind(&address).await?;

    info!(
        event_name = "system.health.start",
        correlation_id = "bootstrap",
        bind_address = %address,
        "health endpoint started"
    );

    tokio::spawn(async move {
        if let Err(error) = axum::serve(listener, router(service, formatter_mode)).await {
            error!(
                event_name = "system.health.error",
                correlation_id = "bootstrap",
                error = %error,
                "health endpoint server terminated unexpectedly"
            );
        }
    });

    Ok(())
}

pub async fn health(State(state): State<HealthState>) -> (StatusCode, Json<HealthResponse>) {
    let payload = HealthResponse {
        status: "ready",
        detail: "haggle-server runtime initialized".to_string(),
        formatter_mode: state.formatter_mode,
        live_sessions: state.service.store().session_count(),
        checked_at: Utc::now().to_rfc3339(),
    };

    (StatusCode::OK, Json(payload))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{extract::State, http::StatusCode, Json};
    use haggle_agent::sentiment::NeutralSentiment;
    use haggle_core::negotiation::discount::DiscountSchedule;
    use haggle_core::{NegotiationService, TemplateFormatter, Terms};

    use crate::health::{health, HealthState};

    fn service() -> Arc<NegotiationService> {
        Arc::new(NegotiationService::new(
            Terms::default(),
            DiscountSchedule::default(),
            Arc::new(NeutralSentiment),
            Arc::new(TemplateFormatter),
        ))
    }

    #[tokio::test]
    async fn health_reports_ready_with_session_count() {
        let service = service();
        service
            .negotiate(Some("u-1"), 70.0, "any room to move?")
            .await
            .expect("round should succeed");

        let (status, Json(payload)) =
            health(State(HealthState { service, formatter_mode: "template" })).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(payload.status, "ready");
        assert_eq!(payload.formatter_mode, "template");
        assert_eq!(payload.live_sessions, 1);
    }
}
