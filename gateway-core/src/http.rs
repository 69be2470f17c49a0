//! Thin axum HTTP surface over [`crate::orchestrator::Orchestrator`]:
//! plain JSON submit/status bodies over `POST /payments` and
//! `GET /payments/:id`, plus `/health` and `/metrics`.

use crate::error::Error;
use crate::metrics::Metrics;
use crate::orchestrator::Orchestrator;
use axum::extract::{Path, State};
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use gateway_types::{AccountId, Bic, Currency, Payment, PaymentStatus};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    /// The façade handlers delegate to.
    pub orchestrator: Arc<Orchestrator>,
    /// Process metrics, exposed at `/metrics`.
    pub metrics: Arc<Metrics>,
}

/// Build the router: `POST /payments`, `GET /payments/:id`, `GET /health`,
/// `GET /metrics`.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/payments", post(submit_payment))
        .route("/payments/:id", get(get_payment_status))
        .route("/health", get(health))
        .route("/metrics", get(metrics_endpoint))
        .layer(tower_http::cors::CorsLayer::permissive())
        .with_state(state)
}

#[derive(Debug, Deserialize)]
struct SubmitPaymentRequest {
    amount: Decimal,
    currency: String,
    debtor_bank: String,
    creditor_bank: String,
    debtor_account: String,
    creditor_account: String,
    debtor_name: String,
    creditor_name: String,
    #[serde(default)]
    reference: String,
    #[serde(default)]
    subjects: Vec<String>,
}

#[derive(Debug, Serialize)]
struct SubmitPaymentResponse {
    payment_id: Uuid,
    status: String,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
struct PaymentResponse {
    payment_id: Uuid,
    status: String,
    amount: Decimal,
    currency: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<Payment> for PaymentResponse {
    fn from(payment: Payment) -> Self {
        Self {
            payment_id: payment.payment_id,
            status: payment.status.to_string(),
            amount: payment.amount,
            currency: payment.currency.code().to_string(),
            created_at: payment.created_at,
            updated_at: payment.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        tracing::warn!(error = %self, "request rejected");
        let status = StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let mut response = (status, Json(ErrorBody { error: self.to_string() })).into_response();
        if let Some(secs) = self.retry_after_secs() {
            if let Ok(value) = HeaderValue::from_str(&secs.to_string()) {
                response.headers_mut().insert(header::RETRY_AFTER, value);
            }
        }
        response
    }
}

fn build_payment(body: SubmitPaymentRequest) -> Result<Payment, Error> {
    let now = Utc::now();
    Ok(Payment {
        payment_id: Uuid::nil(),
        amount: body.amount,
        currency: Currency::new(body.currency),
        debtor_bank: Bic::parse(&body.debtor_bank).map_err(|e| Error::InvalidRequest(e.to_string()))?,
        creditor_bank: Bic::parse(&body.creditor_bank).map_err(|e| Error::InvalidRequest(e.to_string()))?,
        debtor_account: AccountId::new(body.debtor_account).map_err(|e| Error::InvalidRequest(e.to_string()))?,
        creditor_account: AccountId::new(body.creditor_account).map_err(|e| Error::InvalidRequest(e.to_string()))?,
        debtor_name: body.debtor_name,
        creditor_name: body.creditor_name,
        reference: body.reference,
        status: PaymentStatus::Initiated,
        created_at: now,
        updated_at: now,
    })
}

async fn submit_payment(
    State(state): State<AppState>,
    headers: axum::http::HeaderMap,
    Json(body): Json<SubmitPaymentRequest>,
) -> Result<Response, Error> {
    let idempotency_key = headers.get("Idempotency-Key").and_then(|v| v.to_str().ok());
    let subjects = body.subjects.clone();
    let payment = build_payment(body)?;

    let ack = state.orchestrator.submit_payment(payment, idempotency_key, &subjects, None).await?;

    let response = SubmitPaymentResponse {
        payment_id: ack.payment_id,
        status: ack.status.to_string(),
        created_at: Utc::now(),
    };
    Ok((StatusCode::CREATED, Json(response)).into_response())
}

async fn get_payment_status(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<Json<PaymentResponse>, Error> {
    let payment = state.orchestrator.get_payment_status(id).await?;
    Ok(Json(payment.into()))
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    service: &'static str,
    version: &'static str,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "healthy", service: "gateway-core", version: env!("CARGO_PKG_VERSION") })
}

async fn metrics_endpoint(State(state): State<AppState>) -> Result<String, Error> {
    state.metrics.render().map_err(|_| Error::Internal { stage: "metrics" })
}
