//! Axum route handlers for the mint gate.
//!
//! Two endpoints carry the whole flow: checkout answers every request with
//! an HTTP 402 payment challenge, and notify verifies the presented
//! payment proof before authorizing the mint. The handlers stay thin; the
//! sequencing and error taxonomy live in [`mintgate::gate`].

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use mintgate::challenge::{ChallengeConfig, build_challenge};
use mintgate::gate::{MintGate, NotifyRequest};
use mintgate::payment::MintOutcome;

use crate::error::GateHttpError;

/// Path of the checkout endpoint.
pub const CHECKOUT_PATH: &str = "/api/nft/checkout";

/// Path of the notify endpoint, also the challenge's resource.
pub const NOTIFY_PATH: &str = "/api/nft/notify";

/// Shared application state.
pub struct AppState {
    /// The payment-to-mint coordinator.
    pub gate: MintGate,
    /// Static pricing for the challenge body.
    pub challenge: ChallengeConfig,
    /// Public base URL; request headers are the fallback when unset.
    pub public_url: Option<String>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("public_url", &self.public_url)
            .finish_non_exhaustive()
    }
}

/// Shared state handle for the router.
pub type GateState = Arc<AppState>;

/// The notify success body.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotifyResponse {
    /// Always `true` on success.
    pub ok: bool,
    /// Checksummed recipient of the mint.
    pub to: String,
    /// Number of tokens minted.
    pub qty: u64,
    /// Hash of the confirmed mint transaction.
    pub mint_tx: String,
}

impl From<MintOutcome> for NotifyResponse {
    fn from(outcome: MintOutcome) -> Self {
        Self {
            ok: true,
            to: outcome.to.to_checksum(None),
            qty: outcome.qty,
            mint_tx: format!("{:#x}", outcome.tx_hash),
        }
    }
}

/// `GET|POST /api/nft/checkout` — Emits the 402 payment challenge.
///
/// The body is rebuilt per request from static configuration; a
/// misconfigured payee is a 500, never an invalid challenge.
pub async fn checkout(State(state): State<GateState>, headers: HeaderMap) -> Response {
    let resource = notify_resource_url(state.public_url.as_deref(), &headers);
    match build_challenge(&state.challenge, &resource) {
        Ok(body) => (StatusCode::PAYMENT_REQUIRED, Json(body)).into_response(),
        Err(err) => {
            tracing::error!(error = %err, "cannot build payment challenge");
            let body = serde_json::json!({ "error": err.to_string() });
            (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
        }
    }
}

/// `POST /api/nft/notify` — Verifies the payment proof and mints.
///
/// # Errors
///
/// Returns 400 for validation failures and unverified payments, 503 when
/// the chain cannot be queried, and 500 when the mint is rejected.
pub async fn notify(
    State(state): State<GateState>,
    Json(request): Json<NotifyRequest>,
) -> Result<Json<NotifyResponse>, GateHttpError> {
    let outcome = state.gate.fulfill(&request).await?;
    Ok(Json(NotifyResponse::from(outcome)))
}

/// Health check endpoint.
pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Resolves the absolute URL of the notify endpoint.
///
/// Prefers the configured public base URL; otherwise reconstructs the
/// origin from the `x-forwarded-proto` and `host` request headers.
fn notify_resource_url(public_url: Option<&str>, headers: &HeaderMap) -> String {
    let base = public_url.map_or_else(
        || {
            let proto = headers
                .get("x-forwarded-proto")
                .and_then(|value| value.to_str().ok())
                .unwrap_or("https");
            let host = headers
                .get(header::HOST)
                .and_then(|value| value.to_str().ok())
                .unwrap_or("localhost");
            format!("{proto}://{host}")
        },
        |url| url.trim_end_matches('/').to_owned(),
    );
    format!("{base}{NOTIFY_PATH}")
}

/// Creates the gate's [`axum::Router`].
///
/// Endpoints:
/// - `GET|HEAD|POST /api/nft/checkout` — 402 payment challenge
/// - `POST /api/nft/notify` — payment proof and mint authorization
/// - `GET /health` — liveness probe
pub fn gate_router(state: GateState) -> axum::Router {
    axum::Router::new()
        .route(
            CHECKOUT_PATH,
            axum::routing::get(checkout).post(checkout),
        )
        .route(NOTIFY_PATH, axum::routing::post(notify))
        .route("/health", axum::routing::get(health))
        .with_state(state)
}
