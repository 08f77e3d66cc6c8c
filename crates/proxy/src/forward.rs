use std::{sync::Arc, time::Instant};

use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderValue, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde_json::Value;
use shared::protocol::{ResponseBody, RsvpAck, JSON_CONTENT_TYPE, RSVP_ROUTE};
use tower_http::{
    limit::RequestBodyLimitLayer, set_header::SetResponseHeaderLayer, trace::TraceLayer,
};
use tracing::{error, info, warn};

use crate::app_state::AppState;

const MAX_RSVP_BODY_BYTES: usize = 64 * 1024;
const INVALID_PAYLOAD: &str = "Invalid RSVP payload";
const PROXY_FAILED: &str = "RSVP proxy failed";

pub(crate) fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route(
            RSVP_ROUTE,
            post(forward_rsvp)
                .options(preflight)
                .fallback(method_not_allowed),
        )
        .layer(RequestBodyLimitLayer::new(MAX_RSVP_BODY_BYTES))
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static("*"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static("POST, OPTIONS"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static("Content-Type"),
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn healthz() -> &'static str {
    "ok"
}

async fn preflight() -> StatusCode {
    StatusCode::NO_CONTENT
}

async fn method_not_allowed() -> impl IntoResponse {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        [(header::ALLOW, "POST, OPTIONS")],
        Json(RsvpAck::rejected("Method Not Allowed")),
    )
}

async fn forward_rsvp(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> (StatusCode, Json<RsvpAck>) {
    if !is_valid_rsvp(&body) {
        info!(bytes = body.len(), "proxy: rejected invalid rsvp payload");
        return (StatusCode::BAD_REQUEST, Json(RsvpAck::rejected(INVALID_PAYLOAD)));
    }

    let started = Instant::now();
    match relay(&state, body).await {
        Ok(Relayed::Accepted) => {
            info!(elapsed = ?started.elapsed(), "proxy: rsvp relayed");
            (StatusCode::OK, Json(RsvpAck::accepted()))
        }
        Ok(Relayed::Rejected { status, message }) => {
            warn!(status = status.as_u16(), %message, "proxy: upstream rejected rsvp");
            (status, Json(RsvpAck::rejected(message)))
        }
        Err(err) => {
            error!(%err, upstream = %state.target_url, "proxy: upstream request failed");
            (StatusCode::BAD_GATEWAY, Json(RsvpAck::rejected(PROXY_FAILED)))
        }
    }
}

enum Relayed {
    Accepted,
    Rejected { status: StatusCode, message: String },
}

/// Posts the body to the backend unchanged and interprets its answer.
async fn relay(state: &AppState, body: Bytes) -> Result<Relayed, reqwest::Error> {
    let response = state
        .http
        .post(&state.target_url)
        .header(header::CONTENT_TYPE, JSON_CONTENT_TYPE)
        .body(body)
        .send()
        .await?;

    let status = response.status();
    if status.is_success() {
        return Ok(Relayed::Accepted);
    }

    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_string();
    let upstream = match response.bytes().await {
        Ok(bytes) => ResponseBody::from_bytes(&content_type, &bytes),
        Err(_) => None,
    };
    let message = upstream
        .and_then(|body| body.message(&["error"]))
        .unwrap_or_else(|| format!("Upstream error ({})", status.as_u16()));

    Ok(Relayed::Rejected { status, message })
}

/// Name and attending must be non-blank strings, guests a finite number
/// (numeric strings accepted).
fn is_valid_rsvp(body: &[u8]) -> bool {
    let Ok(value) = serde_json::from_slice::<Value>(body) else {
        return false;
    };
    let rsvp = &value["rsvp"];
    let filled = |field: &str| {
        rsvp[field]
            .as_str()
            .is_some_and(|text| !text.trim().is_empty())
    };
    let guests_ok = match &rsvp["guests"] {
        Value::Number(n) => n.as_f64().is_some_and(f64::is_finite),
        Value::String(text) => text.trim().parse::<f64>().is_ok_and(f64::is_finite),
        _ => false,
    };
    filled("name") && filled("attending") && guests_ok
}

#[cfg(test)]
#[path = "tests/forward_tests.rs"]
mod tests;
