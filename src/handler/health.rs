use crate::config::AppState;
use crate::http::{self, HttpResponse};
use hyper::StatusCode;
use serde::Serialize;

#[derive(Serialize)]
struct HealthStatus {
    ok: bool,
    /// Whether the chat proxy has a credential
    ai: bool,
}

/// Liveness probe, always 200
pub fn handle_health(state: &AppState) -> HttpResponse {
    http::json_response(
        StatusCode::OK,
        &HealthStatus {
            ok: true,
            ai: state.config.chat.is_configured(),
        },
    )
}
