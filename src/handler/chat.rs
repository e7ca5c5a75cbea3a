//! Chat-completion proxy endpoint
//!
//! `POST /api/chat` with `{messages, model?}` is forwarded to the configured
//! upstream. Failure classes map to distinct statuses: 405 wrong method, 501 no
//! credential, 413 oversized body, mirrored upstream status, 500 transport error.

use crate::chat::{extract_completion_text, ChatReply, ChatRequest, CompletionRequest};
use crate::config::AppState;
use crate::http::{self, HttpResponse};
use crate::logger;
use http_body_util::{BodyExt, LengthLimitError, Limited};
use hyper::body::{Body, Bytes};
use hyper::header::{HeaderMap, HeaderValue, ALLOW, CONTENT_LENGTH};
use hyper::{Method, Request, StatusCode};
use serde_json::json;

/// Message returned for any failure reaching the upstream
const PROXY_ERROR: &str = "Chat proxy error";

pub async fn handle_chat<B>(req: Request<B>, state: &AppState) -> HttpResponse
where
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    if req.method() != Method::POST {
        return method_not_allowed();
    }

    let Some(api_key) = state.config.chat.api_key() else {
        return http::json_error(StatusCode::NOT_IMPLEMENTED, "AI not configured");
    };

    let max_body_size = state.config.http.max_body_size;
    if let Some(resp) = check_body_size(req.headers(), max_body_size) {
        return resp;
    }

    // Chunked or undeclared bodies are capped while reading
    let limit = usize::try_from(max_body_size).unwrap_or(usize::MAX);
    let body = match Limited::new(req.into_body(), limit).collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(e) if e.is::<LengthLimitError>() => {
            logger::log_warning(&format!(
                "Chat request body exceeded {max_body_size} bytes while reading"
            ));
            return http::build_413_response();
        }
        Err(e) => {
            logger::log_warning(&format!("Failed to read chat request body: {e}"));
            Bytes::new()
        }
    };

    let chat_request = ChatRequest::parse_lenient(&body);
    let completion = CompletionRequest::new(&chat_request, &state.config.chat);
    logger::log_debug(&format!(
        "[CHAT] Forwarding {} message(s) to model {}",
        chat_request.message_count(),
        completion.model
    ));

    let reply = match state.upstream.complete(api_key, &completion).await {
        Ok(reply) => reply,
        Err(err) => {
            logger::log_chat_failure(&err);
            return http::json_error(StatusCode::INTERNAL_SERVER_ERROR, PROXY_ERROR);
        }
    };

    if !reply.is_success() {
        logger::log_chat_upstream_status(reply.status, completion.model);
        let status = StatusCode::from_u16(reply.status).unwrap_or(StatusCode::BAD_GATEWAY);
        return http::json_response(status, &json!({ "error": reply.error_payload() }));
    }

    http::json_response(
        StatusCode::OK,
        &ChatReply {
            text: extract_completion_text(&reply.body),
            provider: &state.config.chat.provider,
            model: completion.model,
        },
    )
}

fn method_not_allowed() -> HttpResponse {
    let mut response = http::json_error(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed");
    response
        .headers_mut()
        .insert(ALLOW, HeaderValue::from_static("POST"));
    response
}

/// Return 413 if the declared Content-Length exceeds `max_body_size`
fn check_body_size(headers: &HeaderMap, max_body_size: u64) -> Option<HttpResponse> {
    let declared = headers.get(CONTENT_LENGTH)?;
    let Some(size) = declared.to_str().ok().and_then(|s| s.parse::<u64>().ok()) else {
        logger::log_warning(&format!(
            "Invalid Content-Length value: {declared:?}, skipping size check"
        ));
        return None;
    };
    if size > max_body_size {
        logger::log_warning(&format!(
            "Chat request body too large: {size} bytes (max: {max_body_size})"
        ));
        return Some(http::build_413_response());
    }
    None
}
