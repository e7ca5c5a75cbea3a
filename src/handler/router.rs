//! Request routing dispatch module
//!
//! Entry point for HTTP request processing: exact-path routing to the health
//! and chat endpoints, everything else to the asset handler, plus access logging.

use crate::config::AppState;
use crate::handler::static_files::{self, RequestContext};
use crate::handler::{chat, health};
use crate::http::{self, response::ASSET_METHODS, HttpResponse};
use crate::logger::{self, AccessLogEntry};
use hyper::body::Body;
use hyper::header::{HeaderName, HeaderValue, IF_NONE_MATCH, REFERER, SERVER, USER_AGENT};
use hyper::{Method, Request, Version};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

pub const HEALTH_PATH: &str = "/health";
pub const CHAT_PATH: &str = "/api/chat";

/// Where a request path is dispatched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Route {
    Health,
    Chat,
    Asset,
}

impl Route {
    fn for_path(path: &str) -> Self {
        match path {
            HEALTH_PATH => Self::Health,
            CHAT_PATH => Self::Chat,
            _ => Self::Asset,
        }
    }
}

/// Main entry point for HTTP request handling
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    remote_addr: SocketAddr,
) -> Result<HttpResponse, Infallible>
where
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let started = Instant::now();
    let access_entry = state
        .config
        .logging
        .access_log
        .then(|| new_access_entry(&req, remote_addr));

    let route = Route::for_path(req.uri().path());
    let mut response = match route {
        Route::Health => health::handle_health(&state),
        Route::Chat => chat::handle_chat(req, &state).await,
        Route::Asset => match asset_context(&req, &state) {
            Ok(ctx) => static_files::serve_asset(&ctx, &state).await,
            Err(early) => early,
        },
    };

    if let Ok(server_name) = HeaderValue::from_str(&state.config.http.server_name) {
        response.headers_mut().insert(SERVER, server_name);
    }

    if let Some(mut entry) = access_entry {
        entry.status = response.status().as_u16();
        entry.body_bytes = response.body().size_hint().exact().unwrap_or(0);
        entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
        logger::log_access(&entry, &state.config.logging.access_log_format);
    }

    Ok(response)
}

/// Check the method and collect what the asset handler needs,
/// or answer directly for methods that never reach it
fn asset_context<B>(req: &Request<B>, state: &AppState) -> Result<RequestContext, HttpResponse> {
    let method = req.method();
    match *method {
        Method::GET | Method::HEAD => {}
        Method::OPTIONS => {
            return Err(http::build_options_response(
                ASSET_METHODS,
                state.config.http.enable_cors,
            ))
        }
        _ => {
            logger::log_warning(&format!(
                "Method not allowed: {method} {}",
                req.uri().path()
            ));
            return Err(http::build_405_response());
        }
    }

    Ok(RequestContext {
        path: req.uri().path().to_string(),
        is_head: *method == Method::HEAD,
        if_none_match: req
            .headers()
            .get(IF_NONE_MATCH)
            .and_then(|v| v.to_str().ok())
            .map(ToString::to_string),
    })
}

fn new_access_entry<B>(req: &Request<B>, remote_addr: SocketAddr) -> AccessLogEntry {
    let header = |name: HeaderName| {
        req.headers()
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(ToString::to_string)
    };

    let mut entry = AccessLogEntry::new(
        remote_addr.ip().to_string(),
        req.method().to_string(),
        req.uri().path().to_string(),
    );
    entry.query = req.uri().query().map(ToString::to_string);
    entry.http_version = http_version_label(req.version()).to_string();
    entry.referer = header(REFERER);
    entry.user_agent = header(USER_AGENT);
    entry
}

fn http_version_label(version: Version) -> &'static str {
    match version {
        Version::HTTP_09 => "0.9",
        Version::HTTP_10 => "1.0",
        Version::HTTP_2 => "2",
        Version::HTTP_3 => "3",
        _ => "1.1",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ChatConfig;
    use crate::handler::test_support::{asset_tree, send, send_with_headers, test_state};
    use hyper::header::{CONTENT_LENGTH, CONTENT_TYPE, ETAG};
    use hyper::StatusCode;
    use serde_json::json;

    #[test]
    fn test_route_for_path() {
        assert_eq!(Route::for_path("/health"), Route::Health);
        assert_eq!(Route::for_path("/api/chat"), Route::Chat);
        assert_eq!(Route::for_path("/api/chat/"), Route::Asset);
        assert_eq!(Route::for_path("/healthz"), Route::Asset);
        assert_eq!(Route::for_path("/"), Route::Asset);
    }

    #[tokio::test]
    async fn test_health_reports_ai_flag() {
        let tree = asset_tree();

        let off = test_state(&tree.root, ChatConfig::default());
        let resp = send(&off, Method::GET, "/health", "").await;
        assert_eq!(resp.status, StatusCode::OK);
        assert_eq!(resp.json(), json!({"ok": true, "ai": false}));

        let on = test_state(
            &tree.root,
            ChatConfig {
                api_key: Some("key".to_string()),
                ..ChatConfig::default()
            },
        );
        let resp = send(&on, Method::GET, "/health", "").await;
        assert_eq!(resp.json(), json!({"ok": true, "ai": true}));
    }

    #[tokio::test]
    async fn test_serves_asset_with_content_type() {
        let tree = asset_tree();
        let state = test_state(&tree.root, ChatConfig::default());

        let resp = send(&state, Method::GET, "/assets/app.js", "").await;
        assert_eq!(resp.status, StatusCode::OK);
        assert_eq!(resp.headers[CONTENT_TYPE], "text/javascript");
        assert_eq!(&resp.body[..], b"console.log('app');");
        assert_eq!(resp.headers[SERVER], state.config.http.server_name.as_str());
    }

    #[tokio::test]
    async fn test_unknown_extension_is_octet_stream() {
        let tree = asset_tree();
        let state = test_state(&tree.root, ChatConfig::default());

        let resp = send(&state, Method::GET, "/data.bin9", "").await;
        assert_eq!(resp.status, StatusCode::OK);
        assert_eq!(resp.headers[CONTENT_TYPE], "application/octet-stream");
    }

    #[tokio::test]
    async fn test_unknown_route_is_identical_to_index() {
        let tree = asset_tree();
        let state = test_state(&tree.root, ChatConfig::default());

        let index = send(&state, Method::GET, "/index.html", "").await;
        for path in ["/", "/settings/profile", "/assets/gone.css", "/../secret.txt", "/%2e%2e/secret.txt"] {
            let resp = send(&state, Method::GET, path, "").await;
            assert_eq!(resp.status, StatusCode::OK, "{path}");
            assert_eq!(resp.body, index.body, "{path}");
            assert_eq!(resp.headers[CONTENT_TYPE], "text/html; charset=utf-8");
        }
    }

    #[tokio::test]
    async fn test_directory_is_identical_to_its_index() {
        let tree = asset_tree();
        let state = test_state(&tree.root, ChatConfig::default());

        let direct = send(&state, Method::GET, "/docs/index.html", "").await;
        let dir = send(&state, Method::GET, "/docs", "").await;
        assert_eq!(dir.status, StatusCode::OK);
        assert_eq!(dir.body, direct.body);
    }

    #[tokio::test]
    async fn test_head_has_headers_without_body() {
        let tree = asset_tree();
        let state = test_state(&tree.root, ChatConfig::default());

        let resp = send(&state, Method::HEAD, "/assets/app.js", "").await;
        assert_eq!(resp.status, StatusCode::OK);
        assert!(resp.body.is_empty());
        assert_eq!(resp.headers[CONTENT_LENGTH], "19");
    }

    #[tokio::test]
    async fn test_etag_revalidation() {
        let tree = asset_tree();
        let state = test_state(&tree.root, ChatConfig::default());

        let first = send(&state, Method::GET, "/assets/app.js", "").await;
        let etag = first.headers[ETAG].to_str().unwrap().to_string();

        let again = send_with_headers(
            &state,
            Method::GET,
            "/assets/app.js",
            &[("if-none-match", etag.as_str())],
            "",
        )
        .await;
        assert_eq!(again.status, StatusCode::NOT_MODIFIED);
        assert!(again.body.is_empty());
    }

    #[tokio::test]
    async fn test_missing_index_is_404() {
        let tree = asset_tree();
        std::fs::remove_file(tree.root.join("index.html")).unwrap();
        let state = test_state(&tree.root, ChatConfig::default());

        let resp = send(&state, Method::GET, "/anything", "").await;
        assert_eq!(resp.status, StatusCode::NOT_FOUND);
        assert_eq!(&resp.body[..], b"Not found");
        assert!(resp.headers[CONTENT_TYPE]
            .to_str()
            .unwrap()
            .starts_with("text/plain"));
    }

    #[tokio::test]
    async fn test_asset_methods() {
        let tree = asset_tree();
        let state = test_state(&tree.root, ChatConfig::default());

        let options = send(&state, Method::OPTIONS, "/index.html", "").await;
        assert_eq!(options.status, StatusCode::NO_CONTENT);
        assert_eq!(options.headers[hyper::header::ALLOW], ASSET_METHODS);

        let post = send(&state, Method::POST, "/index.html", "x").await;
        assert_eq!(post.status, StatusCode::METHOD_NOT_ALLOWED);
    }

    #[test]
    fn test_http_version_label() {
        assert_eq!(http_version_label(Version::HTTP_10), "1.0");
        assert_eq!(http_version_label(Version::HTTP_11), "1.1");
        assert_eq!(http_version_label(Version::HTTP_2), "2");
    }

    #[test]
    fn test_access_entry_fields() {
        let req = Request::builder()
            .method(Method::GET)
            .uri("/assets/app.js?v=3")
            .header(USER_AGENT, "curl/8.5")
            .body(())
            .unwrap();
        let entry = new_access_entry(&req, "10.0.0.7:5123".parse().unwrap());
        assert_eq!(entry.remote_addr, "10.0.0.7");
        assert_eq!(entry.path, "/assets/app.js");
        assert_eq!(entry.query.as_deref(), Some("v=3"));
        assert_eq!(entry.user_agent.as_deref(), Some("curl/8.5"));
        assert_eq!(entry.referer, None);
    }
}
