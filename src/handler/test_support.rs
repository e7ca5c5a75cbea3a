//! Fixtures shared by handler tests: a throwaway asset tree, state builders,
//! an in-process request driver and fake upstream servers.

use std::convert::Infallible;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use http_body_util::{BodyExt, Full};
use hyper::body::{Bytes, Incoming};
use hyper::header::{HeaderMap, AUTHORIZATION, CONTENT_TYPE};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Method, Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use serde_json::Value;
use tempfile::TempDir;
use tokio::net::TcpListener;

use crate::config::{AppState, ChatConfig, Config};
use crate::handler::handle_request;

/// `<tmp>/secret.txt` next to the asset root `<tmp>/web`
pub struct AssetTree {
    _dir: TempDir,
    /// Canonical asset root
    pub root: PathBuf,
}

impl AssetTree {
    pub fn outside_file(&self) -> PathBuf {
        self.root
            .parent()
            .expect("asset root has a parent")
            .join("secret.txt")
    }
}

pub fn asset_tree() -> AssetTree {
    let dir = tempfile::tempdir().expect("tempdir");
    let base = dir.path().canonicalize().expect("canonical tempdir");
    let root = base.join("web");

    let files: [(&str, &[u8]); 6] = [
        ("index.html", b"<!doctype html><div id=\"app\"></div>"),
        ("assets/app.js", b"console.log('app');"),
        ("assets/my file.txt", b"spaced"),
        ("docs/index.html", b"<h1>docs</h1>"),
        ("data.bin9", b"\x00\x01\x02"),
        ("../secret.txt", b"do not serve"),
    ];
    for (name, content) in files {
        let path = root.join(name);
        std::fs::create_dir_all(path.parent().expect("file has a parent")).expect("mkdir");
        std::fs::write(&path, content).expect("write fixture");
    }
    std::fs::create_dir_all(root.join("empty")).expect("mkdir empty");

    AssetTree { _dir: dir, root }
}

pub fn chat_config(api_url: &str, api_key: Option<&str>) -> ChatConfig {
    ChatConfig {
        api_key: api_key.map(ToString::to_string),
        api_url: api_url.to_string(),
        ..ChatConfig::default()
    }
}

pub fn test_state(asset_root: &Path, chat: ChatConfig) -> Arc<AppState> {
    test_state_with(asset_root, chat, |_| {})
}

/// Like [`test_state`], with a final adjustment of the config
pub fn test_state_with(
    asset_root: &Path,
    chat: ChatConfig,
    adjust: impl FnOnce(&mut Config),
) -> Arc<AppState> {
    let mut config = Config::default();
    config.assets.root = asset_root.to_string_lossy().into_owned();
    config.logging.access_log = false;
    config.chat = chat;
    adjust(&mut config);
    Arc::new(AppState::new(config).expect("app state"))
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl TestResponse {
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).expect("json body")
    }
}

pub async fn send(
    state: &Arc<AppState>,
    method: Method,
    uri: &str,
    body: &'static str,
) -> TestResponse {
    send_with_headers(state, method, uri, &[], body).await
}

pub async fn send_with_headers(
    state: &Arc<AppState>,
    method: Method,
    uri: &str,
    headers: &[(&str, &str)],
    body: &'static str,
) -> TestResponse {
    let mut builder = Request::builder().method(method).uri(uri);
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }
    let req = builder
        .body(Full::new(Bytes::from_static(body.as_bytes())))
        .expect("request");

    let response = handle_request(req, Arc::clone(state), "127.0.0.1:40000".parse().expect("addr"))
        .await
        .expect("infallible");
    let status = response.status();
    let headers = response.headers().clone();
    let body = response
        .into_body()
        .collect()
        .await
        .expect("infallible")
        .to_bytes();

    TestResponse {
        status,
        headers,
        body,
    }
}

#[derive(Debug, Clone)]
pub struct SeenRequest {
    pub authorization: Option<String>,
    pub body: Value,
}

pub struct FakeUpstream {
    pub url: String,
    seen: Arc<Mutex<Vec<SeenRequest>>>,
}

impl FakeUpstream {
    pub fn requests(&self) -> Vec<SeenRequest> {
        self.seen.lock().expect("lock").clone()
    }
}

/// Upstream that records every request and answers with a fixed status and body
pub async fn fake_upstream(status: u16, body: &'static str) -> FakeUpstream {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    let seen = Arc::new(Mutex::new(Vec::new()));
    let recorder = Arc::clone(&seen);

    tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            let recorder = Arc::clone(&recorder);
            tokio::spawn(async move {
                let service = service_fn(move |req: Request<Incoming>| {
                    let recorder = Arc::clone(&recorder);
                    async move {
                        let authorization = req
                            .headers()
                            .get(AUTHORIZATION)
                            .and_then(|v| v.to_str().ok())
                            .map(ToString::to_string);
                        let bytes = req
                            .into_body()
                            .collect()
                            .await
                            .map(http_body_util::Collected::to_bytes)
                            .unwrap_or_default();
                        let body_json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
                        recorder.lock().expect("lock").push(SeenRequest {
                            authorization,
                            body: body_json,
                        });

                        Ok::<_, Infallible>(
                            Response::builder()
                                .status(status)
                                .header(CONTENT_TYPE, "application/json")
                                .body(Full::new(Bytes::from_static(body.as_bytes())))
                                .expect("response"),
                        )
                    }
                });
                let _ = http1::Builder::new()
                    .serve_connection(TokioIo::new(stream), service)
                    .await;
            });
        }
    });

    FakeUpstream {
        url: format!("http://{addr}/v1/chat/completions"),
        seen,
    }
}

/// Upstream that accepts connections and never answers
pub async fn silent_upstream() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");

    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((stream, _)) = listener.accept().await {
            held.push(stream);
        }
    });

    format!("http://{addr}/v1/chat/completions")
}

/// URL of a local port with nothing listening on it
pub async fn closed_port_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    drop(listener);
    format!("http://{addr}/v1/chat/completions")
}
