//! Static file serving module
//!
//! Resolves request paths under the asset root with directory-index and
//! single-page-application fallback, then answers with the file's bytes.

use crate::config::AppState;
use crate::http::{self, cache, mime, HttpResponse};
use crate::logger;
use hyper::body::Bytes;
use percent_encoding::percent_decode_str;
use std::path::{Path, PathBuf};
use tokio::fs;

/// What the asset handler needs from a request
pub struct RequestContext {
    pub path: String,
    pub is_head: bool,
    pub if_none_match: Option<String>,
}

/// Serve the asset a request path resolves to
pub async fn serve_asset(ctx: &RequestContext, state: &AppState) -> HttpResponse {
    let target =
        resolve_asset_path(&state.asset_root, &state.config.assets.index_file, &ctx.path).await;

    // The file can disappear between resolution and reading
    let content = match fs::read(&target).await {
        Ok(c) => c,
        Err(e) => {
            logger::log_warning(&format!(
                "Failed to read asset '{}': {e}",
                target.display()
            ));
            return http::build_404_response();
        }
    };

    let etag = cache::generate_etag(&content);
    if cache::check_etag_match(ctx.if_none_match.as_deref(), &etag) {
        return http::build_304_response(&etag);
    }

    http::build_asset_response(
        Bytes::from(content),
        mime::content_type_for(&target),
        &etag,
        ctx.is_head,
    )
}

/// Map a request path to a file under `root`.
///
/// `root` must already be canonical. The result is always `root` itself or a
/// descendant of it: traversal attempts, unknown routes and directories without
/// an index all end at `root/<index_file>`.
pub async fn resolve_asset_path(root: &Path, index_file: &str, request_path: &str) -> PathBuf {
    let fallback = root.join(index_file);

    let Ok(decoded) = percent_decode_str(request_path).decode_utf8() else {
        return fallback;
    };
    let relative = decoded.trim_start_matches(['/', '\\']);
    let relative = if relative.is_empty() { index_file } else { relative };

    // Missing paths fail to canonicalize; they get the app shell like any unknown route
    let Some(target) = canonical_within(root, &root.join(relative), request_path).await else {
        return fallback;
    };
    if !is_dir(&target).await {
        return target;
    }

    // The directory index is resolved again: it may itself link out of the root
    canonical_within(root, &target.join(index_file), request_path)
        .await
        .unwrap_or(fallback)
}

/// Canonical form of `path` if it exists and lies under `root`
async fn canonical_within(root: &Path, path: &Path, request_path: &str) -> Option<PathBuf> {
    let canonical = fs::canonicalize(path).await.ok()?;
    if canonical.starts_with(root) {
        return Some(canonical);
    }
    logger::log_warning(&format!(
        "Path traversal attempt blocked: {request_path} -> {}",
        canonical.display()
    ));
    None
}

async fn is_dir(path: &Path) -> bool {
    fs::metadata(path).await.is_ok_and(|m| m.is_dir())
}
