//! MIME type detection module
//!
//! Guesses the Content-Type of a served asset from its file extension.

use std::path::Path;

/// Returned when the extension is missing or unknown
pub const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

/// Get MIME Content-Type for a file path, ignoring extension case
///
/// # Examples
/// ```
/// use std::path::Path;
/// use spa_relay::http::mime::content_type_for;
/// assert_eq!(content_type_for(Path::new("web/index.html")), "text/html; charset=utf-8");
/// assert_eq!(content_type_for(Path::new("web/assets/app.JS")), "text/javascript");
/// assert_eq!(content_type_for(Path::new("web/LICENSE")), "application/octet-stream");
/// ```
pub fn content_type_for(path: &Path) -> &'static str {
    path.extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .and_then(|ext| guess_by_extension(&ext))
        .unwrap_or(FALLBACK_CONTENT_TYPE)
}

fn guess_by_extension(extension: &str) -> Option<&'static str> {
    let content_type = match extension {
        // Documents of the app shell
        "html" | "htm" => "text/html; charset=utf-8",
        "css" => "text/css",
        "txt" => "text/plain; charset=utf-8",
        "md" => "text/markdown",
        "csv" => "text/csv",
        "xml" => "application/xml",

        // Scripts and data
        "js" | "mjs" => "text/javascript",
        "json" | "map" => "application/json",
        "webmanifest" => "application/manifest+json",
        "wasm" => "application/wasm",

        // Images
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "ico" => "image/vnd.microsoft.icon",
        "webp" => "image/webp",
        "avif" => "image/avif",

        // Media
        "mp4" => "video/mp4",
        "webm" => "video/webm",
        "mp3" => "audio/mpeg",
        "wav" => "audio/x-wav",
        "ogg" => "audio/ogg",

        // Fonts
        "woff" => "font/woff",
        "woff2" => "font/woff2",
        "ttf" => "font/ttf",
        "otf" => "font/otf",

        // Downloads
        "pdf" => "application/pdf",
        "zip" => "application/zip",

        _ => return None,
    };
    Some(content_type)
}
