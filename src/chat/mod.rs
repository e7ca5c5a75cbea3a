//! Chat-completion proxy core
//!
//! Request/response types, the upstream client and the response-shape
//! normalization used by the `/api/chat` handler.

mod client;
mod error;
mod extract;
mod types;

pub use client::ChatUpstream;
pub use error::ChatError;
pub use extract::extract_completion_text;
pub use types::{ChatReply, ChatRequest, CompletionRequest, UpstreamReply};
