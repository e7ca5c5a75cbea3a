//! SPA relay
//!
//! Serves a built single-page application with history-API fallback and
//! relays chat-completion requests to an OpenAI-compatible upstream so the
//! API key never reaches the browser.

pub mod chat;
pub mod config;
pub mod handler;
pub mod http;
pub mod logger;
pub mod server;
