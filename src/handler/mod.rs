//! Request handler module
//!
//! Routes requests to the health probe, the chat-completion proxy, or the
//! static asset resolver.

pub mod chat;
pub mod health;
pub mod router;
pub mod static_files;

#[cfg(test)]
pub(crate) mod test_support;

// Re-export main entry point
pub use router::handle_request;
