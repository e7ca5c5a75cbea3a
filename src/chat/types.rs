use serde::Serialize;
use serde_json::Value;

use crate::config::ChatConfig;

/// Body accepted on the chat endpoint
#[derive(Debug)]
pub struct ChatRequest {
    /// Conversation messages, forwarded untouched
    pub messages: Value,
    pub model: Option<String>,
}

impl Default for ChatRequest {
    fn default() -> Self {
        Self {
            messages: Value::Array(Vec::new()),
            model: None,
        }
    }
}

impl ChatRequest {
    /// Parse a request body, treating anything unreadable as an empty request.
    ///
    /// Each field is read on its own: a `model` that is not a string falls back
    /// to the default without dropping `messages`.
    pub fn parse_lenient(body: &[u8]) -> Self {
        let Ok(Value::Object(mut fields)) = serde_json::from_slice::<Value>(body) else {
            return Self::default();
        };
        let messages = fields
            .remove("messages")
            .unwrap_or_else(|| Value::Array(Vec::new()));
        let model = match fields.remove("model") {
            Some(Value::String(model)) => Some(model),
            _ => None,
        };
        Self { messages, model }
    }

    /// Number of messages when `messages` is an array
    pub fn message_count(&self) -> usize {
        self.messages.as_array().map_or(0, Vec::len)
    }

    /// Model to request, falling back to the configured default
    pub fn model_or<'a>(&'a self, default_model: &'a str) -> &'a str {
        self.model.as_deref().unwrap_or(default_model)
    }
}

/// Payload sent to the upstream chat-completions endpoint
#[derive(Debug, Serialize)]
pub struct CompletionRequest<'a> {
    pub model: &'a str,
    pub messages: &'a Value,
    pub temperature: f64,
    pub max_tokens: u32,
}

impl<'a> CompletionRequest<'a> {
    pub fn new(request: &'a ChatRequest, config: &'a ChatConfig) -> Self {
        Self {
            model: request.model_or(&config.default_model),
            messages: &request.messages,
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        }
    }
}

/// What the upstream answered: its status and the decoded JSON body
#[derive(Debug)]
pub struct UpstreamReply {
    pub status: u16,
    pub body: Value,
}

impl UpstreamReply {
    /// Only 2xx counts; redirects are followed by the client before this point
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }

    /// Error payload to relay: the upstream `error` field, or the whole body
    pub fn error_payload(self) -> Value {
        match self.body {
            Value::Object(mut map) if map.contains_key("error") => {
                map.remove("error").unwrap_or(Value::Null)
            }
            other => other,
        }
    }
}

/// Successful reply of the chat endpoint
#[derive(Debug, Serialize)]
pub struct ChatReply<'a> {
    pub text: String,
    pub provider: &'a str,
    pub model: &'a str,
}
