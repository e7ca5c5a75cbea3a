//! Completion text extraction
//!
//! Providers answer in one of two shapes: chat style (`choices[0].message.content`)
//! or legacy completion style (`choices[0].text`). Strategies are tried in order and
//! the first non-empty string wins.

use serde_json::Value;

type Strategy = fn(&Value) -> Option<&str>;

const STRATEGIES: &[Strategy] = &[message_content, plain_text];

/// Pull the generated text out of an upstream response body, or `""` if none is found
pub fn extract_completion_text(body: &Value) -> String {
    STRATEGIES
        .iter()
        .find_map(|strategy| strategy(body).filter(|text| !text.is_empty()))
        .unwrap_or_default()
        .to_string()
}

fn first_choice(body: &Value) -> Option<&Value> {
    body.get("choices")?.as_array()?.first()
}

fn message_content(body: &Value) -> Option<&str> {
    first_choice(body)?.get("message")?.get("content")?.as_str()
}

fn plain_text(body: &Value) -> Option<&str> {
    first_choice(body)?.get("text")?.as_str()
}
