// Configuration types module
// Defines all configuration-related data structures

use serde::{Deserialize, Serialize};

/// Main configuration structure
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub performance: PerformanceConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub assets: AssetsConfig,
    #[serde(default)]
    pub chat: ChatConfig,
}

/// Server configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub workers: Option<usize>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: DEFAULT_PORT,
            workers: None,
        }
    }
}

pub const DEFAULT_PORT: u16 = 8080;

pub fn default_host() -> String {
    "127.0.0.1".to_string()
}

/// Logging configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    /// Minimum level written: error, warn, info or debug
    pub level: String,
    pub access_log: bool,
    /// Access log format (combined, common or json)
    #[serde(default = "default_access_log_format")]
    pub access_log_format: String,
    /// Access log file path (optional, stdout if not set)
    #[serde(default)]
    pub access_log_file: Option<String>,
    /// Error log file path (optional, stderr if not set)
    #[serde(default)]
    pub error_log_file: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            access_log: true,
            access_log_format: default_access_log_format(),
            access_log_file: None,
            error_log_file: None,
        }
    }
}

pub fn default_access_log_format() -> String {
    "combined".to_string()
}

/// Performance configuration
#[derive(Debug, Deserialize, Clone)]
pub struct PerformanceConfig {
    pub keep_alive_timeout: u64,
    pub read_timeout: u64,
    pub write_timeout: u64,
    #[serde(default)]
    pub max_connections: Option<u64>,
}

impl Default for PerformanceConfig {
    fn default() -> Self {
        Self {
            keep_alive_timeout: 75,
            read_timeout: 30,
            write_timeout: 90,
            max_connections: None,
        }
    }
}

/// HTTP configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct HttpConfig {
    pub server_name: String,
    pub enable_cors: bool,
    /// Largest accepted chat request body, by Content-Length
    pub max_body_size: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            server_name: "spa-relay/0.1".to_string(),
            enable_cors: false,
            max_body_size: 1_048_576,
        }
    }
}

/// Static asset configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AssetsConfig {
    /// Directory holding the built single-page application
    pub root: String,
    /// Entry document served for directories and unknown routes
    pub index_file: String,
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self {
            root: "web".to_string(),
            index_file: "index.html".to_string(),
        }
    }
}

/// Upstream chat-completion configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ChatConfig {
    /// Bearer credential; absent or empty disables the chat proxy
    #[serde(default)]
    pub api_key: Option<String>,
    pub api_url: String,
    pub default_model: String,
    pub provider: String,
    pub temperature: f64,
    pub max_tokens: u32,
    pub timeout_secs: u64,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_url: DEFAULT_CHAT_API_URL.to_string(),
            default_model: DEFAULT_CHAT_MODEL.to_string(),
            provider: "cerebras".to_string(),
            temperature: 0.3,
            max_tokens: 512,
            timeout_secs: 60,
        }
    }
}

pub const DEFAULT_CHAT_API_URL: &str = "https://api.cerebras.ai/v1/chat/completions";
pub const DEFAULT_CHAT_MODEL: &str = "llama3.1-8b";

impl ChatConfig {
    /// Credential usable for upstream calls, if one is configured
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref().filter(|key| !key.is_empty())
    }

    pub fn is_configured(&self) -> bool {
        self.api_key().is_some()
    }
}
