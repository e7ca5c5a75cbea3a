// Configuration module entry point
// Loads layered configuration once at startup and holds the shared application state

mod state;
mod types;

use std::net::SocketAddr;

// Re-export public types
pub use state::AppState;
pub use types::{
    AssetsConfig, ChatConfig, Config, HttpConfig, LoggingConfig, PerformanceConfig, ServerConfig,
    DEFAULT_CHAT_API_URL, DEFAULT_CHAT_MODEL,
};

/// Config file used when no path is given on the command line (extension is detected)
pub const DEFAULT_CONFIG_PATH: &str = "config";

/// Deployment variables that override the file and `APP_*` layers
const ENV_API_KEY: &str = "CEREBRAS_API_KEY";
const ENV_API_URL: &str = "CEREBRAS_API_URL";
const ENV_WEB_DIR: &str = "WEB_DIR";

impl Config {
    /// Load configuration from specified file path (without extension),
    /// then apply environment overrides from the running process
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        Self::load_with_env(config_path, |key| std::env::var(key).ok())
    }

    /// Same as [`Config::load_from`], with the deployment variables looked up through `env`
    pub fn load_with_env(
        config_path: &str,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, config::ConfigError> {
        let defaults = Self::default();
        let settings = config::Config::builder()
            .set_default("server.host", defaults.server.host)?
            .set_default("server.port", i64::from(defaults.server.port))?
            .set_default("logging.level", defaults.logging.level)?
            .set_default("logging.access_log", defaults.logging.access_log)?
            .set_default("logging.access_log_format", defaults.logging.access_log_format)?
            .set_default(
                "performance.keep_alive_timeout",
                defaults.performance.keep_alive_timeout,
            )?
            .set_default("performance.read_timeout", defaults.performance.read_timeout)?
            .set_default("performance.write_timeout", defaults.performance.write_timeout)?
            .set_default("http.server_name", defaults.http.server_name)?
            .set_default("http.enable_cors", defaults.http.enable_cors)?
            .set_default("http.max_body_size", defaults.http.max_body_size)?
            .set_default("assets.root", defaults.assets.root)?
            .set_default("assets.index_file", defaults.assets.index_file)?
            .set_default("chat.api_url", defaults.chat.api_url)?
            .set_default("chat.default_model", defaults.chat.default_model)?
            .set_default("chat.provider", defaults.chat.provider)?
            .set_default("chat.temperature", defaults.chat.temperature)?
            .set_default("chat.max_tokens", i64::from(defaults.chat.max_tokens))?
            .set_default("chat.timeout_secs", defaults.chat.timeout_secs)?
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option("chat.api_key", env(ENV_API_KEY))?
            .set_override_option("chat.api_url", env(ENV_API_URL))?
            .set_override_option("assets.root", env(ENV_WEB_DIR))?
            .build()?;

        settings.try_deserialize()
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }
}
