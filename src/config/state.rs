// Application state module
// Immutable per-process state shared by every request handler

use std::path::PathBuf;

use super::types::Config;
use crate::chat::{ChatError, ChatUpstream};
use crate::logger;

/// Application state
pub struct AppState {
    pub config: Config,
    /// Canonical asset root (falls back to the configured path if it cannot be resolved)
    pub asset_root: PathBuf,
    /// Upstream chat-completion client
    pub upstream: ChatUpstream,
}

impl AppState {
    /// Build the state once at startup
    pub fn new(config: Config) -> Result<Self, ChatError> {
        let configured_root = PathBuf::from(&config.assets.root);
        let asset_root = match configured_root.canonicalize() {
            Ok(root) => root,
            Err(e) => {
                logger::log_warning(&format!(
                    "Asset root '{}' is not accessible: {e}",
                    configured_root.display()
                ));
                configured_root
            }
        };

        let upstream = ChatUpstream::new(&config.chat)?;

        Ok(Self {
            config,
            asset_root,
            upstream,
        })
    }
}
