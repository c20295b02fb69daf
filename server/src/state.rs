//! Shared application state.
//!
//! `AppState` is injected into Axum handlers via the `State` extractor. It
//! only carries the loaded configuration; sessions live in the browser and
//! with the identity provider.

use std::sync::Arc;

use crate::config::ServerConfig;

/// Clone is required by Axum; the config is shared behind an `Arc`.
#[derive(Clone, Debug)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
}

impl AppState {
    #[must_use]
    pub fn new(config: ServerConfig) -> Self {
        Self { config: Arc::new(config) }
    }
}

#[cfg(test)]
pub mod test_helpers {
    use super::*;

    /// State with a fixed, unlocked identity configuration.
    #[must_use]
    pub fn test_app_state() -> AppState {
        AppState::new(ServerConfig {
            port: 0,
            identity_url: "https://auth.test".to_owned(),
            identity_anon_key: "anon-test".to_owned(),
            login_locked: false,
        })
    }
}
