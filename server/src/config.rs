//! Server configuration loaded from the environment.
//!
//! `main` loads `.env` through `dotenvy` before calling
//! [`ServerConfig::from_env`]. Identity settings are required; a server that
//! renders pages without them would ship a login form that can never work.

use tibot_client::config::{PublicConfig, parse_flag};

pub const DEFAULT_PORT: u16 = 3000;

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// A required environment variable is unset or blank.
    #[error("missing required env var {0}")]
    Missing(&'static str),

    /// A variable is set but cannot be parsed.
    #[error("invalid value for {var}: {value:?}")]
    Invalid { var: &'static str, value: String },

    /// `[package.metadata.leptos]` or the `LEPTOS_*` overrides are unusable.
    #[error("leptos configuration: {0}")]
    Leptos(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServerConfig {
    pub port: u16,
    pub identity_url: String,
    pub identity_anon_key: String,
    pub login_locked: bool,
}

impl ServerConfig {
    /// Read `PORT`, `IDENTITY_URL`, `IDENTITY_ANON_KEY` and `LOGIN_LOCKED`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a required value is missing or a value
    /// does not parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`ServerConfig::from_env`] with an injectable lookup.
    ///
    /// # Errors
    ///
    /// See [`ServerConfig::from_env`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let identity_url = required(&lookup, "IDENTITY_URL")?.trim_end_matches('/').to_owned();
        if !identity_url.starts_with("http://") && !identity_url.starts_with("https://") {
            return Err(ConfigError::Invalid { var: "IDENTITY_URL", value: identity_url });
        }
        let identity_anon_key = required(&lookup, "IDENTITY_ANON_KEY")?;
        let port = env_parse(&lookup, "PORT", DEFAULT_PORT)?;
        // Sign-in stays locked unless explicitly opened.
        let login_locked = env_bool(&lookup, "LOGIN_LOCKED")?.unwrap_or(true);

        Ok(Self { port, identity_url, identity_anon_key, login_locked })
    }

    /// Settings safe to hand to the browser.
    #[must_use]
    pub fn public(&self) -> PublicConfig {
        PublicConfig {
            identity_url: self.identity_url.clone(),
            identity_anon_key: self.identity_anon_key.clone(),
            login_locked: self.login_locked,
        }
    }
}

fn non_blank(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<String> {
    lookup(key).map(|raw| raw.trim().to_owned()).filter(|v| !v.is_empty())
}

fn required(lookup: &impl Fn(&str) -> Option<String>, key: &'static str) -> Result<String, ConfigError> {
    non_blank(lookup, key).ok_or(ConfigError::Missing(key))
}

fn env_parse<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match non_blank(lookup, key) {
        None => Ok(default),
        Some(raw) => raw.parse().map_err(|_| ConfigError::Invalid { var: key, value: raw }),
    }
}

fn env_bool(lookup: &impl Fn(&str) -> Option<String>, key: &'static str) -> Result<Option<bool>, ConfigError> {
    match non_blank(lookup, key) {
        None => Ok(None),
        Some(raw) => parse_flag(&raw).map(Some).ok_or(ConfigError::Invalid { var: key, value: raw }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
