//! Public runtime settings shared from the server to the browser.
//!
//! DESIGN
//! ======
//! The server renders these values into `<meta>` tags in the HTML shell and
//! provides them as Leptos context during SSR. After hydration the browser
//! reads the same tags back, so both render passes agree. Only values that are
//! safe to expose publicly belong here (the anon key is a public key).

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use serde::{Deserialize, Serialize};

pub const META_IDENTITY_URL: &str = "tibot-identity-url";
pub const META_IDENTITY_ANON_KEY: &str = "tibot-identity-anon-key";
pub const META_LOGIN_LOCKED: &str = "tibot-login-locked";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicConfig {
    /// Base URL of the identity provider (no trailing slash).
    pub identity_url: String,
    /// Public API key sent with every provider request.
    pub identity_anon_key: String,
    /// When set, the login form is shown but submission is disabled.
    pub login_locked: bool,
}

impl Default for PublicConfig {
    fn default() -> Self {
        Self { identity_url: String::new(), identity_anon_key: String::new(), login_locked: true }
    }
}

impl PublicConfig {
    #[must_use]
    pub fn is_identity_configured(&self) -> bool {
        !self.identity_url.is_empty() && !self.identity_anon_key.is_empty()
    }

    /// `(meta name, content)` pairs rendered into the HTML head.
    #[must_use]
    pub fn meta_entries(&self) -> [(&'static str, String); 3] {
        [
            (META_IDENTITY_URL, self.identity_url.clone()),
            (META_IDENTITY_ANON_KEY, self.identity_anon_key.clone()),
            (META_LOGIN_LOCKED, self.login_locked.to_string()),
        ]
    }

    /// Rebuild from meta tag contents. A missing or unreadable lock flag keeps
    /// sign-in locked.
    pub fn from_meta(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            identity_url: lookup(META_IDENTITY_URL)
                .unwrap_or_default()
                .trim()
                .trim_end_matches('/')
                .to_owned(),
            identity_anon_key: lookup(META_IDENTITY_ANON_KEY).unwrap_or_default().trim().to_owned(),
            login_locked: lookup(META_LOGIN_LOCKED)
                .as_deref()
                .and_then(parse_flag)
                .unwrap_or(true),
        }
    }

    /// Read the meta tags from the live document.
    #[cfg(feature = "hydrate")]
    #[must_use]
    pub fn from_document() -> Self {
        let document = web_sys::window().and_then(|w| w.document());
        Self::from_meta(|name| {
            document
                .as_ref()?
                .query_selector(&format!("meta[name=\"{name}\"]"))
                .ok()
                .flatten()?
                .get_attribute("content")
        })
    }

    /// Settings for the current render pass: meta tags in the browser,
    /// server-provided context during SSR.
    #[must_use]
    pub fn current() -> Self {
        #[cfg(feature = "hydrate")]
        {
            Self::from_document()
        }
        #[cfg(not(feature = "hydrate"))]
        {
            leptos::prelude::use_context::<Self>().unwrap_or_default()
        }
    }
}

/// Parse a boolean flag the way the server's env parsing does.
#[must_use]
pub fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
