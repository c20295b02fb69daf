//! Identity DTOs shared by the session store, route guard, and provider adapters.
//!
//! DESIGN
//! ======
//! `User` is the only identity shape the UI sees. Provider adapters convert
//! their own wire payloads into it so pages never depend on a vendor schema.

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;

use serde::{Deserialize, Serialize};

/// Authenticated identity record for the current browser user.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// Provider-assigned user identifier (UUID string).
    pub id: String,
    /// Primary email address, if the provider exposes one.
    #[serde(default)]
    pub email: Option<String>,
    /// Free-form profile attributes (first name, organization, ...).
    #[serde(default)]
    pub attributes: serde_json::Map<String, serde_json::Value>,
}

impl User {
    /// Read a string attribute by key.
    #[must_use]
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).and_then(serde_json::Value::as_str)
    }

    /// Human-friendly label: `first_name last_name`, falling back to email, then id.
    #[must_use]
    pub fn display_name(&self) -> String {
        let first = self.attribute("first_name").unwrap_or_default().trim();
        let last = self.attribute("last_name").unwrap_or_default().trim();
        let full = format!("{first} {last}");
        let full = full.trim();
        if !full.is_empty() {
            return full.to_owned();
        }
        self.email.clone().unwrap_or_else(|| self.id.clone())
    }
}

/// Email + password pair submitted from the login form.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Why the provider pushed a session-change notification.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionEvent {
    SignedIn,
    SignedOut,
    TokenRefreshed,
    UserUpdated,
}

/// Asynchronous session-change notification from the identity provider.
#[derive(Clone, Debug, PartialEq)]
pub struct SessionChange {
    pub event: SessionEvent,
    pub user: Option<User>,
}

impl SessionChange {
    #[must_use]
    pub fn signed_in(user: User) -> Self {
        Self { event: SessionEvent::SignedIn, user: Some(user) }
    }

    #[must_use]
    pub fn signed_out() -> Self {
        Self { event: SessionEvent::SignedOut, user: None }
    }

    /// Same account, changed profile record.
    #[must_use]
    pub fn user_updated(user: User) -> Self {
        Self { event: SessionEvent::UserUpdated, user: Some(user) }
    }
}
