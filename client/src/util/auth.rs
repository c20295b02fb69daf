//! Route guarding and login-redirect helpers.
//!
//! SYSTEM CONTEXT
//! ==============
//! Every protected route applies the same decision: wait while the session
//! store is loading, redirect to `/login` (carrying the requested path) when
//! no user is present, otherwise render. The decision is a pure function of
//! `AuthState` and the requested path so components can re-run it on every
//! state change instead of caching it.

#[cfg(test)]
#[path = "auth_test.rs"]
mod auth_test;

use crate::state::auth::{AuthState, SessionStore};

/// Login entry point for unauthenticated visitors.
pub const LOGIN_PATH: &str = "/login";
/// Where users land after sign-in when no usable intent was carried.
pub const DEFAULT_AFTER_LOGIN: &str = "/";
/// Query parameter carrying the navigation intent.
pub const NEXT_PARAM: &str = "next";

/// Stand-in origin for resolving intents; only its identity matters.
const RESOLVE_BASE: &str = "http://tibot.invalid/";

/// Outcome of guarding a protected view.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GuardDecision<V> {
    /// Session lookup still pending: show a neutral placeholder.
    Loading,
    /// No session: go to `to`, remembering `intent` for after sign-in.
    Redirect { to: &'static str, intent: String },
    /// Session present: show the protected view.
    Render(V),
}

impl<V> GuardDecision<V> {
    /// Full login URL for a redirect decision, `None` otherwise.
    #[must_use]
    pub fn redirect_url(&self) -> Option<String> {
        match self {
            Self::Redirect { intent, .. } => Some(login_redirect_url(intent)),
            Self::Loading | Self::Render(_) => None,
        }
    }
}

/// True once auth has loaded and no user is present.
#[must_use]
pub fn should_redirect_unauth(state: &AuthState) -> bool {
    !state.loading && state.user.is_none()
}

/// Decide what to show for `view` at `requested_path`.
pub fn evaluate_guard<V>(state: &AuthState, requested_path: &str, view: V) -> GuardDecision<V> {
    if state.loading {
        return GuardDecision::Loading;
    }
    if should_redirect_unauth(state) {
        return GuardDecision::Redirect { to: LOGIN_PATH, intent: requested_path.to_owned() };
    }
    GuardDecision::Render(view)
}

/// Guard bound to a live session store.
#[derive(Clone, Debug)]
pub struct RouteGuard {
    store: SessionStore,
}

impl RouteGuard {
    #[must_use]
    pub fn new(store: SessionStore) -> Self {
        Self { store }
    }

    /// Evaluate against the store's current state. Never cached.
    pub fn evaluate<V>(&self, current_path: &str, view: V) -> GuardDecision<V> {
        evaluate_guard(&self.store.snapshot(), current_path, view)
    }
}

/// Build `/login?next=<intent>`.
#[must_use]
pub fn login_redirect_url(intent: &str) -> String {
    if intent.is_empty() {
        return LOGIN_PATH.to_owned();
    }
    let query = url::form_urlencoded::Serializer::new(String::new())
        .append_pair(NEXT_PARAM, intent)
        .finish();
    format!("{LOGIN_PATH}?{query}")
}

/// Resolve where to navigate after a successful sign-in.
///
/// The intent is resolved the way a browser would resolve it against this
/// site. Only results that keep the same origin survive; anything that could
/// leave the site (`//host`, `https://...`, backslash or control-character
/// tricks) or loop back to the login page falls back to
/// [`DEFAULT_AFTER_LOGIN`]. The returned path is the normalized form.
#[must_use]
pub fn post_login_destination(intent: Option<&str>) -> String {
    let Some(intent) = intent.map(str::trim).filter(|s| !s.is_empty()) else {
        return DEFAULT_AFTER_LOGIN.to_owned();
    };
    if !intent.starts_with('/') || intent.chars().any(|c| c.is_control() || c == '\\') {
        return DEFAULT_AFTER_LOGIN.to_owned();
    }
    let Ok(base) = url::Url::parse(RESOLVE_BASE) else {
        return DEFAULT_AFTER_LOGIN.to_owned();
    };
    match base.join(intent) {
        Ok(resolved)
            if resolved.origin() == base.origin()
                && !resolved.path().starts_with("//")
                && resolved.path() != LOGIN_PATH =>
        {
            resolved[url::Position::BeforePath..].to_owned()
        }
        _ => DEFAULT_AFTER_LOGIN.to_owned(),
    }
}
