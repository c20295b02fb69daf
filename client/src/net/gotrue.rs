//! GoTrue (Supabase Auth) REST adapter implementing [`IdentityProvider`].
//!
//! Client-side (hydrate): real HTTP calls via `gloo-net`, session persisted in
//! `localStorage`, cross-tab changes picked up from the `storage` event.
//! Everything else in this module is pure request/response shaping and is
//! compiled for tests as well.
//!
//! ERROR HANDLING
//! ==============
//! 4xx responses become `AuthFailure` with the provider's message; transport
//! errors and 5xx become `ProviderUnavailable`. An expired or revoked stored
//! token is not an error: the session is dropped and the user is signed out.

#![allow(clippy::unused_async)]

#[cfg(test)]
#[path = "gotrue_test.rs"]
mod gotrue_test;

#[cfg(any(test, feature = "hydrate"))]
use serde::{Deserialize, Serialize};

#[cfg(any(test, feature = "hydrate"))]
use super::identity::IdentityError;
#[cfg(any(test, feature = "hydrate"))]
use super::types::User;

#[cfg(any(test, feature = "hydrate"))]
const STORAGE_KEY: &str = "tibot.auth.session";
#[cfg(any(test, feature = "hydrate"))]
const PASSWORD_GRANT_PATH: &str = "/auth/v1/token?grant_type=password";
#[cfg(any(test, feature = "hydrate"))]
const REFRESH_GRANT_PATH: &str = "/auth/v1/token?grant_type=refresh_token";
#[cfg(any(test, feature = "hydrate"))]
const USER_PATH: &str = "/auth/v1/user";
#[cfg(any(test, feature = "hydrate"))]
const LOGOUT_PATH: &str = "/auth/v1/logout";
#[cfg(any(test, feature = "hydrate"))]
const SIGNUP_PATH: &str = "/auth/v1/signup";
/// Refresh this many seconds before the access token actually expires.
#[cfg(any(test, feature = "hydrate"))]
const REFRESH_MARGIN_SECS: u64 = 60;

#[cfg(any(test, feature = "hydrate"))]
fn endpoint(base_url: &str, path: &str) -> String {
    format!("{}{path}", base_url.trim_end_matches('/'))
}

/// User object as returned by GoTrue.
#[cfg(any(test, feature = "hydrate"))]
#[derive(Debug, Deserialize)]
struct GoTrueUser {
    id: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    user_metadata: serde_json::Map<String, serde_json::Value>,
}

#[cfg(any(test, feature = "hydrate"))]
impl From<GoTrueUser> for User {
    fn from(user: GoTrueUser) -> Self {
        Self { id: user.id, email: user.email, attributes: user.user_metadata }
    }
}

#[cfg(any(test, feature = "hydrate"))]
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: Option<u64>,
    user: GoTrueUser,
}

/// Session persisted between page loads.
#[cfg(any(test, feature = "hydrate"))]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
struct StoredSession {
    access_token: String,
    refresh_token: Option<String>,
    /// Unix seconds.
    expires_at: Option<u64>,
    user: User,
}

#[cfg(any(test, feature = "hydrate"))]
impl StoredSession {
    fn from_token(token: TokenResponse, now_secs: u64) -> Self {
        Self {
            access_token: token.access_token,
            refresh_token: token.refresh_token,
            expires_at: token.expires_in.map(|secs| now_secs.saturating_add(secs)),
            user: token.user.into(),
        }
    }

    fn needs_refresh(&self, now_secs: u64) -> bool {
        self.refresh_token.is_some()
            && self
                .expires_at
                .is_some_and(|at| now_secs.saturating_add(REFRESH_MARGIN_SECS) >= at)
    }
}

#[cfg(any(test, feature = "hydrate"))]
fn decode_stored_session(raw: &str) -> Option<StoredSession> {
    serde_json::from_str(raw).ok()
}

/// GoTrue error payloads vary by endpoint and version.
#[cfg(any(test, feature = "hydrate"))]
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    error_description: Option<String>,
    msg: Option<String>,
    message: Option<String>,
    error: Option<String>,
}

#[cfg(any(test, feature = "hydrate"))]
fn error_message(status: u16, body: &str) -> String {
    let parsed: ErrorBody = serde_json::from_str(body).unwrap_or_default();
    parsed
        .error_description
        .or(parsed.msg)
        .or(parsed.message)
        .or(parsed.error)
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| format!("request failed: {status}"))
}

#[cfg(any(test, feature = "hydrate"))]
fn classify_failure(status: u16, body: &str) -> IdentityError {
    let message = error_message(status, body);
    if (400..500).contains(&status) {
        IdentityError::AuthFailure(message)
    } else {
        IdentityError::ProviderUnavailable(message)
    }
}

/// Signup either issues a session (auto-confirm) or just creates the user.
#[cfg(any(test, feature = "hydrate"))]
fn parse_signup_response(body: &str) -> Result<Option<TokenResponse>, IdentityError> {
    let value: serde_json::Value = serde_json::from_str(body)
        .map_err(|e| IdentityError::ProviderUnavailable(format!("unexpected signup response: {e}")))?;
    if value.get("access_token").is_none() {
        return Ok(None);
    }
    serde_json::from_value(value)
        .map(Some)
        .map_err(|e| IdentityError::ProviderUnavailable(format!("unexpected signup response: {e}")))
}

#[cfg(feature = "hydrate")]
pub use browser::GoTrueProvider;

#[cfg(feature = "hydrate")]
mod browser {
    use std::cell::RefCell;

    use async_trait::async_trait;
    use gloo_net::http::{Request, RequestBuilder, Response};
    use wasm_bindgen::JsCast;
    use wasm_bindgen::closure::Closure;

    use super::*;
    use crate::config::PublicConfig;
    use crate::net::identity::{
        AccountRegistrar, IdentityProvider, Listeners, SessionCallback, SignUpOutcome, SignUpRequest, Subscription,
    };
    use crate::net::types::{SessionChange, SessionEvent};

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn now_secs() -> u64 {
        (js_sys::Date::now() / 1000.0) as u64
    }

    fn storage() -> Option<web_sys::Storage> {
        web_sys::window()?.local_storage().ok().flatten()
    }

    fn load_session() -> Option<StoredSession> {
        let raw = storage()?.get_item(STORAGE_KEY).ok().flatten()?;
        decode_stored_session(&raw)
    }

    fn save_session(session: &StoredSession) {
        let Some(storage) = storage() else { return };
        match serde_json::to_string(session) {
            Ok(raw) => {
                if storage.set_item(STORAGE_KEY, &raw).is_err() {
                    log::warn!("failed to persist auth session");
                }
            }
            Err(e) => log::warn!("failed to encode auth session: {e}"),
        }
    }

    fn clear_session() {
        if let Some(storage) = storage() {
            let _ = storage.remove_item(STORAGE_KEY);
        }
    }

    fn unavailable(e: impl std::fmt::Display) -> IdentityError {
        IdentityError::ProviderUnavailable(e.to_string())
    }

    async fn failure(resp: Response) -> IdentityError {
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        classify_failure(status, &body)
    }

    /// `storage` event hook; removes itself from the window on drop.
    struct StorageListener {
        window: web_sys::Window,
        closure: Closure<dyn FnMut(web_sys::StorageEvent)>,
    }

    impl Drop for StorageListener {
        fn drop(&mut self) {
            let _ = self
                .window
                .remove_event_listener_with_callback("storage", self.closure.as_ref().unchecked_ref());
        }
    }

    /// Browser GoTrue client.
    pub struct GoTrueProvider {
        base_url: String,
        anon_key: String,
        listeners: Listeners<SessionChange>,
        storage_listener: RefCell<Option<StorageListener>>,
    }

    impl GoTrueProvider {
        #[must_use]
        pub fn new(config: &PublicConfig) -> Self {
            let provider = Self {
                base_url: config.identity_url.trim_end_matches('/').to_owned(),
                anon_key: config.identity_anon_key.clone(),
                listeners: Listeners::new(),
                storage_listener: RefCell::new(None),
            };
            provider.listen_for_other_tabs();
            provider
        }

        /// Another tab signing in or out rewrites our storage key.
        fn listen_for_other_tabs(&self) {
            let Some(window) = web_sys::window() else { return };
            let listeners = self.listeners.clone();
            let closure = Closure::wrap(Box::new(move |event: web_sys::StorageEvent| {
                if event.key().as_deref() != Some(STORAGE_KEY) {
                    return;
                }
                let change = match event.new_value().as_deref().and_then(decode_stored_session) {
                    Some(session) => SessionChange::signed_in(session.user),
                    None => SessionChange::signed_out(),
                };
                listeners.notify(&change);
            }) as Box<dyn FnMut(web_sys::StorageEvent)>);
            if window
                .add_event_listener_with_callback("storage", closure.as_ref().unchecked_ref())
                .is_err()
            {
                log::warn!("could not watch auth storage for cross-tab changes");
                return;
            }
            *self.storage_listener.borrow_mut() = Some(StorageListener { window, closure });
        }

        fn request(&self, builder: RequestBuilder, access_token: Option<&str>) -> RequestBuilder {
            let builder = builder.header("apikey", &self.anon_key);
            match access_token {
                Some(token) => builder.header("Authorization", &format!("Bearer {token}")),
                None => builder.header("Authorization", &format!("Bearer {}", self.anon_key)),
            }
        }

        async fn fetch_user(&self, access_token: &str) -> Result<Option<User>, IdentityError> {
            let resp = self
                .request(Request::get(&endpoint(&self.base_url, USER_PATH)), Some(access_token))
                .send()
                .await
                .map_err(unavailable)?;
            match resp.status() {
                401 | 403 => return Ok(None),
                _ if !resp.ok() => return Err(failure(resp).await),
                _ => {}
            }
            let user: GoTrueUser = resp.json().await.map_err(unavailable)?;
            Ok(Some(user.into()))
        }

        async fn token_grant(&self, path: &str, body: &serde_json::Value) -> Result<StoredSession, IdentityError> {
            let resp = self
                .request(Request::post(&endpoint(&self.base_url, path)), None)
                .json(body)
                .map_err(unavailable)?
                .send()
                .await
                .map_err(unavailable)?;
            if !resp.ok() {
                return Err(failure(resp).await);
            }
            let token: TokenResponse = resp.json().await.map_err(unavailable)?;
            Ok(StoredSession::from_token(token, now_secs()))
        }

        async fn refresh(&self, refresh_token: &str) -> Result<StoredSession, IdentityError> {
            let session = self
                .token_grant(REFRESH_GRANT_PATH, &serde_json::json!({ "refresh_token": refresh_token }))
                .await?;
            save_session(&session);
            self.listeners.notify(&SessionChange {
                event: SessionEvent::TokenRefreshed,
                user: Some(session.user.clone()),
            });
            Ok(session)
        }
    }

    #[async_trait(?Send)]
    impl IdentityProvider for GoTrueProvider {
        async fn get_current_session(&self) -> Result<Option<User>, IdentityError> {
            let Some(mut session) = load_session() else {
                return Ok(None);
            };

            if session.needs_refresh(now_secs()) {
                let refresh_token = session.refresh_token.clone().unwrap_or_default();
                match self.refresh(&refresh_token).await {
                    Ok(refreshed) => session = refreshed,
                    Err(IdentityError::AuthFailure(msg)) => {
                        log::debug!("stored session could not be refreshed: {msg}");
                        clear_session();
                        return Ok(None);
                    }
                    Err(e) => return Err(e),
                }
            }

            match self.fetch_user(&session.access_token).await? {
                Some(user) => {
                    if user != session.user {
                        session.user = user.clone();
                        save_session(&session);
                        self.listeners.notify(&SessionChange::user_updated(user.clone()));
                    }
                    Ok(Some(user))
                }
                None => {
                    clear_session();
                    Ok(None)
                }
            }
        }

        fn on_session_change(&self, callback: SessionCallback) -> Subscription {
            self.listeners.register(move |change| callback(change))
        }

        async fn sign_in(&self, email: &str, password: &str) -> Result<User, IdentityError> {
            let session = self
                .token_grant(PASSWORD_GRANT_PATH, &serde_json::json!({ "email": email, "password": password }))
                .await?;
            save_session(&session);
            let user = session.user.clone();
            self.listeners.notify(&SessionChange::signed_in(user.clone()));
            Ok(user)
        }

        async fn sign_out(&self) -> Result<(), IdentityError> {
            let Some(session) = load_session() else {
                return Ok(());
            };
            clear_session();
            self.listeners.notify(&SessionChange::signed_out());

            let resp = self
                .request(Request::post(&endpoint(&self.base_url, LOGOUT_PATH)), Some(&session.access_token))
                .send()
                .await
                .map_err(unavailable)?;
            // An already-revoked token means the provider session is gone too.
            if resp.ok() || matches!(resp.status(), 401 | 403 | 404) {
                return Ok(());
            }
            Err(failure(resp).await)
        }
    }

    #[async_trait(?Send)]
    impl AccountRegistrar for GoTrueProvider {
        async fn sign_up(&self, request: &SignUpRequest) -> Result<SignUpOutcome, IdentityError> {
            let body = serde_json::json!({
                "email": request.email,
                "password": request.password,
                "data": request.metadata,
            });
            let resp = self
                .request(Request::post(&endpoint(&self.base_url, SIGNUP_PATH)), None)
                .json(&body)
                .map_err(unavailable)?
                .send()
                .await
                .map_err(unavailable)?;
            if !resp.ok() {
                return Err(failure(resp).await);
            }
            let text = resp.text().await.map_err(unavailable)?;
            match parse_signup_response(&text)? {
                Some(token) => {
                    let session = StoredSession::from_token(token, now_secs());
                    save_session(&session);
                    let user = session.user.clone();
                    self.listeners.notify(&SessionChange::signed_in(user.clone()));
                    Ok(SignUpOutcome::SignedIn(user))
                }
                None => Ok(SignUpOutcome::ConfirmationSent),
            }
        }
    }
}
