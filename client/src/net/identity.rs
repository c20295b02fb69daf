//! Identity-provider capability consumed by the session store.
//!
//! SYSTEM CONTEXT
//! ==============
//! The backend-as-a-service is opaque to the UI. Everything the store needs
//! from it fits in four operations (`get_current_session`, `on_session_change`,
//! `sign_in`, `sign_out`), so tests can swap in a fake without a network.
//!
//! DESIGN
//! ======
//! The UI runs on a single cooperative thread, so providers and their futures
//! are `!Send` (`async_trait(?Send)`) and observer tables use `Rc`/`RefCell`.
//! Observer registration hands back a [`Subscription`]; dropping it removes
//! the callback, so nothing fires after its owner is gone.

#[cfg(test)]
#[path = "identity_test.rs"]
mod identity_test;

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use async_trait::async_trait;

use super::types::{SessionChange, User};

// =============================================================================
// ERRORS
// =============================================================================

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum IdentityError {
    /// Bad credentials or a provider-side rejection. Shown to the user.
    #[error("{0}")]
    AuthFailure(String),
    /// Transport failure or provider outage.
    #[error("identity provider unavailable: {0}")]
    ProviderUnavailable(String),
    /// An async result arrived after its owner was torn down.
    #[error("session store torn down")]
    ComponentTornDown,
}

// =============================================================================
// PROVIDER CAPABILITY
// =============================================================================

/// Callback invoked for every provider-side session change.
pub type SessionCallback = Box<dyn Fn(&SessionChange)>;

/// The external identity provider as seen by the session store.
#[async_trait(?Send)]
pub trait IdentityProvider {
    /// Resolve the persisted session, if any.
    async fn get_current_session(&self) -> Result<Option<User>, IdentityError>;

    /// Register for asynchronous session-change notifications.
    fn on_session_change(&self, callback: SessionCallback) -> Subscription;

    /// Authenticate with email + password.
    async fn sign_in(&self, email: &str, password: &str) -> Result<User, IdentityError>;

    /// End the provider session.
    async fn sign_out(&self) -> Result<(), IdentityError>;
}

/// Account registration request built by the signup form.
#[derive(Clone, Debug, PartialEq)]
pub struct SignUpRequest {
    pub email: String,
    pub password: String,
    /// User metadata stored alongside the account (names, organization, ...).
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

/// What the provider did with a successful registration.
#[derive(Clone, Debug, PartialEq)]
pub enum SignUpOutcome {
    /// Account created; the user must confirm their email before signing in.
    ConfirmationSent,
    /// Account created and a session was issued immediately.
    SignedIn(User),
}

/// Account creation, kept apart from [`IdentityProvider`] because only the
/// signup page needs it.
#[async_trait(?Send)]
pub trait AccountRegistrar {
    async fn sign_up(&self, request: &SignUpRequest) -> Result<SignUpOutcome, IdentityError>;
}

// =============================================================================
// SUBSCRIPTIONS
// =============================================================================

/// Disposal handle for an observer registration.
///
/// The registration is removed when the handle is dropped or disposed.
/// [`Subscription::detach`] keeps it alive for the lifetime of the source.
#[must_use = "dropping a Subscription unregisters its callback"]
pub struct Subscription {
    dispose: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    pub fn new(dispose: impl FnOnce() + 'static) -> Self {
        Self { dispose: Some(Box::new(dispose)) }
    }

    /// A handle with nothing to release.
    pub fn noop() -> Self {
        Self { dispose: None }
    }

    /// Unregister now.
    pub fn dispose(mut self) {
        if let Some(dispose) = self.dispose.take() {
            dispose();
        }
    }

    /// Keep the registration until its source clears it.
    pub fn detach(mut self) {
        self.dispose = None;
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(dispose) = self.dispose.take() {
            dispose();
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").field("active", &self.dispose.is_some()).finish()
    }
}

type Listener<T> = Rc<dyn Fn(&T)>;

struct ListenerTable<T> {
    next_id: u64,
    entries: Vec<(u64, Listener<T>)>,
}

/// Observer table handing out [`Subscription`]s.
pub struct Listeners<T> {
    table: Rc<RefCell<ListenerTable<T>>>,
}

impl<T> Clone for Listeners<T> {
    fn clone(&self) -> Self {
        Self { table: Rc::clone(&self.table) }
    }
}

impl<T: 'static> Default for Listeners<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: 'static> Listeners<T> {
    #[must_use]
    pub fn new() -> Self {
        Self { table: Rc::new(RefCell::new(ListenerTable { next_id: 0, entries: Vec::new() })) }
    }

    pub fn register(&self, callback: impl Fn(&T) + 'static) -> Subscription {
        let id = {
            let mut table = self.table.borrow_mut();
            let id = table.next_id;
            table.next_id += 1;
            table.entries.push((id, Rc::new(callback)));
            id
        };
        let weak: Weak<RefCell<ListenerTable<T>>> = Rc::downgrade(&self.table);
        Subscription::new(move || {
            if let Some(table) = weak.upgrade() {
                table.borrow_mut().entries.retain(|(entry_id, _)| *entry_id != id);
            }
        })
    }

    /// Call every registered listener with `value`.
    ///
    /// Listeners are snapshotted first so a callback may register or dispose
    /// others without a re-entrant borrow.
    pub fn notify(&self, value: &T) {
        let snapshot: Vec<Listener<T>> = self.table.borrow().entries.iter().map(|(_, cb)| Rc::clone(cb)).collect();
        for callback in snapshot {
            callback(value);
        }
    }

    /// Drop every registration.
    pub fn clear(&self) {
        self.table.borrow_mut().entries.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.table.borrow().entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// =============================================================================
// UNCONFIGURED PROVIDER
// =============================================================================

/// Stand-in used during SSR and when no provider settings were injected.
///
/// Every session lookup fails with `ProviderUnavailable`, which the store
/// treats as unauthenticated.
#[derive(Debug, Default)]
pub struct UnconfiguredProvider;

const UNCONFIGURED: &str = "identity provider is not configured";

#[async_trait(?Send)]
impl IdentityProvider for UnconfiguredProvider {
    async fn get_current_session(&self) -> Result<Option<User>, IdentityError> {
        Err(IdentityError::ProviderUnavailable(UNCONFIGURED.to_owned()))
    }

    fn on_session_change(&self, _callback: SessionCallback) -> Subscription {
        Subscription::noop()
    }

    async fn sign_in(&self, _email: &str, _password: &str) -> Result<User, IdentityError> {
        Err(IdentityError::ProviderUnavailable(UNCONFIGURED.to_owned()))
    }

    async fn sign_out(&self) -> Result<(), IdentityError> {
        Ok(())
    }
}

#[async_trait(?Send)]
impl AccountRegistrar for UnconfiguredProvider {
    async fn sign_up(&self, _request: &SignUpRequest) -> Result<SignUpOutcome, IdentityError> {
        Err(IdentityError::ProviderUnavailable(UNCONFIGURED.to_owned()))
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================
