//! Auth-session state for the current browser user.
//!
//! SYSTEM CONTEXT
//! ==============
//! Used by route guards and user-aware components to coordinate login redirects
//! and identity-dependent rendering. `SessionStore` is the single source of
//! truth for "who is logged in"; pages read it through an `RwSignal<AuthState>`
//! mirror provided via context.
//!
//! LIFECYCLE
//! =========
//! `loading` starts `true` and flips to `false` exactly once, when the first
//! `initialize()` lookup resolves. Failures fail closed (no user). After
//! `teardown()` every late async result is discarded without touching state.
//!
//! TRADE-OFFS
//! ==========
//! The store is `Rc`-based and single-threaded. Leptos context requires
//! `Send + Sync`, so the app stores it in a local `StoredValue`.

#[cfg(test)]
#[path = "auth_test.rs"]
mod auth_test;

use std::cell::{Cell, RefCell};
use std::future::Future;
use std::rc::{Rc, Weak};

use crate::net::identity::{IdentityError, IdentityProvider, Listeners, Subscription};
use crate::net::types::{Credentials, SessionChange, SessionEvent, User};

/// Authentication state tracking the current user and loading status.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AuthState {
    pub user: Option<User>,
    pub loading: bool,
}

impl AuthState {
    /// State before the first session lookup resolves.
    #[must_use]
    pub fn pending() -> Self {
        Self { user: None, loading: true }
    }
}

struct StoreInner {
    provider: Rc<dyn IdentityProvider>,
    state: RefCell<AuthState>,
    /// Bumped when who is logged in changes; lets `initialize` detect that a
    /// sign-in or sign-out landed while its lookup was in flight.
    generation: Cell<u64>,
    initialized: Cell<bool>,
    torn_down: Cell<bool>,
    watchers: Listeners<AuthState>,
    /// Active provider registration, tagged so a stale handle cannot release
    /// a newer one.
    provider_subscription: RefCell<Option<(u64, Subscription)>>,
    next_subscription_id: Cell<u64>,
}

impl StoreInner {
    fn set_user(&self, user: Option<User>) {
        self.generation.set(self.generation.get() + 1);
        self.state.borrow_mut().user = user;
        self.publish();
    }

    /// Apply a provider notification. Sign-in and sign-out change who is
    /// logged in and win over an in-flight initial lookup; token refreshes
    /// and profile updates only refresh the current user's record, so the
    /// lookup's own result stays authoritative.
    fn apply_change(&self, change: &SessionChange) {
        match change.event {
            SessionEvent::SignedIn | SessionEvent::SignedOut => self.set_user(change.user.clone()),
            SessionEvent::TokenRefreshed | SessionEvent::UserUpdated => {
                self.state.borrow_mut().user = change.user.clone();
                self.publish();
            }
        }
    }

    fn publish(&self) {
        let snapshot = self.state.borrow().clone();
        self.watchers.notify(&snapshot);
    }
}

fn live(weak: &Weak<StoreInner>) -> Result<Rc<StoreInner>, IdentityError> {
    match weak.upgrade() {
        Some(inner) if !inner.torn_down.get() => Ok(inner),
        _ => Err(IdentityError::ComponentTornDown),
    }
}

/// Owned, injectable session store backed by an [`IdentityProvider`].
#[derive(Clone)]
pub struct SessionStore {
    inner: Rc<StoreInner>,
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("state", &*self.inner.state.borrow())
            .field("torn_down", &self.inner.torn_down.get())
            .finish_non_exhaustive()
    }
}

impl SessionStore {
    #[must_use]
    pub fn new(provider: Rc<dyn IdentityProvider>) -> Self {
        Self {
            inner: Rc::new(StoreInner {
                provider,
                state: RefCell::new(AuthState::pending()),
                generation: Cell::new(0),
                initialized: Cell::new(false),
                torn_down: Cell::new(false),
                watchers: Listeners::new(),
                provider_subscription: RefCell::new(None),
                next_subscription_id: Cell::new(0),
            }),
        }
    }

    /// Current `(user, loading)` pair.
    #[must_use]
    pub fn snapshot(&self) -> AuthState {
        self.inner.state.borrow().clone()
    }

    #[must_use]
    pub fn user(&self) -> Option<User> {
        self.inner.state.borrow().user.clone()
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.inner.state.borrow().loading
    }

    #[must_use]
    pub fn is_torn_down(&self) -> bool {
        self.inner.torn_down.get()
    }

    /// Observe every state transition. The callback does not fire for the
    /// current state; read [`SessionStore::snapshot`] first.
    pub fn watch(&self, callback: impl Fn(&AuthState) + 'static) -> Subscription {
        self.inner.watchers.register(callback)
    }

    /// Resolve the initial session from the provider.
    ///
    /// Only the first call performs a lookup; later calls resolve immediately.
    /// Provider failures leave the store unauthenticated. The returned future
    /// is `'static` so it can be handed to `spawn_local`.
    pub fn initialize(&self) -> impl Future<Output = ()> + 'static {
        let first = !self.inner.initialized.replace(true);
        let weak = Rc::downgrade(&self.inner);
        async move {
            if !first {
                log::debug!("session store already initialized");
                return;
            }
            if let Err(e) = resolve_initial_session(weak).await {
                log::debug!("initial session lookup discarded: {e}");
            }
        }
    }

    /// Mirror provider-side session changes (token refresh, sign-out in
    /// another tab) into the store. `loading` is never touched here.
    ///
    /// Disposing the returned handle unregisters from the provider;
    /// [`SessionStore::teardown`] does the same for a detached handle.
    /// Calling this again replaces the earlier registration.
    pub fn subscribe_to_changes(&self) -> Subscription {
        let weak = Rc::downgrade(&self.inner);
        let registration = self.inner.provider.on_session_change(Box::new(move |change: &SessionChange| {
            match live(&weak) {
                Ok(inner) => {
                    log::debug!("session change: {:?}", change.event);
                    inner.apply_change(change);
                }
                Err(e) => log::debug!("session change dropped: {e}"),
            }
        }));

        let id = self.inner.next_subscription_id.get();
        self.inner.next_subscription_id.set(id + 1);
        let previous = self.inner.provider_subscription.borrow_mut().replace((id, registration));
        drop(previous);

        let weak = Rc::downgrade(&self.inner);
        Subscription::new(move || {
            let Some(inner) = weak.upgrade() else { return };
            let current = {
                let mut slot = inner.provider_subscription.borrow_mut();
                if slot.as_ref().is_some_and(|(active, _)| *active == id) { slot.take() } else { None }
            };
            drop(current);
        })
    }

    /// Authenticate through the provider and record the new session.
    ///
    /// # Errors
    ///
    /// Returns the provider's `AuthFailure`/`ProviderUnavailable`, or
    /// `ComponentTornDown` if the store was torn down while waiting.
    pub async fn sign_in(&self, credentials: &Credentials) -> Result<User, IdentityError> {
        let provider = Rc::clone(&self.inner.provider);
        let user = provider.sign_in(&credentials.email, &credentials.password).await?;
        let inner = live(&Rc::downgrade(&self.inner))?;
        log::debug!("signed in user {}", user.id);
        inner.set_user(Some(user.clone()));
        Ok(user)
    }

    /// End the session. The local session is cleared even when the provider
    /// call fails, so a signed-out UI never shows stale identity.
    ///
    /// # Errors
    ///
    /// Returns the provider error after clearing local state.
    pub async fn sign_out(&self) -> Result<(), IdentityError> {
        let provider = Rc::clone(&self.inner.provider);
        let result = provider.sign_out().await;
        if let Err(e) = &result {
            log::warn!("provider sign-out failed: {e}");
        }
        if let Ok(inner) = live(&Rc::downgrade(&self.inner)) {
            if inner.state.borrow().user.is_some() {
                inner.set_user(None);
            }
        }
        result
    }

    /// Detach from the provider and the UI. Pending lookups that resolve
    /// afterwards are discarded.
    pub fn teardown(&self) {
        if self.inner.torn_down.replace(true) {
            return;
        }
        let subscription = self.inner.provider_subscription.borrow_mut().take();
        drop(subscription);
        self.inner.watchers.clear();
        log::debug!("session store torn down");
    }
}

async fn resolve_initial_session(weak: Weak<StoreInner>) -> Result<(), IdentityError> {
    let (provider, generation) = {
        let inner = live(&weak)?;
        (Rc::clone(&inner.provider), inner.generation.get())
    };

    let result = provider.get_current_session().await;
    let inner = live(&weak)?;

    let user = match result {
        Ok(user) => user,
        Err(e) => {
            log::warn!("initial session lookup failed, continuing unauthenticated: {e}");
            None
        }
    };

    {
        let mut state = inner.state.borrow_mut();
        if inner.generation.get() == generation {
            state.user = user;
        }
        state.loading = false;
    }
    inner.generation.set(inner.generation.get() + 1);
    inner.publish();
    Ok(())
}
