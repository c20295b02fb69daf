use std::cell::RefCell;
use std::rc::Rc;

use super::*;
use crate::net::identity::test_helpers::{FakeProvider, user};

fn store_with(provider: &Rc<FakeProvider>) -> SessionStore {
    SessionStore::new(Rc::clone(provider) as Rc<dyn IdentityProvider>)
}

fn admin() -> User {
    user("u-admin", "admin@school.example")
}

fn creds(email: &str, password: &str) -> Credentials {
    Credentials { email: email.to_owned(), password: password.to_owned() }
}

// =============================================================
// AuthState
// =============================================================

#[test]
fn auth_state_default_no_user() {
    let state = AuthState::default();
    assert!(state.user.is_none());
}

#[test]
fn auth_state_default_not_loading() {
    let state = AuthState::default();
    assert!(!state.loading);
}

#[test]
fn auth_state_pending_is_loading_without_user() {
    let state = AuthState::pending();
    assert!(state.loading);
    assert!(state.user.is_none());
}

// =============================================================
// initialize
// =============================================================

#[test]
fn new_store_is_loading() {
    let provider = Rc::new(FakeProvider::new());
    let store = store_with(&provider);
    assert!(store.is_loading());
    assert!(store.user().is_none());
    assert_eq!(provider.session_calls.get(), 0);
}

#[tokio::test]
async fn initialize_with_existing_session_authenticates() {
    let provider = Rc::new(FakeProvider::with_session(admin()));
    let store = store_with(&provider);
    store.initialize().await;
    assert_eq!(store.snapshot(), AuthState { user: Some(admin()), loading: false });
}

#[tokio::test]
async fn initialize_without_session_is_unauthenticated() {
    let provider = Rc::new(FakeProvider::new());
    let store = store_with(&provider);
    store.initialize().await;
    assert_eq!(store.snapshot(), AuthState { user: None, loading: false });
}

#[tokio::test]
async fn initialize_provider_error_fails_closed() {
    let provider = Rc::new(FakeProvider::failing(IdentityError::ProviderUnavailable("down".to_owned())));
    let store = store_with(&provider);
    store.initialize().await;
    assert!(!store.is_loading());
    assert!(store.user().is_none());
}

#[tokio::test]
async fn initialize_runs_only_once() {
    let provider = Rc::new(FakeProvider::with_session(admin()));
    let store = store_with(&provider);
    store.initialize().await;
    store.initialize().await;
    store.clone().initialize().await;
    assert_eq!(provider.session_calls.get(), 1);
}

#[tokio::test]
async fn initialize_result_discarded_after_teardown() {
    let provider = Rc::new(FakeProvider::new());
    let tx = provider.hold_session();
    let store = store_with(&provider);

    let mut init = Box::pin(store.initialize());
    assert!(futures::poll!(&mut init).is_pending());

    store.teardown();
    tx.send(Ok(Some(admin()))).unwrap();
    init.await;

    assert!(store.is_loading());
    assert!(store.user().is_none());
}

#[tokio::test]
async fn initialize_keeps_sign_in_that_landed_first() {
    let provider = Rc::new(FakeProvider::new());
    provider.add_account("admin@school.example", "s3cret!pw", admin());
    let tx = provider.hold_session();
    let store = store_with(&provider);

    let mut init = Box::pin(store.initialize());
    assert!(futures::poll!(&mut init).is_pending());

    store.sign_in(&creds("admin@school.example", "s3cret!pw")).await.unwrap();
    tx.send(Ok(None)).unwrap();
    init.await;

    assert_eq!(store.snapshot(), AuthState { user: Some(admin()), loading: false });
}

#[tokio::test]
async fn initialize_result_wins_over_refresh_during_lookup() {
    let provider = Rc::new(FakeProvider::new());
    let tx = provider.hold_session();
    let store = store_with(&provider);
    store.subscribe_to_changes().detach();

    let mut init = Box::pin(store.initialize());
    assert!(futures::poll!(&mut init).is_pending());

    // Refresh succeeds, then the user lookup is rejected.
    provider.emit(&SessionChange { event: SessionEvent::TokenRefreshed, user: Some(admin()) });
    assert_eq!(store.user(), Some(admin()));
    tx.send(Ok(None)).unwrap();
    init.await;

    assert_eq!(store.snapshot(), AuthState { user: None, loading: false });
}

#[tokio::test]
async fn initialize_keeps_sign_out_notification_that_landed_first() {
    let provider = Rc::new(FakeProvider::new());
    let tx = provider.hold_session();
    let store = store_with(&provider);
    store.subscribe_to_changes().detach();

    let mut init = Box::pin(store.initialize());
    assert!(futures::poll!(&mut init).is_pending());

    provider.emit(&SessionChange::signed_out());
    tx.send(Ok(Some(admin()))).unwrap();
    init.await;

    assert_eq!(store.snapshot(), AuthState { user: None, loading: false });
}

// =============================================================
// subscribe_to_changes
// =============================================================

#[tokio::test]
async fn change_notification_updates_user() {
    let provider = Rc::new(FakeProvider::with_session(admin()));
    let store = store_with(&provider);
    store.subscribe_to_changes().detach();
    store.initialize().await;

    provider.emit(&SessionChange::signed_out());
    assert!(store.user().is_none());
    assert!(!store.is_loading());

    provider.emit(&SessionChange::signed_in(admin()));
    assert_eq!(store.user(), Some(admin()));
}

#[tokio::test]
async fn user_updated_notification_refreshes_profile() {
    let provider = Rc::new(FakeProvider::with_session(admin()));
    let store = store_with(&provider);
    store.subscribe_to_changes().detach();
    store.initialize().await;

    let mut renamed = admin();
    renamed.attributes.insert("first_name".to_owned(), serde_json::Value::String("Ada".to_owned()));
    provider.emit(&SessionChange::user_updated(renamed.clone()));

    assert_eq!(store.user(), Some(renamed));
    assert!(!store.is_loading());
}

#[test]
fn change_notification_does_not_clear_loading() {
    let provider = Rc::new(FakeProvider::new());
    let store = store_with(&provider);
    let _subscription = store.subscribe_to_changes();

    provider.emit(&SessionChange::signed_in(admin()));
    assert_eq!(store.user(), Some(admin()));
    assert!(store.is_loading());
}

#[test]
fn change_notification_ignored_after_teardown() {
    let provider = Rc::new(FakeProvider::new());
    let store = store_with(&provider);
    store.subscribe_to_changes().detach();
    assert_eq!(provider.listeners.len(), 1);

    store.teardown();
    assert!(provider.listeners.is_empty());

    provider.emit(&SessionChange::signed_in(admin()));
    assert!(store.user().is_none());
}

#[test]
fn resubscribing_replaces_previous_registration() {
    let provider = Rc::new(FakeProvider::new());
    let store = store_with(&provider);
    let first = store.subscribe_to_changes();
    let _second = store.subscribe_to_changes();
    assert_eq!(provider.listeners.len(), 1);

    // The stale handle must not release the newer registration.
    first.dispose();
    assert_eq!(provider.listeners.len(), 1);
    provider.emit(&SessionChange::signed_in(admin()));
    assert_eq!(store.user(), Some(admin()));
}

#[test]
fn disposing_subscription_stops_notifications() {
    let provider = Rc::new(FakeProvider::new());
    let store = store_with(&provider);
    let subscription = store.subscribe_to_changes();
    assert_eq!(provider.listeners.len(), 1);

    subscription.dispose();
    assert!(provider.listeners.is_empty());
    provider.emit(&SessionChange::signed_in(admin()));
    assert!(store.user().is_none());
}

#[test]
fn dropping_subscription_unregisters() {
    let provider = Rc::new(FakeProvider::new());
    let store = store_with(&provider);
    drop(store.subscribe_to_changes());
    assert!(provider.listeners.is_empty());
}

// =============================================================
// sign_in / sign_out
// =============================================================

#[tokio::test]
async fn sign_in_success_sets_user() {
    let provider = Rc::new(FakeProvider::new());
    provider.add_account("admin@school.example", "s3cret!pw", admin());
    let store = store_with(&provider);
    store.initialize().await;

    let signed_in = store.sign_in(&creds("admin@school.example", "s3cret!pw")).await.unwrap();
    assert_eq!(signed_in, admin());
    assert_eq!(store.user(), Some(admin()));
}

#[tokio::test]
async fn sign_in_failure_reports_auth_failure_and_keeps_state() {
    let provider = Rc::new(FakeProvider::new());
    let store = store_with(&provider);
    store.initialize().await;

    let err = store.sign_in(&creds("nobody@school.example", "x")).await.unwrap_err();
    assert!(matches!(err, IdentityError::AuthFailure(_)));
    assert_eq!(store.snapshot(), AuthState { user: None, loading: false });
}

#[tokio::test]
async fn sign_in_after_teardown_reports_torn_down() {
    let provider = Rc::new(FakeProvider::new());
    provider.add_account("admin@school.example", "s3cret!pw", admin());
    let store = store_with(&provider);
    store.teardown();

    let err = store.sign_in(&creds("admin@school.example", "s3cret!pw")).await.unwrap_err();
    assert_eq!(err, IdentityError::ComponentTornDown);
    assert!(store.user().is_none());
}

#[tokio::test]
async fn sign_out_clears_user() {
    let provider = Rc::new(FakeProvider::with_session(admin()));
    let store = store_with(&provider);
    store.initialize().await;

    store.sign_out().await.unwrap();
    assert!(store.user().is_none());
    assert_eq!(provider.sign_out_calls.get(), 1);
}

#[tokio::test]
async fn sign_out_when_unauthenticated_is_idempotent() {
    let provider = Rc::new(FakeProvider::new());
    let store = store_with(&provider);
    store.initialize().await;

    assert_eq!(store.sign_out().await, Ok(()));
    assert_eq!(store.sign_out().await, Ok(()));
    assert!(store.user().is_none());
    assert!(!store.is_loading());
}

#[tokio::test]
async fn sign_out_provider_failure_still_clears_session() {
    let provider = Rc::new(FakeProvider::with_session(admin()));
    *provider.sign_out_error.borrow_mut() = Some(IdentityError::ProviderUnavailable("offline".to_owned()));
    let store = store_with(&provider);
    store.initialize().await;

    let result = store.sign_out().await;
    assert!(matches!(result, Err(IdentityError::ProviderUnavailable(_))));
    assert!(store.user().is_none());
}

// =============================================================
// watch
// =============================================================

#[tokio::test]
async fn watchers_see_each_transition() {
    let provider = Rc::new(FakeProvider::with_session(admin()));
    let store = store_with(&provider);
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sub = {
        let seen = Rc::clone(&seen);
        store.watch(move |state| seen.borrow_mut().push(state.clone()))
    };

    store.initialize().await;
    store.sign_out().await.unwrap();

    let seen = seen.borrow();
    assert_eq!(seen.len(), 2);
    assert_eq!(seen[0], AuthState { user: Some(admin()), loading: false });
    assert_eq!(seen[1], AuthState { user: None, loading: false });
    drop(sub);
}

#[tokio::test]
async fn dropped_watch_stops_notifications() {
    let provider = Rc::new(FakeProvider::with_session(admin()));
    let store = store_with(&provider);
    let count = Rc::new(std::cell::Cell::new(0));
    let sub = {
        let count = Rc::clone(&count);
        store.watch(move |_| count.set(count.get() + 1))
    };
    drop(sub);
    store.initialize().await;
    assert_eq!(count.get(), 0);
}

#[test]
fn teardown_is_idempotent() {
    let provider = Rc::new(FakeProvider::new());
    let store = store_with(&provider);
    store.teardown();
    store.teardown();
    assert!(store.is_torn_down());
}
