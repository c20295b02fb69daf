use std::cell::Cell;
use std::rc::Rc;

use super::test_helpers::{FakeProvider, user};
use super::*;

// =============================================================
// Listeners / Subscription
// =============================================================

#[test]
fn notify_reaches_every_listener() {
    let listeners = Listeners::<u32>::new();
    let total = Rc::new(Cell::new(0));
    let a = {
        let total = Rc::clone(&total);
        listeners.register(move |v| total.set(total.get() + v))
    };
    let b = {
        let total = Rc::clone(&total);
        listeners.register(move |v| total.set(total.get() + v * 10))
    };
    listeners.notify(&2);
    assert_eq!(total.get(), 22);
    drop((a, b));
}

#[test]
fn dropping_subscription_unregisters() {
    let listeners = Listeners::<u32>::new();
    let hits = Rc::new(Cell::new(0));
    let sub = {
        let hits = Rc::clone(&hits);
        listeners.register(move |_| hits.set(hits.get() + 1))
    };
    assert_eq!(listeners.len(), 1);
    drop(sub);
    assert!(listeners.is_empty());
    listeners.notify(&1);
    assert_eq!(hits.get(), 0);
}

#[test]
fn dispose_only_removes_its_own_entry() {
    let listeners = Listeners::<u32>::new();
    let first = listeners.register(|_| {});
    let second = listeners.register(|_| {});
    first.dispose();
    assert_eq!(listeners.len(), 1);
    drop(second);
    assert_eq!(listeners.len(), 0);
}

#[test]
fn detach_keeps_registration_until_clear() {
    let listeners = Listeners::<u32>::new();
    listeners.register(|_| {}).detach();
    assert_eq!(listeners.len(), 1);
    listeners.clear();
    assert!(listeners.is_empty());
}

#[test]
fn subscription_outliving_listeners_is_harmless() {
    let listeners = Listeners::<u32>::new();
    let sub = listeners.register(|_| {});
    drop(listeners);
    drop(sub);
}

#[test]
fn listener_may_register_during_notify() {
    let listeners = Listeners::<u32>::new();
    let inner = listeners.clone();
    listeners.register(move |_| inner.register(|_| {}).detach()).detach();
    listeners.notify(&0);
    assert_eq!(listeners.len(), 2);
}

#[test]
fn noop_subscription_debug_reports_inactive() {
    let sub = Subscription::noop();
    assert!(format!("{sub:?}").contains("false"));
}

// =============================================================
// IdentityError
// =============================================================

#[test]
fn auth_failure_displays_provider_message() {
    let err = IdentityError::AuthFailure("Invalid login credentials".to_owned());
    assert_eq!(err.to_string(), "Invalid login credentials");
}

#[test]
fn provider_unavailable_display_is_prefixed() {
    let err = IdentityError::ProviderUnavailable("timeout".to_owned());
    assert_eq!(err.to_string(), "identity provider unavailable: timeout");
}

// =============================================================
// UnconfiguredProvider
// =============================================================

#[tokio::test]
async fn unconfigured_provider_reports_unavailable() {
    let provider = UnconfiguredProvider;
    assert!(matches!(
        provider.get_current_session().await,
        Err(IdentityError::ProviderUnavailable(_))
    ));
    assert!(matches!(
        provider.sign_in("a@b.com", "pw").await,
        Err(IdentityError::ProviderUnavailable(_))
    ));
    assert_eq!(provider.sign_out().await, Ok(()));
}

// =============================================================
// FakeProvider
// =============================================================

#[tokio::test]
async fn fake_provider_checks_credentials() {
    let provider = FakeProvider::new();
    provider.add_account("admin@school.example", "s3cret!x", user("u1", "admin@school.example"));
    assert_eq!(
        provider.sign_in("admin@school.example", "s3cret!x").await.unwrap().id,
        "u1"
    );
    assert!(matches!(
        provider.sign_in("admin@school.example", "wrong").await,
        Err(IdentityError::AuthFailure(_))
    ));
}

#[tokio::test]
async fn fake_provider_held_session_resolves_from_channel() {
    let provider = FakeProvider::new();
    let tx = provider.hold_session();
    tx.send(Ok(Some(user("u2", "x@y.z")))).unwrap();
    let session = provider.get_current_session().await.unwrap();
    assert_eq!(session.map(|u| u.id), Some("u2".to_owned()));
}
