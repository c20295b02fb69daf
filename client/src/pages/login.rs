//! Login page: email + password sign-in with post-login return.
//!
//! SYSTEM CONTEXT
//! ==============
//! Protected routes redirect here with `?next=<path>`. A successful sign-in
//! replaces the history entry with that path (or `/`). The signup page links
//! back with `?notice=signup` to show its confirmation message.
//!
//! When `login_locked` is set the form stays visible but submission is
//! disabled behind a "System Locked" banner.

#[cfg(test)]
#[path = "login_test.rs"]
mod login_test;

use leptos::prelude::*;
#[cfg(feature = "hydrate")]
use leptos_router::NavigateOptions;
use leptos_router::components::A;
use leptos_router::hooks::{use_navigate, use_query_map};

use crate::app::SessionHandle;
use crate::components::password_input::PasswordInput;
use crate::config::PublicConfig;
#[cfg(any(test, feature = "hydrate"))]
use crate::net::identity::IdentityError;
use crate::net::types::Credentials;
use crate::util::auth::{NEXT_PARAM, post_login_destination};

pub const NOTICE_PARAM: &str = "notice";
pub const SIGNUP_NOTICE: &str = "signup";

pub(crate) const LOCKED_MESSAGE: &str =
    "The TI-BOT system is currently locked for your location. Please contact Octa Node Engineering for access.";
const MISSING_INPUT_MESSAGE: &str = "Enter both email and password.";
#[cfg(any(test, feature = "hydrate"))]
const DEFAULT_FAILURE_MESSAGE: &str = "Invalid email or password";
#[cfg(any(test, feature = "hydrate"))]
const UNAVAILABLE_MESSAGE: &str = "Sign-in is temporarily unavailable. Please try again.";

fn validate_login_input(email: &str, password: &str) -> Result<Credentials, &'static str> {
    let email = email.trim();
    if email.is_empty() || password.is_empty() {
        return Err(MISSING_INPUT_MESSAGE);
    }
    Ok(Credentials { email: email.to_owned(), password: password.to_owned() })
}

#[cfg(any(test, feature = "hydrate"))]
fn sign_in_error_message(error: &IdentityError) -> String {
    match error {
        IdentityError::AuthFailure(msg) if !msg.trim().is_empty() => msg.clone(),
        IdentityError::AuthFailure(_) | IdentityError::ComponentTornDown => DEFAULT_FAILURE_MESSAGE.to_owned(),
        IdentityError::ProviderUnavailable(_) => UNAVAILABLE_MESSAGE.to_owned(),
    }
}

fn notice_message(notice: Option<&str>) -> Option<&'static str> {
    match notice {
        Some(SIGNUP_NOTICE) => Some("Account created. Check your email to confirm your address, then sign in."),
        _ => None,
    }
}

fn submit_label(locked: bool, busy: bool) -> &'static str {
    if locked {
        "System Locked - Contact Support"
    } else if busy {
        "Signing in..."
    } else {
        "Sign in"
    }
}

#[component]
pub fn LoginPage() -> impl IntoView {
    let store = expect_context::<SessionHandle>();
    let locked = use_context::<PublicConfig>().unwrap_or_default().login_locked;
    let query = use_query_map();
    let navigate = use_navigate();

    let email = RwSignal::new(String::new());
    let password = RwSignal::new(String::new());
    let busy = RwSignal::new(false);
    let error = RwSignal::new(None::<String>);

    let notice = move || query.with(|q| notice_message(q.get(NOTICE_PARAM).as_deref()));

    let on_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        if busy.get_untracked() {
            return;
        }
        if locked {
            error.set(Some(LOCKED_MESSAGE.to_owned()));
            return;
        }
        let credentials = match validate_login_input(&email.get_untracked(), &password.get_untracked()) {
            Ok(credentials) => credentials,
            Err(msg) => {
                error.set(Some(msg.to_owned()));
                return;
            }
        };
        let destination = post_login_destination(query.with_untracked(|q| q.get(NEXT_PARAM)).as_deref());
        busy.set(true);
        error.set(None);

        #[cfg(feature = "hydrate")]
        {
            let store = store.get_value();
            let navigate = navigate.clone();
            leptos::task::spawn_local(async move {
                match store.sign_in(&credentials).await {
                    Ok(_) => navigate(&destination, NavigateOptions { replace: true, ..NavigateOptions::default() }),
                    Err(IdentityError::ComponentTornDown) => {}
                    Err(e) => {
                        log::debug!("sign-in failed: {e}");
                        let _ = error.try_set(Some(sign_in_error_message(&e)));
                        let _ = busy.try_set(false);
                    }
                }
            });
        }
        #[cfg(not(feature = "hydrate"))]
        let _ = (credentials, destination, &navigate, store);
    };

    view! {
        <div class="auth-page">
            <div class="auth-card">
                <h1>"Welcome back"</h1>
                <p class="auth-card__subtitle">"Enter your credentials to access your account"</p>
                {locked
                    .then(|| {
                        view! {
                            <div class="banner banner--warning" role="alert">
                                <h3>"System Locked"</h3>
                                <p>{LOCKED_MESSAGE}</p>
                            </div>
                        }
                    })}
                {move || notice().map(|msg| view! { <div class="banner banner--success">{msg}</div> })}
                {move || error.get().map(|msg| view! { <div class="banner banner--error">{msg}</div> })}
                <form class="auth-form" on:submit=on_submit>
                    <div class="field">
                        <label for="email">"Email"</label>
                        <input
                            id="email"
                            type="email"
                            required
                            autocomplete="email"
                            prop:value=move || email.get()
                            on:input=move |ev| email.set(event_target_value(&ev))
                        />
                    </div>
                    <PasswordInput id="password" label="Password" value=password required=true/>
                    <button type="submit" class="button button--primary" disabled=move || locked || busy.get()>
                        {move || submit_label(locked, busy.get())}
                    </button>
                </form>
                <p class="auth-card__footer">"Don't have an account? " <A href="/signup">"Sign up"</A></p>
            </div>
        </div>
    }
}
