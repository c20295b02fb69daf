//! Route wrapper that gates a view on the current session.
//!
//! The guard decision is recomputed inside a reactive closure, so it re-runs
//! whenever `AuthState` or the location changes: a user who just signed in is
//! never stranded on the placeholder, and a signed-out user never sees the
//! protected view.

use leptos::prelude::*;
use leptos_router::NavigateOptions;
use leptos_router::components::Redirect;
use leptos_router::hooks::use_location;

use crate::components::loading::LoadingScreen;
use crate::state::auth::AuthState;
use crate::util::auth::{GuardDecision, LOGIN_PATH, evaluate_guard};

#[component]
pub fn ProtectedRoute(children: ChildrenFn) -> impl IntoView {
    let auth = expect_context::<RwSignal<AuthState>>();
    let location = use_location();

    move || {
        let path = location.pathname.get();
        match evaluate_guard(&auth.get(), &path, children.clone()) {
            GuardDecision::Loading => view! { <LoadingScreen/> }.into_any(),
            decision @ GuardDecision::Redirect { .. } => {
                let url = decision.redirect_url().unwrap_or_else(|| LOGIN_PATH.to_owned());
                log::debug!("guard redirect: {path} -> {url}");
                view! {
                    <Redirect path=url options=NavigateOptions { replace: true, ..NavigateOptions::default() }/>
                }
                .into_any()
            }
            GuardDecision::Render(view) => view().into_any(),
        }
    }
}
