//! Top navigation with session-aware links.

use leptos::prelude::*;
use leptos_router::components::A;

use crate::app::SessionHandle;
use crate::state::auth::AuthState;

#[component]
pub fn SiteNav() -> impl IntoView {
    let auth = expect_context::<RwSignal<AuthState>>();
    let store = expect_context::<SessionHandle>();

    // The guard on the current page reacts to the cleared session and sends
    // the user to the login page.
    let on_sign_out = move |_| {
        #[cfg(feature = "hydrate")]
        {
            let store = store.get_value();
            leptos::task::spawn_local(async move {
                if let Err(e) = store.sign_out().await {
                    log::warn!("sign-out did not reach the identity provider: {e}");
                }
            });
        }
        #[cfg(not(feature = "hydrate"))]
        let _ = store;
    };

    let signed_in = move || auth.get().user.is_some();
    let user_label = move || auth.get().user.map(|u| u.display_name()).unwrap_or_default();

    view! {
        <nav class="site-nav">
            <A href="/">"TI-BOT"</A>
            <A href="/pricing">"Pricing"</A>
            <Show
                when=signed_in
                fallback=|| {
                    view! {
                        <A href="/login">"Sign in"</A>
                        <A href="/signup">"Sign up"</A>
                    }
                }
            >
                <A href="/dashboard">"Dashboard"</A>
                <span class="site-nav__user">{user_label}</span>
                <button type="button" class="button button--ghost" on:click=on_sign_out>
                    "Sign out"
                </button>
            </Show>
        </nav>
    }
}
