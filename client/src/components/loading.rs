//! Neutral full-screen placeholder shown while the session is resolving.

use leptos::prelude::*;

#[component]
pub fn LoadingScreen() -> impl IntoView {
    view! {
        <div class="loading-screen" role="status" aria-live="polite">
            <div class="loading-screen__spinner"></div>
            <span class="visually-hidden">"Loading..."</span>
        </div>
    }
}
