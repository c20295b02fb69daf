//! Authenticated landing page.
//!
//! Rendered only behind [`ProtectedRoute`](crate::components::protected_route::ProtectedRoute),
//! so a signed-in user is always present by the time this runs.

use leptos::prelude::*;
use leptos_router::components::A;

use crate::pages::sections::SECTIONS;
use crate::state::auth::AuthState;

#[component]
pub fn DashboardPage() -> impl IntoView {
    let auth = expect_context::<RwSignal<AuthState>>();
    let greeting = move || {
        auth.with(|state| match state.user.as_ref() {
            Some(user) => format!("Welcome, {}", user.display_name()),
            None => "Welcome".to_owned(),
        })
    };

    view! {
        <div class="dashboard-page">
            <h1>"Dashboard"</h1>
            <p class="dashboard-page__greeting">{greeting}</p>
            <ul class="dashboard-page__sections">
                {SECTIONS
                    .iter()
                    .map(|section| view! {
                        <li>
                            <A href=section.path>{section.title}</A>
                        </li>
                    })
                    .collect_view()}
            </ul>
        </div>
    }
}
