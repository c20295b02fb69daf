//! Public landing page.

use leptos::prelude::*;
use leptos_router::components::A;

const FEATURES: [(&str, &str); 3] = [
    ("Automated Scheduling", "Classes start and end on time without a manual bell."),
    ("Campus Communication", "Announcements and emergency notices reach every building."),
    ("Safety & Security", "An emergency button triggers campus-wide alerts."),
];

#[component]
pub fn WelcomePage() -> impl IntoView {
    view! {
        <div class="welcome-page">
            <section class="hero">
                <h1>"TI-BOT"</h1>
                <p>"School automation for bells, announcements and alerts."</p>
                <div class="hero__actions">
                    <A href="/signup">"Get started"</A>
                    <A href="/pricing">"Pricing"</A>
                </div>
            </section>
            <section class="features">
                <h2>"Featured Solutions"</h2>
                <ul>
                    {FEATURES
                        .iter()
                        .map(|(title, desc)| view! {
                            <li class="feature">
                                <h3>{*title}</h3>
                                <p>{*desc}</p>
                            </li>
                        })
                        .collect_view()}
                </ul>
            </section>
        </div>
    }
}
