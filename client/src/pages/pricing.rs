//! Public pricing page.

use leptos::prelude::*;
use leptos_router::components::A;

struct Component {
    name: &'static str,
    price: &'static str,
}

const COMPONENTS: [Component; 3] = [
    Component { name: "Control Brain (school power)", price: "₦300,000" },
    Component { name: "Control Brain (with solar)", price: "₦620,000" },
    Component { name: "Audio Distribution Unit", price: "₦190,000 / unit" },
];

#[component]
pub fn PricingPage() -> impl IntoView {
    view! {
        <div class="pricing-page">
            <h1>"Pricing"</h1>
            <h2>"System Components & Costs"</h2>
            <ul class="pricing-grid">
                {COMPONENTS
                    .iter()
                    .map(|c| view! {
                        <li class="pricing-card">
                            <h3>{c.name}</h3>
                            <div class="pricing-card__price">{c.price}</div>
                        </li>
                    })
                    .collect_view()}
            </ul>
            <p>"Ready to transform your school? " <A href="/signup">"Create an account"</A></p>
        </div>
    }
}
