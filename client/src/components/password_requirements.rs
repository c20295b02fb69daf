//! Live checklist for the signup password policy.

use leptos::prelude::*;

use crate::util::password::PasswordRequirements;

#[component]
pub fn PasswordRequirementList(#[prop(into)] requirements: Signal<PasswordRequirements>) -> impl IntoView {
    view! {
        <ul class="password-requirements">
            {move || {
                requirements
                    .get()
                    .checklist()
                    .into_iter()
                    .map(|(label, met)| {
                        let class = if met { "requirement requirement--met" } else { "requirement" };
                        view! { <li class=class>{label}</li> }
                    })
                    .collect_view()
            }}
        </ul>
    }
}
