//! Labelled single-line input bound to a string signal.

use leptos::prelude::*;

#[component]
pub fn TextField(
    id: &'static str,
    label: &'static str,
    value: RwSignal<String>,
    /// HTML input type; `text` when omitted.
    #[prop(optional)]
    input_type: &'static str,
    #[prop(optional)] required: bool,
) -> impl IntoView {
    let input_type = if input_type.is_empty() { "text" } else { input_type };

    view! {
        <div class="field">
            <label for=id>{label}</label>
            <input
                id=id
                type=input_type
                required=required
                prop:value=move || value.get()
                on:input=move |ev| value.set(event_target_value(&ev))
            />
        </div>
    }
}
