//! Password field with a show/hide toggle.

#[cfg(test)]
#[path = "password_input_test.rs"]
mod password_input_test;

use leptos::prelude::*;

/// What the field holds, so password managers offer to fill or to save.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PasswordPurpose {
    #[default]
    Current,
    New,
}

impl PasswordPurpose {
    #[must_use]
    pub fn autocomplete(self) -> &'static str {
        match self {
            Self::Current => "current-password",
            Self::New => "new-password",
        }
    }
}

#[component]
pub fn PasswordInput(
    id: &'static str,
    label: &'static str,
    value: RwSignal<String>,
    #[prop(optional)] required: bool,
    #[prop(optional)] purpose: PasswordPurpose,
) -> impl IntoView {
    let visible = RwSignal::new(false);

    view! {
        <div class="field">
            <label for=id>{label}</label>
            <div class="password-input">
                <input
                    id=id
                    type=move || if visible.get() { "text" } else { "password" }
                    required=required
                    autocomplete=purpose.autocomplete()
                    prop:value=move || value.get()
                    on:input=move |ev| value.set(event_target_value(&ev))
                />
                <button
                    type="button"
                    class="password-input__toggle"
                    aria-label=move || if visible.get() { "Hide password" } else { "Show password" }
                    on:click=move |_| visible.update(|v| *v = !*v)
                >
                    {move || if visible.get() { "Hide" } else { "Show" }}
                </button>
            </div>
        </div>
    }
}
