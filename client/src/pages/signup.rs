//! Signup page: organization + admin-user registration.
//!
//! SYSTEM CONTEXT
//! ==============
//! The form collects organization details and the first admin user, checks
//! the password policy live, and registers the account with the identity
//! provider. Organization records themselves are created server-side by the
//! backend, which reads the metadata attached here.

#[cfg(test)]
#[path = "signup_test.rs"]
mod signup_test;

use leptos::prelude::*;
use leptos_router::NavigateOptions;
use leptos_router::components::A;
use leptos_router::hooks::use_navigate;

use crate::app::RegistrarHandle;
use crate::components::form_field::TextField;
use crate::components::password_input::{PasswordInput, PasswordPurpose};
use crate::components::password_requirements::PasswordRequirementList;
use crate::net::identity::{IdentityError, SignUpRequest};
use crate::pages::login::{NOTICE_PARAM, SIGNUP_NOTICE};
use crate::util::password::PasswordRequirements;

const DEFAULT_FAILURE_MESSAGE: &str = "Signup failed. Please try again.";
const FALLBACK_TIMEZONE: &str = "UTC";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OrgType {
    #[default]
    School,
    University,
    Business,
}

impl OrgType {
    pub const ALL: [Self; 3] = [Self::School, Self::University, Self::Business];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::School => "school",
            Self::University => "university",
            Self::Business => "business",
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::School => "School",
            Self::University => "University",
            Self::Business => "Business",
        }
    }

    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == raw)
    }
}

/// Raw signup form contents.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SignupForm {
    pub org_name: String,
    pub org_type: OrgType,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub country: String,
    pub timezone: String,
    pub password: String,
    pub confirm_password: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum SignupError {
    #[error("{0} is required.")]
    MissingField(&'static str),
    #[error("Enter a valid email address.")]
    InvalidEmail,
    #[error("Password does not meet the requirements.")]
    WeakPassword,
    #[error("Passwords do not match.")]
    PasswordMismatch,
}

fn looks_like_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain.split('.').count() >= 2
        && domain.split('.').all(|part| !part.is_empty())
        && !email.chars().any(char::is_whitespace)
}

/// Check the form and build the provider registration request.
///
/// # Errors
///
/// Returns the first problem found, in form order.
pub fn validate_signup(form: &SignupForm) -> Result<SignUpRequest, SignupError> {
    let org_name = form.org_name.trim();
    let first_name = form.first_name.trim();
    let last_name = form.last_name.trim();
    let email = form.email.trim();

    let required = [
        ("Organization name", org_name),
        ("First name", first_name),
        ("Last name", last_name),
        ("Email", email),
        ("Password", form.password.as_str()),
    ];
    if let Some((field, _)) = required.iter().find(|(_, value)| value.is_empty()) {
        return Err(SignupError::MissingField(field));
    }
    if !looks_like_email(email) {
        return Err(SignupError::InvalidEmail);
    }
    if !PasswordRequirements::check(&form.password).all_met() {
        return Err(SignupError::WeakPassword);
    }
    if form.password != form.confirm_password {
        return Err(SignupError::PasswordMismatch);
    }

    let timezone = match form.timezone.trim() {
        "" => FALLBACK_TIMEZONE,
        tz => tz,
    };
    let mut metadata = serde_json::Map::new();
    for (key, value) in [
        ("first_name", first_name),
        ("last_name", last_name),
        ("phone", form.phone.trim()),
        ("organization_name", org_name),
        ("organization_type", form.org_type.as_str()),
        ("address", form.address.trim()),
        ("country", form.country.trim()),
        ("timezone", timezone),
        // Filled in by the backend once the organization row exists.
        ("org_id", ""),
    ] {
        metadata.insert(key.to_owned(), serde_json::Value::String(value.to_owned()));
    }

    Ok(SignUpRequest { email: email.to_owned(), password: form.password.clone(), metadata })
}

fn signup_error_message(error: &IdentityError) -> String {
    match error {
        IdentityError::AuthFailure(msg) if !msg.trim().is_empty() => msg.clone(),
        _ => DEFAULT_FAILURE_MESSAGE.to_owned(),
    }
}

/// Where to go after a successful registration. The login page shows the
/// confirmation notice; a session issued by the provider is picked up there.
fn signup_destination() -> String {
    format!("/login?{NOTICE_PARAM}={SIGNUP_NOTICE}")
}

/// Browser time zone, or UTC outside the browser.
fn default_timezone() -> String {
    #[cfg(feature = "hydrate")]
    {
        let options = js_sys::Intl::DateTimeFormat::new(&js_sys::Array::new(), &js_sys::Object::new()).resolved_options();
        if let Some(tz) = js_sys::Reflect::get(&options, &"timeZone".into())
            .ok()
            .and_then(|v| v.as_string())
        {
            return tz;
        }
    }
    FALLBACK_TIMEZONE.to_owned()
}

#[component]
pub fn SignupPage() -> impl IntoView {
    let registrar = expect_context::<RegistrarHandle>();
    let navigate = use_navigate();

    let org_name = RwSignal::new(String::new());
    let org_type = RwSignal::new(OrgType::default());
    let first_name = RwSignal::new(String::new());
    let last_name = RwSignal::new(String::new());
    let email = RwSignal::new(String::new());
    let phone = RwSignal::new(String::new());
    let address = RwSignal::new(String::new());
    let country = RwSignal::new(String::new());
    let timezone = RwSignal::new(default_timezone());
    let password = RwSignal::new(String::new());
    let confirm_password = RwSignal::new(String::new());

    let busy = RwSignal::new(false);
    let error = RwSignal::new(None::<String>);
    let requirements = Memo::new(move |_| PasswordRequirements::check(&password.get()));

    let on_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        if busy.get_untracked() {
            return;
        }
        let form = SignupForm {
            org_name: org_name.get_untracked(),
            org_type: org_type.get_untracked(),
            first_name: first_name.get_untracked(),
            last_name: last_name.get_untracked(),
            email: email.get_untracked(),
            phone: phone.get_untracked(),
            address: address.get_untracked(),
            country: country.get_untracked(),
            timezone: timezone.get_untracked(),
            password: password.get_untracked(),
            confirm_password: confirm_password.get_untracked(),
        };
        let request = match validate_signup(&form) {
            Ok(request) => request,
            Err(e) => {
                error.set(Some(e.to_string()));
                return;
            }
        };
        busy.set(true);
        error.set(None);

        let registrar = registrar.get_value();
        let navigate = navigate.clone();
        leptos::task::spawn_local(async move {
            match registrar.sign_up(&request).await {
                Ok(outcome) => {
                    log::debug!("signup complete: {outcome:?}");
                    navigate(&signup_destination(), NavigateOptions::default());
                }
                Err(e) => {
                    log::debug!("signup failed: {e}");
                    let _ = error.try_set(Some(signup_error_message(&e)));
                    let _ = busy.try_set(false);
                }
            }
        });
    };

    view! {
        <div class="auth-page">
            <div class="auth-card auth-card--wide">
                <h1>"Create an account"</h1>
                <p class="auth-card__subtitle">"Enter your information to create an account"</p>
                {move || error.get().map(|msg| view! { <div class="banner banner--error">{msg}</div> })}
                <form class="auth-form" on:submit=on_submit>
                    <TextField id="orgName" label="Organization Name" value=org_name required=true/>
                    <div class="field">
                        <label for="orgType">"Organization Type"</label>
                        <select
                            id="orgType"
                            prop:value=move || org_type.get().as_str()
                            on:change=move |ev| {
                                if let Some(kind) = OrgType::parse(&event_target_value(&ev)) {
                                    org_type.set(kind);
                                }
                            }
                        >
                            {OrgType::ALL
                                .into_iter()
                                .map(|kind| view! { <option value=kind.as_str()>{kind.label()}</option> })
                                .collect_view()}
                        </select>
                    </div>

                    <h2>"Admin User Details"</h2>
                    <div class="field-row">
                        <TextField id="firstName" label="First Name" value=first_name required=true/>
                        <TextField id="lastName" label="Last Name" value=last_name required=true/>
                    </div>
                    <TextField id="email" label="Email" value=email input_type="email" required=true/>
                    <TextField id="phone" label="Phone" value=phone input_type="tel"/>
                    <TextField id="address" label="Address" value=address/>
                    <div class="field-row">
                        <TextField id="country" label="Country" value=country/>
                        <TextField id="timezone" label="Timezone" value=timezone/>
                    </div>

                    <PasswordInput id="password" label="Password" value=password required=true purpose=PasswordPurpose::New/>
                    <PasswordRequirementList requirements=requirements/>
                    <PasswordInput
                        id="confirmPassword"
                        label="Confirm Password"
                        value=confirm_password
                        purpose=PasswordPurpose::New
                    />

                    <button type="submit" class="button button--primary" disabled=move || busy.get()>
                        {move || if busy.get() { "Creating account..." } else { "Create account" }}
                    </button>
                </form>
                <p class="auth-card__footer">"Already have an account? " <A href="/login">"Sign in"</A></p>
            </div>
        </div>
    }
}
