//! Reusable UI component modules.
//!
//! SYSTEM CONTEXT
//! ==============
//! Components read shared auth state from Leptos context providers installed
//! by `app::App`.

pub mod form_field;
pub mod loading;
pub mod password_input;
pub mod password_requirements;
pub mod protected_route;
pub mod site_nav;
