//! # tibot-client
//!
//! Leptos + WASM frontend for the TI-BOT website and dashboard shell.
//!
//! This crate contains the public pages, the login and signup forms, the
//! session store that wraps the identity provider, and the route guard that
//! keeps dashboard screens behind sign-in. The server crate renders it with
//! SSR; the `hydrate` build takes over in the browser.

pub mod app;
pub mod components;
pub mod config;
pub mod net;
pub mod pages;
pub mod state;
pub mod util;

/// WASM entry point: attach to the server-rendered document.
#[cfg(feature = "hydrate")]
#[wasm_bindgen::prelude::wasm_bindgen]
pub fn hydrate() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Debug);
    leptos::mount::hydrate_body(app::App);
}
