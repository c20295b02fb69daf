//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! This module binds the small JSON API and stitches it with Leptos SSR
//! rendering under a single Axum router. Every SSR pass receives the public
//! identity settings as context and in the HTML shell.

use std::path::PathBuf;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use leptos::prelude::*;
use leptos_axum::{LeptosRoutes, generate_route_list};
use tibot_client::config::PublicConfig;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::config::ConfigError;
use crate::state::AppState;

/// Health and configuration endpoints.
pub fn api_routes(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/healthz", get(healthz))
        .route("/api/config", get(public_config))
        .layer(cors)
        .with_state(state)
}

/// API routes + Leptos SSR + `/pkg` assets.
///
/// # Errors
///
/// Returns [`ConfigError::Leptos`] if the Leptos configuration cannot be
/// loaded (missing or malformed `[workspace.metadata.leptos]`).
pub fn leptos_app(state: AppState) -> Result<Router, ConfigError> {
    let conf = get_configuration(None).map_err(|e| ConfigError::Leptos(e.to_string()))?;
    let leptos_options = conf.leptos_options;
    let routes = generate_route_list(tibot_client::app::App);
    let public = state.config.public();

    let leptos_router = Router::new()
        .leptos_routes_with_context(
            &leptos_options,
            routes,
            {
                let public = public.clone();
                move || provide_context(public.clone())
            },
            {
                let opts = leptos_options.clone();
                move || tibot_client::app::shell(opts.clone(), public.clone())
            },
        )
        .with_state(leptos_options.clone());

    let site_root_path = PathBuf::from(leptos_options.site_root.as_ref());

    Ok(api_routes(state)
        .merge(leptos_router)
        .nest_service("/pkg", ServeDir::new(site_root_path.join("pkg")))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http()))
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}

async fn public_config(State(state): State<AppState>) -> Json<PublicConfig> {
    Json(state.config.public())
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
