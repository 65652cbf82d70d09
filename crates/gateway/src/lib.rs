//! # Papaya Gateway Crate
//!
//! HTTP surface of the Papaya backend. Routes decode JSON, resolve the caller
//! through the [`middleware::AuthUser`] guard, and delegate to the
//! authenticator and note service held in [`AppState`].

mod error;
mod state;

pub mod docs;
pub mod middleware;
pub mod routes;

pub use docs::ApiDoc;
pub use error::{ApiError, ErrorResponse};
pub use middleware::AuthUser;
pub use state::AppState;

use axum::{
    middleware as axum_middleware,
    routing::{get, post, put},
    Router,
};

/// Create the main application router with all routes
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(routes::health::index))
        .route("/health", get(routes::health::health_check))
        .route("/api-docs/openapi.json", get(routes::health::openapi_json))
        // Account routes
        .route("/register", post(routes::auth::register))
        .route("/login", post(routes::auth::login))
        .route("/update-password", post(routes::auth::update_password))
        .route(
            "/profile",
            get(routes::profile::get_profile).put(routes::profile::update_profile),
        )
        // Note routes
        .route(
            "/notes",
            get(routes::notes::list_notes).post(routes::notes::create_note),
        )
        .route("/notes/search", get(routes::notes::search_notes))
        .route(
            "/notes/:id",
            get(routes::notes::get_note)
                .put(routes::notes::update_note)
                .delete(routes::notes::delete_note),
        )
        .route("/notes/:id/star", put(routes::notes::toggle_star))
        .route("/notes/:id/share", post(routes::notes::share_note))
        .with_state(state)
        .layer(axum_middleware::from_fn(middleware::logging_middleware))
        .layer(middleware::trace_layer())
        .layer(middleware::cors_layer())
}
