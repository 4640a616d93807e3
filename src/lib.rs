pub mod auth;
pub mod cli;
pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod state;

use axum::{
    http::{HeaderValue, Method},
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub use state::AppState;

/// Build the full HTTP application.
///
/// Layers run outermost first: trace → CORS → authentication → policy → route.
pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(public_routes())
        .merge(topic_routes())
        .merge(account_routes())
        .layer(axum_middleware::from_fn(middleware::enforce))
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::authenticate,
        ))
        .layer(cors_layer(&state))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn public_routes() -> Router<AppState> {
    use handlers::public;

    Router::new()
        .route("/auth", post(public::login))
        .route("/usuarios", post(public::register))
}

fn topic_routes() -> Router<AppState> {
    use handlers::protected::{replies, topics};

    Router::new()
        .route("/topicos", get(topics::list).post(topics::create))
        .route(
            "/topicos/:id",
            get(topics::get).put(topics::update).delete(topics::delete),
        )
        .route(
            "/topicos/:id/replies",
            get(replies::list).post(replies::create),
        )
}

fn account_routes() -> Router<AppState> {
    use handlers::protected::{stats, users};

    Router::new()
        .route("/usuarios/me", get(users::me))
        .route("/stats", get(stats::get))
}

fn cors_layer(state: &AppState) -> CorsLayer {
    let security = &state.config.security;
    if !security.enable_cors {
        return CorsLayer::new();
    }

    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
        ])
}
