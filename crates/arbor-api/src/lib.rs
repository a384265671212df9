pub mod auth;
pub mod error;
pub mod messages;
pub mod middleware;
pub mod threads;

use axum::{
    Router,
    middleware::from_fn_with_state,
    routing::{get, post},
};

use crate::auth::AppState;
use crate::middleware::require_auth;

/// Assemble the API router. Reads are public; registration and login are
/// public by nature; everything that writes a message requires a bearer
/// token.
pub fn router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/messages", get(messages::list_messages))
        .with_state(state.clone());

    let protected_routes = Router::new()
        .route("/auth/me", get(auth::me))
        .route("/messages", post(messages::create_message))
        .route("/messages/{id}/comments", post(messages::create_comment))
        .layer(from_fn_with_state(state.clone(), require_auth))
        .with_state(state);

    Router::new().merge(public_routes).merge(protected_routes)
}
