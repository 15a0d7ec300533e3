use std::sync::Arc;

use axum::routing::get;
use axum::{Extension, Router};

use crate::domain::service::Service;
use crate::infra::session_store::SessionStore;

use super::handlers;

/// Profile routes with their shared state attached as extensions.
#[must_use]
pub fn router(service: Arc<Service>, sessions: Arc<SessionStore>) -> Router {
    Router::new()
        .route(
            "/users/{id}",
            get(handlers::show_user).post(handlers::update_user),
        )
        .route("/users/{id}/edit", get(handlers::edit_user))
        .layer(Extension(service))
        .layer(Extension(sessions))
}
