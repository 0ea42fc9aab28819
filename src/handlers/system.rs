use std::any::Any;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{Redirect, Response},
};

use crate::error::{ErrorBody, GENERIC_FAILURE};
use crate::state::AppState;

pub async fn health_check() -> &'static str {
    "OK"
}

/// Sends signed-in users to their dashboard and everyone else to login.
pub async fn home(State(state): State<AppState>, headers: HeaderMap) -> Redirect {
    match state.sessions.current_user(&headers) {
        Some(_) => Redirect::to("/api/dashboard"),
        None => Redirect::to("/api/auth/login"),
    }
}

pub async fn not_found() -> Response {
    ErrorBody::response(StatusCode::NOT_FOUND, "Page not found.")
}

/// Renders a panicking handler as the generic failure body.
pub fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = err
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| err.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    tracing::error!("Handler panicked: {}", detail);
    ErrorBody::response(StatusCode::INTERNAL_SERVER_ERROR, GENERIC_FAILURE)
}
