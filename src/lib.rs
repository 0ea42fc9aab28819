pub mod auth;
pub mod config;
pub mod database;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod models;
pub mod services;
pub mod state;
pub mod utils;

use axum::{
    http::Method,
    middleware,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub use state::{build_state, AppState};

/// Full HTTP surface: public auth routes plus the session-gated portfolio
/// routes, with a JSON 404 for everything else.
pub fn app_router(state: AppState) -> Router {
    let protected = Router::new()
        .route("/api/dashboard", get(handlers::portfolio::dashboard))
        .route("/api/investments", post(handlers::investments::add_investment))
        .route(
            "/api/investments/:id",
            get(handlers::investments::get_investment)
                .put(handlers::investments::edit_investment)
                .delete(handlers::investments::delete_investment),
        )
        .route("/api/transactions", get(handlers::transactions::list_transactions))
        .route("/api/portfolio/export", get(handlers::import_export::export_csv))
        .route("/api/portfolio/import", post(handlers::import_export::import_csv))
        .route("/api/history/:symbol", get(handlers::history::symbol_history))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_session,
        ));

    Router::new()
        .route("/", get(handlers::system::home))
        .route("/health", get(handlers::system::health_check))
        .route("/api/auth/register", post(handlers::auth::register))
        .route("/api/auth/login", post(handlers::auth::login))
        .route(
            "/api/auth/logout",
            get(handlers::auth::logout).post(handlers::auth::logout),
        )
        .merge(protected)
        .fallback(handlers::system::not_found)
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CatchPanicLayer::custom(handlers::system::handle_panic))
                .layer(
                    CorsLayer::new()
                        .allow_origin(Any)
                        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
                        .allow_headers(Any),
                ),
        )
}
