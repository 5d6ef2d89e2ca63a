pub mod admin;
pub mod auth;
pub mod bill;
pub mod config;
pub mod measurement;
pub mod notification;
pub mod order;
pub mod payment;
pub mod pool;
pub mod schema;
pub mod state;
pub mod utils;

use axum::Router;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;

/// Assembles the full application router: one router per domain module,
/// nested under `/api`, with request tracing and CORS for the SPA.
pub fn app(state: AppState) -> Router {
    let api = Router::new()
        .merge(auth::routes::get_routes())
        .merge(measurement::routes::get_routes())
        .merge(order::routes::get_routes())
        .merge(bill::routes::get_routes())
        .merge(payment::routes::get_routes())
        .merge(notification::routes::get_routes())
        .merge(admin::routes::get_routes());

    Router::new()
        .nest("/api", api)
        .fallback(utils::handler_404)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
