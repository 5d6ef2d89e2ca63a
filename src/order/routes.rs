use axum::{
    Router,
    routing::{get, patch},
};

use super::handlers;
use crate::state::AppState;

pub fn get_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/orders",
            get(handlers::get_orders).post(handlers::create_order),
        )
        .route(
            "/orders/{id}",
            get(handlers::get_order_by_id)
                .put(handlers::update_order)
                .delete(handlers::delete_order),
        )
        .route("/orders/{id}/status", patch(handlers::update_order_status))
}
