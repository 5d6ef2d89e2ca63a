use axum::{Router, routing::get};

use super::handlers;
use crate::state::AppState;

pub fn get_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/bills",
            get(handlers::get_bills).post(handlers::create_bill),
        )
        .route(
            "/bills/{id}",
            get(handlers::get_bill_by_id)
                .put(handlers::update_bill)
                .delete(handlers::delete_bill),
        )
}
