use axum::{
    Router,
    routing::{delete, get},
};

use super::handlers;
use crate::state::AppState;

pub fn get_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/measurements",
            get(handlers::get_measurements).post(handlers::create_measurement),
        )
        .route(
            "/measurements/{id}",
            delete(handlers::delete_measurement)
                .get(handlers::get_measurement_by_id)
                .put(handlers::update_measurement),
        )
}
