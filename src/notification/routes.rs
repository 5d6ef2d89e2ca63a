use axum::{
    Router,
    routing::{delete, get, patch, post},
};

use super::handlers;
use crate::state::AppState;

pub fn get_routes() -> Router<AppState> {
    Router::new()
        .route("/notifications", get(handlers::get_notifications))
        .route("/notifications/alert", post(handlers::broadcast_alert))
        .route("/notifications/send", post(handlers::send_to_user))
        .route("/notifications/read-all", patch(handlers::mark_all_read))
        .route("/notifications/{id}/read", patch(handlers::mark_as_read))
        .route("/notifications/{id}", delete(handlers::delete_notification))
}
