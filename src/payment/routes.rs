use axum::{
    Router,
    routing::{get, post},
};

use super::handlers;
use crate::state::AppState;

pub fn get_routes() -> Router<AppState> {
    Router::new()
        .route("/payments/intent", post(handlers::create_payment_intent))
        .route("/payments/process", post(handlers::process_payment))
        .route("/payments/history", get(handlers::get_payment_history))
}
