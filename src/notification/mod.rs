pub mod dispatcher;
pub mod handlers;
pub mod mailer;
pub mod models;
pub mod queue;
pub mod routes;
