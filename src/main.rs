use std::sync::Arc;

use diesel::Connection;
use diesel_async::AsyncPgConnection;
use diesel_async::async_connection_wrapper::AsyncConnectionWrapper;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use listenfd::ListenFd;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use axum_tailor::config::Config;
use axum_tailor::notification::dispatcher::Notifier;
use axum_tailor::notification::mailer::SmtpMailer;
use axum_tailor::notification::queue::EmailQueue;
use axum_tailor::state::AppState;
use axum_tailor::{app, pool};

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations/");

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("axum_tailor=debug,tower_http=debug,info")),
        )
        .init();

    let config = Config::from_env().expect("invalid configuration");

    let pool = pool::get_pool(&config.database_url, config.db_pool_size)
        .await
        .expect("failed to build the connection pool");

    run_migrations(&config.database_url)
        .await
        .expect("failed to run migrations");

    let mailer = match &config.smtp {
        Some(smtp) => Some(SmtpMailer::new(smtp).expect("invalid SMTP configuration")),
        None => None,
    };

    // E-mail is advisory: a dead broker downgrades to direct sends instead
    // of keeping the API from starting.
    let queue = match &config.rmq_url {
        Some(url) => match EmailQueue::connect(url).await {
            Ok(queue) => Some(queue),
            Err(er) => {
                tracing::warn!("email queue unavailable, falling back to direct sends: {er}");
                None
            }
        },
        None => None,
    };

    if let (Some(queue), Some(mailer)) = (&queue, &mailer) {
        queue.spawn_consumer(mailer.clone());
    }

    let notifier = Notifier::new(pool.clone(), queue, mailer);
    let stripe = config.stripe_secret_key.as_deref().map(stripe::Client::new);
    if stripe.is_none() {
        tracing::warn!("STRIPE_SECRET_KEY is not set, payment endpoints will refuse requests");
    }

    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        stripe,
        notifier,
    };

    let app = app(state);

    let mut listenfd = ListenFd::from_env();
    let listener = match listenfd.take_tcp_listener(0).unwrap() {
        // if we are given a tcp listener on listen fd 0, we use that one
        Some(listener) => {
            listener.set_nonblocking(true).unwrap();
            TcpListener::from_std(listener).unwrap()
        }
        // otherwise fall back to local listening
        None => TcpListener::bind(&config.bind_addr).await.unwrap(),
    };

    tracing::info!("listening on {}", listener.local_addr().unwrap());
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .unwrap();

    tracing::info!("server stopped, draining connections");
}

/// Embedded migrations run synchronously, so they get a blocking task and
/// a wrapped async connection of their own.
async fn run_migrations(database_url: &str) -> Result<(), String> {
    let url = database_url.to_owned();

    tokio::task::spawn_blocking(move || {
        let mut conn = AsyncConnectionWrapper::<AsyncPgConnection>::establish(&url)
            .map_err(|e| format!("failed to connect for migrations: {e}"))?;
        conn.run_pending_migrations(MIGRATIONS)
            .map(|_| ())
            .map_err(|e| format!("migration failed: {e}"))
    })
    .await
    .map_err(|e| format!("migration task panicked: {e}"))?
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("failed to install the ctrl-c handler");
    tracing::info!("shutdown signal received");
}
