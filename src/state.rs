use std::sync::Arc;

use crate::config::Config;
use crate::notification::dispatcher::Notifier;
use crate::utils::Pool;

/// Shared handles every handler can reach through `State`.
#[derive(Clone)]
pub struct AppState {
    pub pool: Pool,
    pub config: Arc<Config>,
    pub stripe: Option<stripe::Client>,
    pub notifier: Notifier,
}
