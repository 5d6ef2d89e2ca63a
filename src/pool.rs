use diesel_async::{AsyncPgConnection, pooled_connection::AsyncDieselConnectionManager};

use crate::utils::Pool;

pub async fn get_pool(database_url: &str, max_size: u32) -> Result<Pool, String> {
    let config = AsyncDieselConnectionManager::<AsyncPgConnection>::new(database_url);
    let pool = bb8::Pool::builder()
        .max_size(max_size)
        .build(config)
        .await
        .map_err(|e| format!("Failed to create db pool: {}", e))?;

    Ok(pool)
}
