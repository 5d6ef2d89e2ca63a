pub mod error;
pub mod extract;
pub mod money;
pub mod types;

pub use error::ApiError;
pub use error::handler_404;
pub use extract::ValidatedJson;
pub use types::{ApiResponse, Pool};
