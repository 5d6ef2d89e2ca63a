use diesel_async::{AsyncPgConnection, pooled_connection::AsyncDieselConnectionManager};
use serde::Serialize;

pub type Pool = bb8::Pool<AsyncDieselConnectionManager<AsyncPgConnection>>;

/// Envelope every endpoint responds with: `{ message, data? }`.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn new(message: impl Into<String>, data: T) -> Self {
        Self {
            message: message.into(),
            data: Some(data),
        }
    }
}

impl ApiResponse<()> {
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            data: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_field_is_omitted_when_absent() {
        let body = serde_json::to_value(ApiResponse::message("done")).unwrap();
        assert_eq!(body, serde_json::json!({ "message": "done" }));
    }

    #[test]
    fn data_field_is_present_when_given() {
        let body = serde_json::to_value(ApiResponse::new("ok", 7)).unwrap();
        assert_eq!(body, serde_json::json!({ "message": "ok", "data": 7 }));
    }
}
