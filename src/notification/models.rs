use chrono::NaiveDateTime;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::utils::ApiError;

/// Severity tag stored on every notification row.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Info,
    Success,
    Warning,
    Error,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::Info => "info",
            NotificationKind::Success => "success",
            NotificationKind::Warning => "warning",
            NotificationKind::Error => "error",
        }
    }

    pub fn parse(value: &str) -> Result<Self, ApiError> {
        match value {
            "info" => Ok(NotificationKind::Info),
            "success" => Ok(NotificationKind::Success),
            "warning" => Ok(NotificationKind::Warning),
            "error" => Ok(NotificationKind::Error),
            other => Err(ApiError::validation(format!(
                "unknown notification type: {other}"
            ))),
        }
    }
}

#[derive(Debug, Queryable, Selectable, Serialize)]
#[diesel(table_name = crate::schema::notifications)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Notification {
    pub id: i32,
    pub user_id: Uuid,
    pub title: String,
    pub message: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub is_read: bool,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = crate::schema::notifications)]
pub struct NewNotification<'a> {
    pub user_id: Uuid,
    pub title: &'a str,
    pub message: &'a str,
    pub kind: &'a str,
}

/// Payload carried over the e-mail queue to the background worker.
#[derive(Debug, Serialize, Deserialize)]
pub struct EmailJob {
    pub recipient_name: String,
    pub recipient_email: String,
    pub subject: String,
    pub body: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct AlertRequest {
    #[validate(length(min = 1, max = 100))]
    pub title: String,
    #[validate(length(min = 1))]
    pub message: String,
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct DirectMessageRequest {
    pub user_id: Uuid,
    #[validate(length(min = 1, max = 100))]
    pub title: String,
    #[validate(length(min = 1))]
    pub message: String,
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_round_trips_through_strings() {
        for kind in [
            NotificationKind::Info,
            NotificationKind::Success,
            NotificationKind::Warning,
            NotificationKind::Error,
        ] {
            assert_eq!(NotificationKind::parse(kind.as_str()).unwrap(), kind);
        }
    }

    #[test]
    fn unknown_kind_is_rejected() {
        assert!(NotificationKind::parse("urgent").is_err());
    }

    #[test]
    fn email_job_round_trips_through_json() {
        let job = EmailJob {
            recipient_name: "Ada".to_owned(),
            recipient_email: "ada@example.com".to_owned(),
            subject: "Order Placed".to_owned(),
            body: "<p>hi</p>".to_owned(),
        };
        let raw = serde_json::to_string(&job).unwrap();
        let back: EmailJob = serde_json::from_str(&raw).unwrap();
        assert_eq!(back.recipient_email, "ada@example.com");
        assert_eq!(back.subject, "Order Placed");
    }
}
