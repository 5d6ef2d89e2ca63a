use chrono::{NaiveDate, NaiveDateTime};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::utils::ApiError;

/// Lifecycle of an order. The forward path is
/// pending → in_progress → ready → delivered; `cancelled` is reachable from
/// any non-terminal state. `delivered` and `cancelled` are terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    InProgress,
    Ready,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::InProgress => "in_progress",
            OrderStatus::Ready => "ready",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    /// Human wording used in notification messages.
    pub fn label(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::InProgress => "in progress",
            OrderStatus::Ready => "ready",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(value: &str) -> Result<Self, ApiError> {
        match value {
            "pending" => Ok(OrderStatus::Pending),
            "in_progress" => Ok(OrderStatus::InProgress),
            "ready" => Ok(OrderStatus::Ready),
            "delivered" => Ok(OrderStatus::Delivered),
            "cancelled" => Ok(OrderStatus::Cancelled),
            _ => Err(ApiError::validation(
                "status must be one of: pending, in_progress, ready, delivered, cancelled",
            )),
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }

    /// Allowed-transition table. Forward moves may skip a step; backward
    /// moves and leaving a terminal state are rejected.
    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        use OrderStatus::*;
        match (self, next) {
            (Pending, InProgress | Ready | Delivered) => true,
            (InProgress, Ready | Delivered) => true,
            (Ready, Delivered) => true,
            (Pending | InProgress | Ready, Cancelled) => true,
            _ => false,
        }
    }
}

#[derive(Debug, Queryable, Selectable, Serialize)]
#[diesel(table_name = crate::schema::orders)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Order {
    pub id: i32,
    pub user_id: Uuid,
    pub measurement_id: Option<i32>,
    pub order_type: String,
    pub fabric_type: Option<String>,
    pub color: Option<String>,
    pub design_preference: Option<String>,
    pub quantity: i32,
    pub delivery_date: Option<NaiveDate>,
    pub status: String,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = crate::schema::orders)]
pub struct NewOrder {
    pub user_id: Uuid,
    pub measurement_id: Option<i32>,
    pub order_type: String,
    pub fabric_type: Option<String>,
    pub color: Option<String>,
    pub design_preference: Option<String>,
    pub quantity: i32,
    pub delivery_date: Option<NaiveDate>,
    pub status: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateOrderRequest {
    #[validate(length(min = 1, max = 50, message = "order_type is required"))]
    pub order_type: String,
    pub measurement_id: Option<i32>,
    #[validate(length(max = 50))]
    pub fabric_type: Option<String>,
    #[validate(length(max = 30))]
    pub color: Option<String>,
    #[validate(length(max = 1000))]
    pub design_preference: Option<String>,
    #[validate(range(min = 1, message = "quantity must be at least 1"))]
    pub quantity: Option<i32>,
    pub delivery_date: Option<NaiveDate>,
}

/// Non-status fields a customer or admin may edit. Status changes go
/// through the dedicated status endpoint only.
#[derive(Debug, Deserialize, Validate, AsChangeset)]
#[diesel(table_name = crate::schema::orders)]
pub struct OrderChangeset {
    #[validate(length(min = 1, max = 50))]
    pub order_type: Option<String>,
    #[validate(length(max = 50))]
    pub fabric_type: Option<String>,
    #[validate(length(max = 30))]
    pub color: Option<String>,
    #[validate(length(max = 1000))]
    pub design_preference: Option<String>,
    #[validate(range(min = 1))]
    pub quantity: Option<i32>,
    pub delivery_date: Option<NaiveDate>,
}

impl OrderChangeset {
    pub fn is_empty(&self) -> bool {
        self.order_type.is_none()
            && self.fabric_type.is_none()
            && self.color.is_none()
            && self.design_preference.is_none()
            && self.quantity.is_none()
            && self.delivery_date.is_none()
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct StatusUpdateRequest {
    #[validate(length(min = 1, message = "status is required"))]
    pub status: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use OrderStatus::*;

    #[test]
    fn forward_path_is_allowed() {
        assert!(Pending.can_transition_to(InProgress));
        assert!(InProgress.can_transition_to(Ready));
        assert!(Ready.can_transition_to(Delivered));
    }

    #[test]
    fn forward_moves_may_skip_a_step() {
        assert!(Pending.can_transition_to(Ready));
        assert!(Pending.can_transition_to(Delivered));
        assert!(InProgress.can_transition_to(Delivered));
    }

    #[test]
    fn backward_moves_are_rejected() {
        assert!(!Delivered.can_transition_to(Pending));
        assert!(!Ready.can_transition_to(InProgress));
        assert!(!InProgress.can_transition_to(Pending));
    }

    #[test]
    fn cancel_is_reachable_from_any_non_terminal_state() {
        assert!(Pending.can_transition_to(Cancelled));
        assert!(InProgress.can_transition_to(Cancelled));
        assert!(Ready.can_transition_to(Cancelled));
    }

    #[test]
    fn terminal_states_are_frozen() {
        for next in [Pending, InProgress, Ready, Delivered, Cancelled] {
            assert!(!Delivered.can_transition_to(next));
            assert!(!Cancelled.can_transition_to(next));
        }
        assert!(Delivered.is_terminal());
        assert!(Cancelled.is_terminal());
        assert!(!Pending.is_terminal());
    }

    #[test]
    fn setting_the_same_status_again_is_rejected() {
        for status in [Pending, InProgress, Ready, Delivered, Cancelled] {
            assert!(!status.can_transition_to(status));
        }
    }

    #[test]
    fn status_strings_round_trip() {
        for status in [Pending, InProgress, Ready, Delivered, Cancelled] {
            assert_eq!(OrderStatus::parse(status.as_str()).unwrap(), status);
        }
        assert!(OrderStatus::parse("shipped").is_err());
    }

    #[test]
    fn changeset_reports_empty_when_no_field_is_set() {
        let changeset: OrderChangeset = serde_json::from_str("{}").unwrap();
        assert!(changeset.is_empty());

        let changeset: OrderChangeset =
            serde_json::from_str(r#"{"color": "navy"}"#).unwrap();
        assert!(!changeset.is_empty());
    }

    #[test]
    fn zero_quantity_fails_validation() {
        let request: CreateOrderRequest =
            serde_json::from_str(r#"{"order_type": "suit", "quantity": 0}"#).unwrap();
        assert!(request.validate().is_err());
    }

    #[test]
    fn empty_order_type_fails_validation() {
        let request: CreateOrderRequest = serde_json::from_str(r#"{"order_type": ""}"#).unwrap();
        assert!(request.validate().is_err());
    }
}
