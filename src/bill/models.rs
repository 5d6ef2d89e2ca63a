use bigdecimal::BigDecimal;
use chrono::NaiveDateTime;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::utils::ApiError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Failed,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Paid => "paid",
            PaymentStatus::Failed => "failed",
        }
    }

    pub fn parse(value: &str) -> Result<Self, ApiError> {
        match value {
            "pending" => Ok(PaymentStatus::Pending),
            "paid" => Ok(PaymentStatus::Paid),
            "failed" => Ok(PaymentStatus::Failed),
            _ => Err(ApiError::validation(
                "payment_status must be one of: pending, paid, failed",
            )),
        }
    }
}

#[derive(Debug, Queryable, Selectable, Serialize)]
#[diesel(table_name = crate::schema::bills)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Bill {
    pub id: i32,
    pub order_id: i32,
    pub user_id: Uuid,
    #[serde(serialize_with = "crate::utils::money::serialize_money")]
    pub amount: BigDecimal,
    #[serde(serialize_with = "crate::utils::money::serialize_money")]
    pub tax: BigDecimal,
    #[serde(serialize_with = "crate::utils::money::serialize_money")]
    pub total_amount: BigDecimal,
    pub payment_status: String,
    pub payment_method: Option<String>,
    pub transaction_id: Option<String>,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = crate::schema::bills)]
pub struct NewBill {
    pub order_id: i32,
    pub user_id: Uuid,
    pub amount: BigDecimal,
    pub tax: BigDecimal,
    pub total_amount: BigDecimal,
    pub payment_status: String,
}

/// Bill row joined with the display fields the back office lists next to it.
#[derive(Debug, Serialize)]
pub struct BillWithContext {
    #[serde(flatten)]
    pub bill: Bill,
    pub order_type: String,
    pub customer_name: String,
    pub customer_email: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateBillRequest {
    pub order_id: i32,
    pub amount: BigDecimal,
    /// Defaults to 0 when omitted.
    pub tax: Option<BigDecimal>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateBillRequest {
    pub amount: Option<BigDecimal>,
    pub tax: Option<BigDecimal>,
    pub payment_status: Option<String>,
}

impl UpdateBillRequest {
    pub fn is_empty(&self) -> bool {
        self.amount.is_none() && self.tax.is_none() && self.payment_status.is_none()
    }
}

#[derive(Debug, AsChangeset)]
#[diesel(table_name = crate::schema::bills)]
pub struct BillChangeset {
    pub amount: BigDecimal,
    pub tax: BigDecimal,
    pub total_amount: BigDecimal,
    pub payment_status: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payment_status_strings_round_trip() {
        for status in [
            PaymentStatus::Pending,
            PaymentStatus::Paid,
            PaymentStatus::Failed,
        ] {
            assert_eq!(PaymentStatus::parse(status.as_str()).unwrap(), status);
        }
        assert!(PaymentStatus::parse("refunded").is_err());
    }

    #[test]
    fn update_request_reports_empty_when_no_field_is_set() {
        let request: UpdateBillRequest = serde_json::from_str("{}").unwrap();
        assert!(request.is_empty());

        let request: UpdateBillRequest =
            serde_json::from_str(r#"{"payment_status": "paid"}"#).unwrap();
        assert!(!request.is_empty());
    }

    #[test]
    fn tax_is_optional_in_the_create_payload() {
        let request: CreateBillRequest =
            serde_json::from_str(r#"{"order_id": 3, "amount": 100}"#).unwrap();
        assert!(request.tax.is_none());
        assert_eq!(request.amount, BigDecimal::from(100));
    }

    #[test]
    fn bill_money_fields_render_with_two_decimals() {
        let bill = Bill {
            id: 1,
            order_id: 3,
            user_id: Uuid::nil(),
            amount: "108.5".parse().unwrap(),
            tax: BigDecimal::from(0),
            total_amount: "108.5".parse().unwrap(),
            payment_status: PaymentStatus::Pending.as_str().to_owned(),
            payment_method: None,
            transaction_id: None,
            created_at: chrono::Utc::now().naive_utc(),
        };

        let body = serde_json::to_value(&bill).unwrap();
        assert_eq!(body["amount"], "108.50");
        assert_eq!(body["tax"], "0.00");
        assert_eq!(body["total_amount"], "108.50");
    }
}
