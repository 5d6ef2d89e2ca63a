use bigdecimal::BigDecimal;
use chrono::NaiveDateTime;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Append-only audit row recorded when a payment is reconciled.
#[derive(Debug, Queryable, Selectable, Serialize)]
#[diesel(table_name = crate::schema::payment_transactions)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct PaymentTransaction {
    pub id: i32,
    pub bill_id: i32,
    pub payment_intent_id: String,
    #[serde(serialize_with = "crate::utils::money::serialize_money")]
    pub amount: BigDecimal,
    pub status: String,
    pub payment_date: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = crate::schema::payment_transactions)]
pub struct NewPaymentTransaction<'a> {
    pub bill_id: i32,
    pub payment_intent_id: &'a str,
    pub amount: BigDecimal,
    pub status: &'a str,
}

#[derive(Debug, Deserialize, Validate)]
pub struct IntentRequest {
    pub bill_id: i32,
}

#[derive(Debug, Serialize)]
pub struct IntentResponse {
    pub client_secret: String,
    #[serde(serialize_with = "crate::utils::money::serialize_money")]
    pub amount: BigDecimal,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ProcessRequest {
    pub bill_id: i32,
    #[validate(length(min = 1, message = "payment_intent_id is required"))]
    pub payment_intent_id: String,
}

/// Audit entry joined with the order and customer it settles.
#[derive(Debug, Serialize)]
pub struct PaymentHistoryEntry {
    #[serde(flatten)]
    pub transaction: PaymentTransaction,
    pub order_id: i32,
    pub order_type: String,
    pub customer_name: String,
    pub customer_email: String,
}
