use std::collections::HashMap;

use axum::{Json, extract::State};
use diesel::prelude::*;
use diesel_async::{AsyncConnection, RunQueryDsl};
use stripe::{
    CreatePaymentIntent, CreatePaymentIntentAutomaticPaymentMethods, Currency, PaymentIntent,
    PaymentIntentId, PaymentIntentStatus,
};
use uuid::Uuid;

use super::models::{
    IntentRequest, IntentResponse, NewPaymentTransaction, PaymentHistoryEntry, PaymentTransaction,
    ProcessRequest,
};
use crate::auth::models::AccessTokenClaims;
use crate::bill::models::{Bill, PaymentStatus};
use crate::notification::models::NotificationKind;
use crate::schema::{bills, orders, payment_transactions, users};
use crate::state::AppState;
use crate::utils::money::to_minor_units;
use crate::utils::{ApiError, ApiResponse, ValidatedJson};

const PAYMENT_METHOD: &str = "stripe";

/// Mints a processor intent for the bill's total. Nothing is persisted
/// here; the reconciliation step records the outcome.
pub async fn create_payment_intent(
    State(state): State<AppState>,
    claims: AccessTokenClaims,
    ValidatedJson(payload): ValidatedJson<IntentRequest>,
) -> Result<Json<ApiResponse<IntentResponse>>, ApiError> {
    let caller_id = claims.user_id()?;
    let client = stripe_client(&state)?;

    let bill = {
        let mut conn = state.pool.get().await?;
        find_owned_bill(&mut conn, payload.bill_id, caller_id).await?
    };

    if bill.payment_status == PaymentStatus::Paid.as_str() {
        return Err(ApiError::AlreadyPaid);
    }

    let amount_minor = to_minor_units(&bill.total_amount)
        .ok_or_else(|| ApiError::internal(format!("bill {} total out of range", bill.id)))?;

    let mut params = CreatePaymentIntent::new(amount_minor, Currency::USD);
    params.automatic_payment_methods = Some(CreatePaymentIntentAutomaticPaymentMethods {
        allow_redirects: None,
        enabled: true,
    });
    params.metadata = Some(HashMap::from([("bill_id".to_owned(), bill.id.to_string())]));

    let intent = PaymentIntent::create(client, params).await?;
    let client_secret = intent
        .client_secret
        .ok_or_else(|| ApiError::internal("payment intent carries no client secret"))?;

    Ok(Json(ApiResponse::new(
        "Payment intent created",
        IntentResponse {
            client_secret,
            amount: bill.total_amount,
        },
    )))
}

/// Reconciles a succeeded intent against the bill it was minted for:
/// marks the bill paid and records the audit row in one database
/// transaction, then notifies the customer.
pub async fn process_payment(
    State(state): State<AppState>,
    claims: AccessTokenClaims,
    ValidatedJson(payload): ValidatedJson<ProcessRequest>,
) -> Result<Json<ApiResponse<Bill>>, ApiError> {
    let caller_id = claims.user_id()?;
    let client = stripe_client(&state)?;

    let bill = {
        let mut conn = state.pool.get().await?;
        find_owned_bill(&mut conn, payload.bill_id, caller_id).await?
    };

    if bill.payment_status == PaymentStatus::Paid.as_str() {
        return Err(ApiError::AlreadyPaid);
    }

    let intent_id = payload
        .payment_intent_id
        .parse::<PaymentIntentId>()
        .map_err(|_| ApiError::validation("malformed payment_intent_id"))?;

    let intent = PaymentIntent::retrieve(client, &intent_id, &[]).await?;
    ensure_intent_matches_bill(&intent, &bill)?;
    if intent.status != PaymentIntentStatus::Succeeded {
        return Err(ApiError::PaymentNotSucceeded(
            intent.status.as_str().to_owned(),
        ));
    }

    let intent_id = intent.id.to_string();
    let bill_id = bill.id;

    let mut conn = state.pool.get().await?;
    let updated = conn
        .transaction::<Bill, ApiError, _>(move |mut conn| {
            Box::pin(async move {
                // Guard against a concurrent reconciliation of the same
                // bill; losing the race rolls this attempt back.
                let updated = diesel::update(
                    bills::table
                        .find(bill_id)
                        .filter(bills::payment_status.ne(PaymentStatus::Paid.as_str())),
                )
                .set((
                    bills::payment_status.eq(PaymentStatus::Paid.as_str()),
                    bills::payment_method.eq(PAYMENT_METHOD),
                    bills::transaction_id.eq(intent_id.as_str()),
                ))
                .returning(Bill::as_returning())
                .get_result(&mut conn)
                .await
                .optional()?
                .ok_or(ApiError::AlreadyPaid)?;

                diesel::insert_into(payment_transactions::table)
                    .values(&NewPaymentTransaction {
                        bill_id: updated.id,
                        payment_intent_id: &intent_id,
                        amount: updated.total_amount.clone(),
                        status: PaymentIntentStatus::Succeeded.as_str(),
                    })
                    .execute(&mut conn)
                    .await?;

                Ok(updated)
            })
        })
        .await?;

    drop(conn);

    state
        .notifier
        .notify(
            updated.user_id,
            "Payment Successful",
            &format!(
                "We received your payment of {:.2} for bill #{}. Thank you!",
                updated.total_amount, updated.id
            ),
            NotificationKind::Success,
        )
        .await;

    Ok(Json(ApiResponse::new(
        "Payment processed successfully",
        updated,
    )))
}

pub async fn get_payment_history(
    State(state): State<AppState>,
    claims: AccessTokenClaims,
) -> Result<Json<ApiResponse<Vec<PaymentHistoryEntry>>>, ApiError> {
    let caller_id = claims.user_id()?;
    let mut conn = state.pool.get().await?;

    let mut query = payment_transactions::table
        .inner_join(bills::table.on(bills::id.eq(payment_transactions::bill_id)))
        .inner_join(orders::table.on(orders::id.eq(bills::order_id)))
        .inner_join(users::table.on(users::id.eq(bills::user_id)))
        .select((
            PaymentTransaction::as_select(),
            bills::order_id,
            orders::order_type,
            users::name,
            users::email,
        ))
        .into_boxed();

    if !claims.is_admin() {
        query = query.filter(bills::user_id.eq(caller_id));
    }

    let rows = query
        .order(payment_transactions::payment_date.desc())
        .load::<(PaymentTransaction, i32, String, String, String)>(&mut conn)
        .await?;

    let rows = rows
        .into_iter()
        .map(
            |(transaction, order_id, order_type, customer_name, customer_email)| {
                PaymentHistoryEntry {
                    transaction,
                    order_id,
                    order_type,
                    customer_name,
                    customer_email,
                }
            },
        )
        .collect();

    Ok(Json(ApiResponse::new("Payment history fetched", rows)))
}

fn stripe_client(state: &AppState) -> Result<&stripe::Client, ApiError> {
    state
        .stripe
        .as_ref()
        .ok_or_else(|| ApiError::internal("STRIPE_SECRET_KEY is not configured"))
}

/// A retrieved intent settles only the bill it was minted for: the bill id
/// stamped into its metadata and its minor-unit amount must both match.
fn ensure_intent_matches_bill(intent: &PaymentIntent, bill: &Bill) -> Result<(), ApiError> {
    let stamped = bill.id.to_string();
    if intent.metadata.get("bill_id") != Some(&stamped) {
        return Err(ApiError::validation(
            "payment intent was created for a different bill",
        ));
    }

    let total_minor = to_minor_units(&bill.total_amount)
        .ok_or_else(|| ApiError::internal(format!("bill {} total out of range", bill.id)))?;
    if intent.amount != total_minor {
        return Err(ApiError::validation(
            "payment intent amount does not match the bill total",
        ));
    }

    Ok(())
}

/// The bill must exist and belong to the caller; both failures read as 404
/// so bill ids cannot be enumerated across accounts.
async fn find_owned_bill(
    conn: &mut diesel_async::AsyncPgConnection,
    bill_id: i32,
    caller_id: Uuid,
) -> Result<Bill, ApiError> {
    let bill = bills::table
        .find(bill_id)
        .select(Bill::as_select())
        .first(conn)
        .await
        .optional()?;

    match bill {
        Some(bill) if bill.user_id == caller_id => Ok(bill),
        _ => Err(ApiError::not_found("bill not found")),
    }
}

#[cfg(test)]
mod tests {
    use bigdecimal::BigDecimal;
    use chrono::Utc;

    use super::*;

    fn unpaid_bill(id: i32, total: &str) -> Bill {
        Bill {
            id,
            order_id: 7,
            user_id: Uuid::nil(),
            amount: total.parse().unwrap(),
            tax: BigDecimal::from(0),
            total_amount: total.parse().unwrap(),
            payment_status: PaymentStatus::Pending.as_str().to_owned(),
            payment_method: None,
            transaction_id: None,
            created_at: Utc::now().naive_utc(),
        }
    }

    fn intent_for(bill_id: i32, amount: i64) -> PaymentIntent {
        PaymentIntent {
            amount,
            metadata: HashMap::from([("bill_id".to_owned(), bill_id.to_string())]),
            ..Default::default()
        }
    }

    #[test]
    fn intent_minted_for_the_bill_is_accepted() {
        let bill = unpaid_bill(41, "108.50");
        assert!(ensure_intent_matches_bill(&intent_for(41, 10850), &bill).is_ok());
    }

    #[test]
    fn intent_minted_for_another_bill_is_rejected() {
        let bill = unpaid_bill(41, "108.50");
        let err = ensure_intent_matches_bill(&intent_for(9, 10850), &bill).unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[test]
    fn intent_without_a_bill_stamp_is_rejected() {
        let bill = unpaid_bill(41, "108.50");
        let intent = PaymentIntent {
            amount: 10850,
            ..Default::default()
        };
        let err = ensure_intent_matches_bill(&intent, &bill).unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[test]
    fn intent_amount_must_match_the_bill_total() {
        let bill = unpaid_bill(41, "108.50");
        let err = ensure_intent_matches_bill(&intent_for(41, 9999), &bill).unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }
}
