use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use bigdecimal::BigDecimal;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use super::models::{
    Bill, BillChangeset, BillWithContext, CreateBillRequest, NewBill, PaymentStatus,
    UpdateBillRequest,
};
use crate::auth::models::AccessTokenClaims;
use crate::notification::models::NotificationKind;
use crate::schema::{bills, orders, users};
use crate::state::AppState;
use crate::utils::money::round_money;
use crate::utils::{ApiError, ApiResponse, ValidatedJson};

pub async fn create_bill(
    State(state): State<AppState>,
    claims: AccessTokenClaims,
    ValidatedJson(payload): ValidatedJson<CreateBillRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Bill>>), ApiError> {
    claims.require_admin()?;

    let amount = round_money(&payload.amount);
    let tax = round_money(&payload.tax.unwrap_or_else(|| BigDecimal::from(0)));
    if amount < BigDecimal::from(0) || tax < BigDecimal::from(0) {
        return Err(ApiError::validation("amount and tax must not be negative"));
    }
    let total_amount = &amount + &tax;

    let mut conn = state.pool.get().await?;

    let order_owner = orders::table
        .find(payload.order_id)
        .select(orders::user_id)
        .first::<Uuid>(&mut conn)
        .await
        .optional()?
        .ok_or_else(|| ApiError::not_found("order not found"))?;

    let bill = diesel::insert_into(bills::table)
        .values(&NewBill {
            order_id: payload.order_id,
            user_id: order_owner,
            amount,
            tax,
            total_amount,
            payment_status: PaymentStatus::Pending.as_str().to_owned(),
        })
        .returning(Bill::as_returning())
        .get_result(&mut conn)
        .await?;

    drop(conn);

    state
        .notifier
        .notify(
            bill.user_id,
            "Bill Generated",
            &format!(
                "A bill of {:.2} has been generated for your order #{}. You can pay it from your account.",
                bill.total_amount, bill.order_id
            ),
            NotificationKind::Info,
        )
        .await;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new("Bill created successfully", bill)),
    ))
}

pub async fn get_bills(
    State(state): State<AppState>,
    claims: AccessTokenClaims,
) -> Result<Json<ApiResponse<Vec<BillWithContext>>>, ApiError> {
    let caller_id = claims.user_id()?;
    let mut conn = state.pool.get().await?;

    let mut query = bills::table
        .inner_join(orders::table.on(orders::id.eq(bills::order_id)))
        .inner_join(users::table.on(users::id.eq(bills::user_id)))
        .select((
            Bill::as_select(),
            orders::order_type,
            users::name,
            users::email,
        ))
        .into_boxed();

    if !claims.is_admin() {
        query = query.filter(bills::user_id.eq(caller_id));
    }

    let rows = query
        .order(bills::created_at.desc())
        .load::<(Bill, String, String, String)>(&mut conn)
        .await?;

    let rows = rows
        .into_iter()
        .map(|(bill, order_type, customer_name, customer_email)| BillWithContext {
            bill,
            order_type,
            customer_name,
            customer_email,
        })
        .collect();

    Ok(Json(ApiResponse::new("Bills fetched", rows)))
}

pub async fn get_bill_by_id(
    State(state): State<AppState>,
    claims: AccessTokenClaims,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<Bill>>, ApiError> {
    let mut conn = state.pool.get().await?;

    let bill = bills::table
        .find(id)
        .select(Bill::as_select())
        .first(&mut conn)
        .await
        .optional()?
        .ok_or_else(|| ApiError::not_found("bill not found"))?;

    claims.authorize_owner(bill.user_id)?;

    Ok(Json(ApiResponse::new("Bill fetched", bill)))
}

/// Admin corrections to amount, tax or payment status. The total is always
/// recomputed from the effective figures; no notification is re-fired.
pub async fn update_bill(
    State(state): State<AppState>,
    claims: AccessTokenClaims,
    Path(id): Path<i32>,
    ValidatedJson(payload): ValidatedJson<UpdateBillRequest>,
) -> Result<Json<ApiResponse<Bill>>, ApiError> {
    claims.require_admin()?;

    if payload.is_empty() {
        return Err(ApiError::validation("no fields to update"));
    }

    let payment_status = payload
        .payment_status
        .as_deref()
        .map(PaymentStatus::parse)
        .transpose()?;

    let mut conn = state.pool.get().await?;

    let bill = bills::table
        .find(id)
        .select(Bill::as_select())
        .first(&mut conn)
        .await
        .optional()?
        .ok_or_else(|| ApiError::not_found("bill not found"))?;

    let amount = round_money(&payload.amount.unwrap_or(bill.amount));
    let tax = round_money(&payload.tax.unwrap_or(bill.tax));
    if amount < BigDecimal::from(0) || tax < BigDecimal::from(0) {
        return Err(ApiError::validation("amount and tax must not be negative"));
    }
    let total_amount = &amount + &tax;

    let updated = diesel::update(bills::table.find(id))
        .set(&BillChangeset {
            amount,
            tax,
            total_amount,
            payment_status: payment_status.map(|status| status.as_str().to_owned()),
        })
        .returning(Bill::as_returning())
        .get_result(&mut conn)
        .await?;

    Ok(Json(ApiResponse::new("Bill updated", updated)))
}

pub async fn delete_bill(
    State(state): State<AppState>,
    claims: AccessTokenClaims,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    claims.require_admin()?;
    let mut conn = state.pool.get().await?;

    // Payment transactions hang off the bill and go with it.
    let deleted = diesel::delete(bills::table.find(id))
        .execute(&mut conn)
        .await?;

    if deleted == 0 {
        return Err(ApiError::not_found("bill not found"));
    }

    Ok(Json(ApiResponse::message("Bill deleted")))
}
