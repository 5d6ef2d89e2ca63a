use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use super::models::{CreateOrderRequest, NewOrder, Order, OrderChangeset, OrderStatus, StatusUpdateRequest};
use crate::auth::models::AccessTokenClaims;
use crate::notification::models::NotificationKind;
use crate::schema::{measurements, orders};
use crate::state::AppState;
use crate::utils::{ApiError, ApiResponse, ValidatedJson};

pub async fn create_order(
    State(state): State<AppState>,
    claims: AccessTokenClaims,
    ValidatedJson(payload): ValidatedJson<CreateOrderRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Order>>), ApiError> {
    let caller_id = claims.user_id()?;
    let mut conn = state.pool.get().await?;

    // A referenced measurement must exist and belong to the caller. Both
    // failures surface as 404 so order creation never leaks other
    // customers' measurement ids.
    if let Some(measurement_id) = payload.measurement_id {
        let owner = measurements::table
            .find(measurement_id)
            .select(measurements::user_id)
            .first::<Uuid>(&mut conn)
            .await
            .optional()?;

        match owner {
            Some(owner) if owner == caller_id => {}
            _ => return Err(ApiError::not_found("measurement not found")),
        }
    }

    let order = diesel::insert_into(orders::table)
        .values(&NewOrder {
            user_id: caller_id,
            measurement_id: payload.measurement_id,
            order_type: payload.order_type,
            fabric_type: payload.fabric_type,
            color: payload.color,
            design_preference: payload.design_preference,
            quantity: payload.quantity.unwrap_or(1),
            delivery_date: payload.delivery_date,
            status: OrderStatus::Pending.as_str().to_owned(),
        })
        .returning(Order::as_returning())
        .get_result(&mut conn)
        .await?;

    drop(conn);

    state
        .notifier
        .notify(
            order.user_id,
            "Order Placed",
            &format!(
                "Your {} order #{} has been placed. We will keep you posted as it progresses.",
                order.order_type, order.id
            ),
            NotificationKind::Success,
        )
        .await;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new("Order placed successfully", order)),
    ))
}

pub async fn get_orders(
    State(state): State<AppState>,
    claims: AccessTokenClaims,
) -> Result<Json<ApiResponse<Vec<Order>>>, ApiError> {
    let caller_id = claims.user_id()?;
    let mut conn = state.pool.get().await?;

    let mut query = orders::table.select(Order::as_select()).into_boxed();

    if !claims.is_admin() {
        query = query.filter(orders::user_id.eq(caller_id));
    }

    let rows = query
        .order(orders::created_at.desc())
        .load(&mut conn)
        .await?;

    Ok(Json(ApiResponse::new("Orders fetched", rows)))
}

pub async fn get_order_by_id(
    State(state): State<AppState>,
    claims: AccessTokenClaims,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<Order>>, ApiError> {
    let mut conn = state.pool.get().await?;

    let order = find_owned(&mut conn, id, &claims).await?;

    Ok(Json(ApiResponse::new("Order fetched", order)))
}

pub async fn update_order(
    State(state): State<AppState>,
    claims: AccessTokenClaims,
    Path(id): Path<i32>,
    ValidatedJson(changeset): ValidatedJson<OrderChangeset>,
) -> Result<Json<ApiResponse<Order>>, ApiError> {
    if changeset.is_empty() {
        return Err(ApiError::validation("no fields to update"));
    }

    let mut conn = state.pool.get().await?;

    let order = find_owned(&mut conn, id, &claims).await?;

    // Customers may only reshape an order the shop has not started on.
    if !claims.is_admin() && order.status != OrderStatus::Pending.as_str() {
        return Err(ApiError::validation(
            "order can only be edited while it is pending",
        ));
    }

    let updated = diesel::update(orders::table.find(id))
        .set(&changeset)
        .returning(Order::as_returning())
        .get_result(&mut conn)
        .await?;

    Ok(Json(ApiResponse::new("Order updated", updated)))
}

pub async fn update_order_status(
    State(state): State<AppState>,
    claims: AccessTokenClaims,
    Path(id): Path<i32>,
    ValidatedJson(payload): ValidatedJson<StatusUpdateRequest>,
) -> Result<Json<ApiResponse<Order>>, ApiError> {
    claims.require_admin()?;
    let next = OrderStatus::parse(&payload.status)?;

    let mut conn = state.pool.get().await?;

    let order = orders::table
        .find(id)
        .select(Order::as_select())
        .first(&mut conn)
        .await
        .optional()?
        .ok_or_else(|| ApiError::not_found("order not found"))?;

    let current = OrderStatus::parse(&order.status)
        .map_err(|_| ApiError::internal(format!("order {} has status '{}'", id, order.status)))?;

    if !current.can_transition_to(next) {
        return Err(ApiError::validation(format!(
            "cannot change status from {} to {}",
            current.as_str(),
            next.as_str()
        )));
    }

    // Persist first; the notification is best effort and never rolls the
    // status back.
    let updated = diesel::update(orders::table.find(id))
        .set(orders::status.eq(next.as_str()))
        .returning(Order::as_returning())
        .get_result(&mut conn)
        .await?;

    drop(conn);

    let kind = match next {
        OrderStatus::Delivered => NotificationKind::Success,
        OrderStatus::Cancelled => NotificationKind::Warning,
        _ => NotificationKind::Info,
    };

    state
        .notifier
        .notify(
            updated.user_id,
            "Order Status Updated",
            &format!("Your order #{} is now {}.", updated.id, next.label()),
            kind,
        )
        .await;

    Ok(Json(ApiResponse::new("Order status updated", updated)))
}

pub async fn delete_order(
    State(state): State<AppState>,
    claims: AccessTokenClaims,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    let mut conn = state.pool.get().await?;

    find_owned(&mut conn, id, &claims).await?;

    diesel::delete(orders::table.find(id))
        .execute(&mut conn)
        .await?;

    Ok(Json(ApiResponse::message("Order deleted")))
}

async fn find_owned(
    conn: &mut diesel_async::AsyncPgConnection,
    id: i32,
    claims: &AccessTokenClaims,
) -> Result<Order, ApiError> {
    let order = orders::table
        .find(id)
        .select(Order::as_select())
        .first(conn)
        .await
        .optional()?
        .ok_or_else(|| ApiError::not_found("order not found"))?;

    claims.authorize_owner(order.user_id)?;
    Ok(order)
}
