use axum::{Json, extract::State};
use bigdecimal::BigDecimal;
use diesel::dsl::count_star;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use super::models::{DashboardStats, OrderCounts};
use crate::auth::models::{AccessTokenClaims, Role};
use crate::bill::models::PaymentStatus;
use crate::schema::{bills, orders, users};
use crate::state::AppState;
use crate::utils::{ApiError, ApiResponse, Pool};

/// Back-office dashboard numbers. The three reads are independent, so they
/// run concurrently on their own pooled connections and are joined before
/// the response is built.
pub async fn get_dashboard_stats(
    State(state): State<AppState>,
    claims: AccessTokenClaims,
) -> Result<Json<ApiResponse<DashboardStats>>, ApiError> {
    claims.require_admin()?;

    let (orders, revenue, customers) = tokio::try_join!(
        order_counts(state.pool.clone()),
        paid_revenue(state.pool.clone()),
        customer_count(state.pool.clone()),
    )?;

    Ok(Json(ApiResponse::new(
        "Dashboard statistics",
        DashboardStats {
            orders,
            revenue,
            customers,
        },
    )))
}

async fn order_counts(pool: Pool) -> Result<OrderCounts, ApiError> {
    let mut conn = pool.get().await?;

    let rows = orders::table
        .group_by(orders::status)
        .select((orders::status, count_star()))
        .load::<(String, i64)>(&mut conn)
        .await?;

    Ok(OrderCounts::from_rows(rows))
}

async fn paid_revenue(pool: Pool) -> Result<BigDecimal, ApiError> {
    let mut conn = pool.get().await?;

    let total = bills::table
        .filter(bills::payment_status.eq(PaymentStatus::Paid.as_str()))
        .select(diesel::dsl::sum(bills::total_amount))
        .first::<Option<BigDecimal>>(&mut conn)
        .await?;

    Ok(total.unwrap_or_else(|| BigDecimal::from(0)))
}

async fn customer_count(pool: Pool) -> Result<i64, ApiError> {
    let mut conn = pool.get().await?;

    let count = users::table
        .filter(users::role.eq(Role::Customer.as_str()))
        .count()
        .get_result(&mut conn)
        .await?;

    Ok(count)
}
