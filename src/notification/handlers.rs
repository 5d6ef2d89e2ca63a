use axum::{Json, extract::Path, extract::State};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use serde_json::{Value, json};
use uuid::Uuid;

use super::models::{AlertRequest, DirectMessageRequest, Notification, NotificationKind};
use crate::auth::models::{AccessTokenClaims, Role};
use crate::schema::{notifications, users};
use crate::state::AppState;
use crate::utils::{ApiError, ApiResponse, ValidatedJson};

pub async fn get_notifications(
    State(state): State<AppState>,
    claims: AccessTokenClaims,
) -> Result<Json<ApiResponse<Vec<Notification>>>, ApiError> {
    let user_id = claims.user_id()?;
    let mut conn = state.pool.get().await?;

    let rows = notifications::table
        .filter(notifications::user_id.eq(user_id))
        .order(notifications::created_at.desc())
        .select(Notification::as_select())
        .load(&mut conn)
        .await?;

    Ok(Json(ApiResponse::new("Notifications fetched", rows)))
}

pub async fn mark_as_read(
    State(state): State<AppState>,
    claims: AccessTokenClaims,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<Notification>>, ApiError> {
    let user_id = claims.user_id()?;
    let mut conn = state.pool.get().await?;

    let updated = diesel::update(
        notifications::table.filter(
            notifications::id
                .eq(id)
                .and(notifications::user_id.eq(user_id)),
        ),
    )
    .set(notifications::is_read.eq(true))
    .returning(Notification::as_returning())
    .get_result(&mut conn)
    .await
    .optional()?
    .ok_or_else(|| ApiError::not_found("notification not found"))?;

    Ok(Json(ApiResponse::new("Notification marked as read", updated)))
}

pub async fn mark_all_read(
    State(state): State<AppState>,
    claims: AccessTokenClaims,
) -> Result<Json<ApiResponse<Value>>, ApiError> {
    let user_id = claims.user_id()?;
    let mut conn = state.pool.get().await?;

    let updated = diesel::update(
        notifications::table.filter(
            notifications::user_id
                .eq(user_id)
                .and(notifications::is_read.eq(false)),
        ),
    )
    .set(notifications::is_read.eq(true))
    .execute(&mut conn)
    .await?;

    Ok(Json(ApiResponse::new(
        "All notifications marked as read",
        json!({ "updated": updated }),
    )))
}

pub async fn delete_notification(
    State(state): State<AppState>,
    claims: AccessTokenClaims,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    let user_id = claims.user_id()?;
    let mut conn = state.pool.get().await?;

    let deleted = diesel::delete(
        notifications::table.filter(
            notifications::id
                .eq(id)
                .and(notifications::user_id.eq(user_id)),
        ),
    )
    .execute(&mut conn)
    .await?;

    if deleted == 0 {
        return Err(ApiError::not_found("notification not found"));
    }

    Ok(Json(ApiResponse::message("Notification deleted")))
}

/// Admin broadcast to every customer account, dispatched one by one.
pub async fn broadcast_alert(
    State(state): State<AppState>,
    claims: AccessTokenClaims,
    ValidatedJson(payload): ValidatedJson<AlertRequest>,
) -> Result<Json<ApiResponse<Value>>, ApiError> {
    claims.require_admin()?;
    let kind = parse_kind(payload.kind.as_deref())?;

    let recipients: Vec<Uuid> = {
        let mut conn = state.pool.get().await?;

        users::table
            .filter(users::role.eq(Role::Customer.as_str()))
            .select(users::id)
            .load(&mut conn)
            .await?
    };

    for user_id in &recipients {
        state
            .notifier
            .notify(*user_id, &payload.title, &payload.message, kind)
            .await;
    }

    Ok(Json(ApiResponse::new(
        "Alert dispatched",
        json!({ "recipients": recipients.len() }),
    )))
}

pub async fn send_to_user(
    State(state): State<AppState>,
    claims: AccessTokenClaims,
    ValidatedJson(payload): ValidatedJson<DirectMessageRequest>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    claims.require_admin()?;
    let kind = parse_kind(payload.kind.as_deref())?;

    {
        let mut conn = state.pool.get().await?;

        users::table
            .filter(users::id.eq(payload.user_id))
            .select(users::id)
            .first::<Uuid>(&mut conn)
            .await
            .optional()?
            .ok_or_else(|| ApiError::not_found("user not found"))?;
    }

    state
        .notifier
        .notify(payload.user_id, &payload.title, &payload.message, kind)
        .await;

    Ok(Json(ApiResponse::message("Notification sent")))
}

fn parse_kind(raw: Option<&str>) -> Result<NotificationKind, ApiError> {
    match raw {
        Some(value) => NotificationKind::parse(value),
        None => Ok(NotificationKind::Info),
    }
}
