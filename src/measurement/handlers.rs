use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use super::models::{Measurement, MeasurementChangeset, MeasurementRequest, NewMeasurement};
use crate::auth::models::AccessTokenClaims;
use crate::schema::{measurements, users};
use crate::state::AppState;
use crate::utils::{ApiError, ApiResponse, ValidatedJson};

pub async fn create_measurement(
    State(state): State<AppState>,
    claims: AccessTokenClaims,
    ValidatedJson(payload): ValidatedJson<MeasurementRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Measurement>>), ApiError> {
    let caller_id = claims.user_id()?;

    let owner_id = match payload.user_id {
        Some(target) if target != caller_id => {
            claims.require_admin()?;
            target
        }
        _ => caller_id,
    };

    let unit = payload.unit.unwrap_or_else(|| "cm".to_owned());
    if !matches!(unit.as_str(), "cm" | "in") {
        return Err(ApiError::validation("unit must be one of: cm, in"));
    }

    let mut conn = state.pool.get().await?;

    if owner_id != caller_id {
        users::table
            .filter(users::id.eq(owner_id))
            .select(users::id)
            .first::<Uuid>(&mut conn)
            .await
            .optional()?
            .ok_or_else(|| ApiError::not_found("user not found"))?;
    }

    let row = diesel::insert_into(measurements::table)
        .values(&NewMeasurement {
            user_id: owner_id,
            chest: payload.chest,
            waist: payload.waist,
            hip: payload.hip,
            shoulder: payload.shoulder,
            sleeve_length: payload.sleeve_length,
            shirt_length: payload.shirt_length,
            pant_length: payload.pant_length,
            inseam: payload.inseam,
            neck: payload.neck,
            unit,
            notes: payload.notes,
            photo_url: payload.photo_url,
        })
        .returning(Measurement::as_returning())
        .get_result(&mut conn)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new("Measurement recorded", row)),
    ))
}

pub async fn get_measurements(
    State(state): State<AppState>,
    claims: AccessTokenClaims,
) -> Result<Json<ApiResponse<Vec<Measurement>>>, ApiError> {
    let caller_id = claims.user_id()?;
    let mut conn = state.pool.get().await?;

    let mut query = measurements::table
        .select(Measurement::as_select())
        .into_boxed();

    if !claims.is_admin() {
        query = query.filter(measurements::user_id.eq(caller_id));
    }

    let rows = query
        .order(measurements::created_at.desc())
        .load(&mut conn)
        .await?;

    Ok(Json(ApiResponse::new("Measurements fetched", rows)))
}

pub async fn get_measurement_by_id(
    State(state): State<AppState>,
    claims: AccessTokenClaims,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<Measurement>>, ApiError> {
    let mut conn = state.pool.get().await?;

    let row = find_owned(&mut conn, id, &claims).await?;

    Ok(Json(ApiResponse::new("Measurement fetched", row)))
}

pub async fn update_measurement(
    State(state): State<AppState>,
    claims: AccessTokenClaims,
    Path(id): Path<i32>,
    ValidatedJson(changeset): ValidatedJson<MeasurementChangeset>,
) -> Result<Json<ApiResponse<Measurement>>, ApiError> {
    if changeset.is_empty() {
        return Err(ApiError::validation("no fields to update"));
    }
    if let Some(unit) = changeset.unit.as_deref() {
        if !matches!(unit, "cm" | "in") {
            return Err(ApiError::validation("unit must be one of: cm, in"));
        }
    }

    let mut conn = state.pool.get().await?;

    find_owned(&mut conn, id, &claims).await?;

    let updated = diesel::update(measurements::table.find(id))
        .set(&changeset)
        .returning(Measurement::as_returning())
        .get_result(&mut conn)
        .await?;

    Ok(Json(ApiResponse::new("Measurement updated", updated)))
}

pub async fn delete_measurement(
    State(state): State<AppState>,
    claims: AccessTokenClaims,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    let mut conn = state.pool.get().await?;

    find_owned(&mut conn, id, &claims).await?;

    diesel::delete(measurements::table.find(id))
        .execute(&mut conn)
        .await?;

    Ok(Json(ApiResponse::message("Measurement deleted")))
}

async fn find_owned(
    conn: &mut diesel_async::AsyncPgConnection,
    id: i32,
    claims: &AccessTokenClaims,
) -> Result<Measurement, ApiError> {
    let row = measurements::table
        .find(id)
        .select(Measurement::as_select())
        .first(conn)
        .await
        .optional()?
        .ok_or_else(|| ApiError::not_found("measurement not found"))?;

    claims.authorize_owner(row.user_id)?;
    Ok(row)
}
