use super::models::{
    AccessTokenClaims, AuthBody, LoginRequest, NewUser, RegisterRequest, Role, SafeUser, User,
};
use crate::schema::users;
use crate::state::AppState;
use crate::utils::{ApiError, ApiResponse, ValidatedJson};
use axum::{Json, extract::State, http::StatusCode};
use bcrypt::{DEFAULT_COST, hash, verify};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<RegisterRequest>,
) -> Result<(StatusCode, Json<ApiResponse<AuthBody>>), ApiError> {
    let password_hash = hash_password(payload.password).await?;

    let new_user = NewUser {
        id: Uuid::new_v4(),
        name: payload.name,
        email: payload.email.to_lowercase(),
        password_hash,
        role: Role::Customer.as_str().to_owned(),
    };

    let mut conn = state.pool.get().await?;
    let user = diesel::insert_into(users::table)
        .values(&new_user)
        .returning(SafeUser::as_returning())
        .get_result(&mut conn)
        .await
        .map_err(|err| match err {
            diesel::result::Error::DatabaseError(
                diesel::result::DatabaseErrorKind::UniqueViolation,
                _,
            ) => ApiError::validation("email is already registered"),
            other => other.into(),
        })?;

    let token = issue_token(&state, user.id, Role::Customer)?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(
            "User registered successfully",
            AuthBody { token, user },
        )),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<LoginRequest>,
) -> Result<Json<ApiResponse<AuthBody>>, ApiError> {
    let mut conn = state.pool.get().await?;

    let user = users::table
        .filter(users::email.eq(payload.email.to_lowercase()))
        .select(User::as_select())
        .get_result(&mut conn)
        .await
        .optional()?
        .ok_or_else(|| ApiError::unauthorized("invalid email or password"))?;

    let password = payload.password;
    let password_hash = user.password_hash.clone();
    let valid = tokio::task::spawn_blocking(move || verify(password, &password_hash)).await??;
    if !valid {
        return Err(ApiError::unauthorized("invalid email or password"));
    }

    let role = Role::parse(&user.role).ok_or_else(|| {
        ApiError::internal(format!("unknown role '{}' on user {}", user.role, user.id))
    })?;
    let token = issue_token(&state, user.id, role)?;

    let user = SafeUser {
        id: user.id,
        name: user.name,
        email: user.email,
        role: user.role,
        created_at: user.created_at,
    };

    Ok(Json(ApiResponse::new(
        "Login successful",
        AuthBody { token, user },
    )))
}

pub async fn get_current_user(
    State(state): State<AppState>,
    claims: AccessTokenClaims,
) -> Result<Json<ApiResponse<SafeUser>>, ApiError> {
    let user_id = claims.user_id()?;
    let mut conn = state.pool.get().await?;

    let user = users::table
        .find(user_id)
        .select(SafeUser::as_select())
        .get_result(&mut conn)
        .await
        .optional()?
        .ok_or_else(|| ApiError::not_found("user not found"))?;

    Ok(Json(ApiResponse::new("Current user", user)))
}

fn issue_token(state: &AppState, user_id: Uuid, role: Role) -> Result<String, ApiError> {
    let claims = AccessTokenClaims::issue(user_id, role, state.config.token_ttl_hours);
    Ok(claims.sign(&state.config.jwt_secret)?)
}

async fn hash_password(password: String) -> Result<String, ApiError> {
    let hashed = tokio::task::spawn_blocking(move || hash(password, DEFAULT_COST)).await??;
    Ok(hashed)
}
