use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use chrono::{Duration, NaiveDateTime, Utc};
use diesel::prelude::*;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::schema::users;
use crate::state::AppState;
use crate::utils::ApiError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Customer,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Customer => "customer",
            Role::Admin => "admin",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "customer" => Some(Role::Customer),
            "admin" => Some(Role::Admin),
            _ => None,
        }
    }
}

#[derive(Queryable, Selectable, Debug, PartialEq)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub created_at: NaiveDateTime,
}

/// Row shape safe to hand to clients: never carries the password hash.
#[derive(Queryable, Selectable, Debug, Serialize)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct SafeUser {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: String,
    pub created_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = users)]
pub struct NewUser {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 100, message = "name is required"))]
    pub name: String,
    #[validate(
        email(message = "a valid email is required"),
        length(max = 120, message = "email must be at most 120 characters")
    )]
    pub email: String,
    #[validate(length(min = 8, message = "password must be at least 8 characters"))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "a valid email is required"))]
    pub email: String,
    #[validate(length(min = 1, message = "password is required"))]
    pub password: String,
}

#[derive(Serialize)]
pub struct AuthBody {
    pub token: String,
    pub user: SafeUser,
}

/// Bearer-token claims. Handlers take this as a parameter; the extractor
/// below rejects the request with 401 before the handler runs if the token
/// is missing, malformed or expired.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessTokenClaims {
    pub sub: String,
    pub role: Role,
    pub iat: i64,
    pub exp: i64,
}

impl AccessTokenClaims {
    pub fn issue(user_id: Uuid, role: Role, ttl_hours: i64) -> Self {
        let now = Utc::now();
        Self {
            sub: user_id.to_string(),
            role,
            iat: now.timestamp(),
            exp: (now + Duration::hours(ttl_hours)).timestamp(),
        }
    }

    pub fn sign(&self, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
        encode(
            &Header::default(),
            self,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
    }

    pub fn verify(token: &str, secret: &str) -> Result<Self, jsonwebtoken::errors::Error> {
        let data = decode::<Self>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::default(),
        )?;
        Ok(data.claims)
    }

    pub fn user_id(&self) -> Result<Uuid, ApiError> {
        Uuid::parse_str(&self.sub).map_err(|_| ApiError::unauthorized("malformed token subject"))
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn require_admin(&self) -> Result<(), ApiError> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(ApiError::forbidden("admin access required"))
        }
    }

    /// Owner-or-admin gate applied once a row is in hand: admins may touch
    /// any row, everyone else only rows carrying their own user id.
    pub fn authorize_owner(&self, owner_id: Uuid) -> Result<(), ApiError> {
        if self.is_admin() || self.user_id()? == owner_id {
            Ok(())
        } else {
            Err(ApiError::forbidden("access denied"))
        }
    }
}

impl FromRequestParts<AppState> for AccessTokenClaims {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| ApiError::unauthorized("missing bearer token"))?;
        let token = header
            .strip_prefix("Bearer ")
            .ok_or_else(|| ApiError::unauthorized("missing bearer token"))?;
        Ok(Self::verify(token, &state.config.jwt_secret)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret";

    #[test]
    fn token_round_trips() {
        let id = Uuid::new_v4();
        let claims = AccessTokenClaims::issue(id, Role::Customer, 24);
        let token = claims.sign(SECRET).unwrap();
        let decoded = AccessTokenClaims::verify(&token, SECRET).unwrap();
        assert_eq!(decoded.sub, id.to_string());
        assert_eq!(decoded.role, Role::Customer);
        assert_eq!(decoded.user_id().unwrap(), id);
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let claims = AccessTokenClaims::issue(Uuid::new_v4(), Role::Admin, 24);
        let token = claims.sign(SECRET).unwrap();
        assert!(AccessTokenClaims::verify(&token, "other-secret").is_err());
    }

    #[test]
    fn expired_token_is_rejected() {
        let claims = AccessTokenClaims::issue(Uuid::new_v4(), Role::Customer, -1);
        let token = claims.sign(SECRET).unwrap();
        assert!(AccessTokenClaims::verify(&token, SECRET).is_err());
    }

    #[test]
    fn only_admin_claims_pass_the_admin_gate() {
        let admin = AccessTokenClaims::issue(Uuid::new_v4(), Role::Admin, 1);
        assert!(admin.require_admin().is_ok());

        let customer = AccessTokenClaims::issue(Uuid::new_v4(), Role::Customer, 1);
        assert!(customer.require_admin().is_err());
    }

    #[test]
    fn role_strings_round_trip() {
        assert_eq!(Role::parse("customer"), Some(Role::Customer));
        assert_eq!(Role::parse("admin"), Some(Role::Admin));
        assert_eq!(Role::parse("superuser"), None);
        assert_eq!(Role::Admin.as_str(), "admin");
    }

    #[test]
    fn owner_gate_admits_the_owner_and_admins_only() {
        let owner = Uuid::new_v4();
        let stranger = Uuid::new_v4();

        let owner_claims = AccessTokenClaims::issue(owner, Role::Customer, 1);
        assert!(owner_claims.authorize_owner(owner).is_ok());
        assert!(matches!(
            owner_claims.authorize_owner(stranger),
            Err(ApiError::Forbidden(_))
        ));

        let admin_claims = AccessTokenClaims::issue(Uuid::new_v4(), Role::Admin, 1);
        assert!(admin_claims.authorize_owner(owner).is_ok());
        assert!(admin_claims.authorize_owner(stranger).is_ok());
    }

    #[test]
    fn email_longer_than_its_column_fails_validation() {
        // Valid shape (labels under 63 chars) but 132 characters overall.
        let email = format!("tailor@{}.{}.com", "a".repeat(60), "a".repeat(60));
        let request = RegisterRequest {
            name: "Asha".to_owned(),
            email,
            password: "longenough".to_owned(),
        };
        let errors = request.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("email"));

        let request = RegisterRequest {
            name: "Asha".to_owned(),
            email: "tailor@example.com".to_owned(),
            password: "longenough".to_owned(),
        };
        assert!(request.validate().is_ok());
    }
}
