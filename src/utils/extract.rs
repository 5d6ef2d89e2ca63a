use axum::{
    Json,
    extract::{FromRequest, Request},
};
use serde::de::DeserializeOwned;
use validator::Validate;

use super::error::ApiError;

/// Json extractor that runs the payload's `validator` rules before the
/// handler ever sees it. Both malformed JSON and failed rules surface as
/// 400s in the standard envelope.
pub struct ValidatedJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(payload) = Json::<T>::from_request(req, state)
            .await
            .map_err(|err| ApiError::validation(err.body_text()))?;
        payload
            .validate()
            .map_err(|err| ApiError::validation(err.to_string()))?;
        Ok(Self(payload))
    }
}
