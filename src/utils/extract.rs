// src/utils/extract.rs

//! Extractors that deserialize and validate in one step, so handlers only
//! ever see inputs that passed `validator`.

use axum::{
    Json,
    extract::{FromRequest, FromRequestParts, Query, Request},
    http::request::Parts,
};
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::error::AppError;

/// `Query<T>` followed by `T::validate`. Both failures are a 400.
#[derive(Debug)]
pub struct ValidatedQuery<T>(pub T);

impl<T, S> FromRequestParts<S> for ValidatedQuery<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?;
        value
            .validate()
            .map_err(|e| AppError::BadRequest(e.to_string()))?;
        Ok(ValidatedQuery(value))
    }
}

/// `Json<T>` followed by `T::validate`. Both failures are a 400.
#[derive(Debug)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?;
        value
            .validate()
            .map_err(|e| AppError::BadRequest(e.to_string()))?;
        Ok(ValidatedJson(value))
    }
}
