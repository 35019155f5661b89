//! Extractors that reject with [`AppError`] instead of axum's plain text.
//!
//! Axum's `Json` extractor answers malformed bodies with its own plain-text
//! rejection and insists on a JSON content type. These read the raw body and
//! report parse and validation failures as `{ error, code, details }`.
//! [`PathParam`] does the same for path segments.

use axum::body::Bytes;
use axum::extract::{FromRequest, FromRequestParts, Path, Request};
use axum::http::request::Parts;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use validator::Validate;

use crate::error::AppError;

/// A JSON body deserialized into `T`.
#[derive(Debug)]
pub struct JsonPayload<T>(pub T);

/// A JSON body deserialized into `T` and checked with [`Validate`].
#[derive(Debug)]
pub struct ValidatedJson<T>(pub T);

/// Path parameters deserialized into `T`; a bad segment is a JSON 400.
#[derive(Debug)]
pub struct PathParam<T>(pub T);

impl<S, T> FromRequestParts<S> for PathParam<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Send,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(value) = Path::<T>::from_request_parts(parts, state).await?;
        Ok(Self(value))
    }
}

impl<S, T> FromRequest<S> for JsonPayload<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Send,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?;
        Ok(Self(parse_json(&bytes)?))
    }
}

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate + Send,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let JsonPayload(value) = JsonPayload::<T>::from_request(req, state).await?;
        value.validate().map_err(|errors| AppError::InvalidPayload {
            message: "Request body failed validation".to_string(),
            details: serde_json::to_value(&errors).unwrap_or(Value::Null),
        })?;
        Ok(Self(value))
    }
}

/// Deserialize `bytes`, describing where and why parsing failed.
pub fn parse_json<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, AppError> {
    serde_json::from_slice(bytes).map_err(|e| AppError::InvalidPayload {
        message: "Invalid request payload".to_string(),
        details: json!({
            "reason": e.to_string(),
            "line": e.line(),
            "column": e.column(),
        }),
    })
}
