//! Validation adapters: axum extractors that run a request part through its
//! schema and hand the handler the normalized output.
//!
//! Each adapter owns exactly one request part (body, query string, or path
//! identifier), so they compose freely on a single route. Schema failures
//! become a 400 with the formatted message; anything else propagates
//! unchanged through [`AppError`].

use axum::{
    Json,
    extract::{FromRequest, FromRequestParts, Path, Query, Request, rejection::JsonRejection},
    http::request::Parts,
};
use serde::de::DeserializeOwned;

use crate::modules::students::rules;
use crate::modules::students::schema::{Schema, format_violations};
use crate::utils::errors::AppError;

/// Body adapter: deserializes JSON, validates it against `T`'s schema, and
/// yields the normalized output. The raw DTO never reaches a handler.
pub struct ValidatedJson<T: Schema>(pub T::Output);

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Schema,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(map_json_rejection)?;

        let output = value
            .validate()
            .map_err(|violations| AppError::bad_request(format_violations(&violations)))?;

        Ok(ValidatedJson(output))
    }
}

/// Query adapter: same contract over the query-parameter bag, including the
/// schema's defaulting behavior.
pub struct ValidatedQuery<T: Schema>(pub T::Output);

impl<S, T> FromRequestParts<S> for ValidatedQuery<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Schema,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|_| AppError::bad_request("Invalid query string"))?;

        let output = value
            .validate()
            .map_err(|violations| AppError::bad_request(format_violations(&violations)))?;

        Ok(ValidatedQuery(output))
    }
}

/// Path-identifier adapter: coerces the `{id}` segment to a positive
/// integer. Failures surface a single terse message and never go through
/// the multi-field formatter.
#[derive(Debug, Clone, Copy)]
pub struct StudentId(pub i64);

const ID_MESSAGE: &str = "Student ID must be a positive integer";

impl<S> FromRequestParts<S> for StudentId
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|_| AppError::bad_request(ID_MESSAGE))?;

        let id = rules::positive_int(&raw, ID_MESSAGE).map_err(AppError::bad_request)?;
        Ok(StudentId(id))
    }
}

// Requiredness is decided by the schemas (every raw DTO field is optional
// at the serde level), so deserialization failures here are shape errors.
fn map_json_rejection(rejection: JsonRejection) -> AppError {
    let error_msg = rejection.body_text();

    if error_msg.contains("invalid type") {
        return AppError::bad_request("Invalid field type in request");
    }

    if matches!(rejection, JsonRejection::MissingJsonContentType(_)) {
        return AppError::bad_request("Missing 'Content-Type: application/json' header");
    }

    AppError::bad_request("Invalid request body")
}
