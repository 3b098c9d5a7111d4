use async_trait::async_trait;
use axum::extract::{FromRequest, Request};
use axum::Json;
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::api::errors::ApiError;
use crate::services::selection::SelectionError;

pub(crate) fn validate_payload<T: Validate>(payload: &T) -> Result<(), ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))
}

/// `Json<T>` whose rejections (missing fields, wrong types, bad syntax) are 400s.
pub(crate) struct JsonBody<T>(pub(crate) T);

#[async_trait]
impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;
        Ok(Self(value))
    }
}

/// Decodes a raw JSON body into a closed request type; shape errors are 400s.
pub(crate) fn decode_body<T: DeserializeOwned>(body: serde_json::Value) -> Result<T, ApiError> {
    serde_json::from_value(body).map_err(|e| ApiError::BadRequest(format!("Invalid request: {e}")))
}

pub(crate) fn required_text<'a>(value: &'a str, field: &str) -> Result<&'a str, ApiError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(ApiError::BadRequest(format!("{field} must not be empty")))
    } else {
        Ok(trimmed)
    }
}

impl From<SelectionError> for ApiError {
    fn from(error: SelectionError) -> Self {
        ApiError::BadRequest(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schemas::bulk::BulkOperationRequest;
    use serde_json::json;

    #[test]
    fn decode_body_reports_shape_errors_as_bad_request() {
        let result = decode_body::<BulkOperationRequest>(json!({ "data": {} }));
        match result {
            Err(ApiError::BadRequest(message)) => assert!(message.starts_with("Invalid request")),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn required_text_trims() {
        assert_eq!(required_text("  Acme ", "name").unwrap(), "Acme");
        assert!(required_text("   ", "name").is_err());
    }
}
