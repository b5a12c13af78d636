use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use serde_json::Value;
use tracing::error;
use ucrud_core::Error;

/// The JSON envelope returned by every API route
#[derive(Clone, Debug, Serialize)]
pub struct Envelope {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<String>>,
}

/// A successful response
#[derive(Debug)]
pub struct ApiResponse {
    status: StatusCode,
    envelope: Envelope,
}

impl ApiResponse {
    #[must_use]
    pub fn ok(data: Value) -> Self {
        Self {
            status: StatusCode::OK,
            envelope: Envelope {
                success: true,
                message: None,
                data: Some(data),
                errors: None,
            },
        }
    }

    /// A successful response carrying only a message
    #[must_use]
    pub fn message<S: Into<String>>(message: S) -> Self {
        Self {
            status: StatusCode::OK,
            envelope: Envelope {
                success: true,
                message: Some(message.into()),
                data: None,
                errors: None,
            },
        }
    }

    #[must_use]
    pub fn created(data: Value) -> Self {
        Self::ok(data).with_status(StatusCode::CREATED)
    }

    #[must_use]
    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    #[must_use]
    pub fn with_message<S: Into<String>>(mut self, message: S) -> Self {
        self.envelope.message = Some(message.into());
        self
    }
}

impl IntoResponse for ApiResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self.envelope)).into_response()
    }
}

/// An application error rendered as a failed envelope
#[derive(Debug)]
pub struct ApiError(pub Error);

impl<E> From<E> for ApiError
where
    E: Into<Error>,
{
    fn from(error: E) -> Self {
        Self(error.into())
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self.0 {
            Error::Validation(_) => StatusCode::BAD_REQUEST,
            Error::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Error::Forbidden(_) => StatusCode::FORBIDDEN,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::Conflict(_) => StatusCode::CONFLICT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let envelope = match self.0 {
            Error::Validation(errors) => Envelope {
                success: false,
                message: Some("Validation failed".to_string()),
                data: None,
                errors: Some(errors),
            },
            error => {
                if status.is_server_error() {
                    error!("request failed: {error}");
                }
                Envelope {
                    success: false,
                    message: Some(error.to_string()),
                    data: None,
                    errors: None,
                }
            }
        };
        (status, Json(envelope)).into_response()
    }
}

pub type ApiResult<T = ApiResponse> = Result<T, ApiError>;

#[cfg(test)]
mod test {
    use super::*;
    use serde_json::json;

    fn status(error: Error) -> StatusCode {
        ApiError(error).into_response().status()
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(status(Error::Validation(vec![])), StatusCode::BAD_REQUEST);
        assert_eq!(
            status(Error::Unauthorized("Invalid token".to_string())),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            status(Error::Forbidden("Insufficient permissions".to_string())),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            status(Error::NotFound("Product not found".to_string())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status(Error::Conflict("exists".to_string())),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status(Error::Driver(ucrud_drivers::Error::ConnectionFailure(
                "refused".to_string()
            ))),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_envelope_omits_empty_fields() -> anyhow::Result<()> {
        let envelope = ApiResponse::ok(json!({"id": 1})).envelope;
        assert_eq!(
            serde_json::to_value(envelope)?,
            json!({"success": true, "data": {"id": 1}})
        );
        Ok(())
    }

    #[test]
    fn test_message_only() -> anyhow::Result<()> {
        let envelope = ApiResponse::message("Password changed successfully").envelope;
        assert_eq!(
            serde_json::to_value(envelope)?,
            json!({"success": true, "message": "Password changed successfully"})
        );
        Ok(())
    }

    #[test]
    fn test_created() {
        let response = ApiResponse::created(json!({}))
            .with_message("Product created successfully")
            .into_response();
        assert_eq!(response.status(), StatusCode::CREATED);
    }
}
