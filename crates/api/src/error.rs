use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use flimix_core::CoreError;
use serde_json::json;

/// API error type mapping the core taxonomy to structured JSON responses.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_type(&self) -> &'static str {
        match self {
            ApiError::NotFound(_) => "notFound",
            ApiError::BadRequest(_) => "badRequest",
            ApiError::Conflict(_) => "conflict",
            ApiError::Internal(_) => "internalError",
        }
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation(e) => ApiError::BadRequest(e.to_string()),
            CoreError::NotFound { entity, id } => {
                ApiError::NotFound(format!("{entity} {id} not found"))
            }
            CoreError::Conflict(msg) => ApiError::Conflict(msg),
            CoreError::InvariantViolation(msg) => ApiError::Conflict(msg),
            // Store faults surface here and nowhere else; the raw detail
            // is logged, not returned.
            CoreError::Internal(msg) => ApiError::Internal(msg),
            CoreError::Database(e) => ApiError::Internal(e.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            ApiError::NotFound(msg)
            | ApiError::BadRequest(msg)
            | ApiError::Conflict(msg) => msg.clone(),
            ApiError::Internal(msg) => {
                tracing::error!("Internal error: {msg}");
                "An internal error occurred".to_string()
            }
        };

        let body = json!({
            "error": self.error_type(),
            "message": message,
        });

        (status, Json(body)).into_response()
    }
}

/// Convenience type alias for route handlers.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use flimix_core::content::validate::ValidationError;

    #[test]
    fn core_errors_map_to_expected_statuses() {
        let cases: Vec<(CoreError, StatusCode)> = vec![
            (
                CoreError::Validation(ValidationError::MissingField("name")),
                StatusCode::BAD_REQUEST,
            ),
            (
                CoreError::not_found("movie", 7),
                StatusCode::NOT_FOUND,
            ),
            (
                CoreError::Conflict("duplicate".into()),
                StatusCode::CONFLICT,
            ),
            (
                CoreError::InvariantViolation("active page".into()),
                StatusCode::CONFLICT,
            ),
            (
                CoreError::Internal("boom".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status(), status);
        }
    }

    #[test]
    fn internal_detail_is_not_echoed() {
        let err = ApiError::Internal("connection refused on 10.0.0.3".into());
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
