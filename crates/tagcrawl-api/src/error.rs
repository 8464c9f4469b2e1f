//! HTTP error response conversion
//!
//! Handlers return `Result<impl IntoResponse, HttpAppError>` and convert
//! domain errors with `.map_err(HttpAppError::from)` so every failure renders
//! the same JSON shape.

use axum::{
    extract::rejection::JsonRejection,
    extract::{FromRequest, Request},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{de::DeserializeOwned, Serialize};
use std::sync::OnceLock;
use tagcrawl_core::{AppError, ErrorMetadata, LogLevel};

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_type: Option<String>,
    /// Machine-readable error code for programmatic handling
    pub code: String,
    /// Whether this error is recoverable (can be retried)
    pub recoverable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_action: Option<String>,
}

impl ErrorResponse {
    fn from_app_error(app_error: &AppError, include_details: bool) -> Self {
        Self {
            error: app_error.client_message(),
            details: include_details.then(|| app_error.detailed_message()),
            error_type: include_details.then(|| app_error.error_type().to_string()),
            code: app_error.error_code().to_string(),
            recoverable: app_error.is_recoverable(),
            suggested_action: app_error.suggested_action().map(String::from),
        }
    }
}

/// Wrapper so `IntoResponse` can be implemented for the core `AppError`.
#[derive(Debug)]
pub struct HttpAppError(pub AppError);

impl From<AppError> for HttpAppError {
    fn from(err: AppError) -> Self {
        HttpAppError(err)
    }
}

impl From<anyhow::Error> for HttpAppError {
    fn from(err: anyhow::Error) -> Self {
        HttpAppError(AppError::from(err))
    }
}

impl From<JsonRejection> for HttpAppError {
    fn from(rejection: JsonRejection) -> Self {
        HttpAppError(AppError::InvalidInput(format!(
            "Invalid request body: {}",
            rejection.body_text()
        )))
    }
}

/// JSON body extractor that renders deserialization failures as `ErrorResponse`.
#[derive(Debug, Clone, Copy)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
{
    type Rejection = HttpAppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(inner) = Json::<T>::from_request(req, state)
            .await
            .map_err(HttpAppError::from)?;
        Ok(ValidatedJson(inner))
    }
}

fn log_error(error: &AppError) {
    let error_type = error.error_type();
    match error.log_level() {
        LogLevel::Debug => {
            tracing::debug!(error = %error, error_type = error_type, "Error occurred");
        }
        LogLevel::Warn => {
            tracing::warn!(error = %error, error_type = error_type, "Error occurred");
        }
        LogLevel::Error => {
            tracing::error!(error = %error, error_type = error_type, "Error occurred");
        }
    }
}

static PRODUCTION_MODE: OnceLock<bool> = OnceLock::new();

/// Record whether the loaded config is a production one. Called once at
/// startup; responses include error details until this is set.
pub fn set_production_mode(production: bool) {
    if PRODUCTION_MODE.set(production).is_err() && is_production_mode() != production {
        tracing::warn!(
            production,
            "Production mode already set for error responses; keeping the first value"
        );
    }
}

fn is_production_mode() -> bool {
    PRODUCTION_MODE.get().copied().unwrap_or(false)
}

/// Details only leave the process outside production and for non-sensitive errors.
fn include_details(app_error: &AppError, production: bool) -> bool {
    !production && !app_error.is_sensitive()
}

impl IntoResponse for HttpAppError {
    fn into_response(self) -> Response {
        let app_error = &self.0;

        let status = StatusCode::from_u16(app_error.http_status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        log_error(app_error);

        let body = ErrorResponse::from_app_error(
            app_error,
            include_details(app_error, is_production_mode()),
        );

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_response_shape() {
        let response = ErrorResponse::from_app_error(
            &AppError::InvalidInput("Hashtag must not be empty".to_string()),
            true,
        );
        let json = serde_json::to_value(&response).expect("serialize");
        assert_eq!(json["error"], "Hashtag must not be empty");
        assert_eq!(json["code"], "INVALID_INPUT");
        assert_eq!(json["recoverable"], false);
        assert_eq!(json["error_type"], "InvalidInput");
        assert!(json["details"].as_str().is_some());
    }

    #[test]
    fn test_sensitive_details_omitted() {
        let response = ErrorResponse::from_app_error(
            &AppError::Upstream("token=abc rejected".to_string()),
            false,
        );
        let json = serde_json::to_value(&response).expect("serialize");
        assert_eq!(json["error"], "Media source is unavailable");
        assert!(json.get("details").is_none());
        assert!(json.get("error_type").is_none());
        assert_eq!(json["suggested_action"], "Retry the search later");
    }

    #[test]
    fn test_production_hides_details() {
        let invalid = AppError::InvalidInput("hashtag is empty".to_string());
        assert!(include_details(&invalid, false));
        assert!(!include_details(&invalid, true));

        let upstream = AppError::Upstream("token expired".to_string());
        assert!(!include_details(&upstream, false));
        assert!(!include_details(&upstream, true));
    }

    #[test]
    fn test_status_codes() {
        let response = HttpAppError(AppError::NotFound("gone".to_string())).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = HttpAppError(AppError::Upstream("down".to_string())).into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

        let response = HttpAppError::from(anyhow::anyhow!("boom")).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
