//! Error handling module

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::dot::{ApiFailure, DotError};
use crate::entities::ControlError;
use crate::services::ServiceError;
use crate::setup::SetupError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error(transparent)]
    Dot(#[from] DotError),

    #[error("{message}")]
    Setup { code: &'static str, message: String },
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::UnknownDevice(_) | ServiceError::UnknownButton(_) => {
                AppError::NotFound(err.to_string())
            }
            ServiceError::Unavailable(_) => AppError::Conflict(err.to_string()),
            ServiceError::InvalidInput(_) | ServiceError::ImageNotFound(_) => {
                AppError::BadRequest(err.to_string())
            }
            ServiceError::Dot(e) => AppError::Dot(e),
        }
    }
}

impl From<ControlError> for AppError {
    fn from(err: ControlError) -> Self {
        match err {
            ControlError::UnknownEntity(_) => AppError::NotFound(err.to_string()),
            ControlError::TooLong { .. } | ControlError::InvalidOption(_) => {
                AppError::BadRequest(err.to_string())
            }
        }
    }
}

impl From<SetupError> for AppError {
    fn from(err: SetupError) -> Self {
        AppError::Setup {
            code: err.code(),
            message: err.to_string(),
        }
    }
}

impl AppError {
    fn message(&self) -> String {
        match self {
            AppError::NotFound(msg) | AppError::BadRequest(msg) | AppError::Conflict(msg) => {
                msg.clone()
            }
            AppError::Dot(e) => e.to_string(),
            AppError::Setup { message, .. } => message.clone(),
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Dot(DotError::Auth(_)) => StatusCode::UNAUTHORIZED,
            AppError::Dot(DotError::Api { kind, .. }) => match kind {
                ApiFailure::Forbidden => StatusCode::FORBIDDEN,
                ApiFailure::NotFound => StatusCode::NOT_FOUND,
                ApiFailure::Server(_) | ApiFailure::InvalidResponse => StatusCode::BAD_GATEWAY,
            },
            AppError::Dot(DotError::Connection(_)) => StatusCode::BAD_GATEWAY,
            AppError::Setup { code, .. } => match *code {
                "invalid_auth" => StatusCode::UNAUTHORIZED,
                "cannot_connect" | "unknown" => StatusCode::BAD_GATEWAY,
                _ => StatusCode::UNPROCESSABLE_ENTITY,
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        let mut body = serde_json::json!({
            "error": self.message(),
            "status": status.as_u16()
        });
        if let AppError::Setup { code, .. } = &self {
            body["code"] = serde_json::Value::from(*code);
        }

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dot_error_statuses() {
        assert_eq!(
            AppError::from(DotError::Auth("x".into())).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AppError::from(DotError::Api {
                kind: ApiFailure::Forbidden,
                message: "x".into()
            })
            .status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            AppError::from(DotError::Api {
                kind: ApiFailure::Server(502),
                message: "x".into()
            })
            .status(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            AppError::from(DotError::Connection("x".into())).status(),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn test_service_error_statuses() {
        assert_eq!(
            AppError::from(ServiceError::UnknownDevice("D".into())).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::from(ServiceError::Unavailable("D".into())).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::from(ServiceError::ImageNotFound("/x".into())).status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[tokio::test]
    async fn test_response_body_carries_inner_message() {
        let resp = AppError::from(ServiceError::ImageNotFound("/x.png".into())).into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"], "Image file not found: /x.png");
        assert_eq!(body["status"], 400);
        assert!(body.get("code").is_none());

        let resp = AppError::from(SetupError::NoDevices).into_response();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"], "No devices found on this account");
        assert_eq!(body["code"], "no_devices");
    }

    #[test]
    fn test_setup_error_statuses() {
        assert_eq!(
            AppError::from(SetupError::InvalidAuth).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AppError::from(SetupError::NoDevices).status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }
}
