use crate::error::TopicServiceError;
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use chrono::{DateTime, Utc};
use engine::error::ErrorStatus;
use error_stack::Report;
use serde::Serialize;
use std::borrow::Cow;
use topics_core::model::TopicId;
use utoipa::ToSchema;

pub type ErrorMessageType = Cow<'static, str>;

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    ok: bool,
    timestamp: DateTime<Utc>,
}

impl HealthResponse {
    pub fn now() -> Self {
        Self {
            ok: true,
            timestamp: Utc::now(),
        }
    }
}

impl IntoResponse for HealthResponse {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BannerResponse {
    message: &'static str,
    version: &'static str,
    endpoints: Vec<&'static str>,
}

impl BannerResponse {
    pub fn new(endpoints: Vec<&'static str>) -> Self {
        Self {
            message: "Topic knowledge base API",
            version: env!("CARGO_PKG_VERSION"),
            endpoints,
        }
    }
}

impl IntoResponse for BannerResponse {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

/// `{success: true}`, optionally with the id of a created topic or a message.
#[derive(Debug, Serialize, ToSchema)]
pub struct SuccessResponse {
    #[serde(skip)]
    status_code: StatusCode,
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<TopicId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<&'static str>,
}

impl SuccessResponse {
    pub fn ok() -> Self {
        Self {
            status_code: StatusCode::OK,
            success: true,
            id: None,
            message: None,
        }
    }

    pub fn created(id: TopicId) -> Self {
        Self {
            status_code: StatusCode::CREATED,
            id: Some(id),
            ..Self::ok()
        }
    }

    pub fn with_message(message: &'static str) -> Self {
        Self {
            message: Some(message),
            ..Self::ok()
        }
    }
}

impl IntoResponse for SuccessResponse {
    fn into_response(self) -> Response {
        (self.status_code, Json(self)).into_response()
    }
}

/// `{success: false, error}`, the failure shape of schema initialisation.
#[derive(Debug, Serialize, ToSchema)]
pub struct InitFailure {
    #[serde(skip)]
    status_code: StatusCode,
    success: bool,
    error: String,
}

impl From<&Report<TopicServiceError>> for InitFailure {
    fn from(report: &Report<TopicServiceError>) -> Self {
        let context = report.current_context();
        Self {
            status_code: context.status_code(),
            success: false,
            error: context.message(),
        }
    }
}

impl IntoResponse for InitFailure {
    fn into_response(self) -> Response {
        (self.status_code, Json(self)).into_response()
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TopicError {
    #[serde(skip)]
    status_code: StatusCode,
    #[schema(value_type = String)]
    error: ErrorMessageType,
}

impl TopicError {
    pub fn not_found() -> Self {
        Self::new(StatusCode::NOT_FOUND, "Topic not found")
    }

    pub fn new(status_code: StatusCode, message: impl Into<ErrorMessageType>) -> Self {
        Self {
            status_code,
            error: message.into(),
        }
    }
}

impl IntoResponse for TopicError {
    fn into_response(self) -> Response {
        (self.status_code, Json(self)).into_response()
    }
}
