use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use error_stack::Report;
use serde_json::json;
use std::error::Error;

/// Maps a service-level error onto the HTTP status and the message shown to the caller.
pub trait ErrorStatus {
    fn status_code(&self) -> StatusCode;

    fn message(&self) -> String;
}

#[derive(thiserror::Error)]
#[error("there was an error running the endpoint")]
pub struct EndpointError<T: Error>(Report<T>);

impl<T: Error> std::fmt::Debug for EndpointError<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl<T> From<Report<T>> for EndpointError<T>
where
    T: Error,
{
    fn from(value: Report<T>) -> Self {
        Self(value)
    }
}

impl<T> IntoResponse for EndpointError<T>
where
    T: Error + ErrorStatus + Send + Sync + 'static,
{
    fn into_response(self) -> Response {
        let context = self.0.current_context();
        (
            context.status_code(),
            Json(json!({ "error": context.message() })),
        )
            .into_response()
    }
}
