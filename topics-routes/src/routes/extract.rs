use crate::routes::responses::TopicError;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{FromRequest, FromRequestParts};

/// [`axum::Json`] that rejects with a JSON `{error}` body.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(TopicError))]
pub struct TopicJson<T>(pub T);

/// [`axum::extract::Path`] that rejects with a JSON `{error}` body.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(TopicError))]
pub struct TopicPath<T>(pub T);

/// [`axum::extract::Query`] that rejects with a JSON `{error}` body.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(TopicError))]
pub struct TopicQuery<T>(pub T);

impl From<JsonRejection> for TopicError {
    fn from(rejection: JsonRejection) -> Self {
        TopicError::new(rejection.status(), rejection.body_text())
    }
}

impl From<PathRejection> for TopicError {
    fn from(rejection: PathRejection) -> Self {
        TopicError::new(rejection.status(), rejection.body_text())
    }
}

impl From<QueryRejection> for TopicError {
    fn from(rejection: QueryRejection) -> Self {
        TopicError::new(rejection.status(), rejection.body_text())
    }
}
