use axum::http::StatusCode;
use engine::error::ErrorStatus;

#[derive(Debug, thiserror::Error)]
pub enum TopicServiceError {
    /// Schema initialisation was requested without a database.
    #[error("Database not configured")]
    Configuration,
    /// A write was requested without a database.
    #[error("Database not configured")]
    Unavailable,
    /// Storage rejected the operation, the message is storage's own.
    #[error("{0}")]
    Storage(String),
}

impl ErrorStatus for TopicServiceError {
    fn status_code(&self) -> StatusCode {
        match self {
            TopicServiceError::Configuration => StatusCode::INTERNAL_SERVER_ERROR,
            TopicServiceError::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
            TopicServiceError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message(&self) -> String {
        self.to_string()
    }
}
