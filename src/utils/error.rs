use axum::{
    extract::Json,
    http::{header, StatusCode},
    response::IntoResponse,
};
use serde_json::json;

#[derive(Clone, Debug, thiserror::Error, PartialEq)]
pub enum Error {
    #[error("Unauthorized: Invalid token")]
    Unauthenticated,
    #[error("User ID is required")]
    MissingIdentity,
    #[error("Access denied. You can only access your own meals.")]
    Forbidden,
    #[error("Meal not found")]
    NotFound,
    #[error("{}", .0.join(", "))]
    Invalid(Vec<String>),
    #[error("Service unavailable. Please try again later.")]
    StoreUnavailable,
    #[error("Permission denied")]
    StoreDenied,
    #[error("Sorry an error occurred")]
    Unexpected,
}

impl Error {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Unauthenticated | Self::MissingIdentity => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Invalid(_) => StatusCode::BAD_REQUEST,
            Self::StoreUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            Self::StoreDenied | Self::Unexpected => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Only transient infrastructure failures are worth repeating unchanged.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::StoreUnavailable)
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> axum::response::Response {
        let status = self.status_code();
        let body = match &self {
            Self::Invalid(messages) => json!({
                "error": self.to_string(),
                "errors": messages,
            }),
            _ => json!({ "error": self.to_string() }),
        };

        match self.is_retryable() {
            true => (status, [(header::RETRY_AFTER, "1")], Json(body)).into_response(),
            false => (status, Json(body)).into_response(),
        }
    }
}
