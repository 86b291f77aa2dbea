use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use core_types::CoreError;
use serde_json::json;
use subscriptions::SubscriptionError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] database::DbError),
    #[error("Invalid input: {0}")]
    InvalidInput(#[from] CoreError),
    #[error("Malformed request body: {0}")]
    MalformedBody(#[from] JsonRejection),
    #[error("Malformed path: {0}")]
    MalformedPath(#[from] PathRejection),
    #[error("Malformed query string: {0}")]
    MalformedQuery(#[from] QueryRejection),
    #[error("Subscription error: {0}")]
    Subscription(#[from] SubscriptionError),
    #[error("Premium access required")]
    PremiumRequired,
}

/// Converts our custom `AppError` into an HTTP response.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::Database(db_err @ database::DbError::DuplicatePayment(_)) => {
                (StatusCode::CONFLICT, db_err.to_string())
            }
            AppError::Database(db_err) => {
                tracing::error!(error = ?db_err, "Database error.");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal database error occurred".to_string(),
                )
            }
            AppError::InvalidInput(err) => (StatusCode::BAD_REQUEST, err.to_string()),
            AppError::MalformedBody(rejection) => (StatusCode::BAD_REQUEST, rejection.body_text()),
            AppError::MalformedPath(rejection) => (StatusCode::BAD_REQUEST, rejection.body_text()),
            AppError::MalformedQuery(rejection) => (StatusCode::BAD_REQUEST, rejection.body_text()),
            AppError::Subscription(err @ SubscriptionError::NotCancellable(_)) => {
                (StatusCode::CONFLICT, err.to_string())
            }
            AppError::Subscription(err @ SubscriptionError::InvalidCheckout(_)) => {
                (StatusCode::BAD_REQUEST, err.to_string())
            }
            AppError::Subscription(err @ SubscriptionError::InvalidSettings(_)) => {
                tracing::error!(error = ?err, "Subscription configuration error.");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "A server configuration error occurred".to_string(),
                )
            }
            AppError::PremiumRequired => (
                StatusCode::FORBIDDEN,
                "This feature requires an active trial or premium subscription".to_string(),
            ),
        };

        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}
