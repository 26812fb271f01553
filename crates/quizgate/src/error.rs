//! Unified error type for the Quizgate services.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use quizgate_bridge::BridgeError;
use quizgate_identity::IdentityError;
use quizgate_quiz::QuizError;
use quizgate_token::TokenError;
use serde::Serialize;

/// Top-level error that wraps all crate-specific errors.
///
/// Handlers return `Result<_, QuizgateError>`; the `#[from]` impls let `?`
/// lift sub-crate errors, and [`IntoResponse`] picks the status code.
#[derive(Debug, thiserror::Error)]
pub enum QuizgateError {
    #[error(transparent)]
    Token(#[from] TokenError),

    #[error(transparent)]
    Identity(#[from] IdentityError),

    #[error(transparent)]
    Bridge(#[from] BridgeError),

    #[error(transparent)]
    Quiz(#[from] QuizError),

    /// The request body or form couldn't be understood.
    #[error("invalid request: {0}")]
    BadRequest(String),

    /// Startup configuration is unusable.
    #[error("configuration error: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl QuizgateError {
    fn status(&self) -> StatusCode {
        match self {
            Self::Identity(IdentityError::MissingInput) | Self::BadRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::Identity(IdentityError::AuthenticationFailed) => StatusCode::UNAUTHORIZED,
            Self::Quiz(QuizError::QuestionNotFound(_) | QuizError::Exhausted) => {
                StatusCode::NOT_FOUND
            }
            Self::Quiz(QuizError::AlreadyAnswered(_)) => StatusCode::CONFLICT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for QuizgateError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            Self::Identity(IdentityError::MissingInput) => "please fill in all fields".to_string(),
            Self::Identity(IdentityError::AuthenticationFailed) => {
                "invalid username or password".to_string()
            }
            _ if status.is_server_error() => {
                tracing::error!(error = %self, "request failed");
                "internal error".to_string()
            }
            other => other.to_string(),
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}
