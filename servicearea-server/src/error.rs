use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

pub enum ApiError {
    BadRequest(String),
    Unprocessable(String),
    InternalServerError(String),
}

impl From<servicearea_core::Error> for ApiError {
    fn from(error: servicearea_core::Error) -> Self {
        use servicearea_core::Error;

        match error {
            Error::EmptyGraph => ApiError::Unprocessable(error.to_string()),
            Error::InvalidConfig(_)
            | Error::InvalidData(_)
            | Error::MissingColumn(_)
            | Error::UnknownNode(_) => ApiError::BadRequest(error.to_string()),
            _ => ApiError::InternalServerError(error.to_string()),
        }
    }
}

impl From<tokio::task::JoinError> for ApiError {
    fn from(error: tokio::task::JoinError) -> Self {
        ApiError::InternalServerError(format!("computation failed: {error}"))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::InternalServerError(message) => {
                tracing::error!("{message}");
                (StatusCode::INTERNAL_SERVER_ERROR, message).into_response()
            }
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, message).into_response(),
            ApiError::Unprocessable(message) => {
                (StatusCode::UNPROCESSABLE_ENTITY, message).into_response()
            }
        }
    }
}
