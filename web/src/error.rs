//! Error types for the web server.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use kana_classifier::ClassifierError;
use serde_json::json;

/// Errors raised while handling an upload or serving a stored file.
///
/// The `Display` text is the plain-text response body.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("No file part")]
    NoFilePart,

    #[error("No selected file")]
    NoSelectedFile,

    #[error("Invalid file type")]
    InvalidFileType,

    #[error("File too large")]
    PayloadTooLarge,

    #[error("Malformed upload: {0}")]
    Multipart(String),

    #[error("Error saving file: {0}")]
    Save(#[source] std::io::Error),

    #[error("Error processing image: {0}")]
    Processing(#[from] ClassifierError),

    #[error("Error serving file: {0}")]
    NotFound(String),

    #[error("Unexpected error: {0}")]
    Internal(String),
}

impl Error {
    pub fn status(&self) -> StatusCode {
        match self {
            Error::NoFilePart
            | Error::NoSelectedFile
            | Error::InvalidFileType
            | Error::Multipart(_) => StatusCode::BAD_REQUEST,
            Error::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::Save(_) | Error::Processing(_) | Error::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_type(&self) -> &'static str {
        match self {
            Error::NoFilePart => "no_file_part",
            Error::NoSelectedFile => "no_selected_file",
            Error::InvalidFileType => "invalid_file_type",
            Error::PayloadTooLarge => "payload_too_large",
            Error::Multipart(_) => "malformed_upload",
            Error::Save(_) => "save_failed",
            Error::Processing(_) => "processing_failed",
            Error::NotFound(_) => "not_found",
            Error::Internal(_) => "internal_error",
        }
    }

    fn log(&self) {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), "{}", self);
        } else {
            tracing::warn!(status = status.as_u16(), "{}", self);
        }
    }
}

impl From<axum::extract::multipart::MultipartError> for Error {
    fn from(err: axum::extract::multipart::MultipartError) -> Self {
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            Error::PayloadTooLarge
        } else {
            Error::Multipart(err.body_text())
        }
    }
}

impl From<tokio::task::JoinError> for Error {
    fn from(err: tokio::task::JoinError) -> Self {
        Error::Internal(err.to_string())
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        self.log();
        (self.status(), self.to_string()).into_response()
    }
}

/// Wraps [`Error`] for the JSON API.
#[derive(Debug)]
pub struct ApiError(pub Error);

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let err = self.0;
        err.log();

        let body = Json(json!({
            "error": {
                "type": err.error_type(),
                "message": err.to_string()
            }
        }));

        (err.status(), body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_errors_are_bad_request() {
        for err in [Error::NoFilePart, Error::NoSelectedFile, Error::InvalidFileType] {
            assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        }
    }

    #[test]
    fn test_messages() {
        assert_eq!(Error::NoFilePart.to_string(), "No file part");
        assert_eq!(Error::InvalidFileType.to_string(), "Invalid file type");

        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        assert_eq!(Error::Save(io).to_string(), "Error saving file: denied");
    }

    #[test]
    fn test_processing_error_is_server_error() {
        let err = Error::from(ClassifierError::InvalidInput("bad".to_string()));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(err.to_string().starts_with("Error processing image:"));
    }
}
