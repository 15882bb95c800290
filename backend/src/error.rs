use actix_multipart::MultipartError;
use actix_web::http::StatusCode;
use actix_web::http::header::ContentType;
use actix_web::{HttpResponse, ResponseError};
use shared::ErrorResponse;

use crate::classifier::InferenceError;
use crate::preprocess::DecodeError;

/// Failures of a single prediction request. Client mistakes map to 4xx with
/// their exact message; everything else is a 500 with a generic body.
#[derive(Debug, thiserror::Error)]
pub enum PredictError {
    #[error("No file uploaded")]
    NoFileUploaded,
    #[error("No file selected")]
    NoFileSelected,
    #[error("File type is not allowed. Only PNG, JPG, JPEG, and GIF are accepted.")]
    UnsupportedFileType,
    #[error("Error processing image: {0}")]
    Decode(#[from] DecodeError),
    #[error("File too large (limit {limit} bytes)")]
    FileTooLarge { limit: usize },
    #[error("Malformed upload: {0}")]
    Multipart(String),
    #[error("Failed to store upload: {0}")]
    Storage(#[from] std::io::Error),
    #[error("Inference failed: {0}")]
    Inference(#[from] InferenceError),
    #[error("Model predicted class {index} but only {classes} class names are configured")]
    ClassIndexOutOfRange { index: usize, classes: usize },
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<MultipartError> for PredictError {
    fn from(err: MultipartError) -> Self {
        // A body that is not multipart at all simply carries no file.
        if matches!(
            err,
            MultipartError::ContentTypeMissing | MultipartError::ContentTypeIncompatible
        ) {
            PredictError::NoFileUploaded
        } else {
            PredictError::Multipart(err.to_string())
        }
    }
}

impl PredictError {
    pub fn client_message(&self) -> String {
        if self.status_code().is_server_error() {
            "Internal Server Error".to_string()
        } else {
            self.to_string()
        }
    }
}

impl ResponseError for PredictError {
    fn status_code(&self) -> StatusCode {
        match self {
            PredictError::NoFileUploaded
            | PredictError::NoFileSelected
            | PredictError::UnsupportedFileType
            | PredictError::Decode(_)
            | PredictError::Multipart(_) => StatusCode::BAD_REQUEST,
            PredictError::FileTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            PredictError::Storage(_)
            | PredictError::Inference(_)
            | PredictError::ClassIndexOutOfRange { .. }
            | PredictError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .content_type(ContentType::plaintext())
            .body(self.client_message())
    }
}

/// JSON flavour of [`PredictError`] for the API route.
#[derive(Debug, thiserror::Error)]
#[error(transparent)]
pub struct ApiError(#[from] pub PredictError);

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        self.0.status_code()
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorResponse {
            error: self.0.client_message(),
        })
    }
}
