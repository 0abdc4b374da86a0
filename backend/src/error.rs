use crate::detection::DetectError;
use crate::storage::StorageError;
use actix_multipart::MultipartError;
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde::Serialize;
use shared::ParamError;

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("Upload exceeds the limit of {0} bytes")]
    PayloadTooLarge(usize),
    #[error("Unable to process the uploaded file as an image.")]
    UndecodableImage,
    #[error("An error occurred during analysis: {0}")]
    Analysis(String),
}

impl ApiError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        ApiError::BadRequest(msg.into())
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::UndecodableImage => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Analysis(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorResponse {
            error: self.to_string(),
        })
    }
}

impl From<DetectError> for ApiError {
    fn from(err: DetectError) -> Self {
        match err {
            DetectError::Decode(_) => ApiError::UndecodableImage,
            DetectError::Storage(StorageError::FileTooLarge { limit, .. }) => {
                ApiError::PayloadTooLarge(limit)
            }
            other => ApiError::Analysis(other.to_string()),
        }
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        ApiError::BadRequest(format!("Malformed upload: {}", err))
    }
}

impl From<ParamError> for ApiError {
    fn from(err: ParamError) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::BackendError;

    #[test]
    fn analysis_failures_carry_raw_error_text() {
        let err: ApiError = DetectError::Backend(BackendError::Status {
            status: 500,
            body: "model crashed".to_string(),
        })
        .into();
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            err.to_string(),
            "An error occurred during analysis: Detector returned 500: model crashed"
        );
    }

    #[test]
    fn decode_failures_are_unprocessable() {
        let decode = image::load_from_memory(b"nope").unwrap_err();
        let err: ApiError = DetectError::Decode(decode).into();
        assert_eq!(err.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(err.to_string(), "Unable to process the uploaded file as an image.");
    }

    #[test]
    fn param_errors_are_bad_requests() {
        let err: ApiError = ParamError::Threshold(3.0).into();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }
}
