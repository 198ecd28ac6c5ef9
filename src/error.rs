// src/error.rs
use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde::Serialize;
use thiserror::Error;

#[derive(Serialize)]
struct ErrorBody {
    error: &'static str,
    detail: String,
    timestamp: String,
}

#[derive(Debug, Error)]
pub enum ApiError {
    /// Post failed validation; carries the individual messages.
    #[error("Invalid post: {}", .0.join("; "))]
    InvalidPost(Vec<String>),
    /// Body missing, not JSON, or not the expected shape.
    #[error("{0}")]
    BadRequest(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidPost(_) | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            ApiError::InvalidPost(_) => "validation_error",
            ApiError::BadRequest(_) => "bad_request",
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorBody {
            error: self.code(),
            detail: self.to_string(),
            timestamp: Utc::now().to_rfc3339(),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_post_joins_messages() {
        let e = ApiError::InvalidPost(vec!["a".into(), "b".into()]);
        assert_eq!(e.to_string(), "Invalid post: a; b");
        assert_eq!(e.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn bad_request_keeps_detail() {
        let e = ApiError::BadRequest("missing field `text`".into());
        assert_eq!(e.to_string(), "missing field `text`");
        let resp = e.into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
}
