//! Uniform JSON response shape.
//!
//! Success: `{"code": 0, "msg": "", "data": ...}`.
//! Failure: `{"code": <non-zero>, "msg": "...", "data": {}}`.
//! Both are sent with HTTP 200.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::error::AppError;

/// Serializes as an empty JSON object, `{}`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Empty {}

#[derive(Debug, Clone, Serialize)]
pub struct Envelope<T> {
    pub code: i32,
    pub msg: String,
    pub data: T,
}

impl<T: Serialize> Envelope<T> {
    pub fn success(data: T) -> Self {
        Envelope {
            code: 0,
            msg: String::new(),
            data,
        }
    }
}

impl Envelope<Empty> {
    /// Failure envelope; only typed business errors surface their own code and message.
    pub fn fail(err: &AppError) -> Self {
        Envelope {
            code: err.code(),
            msg: err.public_message().to_string(),
            data: Empty {},
        }
    }

    /// Generic `-1` / `"system error"` envelope.
    pub fn system_error() -> Self {
        Envelope {
            code: AppError::SYSTEM_CODE,
            msg: AppError::SYSTEM_MSG.to_string(),
            data: Empty {},
        }
    }
}

impl<T: Serialize> IntoResponse for Envelope<T> {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}
