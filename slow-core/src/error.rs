use std::borrow::Cow;

use axum::response::{IntoResponse, Response};

use crate::envelope::Envelope;

/// A typed application error: a stable numeric code and a client-facing message.
///
/// Code `0` is reserved for success and must not be used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub code: i32,
    pub msg: Cow<'static, str>,
}

impl ApiError {
    /// The request parameters failed binding or validation.
    pub const INVALID_INPUT: ApiError = ApiError::new(1, "invalid input");

    pub const fn new(code: i32, msg: &'static str) -> Self {
        ApiError {
            code,
            msg: Cow::Borrowed(msg),
        }
    }

    pub fn with_message(code: i32, msg: impl Into<String>) -> Self {
        ApiError {
            code,
            msg: Cow::Owned(msg.into()),
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.msg)
    }
}

impl std::error::Error for ApiError {}

/// Discriminator for [`AppError`], for callers that branch on the failure family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Storage,
    Cancelled,
    Business,
}

/// Every failure a request handler can produce.
///
/// Only [`AppError::Business`] is exposed to clients verbatim; the other variants
/// carry internal detail that is logged and replaced by the generic
/// `-1` / `"system error"` pair in the response envelope.
pub enum AppError {
    /// Request parameters could not be bound or failed validation.
    Validation(String),
    /// Storage was unreachable or rejected a statement.
    Storage(String),
    /// The request was cancelled or ran past its deadline.
    Cancelled(String),
    Business(ApiError),
}

impl AppError {
    /// Code used for every failure that is not a typed [`ApiError`].
    pub const SYSTEM_CODE: i32 = -1;
    pub const SYSTEM_MSG: &'static str = "system error";

    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::Validation(_) => ErrorKind::Validation,
            AppError::Storage(_) => ErrorKind::Storage,
            AppError::Cancelled(_) => ErrorKind::Cancelled,
            AppError::Business(_) => ErrorKind::Business,
        }
    }

    /// Envelope code for this error.
    pub fn code(&self) -> i32 {
        match self {
            AppError::Business(api) => api.code,
            _ => Self::SYSTEM_CODE,
        }
    }

    /// Client-facing message; never contains internal detail.
    pub fn public_message(&self) -> &str {
        match self {
            AppError::Business(api) => &api.msg,
            _ => Self::SYSTEM_MSG,
        }
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AppError::Validation(msg) => write!(f, "Validation Error: {msg}"),
            AppError::Storage(msg) => write!(f, "Storage Error: {msg}"),
            AppError::Cancelled(msg) => write!(f, "Cancelled: {msg}"),
            AppError::Business(api) => write!(f, "Business Error: {api}"),
        }
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        <Self as std::fmt::Display>::fmt(self, f)
    }
}

impl std::error::Error for AppError {}

impl From<ApiError> for AppError {
    fn from(err: ApiError) -> Self {
        AppError::Business(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match &self {
            AppError::Business(api) => {
                tracing::info!(code = api.code, msg = %api.msg, "request failed with business error")
            }
            AppError::Validation(detail) => tracing::warn!(%detail, "request validation failed"),
            AppError::Cancelled(detail) => tracing::warn!(%detail, "request cancelled"),
            AppError::Storage(detail) => tracing::error!(%detail, "storage failure"),
        }
        Envelope::fail(&self).into_response()
    }
}
