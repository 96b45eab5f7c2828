//! Query-string binding with `garde` validation.
//!
//! Both binding and validation failures become an opaque [`AppError::Validation`],
//! which clients see as the generic failure envelope.

use axum::extract::{FromRequestParts, Query};
use axum::http::request::Parts;
use axum::http::Uri;
use serde::de::DeserializeOwned;

use crate::error::AppError;

pub use garde::Validate;

/// Deserialize `query` into `T` and validate it.
pub fn bind_and_validate<T>(query: &str) -> Result<T, AppError>
where
    T: DeserializeOwned + Validate,
    T::Context: Default,
{
    let value: T = parse_query(query)?;
    value
        .validate()
        .map_err(|report| AppError::Validation(describe_report(&report)))?;
    Ok(value)
}

fn parse_query<T: DeserializeOwned>(query: &str) -> Result<T, AppError> {
    let uri: Uri = format!("/?{query}")
        .parse()
        .map_err(|e| AppError::Validation(format!("malformed query string: {e}")))?;
    let Query(value) =
        Query::<T>::try_from_uri(&uri).map_err(|rejection| AppError::Validation(rejection.body_text()))?;
    Ok(value)
}

fn describe_report(report: &garde::Report) -> String {
    report
        .iter()
        .map(|(path, error)| {
            let field = path.to_string();
            let field = if field.is_empty() { "value" } else { field.as_str() };
            format!("{field}: {}", error.message())
        })
        .collect::<Vec<_>>()
        .join("; ")
}

/// Extractor: bind the request query string into `T` and validate it.
///
/// ```ignore
/// async fn price(ValidQuery(params): ValidQuery<PriceQuery>) -> ApiResult<PriceList> { .. }
/// ```
#[derive(Debug, Clone)]
pub struct ValidQuery<T>(pub T);

impl<T, S> FromRequestParts<S> for ValidQuery<T>
where
    T: DeserializeOwned + Validate + Send,
    T::Context: Default,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let query = parts.uri.query().unwrap_or_default();
        bind_and_validate(query).map(ValidQuery)
    }
}
