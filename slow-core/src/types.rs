//! Convenience type aliases for handler return types.
//!
//! ```ignore
//! async fn price(State(state): State<AppState>) -> ApiResult<PriceList> {
//!     Ok(Envelope::success(list))
//! }
//! ```

use crate::envelope::Envelope;
use crate::error::AppError;

/// Handler result: a success envelope or an [`AppError`] rendered as a failure envelope.
pub type ApiResult<T> = Result<Envelope<T>, AppError>;
