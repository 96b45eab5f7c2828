//! # slow-data-sqlx: SQLx backend for the slow data layer
//!
//! Implements [`slow_data::Repository`] on top of an `sqlx::Pool`.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`SqlxRepository`] | Generic repository holding an `sqlx::Pool<DB>` |
//! | [`Backend`] | Driver glue: dialect, statement execution, connect options |
//! | [`connect`] | Pool construction from a [`DatabaseConfig`](slow_core::DatabaseConfig) |
//! | [`SqlxErrorExt`] | `sqlx::Error` → `DataError` (`.into_data_error()`) |
//!
//! # Feature flags
//!
//! | Feature  | Driver |
//! |----------|--------|
//! | `sqlite` | SQLite via `sqlx/sqlite` (default) |
//! | `mysql`  | MySQL via `sqlx/mysql` (default) |
//!
//! ```ignore
//! let db: DatabaseConfig = config.section()?;
//! let pool = slow_data_sqlx::connect::<MySql>(&db).await?;
//! let repo = SqlxRepository::<Petrol, MySql>::new(pool);
//! ```

pub mod backend;
pub mod error;
pub mod pool;
pub mod repository;

pub use backend::{Backend, ExecOutcome};
pub use error::SqlxErrorExt;
pub use pool::{connect, pool_options};
pub use repository::SqlxRepository;

/// Re-exports of the most commonly used types from both `slow-data` and this crate.
pub mod prelude {
    pub use crate::{Backend, SqlxErrorExt, SqlxRepository};
    pub use slow_data::prelude::*;
}
