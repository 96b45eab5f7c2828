use std::time::Duration;

use slow_data::ExecContext;
use slow_data_sqlx::{Backend, SqlxRepository};
use sqlx::Pool;

use crate::models::Petrol;

/// Shared, immutable handler state.
pub struct AppState<DB: Backend> {
    pub petrol: SqlxRepository<Petrol, DB>,
    /// Deadline applied to the storage calls of one request.
    pub request_timeout: Duration,
}

impl<DB: Backend> AppState<DB> {
    pub fn new(pool: Pool<DB>, request_timeout: Duration) -> Self {
        AppState {
            petrol: SqlxRepository::new(pool),
            request_timeout,
        }
    }

    /// A fresh per-request execution context.
    pub fn exec_context(&self) -> ExecContext {
        ExecContext::with_timeout(self.request_timeout)
    }
}

impl<DB: Backend> Clone for AppState<DB> {
    fn clone(&self) -> Self {
        AppState {
            petrol: self.petrol.clone(),
            request_timeout: self.request_timeout,
        }
    }
}
