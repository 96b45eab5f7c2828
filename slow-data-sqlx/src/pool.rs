use log::LevelFilter;
use slow_core::DatabaseConfig;
use slow_data::DataError;
use sqlx::pool::PoolOptions;
use sqlx::{ConnectOptions, Pool};

use crate::backend::Backend;
use crate::error::SqlxErrorExt;

/// Build a connection pool from `config` and open one connection to prove
/// storage is reachable.
///
/// Statements are logged at debug level; statements slower than
/// `config.slow_threshold` at warn.
pub async fn connect<DB: Backend>(config: &DatabaseConfig) -> Result<Pool<DB>, DataError> {
    let options = DB::connect_options(config)
        .map_err(SqlxErrorExt::into_data_error)?
        .log_statements(LevelFilter::Debug)
        .log_slow_statements(LevelFilter::Warn, config.slow_threshold);

    let pool = pool_options::<DB>(config)
        .connect_with(options)
        .await
        .map_err(SqlxErrorExt::into_data_error)?;

    tracing::info!(
        host = %config.host,
        database = %config.name,
        max_connections = config.max_connections,
        "storage pool ready"
    );
    Ok(pool)
}

/// Pool sizing and health-check settings from `config`.
pub fn pool_options<DB: Backend>(config: &DatabaseConfig) -> PoolOptions<DB> {
    PoolOptions::<DB>::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(config.acquire_timeout)
        .idle_timeout(Some(config.idle_timeout))
        .test_before_acquire(true)
}
