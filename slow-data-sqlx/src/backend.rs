use futures_util::future::BoxFuture;
use slow_core::DatabaseConfig;
use slow_data::{Dialect, Statement, Value};
use sqlx::{Database, FromRow, Pool};

/// Result of a write statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecOutcome {
    pub rows_affected: u64,
    /// Identifier generated by the last insert on the connection, if any.
    pub last_insert_id: Option<i64>,
}

/// A concrete sqlx driver the repository can run [`Statement`]s against.
///
/// Methods acquire their own pooled connection, so waiting for a free
/// connection is part of the returned future.
pub trait Backend: Database {
    const DIALECT: Dialect;

    /// Connection options for `config`; `config.url` wins over the discrete fields.
    fn connect_options(
        config: &DatabaseConfig,
    ) -> Result<<Self::Connection as sqlx::Connection>::Options, sqlx::Error>;

    fn fetch_all<'c, T>(
        pool: &'c Pool<Self>,
        stmt: &'c Statement,
    ) -> BoxFuture<'c, Result<Vec<T>, sqlx::Error>>
    where
        T: for<'r> FromRow<'r, Self::Row> + Send + Unpin + 'c;

    fn fetch_optional<'c, T>(
        pool: &'c Pool<Self>,
        stmt: &'c Statement,
    ) -> BoxFuture<'c, Result<Option<T>, sqlx::Error>>
    where
        T: for<'r> FromRow<'r, Self::Row> + Send + Unpin + 'c;

    /// Run a `SELECT COUNT(*)` statement.
    fn fetch_count<'c>(
        pool: &'c Pool<Self>,
        stmt: &'c Statement,
    ) -> BoxFuture<'c, Result<i64, sqlx::Error>>;

    fn execute<'c>(
        pool: &'c Pool<Self>,
        stmt: &'c Statement,
    ) -> BoxFuture<'c, Result<ExecOutcome, sqlx::Error>>;

    /// Run `insert`, then `fetch_sql` on the same connection.
    ///
    /// `fetch_sql` has exactly one placeholder, bound to `id` when given and
    /// to the generated identifier otherwise.
    fn insert_and_fetch<'c, T>(
        pool: &'c Pool<Self>,
        insert: &'c Statement,
        fetch_sql: &'c str,
        id: Option<&'c Value>,
    ) -> BoxFuture<'c, Result<Option<T>, sqlx::Error>>
    where
        T: for<'r> FromRow<'r, Self::Row> + Send + Unpin + 'c;
}

/// Bind every [`Value`] of a statement onto an sqlx query, in order.
macro_rules! bind_params {
    ($query:expr, $params:expr) => {{
        let mut query = $query;
        for param in $params {
            query = match param {
                Value::Null => query.bind(None::<&str>),
                Value::Bool(b) => query.bind(*b),
                Value::Int(i) => query.bind(*i),
                Value::Float(f) => query.bind(*f),
                Value::Text(s) => query.bind(s.as_str()),
            };
        }
        query
    }};
}

macro_rules! impl_backend {
    ($db:ty, $dialect:expr, $last_id:expr, $options:path) => {
        impl Backend for $db {
            const DIALECT: Dialect = $dialect;

            fn connect_options(config: &DatabaseConfig) -> Result<$options, sqlx::Error> {
                connect_options_for(config)
            }

            fn fetch_all<'c, T>(
                pool: &'c Pool<Self>,
                stmt: &'c Statement,
            ) -> BoxFuture<'c, Result<Vec<T>, sqlx::Error>>
            where
                T: for<'r> FromRow<'r, Self::Row> + Send + Unpin + 'c,
            {
                Box::pin(async move {
                    let query = bind_params!(sqlx::query_as::<$db, T>(&stmt.sql), &stmt.params);
                    query.fetch_all(pool).await
                })
            }

            fn fetch_optional<'c, T>(
                pool: &'c Pool<Self>,
                stmt: &'c Statement,
            ) -> BoxFuture<'c, Result<Option<T>, sqlx::Error>>
            where
                T: for<'r> FromRow<'r, Self::Row> + Send + Unpin + 'c,
            {
                Box::pin(async move {
                    let query = bind_params!(sqlx::query_as::<$db, T>(&stmt.sql), &stmt.params);
                    query.fetch_optional(pool).await
                })
            }

            fn fetch_count<'c>(
                pool: &'c Pool<Self>,
                stmt: &'c Statement,
            ) -> BoxFuture<'c, Result<i64, sqlx::Error>> {
                Box::pin(async move {
                    let query =
                        bind_params!(sqlx::query_scalar::<$db, i64>(&stmt.sql), &stmt.params);
                    query.fetch_one(pool).await
                })
            }

            fn execute<'c>(
                pool: &'c Pool<Self>,
                stmt: &'c Statement,
            ) -> BoxFuture<'c, Result<ExecOutcome, sqlx::Error>> {
                Box::pin(async move {
                    let query = bind_params!(sqlx::query::<$db>(&stmt.sql), &stmt.params);
                    let result = query.execute(pool).await?;
                    Ok(ExecOutcome {
                        rows_affected: result.rows_affected(),
                        last_insert_id: ($last_id)(&result),
                    })
                })
            }

            fn insert_and_fetch<'c, T>(
                pool: &'c Pool<Self>,
                insert: &'c Statement,
                fetch_sql: &'c str,
                id: Option<&'c Value>,
            ) -> BoxFuture<'c, Result<Option<T>, sqlx::Error>>
            where
                T: for<'r> FromRow<'r, Self::Row> + Send + Unpin + 'c,
            {
                Box::pin(async move {
                    let mut conn = pool.acquire().await?;
                    let query = bind_params!(sqlx::query::<$db>(&insert.sql), &insert.params);
                    let result = query.execute(&mut *conn).await?;
                    let key = match id {
                        Some(id) => id.clone(),
                        None => match ($last_id)(&result) {
                            Some(generated) => Value::Int(generated),
                            None => return Ok(None),
                        },
                    };
                    let fetch = bind_params!(sqlx::query_as::<$db, T>(fetch_sql), [&key]);
                    fetch.fetch_optional(&mut *conn).await
                })
            }
        }
    };
}

#[cfg(feature = "sqlite")]
mod sqlite {
    use super::*;
    use sqlx::sqlite::{SqliteConnectOptions, SqliteQueryResult};
    use sqlx::Sqlite;
    use std::str::FromStr;

    fn connect_options_for(config: &DatabaseConfig) -> Result<SqliteConnectOptions, sqlx::Error> {
        let url = match &config.url {
            Some(url) => url.clone(),
            None => format!("sqlite://{}", config.name),
        };
        Ok(SqliteConnectOptions::from_str(&url)?.create_if_missing(true))
    }

    impl_backend!(
        Sqlite,
        Dialect::Sqlite,
        |r: &SqliteQueryResult| Some(r.last_insert_rowid()).filter(|id| *id != 0),
        SqliteConnectOptions
    );
}

#[cfg(feature = "mysql")]
mod mysql {
    use super::*;
    use sqlx::mysql::{MySqlConnectOptions, MySqlQueryResult};
    use sqlx::MySql;
    use std::str::FromStr;

    fn connect_options_for(config: &DatabaseConfig) -> Result<MySqlConnectOptions, sqlx::Error> {
        let options = match &config.url {
            Some(url) => MySqlConnectOptions::from_str(url)?,
            None => MySqlConnectOptions::new()
                .host(&config.host)
                .port(config.port)
                .username(&config.user)
                .password(&config.password)
                .database(&config.name),
        };
        Ok(options.charset("utf8mb4"))
    }

    impl_backend!(
        MySql,
        Dialect::MySql,
        |r: &MySqlQueryResult| i64::try_from(r.last_insert_id()).ok().filter(|id| *id != 0),
        MySqlConnectOptions
    );
}
