use slow_data::{
    apply_scopes, DataError, ExecContext, QueryBuilder, Record, Repository, Scope, Statement,
    Value,
};
use sqlx::{Database, FromRow, Pool};
use std::marker::PhantomData;

use crate::backend::Backend;
use crate::error::SqlxErrorExt;

/// A generic SQL-based repository implementation.
///
/// Wraps an `sqlx::Pool<DB>` for a given record type. Cloning is cheap and
/// shares the pool.
///
/// # Example
///
/// ```ignore
/// let repo = SqlxRepository::<Petrol, MySql>::new(pool.clone());
/// let rows = repo.query_list(&ctx, &[&eq("type", "92"), &order_by("id", true)]).await?;
/// ```
pub struct SqlxRepository<T, DB: Database> {
    pool: Pool<DB>,
    _marker: PhantomData<T>,
}

impl<T, DB: Database> SqlxRepository<T, DB> {
    pub fn new(pool: Pool<DB>) -> Self {
        Self {
            pool,
            _marker: PhantomData,
        }
    }

    /// Get the underlying pool reference.
    pub fn pool(&self) -> &Pool<DB> {
        &self.pool
    }
}

impl<T: Record, DB: Backend> SqlxRepository<T, DB> {
    fn query(&self) -> QueryBuilder {
        QueryBuilder::new_with_dialect(T::table_name(), DB::DIALECT)
    }

    fn select(&self, scopes: &[&dyn Scope]) -> Result<Statement, DataError> {
        Ok(apply_scopes(self.query(), scopes).build_select(T::columns())?)
    }
}

impl<T, DB: Database> Clone for SqlxRepository<T, DB> {
    fn clone(&self) -> Self {
        Self {
            pool: self.pool.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T, DB> Repository<T> for SqlxRepository<T, DB>
where
    T: Record + for<'r> FromRow<'r, DB::Row>,
    DB: Backend,
{
    async fn create(&self, ctx: &ExecContext, record: T) -> Result<T, DataError> {
        let mut values = record.changes();
        let id: Option<Value> = record.is_persisted().then(|| record.id().into());
        if let Some(id) = &id {
            values.insert(0, (T::id_column(), id.clone()));
        }
        let insert = self.query().build_insert(&values)?;
        let fetch = self
            .query()
            .where_eq(T::id_column(), Value::Null)
            .limit(1)
            .build_select(T::columns())?;

        let stored = ctx
            .run(async {
                DB::insert_and_fetch::<T>(&self.pool, &insert, &fetch.sql, id.as_ref())
                    .await
                    .map_err(SqlxErrorExt::into_data_error)
            })
            .await?;

        match stored {
            Some(stored) => {
                tracing::debug!(table = T::table_name(), "row created");
                Ok(stored)
            }
            None => Err(DataError::NotFound(format!(
                "row just inserted into '{}' could not be read back",
                T::table_name()
            ))),
        }
    }

    async fn update(
        &self,
        ctx: &ExecContext,
        record: &T,
        scopes: &[&dyn Scope],
    ) -> Result<u64, DataError> {
        let mut query = apply_scopes(self.query(), scopes);
        if record.is_persisted() {
            query = query.where_eq(T::id_column(), record.id());
        }
        if !query.has_conditions() {
            tracing::warn!(table = T::table_name(), "refusing update without a where clause");
            return Err(DataError::MissingWhereClause(T::table_name()));
        }

        let assignments = record.changes();
        if assignments.is_empty() {
            return Ok(0);
        }
        let stmt = query.build_update(&assignments, T::touch_column())?;

        let outcome = ctx
            .run(async {
                DB::execute(&self.pool, &stmt)
                    .await
                    .map_err(SqlxErrorExt::into_data_error)
            })
            .await?;
        tracing::debug!(
            table = T::table_name(),
            rows = outcome.rows_affected,
            "rows updated"
        );
        Ok(outcome.rows_affected)
    }

    async fn query_one(
        &self,
        ctx: &ExecContext,
        scopes: &[&dyn Scope],
    ) -> Result<Option<T>, DataError> {
        let stmt = apply_scopes(self.query(), scopes)
            .limit(1)
            .build_select(T::columns())?;
        ctx.run(async {
            DB::fetch_optional::<T>(&self.pool, &stmt)
                .await
                .map_err(SqlxErrorExt::into_data_error)
        })
        .await
    }

    async fn query_list(
        &self,
        ctx: &ExecContext,
        scopes: &[&dyn Scope],
    ) -> Result<Vec<T>, DataError> {
        let stmt = self.select(scopes)?;
        ctx.run(async {
            DB::fetch_all::<T>(&self.pool, &stmt)
                .await
                .map_err(SqlxErrorExt::into_data_error)
        })
        .await
    }

    async fn count(&self, ctx: &ExecContext, scopes: &[&dyn Scope]) -> Result<i64, DataError> {
        let stmt = apply_scopes(self.query(), scopes).build_count()?;
        ctx.run(async {
            DB::fetch_count(&self.pool, &stmt)
                .await
                .map_err(SqlxErrorExt::into_data_error)
        })
        .await
    }
}
