use crate::context::ExecContext;
use crate::entity::Record;
use crate::error::DataError;
use crate::scope::Scope;
use std::future::Future;

/// Generic async data-access contract for one [`Record`] type.
///
/// Every operation takes the caller's [`ExecContext`] and a list of scopes
/// applied in order. Implementations do not retry; failures are returned as-is.
///
/// Uses RPITIT (return-position `impl Trait` in traits), so no `async-trait`.
pub trait Repository<T: Record>: Send + Sync {
    /// Insert `record` and return it as stored, with identifier and timestamps filled in.
    fn create(&self, ctx: &ExecContext, record: T) -> impl Future<Output = Result<T, DataError>> + Send;

    /// Write the non-zero fields of `record` to every row matched by `scopes`
    /// and, when the record is persisted, by its primary key.
    ///
    /// Returns the number of affected rows; zero matches is not an error.
    /// Fails with [`DataError::MissingWhereClause`] when nothing narrows the update.
    fn update(
        &self,
        ctx: &ExecContext,
        record: &T,
        scopes: &[&dyn Scope],
    ) -> impl Future<Output = Result<u64, DataError>> + Send;

    /// First row matched by `scopes`, or `None`.
    fn query_one(
        &self,
        ctx: &ExecContext,
        scopes: &[&dyn Scope],
    ) -> impl Future<Output = Result<Option<T>, DataError>> + Send;

    /// Every row matched by `scopes`; empty when nothing matches.
    fn query_list(
        &self,
        ctx: &ExecContext,
        scopes: &[&dyn Scope],
    ) -> impl Future<Output = Result<Vec<T>, DataError>> + Send;

    /// Number of rows matched by the filters in `scopes`.
    ///
    /// Limit, offset and ordering set by scopes (e.g. [`paginate`](crate::paginate))
    /// are ignored.
    fn count(
        &self,
        ctx: &ExecContext,
        scopes: &[&dyn Scope],
    ) -> impl Future<Output = Result<i64, DataError>> + Send;

    /// Like [`query_one`](Self::query_one) but yields `T::default()` when nothing matches.
    ///
    /// Callers must check the identifier (`!record.is_persisted()`) to detect
    /// "not found". Prefer `query_one` in new code.
    fn query_one_or_default(
        &self,
        ctx: &ExecContext,
        scopes: &[&dyn Scope],
    ) -> impl Future<Output = Result<T, DataError>> + Send
    where
        T: Default,
    {
        async move { Ok(self.query_one(ctx, scopes).await?.unwrap_or_default()) }
    }
}
