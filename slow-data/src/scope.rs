//! Query scopes: reusable, composable narrowing of a [`QueryBuilder`].
//!
//! A scope receives the in-flight builder and returns it with extra
//! conditions, ordering or paging applied. Scopes are passed per call, in
//! order, and are AND-combined. Paging scopes set limit/offset, which only
//! affect row-returning queries; counts ignore them.
//!
//! Any `Fn(QueryBuilder) -> QueryBuilder` is a scope:
//!
//! ```ignore
//! let by_area = |q: QueryBuilder| q.where_eq("area", "beijing");
//! repo.query_list(&ctx, &[&by_area, &paginate(2, 20)]).await?;
//! ```

use crate::query::QueryBuilder;
use crate::value::Value;

/// Largest page a caller may request.
pub const MAX_PAGE_SIZE: i64 = 100;

/// Page size used when the caller asks for zero or a negative size.
pub const DEFAULT_PAGE_SIZE: i64 = 10;

/// A query-shaping step applied to a [`QueryBuilder`].
pub trait Scope: Send + Sync {
    fn apply(&self, query: QueryBuilder) -> QueryBuilder;
}

impl<F> Scope for F
where
    F: Fn(QueryBuilder) -> QueryBuilder + Send + Sync,
{
    fn apply(&self, query: QueryBuilder) -> QueryBuilder {
        self(query)
    }
}

/// Apply `scopes` to `query` in order.
pub fn apply_scopes(query: QueryBuilder, scopes: &[&dyn Scope]) -> QueryBuilder {
    scopes.iter().fold(query, |q, scope| scope.apply(q))
}

/// Pagination scope built by [`paginate`].
///
/// Holds the already-normalized page number and size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paginate {
    page: i64,
    size: i64,
}

impl Paginate {
    /// Normalize untrusted input, in this order:
    ///
    /// 1. `page <= 0` becomes `1`
    /// 2. `size > 100` becomes `100`
    /// 3. `size <= 0` becomes `10`
    pub fn new(page: i64, size: i64) -> Self {
        let page = if page <= 0 { 1 } else { page };
        let size = if size > MAX_PAGE_SIZE {
            MAX_PAGE_SIZE
        } else if size <= 0 {
            DEFAULT_PAGE_SIZE
        } else {
            size
        };
        Self { page, size }
    }

    pub fn page(&self) -> i64 {
        self.page
    }

    pub fn size(&self) -> i64 {
        self.size
    }

    pub fn limit(&self) -> u64 {
        self.size.unsigned_abs()
    }

    pub fn offset(&self) -> u64 {
        (self.page - 1).saturating_mul(self.size).unsigned_abs()
    }
}

impl Scope for Paginate {
    fn apply(&self, query: QueryBuilder) -> QueryBuilder {
        query.offset(self.offset()).limit(self.limit())
    }
}

/// Build a pagination scope from a 1-based page number and a page size.
///
/// Never fails: out-of-range input is clamped (see [`Paginate::new`]).
pub fn paginate(page: i64, size: i64) -> Paginate {
    Paginate::new(page, size)
}

/// `column = value` filter.
#[derive(Debug, Clone)]
pub struct Equals {
    column: &'static str,
    value: Value,
}

impl Scope for Equals {
    fn apply(&self, query: QueryBuilder) -> QueryBuilder {
        query.where_eq(self.column, self.value.clone())
    }
}

pub fn eq(column: &'static str, value: impl Into<Value>) -> Equals {
    Equals {
        column,
        value: value.into(),
    }
}

/// `column = value` filter that is a no-op when `value` is `None`, `NULL` or
/// an empty string. Numeric zero and `false` still filter.
///
/// Lets a handler pass optional request parameters straight through instead
/// of branching on each one.
#[derive(Debug, Clone)]
pub struct EqIfPresent(Option<Equals>);

impl Scope for EqIfPresent {
    fn apply(&self, query: QueryBuilder) -> QueryBuilder {
        match &self.0 {
            Some(eq) => eq.apply(query),
            None => query,
        }
    }
}

pub fn eq_if_present<V: Into<Value>>(column: &'static str, value: Option<V>) -> EqIfPresent {
    let value = value.map(Into::into).filter(|v: &Value| match v {
        Value::Null => false,
        Value::Text(s) => !s.is_empty(),
        _ => true,
    });
    EqIfPresent(value.map(|value| Equals { column, value }))
}

/// `ORDER BY column` scope.
#[derive(Debug, Clone, Copy)]
pub struct OrderBy {
    column: &'static str,
    ascending: bool,
}

impl Scope for OrderBy {
    fn apply(&self, query: QueryBuilder) -> QueryBuilder {
        query.order_by(self.column, self.ascending)
    }
}

pub fn order_by(column: &'static str, ascending: bool) -> OrderBy {
    OrderBy { column, ascending }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shaped(scope: &dyn Scope) -> QueryBuilder {
        scope.apply(QueryBuilder::new("petrol"))
    }

    #[test]
    fn paginate_clamps_oversized_page_and_zero_page() {
        let q = shaped(&paginate(0, 500));
        assert_eq!(q.offset_value(), Some(0));
        assert_eq!(q.limit_value(), Some(100));
    }

    #[test]
    fn paginate_defaults_zero_size() {
        let q = shaped(&paginate(3, 0));
        assert_eq!(q.offset_value(), Some(20));
        assert_eq!(q.limit_value(), Some(10));
    }

    #[test]
    fn paginate_negative_inputs() {
        for page in [-10, -1, 0] {
            for size in [-5, 0, 1, 50, 100, 101, 10_000] {
                let p = paginate(page, size);
                assert_eq!(p.page(), 1);
                assert_eq!(p.offset(), 0);
                assert!(p.limit() >= 1 && p.limit() <= 100);
            }
        }
        assert_eq!(paginate(2, -3).limit(), 10);
        assert_eq!(paginate(2, -3).offset(), 10);
    }

    #[test]
    fn paginate_in_range() {
        let p = paginate(4, 25);
        assert_eq!((p.page(), p.size()), (4, 25));
        assert_eq!(p.offset(), 75);
        assert_eq!(p.limit(), 25);
    }

    #[test]
    fn paginate_huge_page_saturates() {
        let p = paginate(i64::MAX, 100);
        assert_eq!(p.offset(), i64::MAX.unsigned_abs());
    }

    #[test]
    fn closures_are_scopes() {
        let by_area = |q: QueryBuilder| q.where_eq("area", "beijing");
        let q = apply_scopes(QueryBuilder::new("petrol"), &[&by_area]);
        assert!(q.has_conditions());
    }

    #[test]
    fn scopes_apply_in_order_and_combine() {
        let by_type = eq("type", "92");
        let by_area = eq("area", "shanghai");
        let q = apply_scopes(
            QueryBuilder::new("petrol"),
            &[&by_type, &by_area, &order_by("id", true)],
        );
        let stmt = q.build_select(&["id"]).unwrap();
        assert_eq!(
            stmt.sql,
            "SELECT \"id\" FROM \"petrol\" WHERE \"type\" = ? AND \"area\" = ? ORDER BY \"id\" ASC"
        );
    }

    #[test]
    fn eq_if_present_skips_absent_and_empty() {
        assert!(!shaped(&eq_if_present::<&str>("area", None)).has_conditions());
        assert!(!shaped(&eq_if_present("area", Some(""))).has_conditions());
        assert!(shaped(&eq_if_present("area", Some("beijing"))).has_conditions());
    }

    #[test]
    fn eq_if_present_keeps_zero_and_false() {
        assert!(shaped(&eq_if_present("type", Some(0))).has_conditions());
        assert!(shaped(&eq_if_present("active", Some(false))).has_conditions());
    }
}
