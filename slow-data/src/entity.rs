use crate::value::Value;

/// A flat record mapped to one storage table.
///
/// The identifier is assigned by storage on insert; a record whose
/// [`id`](Record::id) equals `Id::default()` has not been persisted yet.
/// `created_at` / `updated_at` style columns are maintained by storage and
/// must not appear in [`changes`](Record::changes).
///
/// # Example
///
/// ```ignore
/// impl Record for Petrol {
///     type Id = i32;
///     fn table_name() -> &'static str { "petrol" }
///     fn columns() -> &'static [&'static str] {
///         &["id", "type", "area", "release_date", "price", "created_at", "updated_at"]
///     }
///     fn touch_column() -> Option<&'static str> { Some("updated_at") }
///     fn id(&self) -> i32 { self.id }
///     fn changes(&self) -> Vec<(&'static str, Value)> {
///         Changes::new().set("type", &self.kind).set("price", &self.price).into_vec()
///     }
/// }
/// ```
pub trait Record: Send + Sync + Unpin + 'static {
    type Id: Copy + Default + PartialEq + Into<Value> + Send + Sync + 'static;

    fn table_name() -> &'static str;

    fn id_column() -> &'static str {
        "id"
    }

    /// Every column read back into the record, in `SELECT` order.
    fn columns() -> &'static [&'static str];

    /// Column refreshed with `CURRENT_TIMESTAMP` whenever an update writes
    /// at least one field. Tables without such a column keep the default.
    fn touch_column() -> Option<&'static str> {
        None
    }

    fn id(&self) -> Self::Id;

    /// Writable, non-zero fields of this record as `(column, value)` pairs.
    fn changes(&self) -> Vec<(&'static str, Value)>;

    fn is_persisted(&self) -> bool {
        self.id() != Self::Id::default()
    }
}
