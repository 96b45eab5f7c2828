pub mod context;
pub mod entity;
pub mod error;
pub mod query;
pub mod repository;
pub mod scope;
pub mod value;

pub use context::ExecContext;
pub use entity::Record;
pub use error::DataError;
pub use query::{Dialect, IdentifierPolicy, QueryBuilder, QueryError, Statement};
pub use repository::Repository;
pub use scope::{apply_scopes, eq, eq_if_present, order_by, paginate, Paginate, Scope};
pub use value::{Changes, Value};

pub mod prelude {
    //! Re-exports of the most commonly used data types.
    pub use crate::{
        eq, eq_if_present, order_by, paginate, Changes, DataError, ExecContext, QueryBuilder,
        Record, Repository, Scope, Value,
    };
}
