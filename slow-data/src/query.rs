use crate::value::Value;

/// SQL flavour used when rendering identifiers and dialect-specific syntax.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Dialect {
    /// ANSI-style `"` quoting with `?` placeholders.
    #[default]
    Generic,
    /// SQLite: `"` quoting, `?` placeholders, `DEFAULT VALUES` for empty inserts.
    Sqlite,
    /// MySQL: backtick quoting, `?` placeholders, `() VALUES ()` for empty inserts.
    MySql,
}

impl Dialect {
    fn quote_char(self) -> char {
        match self {
            Dialect::MySql => '`',
            Dialect::Generic | Dialect::Sqlite => '"',
        }
    }

    fn empty_insert(self) -> &'static str {
        match self {
            Dialect::MySql => " () VALUES ()",
            Dialect::Generic | Dialect::Sqlite => " DEFAULT VALUES",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IdentifierPolicy {
    /// Validate identifiers against a conservative pattern.
    Validate,
    /// Validate and quote identifiers using the dialect quoting style.
    #[default]
    Quote,
}

/// A rendered statement: SQL text plus its positional bind values.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub sql: String,
    pub params: Vec<Value>,
}

/// A fluent builder for the statements a repository issues against one table.
///
/// Scopes narrow a `QueryBuilder`; the repository then renders it as a
/// SELECT, COUNT or UPDATE. Every identifier is validated before rendering and
/// quoted with the dialect's quoting style, and every value is carried as a
/// bind parameter.
///
/// # Example
///
/// ```ignore
/// let stmt = QueryBuilder::new("petrol")
///     .where_eq("type", "92")
///     .where_like("area", "%jing%")
///     .order_by("id", true)
///     .limit(10)
///     .build_select(&["price", "release_date"])?;
/// ```
#[derive(Debug, Clone)]
pub struct QueryBuilder {
    table: String,
    conditions: Vec<Condition>,
    order: Vec<(String, bool)>,
    limit_val: Option<u64>,
    offset_val: Option<u64>,
    dialect: Dialect,
    identifier_policy: IdentifierPolicy,
}

#[derive(Debug, Clone)]
enum Condition {
    Eq(String, Value),
    Like(String, Value),
    Gte(String, Value),
    In(String, Vec<Value>),
}

impl QueryBuilder {
    pub fn new(table: &str) -> Self {
        Self {
            table: table.to_string(),
            conditions: Vec::new(),
            order: Vec::new(),
            limit_val: None,
            offset_val: None,
            dialect: Dialect::Generic,
            identifier_policy: IdentifierPolicy::Quote,
        }
    }

    /// Create a new builder with an explicit SQL dialect.
    pub fn new_with_dialect(table: &str, dialect: Dialect) -> Self {
        Self::new(table).dialect(dialect)
    }

    /// Set the SQL dialect (affects quoting and empty-insert syntax).
    pub fn dialect(mut self, dialect: Dialect) -> Self {
        self.dialect = dialect;
        self
    }

    /// Configure identifier quoting behavior.
    pub fn identifier_policy(mut self, policy: IdentifierPolicy) -> Self {
        self.identifier_policy = policy;
        self
    }

    pub fn where_eq(mut self, column: &str, value: impl Into<Value>) -> Self {
        self.conditions
            .push(Condition::Eq(column.to_string(), value.into()));
        self
    }

    pub fn where_like(mut self, column: &str, pattern: &str) -> Self {
        self.conditions
            .push(Condition::Like(column.to_string(), Value::from(pattern)));
        self
    }

    pub fn where_gte(mut self, column: &str, value: impl Into<Value>) -> Self {
        self.conditions
            .push(Condition::Gte(column.to_string(), value.into()));
        self
    }

    pub fn where_in<V: Into<Value>>(mut self, column: &str, values: impl IntoIterator<Item = V>) -> Self {
        self.conditions.push(Condition::In(
            column.to_string(),
            values.into_iter().map(Into::into).collect(),
        ));
        self
    }

    pub fn order_by(mut self, column: &str, ascending: bool) -> Self {
        self.order.push((column.to_string(), ascending));
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit_val = Some(limit);
        self
    }

    pub fn offset(mut self, offset: u64) -> Self {
        self.offset_val = Some(offset);
        self
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// Whether any WHERE condition has been added.
    pub fn has_conditions(&self) -> bool {
        !self.conditions.is_empty()
    }

    pub fn limit_value(&self) -> Option<u64> {
        self.limit_val
    }

    pub fn offset_value(&self) -> Option<u64> {
        self.offset_val
    }

    /// Build a SELECT over `columns`, including ORDER BY, LIMIT and OFFSET.
    pub fn build_select(&self, columns: &[&str]) -> Result<Statement, QueryError> {
        let table = self.format_identifier(&self.table, false, "table")?;
        let columns = self.format_column_list(columns)?;

        let mut sql = format!("SELECT {columns} FROM {table}");
        let mut params = Vec::new();
        self.append_where(&mut sql, &mut params)?;
        self.append_order(&mut sql)?;
        self.append_limit_offset(&mut sql);
        Ok(Statement { sql, params })
    }

    /// Build a COUNT over the same predicate as [`build_select`](Self::build_select).
    ///
    /// Ordering, limit and offset are deliberately left out: a count reports the
    /// size of the filtered set, not of the current page.
    pub fn build_count(&self) -> Result<Statement, QueryError> {
        let table = self.format_identifier(&self.table, false, "table")?;
        let mut sql = format!("SELECT COUNT(*) FROM {table}");
        let mut params = Vec::new();
        self.append_where(&mut sql, &mut params)?;
        Ok(Statement { sql, params })
    }

    /// Build an INSERT of the given `(column, value)` pairs. Conditions are ignored.
    pub fn build_insert(&self, values: &[(&str, Value)]) -> Result<Statement, QueryError> {
        let table = self.format_identifier(&self.table, false, "table")?;
        let mut sql = format!("INSERT INTO {table}");
        if values.is_empty() {
            sql.push_str(self.dialect.empty_insert());
            return Ok(Statement { sql, params: Vec::new() });
        }
        let mut columns = Vec::with_capacity(values.len());
        for (col, _) in values {
            columns.push(self.format_identifier(col, false, "column")?);
        }
        let placeholders = vec!["?"; values.len()].join(", ");
        sql.push_str(&format!(" ({}) VALUES ({placeholders})", columns.join(", ")));
        let params = values.iter().map(|(_, v)| v.clone()).collect();
        Ok(Statement { sql, params })
    }

    /// Build an UPDATE setting `assignments`, narrowed by the builder's conditions.
    ///
    /// `touch` names a timestamp column refreshed with `CURRENT_TIMESTAMP`
    /// alongside the assignments; it never makes an empty update valid.
    /// Ordering, limit and offset are ignored.
    pub fn build_update(
        &self,
        assignments: &[(&str, Value)],
        touch: Option<&str>,
    ) -> Result<Statement, QueryError> {
        if assignments.is_empty() {
            return Err(QueryError::EmptyUpdate);
        }
        let table = self.format_identifier(&self.table, false, "table")?;
        let mut sets = Vec::with_capacity(assignments.len() + 1);
        let mut params = Vec::with_capacity(assignments.len());
        for (col, value) in assignments {
            let col = self.format_identifier(col, false, "column")?;
            sets.push(format!("{col} = ?"));
            params.push(value.clone());
        }
        if let Some(col) = touch {
            let col = self.format_identifier(col, false, "column")?;
            sets.push(format!("{col} = CURRENT_TIMESTAMP"));
        }
        let mut sql = format!("UPDATE {table} SET {}", sets.join(", "));
        self.append_where(&mut sql, &mut params)?;
        Ok(Statement { sql, params })
    }

    fn append_where(&self, sql: &mut String, params: &mut Vec<Value>) -> Result<(), QueryError> {
        if self.conditions.is_empty() {
            return Ok(());
        }
        sql.push_str(" WHERE ");
        let mut first = true;
        for cond in &self.conditions {
            if !first {
                sql.push_str(" AND ");
            }
            first = false;
            match cond {
                Condition::Eq(col, val) => self.push_binary(sql, params, col, "=", val)?,
                Condition::Like(col, pat) => self.push_binary(sql, params, col, "LIKE", pat)?,
                Condition::Gte(col, val) => self.push_binary(sql, params, col, ">=", val)?,
                Condition::In(col, vals) => {
                    let col = self.format_identifier(col, false, "column")?;
                    if vals.is_empty() {
                        // `IN ()` is not valid SQL; an empty set matches nothing.
                        sql.push_str("1 = 0");
                    } else {
                        let placeholders = vec!["?"; vals.len()].join(", ");
                        sql.push_str(&format!("{col} IN ({placeholders})"));
                        params.extend(vals.iter().cloned());
                    }
                }
            }
        }
        Ok(())
    }

    fn push_binary(
        &self,
        sql: &mut String,
        params: &mut Vec<Value>,
        col: &str,
        op: &str,
        val: &Value,
    ) -> Result<(), QueryError> {
        let col = self.format_identifier(col, false, "column")?;
        sql.push_str(&format!("{col} {op} ?"));
        params.push(val.clone());
        Ok(())
    }

    fn append_order(&self, sql: &mut String) -> Result<(), QueryError> {
        if self.order.is_empty() {
            return Ok(());
        }
        sql.push_str(" ORDER BY ");
        let mut clauses = Vec::with_capacity(self.order.len());
        for (col, asc) in &self.order {
            let col = self.format_identifier(col, false, "column")?;
            if *asc {
                clauses.push(format!("{col} ASC"));
            } else {
                clauses.push(format!("{col} DESC"));
            }
        }
        sql.push_str(&clauses.join(", "));
        Ok(())
    }

    fn append_limit_offset(&self, sql: &mut String) {
        match (self.limit_val, self.offset_val) {
            (Some(limit), Some(offset)) => sql.push_str(&format!(" LIMIT {limit} OFFSET {offset}")),
            (Some(limit), None) => sql.push_str(&format!(" LIMIT {limit}")),
            // Both SQLite and MySQL require a LIMIT before OFFSET.
            (None, Some(offset)) => sql.push_str(&format!(" LIMIT {} OFFSET {offset}", i64::MAX)),
            (None, None) => {}
        }
    }

    fn format_column_list(&self, columns: &[&str]) -> Result<String, QueryError> {
        let mut out = Vec::with_capacity(columns.len());
        for col in columns {
            out.push(self.format_identifier(col, true, "column")?);
        }
        Ok(out.join(", "))
    }

    fn format_identifier(
        &self,
        ident: &str,
        allow_star: bool,
        kind: &'static str,
    ) -> Result<String, QueryError> {
        if !is_valid_identifier(ident, allow_star) {
            return Err(QueryError::InvalidIdentifier {
                kind,
                ident: ident.to_string(),
            });
        }
        match self.identifier_policy {
            IdentifierPolicy::Quote => Ok(quote_identifier(ident, self.dialect, allow_star)),
            IdentifierPolicy::Validate => Ok(ident.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    InvalidIdentifier { kind: &'static str, ident: String },
    EmptyUpdate,
}

impl std::fmt::Display for QueryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QueryError::InvalidIdentifier { kind, ident } => {
                write!(f, "Invalid {kind} identifier: {ident}")
            }
            QueryError::EmptyUpdate => write!(f, "Update has no columns to set"),
        }
    }
}

impl std::error::Error for QueryError {}

fn is_valid_identifier(ident: &str, allow_star: bool) -> bool {
    if ident.is_empty() {
        return false;
    }
    let parts: Vec<&str> = ident.split('.').collect();
    for (idx, part) in parts.iter().enumerate() {
        if allow_star && *part == "*" {
            return idx + 1 == parts.len();
        }
        if !is_valid_segment(part) {
            return false;
        }
    }
    true
}

fn is_valid_segment(segment: &str) -> bool {
    let mut chars = segment.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn quote_identifier(ident: &str, dialect: Dialect, allow_star: bool) -> String {
    let quote = dialect.quote_char();
    let parts: Vec<&str> = ident.split('.').collect();
    let last_idx = parts.len().saturating_sub(1);
    parts
        .into_iter()
        .enumerate()
        .map(|(idx, part)| {
            if allow_star && part == "*" && idx == last_idx {
                part.to_string()
            } else {
                format!("{quote}{part}{quote}")
            }
        })
        .collect::<Vec<_>>()
        .join(".")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_select() {
        let stmt = QueryBuilder::new("petrol").build_select(&["*"]).unwrap();
        assert_eq!(stmt.sql, "SELECT * FROM \"petrol\"");
        assert!(stmt.params.is_empty());
    }

    #[test]
    fn test_where_eq() {
        let stmt = QueryBuilder::new("petrol")
            .where_eq("type", "92")
            .build_select(&["id"])
            .unwrap();
        assert_eq!(stmt.sql, "SELECT \"id\" FROM \"petrol\" WHERE \"type\" = ?");
        assert_eq!(stmt.params, vec![Value::from("92")]);
    }

    #[test]
    fn test_complex_query() {
        let stmt = QueryBuilder::new("petrol")
            .identifier_policy(IdentifierPolicy::Validate)
            .where_eq("type", "95")
            .where_like("area", "%bei%")
            .where_gte("id", 3)
            .order_by("id", true)
            .limit(10)
            .offset(20)
            .build_select(&["id", "price"])
            .unwrap();
        assert_eq!(
            stmt.sql,
            "SELECT id, price FROM petrol WHERE type = ? AND area LIKE ? AND id >= ? ORDER BY id ASC LIMIT 10 OFFSET 20"
        );
        assert_eq!(
            stmt.params,
            vec![Value::from("95"), Value::from("%bei%"), Value::Int(3)]
        );
    }

    #[test]
    fn test_count_ignores_order_and_paging() {
        let stmt = QueryBuilder::new("petrol")
            .identifier_policy(IdentifierPolicy::Validate)
            .where_eq("area", "beijing")
            .order_by("id", false)
            .limit(10)
            .offset(40)
            .build_count()
            .unwrap();
        assert_eq!(stmt.sql, "SELECT COUNT(*) FROM petrol WHERE area = ?");
        assert_eq!(stmt.params, vec![Value::from("beijing")]);
    }

    #[test]
    fn test_mysql_quoting_and_in() {
        let stmt = QueryBuilder::new_with_dialect("petrol", Dialect::MySql)
            .where_in("type", ["92", "95"])
            .build_select(&["price"])
            .unwrap();
        assert_eq!(
            stmt.sql,
            "SELECT `price` FROM `petrol` WHERE `type` IN (?, ?)"
        );
        assert_eq!(stmt.params, vec![Value::from("92"), Value::from("95")]);
    }

    #[test]
    fn test_empty_in_matches_nothing() {
        let stmt = QueryBuilder::new("petrol")
            .where_in("type", Vec::<String>::new())
            .build_count()
            .unwrap();
        assert_eq!(stmt.sql, "SELECT COUNT(*) FROM \"petrol\" WHERE 1 = 0");
        assert!(stmt.params.is_empty());
    }

    #[test]
    fn test_offset_without_limit() {
        let stmt = QueryBuilder::new("petrol")
            .identifier_policy(IdentifierPolicy::Validate)
            .offset(5)
            .build_select(&["id"])
            .unwrap();
        assert_eq!(
            stmt.sql,
            format!("SELECT id FROM petrol LIMIT {} OFFSET 5", i64::MAX)
        );
    }

    #[test]
    fn test_insert() {
        let stmt = QueryBuilder::new_with_dialect("petrol", Dialect::Sqlite)
            .build_insert(&[("type", Value::from("92")), ("price", Value::from("7.12"))])
            .unwrap();
        assert_eq!(
            stmt.sql,
            "INSERT INTO \"petrol\" (\"type\", \"price\") VALUES (?, ?)"
        );
        assert_eq!(stmt.params.len(), 2);
    }

    #[test]
    fn test_empty_insert_per_dialect() {
        let sqlite = QueryBuilder::new_with_dialect("petrol", Dialect::Sqlite)
            .build_insert(&[])
            .unwrap();
        assert_eq!(sqlite.sql, "INSERT INTO \"petrol\" DEFAULT VALUES");
        let mysql = QueryBuilder::new_with_dialect("petrol", Dialect::MySql)
            .build_insert(&[])
            .unwrap();
        assert_eq!(mysql.sql, "INSERT INTO `petrol` () VALUES ()");
    }

    #[test]
    fn test_update_with_touch() {
        let stmt = QueryBuilder::new("petrol")
            .identifier_policy(IdentifierPolicy::Validate)
            .where_eq("id", 7)
            .limit(1)
            .build_update(&[("price", Value::from("8.01"))], Some("updated_at"))
            .unwrap();
        assert_eq!(
            stmt.sql,
            "UPDATE petrol SET price = ?, updated_at = CURRENT_TIMESTAMP WHERE id = ?"
        );
        assert_eq!(stmt.params, vec![Value::from("8.01"), Value::Int(7)]);
    }

    #[test]
    fn test_update_requires_assignments() {
        let err = QueryBuilder::new("petrol").build_update(&[], None).unwrap_err();
        assert_eq!(err, QueryError::EmptyUpdate);
        let err = QueryBuilder::new("petrol")
            .where_eq("id", 7)
            .build_update(&[], Some("updated_at"))
            .unwrap_err();
        assert_eq!(err, QueryError::EmptyUpdate);
    }

    #[test]
    fn test_invalid_identifier() {
        let err = QueryBuilder::new("petrol;drop")
            .build_select(&["*"])
            .unwrap_err();
        assert!(matches!(err, QueryError::InvalidIdentifier { .. }));

        let err = QueryBuilder::new("petrol")
            .where_eq("area = 1 OR 1", "x")
            .build_count()
            .unwrap_err();
        assert!(matches!(err, QueryError::InvalidIdentifier { kind: "column", .. }));
    }
}
