/// A bind parameter carried by a [`QueryBuilder`](crate::QueryBuilder).
///
/// Backends translate each variant into a native bind call, so the builder
/// itself stays independent of any database driver.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl Value {
    /// Whether this is the zero value of its type (`NULL`, `false`, `0`, `0.0`, `""`).
    ///
    /// Zero values are skipped when building a change set, so an update only
    /// touches the fields a caller actually set.
    pub fn is_zero(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Bool(b) => !b,
            Value::Int(i) => *i == 0,
            Value::Float(f) => *f == 0.0,
            Value::Text(s) => s.is_empty(),
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Null => f.write_str("NULL"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Text(s) => write!(f, "'{s}'"),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(i64::from(v))
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::Int(i64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<&String> for Value {
    fn from(v: &String) -> Self {
        Value::Text(v.clone())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

/// Ordered list of `(column, value)` pairs written by an insert or update.
///
/// [`set`](Changes::set) drops zero values; use [`set_always`](Changes::set_always)
/// for columns that must be written even when zero.
///
/// ```ignore
/// Changes::new()
///     .set("type", &self.kind)
///     .set("price", &self.price)
///     .into_vec()
/// ```
#[derive(Debug, Clone, Default)]
pub struct Changes(Vec<(&'static str, Value)>);

impl Changes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, column: &'static str, value: impl Into<Value>) -> Self {
        let value = value.into();
        if !value.is_zero() {
            self.0.push((column, value));
        }
        self
    }

    pub fn set_always(mut self, column: &'static str, value: impl Into<Value>) -> Self {
        self.0.push((column, value.into()));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_vec(self) -> Vec<(&'static str, Value)> {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_values() {
        assert!(Value::Null.is_zero());
        assert!(Value::Int(0).is_zero());
        assert!(Value::Text(String::new()).is_zero());
        assert!(Value::Bool(false).is_zero());
        assert!(!Value::Int(92).is_zero());
        assert!(!Value::Text("6.85".into()).is_zero());
    }

    #[test]
    fn changes_skip_zero_values() {
        let changes = Changes::new()
            .set("type", "92")
            .set("area", "")
            .set("price", "7.12")
            .into_vec();
        assert_eq!(
            changes,
            vec![("type", Value::from("92")), ("price", Value::from("7.12"))]
        );
    }

    #[test]
    fn set_always_keeps_zero() {
        let changes = Changes::new().set_always("price", "").into_vec();
        assert_eq!(changes, vec![("price", Value::Text(String::new()))]);
    }

    #[test]
    fn option_maps_to_null() {
        assert_eq!(Value::from(None::<i64>), Value::Null);
        assert_eq!(Value::from(Some(3i32)), Value::Int(3));
    }
}
