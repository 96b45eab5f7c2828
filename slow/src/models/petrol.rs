use chrono::NaiveDateTime;
use serde::Serialize;
use slow_data::{Changes, Record, Value};

/// One published price of a petrol grade in an area. Table `petrol`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, sqlx::FromRow)]
pub struct Petrol {
    pub id: i32,
    /// Grade, e.g. `"92"`.
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub kind: String,
    pub area: String,
    pub release_date: String,
    /// Decimal kept as text, e.g. `"7.89"`.
    pub price: String,
    pub created_at: Option<NaiveDateTime>,
    pub updated_at: Option<NaiveDateTime>,
}

impl Record for Petrol {
    type Id = i32;

    fn table_name() -> &'static str {
        "petrol"
    }

    fn columns() -> &'static [&'static str] {
        &[
            "id",
            "type",
            "area",
            "release_date",
            "price",
            "created_at",
            "updated_at",
        ]
    }

    fn touch_column() -> Option<&'static str> {
        Some("updated_at")
    }

    fn id(&self) -> i32 {
        self.id
    }

    fn changes(&self) -> Vec<(&'static str, Value)> {
        Changes::new()
            .set("type", &self.kind)
            .set("area", &self.area)
            .set("release_date", &self.release_date)
            .set("price", &self.price)
            .into_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn changes_skip_zero_fields_and_storage_columns() {
        let p = Petrol {
            id: 7,
            kind: "95".into(),
            price: "8.12".into(),
            ..Default::default()
        };
        let cols: Vec<_> = p.changes().into_iter().map(|(c, _)| c).collect();
        assert_eq!(cols, vec!["type", "price"]);
        assert!(p.is_persisted());
        assert!(!Petrol::default().is_persisted());
    }
}
