use axum::extract::State;
use axum::routing::get;
use axum::Router;
use garde::Validate;
use serde::{Deserialize, Serialize};
use slow_core::{ApiResult, Envelope, ValidQuery};
use slow_data::{eq, eq_if_present, order_by, Repository};
use slow_data_sqlx::Backend;
use sqlx::FromRow;

use crate::models::Petrol;
use crate::state::AppState;

/// Grades accepted by `GET /api/petrol/price?type=`.
pub const PETROL_GRADES: [i32; 4] = [0, 92, 95, 98];

#[derive(Debug, Deserialize, Validate)]
pub struct PriceQuery {
    #[serde(rename = "type")]
    #[garde(custom(is_petrol_grade))]
    pub kind: i32,
    #[serde(default)]
    #[garde(skip)]
    pub area: Option<String>,
}

fn is_petrol_grade(value: &i32, _ctx: &()) -> garde::Result {
    if PETROL_GRADES.contains(value) {
        Ok(())
    } else {
        Err(garde::Error::new("must be one of 0, 92, 95, 98"))
    }
}

#[derive(Debug, Serialize)]
pub struct PriceItem {
    pub price: String,
    pub release_date: String,
}

#[derive(Debug, Serialize)]
pub struct PriceList {
    pub list: Vec<PriceItem>,
}

impl From<Vec<Petrol>> for PriceList {
    fn from(rows: Vec<Petrol>) -> Self {
        PriceList {
            list: rows
                .into_iter()
                .map(|p| PriceItem {
                    price: p.price,
                    release_date: p.release_date,
                })
                .collect(),
        }
    }
}

/// `GET /api/petrol/price?type=<grade>&area=<optional>`
pub async fn price<DB>(
    State(state): State<AppState<DB>>,
    ValidQuery(query): ValidQuery<PriceQuery>,
) -> ApiResult<PriceList>
where
    DB: Backend,
    Petrol: for<'r> FromRow<'r, DB::Row>,
{
    let ctx = state.exec_context();
    let grade = query.kind.to_string();
    let rows = state
        .petrol
        .query_list(
            &ctx,
            &[
                &eq("type", grade),
                &eq_if_present("area", query.area),
                &order_by("id", true),
            ],
        )
        .await?;
    tracing::debug!(grade = query.kind, rows = rows.len(), "petrol prices queried");
    Ok(Envelope::success(PriceList::from(rows)))
}

pub fn routes<DB>() -> Router<AppState<DB>>
where
    DB: Backend,
    Petrol: for<'r> FromRow<'r, DB::Row>,
{
    Router::new().route("/price", get(price::<DB>))
}

#[cfg(test)]
mod tests {
    use super::*;
    use slow_core::bind_and_validate;

    #[test]
    fn grade_must_be_in_set() {
        assert!(bind_and_validate::<PriceQuery>("type=92").is_ok());
        assert!(bind_and_validate::<PriceQuery>("type=0").is_ok());
        assert!(bind_and_validate::<PriceQuery>("type=93").is_err());
        assert!(bind_and_validate::<PriceQuery>("type=abc").is_err());
        assert!(bind_and_validate::<PriceQuery>("area=beijing").is_err());
    }

    #[test]
    fn area_is_optional() {
        let q = bind_and_validate::<PriceQuery>("type=95&area=shanghai").unwrap();
        assert_eq!(q.kind, 95);
        assert_eq!(q.area.as_deref(), Some("shanghai"));
        assert!(bind_and_validate::<PriceQuery>("type=95").unwrap().area.is_none());
    }

    #[test]
    fn price_list_keeps_only_price_and_date() {
        let rows = vec![Petrol {
            id: 3,
            kind: "92".into(),
            area: "beijing".into(),
            release_date: "2024-06-01".into(),
            price: "7.89".into(),
            ..Default::default()
        }];
        let value = serde_json::to_value(PriceList::from(rows)).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"list": [{"price": "7.89", "release_date": "2024-06-01"}]})
        );
    }
}
