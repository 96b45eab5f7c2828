//! slow: petrol price query service.

pub mod controllers;
pub mod models;
pub mod state;

use axum::Router;
use slow_core::{health_routes, with_default_layers};
use slow_data_sqlx::Backend;
use sqlx::FromRow;

use models::Petrol;
use state::AppState;

/// The full HTTP application: `GET /`, `/api/petrol/*`, and the standard layers.
pub fn app<DB>(state: AppState<DB>) -> Router
where
    DB: Backend,
    Petrol: for<'r> FromRow<'r, DB::Row>,
{
    let api = Router::new()
        .nest("/api/petrol", controllers::petrol::routes::<DB>())
        .with_state(state);
    with_default_layers(health_routes().merge(api))
}
