use std::time::Duration;

use slow::models::Petrol;
use slow::state::AppState;
use slow_data::{ExecContext, Repository};
use slow_test::TestApp;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Pool, Sqlite};

const SCHEMA: &str = include_str!("../sql/petrol.sqlite.sql");

struct Harness {
    app: TestApp,
    state: AppState<Sqlite>,
    pool: Pool<Sqlite>,
    _dir: tempfile::TempDir,
}

async fn harness() -> Harness {
    let dir = tempfile::tempdir().unwrap();
    let url = format!("sqlite://{}?mode=rwc", dir.path().join("slow.db").display());
    let pool = SqlitePoolOptions::new()
        .max_connections(4)
        .connect(&url)
        .await
        .unwrap();
    sqlx::raw_sql(SCHEMA).execute(&pool).await.unwrap();
    let state = AppState::new(pool.clone(), Duration::from_secs(5));
    Harness {
        app: TestApp::new(slow::app(state.clone())),
        state,
        pool,
        _dir: dir,
    }
}

impl Harness {
    async fn seed(&self, kind: &str, area: &str, release_date: &str, price: &str) -> Petrol {
        let row = Petrol {
            kind: kind.into(),
            area: area.into(),
            release_date: release_date.into(),
            price: price.into(),
            ..Default::default()
        };
        self.state.petrol.create(&ExecContext::new(), row).await.unwrap()
    }
}

#[tokio::test]
async fn health_is_ok() {
    let h = harness().await;
    let resp = h.app.get("/").send().await.assert_ok();
    assert_eq!(resp.text(), "\"OK\"");
}

#[tokio::test]
async fn price_lists_matching_rows_in_id_order() {
    let h = harness().await;
    h.seed("92", "beijing", "2024-06-01", "7.89").await;
    h.seed("92", "shanghai", "2024-06-02", "7.91").await;
    h.seed("95", "beijing", "2024-06-01", "8.40").await;
    h.seed("92", "beijing", "2024-06-15", "7.95").await;

    h.app
        .get("/api/petrol/price")
        .query("type", 92)
        .send()
        .await
        .assert_success()
        .assert_json_path("data.list.len()", 3)
        .assert_json_path("data.list[0].price", "7.89")
        .assert_json_path("data.list[0].release_date", "2024-06-01")
        .assert_json_path("data.list[2].price", "7.95")
        .assert_json_path(
            "data.list[*].keys()",
            serde_json::json!([
                ["price", "release_date"],
                ["price", "release_date"],
                ["price", "release_date"],
            ]),
        );
}

#[tokio::test]
async fn price_filters_by_area() {
    let h = harness().await;
    h.seed("95", "beijing", "2024-06-01", "8.40").await;
    h.seed("95", "shanghai", "2024-06-01", "8.35").await;

    h.app
        .get("/api/petrol/price?type=95&area=shanghai")
        .send()
        .await
        .assert_success()
        .assert_json_path("data.list.len()", 1)
        .assert_json_path("data.list[0].price", "8.35");

    // An empty area is the same as no area.
    h.app
        .get("/api/petrol/price?type=95&area=")
        .send()
        .await
        .assert_success()
        .assert_json_path("data.list.len()", 2);
}

#[tokio::test]
async fn no_match_is_an_empty_list() {
    let h = harness().await;
    h.seed("92", "beijing", "2024-06-01", "7.89").await;
    h.app
        .get("/api/petrol/price?type=0")
        .send()
        .await
        .assert_success()
        .assert_json_path("data", serde_json::json!({"list": []}));
}

#[tokio::test]
async fn invalid_input_uses_fallback_envelope() {
    let h = harness().await;
    for uri in [
        "/api/petrol/price",
        "/api/petrol/price?type=93",
        "/api/petrol/price?type=abc",
        "/api/petrol/price?area=beijing",
    ] {
        h.app.get(uri).send().await.assert_system_error();
    }
}

#[tokio::test]
async fn storage_failure_is_masked() {
    let h = harness().await;
    h.pool.close().await;
    let resp = h
        .app
        .get("/api/petrol/price?type=92")
        .send()
        .await
        .assert_system_error();
    assert!(!resp.text().contains("closed"));
}

#[tokio::test]
async fn request_id_is_echoed() {
    let h = harness().await;
    let resp = h
        .app
        .get("/api/petrol/price?type=92")
        .header("x-request-id", "trace-me")
        .send()
        .await
        .assert_success();
    assert_eq!(resp.header("x-request-id"), Some("trace-me"));
}
