//! End-to-end tests for the JSON HTTP API.
//!
//! Each test starts the real server on a free port against a temporary SQLite
//! database and talks to it with `reqwest`.

use serde_json::{json, Value};
use stockroom::config::Config;
use stockroom::migrate;
use stockroom::server::run_server;
use tempfile::TempDir;

fn find_free_port() -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().port()
}

async fn wait_for_server(port: u16) {
    let client = reqwest::Client::new();
    let url = format!("http://127.0.0.1:{}/health", port);
    for _ in 0..50 {
        tokio::time::sleep(std::time::Duration::from_millis(100)).await;
        if let Ok(resp) = client.get(&url).send().await {
            if resp.status().is_success() {
                return;
            }
        }
    }
    panic!("Server did not become ready within 5 seconds");
}

/// Starts a server and returns its base URL plus the task handle.
async fn start(tmp: &TempDir) -> (String, tokio::task::JoinHandle<()>) {
    let port = find_free_port();
    let mut cfg = Config::minimal(tmp.path().join("stockroom.sqlite"));
    cfg.server.bind = format!("127.0.0.1:{}", port);
    migrate::run_migrations(&cfg).await.unwrap();

    let handle = tokio::spawn(async move {
        run_server(&cfg).await.ok();
    });
    wait_for_server(port).await;
    (format!("http://127.0.0.1:{}", port), handle)
}

#[tokio::test]
async fn test_article_crud() {
    let tmp = TempDir::new().unwrap();
    let (base, handle) = start(&tmp).await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{}/articles", base))
        .json(&json!({
            "code": "A1", "name": "Bolt", "description": "Steel bolt",
            "quantity": 10, "unit_price": 0.5
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 201);

    // Duplicate code → 409
    let resp = client
        .post(format!("{}/articles", base))
        .json(&json!({
            "code": "A1", "name": "Other", "description": "x",
            "quantity": 1, "unit_price": 1.0
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 409);

    // Form rules → 400
    let resp = client
        .post(format!("{}/articles", base))
        .json(&json!({
            "code": "Z9", "name": "Zero", "description": "none in stock",
            "quantity": 0, "unit_price": 1.0
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"]["code"], "bad_request");

    let resp = client
        .put(format!("{}/articles/A1", base))
        .json(&json!({ "quantity": 7, "unit_price": 0.6 }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["quantity"], 7);

    let resp = client
        .get(format!("{}/articles", base))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["articles"].as_array().unwrap().len(), 1);

    let resp = client
        .delete(format!("{}/articles/A1", base))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 204);

    let resp = client
        .get(format!("{}/articles/A1", base))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);

    handle.abort();
}

#[tokio::test]
async fn test_import_endpoint() {
    let tmp = TempDir::new().unwrap();
    let (base, handle) = start(&tmp).await;
    let client = reqwest::Client::new();

    let csv = "code,name,description,quantity,unit_price\n\
               A1,Bolt,Steel bolt,10,0.50\n\
               A1,Bolt2,dup code,5,1.0\n\
               B2,x,,-1,abc\n";
    let resp = client
        .post(format!("{}/articles/import", base))
        .header("content-type", "text/csv")
        .body(csv)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["inserted"], 1);
    assert_eq!(body["skipped_duplicates"], 1);
    assert_eq!(body["errors"].as_array().unwrap().len(), 1);
    assert_eq!(body["errors"][0]["code"], "B2");

    // Missing column → 400 schema_error
    let resp = client
        .post(format!("{}/articles/import", base))
        .body("code,name\nX,y\n")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"]["code"], "schema_error");

    handle.abort();
}

#[tokio::test]
async fn test_sales_and_monthly_series() {
    let tmp = TempDir::new().unwrap();
    let (base, handle) = start(&tmp).await;
    let client = reqwest::Client::new();

    client
        .post(format!("{}/articles", base))
        .json(&json!({
            "code": "A1", "name": "Bolt", "description": "Steel bolt",
            "quantity": 10, "unit_price": 0.5
        }))
        .send()
        .await
        .unwrap();

    // No sales yet → empty series
    let body: Value = client
        .get(format!("{}/articles/A1/sales/monthly", base))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(body["series"].as_array().unwrap().is_empty());

    for (date, qty) in [("2024-01-05", 3), ("2024-01-20", 2), ("2024-02-01", 5)] {
        let resp = client
            .post(format!("{}/articles/A1/sales", base))
            .json(&json!({ "quantity": qty, "date": date }))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 201);
    }

    let body: Value = client
        .get(format!("{}/articles/A1/sales/monthly", base))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(
        body["series"],
        json!([
            { "period": "2024-01", "quantity": 5 },
            { "period": "2024-02", "quantity": 5 }
        ])
    );
    assert_eq!(body["total"], 10);

    // Unknown article
    let resp = client
        .post(format!("{}/articles/NOPE/sales", base))
        .json(&json!({ "quantity": 1 }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);

    handle.abort();
}
