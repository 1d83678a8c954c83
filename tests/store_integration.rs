//! Integration tests for the SQLite store.
//!
//! These run the importer, the aggregator, and the cascade rule against a
//! real database file, so the transactional behavior the in-memory store
//! imitates is checked where it actually matters.

use chrono::NaiveDate;
use stockroom::config::Config;
use stockroom::migrate;
use stockroom::sqlite_store::SqliteStore;
use stockroom_core::aggregate::monthly_totals;
use stockroom_core::import::{import_articles, ImportError};
use stockroom_core::models::{NewArticle, NewSale};
use stockroom_core::store::Store;
use tempfile::TempDir;

const HEADER: &str = "code,name,description,quantity,unit_price\n";

async fn open_store(tmp: &TempDir) -> SqliteStore {
    let cfg = Config::minimal(tmp.path().join("stockroom.sqlite"));
    migrate::run_migrations(&cfg).await.unwrap();
    SqliteStore::open(&cfg).await.unwrap()
}

fn article(code: &str, name: &str) -> NewArticle {
    NewArticle {
        code: code.to_string(),
        name: name.to_string(),
        description: "test part".to_string(),
        quantity: 4,
        unit_price: 1.5,
    }
}

fn sale(code: &str, y: i32, m: u32, d: u32, quantity: i64) -> NewSale {
    NewSale {
        article_code: code.to_string(),
        date: NaiveDate::from_ymd_opt(y, m, d).unwrap(),
        quantity,
    }
}

#[tokio::test]
async fn test_import_commits_and_is_idempotent() {
    let tmp = TempDir::new().unwrap();
    let store = open_store(&tmp).await;

    let csv = format!(
        "{}A1,Bolt,Steel bolt,10,0.50\nA1,Bolt2,dup code,5,1.0\nB2,x,,-1,abc\n",
        HEADER
    );
    let report = import_articles(csv.as_bytes(), &store).await.unwrap();
    assert_eq!(report.inserted, 1);
    assert_eq!(report.skipped_duplicates, 1);
    assert_eq!(report.errors.len(), 1);

    let again = import_articles(csv.as_bytes(), &store).await.unwrap();
    assert_eq!(again.inserted, 0);
    assert_eq!(store.list_articles().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_name_collision_rolls_back_batch() {
    let tmp = TempDir::new().unwrap();
    let store = open_store(&tmp).await;
    store.insert_article(&article("A1", "Bolt")).await.unwrap();

    let csv = format!("{}N1,Nut,,1,1\nN2,Bolt,,1,1\n", HEADER);
    let err = import_articles(csv.as_bytes(), &store).await.unwrap_err();
    assert!(matches!(err, ImportError::Persistence(_)));

    assert!(store.find_article("N1").await.unwrap().is_none());
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM articles")
        .fetch_one(store.pool())
        .await
        .unwrap();
    assert_eq!(count, 1);
}

#[tokio::test]
async fn test_delete_cascades_to_sales() {
    let tmp = TempDir::new().unwrap();
    let store = open_store(&tmp).await;
    store.insert_article(&article("A1", "Bolt")).await.unwrap();
    store.insert_article(&article("B2", "Nut")).await.unwrap();
    store
        .insert_sales(&[sale("A1", 2024, 1, 5, 3), sale("B2", 2024, 1, 6, 1)])
        .await
        .unwrap();

    assert!(store.delete_article("A1").await.unwrap());
    assert!(!store.delete_article("A1").await.unwrap());

    let orphaned: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sales WHERE article_code = 'A1'")
        .fetch_one(store.pool())
        .await
        .unwrap();
    assert_eq!(orphaned, 0);
    assert_eq!(store.sales_for_article("B2").await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_sales_round_through_sqlite_into_monthly_series() {
    let tmp = TempDir::new().unwrap();
    let store = open_store(&tmp).await;
    store.insert_article(&article("A1", "Bolt")).await.unwrap();

    store.insert_sale(&sale("A1", 2024, 2, 1, 5)).await.unwrap();
    store.insert_sale(&sale("A1", 2024, 1, 20, 2)).await.unwrap();
    store.insert_sale(&sale("A1", 2024, 1, 5, 3)).await.unwrap();

    let sales = store.sales_for_article("A1").await.unwrap();
    assert!(sales.windows(2).all(|w| w[0].date <= w[1].date));

    let series = monthly_totals(&sales);
    let pairs: Vec<(String, i64)> = series.into_iter().map(|m| (m.period, m.quantity)).collect();
    assert_eq!(
        pairs,
        vec![("2024-01".to_string(), 5), ("2024-02".to_string(), 5)]
    );
}

#[tokio::test]
async fn test_sale_batch_with_unknown_article_stores_nothing() {
    let tmp = TempDir::new().unwrap();
    let store = open_store(&tmp).await;
    store.insert_article(&article("A1", "Bolt")).await.unwrap();

    let result = store
        .insert_sales(&[sale("A1", 2024, 3, 1, 1), sale("GHOST", 2024, 3, 2, 1)])
        .await;
    assert!(result.is_err());
    assert!(store.sales_for_article("A1").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_update_article() {
    let tmp = TempDir::new().unwrap();
    let store = open_store(&tmp).await;
    store.insert_article(&article("A1", "Bolt")).await.unwrap();

    assert!(store.update_article("A1", 0, 9.99).await.unwrap());
    let a = store.find_article("A1").await.unwrap().unwrap();
    assert_eq!(a.quantity, 0);
    assert!((a.unit_price - 9.99).abs() < 1e-9);

    assert!(!store.update_article("B9", 1, 1.0).await.unwrap());
    assert!(store.update_article("A1", -1, 1.0).await.is_err());
}
