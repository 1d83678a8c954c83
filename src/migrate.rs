use anyhow::Result;

use crate::config::Config;
use crate::db;

pub async fn run_migrations(config: &Config) -> Result<()> {
    let pool = db::connect(config).await?;

    // Create articles table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS articles (
            code TEXT PRIMARY KEY,
            name TEXT NOT NULL UNIQUE,
            description TEXT NOT NULL DEFAULT '',
            quantity INTEGER NOT NULL CHECK (quantity >= 0),
            unit_price REAL NOT NULL CHECK (unit_price > 0)
        )
        "#,
    )
    .execute(&pool)
    .await?;

    // Create sales table; rows go with their article
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS sales (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            article_code TEXT NOT NULL,
            sale_date TEXT NOT NULL,
            quantity INTEGER NOT NULL CHECK (quantity > 0 AND quantity <= 2147483647),
            FOREIGN KEY (article_code) REFERENCES articles(code) ON DELETE CASCADE
        )
        "#,
    )
    .execute(&pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_sales_article_date ON sales(article_code, sale_date)",
    )
    .execute(&pool)
    .await?;

    pool.close().await;
    Ok(())
}
