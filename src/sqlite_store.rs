//! SQLite-backed [`Store`] implementation.
//!
//! Maps each [`Store`] operation to SQL against the `articles` and `sales`
//! tables created by [`migrate`](crate::migrate). Batch inserts and the
//! cascading delete each run in one transaction.

use anyhow::{bail, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use stockroom_core::models::{validate_stock, Article, NewArticle, NewSale, Sale};
use stockroom_core::store::Store;

use crate::config::Config;
use crate::db;

/// SQLite implementation of the [`Store`] trait.
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Connects to the database named in the config.
    pub async fn open(config: &Config) -> Result<Self> {
        Ok(Self::new(db::connect(config).await?))
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

const INSERT_ARTICLE: &str =
    "INSERT INTO articles (code, name, description, quantity, unit_price) VALUES (?, ?, ?, ?, ?)";

fn article_from_row(row: &SqliteRow) -> Article {
    Article {
        code: row.get("code"),
        name: row.get("name"),
        description: row.get("description"),
        quantity: row.get("quantity"),
        unit_price: row.get("unit_price"),
    }
}

fn sale_from_row(row: &SqliteRow) -> Sale {
    Sale {
        id: row.get("id"),
        article_code: row.get("article_code"),
        date: row.get::<NaiveDate, _>("sale_date"),
        quantity: row.get("quantity"),
    }
}

#[async_trait]
impl Store for SqliteStore {
    async fn find_article(&self, code: &str) -> Result<Option<Article>> {
        let row = sqlx::query(
            "SELECT code, name, description, quantity, unit_price FROM articles WHERE code = ?",
        )
        .bind(code)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(article_from_row))
    }

    async fn list_articles(&self) -> Result<Vec<Article>> {
        let rows = sqlx::query(
            "SELECT code, name, description, quantity, unit_price FROM articles ORDER BY code ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(article_from_row).collect())
    }

    async fn insert_article(&self, article: &NewArticle) -> Result<Article> {
        article.validate()?;

        sqlx::query(INSERT_ARTICLE)
            .bind(&article.code)
            .bind(&article.name)
            .bind(&article.description)
            .bind(article.quantity)
            .bind(article.unit_price)
            .execute(&self.pool)
            .await?;

        Ok(article.clone().into_article())
    }

    async fn insert_articles(&self, articles: &[NewArticle]) -> Result<usize> {
        for article in articles {
            article.validate()?;
        }

        let mut tx = self.pool.begin().await?;
        for article in articles {
            sqlx::query(INSERT_ARTICLE)
                .bind(&article.code)
                .bind(&article.name)
                .bind(&article.description)
                .bind(article.quantity)
                .bind(article.unit_price)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;

        Ok(articles.len())
    }

    async fn update_article(&self, code: &str, quantity: i64, unit_price: f64) -> Result<bool> {
        validate_stock(quantity, unit_price)?;

        let result = sqlx::query("UPDATE articles SET quantity = ?, unit_price = ? WHERE code = ?")
            .bind(quantity)
            .bind(unit_price)
            .bind(code)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_article(&self, code: &str) -> Result<bool> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM sales WHERE article_code = ?")
            .bind(code)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM articles WHERE code = ?")
            .bind(code)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Ok(false);
        }

        tx.commit().await?;
        Ok(true)
    }

    async fn insert_sale(&self, sale: &NewSale) -> Result<Sale> {
        sale.validate()?;
        if self.find_article(&sale.article_code).await?.is_none() {
            bail!("article not found: {}", sale.article_code);
        }

        let result =
            sqlx::query("INSERT INTO sales (article_code, sale_date, quantity) VALUES (?, ?, ?)")
                .bind(&sale.article_code)
                .bind(sale.date)
                .bind(sale.quantity)
                .execute(&self.pool)
                .await?;

        Ok(Sale {
            id: result.last_insert_rowid(),
            article_code: sale.article_code.clone(),
            date: sale.date,
            quantity: sale.quantity,
        })
    }

    async fn insert_sales(&self, sales: &[NewSale]) -> Result<usize> {
        for sale in sales {
            sale.validate()?;
        }

        let mut tx = self.pool.begin().await?;
        for sale in sales {
            sqlx::query("INSERT INTO sales (article_code, sale_date, quantity) VALUES (?, ?, ?)")
                .bind(&sale.article_code)
                .bind(sale.date)
                .bind(sale.quantity)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;

        Ok(sales.len())
    }

    async fn sales_for_article(&self, code: &str) -> Result<Vec<Sale>> {
        let rows = sqlx::query(
            "SELECT id, article_code, sale_date, quantity FROM sales WHERE article_code = ? ORDER BY sale_date ASC, id ASC",
        )
        .bind(code)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(sale_from_row).collect())
    }
}
