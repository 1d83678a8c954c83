//! In-memory [`Store`] implementation for tests and demos.
//!
//! Uses `BTreeMap` and `Vec` behind a single `std::sync::RwLock`. Enforces the
//! same rules as the SQLite store: unique code, unique name, existing owner
//! for every sale, and cascade on delete.

use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;

use crate::models::{Article, NewArticle, NewSale, Sale};

use super::Store;

#[derive(Default)]
struct Tables {
    articles: BTreeMap<String, Article>,
    sales: Vec<Sale>,
    next_sale_id: i64,
}

fn check_unique(articles: &BTreeMap<String, Article>, article: &NewArticle) -> Result<()> {
    if articles.contains_key(&article.code) {
        bail!("UNIQUE constraint failed: articles.code ({})", article.code);
    }
    if articles.values().any(|a| a.name == article.name) {
        bail!("UNIQUE constraint failed: articles.name ({})", article.name);
    }
    Ok(())
}

impl Tables {
    fn push_sale(&mut self, sale: &NewSale) -> Result<Sale> {
        sale.validate()?;
        if !self.articles.contains_key(&sale.article_code) {
            bail!("article not found: {}", sale.article_code);
        }
        self.next_sale_id += 1;
        let stored = Sale {
            id: self.next_sale_id,
            article_code: sale.article_code.clone(),
            date: sale.date,
            quantity: sale.quantity,
        };
        self.sales.push(stored.clone());
        Ok(stored)
    }
}

/// In-memory store for tests and demos.
#[derive(Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Tables>> {
        self.tables.read().map_err(|_| anyhow!("store lock poisoned"))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Tables>> {
        self.tables.write().map_err(|_| anyhow!("store lock poisoned"))
    }
}

#[async_trait]
impl Store for InMemoryStore {
    async fn find_article(&self, code: &str) -> Result<Option<Article>> {
        Ok(self.read()?.articles.get(code).cloned())
    }

    async fn list_articles(&self) -> Result<Vec<Article>> {
        Ok(self.read()?.articles.values().cloned().collect())
    }

    async fn insert_article(&self, article: &NewArticle) -> Result<Article> {
        article.validate()?;
        let mut tables = self.write()?;
        check_unique(&tables.articles, article)?;
        let stored = article.clone().into_article();
        tables.articles.insert(stored.code.clone(), stored.clone());
        Ok(stored)
    }

    async fn insert_articles(&self, articles: &[NewArticle]) -> Result<usize> {
        let mut tables = self.write()?;
        // Validate against a scratch copy so a failure leaves the store untouched.
        let mut staged = tables.articles.clone();
        for article in articles {
            article.validate()?;
            check_unique(&staged, article)?;
            staged.insert(article.code.clone(), article.clone().into_article());
        }
        tables.articles = staged;
        Ok(articles.len())
    }

    async fn update_article(&self, code: &str, quantity: i64, unit_price: f64) -> Result<bool> {
        crate::models::validate_stock(quantity, unit_price)?;
        let mut tables = self.write()?;
        match tables.articles.get_mut(code) {
            Some(article) => {
                article.quantity = quantity;
                article.unit_price = unit_price;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_article(&self, code: &str) -> Result<bool> {
        let mut tables = self.write()?;
        if tables.articles.remove(code).is_none() {
            return Ok(false);
        }
        tables.sales.retain(|s| s.article_code != code);
        Ok(true)
    }

    async fn insert_sale(&self, sale: &NewSale) -> Result<Sale> {
        self.write()?.push_sale(sale)
    }

    async fn insert_sales(&self, sales: &[NewSale]) -> Result<usize> {
        let mut tables = self.write()?;
        for sale in sales {
            sale.validate()?;
            if !tables.articles.contains_key(&sale.article_code) {
                bail!("article not found: {}", sale.article_code);
            }
        }
        for sale in sales {
            tables.push_sale(sale)?;
        }
        Ok(sales.len())
    }

    async fn sales_for_article(&self, code: &str) -> Result<Vec<Sale>> {
        let mut sales: Vec<Sale> = self
            .read()?
            .sales
            .iter()
            .filter(|s| s.article_code == code)
            .cloned()
            .collect();
        sales.sort_by_key(|s| (s.date, s.id));
        Ok(sales)
    }
}
