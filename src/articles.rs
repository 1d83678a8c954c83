//! Article maintenance: list, add, edit, delete.
//!
//! The structured functions take any [`Store`] and are shared by the CLI and
//! the HTTP server. The `run_*` functions are the CLI entry points; they open
//! the SQLite store from the config and print to stdout.

use anyhow::{bail, Result};
use stockroom_core::models::{Article, NewArticle, ValidationError};
use stockroom_core::store::Store;

use crate::config::Config;
use crate::sqlite_store::SqliteStore;

/// Smallest unit price accepted when an article is entered by hand.
const MIN_ENTRY_PRICE: f64 = 0.01;

/// Rules for hand-entered articles, stricter than the stored invariants:
/// every field is required and a new article starts with stock.
pub fn validate_entry(article: &NewArticle) -> Result<(), ValidationError> {
    article.validate()?;
    if article.description.trim().is_empty() {
        return Err(ValidationError::Empty("description"));
    }
    if article.quantity < 1 {
        return Err(ValidationError::QuantityTooLow {
            min: 1,
            value: article.quantity,
        });
    }
    if article.unit_price < MIN_ENTRY_PRICE {
        return Err(ValidationError::PriceTooLow {
            min: MIN_ENTRY_PRICE,
            value: article.unit_price,
        });
    }
    Ok(())
}

/// Adds one hand-entered article. Fields are trimmed before validation.
pub async fn add_article(store: &dyn Store, article: NewArticle) -> Result<Article> {
    let article = NewArticle {
        code: article.code.trim().to_string(),
        name: article.name.trim().to_string(),
        description: article.description.trim().to_string(),
        ..article
    };
    validate_entry(&article)?;

    if store.find_article(&article.code).await?.is_some() {
        bail!("article already exists: {}", article.code);
    }

    let stored = store.insert_article(&article).await?;
    tracing::info!(code = %stored.code, "article added");
    Ok(stored)
}

/// Updates stock quantity and unit price.
pub async fn edit_article(
    store: &dyn Store,
    code: &str,
    quantity: i64,
    unit_price: f64,
) -> Result<Article> {
    if !store.update_article(code, quantity, unit_price).await? {
        bail!("article not found: {}", code);
    }
    tracing::info!(code, quantity, unit_price, "article updated");

    match store.find_article(code).await? {
        Some(article) => Ok(article),
        None => bail!("article not found: {}", code),
    }
}

/// Deletes an article and, with it, its sales.
pub async fn delete_article(store: &dyn Store, code: &str) -> Result<()> {
    if !store.delete_article(code).await? {
        bail!("article not found: {}", code);
    }
    tracing::info!(code, "article deleted with its sales");
    Ok(())
}

/// CLI entry point: print all articles ordered by code.
pub async fn run_list(config: &Config) -> Result<()> {
    let store = SqliteStore::open(config).await?;
    let articles = store.list_articles().await?;
    store.close().await;

    if articles.is_empty() {
        println!("No articles.");
        return Ok(());
    }

    println!(
        "{:<12} {:<24} {:<32} {:>8} {:>10}",
        "CODE", "NAME", "DESCRIPTION", "QTY", "PRICE"
    );
    println!("{}", "-".repeat(90));
    for a in &articles {
        println!(
            "{:<12} {:<24} {:<32} {:>8} {:>10.2}",
            a.code,
            truncate(&a.name, 24),
            truncate(&a.description, 32),
            a.quantity,
            a.unit_price
        );
    }
    println!();
    println!("{} article(s)", articles.len());

    Ok(())
}

/// CLI entry point for `add`.
pub async fn run_add(config: &Config, article: NewArticle) -> Result<()> {
    let store = SqliteStore::open(config).await?;
    let result = add_article(&store, article).await;
    store.close().await;

    let added = result?;
    println!("Article {} added successfully.", added.code);
    Ok(())
}

/// CLI entry point for `edit`.
pub async fn run_edit(config: &Config, code: &str, quantity: i64, unit_price: f64) -> Result<()> {
    let store = SqliteStore::open(config).await?;
    let result = edit_article(&store, code, quantity, unit_price).await;
    store.close().await;

    let article = result?;
    println!(
        "Article {} updated: quantity {}, unit price {:.2}",
        article.code, article.quantity, article.unit_price
    );
    Ok(())
}

/// CLI entry point for `delete`.
pub async fn run_delete(config: &Config, code: &str) -> Result<()> {
    let store = SqliteStore::open(config).await?;
    let result = delete_article(&store, code).await;
    store.close().await;

    result?;
    println!("Article {} deleted successfully.", code);
    Ok(())
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        text.to_string()
    } else {
        let cut: String = text.chars().take(width.saturating_sub(1)).collect();
        format!("{}…", cut)
    }
}
