//! Storage abstraction for Stockroom.
//!
//! The [`Store`] trait is the persistence collaborator of the importer and of
//! every article/sale operation. It is passed explicitly to whoever needs it;
//! there is no process-wide handle.
//!
//! Implementations must be `Send + Sync` to work with async runtimes.

pub mod memory;

use anyhow::Result;
use async_trait::async_trait;

use crate::models::{Article, NewArticle, NewSale, Sale};

/// Abstract storage backend for articles and their sales.
///
/// # Operations
///
/// | Method | Purpose |
/// |--------|---------|
/// | [`find_article`](Store::find_article) | Look up one article by exact code |
/// | [`list_articles`](Store::list_articles) | All articles ordered by code |
/// | [`insert_article`](Store::insert_article) | Insert a single article |
/// | [`insert_articles`](Store::insert_articles) | Commit a batch of articles atomically |
/// | [`update_article`](Store::update_article) | Change quantity and unit price |
/// | [`delete_article`](Store::delete_article) | Delete an article and its sales |
/// | [`insert_sale`](Store::insert_sale) | Record one sale |
/// | [`insert_sales`](Store::insert_sales) | Commit a batch of sales atomically |
/// | [`sales_for_article`](Store::sales_for_article) | Sales of one article, by date |
#[async_trait]
pub trait Store: Send + Sync {
    /// Case-sensitive lookup by code.
    async fn find_article(&self, code: &str) -> Result<Option<Article>>;

    async fn list_articles(&self) -> Result<Vec<Article>>;

    /// Fails if the code or the name is already taken.
    async fn insert_article(&self, article: &NewArticle) -> Result<Article>;

    /// Inserts every article in one commit. Either all rows are stored or,
    /// on any failure, none are.
    async fn insert_articles(&self, articles: &[NewArticle]) -> Result<usize>;

    /// Returns `false` when no article has this code.
    async fn update_article(&self, code: &str, quantity: i64, unit_price: f64) -> Result<bool>;

    /// Deletes the article together with all of its sales. Returns `false`
    /// when no article has this code.
    async fn delete_article(&self, code: &str) -> Result<bool>;

    /// Fails if the owning article does not exist.
    async fn insert_sale(&self, sale: &NewSale) -> Result<Sale>;

    /// Inserts every sale in one commit, all or nothing.
    async fn insert_sales(&self, sales: &[NewSale]) -> Result<usize>;

    async fn sales_for_article(&self, code: &str) -> Result<Vec<Sale>>;
}
