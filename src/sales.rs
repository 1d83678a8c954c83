//! Sale recording, monthly history, and synthetic seeding.
//!
//! [`monthly_history`] produces the chart data for one article: the ordered
//! `(period, quantity)` series plus its total. The CLI renders it as a text
//! bar chart; the HTTP server returns it as JSON for a client-side chart.

use anyhow::{bail, Result};
use chrono::{Local, NaiveDate};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use stockroom_core::aggregate::{monthly_totals, total_quantity, MonthlyTotal};
use stockroom_core::models::{NewSale, Sale};
use stockroom_core::seed::{generate_sales, SeedPlan};
use stockroom_core::store::Store;

use crate::config::Config;
use crate::sqlite_store::SqliteStore;

/// Widest bar drawn by `sale history`.
const BAR_WIDTH: i64 = 40;

/// Monthly sales series for one article.
#[derive(Debug, Clone, Serialize)]
pub struct SalesHistory {
    pub code: String,
    pub name: String,
    pub series: Vec<MonthlyTotal>,
    pub total: i64,
}

/// Records one sale. `date` defaults to today's local date.
pub async fn record_sale(
    store: &dyn Store,
    code: &str,
    quantity: i64,
    date: Option<NaiveDate>,
) -> Result<Sale> {
    let sale = NewSale {
        article_code: code.to_string(),
        date: date.unwrap_or_else(|| Local::now().date_naive()),
        quantity,
    };
    sale.validate()?;

    let stored = store.insert_sale(&sale).await?;
    tracing::info!(code, quantity, date = %stored.date, "sale recorded");
    Ok(stored)
}

/// Builds the monthly series for an article.
pub async fn monthly_history(store: &dyn Store, code: &str) -> Result<SalesHistory> {
    let Some(article) = store.find_article(code).await? else {
        bail!("article not found: {}", code);
    };

    let sales = store.sales_for_article(code).await?;
    let series = monthly_totals(&sales);
    let total = total_quantity(&series);

    Ok(SalesHistory {
        code: article.code,
        name: article.name,
        series,
        total,
    })
}

/// Generates synthetic sales for every stored article and commits them in
/// one batch. Returns the number of sales written.
pub async fn seed_sales(
    store: &dyn Store,
    plan: &SeedPlan,
    end: NaiveDate,
    rng_seed: Option<u64>,
) -> Result<usize> {
    let codes: Vec<String> = store
        .list_articles()
        .await?
        .into_iter()
        .map(|a| a.code)
        .collect();

    let mut rng = match rng_seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let sales = generate_sales(&mut rng, &codes, end, plan);

    let written = store.insert_sales(&sales).await?;
    tracing::info!(articles = codes.len(), sales = written, "synthetic sales seeded");
    Ok(written)
}

/// Parses a `YYYY-MM-DD` CLI argument.
pub fn parse_date(s: &str) -> Result<NaiveDate> {
    match NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        Ok(d) => Ok(d),
        Err(_) => bail!("invalid date '{}': expected YYYY-MM-DD", s),
    }
}

/// CLI entry point for `sale record`.
pub async fn run_record(
    config: &Config,
    code: &str,
    quantity: i64,
    date: Option<String>,
) -> Result<()> {
    let date = date.as_deref().map(parse_date).transpose()?;

    let store = SqliteStore::open(config).await?;
    let result = record_sale(&store, code, quantity, date).await;
    store.close().await;

    let sale = result?;
    println!(
        "Recorded sale #{}: {} x{} on {}",
        sale.id, sale.article_code, sale.quantity, sale.date
    );
    Ok(())
}

/// CLI entry point for `sale history`.
pub async fn run_history(config: &Config, code: &str) -> Result<()> {
    let store = SqliteStore::open(config).await?;
    let result = monthly_history(&store, code).await;
    store.close().await;

    let history = result?;
    println!("Sales history for {} ({})", history.code, history.name);
    println!();

    if history.series.is_empty() {
        println!("  no sales recorded");
        return Ok(());
    }

    for line in render_bars(&history.series) {
        println!("  {}", line);
    }
    println!();
    println!("  total: {}", history.total);

    Ok(())
}

/// CLI entry point for `seed`.
pub async fn run_seed(config: &Config, plan: SeedPlan, rng_seed: Option<u64>) -> Result<()> {
    let today = Local::now().date_naive();

    let store = SqliteStore::open(config).await?;
    let result = seed_sales(&store, &plan, today, rng_seed).await;
    store.close().await;

    let written = result?;
    println!("seeded {} sales over {} month(s)", written, plan.months);
    println!("ok");
    Ok(())
}

/// One text line per period: `YYYY-MM  ####   12`, bars scaled to the
/// largest month.
fn render_bars(series: &[MonthlyTotal]) -> Vec<String> {
    let peak = series.iter().map(|m| m.quantity).max().unwrap_or(0).max(1);
    series
        .iter()
        .map(|m| {
            let scaled = i128::from(m.quantity) * i128::from(BAR_WIDTH) / i128::from(peak);
            let width = scaled.clamp(1, i128::from(BAR_WIDTH)) as usize;
            format!(
                "{}  {:<width$}  {:>6}",
                m.period,
                "#".repeat(width),
                m.quantity,
                width = BAR_WIDTH as usize
            )
        })
        .collect()
}
