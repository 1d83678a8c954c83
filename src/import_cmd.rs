//! `stockroom import`: bulk-load articles from a CSV file.

use anyhow::{Context, Result};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use stockroom_core::import::{import_articles_with, ImportOptions, ImportReport};

use crate::config::Config;
use crate::sqlite_store::SqliteStore;

/// Imports `path` into the configured database and returns the report.
pub async fn import_file(config: &Config, path: &Path) -> Result<ImportReport> {
    let file =
        File::open(path).with_context(|| format!("Failed to open import file: {}", path.display()))?;
    let options = ImportOptions {
        delimiter: config.import.delimiter_byte(),
    };

    let store = SqliteStore::open(config).await?;
    let result = import_articles_with(BufReader::new(file), &store, &options).await;
    store.close().await;

    Ok(result?)
}

/// CLI entry point: import and print the per-row summary.
pub async fn run_import(config: &Config, path: &Path) -> Result<()> {
    let report = import_file(config, path).await?;

    println!("import {}", path.display());
    println!("  inserted: {}", report.inserted);
    println!("  skipped duplicates: {}", report.skipped_duplicates);
    println!("  errors: {}", report.errors.len());
    for err in &report.errors {
        match &err.code {
            Some(code) => println!("    row {} (code {}): {}", err.row, code, err.reason),
            None => println!("    row {}: {}", err.row, err.reason),
        }
    }
    println!("ok");

    Ok(())
}
