//! CSV bulk import of articles.
//!
//! The importer reads a delimited file with a header row, coerces each data
//! row into a [`NewArticle`], skips rows whose code already exists, records a
//! [`RowError`] for every row it cannot use, and finally commits all staged
//! articles through [`Store::insert_articles`] in one batch.
//!
//! # Outcomes
//!
//! | Situation | Result |
//! |-----------|--------|
//! | Required column missing from header | [`ImportError::Schema`], nothing processed |
//! | Row fails to coerce or validate | [`RowError`] recorded, import continues |
//! | Code already stored or staged earlier in the file | silent duplicate skip |
//! | Input fails to read mid-stream | [`ImportError::Read`], nothing stored |
//! | Store rejects the final commit | [`ImportError::Persistence`], nothing stored |
//!
//! Name uniqueness is not checked here. A row whose name collides with an
//! existing article makes the store reject the whole commit.

use std::collections::{HashMap, HashSet};
use std::io::Read;

use serde::Serialize;
use thiserror::Error;

use crate::models::NewArticle;
use crate::store::Store;

/// Columns every import file must carry. Order in the file is free and extra
/// columns are ignored.
pub const REQUIRED_COLUMNS: [&str; 5] = ["code", "name", "description", "quantity", "unit_price"];

/// Fatal import failures. Row-level problems are reported as [`RowError`]s.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("missing required column(s): {}", missing.join(", "))]
    Schema { missing: Vec<String> },
    #[error("failed to read CSV header: {0}")]
    Header(#[source] csv::Error),
    #[error("failed to read CSV input at row {row}: {source}")]
    Read {
        row: u64,
        #[source]
        source: csv::Error,
    },
    #[error("import commit failed: {0:#}")]
    Persistence(#[source] anyhow::Error),
}

/// One rejected data row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowError {
    /// 1-based data row number (the header is not counted).
    pub row: u64,
    /// The row's code as read, when there was one.
    pub code: Option<String>,
    pub reason: String,
}

/// What happened to a single data row.
#[derive(Debug, Clone, PartialEq)]
pub enum RowOutcome {
    Inserted,
    SkippedDuplicate,
    Rejected(String),
}

/// Summary returned by a successful import.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ImportReport {
    pub inserted: usize,
    pub skipped_duplicates: usize,
    pub errors: Vec<RowError>,
}

impl ImportReport {
    /// Number of data rows the import looked at.
    pub fn rows(&self) -> usize {
        self.inserted + self.skipped_duplicates + self.errors.len()
    }
}

/// Reader settings.
#[derive(Debug, Clone)]
pub struct ImportOptions {
    pub delimiter: u8,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self { delimiter: b',' }
    }
}

/// Imports articles from comma-separated input.
pub async fn import_articles<R: Read>(
    reader: R,
    store: &dyn Store,
) -> Result<ImportReport, ImportError> {
    import_articles_with(reader, store, &ImportOptions::default()).await
}

/// Imports articles using custom reader settings.
///
/// The reader is consumed and dropped before this function returns, on
/// success and on every error path.
pub async fn import_articles_with<R: Read>(
    reader: R,
    store: &dyn Store,
    options: &ImportOptions,
) -> Result<ImportReport, ImportError> {
    let (staged, report) = stage_rows(reader, store, options).await?;

    if !staged.is_empty() {
        store
            .insert_articles(&staged)
            .await
            .map_err(ImportError::Persistence)?;
    }

    tracing::info!(
        inserted = report.inserted,
        skipped_duplicates = report.skipped_duplicates,
        errors = report.errors.len(),
        "article import committed"
    );
    Ok(report)
}

/// Reads every row and decides its outcome without writing anything.
async fn stage_rows<R: Read>(
    reader: R,
    store: &dyn Store,
    options: &ImportOptions,
) -> Result<(Vec<NewArticle>, ImportReport), ImportError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .delimiter(options.delimiter)
        .from_reader(reader);

    let columns = column_positions(csv_reader.headers().map_err(ImportError::Header)?)?;

    let mut report = ImportReport::default();
    let mut staged: Vec<NewArticle> = Vec::new();
    let mut staged_codes: HashSet<String> = HashSet::new();

    for (index, result) in csv_reader.records().enumerate() {
        let row = index as u64 + 1;

        let parsed = match result {
            Ok(record) => parse_row(&record, &columns),
            Err(e) if e.is_io_error() => return Err(ImportError::Read { row, source: e }),
            Err(e) => Err(RowError {
                row,
                code: None,
                reason: format!("unreadable record: {}", e),
            }),
        };

        let outcome = match parsed {
            Err(mut err) => {
                err.row = row;
                let reason = err.reason.clone();
                report.errors.push(err);
                RowOutcome::Rejected(reason)
            }
            Ok(article) => {
                if staged_codes.contains(&article.code) || is_stored(store, &article.code).await? {
                    RowOutcome::SkippedDuplicate
                } else {
                    staged_codes.insert(article.code.clone());
                    staged.push(article);
                    RowOutcome::Inserted
                }
            }
        };

        match outcome {
            RowOutcome::Inserted => report.inserted += 1,
            RowOutcome::SkippedDuplicate => report.skipped_duplicates += 1,
            RowOutcome::Rejected(reason) => {
                tracing::warn!(row, %reason, "import row rejected");
            }
        }
    }

    Ok((staged, report))
}

async fn is_stored(store: &dyn Store, code: &str) -> Result<bool, ImportError> {
    store
        .find_article(code)
        .await
        .map(|found| found.is_some())
        .map_err(ImportError::Persistence)
}

/// Maps each required column to its index in the header, or fails with every
/// missing column listed.
fn column_positions(
    headers: &csv::StringRecord,
) -> Result<HashMap<&'static str, usize>, ImportError> {
    let names: Vec<&str> = headers
        .iter()
        .enumerate()
        .map(|(i, h)| if i == 0 { h.trim_start_matches('\u{FEFF}') } else { h })
        .collect();

    let mut positions = HashMap::new();
    let mut missing = Vec::new();
    for column in REQUIRED_COLUMNS {
        match names.iter().position(|h| *h == column) {
            Some(i) => {
                positions.insert(column, i);
            }
            None => missing.push(column.to_string()),
        }
    }

    if missing.is_empty() {
        Ok(positions)
    } else {
        Err(ImportError::Schema { missing })
    }
}

/// Coerces one record. The returned error carries a placeholder row number
/// that the caller fills in.
fn parse_row(
    record: &csv::StringRecord,
    columns: &HashMap<&'static str, usize>,
) -> Result<NewArticle, RowError> {
    let field = |name: &'static str| columns.get(name).and_then(|&i| record.get(i)).map(str::trim);

    let code = field("code").map(str::to_string);
    let reject = |reason: String| RowError {
        row: 0,
        code: code.clone().filter(|c| !c.is_empty()),
        reason,
    };

    let text = |name: &'static str| -> Result<String, RowError> {
        field(name)
            .map(str::to_string)
            .ok_or_else(|| reject(format!("missing field '{}'", name)))
    };
    let code_text = text("code")?;
    let name = text("name")?;
    let description = text("description")?;

    let quantity_raw = field("quantity").ok_or_else(|| reject("missing field 'quantity'".into()))?;
    let quantity: i64 = quantity_raw
        .parse()
        .map_err(|_| reject(format!("invalid quantity '{}'", quantity_raw)))?;

    let price_raw = field("unit_price").ok_or_else(|| reject("missing field 'unit_price'".into()))?;
    let unit_price: f64 = price_raw
        .parse()
        .map_err(|_| reject(format!("invalid unit_price '{}'", price_raw)))?;

    let article = NewArticle {
        code: code_text,
        name,
        description,
        quantity,
        unit_price,
    };
    article.validate().map_err(|e| reject(e.to_string()))?;
    Ok(article)
}
