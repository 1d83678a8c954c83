//! # Stockroom Core
//!
//! Storage-agnostic logic for Stockroom: article and sale models, the
//! [`store::Store`] abstraction, the CSV importer, monthly sales aggregation,
//! and the synthetic sales generator used for demo data.
//!
//! This crate contains no tokio, sqlx, or filesystem I/O. The SQLite backend
//! and every user-facing surface live in the `stockroom` crate.

pub mod aggregate;
pub mod import;
pub mod models;
pub mod seed;
pub mod store;
