//! # Stockroom
//!
//! A small inventory manager: keep a catalog of stocked articles, bulk-load
//! them from CSV, record sales, and chart each article's sales by month.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   ┌────────────────────┐   ┌──────────┐
//! │ CSV / forms  │──▶│  stockroom-core     │──▶│  SQLite  │
//! │              │   │ import + aggregate  │   │ articles │
//! └──────────────┘   └─────────┬──────────┘   │  sales   │
//!                              │              └──────────┘
//!                    ┌─────────┴─────────┐
//!                    ▼                   ▼
//!               ┌──────────┐       ┌──────────┐
//!               │   CLI    │       │   HTTP   │
//!               │stockroom │       │  (JSON)  │
//!               └──────────┘       └──────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! stockroom init                       # create database
//! stockroom import parts.csv           # bulk-load articles
//! stockroom sale record A1 --quantity 3
//! stockroom sale history A1            # monthly bar chart
//! stockroom serve                      # start HTTP server
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`db`] | Database connection |
//! | [`migrate`] | Schema migrations |
//! | [`sqlite_store`] | SQLite implementation of the core `Store` trait |
//! | [`articles`] | Article list/add/edit/delete |
//! | [`import_cmd`] | CSV import command |
//! | [`sales`] | Sale recording, monthly history, seeding |
//! | [`server`] | JSON HTTP server |
//! | [`logging`] | Tracing subscriber setup |

pub mod articles;
pub mod config;
pub mod db;
pub mod import_cmd;
pub mod logging;
pub mod migrate;
pub mod sales;
pub mod server;
pub mod sqlite_store;
