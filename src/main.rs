//! # Stockroom CLI (`stockroom`)
//!
//! Commands for database initialization, article maintenance, CSV import,
//! sale recording, monthly sales history, demo seeding, and the HTTP server.
//!
//! ## Usage
//!
//! ```bash
//! stockroom --config ./config/stockroom.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `stockroom init` | Create the SQLite database and run schema migrations |
//! | `stockroom list` | List all articles ordered by code |
//! | `stockroom add` | Add one article |
//! | `stockroom edit <code>` | Change an article's quantity and unit price |
//! | `stockroom delete <code>` | Delete an article and its sales |
//! | `stockroom import <file>` | Bulk-import articles from CSV |
//! | `stockroom sale record <code>` | Record a sale |
//! | `stockroom sale history <code>` | Monthly sales chart for one article |
//! | `stockroom seed` | Generate synthetic sales for every article |
//! | `stockroom serve` | Start the JSON HTTP server |

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use stockroom::{articles, config, import_cmd, logging, migrate, sales, server};
use stockroom_core::models::NewArticle;
use stockroom_core::seed::SeedPlan;

/// Stockroom CLI: a small inventory manager.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file with `[db]` and `[server]` sections.
#[derive(Parser)]
#[command(
    name = "stockroom",
    about = "Stockroom: articles, CSV import, and monthly sales history",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/stockroom.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// Initialize the database schema.
    ///
    /// Creates the SQLite database file and the `articles` and `sales`
    /// tables. Idempotent.
    Init,

    /// List all articles ordered by code.
    List,

    /// Add an article.
    Add {
        /// Unique article code.
        #[arg(long)]
        code: String,

        /// Unique article name.
        #[arg(long)]
        name: String,

        #[arg(long)]
        description: String,

        /// Units in stock (at least 1).
        #[arg(long)]
        quantity: i64,

        /// Price per unit (at least 0.01).
        #[arg(long)]
        unit_price: f64,
    },

    /// Update an article's stock quantity and unit price.
    Edit {
        code: String,

        #[arg(long)]
        quantity: i64,

        #[arg(long)]
        unit_price: f64,
    },

    /// Delete an article together with its recorded sales.
    Delete { code: String },

    /// Import articles from a CSV file.
    ///
    /// The header must contain `code,name,description,quantity,unit_price`.
    /// Rows whose code already exists are skipped; malformed rows are
    /// reported and skipped. All new rows are committed together.
    Import {
        /// Path to the CSV file.
        file: PathBuf,
    },

    /// Record sales and show sales history.
    Sale {
        #[command(subcommand)]
        action: SaleAction,
    },

    /// Generate synthetic sales for every article (demo data).
    Seed {
        /// Calendar months to cover, ending with the current month.
        #[arg(long, default_value_t = 12)]
        months: u32,

        /// Upper bound of sale events per article per month.
        #[arg(long, default_value_t = 5)]
        max_per_month: u32,

        /// Upper bound of a single sale's quantity.
        #[arg(long, default_value_t = 10)]
        max_quantity: i64,

        /// Seed for a reproducible run.
        #[arg(long)]
        rng_seed: Option<u64>,
    },

    /// Start the JSON HTTP server on `[server].bind`.
    Serve,
}

/// Sale subcommands.
#[derive(Subcommand)]
enum SaleAction {
    /// Record one sale of an article.
    Record {
        code: String,

        /// Units sold (at least 1).
        #[arg(long)]
        quantity: i64,

        /// Sale date (YYYY-MM-DD). Defaults to today.
        #[arg(long)]
        date: Option<String>,
    },

    /// Print the monthly sales series of an article as a bar chart.
    History { code: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let cfg = config::load_config(&cli.config)?;
    logging::init(&cfg);

    match cli.command {
        Commands::Init => {
            migrate::run_migrations(&cfg).await?;
            println!("Database initialized successfully.");
        }
        Commands::List => {
            articles::run_list(&cfg).await?;
        }
        Commands::Add {
            code,
            name,
            description,
            quantity,
            unit_price,
        } => {
            let article = NewArticle {
                code,
                name,
                description,
                quantity,
                unit_price,
            };
            articles::run_add(&cfg, article).await?;
        }
        Commands::Edit {
            code,
            quantity,
            unit_price,
        } => {
            articles::run_edit(&cfg, &code, quantity, unit_price).await?;
        }
        Commands::Delete { code } => {
            articles::run_delete(&cfg, &code).await?;
        }
        Commands::Import { file } => {
            import_cmd::run_import(&cfg, &file).await?;
        }
        Commands::Sale { action } => match action {
            SaleAction::Record {
                code,
                quantity,
                date,
            } => {
                sales::run_record(&cfg, &code, quantity, date).await?;
            }
            SaleAction::History { code } => {
                sales::run_history(&cfg, &code).await?;
            }
        },
        Commands::Seed {
            months,
            max_per_month,
            max_quantity,
            rng_seed,
        } => {
            let plan = SeedPlan {
                months,
                max_events_per_month: max_per_month,
                max_quantity,
            };
            sales::run_seed(&cfg, plan, rng_seed).await?;
        }
        Commands::Serve => {
            server::run_server(&cfg).await?;
        }
    }

    Ok(())
}
