//! # Inventory Importer
//!
//! Loads inventory and product files into the database, optionally runs a
//! sale, and prints every product with its current availability.
//!
//! ## Usage
//! ```bash
//! # Load articles and products into ./stockroom.db
//! cargo run -p stockroom-db --bin stockroom-import -- \
//!     --inventory inventory.json --products products.json
//!
//! # Sell from a {"data": [{"productID": 1, "amount": 2}]} file
//! cargo run -p stockroom-db --bin stockroom-import -- --sale sale.json
//!
//! # Specify database path (overrides STOCKROOM_DATABASE_PATH)
//! cargo run -p stockroom-db --bin stockroom-import -- --db ./data/stockroom.db
//! ```
//!
//! Articles are upserted by id, so re-running with a newer inventory file
//! overwrites stock levels. Products are always created anew.

use std::env;
use std::fs;

use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

use stockroom_core::import::{parse_inventory, parse_products, parse_sale_request};
use stockroom_core::{Page, ProductView, SaleCoordinator, TransactionRecord};
use stockroom_db::{Database, DbConfig};

#[derive(Debug, Default)]
struct Args {
    inventory: Option<String>,
    products: Option<String>,
    sale: Option<String>,
    db: Option<String>,
}

#[derive(Debug, Serialize)]
struct Report {
    articles_imported: usize,
    products_imported: usize,
    sale: Option<TransactionRecord>,
    products: Vec<ProductView>,
}

fn print_help() {
    println!("Stockroom Importer");
    println!();
    println!("Usage: stockroom-import [OPTIONS]");
    println!();
    println!("Options:");
    println!("  -i, --inventory <FILE>  Inventory file to upsert");
    println!("  -p, --products <FILE>   Product file to create");
    println!("  -s, --sale <FILE>       Sale request to execute after importing");
    println!("  -d, --db <PATH>         Database file path (default: $STOCKROOM_DATABASE_PATH)");
    println!("  -h, --help              Show this help message");
}

/// Returns `None` when help was requested.
fn parse_args() -> Result<Option<Args>, String> {
    let mut args = Args::default();
    let mut iter = env::args().skip(1);

    while let Some(flag) = iter.next() {
        let slot = match flag.as_str() {
            "--inventory" | "-i" => &mut args.inventory,
            "--products" | "-p" => &mut args.products,
            "--sale" | "-s" => &mut args.sale,
            "--db" | "-d" => &mut args.db,
            "--help" | "-h" => return Ok(None),
            other => return Err(format!("unknown argument '{}'", other)),
        };
        let value = iter
            .next()
            .ok_or_else(|| format!("{} needs a value", flag))?;
        *slot = Some(value);
    }

    Ok(Some(args))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn")),
        )
        .with_target(false)
        .init();

    let Some(args) = parse_args()? else {
        print_help();
        return Ok(());
    };

    let mut config = DbConfig::from_env()?;
    if let Some(path) = &args.db {
        config = DbConfig {
            database_path: path.into(),
            ..config
        };
    }

    let db = Database::new(config).await?;
    info!("Connected to database");

    let mut report = Report {
        articles_imported: 0,
        products_imported: 0,
        sale: None,
        products: Vec::new(),
    };

    if let Some(path) = &args.inventory {
        let articles = parse_inventory(&fs::read_to_string(path)?)?;
        report.articles_imported = db.articles().upsert_many(&articles).await?.len();
    }

    if let Some(path) = &args.products {
        let products = parse_products(&fs::read_to_string(path)?)?;
        report.products_imported = db.products().create_many(&products).await?.len();
    }

    if let Some(path) = &args.sale {
        let request = parse_sale_request(&fs::read_to_string(path)?)?;
        let record = SaleCoordinator::new(db.sales()).execute_sale(&request).await?;
        report.sale = Some(record);
    }

    let mut page = Page::first();
    loop {
        let batch = db.products().list(page).await?;
        let done = (batch.len() as i64) < page.limit;
        report.products.extend(batch);
        if done {
            break;
        }
        page = page.next();
    }

    println!("{}", serde_json::to_string_pretty(&report)?);

    db.close().await;
    Ok(())
}
