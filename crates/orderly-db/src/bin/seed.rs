//! # Seed Data Generator
//!
//! Populates the database with a demo product catalogue for development.
//!
//! ## Usage
//! ```bash
//! # Seed ./order.db
//! cargo run -p orderly-db --bin seed
//!
//! # Specify database URL
//! cargo run -p orderly-db --bin seed -- --db sqlite://./data/order.db
//! ```
//!
//! `DATABASE_URL` is honoured when `--db` is not given, so the seeder and the
//! API server agree on which file to use.

use orderly_core::{Money, NewProduct};
use orderly_db::migrations::migration_status;
use orderly_db::{Database, DbConfig};
use std::env;

/// Demo catalogue: (name, description, price in cents).
const CATALOGUE: &[(&str, &str, i64)] = &[
    ("Espresso Beans 1kg", "Dark roast, whole bean", 2_450),
    ("Filter Papers", "Pack of 100, size 4", 399),
    ("Pour-Over Kettle", "Gooseneck, 1.2 litre", 4_999),
    ("Burr Grinder", "40 grind settings", 12_900),
    ("Ceramic Mug", "350 ml, dishwasher safe", 1_250),
    ("Milk Frother", "Handheld, battery powered", 1_899),
    ("Descaler", "Two treatments", 899),
    ("Travel Tumbler", "Insulated, 470 ml", 2_199),
];

const DEFAULT_DATABASE_URL: &str = "sqlite://./order.db";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut database_url =
        env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string());

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    database_url = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Orderly Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <URL>     Database URL (default: $DATABASE_URL or {DEFAULT_DATABASE_URL})");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            other => {
                eprintln!("Ignoring unknown argument: {other}");
            }
        }
        i += 1;
    }

    println!("🌱 Orderly Seed Data Generator");
    println!("==============================");
    println!("Database: {database_url}");
    println!();

    let db = Database::new(DbConfig::new(&database_url)).await?;

    let (total, applied) = migration_status(db.pool()).await?;
    println!("✓ Connected to database");
    println!("✓ Migrations applied ({applied}/{total})");

    let existing = db.products().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {existing} products");
        println!("  Skipping seed to avoid duplicates.");
        return Ok(());
    }

    let mut generated = 0;
    for (name, description, cents) in CATALOGUE {
        let product = NewProduct {
            name: (*name).to_string(),
            description: (*description).to_string(),
            price: Money::from_cents(*cents),
        };

        match db.products().create(&product).await {
            Ok(created) => {
                println!("  #{:<3} {:<22} {}", created.id, created.name, created.price());
                generated += 1;
            }
            Err(e) => eprintln!("Failed to insert {name}: {e}"),
        }
    }

    db.close().await;

    println!();
    println!("✓ Seed complete! {generated} products created.");

    Ok(())
}
