//! # Seed Data Generator
//!
//! Populates the database with development data: a product catalog, an open
//! purchase order with lines to scan against, and an empty draft sale.
//!
//! ## Usage
//! ```bash
//! # Seed the default database
//! cargo run -p stocktag-db --bin seed
//!
//! # Specify database path
//! cargo run -p stocktag-db --bin seed -- --db ./data/stocktag.db
//! ```

use chrono::Utc;
use std::env;
use stocktag_core::{Product, PurchaseOrder, PurchaseOrderLine};
use stocktag_db::{Database, DbConfig};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

/// Apparel catalog for realistic test data: (sku, name, price cents)
const PRODUCTS: &[(&str, &str, i64)] = &[
    ("TEE-BLK-S", "Black Tee Small", 1999),
    ("TEE-BLK-M", "Black Tee Medium", 1999),
    ("TEE-BLK-L", "Black Tee Large", 1999),
    ("TEE-WHT-M", "White Tee Medium", 1999),
    ("HOOD-GRY-M", "Grey Hoodie Medium", 4999),
    ("HOOD-GRY-L", "Grey Hoodie Large", 4999),
    ("JEAN-BLU-32", "Blue Jeans 32", 5999),
    ("JEAN-BLU-34", "Blue Jeans 34", 5999),
    ("CAP-NVY", "Navy Cap", 1499),
    ("SOCK-3PK", "Socks 3-Pack", 999),
];

/// (product index into PRODUCTS, quantity) for the seeded purchase order
const PO_LINES: &[(usize, i64)] = &[(0, 10), (1, 15), (4, 5), (6, 8)];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .init();

    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./stocktag_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("StockTag Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./stocktag_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 StockTag Seed Data Generator");
    println!("===============================");
    println!("Database: {}", db_path);
    println!();

    let config = DbConfig::new(&db_path);
    let db = Database::new(config).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    if db.products().find_by_sku(PRODUCTS[0].0).await?.is_some() {
        println!("⚠ Database already seeded");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    // Catalog
    let now = Utc::now();
    let mut product_ids = Vec::with_capacity(PRODUCTS.len());
    for (sku, name, price_cents) in PRODUCTS {
        let product = Product {
            id: Uuid::new_v4().to_string(),
            sku: sku.to_string(),
            name: name.to_string(),
            sell_price_cents: *price_cents,
            stock: 0,
            created_at: now,
            updated_at: now,
        };
        db.products().insert(&product).await?;
        product_ids.push(product.id);
    }
    println!("✓ Seeded {} products", PRODUCTS.len());

    // An open purchase order to scan store-mode tags against
    let po = PurchaseOrder {
        id: Uuid::new_v4().to_string(),
        status: "open".to_string(),
        created_at: now,
    };
    db.orders().insert_order(&po).await?;

    for (product_idx, quantity) in PO_LINES {
        let (sku, name, _) = PRODUCTS[*product_idx];
        let line = PurchaseOrderLine {
            id: Uuid::new_v4().to_string(),
            po_id: po.id.clone(),
            product_id: product_ids[*product_idx].clone(),
            sku: sku.to_string(),
            name: name.to_string(),
            quantity: *quantity,
            created_at: now,
        };
        db.orders().insert_line(&line).await?;
        println!("  PO line {} x{}", sku, quantity);
    }
    println!("✓ Seeded purchase order {}", po.id);

    // An empty draft sale to scan sell-mode tags against
    let sale = db.sales().create_sale().await?;
    println!("✓ Seeded draft sale {}", sale.id);

    println!();
    println!("✓ Seed complete!");

    Ok(())
}
