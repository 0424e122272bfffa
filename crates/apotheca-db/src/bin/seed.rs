//! # Seed Data Generator
//!
//! Populates a database with a small demo pharmacy for development.
//!
//! ## Usage
//! ```bash
//! # Seed ./apotheca_dev.db
//! cargo run -p apotheca-db --bin seed
//!
//! # Specify database path
//! cargo run -p apotheca-db --bin seed -- --db ./data/apotheca.db
//! ```
//!
//! ## Generated Data
//! - One inventory item per row of `CATALOGUE`, each with two batches
//!   (one expiring soon, one later)
//! - A walk-in customer, a wholesale supplier and a bank account
//! - One cash sale so reports are not empty

use chrono::{Days, Utc};
use std::env;

use apotheca_core::{
    BankAccountInput, BatchInput, CustomerInput, InventoryItemInput, ItemType, NewSale,
    NewSaleLine, PaymentMethod, SupplierInput,
};
use apotheca_db::{Database, DbConfig};

/// (code, name, type, unit, sub-unit, units per pack, sell cents per unit)
const CATALOGUE: &[(&str, &str, ItemType, &str, Option<&str>, Option<i64>, i64)] = &[
    ("PARA-500", "Paracetamol 500mg", ItemType::Tablet, "strip", Some("tablet"), Some(10), 250),
    ("IBU-400", "Ibuprofen 400mg", ItemType::Tablet, "strip", Some("tablet"), Some(10), 380),
    ("AMOX-250", "Amoxicillin 250mg", ItemType::Capsule, "strip", Some("capsule"), Some(8), 620),
    ("ORS-1", "Oral Rehydration Salts", ItemType::Other, "sachet", None, None, 90),
    ("COUGH-120", "Cough Syrup 120ml", ItemType::Syrup, "bottle", None, None, 450),
    ("EYE-10", "Lubricant Eye Drops 10ml", ItemType::Drops, "bottle", None, None, 700),
    ("HC-1", "Hydrocortisone Cream 1%", ItemType::Cream, "tube", None, None, 550),
    ("INS-10", "Insulin Pen 3ml", ItemType::Injection, "box", Some("pen"), Some(5), 9_500),
    ("THERMO", "Digital Thermometer", ItemType::Device, "piece", None, None, 1_200),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./apotheca_dev.db");

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
                println!("Apotheca POS Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./apotheca_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("Apotheca POS Seed Data Generator");
    println!("================================");
    println!("Database: {}", db_path);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;
    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.inventory().list_items(None).await?;
    if !existing.is_empty() {
        println!("⚠ Database already has {} items", existing.len());
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    let today = Utc::now().date_naive();
    let soon = today.checked_add_days(Days::new(45)).unwrap_or(today);
    let later = today.checked_add_days(Days::new(540)).unwrap_or(today);

    println!();
    println!("Creating items and batches...");

    let mut first_sale_line = None;

    for (code, name, item_type, unit, sub_unit, per_pack, sell_cents) in CATALOGUE {
        let item = db
            .inventory()
            .create_item(&InventoryItemInput {
                code: code.to_string(),
                name: name.to_string(),
                item_type: *item_type,
                unit_name: Some(unit.to_string()),
                sub_unit_name: sub_unit.map(str::to_string),
                units_per_pack: *per_pack,
                min_stock: 5 * per_pack.unwrap_or(1),
            })
            .await?;

        let factor = per_pack.unwrap_or(1);
        let mut batch_ids = Vec::new();
        for (suffix, expiry, packs) in [("A", soon, 4), ("B", later, 20)] {
            let batch = db
                .inventory()
                .create_batch(
                    &item.id,
                    &BatchInput {
                        batch_number: format!("{code}-{suffix}"),
                        quantity: packs * factor,
                        cost_price_cents: sell_cents * 7 / 10,
                        sell_price_cents: *sell_cents,
                        expiry_date: expiry,
                    },
                )
                .await?;
            batch_ids.push(batch.id);
        }

        if first_sale_line.is_none() && per_pack.is_some() {
            first_sale_line = Some(NewSaleLine {
                item_id: item.id.clone(),
                batch_id: batch_ids[0].clone(),
                unit_quantity: 1,
                sub_unit_quantity: 2,
                unit_price_cents: None,
            });
        }

        println!("  {} ({} batches)", item.code, batch_ids.len());
    }

    let customer = db
        .customers()
        .create(&CustomerInput {
            name: "Walk-in Customer".to_string(),
            phone: None,
            email: None,
            address: None,
        })
        .await?;

    db.suppliers()
        .create(&SupplierInput {
            name: "City Pharma Distributors".to_string(),
            contact_person: Some("Sales Desk".to_string()),
            phone: Some("042-111-222-333".to_string()),
            email: Some("orders@citypharma.example".to_string()),
            address: None,
        })
        .await?;

    db.bank_accounts()
        .create(&BankAccountInput {
            name: "Operating Account".to_string(),
            account_number: "PK-0001-2345".to_string(),
            opening_balance_cents: 250_000,
        })
        .await?;

    if let Some(line) = first_sale_line {
        let detail = db
            .sales()
            .create(&NewSale {
                customer_id: Some(customer.id),
                payment_method: PaymentMethod::Cash,
                bank_account_id: None,
                discount_cents: 0,
                notes: Some("Seed sale".to_string()),
                items: vec![line],
            })
            .await?;
        println!();
        println!("✓ Sale {} ({})", detail.sale.invoice_number, detail.sale.total());
    }

    println!();
    println!("✓ Seed complete!");

    Ok(())
}
