//! # Seed Data Generator
//!
//! Populates a database with one demo business for development.
//!
//! ## Usage
//! ```bash
//! cargo run -p biztrack-db --bin seed
//!
//! # Specify database path
//! cargo run -p biztrack-db --bin seed -- --db ./data/biztrack.db
//! ```
//!
//! ## Generated Data
//! - Business "Demo Provisions" with a verified owner
//!   (`demo@biztrack.local` / `demo-password`)
//! - A dozen products, two of them below their low-stock threshold
//! - Suppliers, sales (one on credit, so a debt too), deliveries and a
//!   production run

use anyhow::{Context, Result};
use argon2::password_hash::{rand_core::OsRng, PasswordHasher, SaltString};
use argon2::Argon2;
use biztrack_core::{
    DeliveryStatus, NewDelivery, NewProduct, NewProduction, NewSale, NewSaleItem, NewSupplier,
    PaymentMethod, ProductionStatus,
};
use biztrack_db::{Database, DbConfig, NewOwner};
use std::env;
use tracing::{info, warn};

const DEMO_EMAIL: &str = "demo@biztrack.local";
const DEMO_PASSWORD: &str = "demo-password";

/// (name, sku, category, price, cost, quantity)
const PRODUCTS: &[(&str, &str, &str, i64, i64, i64)] = &[
    ("Rice 50kg", "GRN-RICE-50", "Grains", 75_000_00, 68_000_00, 14),
    ("Beans 10kg", "GRN-BEAN-10", "Grains", 18_500_00, 16_000_00, 22),
    ("Garri 5kg", "GRN-GARR-05", "Grains", 4_200_00, 3_500_00, 40),
    ("Vegetable Oil 5L", "OIL-VEG-05", "Oils", 12_000_00, 10_500_00, 9),
    ("Palm Oil 4L", "OIL-PLM-04", "Oils", 9_800_00, 8_200_00, 3),
    ("Sugar 1kg", "PNT-SUG-01", "Pantry", 1_600_00, 1_250_00, 55),
    ("Salt 500g", "PNT-SLT-05", "Pantry", 400_00, 280_00, 80),
    ("Tomato Paste 400g", "PNT-TOM-04", "Pantry", 1_100_00, 850_00, 36),
    ("Seasoning Cubes (100)", "PNT-CUB-10", "Pantry", 2_300_00, 1_900_00, 2),
    ("Spaghetti 500g", "PST-SPG-05", "Pasta", 900_00, 700_00, 64),
    ("Noodles Carton", "PST-NDL-40", "Pasta", 8_500_00, 7_600_00, 12),
    ("Chin Chin 250g", "SNK-CHN-25", "Snacks", 1_200_00, 600_00, 18),
];

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,sqlx=warn".into()),
        )
        .init();

    let args: Vec<String> = env::args().collect();
    let mut db_path = String::from("./biztrack.db");

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
                println!("BizTrack Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./biztrack.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            other => warn!(arg = other, "Ignoring unknown argument"),
        }
        i += 1;
    }

    info!(path = %db_path, "Seeding database");
    let db = Database::new(DbConfig::new(&db_path))
        .await
        .context("opening database")?;

    if db.users().find_by_email(DEMO_EMAIL).await?.is_some() {
        warn!(email = DEMO_EMAIL, "Demo account already exists, skipping seed");
        return Ok(());
    }

    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default()
        .hash_password(DEMO_PASSWORD.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("hashing demo password: {e}"))?
        .to_string();

    let (business, owner) = db
        .businesses()
        .register(
            "Demo Provisions",
            "NGN",
            NewOwner {
                name: "Demo Owner".to_string(),
                email: DEMO_EMAIL.to_string(),
                password_hash,
            },
        )
        .await?;
    db.users().mark_verified(&owner.id).await?;
    info!(business_id = %business.id, "Created demo business");

    let mut products = Vec::with_capacity(PRODUCTS.len());
    for (name, sku, category, price, cost, quantity) in PRODUCTS {
        let product = db
            .products()
            .create(
                &business.id,
                NewProduct {
                    name: name.to_string(),
                    sku: Some(sku.to_string()),
                    category: Some(category.to_string()),
                    description: None,
                    unit: "pcs".to_string(),
                    price_cents: *price,
                    cost_cents: *cost,
                    quantity: *quantity,
                    low_stock_threshold: None,
                },
            )
            .await
            .with_context(|| format!("creating product {sku}"))?;
        products.push(product);
    }
    info!(count = products.len(), "Created products");

    let mill = db
        .suppliers()
        .create(
            &business.id,
            NewSupplier {
                name: "Northern Grain Mills".to_string(),
                contact_name: Some("Aliyu Bello".to_string()),
                email: Some("orders@ngmills.example".to_string()),
                phone: Some("+2348030000001".to_string()),
                address: Some("Kano".to_string()),
                notes: None,
            },
        )
        .await?;
    db.suppliers()
        .create(
            &business.id,
            NewSupplier {
                name: "Lagos Oil Depot".to_string(),
                contact_name: None,
                email: None,
                phone: Some("+2348030000002".to_string()),
                address: Some("Apapa, Lagos".to_string()),
                notes: Some("Cash on delivery only".to_string()),
            },
        )
        .await?;

    db.sales()
        .create(
            &business.id,
            Some(owner.id.as_str()),
            NewSale {
                customer_name: Some("Mrs. Okafor".to_string()),
                customer_phone: None,
                payment_method: PaymentMethod::Cash,
                amount_paid_cents: None,
                due_date: None,
                notes: None,
                items: vec![
                    NewSaleItem {
                        product_id: products[0].id.clone(),
                        quantity: 1,
                        unit_price_cents: None,
                    },
                    NewSaleItem {
                        product_id: products[5].id.clone(),
                        quantity: 4,
                        unit_price_cents: None,
                    },
                ],
            },
        )
        .await?;

    let (_, debt) = db
        .sales()
        .create(
            &business.id,
            Some(owner.id.as_str()),
            NewSale {
                customer_name: Some("Chidi Stores".to_string()),
                customer_phone: Some("+2348030000003".to_string()),
                payment_method: PaymentMethod::Credit,
                amount_paid_cents: Some(10_000_00),
                due_date: Some(chrono::Utc::now() + chrono::Duration::days(14)),
                notes: Some("Pays every other Friday".to_string()),
                items: vec![NewSaleItem {
                    product_id: products[3].id.clone(),
                    quantity: 3,
                    unit_price_cents: None,
                }],
            },
        )
        .await?;
    if let Some(debt) = debt {
        info!(debt_id = %debt.id, outstanding = %debt.outstanding(), "Recorded credit sale");
    }

    db.deliveries()
        .create(
            &business.id,
            NewDelivery {
                supplier_id: Some(mill.id.clone()),
                customer_name: None,
                address: Some("Shop 14, Balogun Market".to_string()),
                status: DeliveryStatus::InTransit,
                scheduled_at: Some(chrono::Utc::now() + chrono::Duration::days(2)),
                notes: Some("20 bags of rice".to_string()),
            },
        )
        .await?;

    db.productions()
        .create(
            &business.id,
            NewProduction {
                product_id: products[11].id.clone(),
                quantity: 30,
                cost_cents: 15_000_00,
                status: ProductionStatus::Planned,
                notes: Some("Weekend batch".to_string()),
            },
        )
        .await?;

    let low = db.products().low_stock(&business.id).await?;
    info!(low_stock = low.len(), "Seed complete");
    println!("Sign in with {DEMO_EMAIL} / {DEMO_PASSWORD}");

    db.close().await;
    Ok(())
}
