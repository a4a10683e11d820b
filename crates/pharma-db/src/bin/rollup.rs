//! # Daily KPI Roll-up Job
//!
//! Recomputes every (branch, day) summary from the full sales-record
//! history and replaces the summary table.
//!
//! ## Usage
//! ```bash
//! # Roll up against the default database
//! cargo run -p pharma-db --bin rollup
//!
//! # Specify database path
//! cargo run -p pharma-db --bin rollup -- --db ./data/pharmacy.db
//! ```
//!
//! Run one instance at a time; the job assumes exclusive write access to
//! the summary table.

use std::env;

use pharma_db::{run_daily_rollup, Database, DbConfig};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    // Parse command line arguments
    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./pharmacy.db");

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
                println!("Pharmacy KPI Daily Roll-up");
                println!();
                println!("Usage: rollup [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./pharmacy.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("Pharmacy KPI Daily Roll-up");
    println!("==========================");
    println!("Database: {}", db_path);
    println!();

    let config = DbConfig::new(&db_path);
    let db = Database::new(config).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let record_count = db.records().count().await?;
    println!("✓ {} sales records in history", record_count);
    println!();
    println!("Rolling up...");

    let start = std::time::Instant::now();
    let written = run_daily_rollup(&db).await?;

    println!();
    println!(
        "✓ Wrote {} daily summaries in {:.2}s",
        written,
        start.elapsed().as_secs_f64()
    );

    db.close().await;
    Ok(())
}
