use std::error::Error;
use std::path::Path;
use std::process::exit;

use clap::Parser;
use rusqlite::Connection;

use asset_manager::{count_transactions, import_legacy_data, initialize_db};

/// A utility for importing the JSON data files of earlier versions of asset_manager.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to the application SQLite database.
    #[arg(long)]
    db_path: String,

    /// The directory containing categories.json, transactions.json and assets.json.
    #[arg(long, default_value = "data")]
    data_dir: String,
}

/// Copy the legacy JSON data into the database.
fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();

    let data_dir = Path::new(&args.data_dir);
    if !data_dir.is_dir() {
        eprintln!("Data directory {data_dir:#?} does not exist!");
        exit(1);
    }

    println!("Importing {data_dir:#?} into {:#?}", args.db_path);
    let mut conn = Connection::open(&args.db_path)?;

    initialize_db(&conn)?;

    let report = import_legacy_data(data_dir, &mut conn)?;

    println!("Categories created: {}", report.categories_created);
    println!(
        "Transactions imported: {} (skipped {})",
        report.transactions_imported, report.transactions_skipped
    );
    println!(
        "Assets imported: {} (skipped {})",
        report.assets_imported, report.assets_skipped
    );
    println!("Transactions in database: {}", count_transactions(&conn)?);

    println!("Success!");

    Ok(())
}
