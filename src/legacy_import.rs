//! Imports the JSON files written by earlier versions of the application.
//!
//! The data directory may contain any of `categories.json`, `transactions.json`
//! and `assets.json`. Files that do not exist are skipped. Records that fail
//! validation are logged and skipped, while I/O errors, malformed JSON and SQL
//! errors abort the import without changing the database.

use std::{fs, io::ErrorKind, path::Path};

use rusqlite::Connection;
use serde::{Deserialize, de::DeserializeOwned};
use serde_json::Value;
use time::{
    OffsetDateTime, PrimitiveDateTime,
    format_description::well_known::Rfc3339,
    macros::format_description,
};

use crate::{
    Error, Kind,
    asset::{Asset, AssetType, create_asset},
    category::{CategoryId, CategoryName, create_category, find_category},
    transaction::{Transaction, create_transaction, validate_amount},
    validation::{parse_amount, parse_date},
};

/// The name of the legacy category file.
pub const CATEGORIES_FILE: &str = "categories.json";
/// The name of the legacy transaction file.
pub const TRANSACTIONS_FILE: &str = "transactions.json";
/// The name of the legacy asset file.
pub const ASSETS_FILE: &str = "assets.json";

/// Counts of what a legacy import changed.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ImportReport {
    /// Categories that did not exist yet and were created.
    pub categories_created: usize,
    /// Transactions that were stored.
    pub transactions_imported: usize,
    /// Transaction records that were invalid and ignored.
    pub transactions_skipped: usize,
    /// Assets that were stored.
    pub assets_imported: usize,
    /// Asset records that were invalid and ignored.
    pub assets_skipped: usize,
}

#[derive(Debug, Default, Deserialize)]
struct LegacyCategories {
    #[serde(default)]
    income: Vec<String>,
    #[serde(default)]
    expense: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct LegacyTransaction {
    amount: Option<Value>,
    category: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
    description: Option<String>,
    date: Option<String>,
    created_at: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct LegacyAssets {
    cash: Option<Value>,
    #[serde(default)]
    bank_accounts: Vec<Value>,
    #[serde(default)]
    investments: Vec<Value>,
    #[serde(default)]
    real_estate: Vec<Value>,
    #[serde(default)]
    other: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct LegacyAsset {
    name: Option<String>,
    amount: Option<Value>,
    currency: Option<String>,
    description: Option<String>,
}

/// Import the legacy JSON files in `data_dir` into the database.
///
/// All changes are made in a single SQL transaction that is only committed if
/// every file was read and parsed.
///
/// # Errors
/// This function will return a:
/// - [Error::LegacyDataReadError] if a file exists but cannot be read,
/// - [Error::LegacyDataParseError] if a file is not valid JSON of the expected shape,
/// - or [Error::SqlError] if there is an SQL error.
pub fn import_legacy_data(
    data_dir: &Path,
    connection: &mut Connection,
) -> Result<ImportReport, Error> {
    let categories: Option<LegacyCategories> = read_json_file(&data_dir.join(CATEGORIES_FILE))?;
    let transactions: Option<Vec<Value>> = read_json_file(&data_dir.join(TRANSACTIONS_FILE))?;
    let assets: Option<LegacyAssets> = read_json_file(&data_dir.join(ASSETS_FILE))?;

    let sql_transaction = connection.transaction()?;
    let mut report = ImportReport::default();

    if let Some(categories) = categories {
        import_categories(categories, &sql_transaction, &mut report)?;
    }

    if let Some(transactions) = transactions {
        import_transactions(transactions, &sql_transaction, &mut report)?;
    }

    if let Some(assets) = assets {
        import_assets(assets, &sql_transaction, &mut report)?;
    }

    sql_transaction.commit()?;

    tracing::info!(
        "Imported {} categories, {} transactions ({} skipped) and {} assets ({} skipped) from {}",
        report.categories_created,
        report.transactions_imported,
        report.transactions_skipped,
        report.assets_imported,
        report.assets_skipped,
        data_dir.display()
    );

    Ok(report)
}

fn read_json_file<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, Error> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(error) if error.kind() == ErrorKind::NotFound => {
            tracing::debug!("{} does not exist, skipping", path.display());
            return Ok(None);
        }
        Err(error) => {
            return Err(Error::LegacyDataReadError(
                path.display().to_string(),
                error.to_string(),
            ));
        }
    };

    serde_json::from_str(&text)
        .map(Some)
        .map_err(|error| Error::LegacyDataParseError(path.display().to_string(), error.to_string()))
}

/// Find the category with `name` and `kind`, creating it if it does not exist.
fn get_or_create_category(
    name: &str,
    kind: Kind,
    connection: &Connection,
    report: &mut ImportReport,
) -> Result<CategoryId, Error> {
    let name = CategoryName::new(name)?;

    if let Some(category) = find_category(&name, kind, connection)? {
        return Ok(category.id);
    }

    let category = create_category(name, kind, connection)?;
    report.categories_created += 1;

    Ok(category.id)
}

fn import_categories(
    categories: LegacyCategories,
    connection: &Connection,
    report: &mut ImportReport,
) -> Result<(), Error> {
    let names = categories
        .income
        .iter()
        .map(|name| (name, Kind::Income))
        .chain(categories.expense.iter().map(|name| (name, Kind::Expense)));

    for (name, kind) in names {
        match get_or_create_category(name, kind, connection, report) {
            Ok(_) => {}
            Err(Error::EmptyCategoryName) => {
                tracing::warn!("Skipping {kind} category with an empty name");
            }
            Err(error) => return Err(error),
        }
    }

    Ok(())
}

fn import_transactions(
    records: Vec<Value>,
    connection: &Connection,
    report: &mut ImportReport,
) -> Result<(), Error> {
    for (index, record) in records.into_iter().enumerate() {
        match import_transaction(record, connection, report) {
            Ok(()) => report.transactions_imported += 1,
            Err(error) if error.status_code().is_server_error() => return Err(error),
            Err(error) => {
                tracing::warn!("Skipping transaction record {index}: {error}");
                report.transactions_skipped += 1;
            }
        }
    }

    Ok(())
}

fn import_transaction(
    record: Value,
    connection: &Connection,
    report: &mut ImportReport,
) -> Result<(), Error> {
    let record: LegacyTransaction = serde_json::from_value(record)
        .map_err(|error| Error::InvalidRequestBody(error.to_string()))?;

    let kind: Kind = record.kind.ok_or(Error::MissingField("type"))?.parse()?;
    let amount = parse_amount(&record.amount.ok_or(Error::MissingField("amount"))?)?;
    validate_amount(amount)?;
    let date = parse_date(&record.date.ok_or(Error::MissingField("date"))?)?;

    let category_id = match record.category.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(name) => Some(get_or_create_category(name, kind, connection, report)?),
    };

    let description = record.description.filter(|text| !text.is_empty());
    let created_at = record.created_at.as_deref().and_then(parse_legacy_timestamp);

    create_transaction(
        Transaction::build(kind, amount, date)
            .category_id(category_id)
            .description(description)
            .created_at(created_at),
        connection,
    )?;

    Ok(())
}

/// Parse a legacy `created_at` value.
///
/// Older files store naive ISO 8601 timestamps, which are read as UTC. Returns
/// `None` when the text is not a timestamp, in which case the import time is used.
fn parse_legacy_timestamp(text: &str) -> Option<OffsetDateTime> {
    if let Ok(timestamp) = OffsetDateTime::parse(text, &Rfc3339) {
        return Some(timestamp);
    }

    let naive_format = format_description!(
        "[year]-[month]-[day]T[hour]:[minute]:[second][optional [.[subsecond]]]"
    );

    match PrimitiveDateTime::parse(text, naive_format) {
        Ok(timestamp) => Some(timestamp.assume_utc()),
        Err(error) => {
            tracing::warn!("Ignoring invalid created_at \"{text}\": {error}");
            None
        }
    }
}

fn import_assets(
    assets: LegacyAssets,
    connection: &Connection,
    report: &mut ImportReport,
) -> Result<(), Error> {
    let records = assets
        .cash
        .into_iter()
        .map(|record| (record, AssetType::Cash))
        .chain(assets.bank_accounts.into_iter().map(|record| (record, AssetType::Bank)))
        .chain(
            assets
                .investments
                .into_iter()
                .map(|record| (record, AssetType::Investment)),
        )
        .chain(
            assets
                .real_estate
                .into_iter()
                .map(|record| (record, AssetType::RealEstate)),
        )
        .chain(assets.other.into_iter().map(|record| (record, AssetType::Other)));

    for (record, asset_type) in records {
        match import_asset(record, asset_type, connection) {
            Ok(()) => report.assets_imported += 1,
            Err(error) if error.status_code().is_server_error() => return Err(error),
            Err(error) => {
                tracing::warn!("Skipping {asset_type} asset record: {error}");
                report.assets_skipped += 1;
            }
        }
    }

    Ok(())
}

fn import_asset(record: Value, asset_type: AssetType, connection: &Connection) -> Result<(), Error> {
    let record: LegacyAsset = serde_json::from_value(record)
        .map_err(|error| Error::InvalidRequestBody(error.to_string()))?;

    let name = record.name.ok_or(Error::MissingField("name"))?;
    let amount = match record.amount {
        Some(amount) => parse_amount(&amount)?,
        None => 0.0,
    };

    let mut new_asset = Asset::build(&name, asset_type, amount).description(record.description);
    if let Some(currency) = record.currency {
        new_asset = new_asset.currency(&currency);
    }

    create_asset(new_asset, connection)?;

    Ok(())
}
