//! Database operations for assets.

use std::collections::BTreeMap;

use rusqlite::{Connection, Row, ToSql, params_from_iter};
use serde::Serialize;
use time::OffsetDateTime;

use crate::{
    Error,
    asset::{
        Asset, AssetId, AssetType, AssetUpdate, NewAsset,
        domain::{normalize_currency, normalize_name, validate_asset_amount},
    },
};

/// The combined value of all assets.
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct AssetTotals {
    /// The sum of every asset amount, regardless of currency.
    pub total: f64,
    /// The sum of asset amounts for each asset type, every type is listed.
    pub by_type: BTreeMap<AssetType, f64>,
}

/// Store a new asset and return it with its generated ID.
///
/// # Errors
/// This function will return a:
/// - [Error::EmptyAssetName] or [Error::EmptyCurrency] for blank text,
/// - [Error::NegativeAssetAmount] or [Error::InvalidAmount] for a bad amount,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_asset(new_asset: NewAsset, connection: &Connection) -> Result<Asset, Error> {
    let name = normalize_name(&new_asset.name)?;
    let currency = normalize_currency(&new_asset.currency)?;
    validate_asset_amount(new_asset.amount)?;

    let now = OffsetDateTime::now_utc();

    connection.execute(
        "INSERT INTO assets (name, type, amount, currency, description, created_at, updated_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)",
        (
            &name,
            new_asset.asset_type,
            new_asset.amount,
            &currency,
            &new_asset.description,
            now,
        ),
    )?;

    let id = connection.last_insert_rowid();
    tracing::debug!("Created asset {id}");

    get_asset(id, connection)
}

/// Retrieve an asset by its `id`.
///
/// # Errors
/// Returns [Error::NotFound] if `id` does not refer to an asset.
pub fn get_asset(id: AssetId, connection: &Connection) -> Result<Asset, Error> {
    connection
        .prepare(
            "SELECT id, name, type, amount, currency, description, created_at, updated_at
            FROM assets WHERE id = :id",
        )?
        .query_row(&[(":id", &id)], map_asset_row)
        .map_err(|error| error.into())
}

/// Retrieve assets ordered by type and then name, optionally only those of `asset_type`.
pub fn list_assets(
    asset_type: Option<AssetType>,
    connection: &Connection,
) -> Result<Vec<Asset>, Error> {
    connection
        .prepare(
            "SELECT id, name, type, amount, currency, description, created_at, updated_at
            FROM assets
            WHERE (?1 IS NULL OR type = ?1)
            ORDER BY type ASC, name ASC, id ASC",
        )?
        .query_map([asset_type], map_asset_row)?
        .map(|maybe_asset| maybe_asset.map_err(|error| error.into()))
        .collect()
}

/// Apply `update` to the asset with `id` and refresh its `updated_at`.
///
/// Returns `false` if `update` is empty or no asset has the ID `id`.
///
/// # Errors
/// Returns the same validation errors as [create_asset] for the changed fields,
/// or [Error::SqlError] if there is some other SQL error.
pub fn update_asset(id: AssetId, update: AssetUpdate, connection: &Connection) -> Result<bool, Error> {
    if update.is_empty() {
        return Ok(false);
    }

    let mut assignments: Vec<&str> = Vec::new();
    let mut params: Vec<Box<dyn ToSql>> = Vec::new();

    if let Some(name) = update.name {
        assignments.push("name = ?");
        params.push(Box::new(normalize_name(&name)?));
    }

    if let Some(asset_type) = update.asset_type {
        assignments.push("type = ?");
        params.push(Box::new(asset_type));
    }

    if let Some(amount) = update.amount {
        validate_asset_amount(amount)?;
        assignments.push("amount = ?");
        params.push(Box::new(amount));
    }

    if let Some(currency) = update.currency {
        assignments.push("currency = ?");
        params.push(Box::new(normalize_currency(&currency)?));
    }

    if let Some(description) = update.description {
        assignments.push("description = ?");
        params.push(Box::new(description));
    }

    assignments.push("updated_at = ?");
    params.push(Box::new(OffsetDateTime::now_utc()));

    params.push(Box::new(id));

    let query = format!("UPDATE assets SET {} WHERE id = ?", assignments.join(", "));
    let rows_affected = connection.execute(&query, params_from_iter(params))?;

    Ok(rows_affected > 0)
}

/// Delete an asset by ID.
///
/// Returns `false` if no asset has the ID `id`.
pub fn delete_asset(id: AssetId, connection: &Connection) -> Result<bool, Error> {
    let rows_affected = connection.execute("DELETE FROM assets WHERE id = :id", &[(":id", &id)])?;

    Ok(rows_affected > 0)
}

/// Sum the amounts of all assets, in total and per asset type.
///
/// # Errors
/// Returns [Error::SqlError] if there is an SQL error.
pub fn get_total_assets(connection: &Connection) -> Result<AssetTotals, Error> {
    let mut totals = AssetTotals::default();

    for asset_type in [
        AssetType::Cash,
        AssetType::Bank,
        AssetType::Investment,
        AssetType::RealEstate,
        AssetType::Other,
    ] {
        totals.by_type.insert(asset_type, 0.0);
    }

    let mut statement =
        connection.prepare("SELECT type, COALESCE(SUM(amount), 0) FROM assets GROUP BY type")?;
    let rows = statement.query_map([], |row| {
        Ok((row.get::<_, AssetType>(0)?, row.get::<_, f64>(1)?))
    })?;

    for row in rows {
        let (asset_type, amount) = row?;
        totals.by_type.insert(asset_type, amount);
        totals.total += amount;
    }

    Ok(totals)
}

/// Create the asset table in the database.
pub fn create_asset_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS assets (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            type TEXT NOT NULL CHECK (type IN ('cash', 'bank', 'investment', 'real_estate', 'other')),
            amount REAL NOT NULL DEFAULT 0 CHECK (amount >= 0),
            currency TEXT NOT NULL DEFAULT 'KRW',
            description TEXT,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        );

        CREATE INDEX IF NOT EXISTS idx_assets_type_name ON assets(type, name);",
    )?;

    Ok(())
}

fn map_asset_row(row: &Row) -> Result<Asset, rusqlite::Error> {
    Ok(Asset {
        id: row.get(0)?,
        name: row.get(1)?,
        asset_type: row.get(2)?,
        amount: row.get(3)?,
        currency: row.get(4)?,
        description: row.get(5)?,
        created_at: row.get(6)?,
        updated_at: row.get(7)?,
    })
}

#[cfg(test)]
mod asset_query_tests {
    use rusqlite::Connection;

    use crate::{
        Error,
        asset::{Asset, AssetType, AssetUpdate},
        db::initialize,
    };

    use super::{
        create_asset, delete_asset, get_asset, get_total_assets, list_assets, update_asset,
    };

    fn get_test_connection() -> Connection {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        connection
    }

    #[test]
    fn create_uses_default_currency() {
        let connection = get_test_connection();

        let asset = create_asset(Asset::build("지갑", AssetType::Cash, 50000.0), &connection)
            .expect("Could not create asset");

        assert!(asset.id > 0);
        assert_eq!(asset.currency, "KRW");
        assert_eq!(get_asset(asset.id, &connection), Ok(asset));
    }

    #[test]
    fn create_normalizes_text() {
        let connection = get_test_connection();

        let asset = create_asset(
            Asset::build("  Brokerage ", AssetType::Investment, 1200.0)
                .currency("usd")
                .description(Some("index funds".to_owned())),
            &connection,
        )
        .unwrap();

        assert_eq!(asset.name, "Brokerage");
        assert_eq!(asset.currency, "USD");
        assert_eq!(asset.description.as_deref(), Some("index funds"));
    }

    #[test]
    fn create_rejects_invalid_assets() {
        let connection = get_test_connection();

        assert_eq!(
            create_asset(Asset::build("  ", AssetType::Cash, 1.0), &connection),
            Err(Error::EmptyAssetName)
        );
        assert_eq!(
            create_asset(Asset::build("Cash", AssetType::Cash, -1.0), &connection),
            Err(Error::NegativeAssetAmount(-1.0))
        );
        assert_eq!(
            create_asset(Asset::build("Cash", AssetType::Cash, 1.0).currency(""), &connection),
            Err(Error::EmptyCurrency)
        );
        assert_eq!(list_assets(None, &connection), Ok(Vec::new()));
    }

    #[test]
    fn get_missing_asset_is_not_found() {
        let connection = get_test_connection();

        assert_eq!(get_asset(1, &connection), Err(Error::NotFound));
    }

    #[test]
    fn list_orders_by_type_then_name() {
        let connection = get_test_connection();
        for (name, asset_type) in [
            ("b", AssetType::Investment),
            ("z", AssetType::Bank),
            ("a", AssetType::Investment),
        ] {
            create_asset(Asset::build(name, asset_type, 1.0), &connection).unwrap();
        }

        let got: Vec<String> = list_assets(None, &connection)
            .unwrap()
            .into_iter()
            .map(|asset| asset.name)
            .collect();

        assert_eq!(got, vec!["z".to_owned(), "a".to_owned(), "b".to_owned()]);
    }

    #[test]
    fn list_filters_by_type() {
        let connection = get_test_connection();
        create_asset(Asset::build("지갑", AssetType::Cash, 1.0), &connection).unwrap();
        create_asset(Asset::build("적금", AssetType::Bank, 2.0), &connection).unwrap();

        let got = list_assets(Some(AssetType::Bank), &connection).unwrap();

        assert_eq!(got.len(), 1);
        assert_eq!(got[0].name, "적금");
    }

    #[test]
    fn update_changes_given_fields() {
        let connection = get_test_connection();
        let asset = create_asset(
            Asset::build("적금", AssetType::Bank, 100.0).description(Some("1 year".to_owned())),
            &connection,
        )
        .unwrap();
        let update = AssetUpdate {
            amount: Some(150.0),
            description: Some(None),
            ..Default::default()
        };

        let updated = update_asset(asset.id, update, &connection);

        assert_eq!(updated, Ok(true));
        let got = get_asset(asset.id, &connection).unwrap();
        assert_eq!(got.amount, 150.0);
        assert_eq!(got.description, None);
        assert_eq!(got.name, "적금");
        assert!(got.updated_at >= asset.updated_at);
    }

    #[test]
    fn update_missing_or_empty_returns_false() {
        let connection = get_test_connection();
        let asset = create_asset(Asset::build("지갑", AssetType::Cash, 1.0), &connection).unwrap();

        assert_eq!(
            update_asset(asset.id, AssetUpdate::default(), &connection),
            Ok(false)
        );
        assert_eq!(
            update_asset(
                asset.id + 1,
                AssetUpdate {
                    amount: Some(2.0),
                    ..Default::default()
                },
                &connection
            ),
            Ok(false)
        );
    }

    #[test]
    fn update_rejects_negative_amount() {
        let connection = get_test_connection();
        let asset = create_asset(Asset::build("지갑", AssetType::Cash, 1.0), &connection).unwrap();
        let update = AssetUpdate {
            amount: Some(-5.0),
            ..Default::default()
        };

        let result = update_asset(asset.id, update, &connection);

        assert_eq!(result, Err(Error::NegativeAssetAmount(-5.0)));
        assert_eq!(get_asset(asset.id, &connection), Ok(asset));
    }

    #[test]
    fn delete_removes_asset() {
        let connection = get_test_connection();
        let asset = create_asset(Asset::build("지갑", AssetType::Cash, 1.0), &connection).unwrap();

        assert_eq!(delete_asset(asset.id, &connection), Ok(true));
        assert_eq!(delete_asset(asset.id, &connection), Ok(false));
    }

    #[test]
    fn totals_are_zero_without_assets() {
        let connection = get_test_connection();

        let totals = get_total_assets(&connection).unwrap();

        assert_eq!(totals.total, 0.0);
        assert_eq!(totals.by_type.len(), 5);
        assert!(totals.by_type.values().all(|amount| *amount == 0.0));
    }

    #[test]
    fn totals_sum_per_type() {
        let connection = get_test_connection();
        create_asset(Asset::build("지갑", AssetType::Cash, 50000.0), &connection).unwrap();
        create_asset(Asset::build("월급통장", AssetType::Bank, 1000000.0), &connection).unwrap();
        create_asset(Asset::build("적금", AssetType::Bank, 2500000.0), &connection).unwrap();

        let totals = get_total_assets(&connection).unwrap();

        assert_eq!(totals.total, 3550000.0);
        assert_eq!(totals.by_type[&AssetType::Bank], 3500000.0);
        assert_eq!(totals.by_type[&AssetType::Investment], 0.0);
    }
}
