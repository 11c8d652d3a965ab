//! Defines the core data models and database queries for transactions.

use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};

use crate::{
    Error, Kind,
    category::{CategoryId, get_category},
};

// ============================================================================
// MODELS
// ============================================================================

/// Database identifier for a transaction.
pub type TransactionId = i64;

/// An expense or income, i.e. an event where money was either spent or earned.
///
/// To create a new `Transaction`, use [Transaction::build].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: TransactionId,
    /// Whether money was earned or spent.
    #[serde(rename = "type")]
    pub kind: Kind,
    /// The amount of money spent or earned, always greater than zero.
    pub amount: f64,
    /// The ID of the category the transaction belongs to.
    pub category_id: Option<CategoryId>,
    /// The name of the category the transaction belongs to.
    pub category_name: Option<String>,
    /// A text description of what the transaction was for.
    pub description: Option<String>,
    /// When the transaction happened.
    pub date: Date,
    /// When the transaction was recorded.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    /// When the transaction was last changed.
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl Transaction {
    /// Create a new transaction.
    ///
    /// Shortcut for [TransactionBuilder] for discoverability.
    pub fn build(kind: Kind, amount: f64, date: Date) -> TransactionBuilder {
        TransactionBuilder {
            kind,
            amount,
            date,
            category_id: None,
            description: None,
            created_at: None,
        }
    }
}

/// A builder for creating [Transaction] instances.
///
/// # Examples
///
/// ```ignore
/// use time::macros::date;
///
/// use crate::{Kind, transaction::{Transaction, create_transaction}};
///
/// let builder = Transaction::build(Kind::Income, 500000.0, date!(2024 - 03 - 15))
///     .category_id(Some(1))
///     .description(Some("March salary".to_owned()));
/// let transaction = create_transaction(builder, &connection)?;
/// ```
#[derive(Debug, PartialEq, Clone)]
pub struct TransactionBuilder {
    /// Whether money was earned or spent.
    pub kind: Kind,

    /// The amount of money, must be greater than zero.
    ///
    /// The direction of the money is given by `kind`, not the sign.
    pub amount: f64,

    /// The date when the transaction occurred.
    ///
    /// Callers that do not have a date should use today's date in the
    /// server's local timezone.
    pub date: Date,

    /// The category of the transaction, e.g. "식비", "급여".
    ///
    /// If set, the category must exist and have the same kind as the
    /// transaction.
    pub category_id: Option<CategoryId>,

    /// Optional free text describing the transaction.
    pub description: Option<String>,

    /// When the transaction was recorded, defaults to now.
    ///
    /// Only set this when bringing in transactions recorded elsewhere.
    pub created_at: Option<OffsetDateTime>,
}

impl TransactionBuilder {
    /// Set the category id for the transaction.
    pub fn category_id(mut self, category_id: Option<CategoryId>) -> Self {
        self.category_id = category_id;
        self
    }

    /// Set the description for the transaction.
    pub fn description(mut self, description: Option<String>) -> Self {
        self.description = description;
        self
    }

    /// Set when the transaction was recorded.
    pub fn created_at(mut self, created_at: Option<OffsetDateTime>) -> Self {
        self.created_at = created_at;
        self
    }
}

// ============================================================================
// VALIDATION
// ============================================================================

/// Check that `amount` is a finite number greater than zero.
pub(crate) fn validate_amount(amount: f64) -> Result<(), Error> {
    if !amount.is_finite() {
        return Err(Error::InvalidAmount(amount.to_string()));
    }

    if amount <= 0.0 {
        return Err(Error::NonPositiveAmount(amount));
    }

    Ok(())
}

/// Check that `category_id`, if set, refers to a category of the same `kind`.
pub(crate) fn validate_category(
    kind: Kind,
    category_id: Option<CategoryId>,
    connection: &Connection,
) -> Result<(), Error> {
    let Some(category_id) = category_id else {
        return Ok(());
    };

    let category = get_category(category_id, connection).map_err(|error| match error {
        // A 'not found' error does not make sense when creating a transaction,
        // so we instead indicate that the category id (a foreign key) is invalid.
        Error::NotFound => Error::InvalidCategory(category_id),
        error => error,
    })?;

    if category.kind != kind {
        return Err(Error::KindMismatch {
            transaction_kind: kind,
            category_kind: category.kind,
        });
    }

    Ok(())
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// The columns read by [map_transaction_row], joined with the category name.
pub(crate) const SELECT_TRANSACTION: &str = "SELECT t.id, t.type, t.amount, t.category_id, c.name, \
    t.description, t.date, t.created_at, t.updated_at \
    FROM transactions t LEFT JOIN categories c ON t.category_id = c.id";

/// Create a new transaction in the database from a builder.
///
/// # Errors
/// This function will return a:
/// - [Error::NonPositiveAmount] or [Error::InvalidAmount] if the amount is not a positive number,
/// - [Error::InvalidCategory] if the category ID does not refer to a category,
/// - [Error::KindMismatch] if the category is for the other kind of transaction,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_transaction(
    builder: TransactionBuilder,
    connection: &Connection,
) -> Result<Transaction, Error> {
    validate_amount(builder.amount)?;
    validate_category(builder.kind, builder.category_id, connection)?;

    let created_at = builder.created_at.unwrap_or_else(OffsetDateTime::now_utc);

    connection
        .execute(
            "INSERT INTO transactions (type, amount, category_id, description, date, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)",
            (
                builder.kind,
                builder.amount,
                builder.category_id,
                &builder.description,
                builder.date,
                created_at,
            ),
        )
        .map_err(|error| match error {
            rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error {
                    code: _,
                    extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY,
                },
                _,
            ) => Error::InvalidCategory(builder.category_id.unwrap_or_default()),
            error => error.into(),
        })?;

    let id = connection.last_insert_rowid();
    tracing::debug!("Created transaction {id}");

    get_transaction(id, connection)
}

/// Retrieve a transaction from the database by its `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a valid transaction,
/// - or [Error::SqlError] there is some other SQL error.
pub fn get_transaction(id: TransactionId, connection: &Connection) -> Result<Transaction, Error> {
    let transaction = connection
        .prepare(&format!("{SELECT_TRANSACTION} WHERE t.id = :id"))?
        .query_row(&[(":id", &id)], map_transaction_row)?;

    Ok(transaction)
}

/// Delete a transaction by ID.
///
/// Returns `false` if no transaction has the ID `id`.
///
/// # Errors
/// This function will return a [Error::SqlError] there is some SQL error.
pub fn delete_transaction(id: TransactionId, connection: &Connection) -> Result<bool, Error> {
    let rows_affected =
        connection.execute("DELETE FROM transactions WHERE id = :id", &[(":id", &id)])?;

    Ok(rows_affected > 0)
}

/// Get the total number of transactions in the database.
///
/// # Errors
/// This function will return a [Error::SqlError] there is some SQL error.
pub fn count_transactions(connection: &Connection) -> Result<u32, Error> {
    connection
        .query_row("SELECT COUNT(id) FROM transactions;", [], |row| row.get(0))
        .map_err(|error| error.into())
}

/// Create the transaction table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS transactions (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            type TEXT NOT NULL CHECK (type IN ('income', 'expense')),
            amount REAL NOT NULL CHECK (amount > 0),
            category_id INTEGER,
            description TEXT,
            date DATE NOT NULL,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            FOREIGN KEY(category_id) REFERENCES categories(id) ON UPDATE CASCADE ON DELETE SET NULL
        );

        CREATE INDEX IF NOT EXISTS idx_transactions_date ON transactions(date, created_at);
        CREATE INDEX IF NOT EXISTS idx_transactions_category ON transactions(category_id);",
    )?;

    Ok(())
}

/// Map a row selected with [SELECT_TRANSACTION] to a Transaction.
pub(crate) fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    Ok(Transaction {
        id: row.get(0)?,
        kind: row.get(1)?,
        amount: row.get(2)?,
        category_id: row.get(3)?,
        category_name: row.get(4)?,
        description: row.get(5)?,
        date: row.get(6)?,
        created_at: row.get(7)?,
        updated_at: row.get(8)?,
    })
}

// ============================================================================
// TESTS
// ============================================================================
