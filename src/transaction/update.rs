//! Partial updates of stored transactions.

use rusqlite::{Connection, ToSql, params_from_iter};
use time::{Date, OffsetDateTime};

use crate::{
    Error, Kind,
    category::CategoryId,
    transaction::{
        TransactionId,
        core::{get_transaction, validate_amount, validate_category},
    },
};

/// The fields to change on a transaction.
///
/// `None` leaves a field as is. For the nullable fields, `Some(None)` clears
/// the stored value.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct TransactionUpdate {
    /// The new kind.
    pub kind: Option<Kind>,
    /// The new amount, must be greater than zero.
    pub amount: Option<f64>,
    /// The new category, or `Some(None)` to remove the category.
    pub category_id: Option<Option<CategoryId>>,
    /// The new description, or `Some(None)` to remove the description.
    pub description: Option<Option<String>>,
    /// The new date.
    pub date: Option<Date>,
}

impl TransactionUpdate {
    /// Whether the update does not change any field.
    pub fn is_empty(&self) -> bool {
        self.kind.is_none()
            && self.amount.is_none()
            && self.category_id.is_none()
            && self.description.is_none()
            && self.date.is_none()
    }
}

/// Apply `update` to the transaction with `id` and refresh its `updated_at`.
///
/// The transaction is validated as it would be after the update, so changing
/// only the kind of a categorised transaction fails with [Error::KindMismatch].
///
/// Returns `false` if `update` is empty or no transaction has the ID `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NonPositiveAmount] or [Error::InvalidAmount] if the new amount is not a positive number,
/// - [Error::InvalidCategory] if the new category ID does not refer to a category,
/// - [Error::KindMismatch] if the updated kind and category disagree,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn update_transaction(
    id: TransactionId,
    update: TransactionUpdate,
    connection: &Connection,
) -> Result<bool, Error> {
    if update.is_empty() {
        return Ok(false);
    }

    let current = match get_transaction(id, connection) {
        Ok(transaction) => transaction,
        Err(Error::NotFound) => return Ok(false),
        Err(error) => return Err(error),
    };

    if let Some(amount) = update.amount {
        validate_amount(amount)?;
    }

    let kind = update.kind.unwrap_or(current.kind);
    let category_id = update.category_id.unwrap_or(current.category_id);

    if update.kind.is_some() || update.category_id.is_some() {
        validate_category(kind, category_id, connection)?;
    }

    let mut assignments: Vec<&str> = Vec::new();
    let mut params: Vec<Box<dyn ToSql>> = Vec::new();

    if let Some(kind) = update.kind {
        assignments.push("type = ?");
        params.push(Box::new(kind));
    }

    if let Some(amount) = update.amount {
        assignments.push("amount = ?");
        params.push(Box::new(amount));
    }

    if let Some(category_id) = update.category_id {
        assignments.push("category_id = ?");
        params.push(Box::new(category_id));
    }

    if let Some(description) = update.description {
        assignments.push("description = ?");
        params.push(Box::new(description));
    }

    if let Some(date) = update.date {
        assignments.push("date = ?");
        params.push(Box::new(date));
    }

    assignments.push("updated_at = ?");
    params.push(Box::new(OffsetDateTime::now_utc()));

    params.push(Box::new(id));

    let query = format!(
        "UPDATE transactions SET {} WHERE id = ?",
        assignments.join(", ")
    );
    let rows_affected = connection.execute(&query, params_from_iter(params))?;

    Ok(rows_affected > 0)
}
