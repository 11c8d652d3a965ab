//! Query helpers for listing transactions.

use rusqlite::{Connection, params_from_iter, types::Value};
use time::Date;

use crate::{
    Error, Kind,
    category::CategoryId,
    transaction::{
        Transaction,
        core::{SELECT_TRANSACTION, map_transaction_row},
    },
};

/// Restricts which transactions [list_transactions] returns.
///
/// Each field that is set narrows the result, unset fields match everything.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct TransactionFilter {
    /// Only include transactions on or after this date.
    pub start_date: Option<Date>,
    /// Only include transactions on or before this date.
    pub end_date: Option<Date>,
    /// Only include transactions of this kind.
    pub kind: Option<Kind>,
    /// Only include transactions in this category.
    pub category_id: Option<CategoryId>,
    /// Return at most this many transactions.
    pub limit: Option<u32>,
}

/// List transactions matching `filter`, newest first.
///
/// Transactions are ordered by date and then by when they were recorded,
/// both descending. Ties on both are broken by descending ID.
///
/// # Errors
/// Returns [Error::SqlError] if there is an SQL error.
pub fn list_transactions(
    filter: &TransactionFilter,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    let mut conditions: Vec<&str> = Vec::new();
    let mut params: Vec<Value> = Vec::new();

    if let Some(start_date) = filter.start_date {
        conditions.push("t.date >= ?");
        params.push(Value::Text(start_date.to_string()));
    }

    if let Some(end_date) = filter.end_date {
        conditions.push("t.date <= ?");
        params.push(Value::Text(end_date.to_string()));
    }

    if let Some(kind) = filter.kind {
        conditions.push("t.type = ?");
        params.push(Value::Text(kind.as_str().to_owned()));
    }

    if let Some(category_id) = filter.category_id {
        conditions.push("t.category_id = ?");
        params.push(Value::Integer(category_id));
    }

    let mut query = SELECT_TRANSACTION.to_owned();

    if !conditions.is_empty() {
        query.push_str(" WHERE ");
        query.push_str(&conditions.join(" AND "));
    }

    query.push_str(" ORDER BY t.date DESC, t.created_at DESC, t.id DESC");

    if let Some(limit) = filter.limit {
        query.push_str(" LIMIT ?");
        params.push(Value::Integer(i64::from(limit)));
    }

    connection
        .prepare(&query)?
        .query_map(params_from_iter(params), map_transaction_row)?
        .map(|maybe_transaction| maybe_transaction.map_err(Error::from))
        .collect()
}
