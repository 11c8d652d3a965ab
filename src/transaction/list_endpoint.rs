use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, Path, State, rejection::PathRejection},
    response::{IntoResponse, Response},
};
use axum_extra::extract::Query;
use rusqlite::Connection;
use serde::Deserialize;
use serde_json::json;

use crate::{
    AppState, Error, Kind,
    app_state::lock_connection,
    transaction::{TransactionFilter, TransactionId, get_transaction, list_transactions},
    validation::{
        parse_optional_category_id, parse_optional_date, parse_optional_limit, parse_path_id,
    },
};

/// The state needed to read transactions.
#[derive(Debug, Clone)]
pub struct ListTransactionsState {
    /// The database connection for reading transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for ListTransactionsState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The query parameters for listing transactions.
///
/// Kept as raw strings so that malformed values are reported with the
/// application's own error messages.
#[derive(Debug, Default, Deserialize)]
pub struct ListTransactionsQuery {
    /// The earliest date to include, YYYY-MM-DD.
    pub start_date: Option<String>,
    /// The latest date to include, YYYY-MM-DD.
    pub end_date: Option<String>,
    /// Only include "income" or "expense" transactions.
    #[serde(rename = "type")]
    pub kind: Option<String>,
    /// Only include transactions in this category.
    pub category_id: Option<String>,
    /// The maximum number of transactions to return.
    pub limit: Option<String>,
}

impl ListTransactionsQuery {
    fn into_filter(self) -> Result<TransactionFilter, Error> {
        let kind = match self.kind.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(kind) => Some(kind.parse::<Kind>()?),
        };

        Ok(TransactionFilter {
            start_date: parse_optional_date(self.start_date.as_deref())?,
            end_date: parse_optional_date(self.end_date.as_deref())?,
            kind,
            category_id: parse_optional_category_id(self.category_id.as_deref())?,
            limit: parse_optional_limit(self.limit.as_deref())?,
        })
    }
}

/// A route handler that lists transactions newest first.
pub async fn list_transactions_endpoint(
    State(state): State<ListTransactionsState>,
    Query(query): Query<ListTransactionsQuery>,
) -> Result<Response, Error> {
    let filter = query.into_filter()?;

    let connection = lock_connection(&state.db_connection)?;
    let transactions = list_transactions(&filter, &connection)?;

    Ok(Json(json!({
        "status": "success",
        "count": transactions.len(),
        "transactions": transactions,
    }))
    .into_response())
}

/// A route handler that returns a single transaction by ID.
pub async fn get_transaction_endpoint(
    State(state): State<ListTransactionsState>,
    path: Result<Path<TransactionId>, PathRejection>,
) -> Result<Response, Error> {
    let transaction_id = parse_path_id(path)?;

    let connection = lock_connection(&state.db_connection)?;
    let transaction = get_transaction(transaction_id, &connection)?;

    Ok(Json(json!({
        "status": "success",
        "transaction": transaction,
    }))
    .into_response())
}
