use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, Path, State, rejection::PathRejection},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;
use serde_json::json;

use crate::{
    AppState, Error,
    app_state::lock_connection,
    transaction::{TransactionId, delete_transaction},
    validation::parse_path_id,
};

/// The state needed to delete a transaction.
#[derive(Debug, Clone)]
pub struct DeleteTransactionState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DeleteTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for deleting a transaction.
///
/// Responds with 404 Not Found if the transaction does not exist.
pub async fn delete_transaction_endpoint(
    State(state): State<DeleteTransactionState>,
    path: Result<Path<TransactionId>, PathRejection>,
) -> Result<Response, Error> {
    let transaction_id = parse_path_id(path)?;

    let connection = lock_connection(&state.db_connection)?;

    if !delete_transaction(transaction_id, &connection)? {
        return Err(Error::DeleteMissingTransaction);
    }

    tracing::info!("Deleted transaction {transaction_id}");

    Ok(Json(json!({
        "status": "success",
        "message": "transaction deleted",
    }))
    .into_response())
}
