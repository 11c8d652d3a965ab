use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{
        FromRef, Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    response::{IntoResponse, Response},
};
use rusqlite::Connection;
use serde::Deserialize;
use serde_json::{Value, json};

use crate::{
    AppState, Error,
    app_state::lock_connection,
    transaction::{TransactionId, TransactionUpdate, get_transaction, update_transaction},
    validation::{
        deserialize_present, parse_amount, parse_date_value, parse_kind,
        parse_nullable_category_id, parse_nullable_text, parse_path_id,
    },
};

/// The state needed to edit a transaction.
#[derive(Debug, Clone)]
pub struct EditTransactionState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for EditTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The request body for editing a transaction, every field is optional.
///
/// `category_id` and `description` may be set to `null` to clear them, an
/// explicit `null` for any other field is rejected.
#[derive(Debug, Default, Deserialize)]
pub struct EditTransactionRequest {
    /// Either "income" or "expense".
    #[serde(rename = "type", default, deserialize_with = "deserialize_present")]
    pub kind: Option<Value>,
    /// The new amount as a number or numeric string.
    #[serde(default, deserialize_with = "deserialize_present")]
    pub amount: Option<Value>,
    /// The new category ID, or `null`.
    #[serde(default, deserialize_with = "deserialize_present")]
    pub category_id: Option<Value>,
    /// The new description, or `null`.
    #[serde(default, deserialize_with = "deserialize_present")]
    pub description: Option<Value>,
    /// The new date as YYYY-MM-DD.
    #[serde(default, deserialize_with = "deserialize_present")]
    pub date: Option<Value>,
}

impl EditTransactionRequest {
    fn into_update(self) -> Result<TransactionUpdate, Error> {
        Ok(TransactionUpdate {
            kind: self.kind.as_ref().map(parse_kind).transpose()?,
            amount: self.amount.as_ref().map(parse_amount).transpose()?,
            category_id: self
                .category_id
                .as_ref()
                .map(parse_nullable_category_id)
                .transpose()?,
            description: self
                .description
                .as_ref()
                .map(|value| parse_nullable_text("description", value))
                .transpose()?,
            date: self.date.as_ref().map(parse_date_value).transpose()?,
        })
    }
}

/// A route handler for updating a transaction.
///
/// A body with no fields to change is accepted and leaves the transaction
/// untouched, as long as the transaction exists.
pub async fn edit_transaction_endpoint(
    State(state): State<EditTransactionState>,
    path: Result<Path<TransactionId>, PathRejection>,
    payload: Result<Json<EditTransactionRequest>, JsonRejection>,
) -> Result<Response, Error> {
    let transaction_id = parse_path_id(path)?;
    let Json(request) =
        payload.map_err(|rejection| Error::InvalidRequestBody(rejection.body_text()))?;
    let update = request.into_update()?;
    let is_empty = update.is_empty();

    let connection = lock_connection(&state.db_connection)?;

    if is_empty {
        // Nothing to write, but a missing transaction is still reported.
        get_transaction(transaction_id, &connection).map_err(|error| match error {
            Error::NotFound => Error::UpdateMissingTransaction,
            error => error,
        })?;
    } else if !update_transaction(transaction_id, update, &connection)? {
        return Err(Error::UpdateMissingTransaction);
    } else {
        tracing::info!("Updated transaction {transaction_id}");
    }

    Ok(Json(json!({
        "status": "success",
        "message": "transaction updated",
    }))
    .into_response())
}
