use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State, rejection::JsonRejection},
    http::{StatusCode, header::LOCATION},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;
use serde::Deserialize;
use serde_json::{Value, json};

use crate::{
    AppState, Error, Kind,
    app_state::lock_connection,
    endpoints::{self, format_endpoint},
    timezone::local_today,
    transaction::{Transaction, create_transaction},
    validation::{parse_amount, parse_category_id, parse_date},
};

/// The state needed for creating a transaction.
#[derive(Debug, Clone)]
pub struct CreateTransactionState {
    /// The local timezone as a canonical timezone name, e.g. "Asia/Seoul".
    pub local_timezone: String,
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            local_timezone: state.local_timezone.clone(),
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The request body for creating a transaction.
///
/// `amount` and `category_id` accept JSON numbers or numeric strings.
#[derive(Debug, Default, Deserialize)]
pub struct TransactionRequest {
    /// Either "income" or "expense".
    #[serde(rename = "type")]
    pub kind: Option<String>,
    /// The amount of money, must be greater than zero.
    pub amount: Option<Value>,
    /// The ID of the category of the transaction.
    pub category_id: Option<Value>,
    /// Free text describing the transaction.
    pub description: Option<String>,
    /// The date of the transaction as YYYY-MM-DD, defaults to today.
    pub date: Option<String>,
}

/// A route handler for creating a new transaction.
///
/// Responds with 201 Created, the ID of the new transaction and its location.
pub async fn create_transaction_endpoint(
    State(state): State<CreateTransactionState>,
    payload: Result<Json<TransactionRequest>, JsonRejection>,
) -> Result<Response, Error> {
    let Json(request) =
        payload.map_err(|rejection| Error::InvalidRequestBody(rejection.body_text()))?;

    let kind: Kind = request.kind.ok_or(Error::MissingField("type"))?.parse()?;
    let amount = parse_amount(&request.amount.ok_or(Error::MissingField("amount"))?)?;
    let category_id =
        parse_category_id(&request.category_id.ok_or(Error::MissingField("category_id"))?)?;
    let date = match request.date.as_deref().map(str::trim) {
        None | Some("") => local_today(&state.local_timezone)?,
        Some(date) => parse_date(date)?,
    };

    let builder = Transaction::build(kind, amount, date)
        .category_id(Some(category_id))
        .description(request.description);

    let connection = lock_connection(&state.db_connection)?;
    let transaction = create_transaction(builder, &connection)?;
    tracing::info!(
        "Created {} transaction {} for {} on {}",
        transaction.kind,
        transaction.id,
        transaction.amount,
        transaction.date
    );

    Ok((
        StatusCode::CREATED,
        [(LOCATION, format_endpoint(endpoints::TRANSACTION, transaction.id))],
        Json(json!({
            "status": "success",
            "message": "transaction created",
            "transaction_id": transaction.id,
        })),
    )
        .into_response())
}
