//! Asset Manager is a personal finance tracker.
//!
//! This library provides a JSON REST API over a single SQLite database that
//! records income and expense transactions, the categories they belong to, and
//! asset holdings such as cash, bank accounts and investments. It also answers
//! the monthly and per-category aggregate queries used by dashboards.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use serde_json::json;
use tokio::signal;

mod app_state;
mod asset;
mod category;
mod db;
mod endpoints;
mod kind;
mod legacy_import;
mod logging;
mod routing;
mod summary;
mod timezone;
mod transaction;
mod validation;

pub use app_state::AppState;
pub use asset::{Asset, AssetId, AssetType};
pub use category::{Category, CategoryId, CategoryName, DEFAULT_CATEGORIES};
pub use db::initialize as initialize_db;
pub use kind::Kind;
pub use legacy_import::{ImportReport, import_legacy_data};
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use routing::build_router;
pub use summary::{CategorySummary, MonthlySummary};
pub use timezone::get_local_offset;
pub use transaction::{Transaction, TransactionId, count_transactions};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// A transaction or category type other than "income" or "expense".
    #[error("invalid type \"{0}\", the type must be either \"income\" or \"expense\"")]
    InvalidKind(String),

    /// An asset type that is not one of the supported asset types.
    #[error(
        "invalid asset type \"{0}\", the type must be one of \"cash\", \"bank\", \
        \"investment\", \"real_estate\" or \"other\""
    )]
    InvalidAssetType(String),

    /// The amount could not be parsed as a number.
    #[error("invalid amount \"{0}\", the amount must be a number")]
    InvalidAmount(String),

    /// A transaction amount of zero or less.
    #[error("the amount must be greater than zero, got {0}")]
    NonPositiveAmount(f64),

    /// An asset amount that is negative or not finite.
    #[error("the asset amount must be zero or greater, got {0}")]
    NegativeAssetAmount(f64),

    /// The category ID could not be parsed as an integer.
    #[error("invalid category ID \"{0}\", the category ID must be an integer")]
    InvalidCategoryId(String),

    /// A date that is not formatted as YYYY-MM-DD or does not exist.
    #[error("invalid date \"{0}\", dates must be formatted as YYYY-MM-DD")]
    InvalidDate(String),

    /// A result limit that is not a positive integer.
    #[error("invalid limit \"{0}\", the limit must be a positive integer")]
    InvalidLimit(String),

    /// A month outside of 1 to 12.
    #[error("invalid month \"{0}\", the month must be between 1 and 12")]
    InvalidMonth(String),

    /// A year outside of 1900 to 2100.
    #[error("invalid year \"{0}\", the year must be between 1900 and 2100")]
    InvalidYear(String),

    /// A required field was missing from the request body.
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    /// A field in the request body had the wrong JSON type.
    #[error("the field \"{0}\" must be {1}")]
    InvalidFieldType(&'static str, &'static str),

    /// The request body was not valid JSON for the endpoint.
    #[error("could not parse the request body: {0}")]
    InvalidRequestBody(String),

    /// A path parameter, such as a resource ID, could not be parsed.
    #[error("invalid path parameter: {0}")]
    InvalidPathParameter(String),

    /// An empty string was used as a category name.
    #[error("category name cannot be empty")]
    EmptyCategoryName,

    /// An empty string was used as an asset name.
    #[error("asset name cannot be empty")]
    EmptyAssetName,

    /// An empty string was used as a currency code.
    #[error("currency cannot be empty")]
    EmptyCurrency,

    /// The category ID used for a transaction did not match a category.
    #[error("the category ID {0} does not refer to a valid category")]
    InvalidCategory(i64),

    /// The transaction type differs from the type of its category.
    #[error("an {transaction_kind} transaction cannot use the {category_kind} category")]
    KindMismatch {
        /// The type of the transaction.
        transaction_kind: Kind,
        /// The type of the category the transaction refers to.
        category_kind: Kind,
    },

    /// The requested resource was not found.
    ///
    /// For HTTP request handlers, the client should check that the parameters
    /// (e.g., ID) are correct and that the resource has been created.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// Tried to update a transaction that does not exist
    #[error("tried to update a transaction that is not in the database")]
    UpdateMissingTransaction,

    /// Tried to delete a transaction that does not exist
    #[error("tried to delete a transaction that is not in the database")]
    DeleteMissingTransaction,

    /// Tried to update an asset that does not exist
    #[error("tried to update an asset that is not in the database")]
    UpdateMissingAsset,

    /// Tried to delete an asset that does not exist
    #[error("tried to delete an asset that is not in the database")]
    DeleteMissingAsset,

    /// An error occurred while getting the local timezone from a canonical timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezoneError(String),

    /// A legacy data file could not be read.
    ///
    /// Callers should pass in the path of the file and the original error as a string.
    #[error("could not read the legacy data file {0}: {1}")]
    LegacyDataReadError(String, String),

    /// A legacy data file did not contain the expected JSON.
    ///
    /// Callers should pass in the path of the file and the original error as a string.
    #[error("could not parse the legacy data file {0}: {1}")]
    LegacyDataParseError(String, String),

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl Error {
    /// The HTTP status code that should be sent to the client for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::NotFound
            | Error::UpdateMissingTransaction
            | Error::DeleteMissingTransaction
            | Error::UpdateMissingAsset
            | Error::DeleteMissingAsset => StatusCode::NOT_FOUND,
            Error::InvalidTimezoneError(_)
            | Error::LegacyDataReadError(..)
            | Error::LegacyDataParseError(..)
            | Error::SqlError(_)
            | Error::DatabaseLockError => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status_code = self.status_code();

        // Server faults are only described in the logs.
        let message = if status_code.is_server_error() {
            tracing::error!("An unexpected error occurred: {}", self);
            "An unexpected error occurred, check the server logs for more details.".to_owned()
        } else {
            self.to_string()
        };

        (
            status_code,
            Json(json!({
                "status": "error",
                "message": message,
            })),
        )
            .into_response()
    }
}
