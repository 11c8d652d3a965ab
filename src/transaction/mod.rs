//! Transaction management for the finance tracker.
//!
//! This module contains everything related to transactions:
//! - The `Transaction` model and `TransactionBuilder` for creating transactions
//! - Database functions for storing, querying, updating and deleting transactions
//! - Route handlers for the transaction endpoints

mod core;
mod create_endpoint;
mod delete_endpoint;
mod edit_endpoint;
mod list_endpoint;
mod query;
mod update;

pub use core::{
    Transaction, TransactionId, count_transactions, create_transaction, create_transaction_table,
    delete_transaction, get_transaction,
};
pub(crate) use core::validate_amount;
pub use create_endpoint::create_transaction_endpoint;
pub use delete_endpoint::delete_transaction_endpoint;
pub use edit_endpoint::edit_transaction_endpoint;
pub use list_endpoint::{get_transaction_endpoint, list_transactions_endpoint};
pub use query::{TransactionFilter, list_transactions};
pub use update::{TransactionUpdate, update_transaction};
