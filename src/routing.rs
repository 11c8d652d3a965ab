//! Application router configuration.

use axum::{
    Json, Router,
    response::{IntoResponse, Response},
    routing::{get, put},
};
use serde_json::json;

use crate::{
    AppState, Error,
    asset::{
        create_asset_endpoint, delete_asset_endpoint, edit_asset_endpoint, list_assets_endpoint,
    },
    category::{create_category_endpoint, list_categories_endpoint},
    endpoints,
    summary::{get_category_summary_endpoint, get_monthly_summary_endpoint},
    transaction::{
        create_transaction_endpoint, delete_transaction_endpoint, edit_transaction_endpoint,
        get_transaction_endpoint, list_transactions_endpoint,
    },
};

/// The module name reported by the health check.
pub const MODULE_NAME: &str = "asset-manager";

/// The features reported by the health check.
pub const FEATURES: [&str; 5] = [
    "categories",
    "transactions",
    "monthly_summary",
    "category_summary",
    "assets",
];

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(endpoints::HEALTH, get(get_health))
        .route(
            endpoints::CATEGORIES,
            get(list_categories_endpoint).post(create_category_endpoint),
        )
        .route(
            endpoints::TRANSACTIONS,
            get(list_transactions_endpoint).post(create_transaction_endpoint),
        )
        .route(
            endpoints::TRANSACTION,
            get(get_transaction_endpoint)
                .put(edit_transaction_endpoint)
                .delete(delete_transaction_endpoint),
        )
        .route(endpoints::MONTHLY_SUMMARY, get(get_monthly_summary_endpoint))
        .route(
            endpoints::CATEGORY_SUMMARY,
            get(get_category_summary_endpoint),
        )
        .route(
            endpoints::ASSETS,
            get(list_assets_endpoint).post(create_asset_endpoint),
        )
        .route(
            endpoints::ASSET,
            put(edit_asset_endpoint).delete(delete_asset_endpoint),
        )
        .fallback(get_404_not_found)
        .with_state(state)
}

async fn get_health() -> Response {
    Json(json!({
        "status": "ok",
        "module": MODULE_NAME,
        "features": FEATURES,
    }))
    .into_response()
}

async fn get_404_not_found() -> Response {
    Error::NotFound.into_response()
}
