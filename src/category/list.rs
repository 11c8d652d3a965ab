//! Endpoint for listing categories.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use axum_extra::extract::Query;
use rusqlite::Connection;
use serde::Deserialize;
use serde_json::json;

use crate::{AppState, Error, Kind, app_state::lock_connection, category::list_categories};

/// The state needed to list categories.
#[derive(Debug, Clone)]
pub struct ListCategoriesState {
    /// The database connection for reading categories.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for ListCategoriesState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The query parameters for listing categories.
#[derive(Debug, Default, Deserialize)]
pub struct ListCategoriesQuery {
    /// Only list categories of this type, "income" or "expense".
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

/// A route handler that lists categories, optionally filtered by type.
pub async fn list_categories_endpoint(
    State(state): State<ListCategoriesState>,
    Query(query): Query<ListCategoriesQuery>,
) -> Result<Response, Error> {
    let kind = match query.kind.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(kind) => Some(kind.parse::<Kind>()?),
    };

    let connection = lock_connection(&state.db_connection)?;
    let categories = list_categories(kind, &connection)?;

    Ok(Json(json!({
        "status": "success",
        "categories": categories,
    }))
    .into_response())
}
