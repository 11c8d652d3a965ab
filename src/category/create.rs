//! Endpoint for creating categories.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rusqlite::Connection;
use serde::Deserialize;
use serde_json::json;

use crate::{
    AppState, Error, Kind,
    app_state::lock_connection,
    category::{CategoryName, create_category},
};

/// The state needed to create a category.
#[derive(Debug, Clone)]
pub struct CreateCategoryState {
    /// The database connection for managing categories.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateCategoryState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The request body for creating a category.
#[derive(Debug, Default, Deserialize)]
pub struct CategoryRequest {
    /// The display name of the category.
    pub name: Option<String>,
    /// Either "income" or "expense".
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

/// A route handler for creating a new category, responds with the created category.
pub async fn create_category_endpoint(
    State(state): State<CreateCategoryState>,
    payload: Result<Json<CategoryRequest>, JsonRejection>,
) -> Result<Response, Error> {
    let Json(request) =
        payload.map_err(|rejection| Error::InvalidRequestBody(rejection.body_text()))?;

    let name = request.name.ok_or(Error::MissingField("name"))?;
    let name = CategoryName::new(&name)?;
    let kind: Kind = request.kind.ok_or(Error::MissingField("type"))?.parse()?;

    let connection = lock_connection(&state.db_connection)?;
    let category = create_category(name, kind, &connection)?;
    tracing::info!(
        "Created {} category {} ({})",
        category.kind,
        category.id,
        category.name
    );

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "status": "success",
            "category": category,
        })),
    )
        .into_response())
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{Json, extract::State, http::StatusCode};
    use rusqlite::Connection;

    use crate::{Error, Kind, category::get_category, db::initialize};

    use super::{CategoryRequest, CreateCategoryState, create_category_endpoint};

    fn get_test_state() -> CreateCategoryState {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();

        CreateCategoryState {
            db_connection: Arc::new(Mutex::new(connection)),
        }
    }

    #[tokio::test]
    async fn can_create_category() {
        let state = get_test_state();
        let request = CategoryRequest {
            name: Some("구독".to_owned()),
            kind: Some("expense".to_owned()),
        };

        let response = create_category_endpoint(State(state.clone()), Ok(Json(request)))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        let connection = state.db_connection.lock().unwrap();
        // The twelve default categories come first.
        let category = get_category(13, &connection).unwrap();
        assert_eq!(category.name.as_ref(), "구독");
        assert_eq!(category.kind, Kind::Expense);
    }

    #[tokio::test]
    async fn rejects_missing_name() {
        let request = CategoryRequest {
            name: None,
            kind: Some("expense".to_owned()),
        };

        let result = create_category_endpoint(State(get_test_state()), Ok(Json(request))).await;

        assert_eq!(result.unwrap_err(), Error::MissingField("name"));
    }

    #[tokio::test]
    async fn rejects_blank_name() {
        let request = CategoryRequest {
            name: Some("   ".to_owned()),
            kind: Some("income".to_owned()),
        };

        let result = create_category_endpoint(State(get_test_state()), Ok(Json(request))).await;

        assert_eq!(result.unwrap_err(), Error::EmptyCategoryName);
    }

    #[tokio::test]
    async fn rejects_invalid_type() {
        let request = CategoryRequest {
            name: Some("Gifts".to_owned()),
            kind: Some("gift".to_owned()),
        };

        let result = create_category_endpoint(State(get_test_state()), Ok(Json(request))).await;

        assert_eq!(result.unwrap_err(), Error::InvalidKind("gift".to_owned()));
    }
}
