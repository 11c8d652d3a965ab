use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rusqlite::Connection;
use serde::Deserialize;
use serde_json::{Value, json};

use crate::{
    AppState, Error,
    app_state::lock_connection,
    asset::{Asset, AssetType, create_asset},
    validation::parse_amount,
};

/// The state needed to manage assets.
#[derive(Debug, Clone)]
pub struct AssetState {
    /// The database connection for managing assets.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for AssetState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The request body for creating an asset.
#[derive(Debug, Default, Deserialize)]
pub struct AssetRequest {
    /// The display name of the asset.
    pub name: Option<String>,
    /// One of "cash", "bank", "investment", "real_estate" or "other".
    #[serde(rename = "type")]
    pub asset_type: Option<String>,
    /// The value of the asset as a number or numeric string.
    pub amount: Option<Value>,
    /// The currency code, defaults to KRW.
    pub currency: Option<String>,
    /// Free text describing the asset.
    pub description: Option<String>,
}

/// A route handler for creating a new asset, responds with the created asset.
pub async fn create_asset_endpoint(
    State(state): State<AssetState>,
    payload: Result<Json<AssetRequest>, JsonRejection>,
) -> Result<Response, Error> {
    let Json(request) =
        payload.map_err(|rejection| Error::InvalidRequestBody(rejection.body_text()))?;

    let name = request.name.ok_or(Error::MissingField("name"))?;
    let asset_type: AssetType = request
        .asset_type
        .ok_or(Error::MissingField("type"))?
        .parse()?;
    let amount = match request.amount {
        Some(amount) => parse_amount(&amount)?,
        None => 0.0,
    };

    let mut new_asset = Asset::build(&name, asset_type, amount).description(request.description);
    if let Some(currency) = request.currency {
        new_asset = new_asset.currency(&currency);
    }

    let connection = lock_connection(&state.db_connection)?;
    let asset = create_asset(new_asset, &connection)?;
    tracing::info!("Created {} asset {} ({})", asset.asset_type, asset.id, asset.name);

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "status": "success",
            "asset": asset,
        })),
    )
        .into_response())
}
