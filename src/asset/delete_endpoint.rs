use axum::{
    Json,
    extract::{Path, State, rejection::PathRejection},
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::{
    Error,
    app_state::lock_connection,
    asset::{AssetId, AssetState, delete_asset},
    validation::parse_path_id,
};

/// A route handler for deleting an asset.
pub async fn delete_asset_endpoint(
    State(state): State<AssetState>,
    path: Result<Path<AssetId>, PathRejection>,
) -> Result<Response, Error> {
    let asset_id = parse_path_id(path)?;

    let connection = lock_connection(&state.db_connection)?;

    if !delete_asset(asset_id, &connection)? {
        return Err(Error::DeleteMissingAsset);
    }

    tracing::info!("Deleted asset {asset_id}");

    Ok(Json(json!({
        "status": "success",
        "message": "asset deleted",
    }))
    .into_response())
}
