use axum::{
    Json,
    extract::State,
    response::{IntoResponse, Response},
};
use axum_extra::extract::Query;
use serde::Deserialize;
use serde_json::json;

use crate::{
    Error,
    app_state::lock_connection,
    asset::{AssetState, AssetType, get_total_assets, list_assets},
};

/// The query parameters for listing assets.
#[derive(Debug, Default, Deserialize)]
pub struct ListAssetsQuery {
    /// Only list assets of this type.
    #[serde(rename = "type")]
    pub asset_type: Option<String>,
}

/// A route handler that lists assets together with the total value of all assets.
///
/// The totals always cover every asset, even when the list is filtered.
pub async fn list_assets_endpoint(
    State(state): State<AssetState>,
    Query(query): Query<ListAssetsQuery>,
) -> Result<Response, Error> {
    let asset_type = match query.asset_type.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(asset_type) => Some(asset_type.parse::<AssetType>()?),
    };

    let connection = lock_connection(&state.db_connection)?;
    let assets = list_assets(asset_type, &connection)?;
    let totals = get_total_assets(&connection)?;

    Ok(Json(json!({
        "status": "success",
        "assets": assets,
        "total_assets": totals.total,
        "totals_by_type": totals.by_type,
    }))
    .into_response())
}
