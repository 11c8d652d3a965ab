use axum::{
    Json,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::{
    Error,
    app_state::lock_connection,
    asset::{AssetId, AssetState, AssetUpdate, get_asset, update_asset},
    validation::{
        deserialize_present, parse_amount, parse_asset_type, parse_nullable_text, parse_path_id,
        parse_text,
    },
};

/// The request body for editing an asset, every field is optional.
///
/// Only `description` may be set to `null`.
#[derive(Debug, Default, Deserialize)]
pub struct EditAssetRequest {
    /// The new name.
    #[serde(default, deserialize_with = "deserialize_present")]
    pub name: Option<Value>,
    /// The new asset type.
    #[serde(rename = "type", default, deserialize_with = "deserialize_present")]
    pub asset_type: Option<Value>,
    /// The new amount as a number or numeric string.
    #[serde(default, deserialize_with = "deserialize_present")]
    pub amount: Option<Value>,
    /// The new currency code.
    #[serde(default, deserialize_with = "deserialize_present")]
    pub currency: Option<Value>,
    /// The new description, or `null` to remove it.
    #[serde(default, deserialize_with = "deserialize_present")]
    pub description: Option<Value>,
}

impl EditAssetRequest {
    fn into_update(self) -> Result<AssetUpdate, Error> {
        Ok(AssetUpdate {
            name: self
                .name
                .as_ref()
                .map(|value| parse_text("name", value))
                .transpose()?,
            asset_type: self.asset_type.as_ref().map(parse_asset_type).transpose()?,
            amount: self.amount.as_ref().map(parse_amount).transpose()?,
            currency: self
                .currency
                .as_ref()
                .map(|value| parse_text("currency", value))
                .transpose()?,
            description: self
                .description
                .as_ref()
                .map(|value| parse_nullable_text("description", value))
                .transpose()?,
        })
    }
}

/// A route handler for updating an asset.
pub async fn edit_asset_endpoint(
    State(state): State<AssetState>,
    path: Result<Path<AssetId>, PathRejection>,
    payload: Result<Json<EditAssetRequest>, JsonRejection>,
) -> Result<Response, Error> {
    let asset_id = parse_path_id(path)?;
    let Json(request) =
        payload.map_err(|rejection| Error::InvalidRequestBody(rejection.body_text()))?;
    let update = request.into_update()?;

    let connection = lock_connection(&state.db_connection)?;

    if update.is_empty() {
        get_asset(asset_id, &connection).map_err(|error| match error {
            Error::NotFound => Error::UpdateMissingAsset,
            error => error,
        })?;
    } else if !update_asset(asset_id, update, &connection)? {
        return Err(Error::UpdateMissingAsset);
    } else {
        tracing::info!("Updated asset {asset_id}");
    }

    Ok(Json(json!({
        "status": "success",
        "message": "asset updated",
    }))
    .into_response())
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Json,
        extract::{Path, State},
    };
    use rusqlite::Connection;
    use serde_json::json;

    use crate::{
        Error,
        asset::{Asset, AssetState, AssetType, create_asset, get_asset},
        db::initialize,
    };

    use super::{EditAssetRequest, edit_asset_endpoint};

    fn get_test_state() -> AssetState {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        create_asset(
            Asset::build("적금", AssetType::Bank, 100.0).description(Some("1 year".to_owned())),
            &connection,
        )
        .unwrap();

        AssetState {
            db_connection: Arc::new(Mutex::new(connection)),
        }
    }

    #[track_caller]
    fn parse_request(body: serde_json::Value) -> EditAssetRequest {
        serde_json::from_value(body).expect("Could not parse request")
    }

    #[tokio::test]
    async fn updates_fields() {
        let state = get_test_state();
        let request = parse_request(json!({
            "amount": 250.5,
            "type": "investment",
            "description": null,
        }));

        edit_asset_endpoint(State(state.clone()), Ok(Path(1)), Ok(Json(request)))
            .await
            .unwrap();

        let connection = state.db_connection.lock().unwrap();
        let asset = get_asset(1, &connection).unwrap();
        assert_eq!(asset.amount, 250.5);
        assert_eq!(asset.asset_type, AssetType::Investment);
        assert_eq!(asset.description, None);
    }

    #[tokio::test]
    async fn missing_asset_is_not_found() {
        for body in [json!({ "amount": 1 }), json!({})] {
            let request = parse_request(body);

            let result =
                edit_asset_endpoint(State(get_test_state()), Ok(Path(9)), Ok(Json(request))).await;

            assert_eq!(result.unwrap_err(), Error::UpdateMissingAsset);
        }
    }

    #[tokio::test]
    async fn rejects_invalid_fields() {
        let cases = [
            (json!({ "amount": -1 }), Error::NegativeAssetAmount(-1.0)),
            (json!({ "name": " " }), Error::EmptyAssetName),
            (json!({ "type": "car" }), Error::InvalidAssetType("car".to_owned())),
            (json!({ "amount": null }), Error::InvalidAmount("null".to_owned())),
            (json!({ "type": null }), Error::InvalidAssetType("null".to_owned())),
            (json!({ "name": null }), Error::InvalidFieldType("name", "a string")),
            (json!({ "currency": null }), Error::InvalidFieldType("currency", "a string")),
        ];

        for (body, want) in cases {
            let request = parse_request(body);

            let result =
                edit_asset_endpoint(State(get_test_state()), Ok(Path(1)), Ok(Json(request))).await;

            assert_eq!(result.unwrap_err(), want);
        }
    }
}
