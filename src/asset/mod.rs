//! Asset holdings such as cash, bank accounts and investments.

mod create_endpoint;
mod db;
mod delete_endpoint;
mod domain;
mod edit_endpoint;
mod list_endpoint;

pub use create_endpoint::{AssetState, create_asset_endpoint};
pub use db::{
    create_asset, create_asset_table, delete_asset, get_asset, get_total_assets, list_assets,
    update_asset,
};
pub use delete_endpoint::delete_asset_endpoint;
pub use domain::{Asset, AssetId, AssetType, AssetUpdate, NewAsset};
pub use edit_endpoint::edit_asset_endpoint;
pub use list_endpoint::list_assets_endpoint;
