//! Asset domain types.

use std::{fmt::Display, str::FromStr};

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::Error;

/// Database identifier for an asset.
pub type AssetId = i64;

/// The currency used when none is given.
pub const DEFAULT_CURRENCY: &str = "KRW";

/// What sort of holding an asset is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetType {
    /// Physical cash.
    Cash,
    /// A bank account.
    Bank,
    /// Shares, funds and other investments.
    Investment,
    /// Property.
    RealEstate,
    /// Anything else.
    Other,
}

impl AssetType {
    /// The text used for the asset type in the database and the API.
    pub fn as_str(&self) -> &'static str {
        match self {
            AssetType::Cash => "cash",
            AssetType::Bank => "bank",
            AssetType::Investment => "investment",
            AssetType::RealEstate => "real_estate",
            AssetType::Other => "other",
        }
    }
}

impl FromStr for AssetType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cash" => Ok(AssetType::Cash),
            "bank" => Ok(AssetType::Bank),
            "investment" => Ok(AssetType::Investment),
            "real_estate" => Ok(AssetType::RealEstate),
            "other" => Ok(AssetType::Other),
            other => Err(Error::InvalidAssetType(other.to_owned())),
        }
    }
}

impl Display for AssetType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl ToSql for AssetType {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for AssetType {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|_| FromSqlError::InvalidType)
    }
}

/// Something of value that is owned, e.g. a bank account balance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Asset {
    /// The ID of the asset.
    pub id: AssetId,
    /// The display name of the asset.
    pub name: String,
    /// What sort of holding the asset is.
    #[serde(rename = "type")]
    pub asset_type: AssetType,
    /// The value of the asset, zero or greater.
    pub amount: f64,
    /// The upper case currency code of `amount`, e.g. "KRW".
    pub currency: String,
    /// A text description of the asset.
    pub description: Option<String>,
    /// When the asset was recorded.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    /// When the asset was last changed.
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl Asset {
    /// Create a new asset.
    ///
    /// Shortcut for [NewAsset] for discoverability.
    pub fn build(name: &str, asset_type: AssetType, amount: f64) -> NewAsset {
        NewAsset {
            name: name.to_owned(),
            asset_type,
            amount,
            currency: DEFAULT_CURRENCY.to_owned(),
            description: None,
        }
    }
}

/// The data for an asset that has not been stored yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewAsset {
    /// The display name, must not be empty.
    pub name: String,
    /// What sort of holding the asset is.
    pub asset_type: AssetType,
    /// The value of the asset, zero or greater.
    pub amount: f64,
    /// The currency code, defaults to [DEFAULT_CURRENCY].
    pub currency: String,
    /// Optional free text.
    pub description: Option<String>,
}

impl NewAsset {
    /// Set the currency code.
    pub fn currency(mut self, currency: &str) -> Self {
        currency.clone_into(&mut self.currency);
        self
    }

    /// Set the description.
    pub fn description(mut self, description: Option<String>) -> Self {
        self.description = description;
        self
    }
}

/// The fields to change on an asset.
///
/// `None` leaves a field as is, `description: Some(None)` clears it.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct AssetUpdate {
    /// The new name.
    pub name: Option<String>,
    /// The new asset type.
    pub asset_type: Option<AssetType>,
    /// The new amount.
    pub amount: Option<f64>,
    /// The new currency code.
    pub currency: Option<String>,
    /// The new description, or `Some(None)` to remove it.
    pub description: Option<Option<String>>,
}

impl AssetUpdate {
    /// Whether the update does not change any field.
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.asset_type.is_none()
            && self.amount.is_none()
            && self.currency.is_none()
            && self.description.is_none()
    }
}

/// Trim an asset name and check that it is not empty.
pub(crate) fn normalize_name(name: &str) -> Result<String, Error> {
    let name = name.trim();

    if name.is_empty() {
        Err(Error::EmptyAssetName)
    } else {
        Ok(name.to_owned())
    }
}

/// Trim and upper case a currency code and check that it is not empty.
pub(crate) fn normalize_currency(currency: &str) -> Result<String, Error> {
    let currency = currency.trim();

    if currency.is_empty() {
        Err(Error::EmptyCurrency)
    } else {
        Ok(currency.to_uppercase())
    }
}

/// Check that an asset amount is a finite number of zero or more.
pub(crate) fn validate_asset_amount(amount: f64) -> Result<(), Error> {
    if !amount.is_finite() {
        return Err(Error::InvalidAmount(amount.to_string()));
    }

    if amount < 0.0 {
        return Err(Error::NegativeAssetAmount(amount));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::{Error, asset::AssetType};

    use super::{normalize_currency, normalize_name, validate_asset_amount};

    #[test]
    fn asset_type_round_trips_through_text() {
        for asset_type in [
            AssetType::Cash,
            AssetType::Bank,
            AssetType::Investment,
            AssetType::RealEstate,
            AssetType::Other,
        ] {
            assert_eq!(asset_type.as_str().parse(), Ok(asset_type));
        }
    }

    #[test]
    fn asset_type_serializes_as_snake_case() {
        assert_eq!(
            serde_json::to_string(&AssetType::RealEstate).unwrap(),
            "\"real_estate\""
        );
    }

    #[test]
    fn rejects_unknown_asset_type() {
        assert_eq!(
            "crypto".parse::<AssetType>(),
            Err(Error::InvalidAssetType("crypto".to_owned()))
        );
    }

    #[test]
    fn currency_is_upper_cased() {
        assert_eq!(normalize_currency(" usd "), Ok("USD".to_owned()));
        assert_eq!(normalize_currency("  "), Err(Error::EmptyCurrency));
    }

    #[test]
    fn name_is_trimmed() {
        assert_eq!(normalize_name(" 비상금 "), Ok("비상금".to_owned()));
        assert_eq!(normalize_name(""), Err(Error::EmptyAssetName));
    }

    #[test]
    fn amount_may_be_zero_but_not_negative() {
        assert_eq!(validate_asset_amount(0.0), Ok(()));
        assert_eq!(validate_asset_amount(-1.0), Err(Error::NegativeAssetAmount(-1.0)));
        assert_eq!(
            validate_asset_amount(f64::NAN),
            Err(Error::InvalidAmount("NaN".to_owned()))
        );
    }
}
