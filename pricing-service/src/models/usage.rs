//! Usage-based fee and its pricing models.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use uuid::Uuid;
use validator::Validate;

/// A usage fee: a billable metric priced by one of the usage pricing models.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageFee {
    pub metric_id: Uuid,
    pub model: UsagePricingModel,
}

/// Usage pricing model, tagged by `model` on the wire with its payload under `data`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "model", content = "data", rename_all = "snake_case")]
pub enum UsagePricingModel {
    PerUnit(PerUnit),
    Tiered(TieredAndVolume),
    Volume(TieredAndVolume),
    Package(Package),
    Matrix(Matrix),
}

/// Discriminant of [`UsagePricingModel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PricingModelKind {
    PerUnit,
    Tiered,
    Volume,
    Package,
    Matrix,
}

impl PricingModelKind {
    /// Selector order, as offered to the user.
    pub const ALL: [PricingModelKind; 5] = [
        PricingModelKind::PerUnit,
        PricingModelKind::Tiered,
        PricingModelKind::Volume,
        PricingModelKind::Package,
        PricingModelKind::Matrix,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PricingModelKind::PerUnit => "per_unit",
            PricingModelKind::Tiered => "tiered",
            PricingModelKind::Volume => "volume",
            PricingModelKind::Package => "package",
            PricingModelKind::Matrix => "matrix",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PricingModelKind::PerUnit => "Per unit",
            PricingModelKind::Tiered => "Tiered",
            PricingModelKind::Volume => "Volume",
            PricingModelKind::Package => "Package",
            PricingModelKind::Matrix => "Matrix",
        }
    }

    pub fn from_str_opt(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == s)
    }
}

impl fmt::Display for PricingModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl UsagePricingModel {
    pub fn kind(&self) -> PricingModelKind {
        match self {
            UsagePricingModel::PerUnit(_) => PricingModelKind::PerUnit,
            UsagePricingModel::Tiered(_) => PricingModelKind::Tiered,
            UsagePricingModel::Volume(_) => PricingModelKind::Volume,
            UsagePricingModel::Package(_) => PricingModelKind::Package,
            UsagePricingModel::Matrix(_) => PricingModelKind::Matrix,
        }
    }

    /// Blank payload for a freshly selected model.
    pub fn empty(kind: PricingModelKind) -> Self {
        match kind {
            PricingModelKind::PerUnit => UsagePricingModel::PerUnit(PerUnit::default()),
            PricingModelKind::Tiered => UsagePricingModel::Tiered(TieredAndVolume::default()),
            PricingModelKind::Volume => UsagePricingModel::Volume(TieredAndVolume::default()),
            PricingModelKind::Package => UsagePricingModel::Package(Package::default()),
            PricingModelKind::Matrix => UsagePricingModel::Matrix(Matrix::default()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PerUnit {
    #[validate(custom(function = "crate::schema::rules::price_precision_8"))]
    pub unit_price: String,
}

/// Shared payload of the tiered and volume models.
///
/// Row ordering is checked separately, see `schema::rules::check_tier_order`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TieredAndVolume {
    #[validate(nested)]
    pub rows: Vec<TieredAndVolumeRow>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 1, message = "Block size must be positive"))]
    pub block_size: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TieredAndVolumeRow {
    pub first_unit: u64,
    #[validate(custom(function = "crate::schema::rules::price_precision_8"))]
    pub unit_price: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(custom(function = "crate::schema::rules::price_precision_2"))]
    pub flat_fee: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(custom(function = "crate::schema::rules::price_precision_2"))]
    pub flat_cap: Option<String>,
}

impl TieredAndVolumeRow {
    pub fn new(first_unit: u64) -> Self {
        Self {
            first_unit,
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Package {
    #[validate(range(min = 1, message = "Block size must be positive"))]
    pub block_size: u64,
    #[validate(custom(function = "crate::schema::rules::price_precision_8"))]
    pub package_price: String,
}

impl Default for Package {
    fn default() -> Self {
        Self {
            block_size: 1,
            package_price: String::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Matrix {
    #[validate(
        length(min = 1, message = "At least one dimension rate is required"),
        nested
    )]
    pub dimension_rates: Vec<DimensionRate>,
}

/// A dimension key → value assignment identifying one matrix cell.
pub type DimensionCombination = BTreeMap<String, String>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct DimensionRate {
    pub dimensions: DimensionCombination,
    #[validate(custom(function = "crate::schema::rules::price_precision_2"))]
    pub price: String,
}

impl DimensionRate {
    /// A freshly discovered combination starts at a zero price.
    pub fn unpriced(dimensions: DimensionCombination) -> Self {
        Self {
            dimensions,
            price: "0".to_string(),
        }
    }
}
