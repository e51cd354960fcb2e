//! Price component envelopes exchanged with the billing backend.

use serde::{Deserialize, Serialize};
use validator::Validate;

use super::fee::FeeType;

/// A named billing line item on a plan version.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PriceComponent {
    pub id: String,
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    pub fee: FeeType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_item_id: Option<String>,
}

/// Input for adding a component to a plan version.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AddPriceComponent {
    pub plan_version_id: String,
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    pub fee: FeeType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_item_id: Option<String>,
}

/// Input for replacing an existing component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct EditPriceComponent {
    pub id: String,
    pub plan_version_id: String,
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    pub fee: FeeType,
}

/// What the component editor card submits: a name and a fee.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct FormPriceComponent {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    pub fee: FeeType,
}
