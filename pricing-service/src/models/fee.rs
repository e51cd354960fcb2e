//! Fee kinds a price component can carry.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;
use validator::Validate;

use super::usage::UsageFee;

/// Billing cadence for recurring rates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Cadence {
    Monthly,
    Quarterly,
    Annual,
}

/// Whether a recurring charge is billed at the start or end of the period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BillingType {
    Arrear,
    Advance,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UpgradePolicy {
    Prorated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DowngradePolicy {
    RemoveAtEndOfPeriod,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TermRate {
    pub term: Cadence,
    #[validate(custom(function = "crate::schema::rules::price_precision_2"))]
    pub price: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RateFee {
    #[validate(nested)]
    pub rates: Vec<TermRate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SlotFee {
    #[validate(nested)]
    pub rates: Vec<TermRate>,
    pub slot_unit_name: String,
    pub upgrade_policy: UpgradePolicy,
    pub downgrade_policy: DowngradePolicy,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 1, message = "Minimum count must be a positive integer"))]
    pub minimum_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 1, message = "Quota must be a positive integer"))]
    pub quota: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CapacityThreshold {
    pub included_amount: String,
    #[validate(custom(function = "crate::schema::rules::price_precision_2"))]
    pub price: String,
    #[validate(custom(function = "crate::schema::rules::price_precision_8"))]
    pub per_unit_overage: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CapacityFee {
    pub metric_id: Uuid,
    #[validate(nested)]
    pub thresholds: Vec<CapacityThreshold>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ExtraRecurringFee {
    #[validate(custom(function = "crate::schema::rules::price_precision_2"))]
    pub unit_price: String,
    #[validate(range(min = 1, message = "Quantity must be a positive integer"))]
    pub quantity: u32,
    pub billing_type: BillingType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub term: Option<Cadence>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct OneTimeFee {
    #[validate(custom(function = "crate::schema::rules::price_precision_2"))]
    pub unit_price: String,
    #[validate(range(min = 1, message = "Quantity must be a positive integer"))]
    pub quantity: u32,
}

/// Fee payload, tagged by `fee` on the wire with its payload under `data`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "fee", content = "data", rename_all = "camelCase")]
pub enum FeeType {
    Rate(RateFee),
    Slot(SlotFee),
    Capacity(CapacityFee),
    Usage(UsageFee),
    ExtraRecurring(ExtraRecurringFee),
    OneTime(OneTimeFee),
}

/// Discriminant of [`FeeType`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeeKind {
    Rate,
    Slot,
    Capacity,
    Usage,
    ExtraRecurring,
    OneTime,
}

impl FeeKind {
    pub const ALL: [FeeKind; 6] = [
        FeeKind::Rate,
        FeeKind::Slot,
        FeeKind::Capacity,
        FeeKind::Usage,
        FeeKind::ExtraRecurring,
        FeeKind::OneTime,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FeeKind::Rate => "rate",
            FeeKind::Slot => "slot",
            FeeKind::Capacity => "capacity",
            FeeKind::Usage => "usage",
            FeeKind::ExtraRecurring => "extraRecurring",
            FeeKind::OneTime => "oneTime",
        }
    }

    pub fn from_str_opt(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == s)
    }
}

impl fmt::Display for FeeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FeeType {
    pub fn kind(&self) -> FeeKind {
        match self {
            FeeType::Rate(_) => FeeKind::Rate,
            FeeType::Slot(_) => FeeKind::Slot,
            FeeType::Capacity(_) => FeeKind::Capacity,
            FeeType::Usage(_) => FeeKind::Usage,
            FeeType::ExtraRecurring(_) => FeeKind::ExtraRecurring,
            FeeType::OneTime(_) => FeeKind::OneTime,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_fee_tags_are_camel_case() {
        let fee = FeeType::OneTime(OneTimeFee {
            unit_price: "10".to_string(),
            quantity: 1,
        });
        let value = serde_json::to_value(&fee).unwrap();
        assert_eq!(value["fee"], "oneTime");
        assert_eq!(value["data"]["unitPrice"], "10");
    }

    #[test]
    fn test_slot_fee_policies_deserialize() {
        let fee: FeeType = serde_json::from_value(json!({
            "fee": "slot",
            "data": {
                "rates": [{"term": "MONTHLY", "price": "12.00"}],
                "slotUnitName": "seat",
                "upgradePolicy": "PRORATED",
                "downgradePolicy": "REMOVE_AT_END_OF_PERIOD"
            }
        }))
        .unwrap();
        assert_eq!(fee.kind(), FeeKind::Slot);
    }

    #[test]
    fn test_fee_kind_lookup() {
        for kind in FeeKind::ALL {
            assert_eq!(FeeKind::from_str_opt(kind.as_str()), Some(kind));
        }
        assert_eq!(FeeKind::from_str_opt("extra_recurring"), None);
    }
}
