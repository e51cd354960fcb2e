//! Plan-level payloads: creation, overviews and lookups.

use serde::{Deserialize, Serialize};
use validator::Validate;

use super::fee::Cadence;

/// Kind of plan being created.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PlanType {
    Free,
    #[default]
    Standard,
    Custom,
}

/// Input for creating a plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreatePlan {
    #[validate(
        custom(function = "crate::schema::rules::plan_name"),
        length(max = 256)
    )]
    pub plan_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 2048))]
    pub description: Option<String>,
    #[validate(
        length(min = 3, max = 128),
        custom(function = "crate::schema::rules::external_id")
    )]
    pub external_id: String,
    #[serde(default)]
    pub plan_type: PlanType,
}

/// Overview of a plan version still in draft.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct DraftPlanOverview {
    pub plan_version_id: String,
    pub plan_id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub currency: String,
    pub net_terms: i32,
    pub billing_periods: Vec<Cadence>,
}

/// Overview of a published plan version.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PublishedPlanOverview {
    pub plan_version_id: String,
    pub plan_id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Plan lookup by external id, optionally pinned to a version.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ByPlanVersion {
    pub external_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ByPlanVersionId {
    pub plan_id: String,
    pub plan_version_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ByPlanId {
    pub plan_id: String,
}
