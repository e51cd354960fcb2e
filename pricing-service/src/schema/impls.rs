//! `Schema` implementations for every payload shape.

use serde_json::Value;
use validator::Validate;

use super::rules::check_tier_order;
use super::{
    check_discriminant, check_object, validation_issues, Field, FieldIssue, FieldPath, Schema,
    Shape,
};
use crate::models::{
    AddPriceComponent, ByPlanId, ByPlanVersion, ByPlanVersionId, CapacityFee, CreatePlan,
    DraftPlanOverview, EditPriceComponent, ExtraRecurringFee, FeeKind, FeeType,
    FormPriceComponent, Matrix, OneTimeFee, Package, PerUnit, PriceComponent, PricingModelKind,
    PublishedPlanOverview, RateFee, SlotFee, TieredAndVolume, UsageFee, UsagePricingModel,
};

const CADENCES: &[&str] = &["MONTHLY", "QUARTERLY", "ANNUAL"];
const CADENCE: Shape = Shape::OneOf(CADENCES);
const ANY_OBJECT: Shape = Shape::Object(&[]);

const PER_UNIT: &[Field] = &[Field::required("unitPrice", Shape::Text)];

const TIER_ROW_FIELDS: &[Field] = &[
    Field::required("firstUnit", Shape::Count),
    Field::required("unitPrice", Shape::Text),
    Field::optional("flatFee", Shape::Text),
    Field::optional("flatCap", Shape::Text),
];
const TIER_ROW: Shape = Shape::Object(TIER_ROW_FIELDS);
const TIERED_AND_VOLUME: &[Field] = &[
    Field::required("rows", Shape::ListOf(&TIER_ROW)),
    Field::optional("blockSize", Shape::Count),
];

const PACKAGE: &[Field] = &[
    Field::required("blockSize", Shape::Count),
    Field::required("packagePrice", Shape::Text),
];

const DIMENSION_RATE_FIELDS: &[Field] = &[
    Field::required("dimensions", Shape::TextMap),
    Field::required("price", Shape::Text),
];
const DIMENSION_RATE: Shape = Shape::Object(DIMENSION_RATE_FIELDS);
const MATRIX: &[Field] = &[Field::required("dimensionRates", Shape::ListOf(&DIMENSION_RATE))];

const USAGE_FEE: &[Field] = &[
    Field::required("metricId", Shape::Uuid),
    Field::required("model", ANY_OBJECT),
];

const TERM_RATE_FIELDS: &[Field] = &[
    Field::required("term", CADENCE),
    Field::required("price", Shape::Text),
];
const TERM_RATE: Shape = Shape::Object(TERM_RATE_FIELDS);
const RATE_FEE: &[Field] = &[Field::required("rates", Shape::ListOf(&TERM_RATE))];

const SLOT_FEE: &[Field] = &[
    Field::required("rates", Shape::ListOf(&TERM_RATE)),
    Field::required("slotUnitName", Shape::Text),
    Field::required("upgradePolicy", Shape::OneOf(&["PRORATED"])),
    Field::required("downgradePolicy", Shape::OneOf(&["REMOVE_AT_END_OF_PERIOD"])),
    Field::optional("minimumCount", Shape::Count32),
    Field::optional("quota", Shape::Count32),
];

const CAPACITY_THRESHOLD_FIELDS: &[Field] = &[
    Field::required("includedAmount", Shape::Text),
    Field::required("price", Shape::Text),
    Field::required("perUnitOverage", Shape::Text),
];
const CAPACITY_THRESHOLD: Shape = Shape::Object(CAPACITY_THRESHOLD_FIELDS);
const CAPACITY_FEE: &[Field] = &[
    Field::required("metricId", Shape::Uuid),
    Field::required("thresholds", Shape::ListOf(&CAPACITY_THRESHOLD)),
];

const EXTRA_RECURRING_FEE: &[Field] = &[
    Field::required("unitPrice", Shape::Text),
    Field::required("quantity", Shape::Count32),
    Field::required("billingType", Shape::OneOf(&["ARREAR", "ADVANCE"])),
    Field::optional("term", CADENCE),
];

const ONE_TIME_FEE: &[Field] = &[
    Field::required("unitPrice", Shape::Text),
    Field::required("quantity", Shape::Count32),
];

const PRICE_COMPONENT: &[Field] = &[
    Field::required("id", Shape::Text),
    Field::required("name", Shape::Text),
    Field::required("fee", ANY_OBJECT),
    Field::optional("productItemId", Shape::Text),
];

const ADD_PRICE_COMPONENT: &[Field] = &[
    Field::required("planVersionId", Shape::Text),
    Field::required("name", Shape::Text),
    Field::required("fee", ANY_OBJECT),
    Field::optional("productItemId", Shape::Text),
];

const EDIT_PRICE_COMPONENT: &[Field] = &[
    Field::required("id", Shape::Text),
    Field::required("planVersionId", Shape::Text),
    Field::required("name", Shape::Text),
    Field::required("fee", ANY_OBJECT),
];

const FORM_PRICE_COMPONENT: &[Field] = &[
    Field::required("name", Shape::Text),
    Field::required("fee", ANY_OBJECT),
];

const CREATE_PLAN: &[Field] = &[
    Field::required("planName", Shape::Text),
    Field::optional("description", Shape::Text),
    Field::required("externalId", Shape::Text),
    Field::optional("planType", Shape::OneOf(&["FREE", "STANDARD", "CUSTOM"])),
];

const DRAFT_PLAN_OVERVIEW: &[Field] = &[
    Field::required("planVersionId", Shape::Text),
    Field::required("planId", Shape::Text),
    Field::required("name", Shape::Text),
    Field::optional("description", Shape::Text),
    Field::required("currency", Shape::Text),
    Field::required("netTerms", Shape::Int32),
    Field::required("billingPeriods", Shape::ListOf(&CADENCE)),
];

const PUBLISHED_PLAN_OVERVIEW: &[Field] = &[
    Field::required("planVersionId", Shape::Text),
    Field::required("planId", Shape::Text),
    Field::required("name", Shape::Text),
    Field::optional("description", Shape::Text),
];

const BY_PLAN_VERSION: &[Field] = &[
    Field::required("externalId", Shape::Text),
    Field::optional("version", Shape::Int32),
];

const BY_PLAN_VERSION_ID: &[Field] = &[
    Field::required("planId", Shape::Text),
    Field::required("planVersionId", Shape::Text),
];

const BY_PLAN_ID: &[Field] = &[Field::required("planId", Shape::Text)];

fn check_fields<T: Validate>(value: &T, path: &FieldPath, issues: &mut Vec<FieldIssue>) {
    if let Err(errors) = value.validate() {
        validation_issues(path, &errors, issues);
    }
}

/// Shapes fully described by their field list and `validator` attributes.
macro_rules! field_rules_schema {
    ($($ty:ty => $name:literal, $fields:expr;)*) => {
        $(
            impl Schema for $ty {
                const NAME: &'static str = $name;

                fn precheck(value: &Value, path: &FieldPath, issues: &mut Vec<FieldIssue>) {
                    check_object(value, path, $fields, issues);
                }

                fn check(&self, path: &FieldPath, issues: &mut Vec<FieldIssue>) {
                    check_fields(self, path, issues);
                }
            }
        )*
    };
}

field_rules_schema! {
    PerUnit => "per_unit", PER_UNIT;
    Package => "package", PACKAGE;
    Matrix => "matrix", MATRIX;
    RateFee => "rate_fee", RATE_FEE;
    SlotFee => "slot_fee", SLOT_FEE;
    CapacityFee => "capacity_fee", CAPACITY_FEE;
    ExtraRecurringFee => "extra_recurring_fee", EXTRA_RECURRING_FEE;
    OneTimeFee => "one_time_fee", ONE_TIME_FEE;
    CreatePlan => "create_plan", CREATE_PLAN;
    DraftPlanOverview => "draft_plan_overview", DRAFT_PLAN_OVERVIEW;
    PublishedPlanOverview => "published_plan_overview", PUBLISHED_PLAN_OVERVIEW;
    ByPlanVersion => "by_plan_version", BY_PLAN_VERSION;
    ByPlanVersionId => "by_plan_version_id", BY_PLAN_VERSION_ID;
    ByPlanId => "by_plan_id", BY_PLAN_ID;
}

impl Schema for TieredAndVolume {
    const NAME: &'static str = "tiered_and_volume";

    fn precheck(value: &Value, path: &FieldPath, issues: &mut Vec<FieldIssue>) {
        check_object(value, path, TIERED_AND_VOLUME, issues);
    }

    fn check(&self, path: &FieldPath, issues: &mut Vec<FieldIssue>) {
        check_fields(self, path, issues);
        check_tier_order(&self.rows, path, issues);
    }
}

impl Schema for UsagePricingModel {
    const NAME: &'static str = "usage_pricing_model";

    fn precheck(value: &Value, path: &FieldPath, issues: &mut Vec<FieldIssue>) {
        let allowed = PricingModelKind::ALL.map(|k| k.as_str());
        let Some(kind) = check_discriminant(value, path, "model", &allowed, issues)
            .and_then(PricingModelKind::from_str_opt)
        else {
            return;
        };

        let data = &value["data"];
        let data_path = path.key("data");
        match kind {
            PricingModelKind::PerUnit => PerUnit::precheck(data, &data_path, issues),
            PricingModelKind::Tiered | PricingModelKind::Volume => {
                TieredAndVolume::precheck(data, &data_path, issues)
            }
            PricingModelKind::Package => Package::precheck(data, &data_path, issues),
            PricingModelKind::Matrix => Matrix::precheck(data, &data_path, issues),
        }
    }

    fn check(&self, path: &FieldPath, issues: &mut Vec<FieldIssue>) {
        let data = path.key("data");
        match self {
            UsagePricingModel::PerUnit(d) => d.check(&data, issues),
            UsagePricingModel::Tiered(d) => d.check(&data, issues),
            UsagePricingModel::Volume(d) => d.check(&data, issues),
            UsagePricingModel::Package(d) => d.check(&data, issues),
            UsagePricingModel::Matrix(d) => d.check(&data, issues),
        }
    }
}

impl Schema for UsageFee {
    const NAME: &'static str = "usage_fee";

    fn precheck(value: &Value, path: &FieldPath, issues: &mut Vec<FieldIssue>) {
        check_object(value, path, USAGE_FEE, issues);
        if let Some(model) = value.get("model").filter(|m| m.is_object()) {
            UsagePricingModel::precheck(model, &path.key("model"), issues);
        }
    }

    fn check(&self, path: &FieldPath, issues: &mut Vec<FieldIssue>) {
        self.model.check(&path.key("model"), issues);
    }
}

impl Schema for FeeType {
    const NAME: &'static str = "fee";

    fn precheck(value: &Value, path: &FieldPath, issues: &mut Vec<FieldIssue>) {
        let allowed = FeeKind::ALL.map(|k| k.as_str());
        let Some(kind) = check_discriminant(value, path, "fee", &allowed, issues)
            .and_then(FeeKind::from_str_opt)
        else {
            return;
        };

        let data = &value["data"];
        let data_path = path.key("data");
        match kind {
            FeeKind::Rate => RateFee::precheck(data, &data_path, issues),
            FeeKind::Slot => SlotFee::precheck(data, &data_path, issues),
            FeeKind::Capacity => CapacityFee::precheck(data, &data_path, issues),
            FeeKind::Usage => UsageFee::precheck(data, &data_path, issues),
            FeeKind::ExtraRecurring => ExtraRecurringFee::precheck(data, &data_path, issues),
            FeeKind::OneTime => OneTimeFee::precheck(data, &data_path, issues),
        }
    }

    fn check(&self, path: &FieldPath, issues: &mut Vec<FieldIssue>) {
        let data = path.key("data");
        match self {
            FeeType::Rate(d) => d.check(&data, issues),
            FeeType::Slot(d) => d.check(&data, issues),
            FeeType::Capacity(d) => d.check(&data, issues),
            FeeType::Usage(d) => d.check(&data, issues),
            FeeType::ExtraRecurring(d) => d.check(&data, issues),
            FeeType::OneTime(d) => d.check(&data, issues),
        }
    }
}

/// Price component envelopes: their own fields, then the nested fee.
macro_rules! fee_envelope_schema {
    ($($ty:ty => $name:literal, $fields:expr;)*) => {
        $(
            impl Schema for $ty {
                const NAME: &'static str = $name;

                fn precheck(value: &Value, path: &FieldPath, issues: &mut Vec<FieldIssue>) {
                    check_object(value, path, $fields, issues);
                    if let Some(fee) = value.get("fee").filter(|f| f.is_object()) {
                        FeeType::precheck(fee, &path.key("fee"), issues);
                    }
                }

                fn check(&self, path: &FieldPath, issues: &mut Vec<FieldIssue>) {
                    check_fields(self, path, issues);
                    self.fee.check(&path.key("fee"), issues);
                }
            }
        )*
    };
}

fee_envelope_schema! {
    PriceComponent => "price_component", PRICE_COMPONENT;
    AddPriceComponent => "add_price_component", ADD_PRICE_COMPONENT;
    EditPriceComponent => "edit_price_component", EDIT_PRICE_COMPONENT;
    FormPriceComponent => "form_price_component", FORM_PRICE_COMPONENT;
}
