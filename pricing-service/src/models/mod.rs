//! Domain models for pricing-service.

mod component;
mod fee;
mod metric;
mod plan;
mod usage;

pub use component::{AddPriceComponent, EditPriceComponent, FormPriceComponent, PriceComponent};
pub use fee::{
    BillingType, Cadence, CapacityFee, CapacityThreshold, DowngradePolicy, ExtraRecurringFee,
    FeeKind, FeeType, OneTimeFee, RateFee, SlotFee, TermRate, UpgradePolicy,
};
pub use metric::{BillableMetric, BillableMetricSummary, Dimension, LinkedValues, SegmentationMatrix};
pub use plan::{
    ByPlanId, ByPlanVersion, ByPlanVersionId, CreatePlan, DraftPlanOverview, PlanType,
    PublishedPlanOverview,
};
pub use usage::{
    DimensionCombination, DimensionRate, Matrix, Package, PerUnit, PricingModelKind,
    TieredAndVolume, TieredAndVolumeRow, UsageFee, UsagePricingModel,
};
