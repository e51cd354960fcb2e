//! Interactive editor for one usage fee.
//!
//! The editor holds no I/O. Fetching metric details is the caller's job: a
//! metric selection hands out a [`MetricDetailTicket`], and the response is fed
//! back with [`UsageFeeEditor::apply_metric_detail`]. Responses for a selection
//! that has since changed are discarded.

mod matrix;
mod session;
mod tiers;

pub use matrix::{
    reconcile, MatrixTable, ReconcileReport, Segmentation, NO_SEGMENTATION_PLACEHOLDER,
};
pub use session::EditorSession;
pub use tiers::{LastUnit, TierTable, DEFAULT_FIRST_UNITS, MIN_TIERS, TIER_GAP};

use thiserror::Error;
use tokio::sync::watch;
use uuid::Uuid;

use crate::models::{
    BillableMetric, BillableMetricSummary, Package, PerUnit, PricingModelKind, SegmentationMatrix,
    UsageFee, UsagePricingModel,
};
use crate::schema::{self, FieldPath, NormalizePrices, SchemaErrors, REQUIRED};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditError {
    #[error("row {0} does not exist")]
    NoSuchRow(usize),

    #[error("the first tier always starts at zero")]
    FirstRowLocked,

    #[error("at least {min} tiers are required")]
    TooFewRows { min: usize },

    #[error("first unit {value} is below the minimum of {min}")]
    BelowMinimum { value: u64, min: u64 },

    #[error("first unit {value} is above the maximum of {max}")]
    AboveMaximum { value: u64, max: u64 },

    #[error("no tier can follow one starting at {0}")]
    NoRoomAfter(u64),
}

/// Identifies the metric selection a detail fetch was issued for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricDetailTicket {
    pub metric_id: Uuid,
    generation: u64,
}

/// What happened to a metric detail response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetailOutcome {
    /// Stored; carries the matrix reconciliation, empty unless the model is `matrix`.
    Applied(ReconcileReport),
    /// The metric has no segmentation matrix.
    Unsegmented,
    /// The selection changed after the fetch was issued.
    Stale,
}

#[derive(Debug, Clone, PartialEq)]
enum MetricDetail {
    Idle,
    Pending(MetricDetailTicket),
    Loaded(Option<SegmentationMatrix>),
    Failed,
}

/// The sub-editor for the selected pricing model.
#[derive(Debug)]
pub enum SubEditor<'a> {
    PerUnit(&'a mut PerUnit),
    Tiered(TierTable<'a>),
    Volume(TierTable<'a>),
    Package(&'a mut Package),
    Matrix(MatrixTable<'a>),
}

/// Pricing model choices in selector order.
pub fn model_options() -> impl Iterator<Item = (PricingModelKind, &'static str)> {
    PricingModelKind::ALL.into_iter().map(|kind| (kind, kind.label()))
}

#[derive(Debug)]
pub struct UsageFeeEditor {
    metric_id: Option<Uuid>,
    metric_options: Vec<BillableMetricSummary>,
    model: UsagePricingModel,
    detail: MetricDetail,
    generation: u64,
    component_name: watch::Sender<String>,
}

impl UsageFeeEditor {
    /// Start editing `initial`, or a blank per-unit fee.
    ///
    /// The selected metric's name is published on `component_name`.
    pub fn new(initial: Option<UsageFee>, component_name: watch::Sender<String>) -> Self {
        let (metric_id, model) = match initial {
            Some(fee) => (Some(fee.metric_id), fee.model),
            None => (None, UsagePricingModel::empty(PricingModelKind::PerUnit)),
        };
        Self {
            metric_id,
            metric_options: Vec::new(),
            model,
            detail: MetricDetail::Idle,
            generation: 0,
            component_name,
        }
    }

    pub fn metric_id(&self) -> Option<Uuid> {
        self.metric_id
    }

    pub fn metric_options(&self) -> &[BillableMetricSummary] {
        &self.metric_options
    }

    pub fn model(&self) -> &UsagePricingModel {
        &self.model
    }

    pub fn model_kind(&self) -> PricingModelKind {
        self.model.kind()
    }

    pub fn segmentation(&self) -> Option<&SegmentationMatrix> {
        match &self.detail {
            MetricDetail::Loaded(segmentation) => segmentation.as_ref(),
            _ => None,
        }
    }

    pub fn is_detail_pending(&self) -> bool {
        matches!(self.detail, MetricDetail::Pending(_))
    }

    pub fn set_metric_options(&mut self, options: Vec<BillableMetricSummary>) {
        self.metric_options = options;
        if let Some(id) = self.metric_id {
            self.publish_name(id);
        }
    }

    /// Ticket for the detail fetch the current selection still needs, if any.
    pub fn pending_ticket(&mut self) -> Option<MetricDetailTicket> {
        let metric_id = self.metric_id?;
        match self.detail {
            MetricDetail::Pending(ticket) => Some(ticket),
            MetricDetail::Loaded(_) => None,
            MetricDetail::Idle | MetricDetail::Failed => Some(self.issue_ticket(metric_id)),
        }
    }

    /// Select a billable metric.
    ///
    /// Returns the ticket to fetch its detail with, or `None` when the metric
    /// was already selected and its detail is loaded or on its way.
    pub fn select_metric(&mut self, metric_id: Uuid) -> Option<MetricDetailTicket> {
        if self.metric_id == Some(metric_id)
            && matches!(self.detail, MetricDetail::Pending(_) | MetricDetail::Loaded(_))
        {
            return None;
        }

        self.metric_id = Some(metric_id);
        self.publish_name(metric_id);
        Some(self.issue_ticket(metric_id))
    }

    /// Switch pricing model. The previous model's data is dropped.
    pub fn select_model(&mut self, kind: PricingModelKind) -> Option<ReconcileReport> {
        if self.model.kind() == kind {
            return None;
        }
        tracing::debug!(from = %self.model.kind(), to = %kind, "Pricing model changed");
        self.model = UsagePricingModel::empty(kind);
        self.reconcile_matrix()
    }

    /// Feed back the detail fetched for `ticket`.
    pub fn apply_metric_detail(
        &mut self,
        ticket: MetricDetailTicket,
        metric: BillableMetric,
    ) -> DetailOutcome {
        if !self.is_current(ticket) || metric.id != ticket.metric_id {
            tracing::debug!(
                metric_id = %ticket.metric_id,
                "Discarding stale billable metric response"
            );
            return DetailOutcome::Stale;
        }

        if !metric.name.is_empty() {
            self.component_name.send_replace(metric.name);
        }

        let segmented = metric.segmentation_matrix.is_some();
        self.detail = MetricDetail::Loaded(metric.segmentation_matrix);
        if !segmented {
            return DetailOutcome::Unsegmented;
        }
        DetailOutcome::Applied(self.reconcile_matrix().unwrap_or_default())
    }

    /// Record that the fetch for `ticket` failed. Returns `false` if it was stale.
    pub fn fail_metric_detail(&mut self, ticket: MetricDetailTicket) -> bool {
        if !self.is_current(ticket) {
            return false;
        }
        self.detail = MetricDetail::Failed;
        true
    }

    /// Sub-editor for the selected model.
    ///
    /// An empty tier table is seeded with the default rows.
    pub fn sub_editor(&mut self) -> SubEditor<'_> {
        let segmentation = match &self.detail {
            MetricDetail::Loaded(Some(matrix)) => Segmentation::Segmented(matrix),
            MetricDetail::Loaded(None) => Segmentation::Unsegmented,
            MetricDetail::Idle | MetricDetail::Pending(_) | MetricDetail::Failed => {
                Segmentation::Unavailable
            }
        };
        match &mut self.model {
            UsagePricingModel::PerUnit(data) => SubEditor::PerUnit(data),
            UsagePricingModel::Tiered(data) => {
                let mut table = TierTable::new(data);
                table.ensure_seeded();
                SubEditor::Tiered(table)
            }
            UsagePricingModel::Volume(data) => {
                let mut table = TierTable::new(data);
                table.ensure_seeded();
                SubEditor::Volume(table)
            }
            UsagePricingModel::Package(data) => SubEditor::Package(data),
            UsagePricingModel::Matrix(data) => SubEditor::Matrix(MatrixTable::new(data, segmentation)),
        }
    }

    /// Validate the fee and hand it to `on_submit`.
    pub fn submit<R>(&self, on_submit: impl FnOnce(UsageFee) -> R) -> Result<R, SchemaErrors> {
        let Some(metric_id) = self.metric_id else {
            return Err(SchemaErrors::single(
                &FieldPath::root().key("metricId"),
                REQUIRED,
                "Required",
            ));
        };

        let mut fee = UsageFee {
            metric_id,
            model: self.model.clone(),
        };
        schema::validate(&fee)?;
        fee.normalize_prices();

        tracing::info!(metric_id = %metric_id, model = %fee.model.kind(), "Usage fee submitted");
        Ok(on_submit(fee))
    }

    /// Abandon editing.
    pub fn cancel(self, on_cancel: impl FnOnce()) {
        on_cancel();
    }

    fn issue_ticket(&mut self, metric_id: Uuid) -> MetricDetailTicket {
        self.generation += 1;
        let ticket = MetricDetailTicket {
            metric_id,
            generation: self.generation,
        };
        self.detail = MetricDetail::Pending(ticket);
        ticket
    }

    fn is_current(&self, ticket: MetricDetailTicket) -> bool {
        self.detail == MetricDetail::Pending(ticket)
    }

    fn publish_name(&self, metric_id: Uuid) {
        if let Some(option) = self.metric_options.iter().find(|m| m.id == metric_id) {
            self.component_name.send_replace(option.name.clone());
        }
    }

    fn reconcile_matrix(&mut self) -> Option<ReconcileReport> {
        let MetricDetail::Loaded(Some(segmentation)) = &self.detail else {
            return None;
        };
        let UsagePricingModel::Matrix(data) = &mut self.model else {
            return None;
        };
        let report = reconcile(&mut data.dimension_rates, &segmentation.combinations());
        if !report.is_noop() {
            tracing::debug!(
                added = report.added.len(),
                removed = report.removed.len(),
                "Matrix rows reconciled"
            );
        }
        Some(report)
    }
}
