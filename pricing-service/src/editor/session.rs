//! Async shell that drives a [`UsageFeeEditor`] against the metrics API.

use std::sync::Arc;
use uuid::Uuid;

use super::{DetailOutcome, UsageFeeEditor};
use crate::services::{BillableMetricsApi, MetricsClientError};

pub struct EditorSession {
    editor: UsageFeeEditor,
    api: Arc<dyn BillableMetricsApi>,
}

impl EditorSession {
    pub fn new(editor: UsageFeeEditor, api: Arc<dyn BillableMetricsApi>) -> Self {
        Self { editor, api }
    }

    pub fn editor(&self) -> &UsageFeeEditor {
        &self.editor
    }

    pub fn editor_mut(&mut self) -> &mut UsageFeeEditor {
        &mut self.editor
    }

    pub fn into_editor(self) -> UsageFeeEditor {
        self.editor
    }

    /// Load the metric selector options for a product family.
    ///
    /// On failure the current options are kept.
    pub async fn load_metric_options(
        &mut self,
        family_external_id: &str,
    ) -> Result<usize, MetricsClientError> {
        let options = self.api.list_billable_metrics(family_external_id).await?;
        let count = options.len();
        self.editor.set_metric_options(options);
        Ok(count)
    }

    /// Select a metric and load its segmentation.
    ///
    /// A failed fetch leaves the matrix editor without segmentation; it is
    /// retried by [`EditorSession::refresh_metric_detail`].
    pub async fn select_metric(&mut self, metric_id: Uuid) -> Option<DetailOutcome> {
        self.editor.select_metric(metric_id)?;
        self.refresh_metric_detail().await
    }

    /// Fetch the detail the current selection is still missing, if any.
    pub async fn refresh_metric_detail(&mut self) -> Option<DetailOutcome> {
        let ticket = self.editor.pending_ticket()?;
        match self.api.get_billable_metric(ticket.metric_id).await {
            Ok(metric) => Some(self.editor.apply_metric_detail(ticket, metric)),
            Err(e) => {
                tracing::warn!(
                    metric_id = %ticket.metric_id,
                    error = %e,
                    "Failed to load billable metric"
                );
                self.editor.fail_metric_detail(ticket);
                None
            }
        }
    }
}
