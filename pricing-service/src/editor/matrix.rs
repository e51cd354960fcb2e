//! Matrix rate table and its reconciliation against a metric's segmentation.

use serde::Serialize;
use std::collections::BTreeSet;

use super::EditError;
use crate::models::{DimensionCombination, DimensionRate, Matrix, SegmentationMatrix};

pub const NO_SEGMENTATION_PLACEHOLDER: &str = "This metric does not have a segmentation matrix";

/// Combinations appended and dropped by one [`reconcile`] pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileReport {
    pub added: Vec<DimensionCombination>,
    pub removed: Vec<DimensionCombination>,
}

impl ReconcileReport {
    pub fn is_noop(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

/// Bring `rates` in line with `target`.
///
/// Rows whose combination is not in `target` are removed, as are repeated
/// rows for the same combination. Every target combination without a row is
/// appended, in target order, at price `"0"`. Surviving rows keep their price
/// and position.
pub fn reconcile(rates: &mut Vec<DimensionRate>, target: &[DimensionCombination]) -> ReconcileReport {
    let wanted: BTreeSet<&DimensionCombination> = target.iter().collect();
    let mut present: BTreeSet<DimensionCombination> = BTreeSet::new();
    let mut report = ReconcileReport::default();

    rates.retain(|rate| {
        let keep = wanted.contains(&rate.dimensions) && present.insert(rate.dimensions.clone());
        if !keep {
            report.removed.push(rate.dimensions.clone());
        }
        keep
    });

    for combination in target {
        if present.insert(combination.clone()) {
            rates.push(DimensionRate::unpriced(combination.clone()));
            report.added.push(combination.clone());
        }
    }

    report
}

/// What the matrix table knows about the selected metric's dimensions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Segmentation<'a> {
    /// No metric detail yet: nothing selected, still loading, or the fetch failed.
    Unavailable,
    Unsegmented,
    Segmented(&'a SegmentationMatrix),
}

/// Editing view over a matrix model.
#[derive(Debug)]
pub struct MatrixTable<'a> {
    data: &'a mut Matrix,
    segmentation: Segmentation<'a>,
}

impl<'a> MatrixTable<'a> {
    pub fn new(data: &'a mut Matrix, segmentation: Segmentation<'a>) -> Self {
        Self { data, segmentation }
    }

    /// `false` while the metric detail is not available; nothing should be shown.
    pub fn is_ready(&self) -> bool {
        self.segmentation != Segmentation::Unavailable
    }

    /// Message to show instead of the table when the metric has nothing to price.
    pub fn placeholder(&self) -> Option<&'static str> {
        (self.segmentation == Segmentation::Unsegmented).then_some(NO_SEGMENTATION_PLACEHOLDER)
    }

    /// Dimension keys in column order.
    pub fn headers(&self) -> Vec<String> {
        match self.segmentation {
            Segmentation::Segmented(matrix) => matrix.headers(),
            Segmentation::Unavailable | Segmentation::Unsegmented => Vec::new(),
        }
    }

    pub fn rows(&self) -> &[DimensionRate] {
        &self.data.dimension_rates
    }

    pub fn set_price(&mut self, index: usize, price: impl Into<String>) -> Result<(), EditError> {
        let rate = self
            .data
            .dimension_rates
            .get_mut(index)
            .ok_or(EditError::NoSuchRow(index))?;
        rate.price = price.into();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Dimension;

    fn combo(pairs: &[(&str, &str)]) -> DimensionCombination {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn rate(pairs: &[(&str, &str)], price: &str) -> DimensionRate {
        DimensionRate {
            dimensions: combo(pairs),
            price: price.to_string(),
        }
    }

    #[test]
    fn test_reconcile_adds_and_removes() {
        let mut rates = vec![
            rate(&[("region", "eu")], "1.50"),
            rate(&[("region", "apac")], "2.00"),
        ];
        let target = vec![combo(&[("region", "eu")]), combo(&[("region", "us")])];

        let report = reconcile(&mut rates, &target);

        assert_eq!(report.added, vec![combo(&[("region", "us")])]);
        assert_eq!(report.removed, vec![combo(&[("region", "apac")])]);
        assert_eq!(rates.len(), 2);
        assert_eq!(rates[0].price, "1.50");
        assert_eq!(rates[1].price, "0");
    }

    #[test]
    fn test_reconcile_is_idempotent() {
        let mut rates = Vec::new();
        let target = vec![combo(&[("a", "1")]), combo(&[("a", "2")])];
        assert_eq!(reconcile(&mut rates, &target).added.len(), 2);
        assert!(reconcile(&mut rates, &target).is_noop());
    }

    #[test]
    fn test_partial_match_is_not_equal() {
        let mut rates = vec![rate(&[("region", "eu")], "3")];
        let target = vec![combo(&[("region", "eu"), ("tier", "gold")])];
        let report = reconcile(&mut rates, &target);
        assert_eq!(report.removed.len(), 1);
        assert_eq!(report.added.len(), 1);
    }

    #[test]
    fn test_duplicate_rows_collapse() {
        let mut rates = vec![rate(&[("a", "1")], "5"), rate(&[("a", "1")], "6")];
        let report = reconcile(&mut rates, &[combo(&[("a", "1")])]);
        assert_eq!(rates.len(), 1);
        assert_eq!(rates[0].price, "5");
        assert_eq!(report.removed, vec![combo(&[("a", "1")])]);
    }

    #[test]
    fn test_empty_target_clears_rows() {
        let mut rates = vec![rate(&[("a", "1")], "5")];
        let report = reconcile(&mut rates, &[]);
        assert!(rates.is_empty());
        assert_eq!(report.removed.len(), 1);
    }

    #[test]
    fn test_table_without_segmentation_shows_placeholder() {
        let mut data = Matrix::default();
        let table = MatrixTable::new(&mut data, Segmentation::Unsegmented);
        assert!(table.is_ready());
        assert_eq!(table.placeholder(), Some(NO_SEGMENTATION_PLACEHOLDER));
        assert!(table.headers().is_empty());
    }

    #[test]
    fn test_table_waiting_for_detail_shows_nothing() {
        let mut data = Matrix::default();
        let table = MatrixTable::new(&mut data, Segmentation::Unavailable);
        assert!(!table.is_ready());
        assert_eq!(table.placeholder(), None);
        assert!(table.headers().is_empty());
    }

    #[test]
    fn test_table_headers_and_price_edit() {
        let segmentation = SegmentationMatrix::Single {
            dimension: Dimension {
                key: "region".to_string(),
                values: vec!["eu".to_string()],
            },
        };
        let mut data = Matrix {
            dimension_rates: vec![rate(&[("region", "eu")], "0")],
        };
        let mut table = MatrixTable::new(&mut data, Segmentation::Segmented(&segmentation));
        assert!(table.is_ready());
        assert_eq!(table.placeholder(), None);
        assert_eq!(table.headers(), vec!["region".to_string()]);
        table.set_price(0, "4.20").unwrap();
        assert_eq!(table.set_price(3, "1"), Err(EditError::NoSuchRow(3)));
        assert_eq!(data.dimension_rates[0].price, "4.20");
    }
}
