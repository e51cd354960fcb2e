//! Billable metrics as returned by the metrics API.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

use super::usage::DimensionCombination;

/// Entry of the "list billable metrics" response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BillableMetricSummary {
    pub id: Uuid,
    #[serde(default)]
    pub name: String,
}

/// Full billable metric detail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BillableMetric {
    pub id: Uuid,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub segmentation_matrix: Option<SegmentationMatrix>,
}

/// A named axis and its allowed values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimension {
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub values: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkedValues {
    #[serde(default)]
    pub values: Vec<String>,
}

/// How a metric decomposes into matrix cells.
///
/// On the wire this is a oneof: exactly one of `single`, `double` or `linked`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SegmentationMatrix {
    Single {
        #[serde(default)]
        dimension: Dimension,
    },
    Double {
        #[serde(default)]
        dimension1: Dimension,
        #[serde(default)]
        dimension2: Dimension,
    },
    #[serde(rename_all = "camelCase")]
    Linked {
        dimension_key: String,
        linked_dimension_key: String,
        #[serde(default)]
        values: BTreeMap<String, LinkedValues>,
    },
}

impl SegmentationMatrix {
    /// Column headers of the rate table, in display order.
    pub fn headers(&self) -> Vec<String> {
        match self {
            SegmentationMatrix::Single { dimension } => vec![dimension.key.clone()],
            SegmentationMatrix::Double {
                dimension1,
                dimension2,
            } => vec![dimension1.key.clone(), dimension2.key.clone()],
            SegmentationMatrix::Linked {
                dimension_key,
                linked_dimension_key,
                ..
            } => vec![dimension_key.clone(), linked_dimension_key.clone()],
        }
    }

    /// Every dimension combination this segmentation defines.
    ///
    /// `single` yields one combination per value, `double` the full cross
    /// product, `linked` each primary value paired with its own linked values.
    /// When both dimensions share a key the second value wins, so the result
    /// can repeat combinations.
    pub fn combinations(&self) -> Vec<DimensionCombination> {
        let headers = self.headers();
        if headers.len() == 2 && headers[0] == headers[1] {
            tracing::debug!(key = %headers[0], "Segmentation dimensions share a key");
        }
        match self {
            SegmentationMatrix::Single { dimension } => dimension
                .values
                .iter()
                .map(|v| combination(&[(&dimension.key, v)]))
                .collect(),
            SegmentationMatrix::Double {
                dimension1,
                dimension2,
            } => dimension1
                .values
                .iter()
                .flat_map(|v1| {
                    dimension2.values.iter().map(move |v2| {
                        combination(&[(&dimension1.key, v1), (&dimension2.key, v2)])
                    })
                })
                .collect(),
            SegmentationMatrix::Linked {
                dimension_key,
                linked_dimension_key,
                values,
            } => values
                .iter()
                .flat_map(|(primary, linked)| {
                    linked.values.iter().map(move |linked_value| {
                        combination(&[(dimension_key, primary), (linked_dimension_key, linked_value)])
                    })
                })
                .collect(),
        }
    }
}

fn combination(pairs: &[(&String, &String)]) -> DimensionCombination {
    pairs
        .iter()
        .map(|(k, v)| ((*k).clone(), (*v).clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::reconcile;
    use serde_json::json;

    fn dim(key: &str, values: &[&str]) -> Dimension {
        Dimension {
            key: key.to_string(),
            values: values.iter().map(|v| v.to_string()).collect(),
        }
    }

    #[test]
    fn test_single_combinations() {
        let matrix = SegmentationMatrix::Single {
            dimension: dim("region", &["eu", "us"]),
        };
        let combos = matrix.combinations();
        assert_eq!(combos.len(), 2);
        assert_eq!(combos[0].get("region").map(String::as_str), Some("eu"));
        assert_eq!(matrix.headers(), vec!["region".to_string()]);
    }

    #[test]
    fn test_double_is_cross_product() {
        let matrix = SegmentationMatrix::Double {
            dimension1: dim("region", &["eu", "us"]),
            dimension2: dim("tier", &["gold", "silver", "bronze"]),
        };
        let combos = matrix.combinations();
        assert_eq!(combos.len(), 6);
        assert!(combos.iter().all(|c| c.len() == 2));
    }

    #[test]
    fn test_double_with_shared_key_reconciles_to_distinct_rows() {
        let matrix = SegmentationMatrix::Double {
            dimension1: dim("region", &["eu", "us"]),
            dimension2: dim("region", &["apac", "eu"]),
        };
        let combos = matrix.combinations();
        assert_eq!(combos.len(), 4);
        assert!(combos.iter().all(|c| c.len() == 1));

        let mut rates = Vec::new();
        let report = reconcile(&mut rates, &combos);
        let regions: Vec<&str> = rates.iter().map(|r| r.dimensions["region"].as_str()).collect();
        assert_eq!(regions, vec!["apac", "eu"]);
        assert_eq!(report.added.len(), 2);
    }

    #[test]
    fn test_linked_pairs_only_own_values() {
        let matrix: SegmentationMatrix = serde_json::from_value(json!({
            "linked": {
                "dimensionKey": "cloud",
                "linkedDimensionKey": "region",
                "values": {
                    "aws": {"values": ["us-east-1", "eu-west-1"]},
                    "gcp": {"values": ["europe-west4"]}
                }
            }
        }))
        .unwrap();
        let combos = matrix.combinations();
        assert_eq!(combos.len(), 3);
        assert!(combos
            .iter()
            .any(|c| c["cloud"] == "gcp" && c["region"] == "europe-west4"));
        assert!(!combos
            .iter()
            .any(|c| c["cloud"] == "gcp" && c["region"] == "us-east-1"));
        assert_eq!(matrix.headers(), vec!["cloud".to_string(), "region".to_string()]);
    }

    #[test]
    fn test_metric_without_segmentation() {
        let metric: BillableMetric = serde_json::from_value(json!({
            "id": "6a2c6c1e-7c36-4c36-9c55-8b3c0b5b4c11",
            "name": "API calls"
        }))
        .unwrap();
        assert!(metric.segmentation_matrix.is_none());
    }
}
