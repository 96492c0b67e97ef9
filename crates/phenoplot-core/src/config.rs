//! Pipeline configuration
//!
//! Every field has a default, so an empty JSON object is a valid config.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::chromosome::ChromosomeOrder;
use crate::transform::{ValueTransform, ANALYSIS_SENTINEL, MANHATTAN_SENTINEL};
use crate::types::StatisticalRecord;

/// Default significance cut-off on the `-log10(p)` scale (p = 1e-4).
pub const DEFAULT_SIGNIFICANCE_THRESHOLD: f64 = 4.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    /// Genome order of chromosomes; also the whitelist of valid labels.
    pub chromosome_order: Vec<String>,
    /// Plot value for manually significant records on the Manhattan view.
    pub manhattan_sentinel: f64,
    /// Plot value for manually significant records on the analysis view.
    pub analysis_sentinel: f64,
    /// y-value of the Manhattan threshold line.
    pub manhattan_threshold: f64,
    /// Significance cut-off for projects without an override.
    pub default_significance_threshold: f64,
    /// Per-project significance cut-offs.
    pub project_thresholds: BTreeMap<String, f64>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            chromosome_order: ChromosomeOrder::mouse().labels().to_vec(),
            manhattan_sentinel: MANHATTAN_SENTINEL,
            analysis_sentinel: ANALYSIS_SENTINEL,
            manhattan_threshold: DEFAULT_SIGNIFICANCE_THRESHOLD,
            default_significance_threshold: DEFAULT_SIGNIFICANCE_THRESHOLD,
            project_thresholds: BTreeMap::from([("PWG".to_string(), 3.0)]),
        }
    }
}

impl PipelineConfig {
    pub fn chromosome_order(&self) -> ChromosomeOrder {
        ChromosomeOrder::new(self.chromosome_order.iter().cloned())
    }

    pub fn manhattan_transform(&self) -> ValueTransform {
        ValueTransform::new(self.manhattan_sentinel)
    }

    pub fn analysis_transform(&self) -> ValueTransform {
        ValueTransform::new(self.analysis_sentinel)
    }

    /// Significance cut-off for a record, honouring its project override.
    pub fn significance_threshold(&self, record: &StatisticalRecord) -> f64 {
        record
            .project
            .as_deref()
            .and_then(|project| self.project_thresholds.get(project))
            .copied()
            .unwrap_or(self.default_significance_threshold)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_project_override() {
        let config = PipelineConfig::default();
        let mut record = StatisticalRecord::new("MGI:1", "1", 10);
        assert_eq!(config.significance_threshold(&record), 4.0);
        record.project = Some("PWG".into());
        assert_eq!(config.significance_threshold(&record), 3.0);
        record.project = Some("BaSH".into());
        assert_eq!(config.significance_threshold(&record), 4.0);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: PipelineConfig =
            serde_json::from_str(r#"{"manhattan_sentinel": 20.0}"#).unwrap();
        assert_eq!(config.manhattan_sentinel, 20.0);
        assert_eq!(config.chromosome_order.len(), 20);
    }

    #[test]
    fn test_unknown_key_rejected() {
        assert!(serde_json::from_str::<PipelineConfig>(r#"{"colour": "red"}"#).is_err());
    }
}
