//! Core data types for phenoplot-core
//!
//! Field names follow the JSON produced by the statistical-results endpoints
//! (camelCase), with aliases for the older IMPC document names.

use serde::{Deserialize, Deserializer, Serialize};

pub type GeneId = String;

/// Treat JSON `null` like an absent key.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// One statistical-test result: a parameter/allele/metadata-group/sex combination.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatisticalRecord {
    #[serde(alias = "mgiGeneAccessionId")]
    pub gene_id: GeneId,
    #[serde(default, alias = "markerSymbol", deserialize_with = "null_as_default")]
    pub gene_symbol: String,
    /// Records without a chromosome are dropped by the grouper.
    #[serde(default, alias = "chrName")]
    pub chromosome: Option<String>,
    /// Records without a start coordinate cannot be placed and are dropped.
    #[serde(default, alias = "seqRegionStart")]
    pub sequence_start: Option<i64>,
    #[serde(default, alias = "seqRegionEnd")]
    pub sequence_end: Option<i64>,
    /// `None` means "no evidence"; `Some(0.0)` means "essentially zero".
    #[serde(default, alias = "pValue")]
    pub reported_p_value: Option<f64>,
    #[serde(default, alias = "significant", deserialize_with = "null_as_default")]
    pub is_manually_significant: bool,
    #[serde(default)]
    pub procedure_name: Option<String>,
    #[serde(default)]
    pub parameter_name: Option<String>,
    #[serde(default, alias = "parameterStableId")]
    pub parameter_id: Option<String>,
    #[serde(default, alias = "topLevelPhenotypeTerms", deserialize_with = "null_as_default")]
    pub top_level_phenotypes: Vec<String>,
    #[serde(default, alias = "projectName")]
    pub project: Option<String>,
    #[serde(default)]
    pub allele_symbol: Option<String>,
    #[serde(default)]
    pub zygosity: Option<String>,
    #[serde(default)]
    pub sex: Option<String>,
    #[serde(default)]
    pub metadata_group: Option<String>,
}

impl StatisticalRecord {
    /// Minimal record, mostly useful for tests and synthetic inputs.
    pub fn new(gene_id: impl Into<String>, chromosome: impl Into<String>, sequence_start: i64) -> Self {
        let gene_id = gene_id.into();
        Self {
            gene_symbol: gene_id.clone(),
            gene_id,
            chromosome: Some(chromosome.into()),
            sequence_start: Some(sequence_start),
            sequence_end: Some(sequence_start),
            reported_p_value: None,
            is_manually_significant: false,
            procedure_name: None,
            parameter_name: None,
            parameter_id: None,
            top_level_phenotypes: Vec::new(),
            project: None,
            allele_symbol: None,
            zygosity: None,
            sex: None,
            metadata_group: None,
        }
    }

    pub fn with_p_value(mut self, p_value: Option<f64>) -> Self {
        self.reported_p_value = p_value;
        self
    }

    /// First listed body system, used as the category sort key.
    pub fn primary_body_system(&self) -> Option<&str> {
        self.top_level_phenotypes.first().map(String::as_str)
    }
}

/// A deduplicated record placed on the synthetic genome axis.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionedRecord {
    #[serde(flatten)]
    pub record: StatisticalRecord,
    pub axis_position: i64,
    pub plot_value: f64,
}

/// Axis label for one chromosome.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChromosomeTick {
    pub axis_midpoint: f64,
    pub label: String,
}

/// Anchor of the significance reference line for one chromosome.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ThresholdPoint {
    pub axis_position: i64,
    pub value: f64,
}
