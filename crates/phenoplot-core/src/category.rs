//! Graphical-analysis aggregation by body system or procedure

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashSet;
use tracing::debug;

use crate::transform::ValueTransform;
use crate::types::StatisticalRecord;

/// Label used for band boundaries when a record has no category.
pub const UNCLASSIFIED: &str = "Unclassified";

/// Grouping applied by [`aggregate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AggregationMode {
    BodySystems,
    Procedures,
    All,
}

impl Default for AggregationMode {
    fn default() -> Self {
        Self::All
    }
}

impl AggregationMode {
    /// Parse aggregation mode from string
    pub fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "body-systems" | "body-system" | "bodysystems" => Ok(Self::BodySystems),
            "procedures" | "procedure" => Ok(Self::Procedures),
            "all" => Ok(Self::All),
            other => Err(anyhow!(
                "Unknown aggregation mode: {}. Use: body-systems, procedures, or all",
                other
            )),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BodySystems => "BODY_SYSTEMS",
            Self::Procedures => "PROCEDURES",
            Self::All => "ALL",
        }
    }

    fn category<'a>(&self, record: &'a StatisticalRecord) -> Option<&'a str> {
        match self {
            Self::BodySystems => record.primary_body_system(),
            Self::Procedures => record.procedure_name.as_deref(),
            Self::All => None,
        }
    }
}

/// A record kept by [`aggregate`], with its categorical-axis rank.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedRecord {
    #[serde(flatten)]
    pub record: StatisticalRecord,
    pub rank: usize,
    pub plot_value: f64,
    pub significant: bool,
}

/// Whether `record` meets `threshold` on the `-log10(p)` scale.
///
/// A p-value of exactly zero is infinitely significant. A missing p-value is
/// significant only when curated as such.
///
/// Significance and plotted value are independent: a `p = 0` record that is
/// not manually significant counts as significant here but plots at 0, since
/// the sentinel height is reserved for curated records.
pub fn is_significant(record: &StatisticalRecord, threshold: f64) -> bool {
    match record.reported_p_value {
        None => record.is_manually_significant,
        Some(p) if p == 0.0 => true,
        Some(p) if p > 0.0 => -p.log10() >= threshold,
        Some(_) => false,
    }
}

/// Filter, sort and rank records for the graphical-analysis view.
///
/// With `significant_only`, the category modes keep every record of a body
/// system (or procedure) that has at least one significant record, not just
/// the significant records. `ALL` mode keeps exactly the significant subset in
/// input order; otherwise it sorts by ascending p-value, missing values last.
pub fn aggregate<F>(
    records: &[StatisticalRecord],
    mode: AggregationMode,
    significant_only: bool,
    threshold_for: F,
    transform: &ValueTransform,
) -> Vec<RankedRecord>
where
    F: Fn(&StatisticalRecord) -> f64,
{
    let significant: Vec<bool> = records
        .iter()
        .map(|r| is_significant(r, threshold_for(r)))
        .collect();

    let kept: Vec<(&StatisticalRecord, bool)> = match mode {
        AggregationMode::BodySystems => {
            let mut candidates: Vec<_> = records.iter().zip(significant.iter().copied()).collect();
            candidates.sort_by(|(a, _), (b, _)| {
                cmp_missing_last(a.primary_body_system(), b.primary_body_system())
                    .then_with(|| cmp_missing_last(a.parameter_name.as_deref(), b.parameter_name.as_deref()))
            });
            if significant_only {
                let systems: HashSet<&str> = records
                    .iter()
                    .zip(&significant)
                    .filter(|&(_, &sig)| sig)
                    .flat_map(|(r, _)| r.top_level_phenotypes.iter().map(String::as_str))
                    .collect();
                candidates.retain(|(r, _)| {
                    r.top_level_phenotypes
                        .iter()
                        .any(|system| systems.contains(system.as_str()))
                });
            }
            candidates
        }
        AggregationMode::Procedures => {
            let mut candidates: Vec<_> = records.iter().zip(significant.iter().copied()).collect();
            candidates.sort_by(|(a, _), (b, _)| {
                cmp_missing_last(a.procedure_name.as_deref(), b.procedure_name.as_deref())
                    .then_with(|| cmp_missing_last(a.parameter_name.as_deref(), b.parameter_name.as_deref()))
            });
            if significant_only {
                let procedures: HashSet<&str> = records
                    .iter()
                    .zip(&significant)
                    .filter(|&(_, &sig)| sig)
                    .filter_map(|(r, _)| r.procedure_name.as_deref())
                    .collect();
                candidates.retain(|(r, _)| {
                    r.procedure_name
                        .as_deref()
                        .map_or(false, |p| procedures.contains(p))
                });
            }
            candidates
        }
        AggregationMode::All => {
            let candidates = records.iter().zip(significant.iter().copied());
            if significant_only {
                candidates.filter(|(_, sig)| *sig).collect()
            } else {
                let mut all: Vec<_> = candidates.collect();
                all.sort_by(|(a, _), (b, _)| {
                    cmp_p_value(a.reported_p_value, b.reported_p_value)
                });
                all
            }
        }
    };

    let ranked: Vec<RankedRecord> = kept
        .into_iter()
        .enumerate()
        .map(|(rank, (record, significant))| RankedRecord {
            record: record.clone(),
            rank,
            plot_value: transform.apply(record.reported_p_value, record.is_manually_significant),
            significant,
        })
        .collect();

    debug!(
        mode = mode.as_str(),
        significant_only,
        input = records.len(),
        kept = ranked.len(),
        "aggregated records"
    );
    ranked
}

fn cmp_missing_last(a: Option<&str>, b: Option<&str>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn cmp_p_value(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.total_cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Contiguous run of ranks sharing a category label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryBand {
    pub label: String,
    pub first_rank: usize,
    pub last_rank: usize,
}

impl CategoryBand {
    pub fn midpoint(&self) -> f64 {
        (self.first_rank + self.last_rank) as f64 / 2.0
    }
}

/// Ranked records plus their category bands.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryView {
    pub mode: AggregationMode,
    pub significant_only: bool,
    pub records: Vec<RankedRecord>,
    pub bands: Vec<CategoryBand>,
}

impl CategoryView {
    pub fn new(mode: AggregationMode, significant_only: bool, records: Vec<RankedRecord>) -> Self {
        let bands = category_bands(mode, &records);
        Self {
            mode,
            significant_only,
            records,
            bands,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Record at a categorical-axis coordinate.
    pub fn lookup(&self, rank: usize) -> Option<&RankedRecord> {
        self.records.get(rank)
    }

    pub fn bands(&self) -> &[CategoryBand] {
        &self.bands
    }

    pub fn significant_count(&self) -> usize {
        self.records.iter().filter(|r| r.significant).count()
    }
}

/// Bands for the category modes; `ALL` has none.
pub fn category_bands(mode: AggregationMode, records: &[RankedRecord]) -> Vec<CategoryBand> {
    if mode == AggregationMode::All {
        return Vec::new();
    }
    let mut bands: Vec<CategoryBand> = Vec::new();
    for ranked in records {
        let label = mode.category(&ranked.record).unwrap_or(UNCLASSIFIED);
        match bands.last_mut() {
            Some(band) if band.label == label => band.last_rank = ranked.rank,
            _ => bands.push(CategoryBand {
                label: label.to_string(),
                first_rank: ranked.rank,
                last_rank: ranked.rank,
            }),
        }
    }
    bands
}
