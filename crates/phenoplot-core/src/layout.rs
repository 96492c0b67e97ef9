//! Manhattan layout: concatenates chromosome spans on a single axis

use serde::Serialize;
use std::collections::HashMap;
use std::ops::Range;
use tracing::{debug, warn};

use crate::chromosome::{ChromosomeGroups, ChromosomeOrder, GroupingStats};
use crate::transform::ValueTransform;
use crate::types::{ChromosomeTick, PositionedRecord, StatisticalRecord, ThresholdPoint};

/// Slice of [`Positions::positioned`] belonging to one chromosome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChromosomeSpan {
    pub chromosome: String,
    #[serde(skip)]
    pub range: Range<usize>,
    pub first_position: i64,
    pub last_position: i64,
}

/// Output of [`assign_positions`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Positions {
    pub positioned: Vec<PositionedRecord>,
    pub ticks: Vec<ChromosomeTick>,
    pub axis_max: i64,
    #[serde(skip)]
    pub spans: Vec<ChromosomeSpan>,
    /// Records whose axis position did not fit in `i64`.
    #[serde(skip)]
    pub overflowed: usize,
}

impl Positions {
    /// Records of one chromosome, sorted by axis position.
    pub fn chromosome_records(&self, span: &ChromosomeSpan) -> &[PositionedRecord] {
        &self.positioned[span.range.clone()]
    }
}

/// Lay deduplicated records out along one axis in `order`.
///
/// Each chromosome's records are sorted by `sequence_start` and shifted by the
/// running offset, which afterwards becomes the axis position of that
/// chromosome's last record. Chromosomes in `order` that are missing from
/// `groups` are skipped without a tick. Records without a start coordinate,
/// or whose axis position would overflow `i64`, are left out.
pub fn assign_positions(
    groups: &ChromosomeGroups,
    order: &ChromosomeOrder,
    transform: &ValueTransform,
) -> Positions {
    let mut positions = Positions::default();
    let mut running_offset = 0_i64;

    for chromosome in order.iter() {
        let genes = match groups.get(chromosome) {
            Some(genes) if !genes.is_empty() => genes,
            _ => continue,
        };

        let mut sorted: Vec<(i64, &StatisticalRecord)> = genes
            .values()
            .filter_map(|r| r.sequence_start.map(|start| (start, r)))
            .collect();
        sorted.sort_by_key(|(start, _)| *start);

        let start = positions.positioned.len();
        for (sequence_start, record) in sorted {
            let axis_position = match sequence_start.checked_add(running_offset) {
                Some(axis_position) => axis_position,
                None => {
                    positions.overflowed += 1;
                    continue;
                }
            };
            positions.positioned.push(PositionedRecord {
                record: record.clone(),
                axis_position,
                plot_value: transform.apply(record.reported_p_value, record.is_manually_significant),
            });
        }
        let range = start..positions.positioned.len();
        if range.is_empty() {
            continue;
        }

        let first_position = positions.positioned[range.start].axis_position;
        let last_position = positions.positioned[range.end - 1].axis_position;
        positions.ticks.push(ChromosomeTick {
            axis_midpoint: (first_position as f64 + last_position as f64) / 2.0,
            label: chromosome.to_string(),
        });
        positions.spans.push(ChromosomeSpan {
            chromosome: chromosome.to_string(),
            range,
            first_position,
            last_position,
        });

        running_offset = last_position;
    }

    positions.axis_max = running_offset;
    if positions.overflowed > 0 {
        warn!(
            overflowed = positions.overflowed,
            "axis position overflow; records left out of the layout"
        );
    }
    debug!(
        records = positions.positioned.len(),
        chromosomes = positions.ticks.len(),
        axis_max = positions.axis_max,
        "assigned axis positions"
    );
    positions
}

/// Everything a Manhattan renderer needs, plus a gene lookup.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ManhattanLayout {
    pub positioned: Vec<PositionedRecord>,
    pub ticks: Vec<ChromosomeTick>,
    pub axis_max: i64,
    pub threshold_points: Vec<ThresholdPoint>,
    pub threshold: f64,
    pub spans: Vec<ChromosomeSpan>,
    #[serde(skip)]
    pub(crate) input_records: usize,
    #[serde(skip)]
    pub(crate) grouping: GroupingStats,
    #[serde(skip)]
    pub(crate) overflowed: usize,
    #[serde(skip)]
    by_gene: HashMap<String, usize>,
}

impl ManhattanLayout {
    pub(crate) fn new(
        positions: Positions,
        threshold_points: Vec<ThresholdPoint>,
        threshold: f64,
        input_records: usize,
        grouping: GroupingStats,
    ) -> Self {
        let mut by_gene = HashMap::with_capacity(positions.positioned.len());
        for (idx, point) in positions.positioned.iter().enumerate() {
            by_gene.entry(point.record.gene_id.clone()).or_insert(idx);
        }
        Self {
            positioned: positions.positioned,
            ticks: positions.ticks,
            axis_max: positions.axis_max,
            threshold_points,
            threshold,
            spans: positions.spans,
            input_records,
            grouping,
            overflowed: positions.overflowed,
            by_gene,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.positioned.is_empty()
    }

    /// Positioned record for a gene; the first chromosome in genome order wins.
    pub fn lookup(&self, gene_id: &str) -> Option<&PositionedRecord> {
        self.by_gene.get(gene_id).map(|&idx| &self.positioned[idx])
    }

    pub fn chromosome_records(&self, span: &ChromosomeSpan) -> &[PositionedRecord] {
        &self.positioned[span.range.clone()]
    }

    pub fn max_plot_value(&self) -> f64 {
        self.positioned
            .iter()
            .map(|p| p.plot_value)
            .fold(0.0_f64, f64::max)
    }

    pub fn summary(&self) -> LayoutSummary {
        let genes_per_chromosome = self
            .spans
            .iter()
            .map(|span| (span.chromosome.clone(), span.range.len()))
            .collect();
        let significant_genes = self
            .positioned
            .iter()
            .filter(|p| p.plot_value >= self.threshold)
            .count();
        let top_hit = self
            .positioned
            .iter()
            .max_by(|a, b| a.plot_value.total_cmp(&b.plot_value))
            .filter(|p| p.plot_value > 0.0)
            .map(|p| TopHit {
                gene_id: p.record.gene_id.clone(),
                gene_symbol: p.record.gene_symbol.clone(),
                chromosome: p.record.chromosome.clone().unwrap_or_default(),
                plot_value: p.plot_value,
            });
        LayoutSummary {
            input_records: self.input_records,
            positioned_genes: self.positioned.len(),
            dropped_by_whitelist: self.grouping.dropped_by_whitelist,
            dropped_missing_start: self.grouping.dropped_missing_start,
            merged_duplicates: self.grouping.merged_duplicates,
            dropped_overflow: self.overflowed,
            genes_per_chromosome,
            significant_genes,
            top_hit,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopHit {
    pub gene_id: String,
    pub gene_symbol: String,
    pub chromosome: String,
    pub plot_value: f64,
}

/// Counts describing one layout run.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutSummary {
    pub input_records: usize,
    pub positioned_genes: usize,
    /// No chromosome, or one outside the whitelist.
    pub dropped_by_whitelist: usize,
    pub dropped_missing_start: usize,
    /// Less significant duplicates of a positioned gene.
    pub merged_duplicates: usize,
    /// Axis position did not fit in `i64`.
    pub dropped_overflow: usize,
    pub genes_per_chromosome: Vec<(String, usize)>,
    pub significant_genes: usize,
    pub top_hit: Option<TopHit>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chromosome::group_and_dedupe;

    fn groups_of(records: &[StatisticalRecord]) -> ChromosomeGroups {
        group_and_dedupe(records, &ChromosomeOrder::mouse().valid_set())
    }

    #[test]
    fn test_single_record_per_chromosome() {
        let records = vec![
            StatisticalRecord::new("G1", "1", 100),
            StatisticalRecord::new("G2", "2", 100),
            StatisticalRecord::new("G3", "X", 100),
        ];
        let positions = assign_positions(
            &groups_of(&records),
            &ChromosomeOrder::mouse(),
            &ValueTransform::manhattan(),
        );
        let axis: Vec<i64> = positions.positioned.iter().map(|p| p.axis_position).collect();
        assert_eq!(axis, vec![100, 200, 300]);
        assert_eq!(positions.axis_max, 300);
        let labels: Vec<&str> = positions.ticks.iter().map(|t| t.label.as_str()).collect();
        assert_eq!(labels, vec!["1", "2", "X"]);
    }

    #[test]
    fn test_sorted_within_chromosome_and_ticks() {
        let records = vec![
            StatisticalRecord::new("B", "1", 500),
            StatisticalRecord::new("A", "1", 100),
            StatisticalRecord::new("C", "2", 50),
            StatisticalRecord::new("D", "2", 250),
        ];
        let positions = assign_positions(
            &groups_of(&records),
            &ChromosomeOrder::mouse(),
            &ValueTransform::manhattan(),
        );
        let axis: Vec<i64> = positions.positioned.iter().map(|p| p.axis_position).collect();
        assert_eq!(axis, vec![100, 500, 550, 750]);
        assert_eq!(positions.ticks[0].axis_midpoint, 300.0);
        assert_eq!(positions.ticks[1].axis_midpoint, 650.0);
        assert_eq!(positions.axis_max, 750);
        let second = &positions.spans[1];
        assert_eq!(positions.chromosome_records(second).len(), 2);
        assert_eq!(second.first_position, 550);
    }

    #[test]
    fn test_numeric_order_not_alphabetic() {
        let records = vec![
            StatisticalRecord::new("G10", "10", 10),
            StatisticalRecord::new("G9", "9", 10),
            StatisticalRecord::new("G11", "11", 10),
        ];
        let positions = assign_positions(
            &groups_of(&records),
            &ChromosomeOrder::mouse(),
            &ValueTransform::manhattan(),
        );
        let labels: Vec<&str> = positions.ticks.iter().map(|t| t.label.as_str()).collect();
        assert_eq!(labels, vec!["9", "10", "11"]);
    }

    #[test]
    fn test_empty_groups() {
        let positions = assign_positions(
            &ChromosomeGroups::new(),
            &ChromosomeOrder::mouse(),
            &ValueTransform::manhattan(),
        );
        assert!(positions.positioned.is_empty());
        assert!(positions.ticks.is_empty());
        assert_eq!(positions.axis_max, 0);
    }

    #[test]
    fn test_missing_start_left_out() {
        let mut unplaced = StatisticalRecord::new("G2", "2", 0);
        unplaced.sequence_start = None;
        let mut groups = groups_of(&[StatisticalRecord::new("G1", "1", 100)]);
        groups.entry("2".to_string()).or_default().insert("G2".into(), unplaced);
        let positions = assign_positions(&groups, &ChromosomeOrder::mouse(), &ValueTransform::manhattan());
        let axis: Vec<i64> = positions.positioned.iter().map(|p| p.axis_position).collect();
        assert_eq!(axis, vec![100]);
        assert_eq!(positions.ticks.len(), 1);
        assert_eq!(positions.axis_max, 100);
    }

    #[test]
    fn test_offset_overflow_does_not_panic() {
        let start = i64::MAX / 2 + 10;
        let records = vec![
            StatisticalRecord::new("G1", "1", start),
            StatisticalRecord::new("G2", "2", start),
            StatisticalRecord::new("G3", "3", 5),
        ];
        let positions = assign_positions(
            &groups_of(&records),
            &ChromosomeOrder::mouse(),
            &ValueTransform::manhattan(),
        );
        assert_eq!(positions.overflowed, 1);
        let labels: Vec<&str> = positions.ticks.iter().map(|t| t.label.as_str()).collect();
        assert_eq!(labels, vec!["1", "3"]);
        assert_eq!(positions.axis_max, start + 5);
    }

    #[test]
    fn test_plot_value_attached() {
        let records = vec![StatisticalRecord::new("G1", "1", 100).with_p_value(Some(1e-6))];
        let positions = assign_positions(
            &groups_of(&records),
            &ChromosomeOrder::mouse(),
            &ValueTransform::manhattan(),
        );
        assert!((positions.positioned[0].plot_value - 6.0).abs() < 1e-9);
    }
}
