//! phenoplot-core: genomic association aggregation for phenotyping results
//!
//! Turns a flat list of per-gene statistical-test results into plot-ready
//! data:
//! - a deduplicated, chromosome-ordered Manhattan layout with axis ticks and
//!   a significance reference line
//! - a ranked graphical-analysis view grouped by body system or procedure
//!
//! Every function here is pure. Layouts are rebuilt from scratch for each
//! input; memoisation is left to the caller.
//!
//! ## Example
//! ```ignore
//! use phenoplot_core::{build_manhattan, PipelineConfig};
//!
//! let layout = build_manhattan(&records, &PipelineConfig::default())?;
//! for tick in &layout.ticks {
//!     println!("{} @ {}", tick.label, tick.axis_midpoint);
//! }
//! ```

pub mod category;
pub mod chromosome;
pub mod config;
pub mod layout;
pub mod threshold;
pub mod transform;
pub mod types;

use anyhow::Result;

pub use category::{aggregate, is_significant, AggregationMode, CategoryBand, CategoryView, RankedRecord};
pub use chromosome::{
    group_and_dedupe, group_and_dedupe_with_stats, ChromosomeGroups, ChromosomeOrder, GroupingStats,
};
pub use config::PipelineConfig;
pub use layout::{assign_positions, ChromosomeSpan, LayoutSummary, ManhattanLayout, Positions};
pub use threshold::{threshold_line, threshold_position};
pub use transform::{transform, ValueTransform};
pub use types::{ChromosomeTick, PositionedRecord, StatisticalRecord, ThresholdPoint};

/// Group, deduplicate, position and anchor the threshold line in one pass.
pub fn build_manhattan(records: &[StatisticalRecord], config: &PipelineConfig) -> Result<ManhattanLayout> {
    let order = config.chromosome_order();
    if order.labels().is_empty() {
        tracing::warn!("chromosome order is empty; every record will be dropped");
    }
    let (groups, grouping) = group_and_dedupe_with_stats(records, &order.valid_set());
    let positions = assign_positions(&groups, &order, &config.manhattan_transform());
    let threshold_points = threshold_line(&positions, config.manhattan_threshold)?;
    Ok(ManhattanLayout::new(
        positions,
        threshold_points,
        config.manhattan_threshold,
        records.len(),
        grouping,
    ))
}

/// Rank records for the graphical-analysis view.
pub fn build_analysis(
    records: &[StatisticalRecord],
    mode: AggregationMode,
    significant_only: bool,
    config: &PipelineConfig,
) -> CategoryView {
    let ranked = aggregate(
        records,
        mode,
        significant_only,
        |r| config.significance_threshold(r),
        &config.analysis_transform(),
    );
    CategoryView::new(mode, significant_only, ranked)
}
