//! Significance reference line for the Manhattan view
//!
//! The line is piecewise linear: one anchor per chromosome. Chromosome 1
//! anchors at the start of the axis, X at its last record, and every other
//! chromosome at its lower-middle record (index `len / 2`), which is not the
//! true chromosome midpoint.

use anyhow::{bail, Result};

use crate::layout::Positions;
use crate::types::{PositionedRecord, ThresholdPoint};

/// x-position of the threshold anchor for `chromosome`.
///
/// `records` are that chromosome's positioned records sorted by axis
/// position. An empty slice is a caller error.
pub fn threshold_position(chromosome: &str, records: &[PositionedRecord]) -> Result<i64> {
    if records.is_empty() {
        bail!("No positioned records for chromosome {}", chromosome);
    }
    let position = match chromosome {
        "1" => 0,
        "X" => records[records.len() - 1].axis_position,
        _ => records[records.len() / 2].axis_position,
    };
    Ok(position)
}

/// One threshold anchor per chromosome present in `positions`, in axis order.
pub fn threshold_line(positions: &Positions, value: f64) -> Result<Vec<ThresholdPoint>> {
    positions
        .spans
        .iter()
        .map(|span| {
            let axis_position =
                threshold_position(&span.chromosome, positions.chromosome_records(span))?;
            Ok(ThresholdPoint { axis_position, value })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::StatisticalRecord;

    fn positioned(axis: &[i64]) -> Vec<PositionedRecord> {
        axis.iter()
            .map(|&a| PositionedRecord {
                record: StatisticalRecord::new("G", "2", a),
                axis_position: a,
                plot_value: 0.0,
            })
            .collect()
    }

    #[test]
    fn test_first_chromosome_starts_axis() {
        assert_eq!(threshold_position("1", &positioned(&[40, 50, 60])).unwrap(), 0);
    }

    #[test]
    fn test_x_uses_last_record() {
        assert_eq!(threshold_position("X", &positioned(&[40, 50, 60, 70])).unwrap(), 70);
    }

    #[test]
    fn test_lower_middle_record() {
        assert_eq!(threshold_position("5", &positioned(&[10, 20, 30, 40])).unwrap(), 30);
        assert_eq!(threshold_position("5", &positioned(&[10, 20, 30])).unwrap(), 20);
        assert_eq!(threshold_position("5", &positioned(&[10])).unwrap(), 10);
    }

    #[test]
    fn test_empty_is_error() {
        assert!(threshold_position("7", &[]).is_err());
        assert!(threshold_position("1", &[]).is_err());
    }
}
