//! Chromosome ordering, grouping and per-gene deduplication

use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use tracing::debug;

use crate::types::{GeneId, StatisticalRecord};

/// Deduplicated records: chromosome -> gene id -> most significant record.
pub type ChromosomeGroups = BTreeMap<String, BTreeMap<GeneId, StatisticalRecord>>;

const MOUSE_CHROMOSOMES: [&str; 20] = [
    "1", "2", "3", "4", "5", "6", "7", "8", "9", "10", "11", "12", "13", "14", "15", "16", "17",
    "18", "19", "X",
];

/// Biological ordering of chromosomes along the genome axis.
///
/// Never sorted alphabetically: "10" follows "9".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChromosomeOrder {
    labels: Vec<String>,
}

impl Default for ChromosomeOrder {
    fn default() -> Self {
        Self::mouse()
    }
}

impl ChromosomeOrder {
    /// Build from labels in genome order. Repeated labels keep their first position.
    pub fn new<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut seen = HashSet::new();
        let labels = labels
            .into_iter()
            .map(Into::into)
            .filter(|label: &String| seen.insert(label.clone()))
            .collect();
        Self { labels }
    }

    /// Mouse autosomes 1..19 followed by X.
    pub fn mouse() -> Self {
        Self::new(MOUSE_CHROMOSOMES)
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.labels.iter().map(String::as_str)
    }

    pub fn contains(&self, chromosome: &str) -> bool {
        self.labels.iter().any(|c| c == chromosome)
    }

    pub fn valid_set(&self) -> HashSet<String> {
        self.labels.iter().cloned().collect()
    }
}

/// Counts of records removed while grouping.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupingStats {
    /// No chromosome, or one outside the whitelist.
    pub dropped_by_whitelist: usize,
    /// On a valid chromosome but without a start coordinate.
    pub dropped_missing_start: usize,
    /// Less significant duplicates of an already grouped gene.
    pub merged_duplicates: usize,
}

/// Group records by chromosome, keeping the lowest p-value record per gene.
///
/// Records on chromosomes outside `valid_chromosomes` (or with no chromosome)
/// are dropped, as are records without a start coordinate. An incoming record
/// replaces the stored one only when its p-value is present and strictly
/// lower; a missing p-value never wins and exact ties keep the first record
/// seen.
pub fn group_and_dedupe(
    records: &[StatisticalRecord],
    valid_chromosomes: &HashSet<String>,
) -> ChromosomeGroups {
    group_and_dedupe_with_stats(records, valid_chromosomes).0
}

/// [`group_and_dedupe`], also reporting what was removed.
pub fn group_and_dedupe_with_stats(
    records: &[StatisticalRecord],
    valid_chromosomes: &HashSet<String>,
) -> (ChromosomeGroups, GroupingStats) {
    let mut groups = ChromosomeGroups::new();
    let mut stats = GroupingStats::default();

    for record in records {
        let chromosome = match record.chromosome.as_deref() {
            Some(c) if valid_chromosomes.contains(c) => c,
            _ => {
                stats.dropped_by_whitelist += 1;
                continue;
            }
        };
        if record.sequence_start.is_none() {
            stats.dropped_missing_start += 1;
            continue;
        }

        let genes = groups.entry(chromosome.to_string()).or_default();
        match genes.get_mut(&record.gene_id) {
            None => {
                genes.insert(record.gene_id.clone(), record.clone());
            }
            Some(stored) => {
                stats.merged_duplicates += 1;
                if is_more_significant(record.reported_p_value, stored.reported_p_value) {
                    *stored = record.clone();
                }
            }
        }
    }

    debug!(
        input = records.len(),
        dropped_by_whitelist = stats.dropped_by_whitelist,
        dropped_missing_start = stats.dropped_missing_start,
        merged_duplicates = stats.merged_duplicates,
        chromosomes = groups.len(),
        "grouped statistical records"
    );
    (groups, stats)
}

fn is_more_significant(incoming: Option<f64>, stored: Option<f64>) -> bool {
    match (incoming, stored) {
        (None, _) => false,
        (Some(p), _) if p.is_nan() => false,
        (Some(_), None) => true,
        (Some(p), Some(q)) => q.is_nan() || p < q,
    }
}
