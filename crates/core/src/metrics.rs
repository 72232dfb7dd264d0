//! Interaction counts for dashboard metric cards.

use crate::classify::{classify, Classification};
use crate::constants::GENESIS_BLOCK_NO;
use crate::interaction::RawInteraction;
use serde::{Deserialize, Serialize};

/// Counts over one interaction chain (or several, summed). `total == flagged + clear`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateMetrics {
    pub total: u64,
    pub flagged: u64,
    pub clear: u64,
}

impl AggregateMetrics {
    fn record(&mut self, class: Classification) {
        self.total += 1;
        match class {
            Classification::Flagged => self.flagged += 1,
            Classification::Clear => self.clear += 1,
        }
    }
}

impl std::ops::Add for AggregateMetrics {
    type Output = AggregateMetrics;

    fn add(self, rhs: Self) -> Self::Output {
        AggregateMetrics {
            total: self.total + rhs.total,
            flagged: self.flagged + rhs.flagged,
            clear: self.clear + rhs.clear,
        }
    }
}

impl std::iter::Sum for AggregateMetrics {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(AggregateMetrics::default(), |acc, m| acc + m)
    }
}

/// The genesis block is a placeholder, not an interaction.
pub fn is_genesis_block(record: &RawInteraction) -> bool {
    record.block_no == GENESIS_BLOCK_NO
}

/// Tally flagged and clear interactions, skipping records matched by `exclude_sentinel`.
pub fn aggregate<F>(records: &[RawInteraction], exclude_sentinel: F) -> AggregateMetrics
where
    F: Fn(&RawInteraction) -> bool,
{
    let mut metrics = AggregateMetrics::default();
    for record in records.iter().filter(|r| !exclude_sentinel(r)) {
        metrics.record(classify(&record.normalize()));
    }
    metrics
}
