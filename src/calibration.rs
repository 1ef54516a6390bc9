//! The calibration table: empirical correctness of past recommendations, bucketed by the confidence
//! that was stated at the time. Tables are immutable once built; [CalibrationStore] swaps them
//! wholesale so that readers observe either the old or the new table in its entirety.

use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock};

use serde::{Deserialize, Serialize};

use crate::stat::StatKind;

const BOUND_TOLERANCE: f64 = 1e-9;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CalibrationBucket {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
    pub correct: usize,
    pub incorrect: usize,
    pub mean_abs_error: f64,
    pub mean_signed_error: f64,
}
impl CalibrationBucket {
    pub fn midpoint(&self) -> f64 {
        (self.lower + self.upper) / 2.
    }

    /// Observed fraction of correct calls, if the bucket holds any samples.
    pub fn correct_rate(&self) -> Option<f64> {
        if self.count == 0 {
            None
        } else {
            Some(self.correct as f64 / self.count as f64)
        }
    }
}

/// Accuracy figures over a set of graded outcomes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Accuracy {
    pub graded: usize,
    pub correct: usize,
    pub accuracy_rate: f64,
    pub mean_abs_error: f64,
    pub mean_signed_error: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AccuracySummary {
    pub total: usize,
    pub ungraded: usize,
    pub overall: Accuracy,
    pub calibration_error: f64,
    pub brier_score: f64,
    pub by_stat_kind: BTreeMap<StatKind, Accuracy>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationTable {
    buckets: Vec<CalibrationBucket>,
    summary: AccuracySummary,
}
impl CalibrationTable {
    /// A table with `num_buckets` equal-width empty buckets spanning [0, 1].
    pub fn empty(num_buckets: usize) -> Self {
        let num_buckets = num_buckets.max(1);
        let width = 1. / num_buckets as f64;
        let buckets = (0..num_buckets)
            .map(|index| CalibrationBucket {
                lower: index as f64 * width,
                upper: (index + 1) as f64 * width,
                ..CalibrationBucket::default()
            })
            .collect();
        Self {
            buckets,
            summary: AccuracySummary::default(),
        }
    }

    pub(crate) fn new(buckets: Vec<CalibrationBucket>, summary: AccuracySummary) -> Self {
        Self { buckets, summary }
    }

    pub(crate) fn with_summary(self, summary: AccuracySummary) -> Self {
        Self { summary, ..self }
    }

    /// Bucket `i` covers `[i / n, (i + 1) / n)`; the last bucket also takes 1.0. Confidences a
    /// rounding error below a bound land above it, so 0.57 falls in bucket 57 of 100.
    pub fn bucket_index(num_buckets: usize, confidence: f64) -> usize {
        let index = (confidence * num_buckets as f64 + BOUND_TOLERANCE).floor();
        if index <= 0. {
            0
        } else {
            usize::min(index as usize, num_buckets - 1)
        }
    }

    pub fn bucket_for(&self, confidence: f64) -> &CalibrationBucket {
        &self.buckets[Self::bucket_index(self.buckets.len(), confidence)]
    }

    pub fn buckets(&self) -> &[CalibrationBucket] {
        &self.buckets
    }

    pub fn summary(&self) -> &AccuracySummary {
        &self.summary
    }

    pub fn samples(&self) -> usize {
        self.buckets.iter().map(|bucket| bucket.count).sum()
    }

    /// Mean absolute gap between each populated bucket's midpoint and its observed correct rate.
    /// Zero when no bucket holds samples.
    pub fn calibration_error(&self) -> f64 {
        let mut populated = 0;
        let mut total_gap = 0.;
        for bucket in &self.buckets {
            if let Some(rate) = bucket.correct_rate() {
                populated += 1;
                total_gap += f64::abs(bucket.midpoint() - rate);
            }
        }
        if populated == 0 {
            0.
        } else {
            total_gap / populated as f64
        }
    }
}

/// Holds the current table. Scoring passes take an [Arc] snapshot and keep using it even if a
/// rebuild lands mid-pass.
#[derive(Debug)]
pub struct CalibrationStore {
    current: RwLock<Arc<CalibrationTable>>,
}
impl CalibrationStore {
    pub fn new(table: CalibrationTable) -> Self {
        Self {
            current: RwLock::new(Arc::new(table)),
        }
    }

    pub fn snapshot(&self) -> Arc<CalibrationTable> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn replace(&self, table: CalibrationTable) -> Arc<CalibrationTable> {
        let table = Arc::new(table);
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = table.clone();
        table
    }
}
