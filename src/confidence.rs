//! Confidence scoring: a saturating function of edge magnitude and minutes-source quality, shrunk
//! toward the empirical correct rate of the calibration bucket it lands in.

use anyhow::bail;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::calibration::CalibrationTable;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceOptions {
    /// Edge (as a fraction) at which the edge component reaches `1 - 1/e` of its ceiling.
    pub edge_scale: f64,

    /// Share of raw confidence attributed to minutes-source quality; the remainder is attributed
    /// to edge magnitude.
    pub quality_weight: f64,

    /// Pseudo-count weighing the raw score against a bucket's observed correct rate. A bucket with
    /// this many samples moves the score halfway toward its rate.
    pub shrinkage_prior: f64,
}
impl ConfidenceOptions {
    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.edge_scale.is_nan() || self.edge_scale <= 0. {
            bail!("edge scale must be positive");
        }
        if !(0. ..=1.).contains(&self.quality_weight) {
            bail!("quality weight must be in [0, 1]");
        }
        if self.shrinkage_prior.is_nan() || self.shrinkage_prior < 0. {
            bail!("shrinkage prior cannot be negative");
        }
        Ok(())
    }
}

impl Default for ConfidenceOptions {
    fn default() -> Self {
        Self {
            edge_scale: 0.15,
            quality_weight: 0.3,
            shrinkage_prior: 20.,
        }
    }
}

/// `1 - exp(-|edge| / scale)`: zero without an edge, monotonic in magnitude, never reaching 1.
pub fn edge_component(edge: Option<f64>, edge_scale: f64) -> f64 {
    match edge {
        Some(edge) if edge.is_finite() => 1. - f64::exp(-edge.abs() / edge_scale),
        _ => 0.,
    }
}

pub fn raw_confidence(edge: Option<f64>, freshness: f64, options: &ConfidenceOptions) -> f64 {
    let quality = if freshness.is_finite() {
        freshness.clamp(0., 1.)
    } else {
        0.
    };
    options.quality_weight * quality
        + (1. - options.quality_weight) * edge_component(edge, options.edge_scale)
}

/// Blends `raw` toward the observed correct rate of its bucket, in proportion to how many samples
/// the bucket holds. Buckets without samples leave `raw` unmodified.
pub fn calibrate(raw: f64, table: &CalibrationTable, options: &ConfidenceOptions) -> f64 {
    let bucket = table.bucket_for(raw);
    match bucket.correct_rate() {
        None => raw,
        Some(rate) => {
            let samples = bucket.count as f64;
            let weight = samples / (samples + options.shrinkage_prior);
            trace!(
                "calibrating {raw:.4} toward {rate:.4} with weight {weight:.4} ({} samples)",
                bucket.count
            );
            raw + weight * (rate - raw)
        }
    }
}

/// The final score in [0, 1].
pub fn score(
    edge: Option<f64>,
    freshness: f64,
    table: &CalibrationTable,
    options: &ConfidenceOptions,
) -> f64 {
    let raw = raw_confidence(edge, freshness, options);
    calibrate(raw, table, options).clamp(0., 1.)
}
