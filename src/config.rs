//! Engine configuration. Every tunable is explicit here; nothing is read from ambient state.

use std::ops::RangeInclusive;

use anyhow::bail;
use serde::{Deserialize, Serialize};

use crate::confidence::ConfidenceOptions;
use crate::injury::MinutesDiscounts;
use crate::line::LineOptions;
use crate::parlay::ParlayOptions;
use crate::projection::Window;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationOptions {
    pub buckets: usize,
}
impl CalibrationOptions {
    pub fn validate(&self) -> Result<(), anyhow::Error> {
        const VALID_BUCKETS: RangeInclusive<usize> = 1..=100;
        if !VALID_BUCKETS.contains(&self.buckets) {
            bail!("number of calibration buckets must be in the range {VALID_BUCKETS:?}");
        }
        Ok(())
    }
}

impl Default for CalibrationOptions {
    fn default() -> Self {
        Self { buckets: 10 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Minimum fractional edge, in either direction, for a recommendation.
    pub min_edge: f64,
    pub window: Window,
    pub injury: MinutesDiscounts,
    pub confidence: ConfidenceOptions,
    pub lines: LineOptions,
    pub parlay: ParlayOptions,
    pub calibration: CalibrationOptions,
}
impl Config {
    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.min_edge.is_nan() || self.min_edge <= 0. || self.min_edge >= 1. {
            bail!("minimum edge must be in the range (0, 1)");
        }
        self.injury.validate()?;
        self.confidence.validate()?;
        self.lines.validate()?;
        self.parlay.validate()?;
        self.calibration.validate()?;
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            min_edge: 0.05,
            window: Window::default(),
            injury: MinutesDiscounts::default(),
            confidence: ConfidenceOptions::default(),
            lines: LineOptions::default(),
            parlay: ParlayOptions::default(),
            calibration: CalibrationOptions::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        Config::default().validate().unwrap();
    }

    #[test]
    fn invalid_sections_rejected() {
        let mut config = Config::default();
        config.min_edge = 0.;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.calibration.buckets = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.parlay.max_legs = 1;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.lines.max_age_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn partial_json_takes_defaults() {
        let json = r#"{"min_edge": 0.08, "window": "last10"}"#;
        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(0.08, config.min_edge);
        assert_eq!(Window::Last10, config.window);
        assert_eq!(ParlayOptions::default(), config.parlay);
        config.validate().unwrap();
    }

    #[test]
    fn bundled_default_matches() {
        let config: Config = serde_json::from_str(include_str!("../config/default.json")).unwrap();
        assert_eq!(Config::default(), config);
    }
}
