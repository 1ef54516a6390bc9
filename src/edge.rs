//! Edge of a predicted value over a posted line, and the directional call derived from it.

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
#[error("line {0} must be a finite positive number")]
pub struct InvalidLine(pub f64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Recommendation {
    Over,
    Under,
    None,
}
impl Recommendation {
    pub fn is_actionable(&self) -> bool {
        !matches!(self, Recommendation::None)
    }
}

impl Display for Recommendation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Recommendation::Over => write!(f, "OVER"),
            Recommendation::Under => write!(f, "UNDER"),
            Recommendation::None => write!(f, "NONE"),
        }
    }
}

pub fn validate_line(line: f64) -> Result<f64, InvalidLine> {
    if line.is_finite() && line > 0. {
        Ok(line)
    } else {
        Err(InvalidLine(line))
    }
}

/// Signed fractional edge, `(predicted - line) / line`.
pub fn compute_edge(predicted: f64, line: f64) -> Result<f64, InvalidLine> {
    let line = validate_line(line)?;
    Ok((predicted - line) / line)
}

pub fn recommend(edge: Option<f64>, min_edge: f64) -> Recommendation {
    match edge {
        Some(edge) if edge >= min_edge => Recommendation::Over,
        Some(edge) if edge <= -min_edge => Recommendation::Under,
        _ => Recommendation::None,
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeCall {
    pub edge: Option<f64>,
    pub recommendation: Recommendation,
}
impl EdgeCall {
    pub fn edge_percent(&self) -> Option<f64> {
        self.edge.map(|edge| edge * 100.)
    }
}

/// Compares a prediction to an optional line. An absent line, or one that fails validation,
/// yields no edge and [`Recommendation::None`].
pub fn evaluate(predicted: f64, line: Option<f64>, min_edge: f64) -> EdgeCall {
    let edge = line.and_then(|line| compute_edge(predicted, line).ok());
    EdgeCall {
        edge,
        recommendation: recommend(edge, min_edge),
    }
}

#[cfg(test)]
mod tests {
    use assert_float_eq::*;

    use super::*;

    const MIN_EDGE: f64 = 0.05;

    #[test]
    fn over_on_large_positive_edge() {
        let call = evaluate(28.5, Some(25.5), MIN_EDGE);
        assert_float_absolute_eq!(0.117647, call.edge.unwrap(), 1e-6);
        assert_float_absolute_eq!(11.7647, call.edge_percent().unwrap(), 1e-4);
        assert_eq!(Recommendation::Over, call.recommendation);
    }

    #[test]
    fn under_on_large_negative_edge() {
        let call = evaluate(20.0, Some(25.5), MIN_EDGE);
        assert!(call.edge.unwrap() < -MIN_EDGE);
        assert_eq!(Recommendation::Under, call.recommendation);
    }

    #[test]
    fn none_inside_threshold() {
        let call = evaluate(26.0, Some(25.5), MIN_EDGE);
        assert!(call.edge.is_some());
        assert_eq!(Recommendation::None, call.recommendation);
    }

    #[test]
    fn threshold_is_inclusive() {
        assert_eq!(Recommendation::Over, recommend(Some(MIN_EDGE), MIN_EDGE));
        assert_eq!(Recommendation::Under, recommend(Some(-MIN_EDGE), MIN_EDGE));
        assert_eq!(Recommendation::None, recommend(Some(0.0499), MIN_EDGE));
        assert_eq!(Recommendation::None, recommend(None, MIN_EDGE));
    }

    #[test]
    fn absent_or_invalid_line() {
        assert_eq!(
            EdgeCall { edge: None, recommendation: Recommendation::None },
            evaluate(30., None, MIN_EDGE)
        );
        assert_eq!(Err(InvalidLine(0.)), compute_edge(30., 0.));
        assert_eq!(Err(InvalidLine(-4.5)), compute_edge(30., -4.5));
        assert_eq!(Recommendation::None, evaluate(30., Some(0.), MIN_EDGE).recommendation);
        assert_eq!(None, evaluate(30., Some(-1.5), MIN_EDGE).edge);
    }

    #[test]
    fn serde_uppercase() {
        assert_eq!(r#""OVER""#, serde_json::to_string(&Recommendation::Over).unwrap());
        assert_eq!(Recommendation::None, serde_json::from_str(r#""NONE""#).unwrap());
    }
}
