//! Assembly of a scored [Prediction] from a projected value and the lines on offer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::calibration::CalibrationTable;
use crate::config::Config;
use crate::domain::{GameId, Player};
use crate::edge::Recommendation;
use crate::injury::AdjustedMinutes;
use crate::line::BookmakerLine;
use crate::stat::StatKind;
use crate::{confidence, edge, line};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub player: Player,
    pub game: GameId,
    pub stat_kind: StatKind,
    pub predicted: f64,
    pub line: Option<BookmakerLine>,
    pub recommendation: Recommendation,

    /// Defined even without a recommendation, but only meaningful alongside one.
    pub confidence: f64,

    /// Signed fractional edge; absent when there is no line.
    pub edge: Option<f64>,
    pub minutes: AdjustedMinutes,
}
impl Prediction {
    pub fn edge_percent(&self) -> Option<f64> {
        self.edge.map(|edge| edge * 100.)
    }

    /// American price of the recommended side.
    pub fn price(&self) -> Option<i32> {
        self.line
            .as_ref()
            .and_then(|line| line.price(self.recommendation))
    }

    pub fn is_actionable(&self) -> bool {
        self.recommendation.is_actionable() && self.line.is_some()
    }
}

/// A projected stat, ready to be compared against the market.
#[derive(Debug, Clone, PartialEq)]
pub struct Projected {
    pub player: Player,
    pub game: GameId,
    pub stat_kind: StatKind,
    pub predicted: f64,
    pub freshness: f64,
    pub minutes: AdjustedMinutes,
}

/// Chooses a line (per the configured bookmaker priority and staleness cutoff), derives the edge
/// and recommendation against it, and scores confidence using the given calibration snapshot.
pub fn select(
    projected: Projected,
    lines: &[BookmakerLine],
    config: &Config,
    table: &CalibrationTable,
    now: DateTime<Utc>,
) -> Prediction {
    let chosen = line::select_line(lines, &config.lines, now).cloned();
    if chosen.is_none() && !lines.is_empty() {
        debug!(
            "none of {} lines qualify for {} {}",
            lines.len(),
            projected.player,
            projected.stat_kind
        );
    }
    let call = edge::evaluate(
        projected.predicted,
        chosen.as_ref().map(|line| line.line),
        config.min_edge,
    );
    let confidence = confidence::score(call.edge, projected.freshness, table, &config.confidence);
    Prediction {
        player: projected.player,
        game: projected.game,
        stat_kind: projected.stat_kind,
        predicted: projected.predicted,
        line: chosen,
        recommendation: call.recommendation,
        confidence,
        edge: call.edge,
        minutes: projected.minutes,
    }
}
