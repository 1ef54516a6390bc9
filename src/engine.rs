//! The scoring engine and the contract it consumes from its data collaborators.
//!
//! [Engine] is `Send + Sync`. Any number of threads may score concurrently; each scoring pass reads
//! one calibration snapshot, and [Engine::rebuild_calibration] publishes a replacement table
//! without disturbing passes already underway.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::accuracy::{OutcomeFilter, ResolvedOutcome};
use crate::calibration::{AccuracySummary, CalibrationStore, CalibrationTable};
use crate::config::Config;
use crate::display::DisplayPercent;
use crate::domain::{GameId, Player};
use crate::injury::{Availability, InjuryStatus};
use crate::line::BookmakerLine;
use crate::parlay::{NoViableParlay, Parlay, ParlayRequest};
use crate::prediction::{Prediction, Projected};
use crate::projection::{InsufficientData, MinutesProjection, Window};
use crate::stat::StatKind;
use crate::timed::Timed;
use crate::{accuracy, injury, parlay, prediction, projection};

#[cfg(test)]
mod tests;

/// Materialised inputs supplied by the stats, lineup, injury, odds and outcome feeds. A `None`
/// or empty result means the feed has nothing for that key.
pub trait DataSource {
    fn stat_rate(&self, player: &Player, stat_kind: StatKind, window: Window) -> Option<f64>;

    fn minutes_projection(&self, player: &Player, game: &GameId) -> Option<MinutesProjection>;

    fn injury_status(&self, player: &Player) -> Option<InjuryStatus>;

    fn bookmaker_lines(&self, player: &Player, stat_kind: StatKind) -> Vec<BookmakerLine>;

    fn resolved_outcomes(&self, filter: &OutcomeFilter) -> Vec<ResolvedOutcome>;
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScoreError {
    #[error("insufficient data: {0}")]
    InsufficientData(#[from] InsufficientData),

    #[error("{player} is ruled out")]
    Excluded { player: Player },
}

/// A (player, game, stat kind) tuple to be scored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreRequest {
    pub player: Player,
    pub game: GameId,
    pub stat_kind: StatKind,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Skipped {
    pub request: ScoreRequest,
    pub error: ScoreError,
}

/// The result of scoring many requests. Failures are isolated per request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Batch {
    pub predictions: Vec<Prediction>,
    pub skipped: Vec<Skipped>,
}

#[derive(Debug)]
pub struct Engine {
    config: Config,
    calibration: CalibrationStore,
}
impl Engine {
    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn score_prediction(
        &self,
        source: &impl DataSource,
        player: &Player,
        game: &GameId,
        stat_kind: StatKind,
        now: DateTime<Utc>,
    ) -> Result<Prediction, ScoreError> {
        let table = self.calibration.snapshot();
        self.score_against(source, player, game, stat_kind, &table, now)
    }

    /// Scores every request against a single calibration snapshot.
    pub fn score_batch(
        &self,
        source: &impl DataSource,
        requests: &[ScoreRequest],
        now: DateTime<Utc>,
    ) -> Batch {
        let table = self.calibration.snapshot();
        let mut batch = Batch::default();
        for request in requests {
            let scored = self.score_against(
                source,
                &request.player,
                &request.game,
                request.stat_kind,
                &table,
                now,
            );
            match scored {
                Ok(prediction) => batch.predictions.push(prediction),
                Err(error) => {
                    debug!(
                        "skipping {} {} in {}: {error}",
                        request.player, request.stat_kind, request.game
                    );
                    batch.skipped.push(Skipped {
                        request: request.clone(),
                        error,
                    });
                }
            }
        }
        debug!(
            "scored {} of {} requests",
            batch.predictions.len(),
            requests.len()
        );
        batch
    }

    fn score_against(
        &self,
        source: &impl DataSource,
        player: &Player,
        game: &GameId,
        stat_kind: StatKind,
        table: &CalibrationTable,
        now: DateTime<Utc>,
    ) -> Result<Prediction, ScoreError> {
        let minutes = source
            .minutes_projection(player, game)
            .ok_or(InsufficientData::MissingMinutes)?;
        let capped = projection::cap_minutes(minutes.minutes)?;
        let availability = Availability::from(source.injury_status(player));
        let adjusted = injury::adjust(capped, &availability, &self.config.injury);
        if adjusted.is_excluded() {
            return Err(ScoreError::Excluded {
                player: player.clone(),
            });
        }

        let rate = source.stat_rate(player, stat_kind, self.config.window);
        let predicted = projection::project(rate, Some(adjusted.minutes))?;
        let lines = source.bookmaker_lines(player, stat_kind);
        let projected = Projected {
            player: player.clone(),
            game: game.clone(),
            stat_kind,
            predicted,
            freshness: minutes.freshness,
            minutes: adjusted,
        };
        Ok(prediction::select(projected, &lines, &self.config, table, now))
    }

    /// Combines the supplied predictions, which are read once and not retained.
    pub fn build_parlay(
        &self,
        candidates: &[Prediction],
        request: &ParlayRequest,
    ) -> Result<Parlay, NoViableParlay> {
        parlay::build(candidates, request, &self.config.parlay)
    }

    /// Rebuilds the calibration table from the outcomes matching `filter` and publishes it to
    /// subsequent scoring passes.
    pub fn rebuild_calibration(
        &self,
        source: &impl DataSource,
        filter: &OutcomeFilter,
    ) -> Arc<CalibrationTable> {
        let outcomes = source.resolved_outcomes(filter);
        let timed = Timed::value(|| accuracy::rebuild(&outcomes, self.config.calibration.buckets));
        let summary = timed.value.summary();
        info!(
            "rebuilt calibration from {} outcomes ({} graded) in {:.3}s: accuracy {}, \
             calibration error {:.4}",
            summary.total,
            summary.overall.graded,
            timed.elapsed.as_secs_f64(),
            DisplayPercent(summary.overall.accuracy_rate),
            summary.calibration_error
        );
        self.calibration.replace(timed.value)
    }

    pub fn calibration(&self) -> Arc<CalibrationTable> {
        self.calibration.snapshot()
    }

    pub fn calibration_summary(&self) -> AccuracySummary {
        self.calibration.snapshot().summary().clone()
    }
}

impl TryFrom<Config> for Engine {
    type Error = anyhow::Error;

    fn try_from(config: Config) -> Result<Self, Self::Error> {
        config.validate()?;
        let table = CalibrationTable::empty(config.calibration.buckets);
        Ok(Self {
            calibration: CalibrationStore::new(table),
            config,
        })
    }
}

