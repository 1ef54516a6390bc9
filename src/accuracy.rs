//! Grading of resolved predictions and the rebuild of the calibration table from them.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::calibration::{Accuracy, AccuracySummary, CalibrationBucket, CalibrationTable};
use crate::domain::{GameId, Player};
use crate::edge::Recommendation;
use crate::prediction::Prediction;
use crate::stat::StatKind;

/// A prediction paired with the value actually recorded once the game went final.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedOutcome {
    pub player: Player,
    pub game: GameId,
    pub stat_kind: StatKind,
    pub predicted: f64,
    pub line: Option<f64>,
    pub recommendation: Recommendation,
    pub confidence: f64,
    pub actual: f64,
    pub resolved: DateTime<Utc>,
}
impl ResolvedOutcome {
    pub fn from_prediction(prediction: &Prediction, actual: f64, resolved: DateTime<Utc>) -> Self {
        Self {
            player: prediction.player.clone(),
            game: prediction.game.clone(),
            stat_kind: prediction.stat_kind,
            predicted: prediction.predicted,
            line: prediction.line.as_ref().map(|line| line.line),
            recommendation: prediction.recommendation,
            confidence: prediction.confidence,
            actual,
            resolved,
        }
    }

    /// The result of the call, or [None] if no call was made against a line.
    pub fn verdict(&self) -> Option<Verdict> {
        let line = self.line?;
        let verdict = match self.recommendation {
            Recommendation::None => return None,
            _ if self.actual == line => Verdict::Push,
            Recommendation::Over if self.actual > line => Verdict::Correct,
            Recommendation::Under if self.actual < line => Verdict::Correct,
            _ => Verdict::Incorrect,
        };
        Some(verdict)
    }

    /// Signed error of the projection, `actual - predicted`.
    pub fn error(&self) -> f64 {
        self.actual - self.predicted
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Correct,
    Incorrect,
    Push,
}
impl Verdict {
    /// Pushes do not win the bet and so count against the call.
    pub fn is_correct(&self) -> bool {
        matches!(self, Verdict::Correct)
    }
}

/// Query parameters forwarded to the outcome source. Every criterion is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OutcomeFilter {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub stat_kinds: Option<Vec<StatKind>>,
    pub min_confidence: Option<f64>,
}
impl OutcomeFilter {
    pub fn matches(&self, outcome: &ResolvedOutcome) -> bool {
        if matches!(self.from, Some(from) if outcome.resolved < from) {
            return false;
        }
        if matches!(self.to, Some(to) if outcome.resolved > to) {
            return false;
        }
        if let Some(stat_kinds) = &self.stat_kinds {
            if !stat_kinds.contains(&outcome.stat_kind) {
                return false;
            }
        }
        !matches!(self.min_confidence, Some(floor) if outcome.confidence < floor)
    }
}

#[derive(Debug, Clone, Default)]
struct Accumulator {
    count: usize,
    correct: usize,
    abs_error: f64,
    signed_error: f64,
}
impl Accumulator {
    fn add(&mut self, correct: bool, error: f64) {
        self.count += 1;
        if correct {
            self.correct += 1;
        }
        self.abs_error += error.abs();
        self.signed_error += error;
    }

    fn mean(&self, sum: f64) -> f64 {
        if self.count == 0 {
            0.
        } else {
            sum / self.count as f64
        }
    }

    fn accuracy(&self) -> Accuracy {
        Accuracy {
            graded: self.count,
            correct: self.correct,
            accuracy_rate: self.mean(self.correct as f64),
            mean_abs_error: self.mean(self.abs_error),
            mean_signed_error: self.mean(self.signed_error),
        }
    }
}

/// Builds a fresh table from the full set of resolved outcomes. The input is not modified and the
/// result depends only on the input (including its order), so repeated rebuilds over the same
/// outcomes produce identical tables. An empty input yields an empty, zero-sample table.
pub fn rebuild(outcomes: &[ResolvedOutcome], num_buckets: usize) -> CalibrationTable {
    let template = CalibrationTable::empty(num_buckets);
    let num_buckets = template.buckets().len();
    let mut per_bucket: Vec<Accumulator> = vec![Accumulator::default(); num_buckets];
    let mut per_stat_kind: BTreeMap<StatKind, Accumulator> = BTreeMap::new();
    let mut overall = Accumulator::default();
    let mut squared_error = 0.;
    let mut ungraded = 0;

    for outcome in outcomes {
        let Some(verdict) = outcome.verdict() else {
            ungraded += 1;
            continue;
        };
        let correct = verdict.is_correct();
        let error = outcome.error();
        let index = CalibrationTable::bucket_index(num_buckets, outcome.confidence);
        per_bucket[index].add(correct, error);
        per_stat_kind.entry(outcome.stat_kind).or_default().add(correct, error);
        overall.add(correct, error);
        squared_error += (outcome.confidence - if correct { 1. } else { 0. }).powi(2);
    }

    let buckets: Vec<_> = template
        .buckets()
        .iter()
        .zip(per_bucket)
        .map(|(empty, accumulator)| CalibrationBucket {
            lower: empty.lower,
            upper: empty.upper,
            count: accumulator.count,
            correct: accumulator.correct,
            incorrect: accumulator.count - accumulator.correct,
            mean_abs_error: accumulator.mean(accumulator.abs_error),
            mean_signed_error: accumulator.mean(accumulator.signed_error),
        })
        .collect();

    let table = CalibrationTable::new(buckets, AccuracySummary::default());
    let summary = AccuracySummary {
        total: outcomes.len(),
        ungraded,
        overall: overall.accuracy(),
        calibration_error: table.calibration_error(),
        brier_score: overall.mean(squared_error),
        by_stat_kind: per_stat_kind
            .into_iter()
            .map(|(stat_kind, accumulator)| (stat_kind, accumulator.accuracy()))
            .collect(),
    };
    table.with_summary(summary)
}
