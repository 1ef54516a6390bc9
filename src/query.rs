//! Derived views over collections of predictions and injury reports. Each view is a plain
//! function of its input; nothing is cached, so a view never outlives the data it was taken from.

use std::cmp::Ordering;

use crate::domain::GameId;
use crate::edge::Recommendation;
use crate::injury::{InjuryState, InjuryStatus};
use crate::prediction::Prediction;

pub fn for_game<'a>(
    predictions: impl IntoIterator<Item = &'a Prediction>,
    game: &'a GameId,
) -> impl Iterator<Item = &'a Prediction> {
    predictions
        .into_iter()
        .filter(move |prediction| &prediction.game == game)
}

pub fn for_team<'a>(
    predictions: impl IntoIterator<Item = &'a Prediction>,
    team: &'a str,
) -> impl Iterator<Item = &'a Prediction> {
    predictions
        .into_iter()
        .filter(move |prediction| prediction.player.team == team)
}

pub fn with_recommendation<'a>(
    predictions: impl IntoIterator<Item = &'a Prediction>,
    recommendation: Recommendation,
) -> impl Iterator<Item = &'a Prediction> {
    predictions
        .into_iter()
        .filter(move |prediction| prediction.recommendation == recommendation)
}

pub fn with_min_confidence<'a>(
    predictions: impl IntoIterator<Item = &'a Prediction>,
    min_confidence: f64,
) -> impl Iterator<Item = &'a Prediction> {
    predictions
        .into_iter()
        .filter(move |prediction| prediction.confidence >= min_confidence)
}

/// Highest confidence first; ties keep their input order.
pub fn by_confidence<'a>(
    predictions: impl IntoIterator<Item = &'a Prediction>,
) -> Vec<&'a Prediction> {
    let mut sorted: Vec<_> = predictions.into_iter().collect();
    sorted.sort_by(|a, b| {
        b.confidence
            .partial_cmp(&a.confidence)
            .unwrap_or(Ordering::Equal)
    });
    sorted
}

pub fn with_injury_state<'a>(
    statuses: impl IntoIterator<Item = &'a InjuryStatus>,
    state: InjuryState,
) -> impl Iterator<Item = &'a InjuryStatus> {
    statuses.into_iter().filter(move |status| status.state == state)
}
