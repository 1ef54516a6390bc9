//! Testing helpers.

use assert_float_eq::*;
use chrono::{DateTime, Utc};

use crate::domain::Player;
use crate::edge::Recommendation;
use crate::injury::{AdjustedMinutes, InjuryState, StatusSource};
use crate::line::BookmakerLine;
use crate::prediction::Prediction;
use crate::stat::StatKind;

pub fn assert_slice_f64_relative(expected: &[f64], actual: &[f64], epsilon: f64) {
    assert_eq!(
        expected.len(),
        actual.len(),
        "lengths do not match: {} ≠ {}",
        expected.len(),
        actual.len()
    );
    for (index, &expected) in expected.iter().enumerate() {
        let actual = actual[index];
        if actual != expected {
            assert_float_relative_eq!(expected, actual, epsilon);
        }
    }
}

pub fn fixed_time() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2026-02-01T00:00:00Z")
        .unwrap()
        .with_timezone(&Utc)
}

/// An actionable prediction with a single line priced at `price` on the recommended side. The
/// edge is derived from `predicted` against a line of 20.
pub fn prediction(
    name: &str,
    game: &str,
    stat_kind: StatKind,
    recommendation: Recommendation,
    price: i32,
    confidence: f64,
    predicted: f64,
) -> Prediction {
    const LINE: f64 = 20.;
    let player = Player::new(name, game.split('@').next().unwrap_or_default());
    Prediction {
        player: player.clone(),
        game: game.into(),
        stat_kind,
        predicted,
        line: Some(BookmakerLine {
            bookmaker: "book".into(),
            player,
            stat_kind,
            line: LINE,
            over_price: price,
            under_price: price,
            timestamp: fixed_time(),
        }),
        recommendation,
        confidence,
        edge: Some((predicted - LINE) / LINE),
        minutes: AdjustedMinutes {
            minutes: 32.,
            state: InjuryState::Available,
            source: StatusSource::Reported,
        },
    }
}
