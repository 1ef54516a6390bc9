//! Combination of scored predictions into a priced parlay.
//!
//! Legs are ranked by `confidence × |edge|` and picked greedily, skipping any leg whose stat kind
//! nests with one already picked for the same player. The naive joint probability is the product
//! of each leg's implied probability; legs sharing a game are then discounted per same-game pair.
//! The price is the product of the legs' decimal prices and is not affected by the discount. If
//! the discounted probability falls below the requested floor, the lowest-ranked leg is dropped
//! and the remainder repriced, down to two legs.

use std::ops::RangeInclusive;

use anyhow::bail;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, trace};

use crate::display::DisplaySlice;
use crate::domain::{Bookmaker, GameId, Player};
use crate::edge::Recommendation;
use crate::odds;
use crate::odds::{InvalidOdds, MarketPrice};
use crate::prediction::Prediction;
use crate::stat::StatKind;


/// Fewest legs a parlay may have.
pub const MIN_LEGS: usize = 2;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParlayOptions {
    /// Ceiling on the number of legs any request may ask for.
    pub max_legs: usize,

    /// Fraction of the naive probability removed per same-game pair of legs.
    pub correlation_factor: f64,
}
impl ParlayOptions {
    pub fn validate(&self) -> Result<(), anyhow::Error> {
        const VALID_MAX_LEGS: RangeInclusive<usize> = MIN_LEGS..=20;
        if !VALID_MAX_LEGS.contains(&self.max_legs) {
            bail!("maximum number of legs must be in the range {VALID_MAX_LEGS:?}");
        }
        let factor = self.correlation_factor;
        if factor.is_nan() || factor <= 0. || factor > 1. {
            bail!("correlation factor must be in the range (0, 1]");
        }
        Ok(())
    }
}

impl Default for ParlayOptions {
    fn default() -> Self {
        Self {
            max_legs: 6,
            correlation_factor: 0.1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParlayRequest {
    pub max_legs: usize,
    pub min_probability: f64,

    /// Restricts candidates to a single game when set.
    #[serde(default)]
    pub game: Option<GameId>,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum Ineligible {
    #[error("no recommendation")]
    NoRecommendation,

    #[error("no line")]
    NoLine,

    #[error("no edge")]
    NoEdge,

    #[error("{0}")]
    InvalidPrice(#[from] InvalidOdds),
}

/// A frozen copy of a prediction's call at the time the parlay was built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParlayLeg {
    pub player: Player,
    pub game: GameId,
    pub stat_kind: StatKind,
    pub recommendation: Recommendation,
    pub bookmaker: Bookmaker,
    pub line: f64,
    pub price: i32,
    pub decimal: f64,
    pub probability: f64,
    pub confidence: f64,
    pub edge: f64,
}
impl ParlayLeg {
    pub fn snapshot(prediction: &Prediction) -> Result<Self, Ineligible> {
        if !prediction.recommendation.is_actionable() {
            return Err(Ineligible::NoRecommendation);
        }
        let line = prediction.line.as_ref().ok_or(Ineligible::NoLine)?;
        let edge = prediction.edge.ok_or(Ineligible::NoEdge)?;
        let price = line
            .price(prediction.recommendation)
            .ok_or(Ineligible::NoRecommendation)?;
        Ok(Self {
            player: prediction.player.clone(),
            game: prediction.game.clone(),
            stat_kind: prediction.stat_kind,
            recommendation: prediction.recommendation,
            bookmaker: line.bookmaker.clone(),
            line: line.line,
            price,
            decimal: odds::american_to_decimal(price)?,
            probability: odds::american_to_probability(price)?,
            confidence: prediction.confidence,
            edge,
        })
    }

    pub fn rank_score(&self) -> f64 {
        self.confidence * self.edge.abs()
    }

    fn conflicts_with(&self, other: &ParlayLeg) -> bool {
        self.player == other.player && self.stat_kind.nests_with(&other.stat_kind)
    }
}

impl MarketPrice for ParlayLeg {
    fn decimal(&self) -> f64 {
        self.decimal
    }
}

impl std::fmt::Display for ParlayLeg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {} {} {} @ {:+}",
            self.player.name, self.stat_kind, self.recommendation, self.line, self.price
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parlay {
    pub legs: Vec<ParlayLeg>,
    pub naive_probability: f64,
    pub adjusted_probability: f64,
    pub decimal_odds: f64,
    pub american_odds: i64,
    pub expected_value: f64,
    pub same_game_pairs: usize,
}

impl MarketPrice for Parlay {
    fn decimal(&self) -> f64 {
        self.decimal_odds
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum NoViableParlay {
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("{usable} usable legs; at least 2 required")]
    TooFewLegs { usable: usize },

    #[error("best two-leg probability {best} is below the floor {floor}")]
    BelowFloor { best: f64, floor: f64 },

    #[error("{0}")]
    Unpriceable(#[from] InvalidOdds),
}

/// Number of unordered leg pairs that share a game.
pub fn count_same_game_pairs(legs: &[ParlayLeg]) -> usize {
    let mut per_game: FxHashMap<&GameId, usize> = FxHashMap::default();
    for leg in legs {
        *per_game.entry(&leg.game).or_default() += 1;
    }
    per_game.values().map(|&legs| legs * (legs - 1) / 2).sum()
}

/// `naive × (1 - min(1, factor × pairs))`; never negative and never above `naive`.
pub fn discount(naive_probability: f64, same_game_pairs: usize, correlation_factor: f64) -> f64 {
    let reduction = f64::min(1., correlation_factor * same_game_pairs as f64).max(0.);
    naive_probability * (1. - reduction)
}

pub fn expected_value(probability: f64, decimal_odds: f64) -> f64 {
    probability * (decimal_odds - 1.) - (1. - probability)
}

/// Prices a fixed set of legs.
pub fn price(legs: Vec<ParlayLeg>, correlation_factor: f64) -> Result<Parlay, InvalidOdds> {
    let naive_probability: f64 = legs.iter().map(|leg| leg.probability).product();
    let same_game_pairs = count_same_game_pairs(&legs);
    let adjusted_probability = discount(naive_probability, same_game_pairs, correlation_factor);
    let decimal_odds = odds::combine_decimal_odds(&legs);
    let american_odds = odds::decimal_to_american(decimal_odds)?;
    Ok(Parlay {
        legs,
        naive_probability,
        adjusted_probability,
        decimal_odds,
        american_odds,
        expected_value: expected_value(adjusted_probability, decimal_odds),
        same_game_pairs,
    })
}

/// Eligible legs ranked best-first. Ties keep their input order.
fn rank(candidates: &[Prediction], game: Option<&GameId>) -> Vec<ParlayLeg> {
    let mut legs: Vec<_> = candidates
        .iter()
        .filter(|prediction| game.map_or(true, |game| &prediction.game == game))
        .filter_map(|prediction| match ParlayLeg::snapshot(prediction) {
            Ok(leg) => Some(leg),
            Err(err) => {
                trace!("skipping {} {}: {err}", prediction.player, prediction.stat_kind);
                None
            }
        })
        .collect();
    legs.sort_by(|a, b| b.rank_score().total_cmp(&a.rank_score()));
    legs
}

fn pick(ranked: Vec<ParlayLeg>, max_legs: usize) -> Vec<ParlayLeg> {
    let mut picked: Vec<ParlayLeg> = Vec::with_capacity(max_legs);
    for leg in ranked {
        if picked.len() == max_legs {
            break;
        }
        if let Some(existing) = picked.iter().find(|existing| existing.conflicts_with(&leg)) {
            debug!("skipping {leg}: nests with {existing}");
            continue;
        }
        picked.push(leg);
    }
    picked
}

pub fn build(
    candidates: &[Prediction],
    request: &ParlayRequest,
    options: &ParlayOptions,
) -> Result<Parlay, NoViableParlay> {
    if !(MIN_LEGS..=options.max_legs).contains(&request.max_legs) {
        return Err(NoViableParlay::InvalidRequest(format!(
            "number of legs must be in the range {MIN_LEGS}..={}",
            options.max_legs
        )));
    }
    if !(0. ..=1.).contains(&request.min_probability) {
        return Err(NoViableParlay::InvalidRequest(
            "minimum probability must be in [0, 1]".into(),
        ));
    }

    let mut legs = pick(rank(candidates, request.game.as_ref()), request.max_legs);
    if legs.len() < MIN_LEGS {
        return Err(NoViableParlay::TooFewLegs { usable: legs.len() });
    }

    loop {
        let parlay = price(legs.clone(), options.correlation_factor)?;
        if parlay.adjusted_probability >= request.min_probability {
            debug!(
                "built {}-leg parlay {} with probability {:.4} (naive {:.4}) at {:.2}",
                parlay.legs.len(),
                DisplaySlice::from(&*parlay.legs),
                parlay.adjusted_probability,
                parlay.naive_probability,
                parlay.decimal_odds
            );
            return Ok(parlay);
        }
        if legs.len() == MIN_LEGS {
            return Err(NoViableParlay::BelowFloor {
                best: parlay.adjusted_probability,
                floor: request.min_probability,
            });
        }
        if let Some(dropped) = legs.pop() {
            debug!(
                "probability {:.4} below floor {:.4}; dropping {dropped}",
                parlay.adjusted_probability, request.min_probability
            );
        }
    }
}
