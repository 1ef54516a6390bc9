//! Projection of a raw stat value from a per-36-minutes rate and a minutes figure.

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};
use thiserror::Error;

use crate::domain::{GameId, Player};
use crate::stat::{Component, StatKind};

/// Minutes in a regulation game. Projections are capped here.
pub const REGULATION_MINUTES: f64 = 48.;

/// The pace that rates are normalised to.
pub const PACE_MINUTES: f64 = 36.;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum InsufficientData {
    #[error("no qualifying rate")]
    MissingRate,

    #[error("no minutes projection")]
    MissingMinutes,

    #[error("rate {0} is not a finite non-negative number")]
    InvalidRate(f64),

    #[error("minutes {0} is not a finite non-negative number")]
    InvalidMinutes(f64),
}

/// The sample over which a rate was computed.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    EnumIter,
    EnumString,
    Display,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Window {
    #[default]
    Season,
    Last10,
    Last5,
}

/// Per-component quantities: either raw game-log totals or per-36 rates derived from them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Tally {
    pub points: f64,
    pub rebounds: f64,
    pub assists: f64,
    pub threes: f64,
}
impl Tally {
    pub fn component(&self, component: Component) -> f64 {
        match component {
            Component::Points => self.points,
            Component::Rebounds => self.rebounds,
            Component::Assists => self.assists,
            Component::Threes => self.threes,
        }
    }

    /// The value for a stat kind; composites sum their components.
    pub fn get(&self, stat_kind: StatKind) -> f64 {
        stat_kind
            .components()
            .iter()
            .map(|&component| self.component(component))
            .sum()
    }

    /// Normalises totals accumulated over `minutes` to a 36-minute pace.
    pub fn per_36(&self, minutes: f64) -> Result<Tally, InsufficientData> {
        if !minutes.is_finite() || minutes <= 0. {
            return Err(InsufficientData::InvalidMinutes(minutes));
        }
        let scale = PACE_MINUTES / minutes;
        Ok(Tally {
            points: self.points * scale,
            rebounds: self.rebounds * scale,
            assists: self.assists * scale,
            threes: self.threes * scale,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatProjection {
    pub player: Player,
    pub stat_kind: StatKind,
    pub per_36: f64,
    pub window: Window,
}
impl StatProjection {
    pub fn from_rates(player: Player, stat_kind: StatKind, rates: &Tally, window: Window) -> Self {
        Self {
            player,
            stat_kind,
            per_36: rates.get(stat_kind),
            window,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MinutesProjection {
    pub player: Player,
    pub game: GameId,
    pub minutes: f64,

    /// Confidence in the source, in [0, 1], derived from the freshness of the lineup report.
    pub freshness: f64,
}

/// Checks that `minutes` is a playable figure and caps it at regulation length.
pub fn cap_minutes(minutes: f64) -> Result<f64, InsufficientData> {
    if !minutes.is_finite() || minutes < 0. {
        return Err(InsufficientData::InvalidMinutes(minutes));
    }
    Ok(f64::min(minutes, REGULATION_MINUTES))
}

/// Predicted raw stat for a game: `per_36 × minutes / 36`. Minutes beyond regulation are capped.
pub fn project(per_36: Option<f64>, minutes: Option<f64>) -> Result<f64, InsufficientData> {
    let per_36 = per_36.ok_or(InsufficientData::MissingRate)?;
    if !per_36.is_finite() || per_36 < 0. {
        return Err(InsufficientData::InvalidRate(per_36));
    }
    let minutes = cap_minutes(minutes.ok_or(InsufficientData::MissingMinutes)?)?;
    Ok(per_36 * minutes / PACE_MINUTES)
}
