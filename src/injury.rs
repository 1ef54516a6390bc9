//! Adjustment of projected minutes for injury and return-to-play status.

use anyhow::bail;
use chrono::{DateTime, Utc};
use ordinalizer::Ordinal;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

use crate::domain::Player;

/// Reported availability, ordered by increasing severity.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Ordinal,
    EnumIter,
    EnumString,
    Display,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum InjuryState {
    Available,
    DayToDay,
    Questionable,
    Doubtful,
    Out,
}
impl InjuryState {
    pub fn severity(&self) -> usize {
        self.ordinal()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InjuryStatus {
    pub player: Player,
    pub state: InjuryState,
    #[serde(default)]
    pub note: Option<String>,
    pub updated: DateTime<Utc>,
}

/// What the injury feed knows about a player.
#[derive(Debug, Clone, PartialEq)]
pub enum Availability {
    Reported(InjuryStatus),
    Unknown,
}
impl Availability {
    pub fn state(&self) -> InjuryState {
        match self {
            Availability::Reported(status) => status.state,
            Availability::Unknown => InjuryState::Available,
        }
    }

    pub fn source(&self) -> StatusSource {
        match self {
            Availability::Reported(_) => StatusSource::Reported,
            Availability::Unknown => StatusSource::Assumed,
        }
    }
}

impl From<Option<InjuryStatus>> for Availability {
    fn from(status: Option<InjuryStatus>) -> Self {
        match status {
            None => Availability::Unknown,
            Some(status) => Availability::Reported(status),
        }
    }
}

/// Whether the effective state came from a report or was assumed in its absence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusSource {
    Reported,
    Assumed,
}

/// Fractions of projected minutes retained under each limiting status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MinutesDiscounts {
    pub day_to_day: f64,
    pub questionable: f64,
    pub doubtful: f64,
}
impl MinutesDiscounts {
    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.doubtful <= 0. {
            bail!("retained fraction for doubtful must be positive");
        }
        if self.doubtful >= self.questionable {
            bail!("doubtful must retain fewer minutes than questionable");
        }
        if self.questionable >= self.day_to_day {
            bail!("questionable must retain fewer minutes than day-to-day");
        }
        if self.day_to_day > 1. {
            bail!("retained fraction for day-to-day cannot exceed 1");
        }
        Ok(())
    }

    pub fn retained(&self, state: InjuryState) -> f64 {
        match state {
            InjuryState::Available => 1.,
            InjuryState::DayToDay => self.day_to_day,
            InjuryState::Questionable => self.questionable,
            InjuryState::Doubtful => self.doubtful,
            InjuryState::Out => 0.,
        }
    }
}

impl Default for MinutesDiscounts {
    fn default() -> Self {
        Self {
            day_to_day: 0.9,
            questionable: 0.7,
            doubtful: 0.3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdjustedMinutes {
    pub minutes: f64,
    pub state: InjuryState,
    pub source: StatusSource,
}
impl AdjustedMinutes {
    pub fn is_excluded(&self) -> bool {
        self.state == InjuryState::Out
    }
}

pub fn adjust(
    minutes: f64,
    availability: &Availability,
    discounts: &MinutesDiscounts,
) -> AdjustedMinutes {
    let state = availability.state();
    AdjustedMinutes {
        minutes: minutes * discounts.retained(state),
        state,
        source: availability.source(),
    }
}
