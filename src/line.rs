//! Bookmaker lines and the choice of a single line among several offered for the same prop.

use std::cmp::Ordering;

use anyhow::bail;
use chrono::{DateTime, Duration, Utc};
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use tracing::{trace, warn};

use crate::domain::{Bookmaker, Player};
use crate::edge::{validate_line, Recommendation};
use crate::odds;
use crate::odds::InvalidOdds;
use crate::stat::StatKind;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookmakerLine {
    pub bookmaker: Bookmaker,
    pub player: Player,
    pub stat_kind: StatKind,
    pub line: f64,
    pub over_price: i32,
    pub under_price: i32,
    pub timestamp: DateTime<Utc>,
}
impl BookmakerLine {
    /// The American price for the side being recommended.
    pub fn price(&self, recommendation: Recommendation) -> Option<i32> {
        match recommendation {
            Recommendation::Over => Some(self.over_price),
            Recommendation::Under => Some(self.under_price),
            Recommendation::None => None,
        }
    }

    pub fn overround(&self) -> Result<f64, InvalidOdds> {
        odds::overround(self.over_price, self.under_price)
    }

    pub fn is_fresh(&self, now: DateTime<Utc>, max_age: Duration) -> bool {
        self.timestamp > now - max_age
    }
}

/// An explicit total order over bookmakers, highest priority first. Bookmakers absent from the
/// order rank behind every listed one, alphabetically among themselves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BookmakerPriority(Vec<Bookmaker>);
impl BookmakerPriority {
    pub fn new(order: Vec<Bookmaker>) -> Self {
        Self(order)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.0.is_empty() {
            bail!("at least one bookmaker must be prioritised");
        }
        let mut seen = FxHashSet::default();
        for bookmaker in &self.0 {
            if !seen.insert(bookmaker) {
                bail!("bookmaker {bookmaker} appears more than once in the priority order");
            }
        }
        Ok(())
    }

    pub fn rank(&self, bookmaker: &Bookmaker) -> Option<usize> {
        self.0.iter().position(|listed| listed == bookmaker)
    }

    pub fn compare(&self, a: &Bookmaker, b: &Bookmaker) -> Ordering {
        let unlisted = self.0.len();
        let a_rank = self.rank(a).unwrap_or(unlisted);
        let b_rank = self.rank(b).unwrap_or(unlisted);
        a_rank.cmp(&b_rank).then_with(|| a.cmp(b))
    }
}

impl<const N: usize> From<[&str; N]> for BookmakerPriority {
    fn from(names: [&str; N]) -> Self {
        Self(names.into_iter().map(Bookmaker::from).collect())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineOptions {
    pub priority: BookmakerPriority,
    pub max_age_secs: u64,
}
impl LineOptions {
    pub fn validate(&self) -> Result<(), anyhow::Error> {
        self.priority.validate()?;
        const MAX_AGE_RANGE: std::ops::RangeInclusive<u64> = 1..=7 * 24 * 3_600;
        if !MAX_AGE_RANGE.contains(&self.max_age_secs) {
            bail!("maximum line age must be in the range {MAX_AGE_RANGE:?} seconds");
        }
        Ok(())
    }

    pub fn max_age(&self) -> Duration {
        Duration::seconds(self.max_age_secs as i64)
    }
}

impl Default for LineOptions {
    fn default() -> Self {
        Self {
            priority: BookmakerPriority::from(["draftkings", "fanduel", "betmgm"]),
            max_age_secs: 6 * 3_600,
        }
    }
}

/// Picks the line from the highest-priority bookmaker among those that are fresh as of `now`.
/// Lines with a non-positive value are treated as absent. When a bookmaker has posted several
/// fresh lines, the most recent wins.
pub fn select_line<'a>(
    lines: &'a [BookmakerLine],
    options: &LineOptions,
    now: DateTime<Utc>,
) -> Option<&'a BookmakerLine> {
    let max_age = options.max_age();
    let selected = lines
        .iter()
        .filter(|line| {
            if validate_line(line.line).is_err() {
                warn!(
                    "ignoring invalid {} line {} from {} for {}",
                    line.stat_kind, line.line, line.bookmaker, line.player
                );
                return false;
            }
            let fresh = line.is_fresh(now, max_age);
            if !fresh {
                trace!(
                    "stale {} line from {} posted at {}",
                    line.stat_kind,
                    line.bookmaker,
                    line.timestamp
                );
            }
            fresh
        })
        .min_by(|a, b| {
            options
                .priority
                .compare(&a.bookmaker, &b.bookmaker)
                .then_with(|| b.timestamp.cmp(&a.timestamp))
        })?;
    match selected.overround() {
        Ok(overround) => trace!(
            "selected {} line {} from {} with overround {overround:.4}",
            selected.stat_kind,
            selected.line,
            selected.bookmaker
        ),
        Err(err) => warn!(
            "selected {} line {} from {} for {} is unpriceable: {err}",
            selected.stat_kind, selected.line, selected.bookmaker, selected.player
        ),
    }
    Some(selected)
}
