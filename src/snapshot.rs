//! An in-memory [DataSource] loaded from a single JSON document.

use chrono::{DateTime, Utc};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::accuracy::{OutcomeFilter, ResolvedOutcome};
use crate::domain::{GameId, Player};
use crate::engine::{DataSource, ScoreRequest};
use crate::injury::InjuryStatus;
use crate::line::BookmakerLine;
use crate::projection::{MinutesProjection, Tally, Window};
use crate::stat::StatKind;

/// Totals a player accumulated over a window, and the minutes it took.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Production {
    pub player: Player,
    #[serde(default)]
    pub window: Window,
    pub totals: Tally,
    pub minutes: f64,
}

/// Everything the feeds had to say at one point in time, plus the props to be scored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Snapshot {
    /// Reference time for line staleness; the wall clock is used when absent.
    pub now: Option<DateTime<Utc>>,
    pub production: Vec<Production>,
    pub minutes: Vec<MinutesProjection>,
    pub injuries: Vec<InjuryStatus>,
    pub lines: Vec<BookmakerLine>,
    pub outcomes: Vec<ResolvedOutcome>,
    pub requests: Vec<ScoreRequest>,
}

/// A [Snapshot] indexed for lookup.
#[derive(Debug, Default)]
pub struct SnapshotSource {
    rates: FxHashMap<(Player, Window), Tally>,
    minutes: FxHashMap<(Player, GameId), MinutesProjection>,
    injuries: FxHashMap<Player, InjuryStatus>,
    lines: FxHashMap<(Player, StatKind), Vec<BookmakerLine>>,
    outcomes: Vec<ResolvedOutcome>,
}

impl From<Snapshot> for SnapshotSource {
    fn from(snapshot: Snapshot) -> Self {
        let mut source = SnapshotSource::default();
        for production in snapshot.production {
            match production.totals.per_36(production.minutes) {
                Ok(rates) => {
                    let key = (production.player, production.window);
                    if source.rates.contains_key(&key) {
                        warn!("duplicate {} production for {}; keeping the later", key.1, key.0);
                    }
                    source.rates.insert(key, rates);
                }
                Err(err) => {
                    warn!("no {} rates for {}: {err}", production.window, production.player);
                }
            }
        }
        for minutes in snapshot.minutes {
            let key = (minutes.player.clone(), minutes.game.clone());
            let fresher = match source.minutes.get(&key) {
                None => true,
                Some(existing) => {
                    warn!(
                        "duplicate minutes projection for {} in {}; keeping the fresher",
                        key.0, key.1
                    );
                    minutes.freshness >= existing.freshness
                }
            };
            if fresher {
                source.minutes.insert(key, minutes);
            }
        }
        for status in snapshot.injuries {
            let newer = source
                .injuries
                .get(&status.player)
                .map_or(true, |existing| status.updated > existing.updated);
            if newer {
                source.injuries.insert(status.player.clone(), status);
            }
        }
        for line in snapshot.lines {
            source
                .lines
                .entry((line.player.clone(), line.stat_kind))
                .or_default()
                .push(line);
        }
        source.outcomes = snapshot.outcomes;
        debug!(
            "indexed {} rate sets, {} minutes projections, {} injury reports, {} line groups, \
             {} outcomes",
            source.rates.len(),
            source.minutes.len(),
            source.injuries.len(),
            source.lines.len(),
            source.outcomes.len()
        );
        source
    }
}

impl DataSource for SnapshotSource {
    fn stat_rate(&self, player: &Player, stat_kind: StatKind, window: Window) -> Option<f64> {
        self.rates
            .get(&(player.clone(), window))
            .map(|rates| rates.get(stat_kind))
    }

    fn minutes_projection(&self, player: &Player, game: &GameId) -> Option<MinutesProjection> {
        self.minutes.get(&(player.clone(), game.clone())).cloned()
    }

    fn injury_status(&self, player: &Player) -> Option<InjuryStatus> {
        self.injuries.get(player).cloned()
    }

    fn bookmaker_lines(&self, player: &Player, stat_kind: StatKind) -> Vec<BookmakerLine> {
        self.lines
            .get(&(player.clone(), stat_kind))
            .cloned()
            .unwrap_or_default()
    }

    fn resolved_outcomes(&self, filter: &OutcomeFilter) -> Vec<ResolvedOutcome> {
        self.outcomes
            .iter()
            .filter(|outcome| filter.matches(outcome))
            .cloned()
            .collect()
    }
}
