//! Scoring of player-prop predictions against bookmaker lines, and correlation-aware valuation of
//! parlays built from them.
//!
//! A prediction projects a player's stat from a per-36 rate and injury-adjusted minutes, compares
//! it with the best available line to derive an edge and an OVER/UNDER call, and attaches a
//! confidence that is calibrated against the historical accuracy of past calls.

pub mod accuracy;
pub mod calibration;
pub mod confidence;
pub mod config;
pub mod display;
pub mod domain;
pub mod edge;
pub mod engine;
pub mod file;
pub mod injury;
pub mod line;
pub mod odds;
pub mod parlay;
pub mod prediction;
pub mod projection;
pub mod query;
pub mod snapshot;
pub mod stat;
pub mod timed;

#[cfg(test)]
pub(crate) mod testing;

#[doc = include_str!("../README.md")]
#[cfg(doc)]
fn readme() {}
