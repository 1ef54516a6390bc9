use std::env;
use std::error::Error;
use std::path::PathBuf;

use anyhow::bail;
use chrono::Utc;
use clap::Parser;
use serde::Serialize;
use tracing::{debug, info, warn};

use propcast::accuracy::OutcomeFilter;
use propcast::calibration::AccuracySummary;
use propcast::config::Config;
use propcast::display::DisplaySlice;
use propcast::engine::{Engine, ScoreRequest};
use propcast::file::{ReadJsonFile, WriteJsonFile};
use propcast::parlay::{Parlay, ParlayRequest};
use propcast::prediction::Prediction;
use propcast::query;
use propcast::snapshot::{Snapshot, SnapshotSource};

#[derive(Debug, clap::Parser, Clone)]
struct Args {
    /// snapshot file to source the feeds from, or `-` for stdin
    snapshot: PathBuf,

    /// engine configuration; defaults apply when omitted
    #[clap(short = 'c', long)]
    config: Option<PathBuf>,

    /// write the report here instead of to stdout
    #[clap(short = 'o', long)]
    out: Option<PathBuf>,

    /// also build a parlay of up to this many legs
    #[clap(long)]
    parlay_legs: Option<usize>,

    /// floor on the parlay's adjusted probability
    #[clap(long, default_value = "0")]
    min_probability: f64,
}
impl Args {
    fn validate(&self) -> anyhow::Result<()> {
        if !(0. ..=1.).contains(&self.min_probability) {
            bail!("minimum probability must be in [0, 1]");
        }
        if matches!(self.parlay_legs, Some(legs) if legs < 2) {
            bail!("a parlay needs at least two legs");
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
struct SkippedEntry {
    request: ScoreRequest,
    reason: String,
}

#[derive(Debug, Serialize)]
struct Report {
    predictions: Vec<Prediction>,
    skipped: Vec<SkippedEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    parlay: Option<Parlay>,
    #[serde(skip_serializing_if = "Option::is_none")]
    parlay_error: Option<String>,
    calibration: AccuracySummary,
}

fn main() -> Result<(), Box<dyn Error>> {
    if env::var("RUST_BACKTRACE").is_err() {
        env::set_var("RUST_BACKTRACE", "full")
    }
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info")
    }
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    args.validate()?;
    debug!("args: {args:?}");

    let config = match &args.config {
        None => Config::default(),
        Some(path) => Config::read_json_file(path)?,
    };
    let engine = Engine::try_from(config)?;

    let mut snapshot = Snapshot::read_json_file(&args.snapshot)?;
    let now = snapshot.now.unwrap_or_else(Utc::now);
    let requests = std::mem::take(&mut snapshot.requests);
    let source = SnapshotSource::from(snapshot);

    engine.rebuild_calibration(&source, &OutcomeFilter::default());
    let batch = engine.score_batch(&source, &requests, now);
    info!(
        "scored {} props, skipped {}",
        batch.predictions.len(),
        batch.skipped.len()
    );
    for prediction in query::by_confidence(&batch.predictions) {
        if prediction.is_actionable() {
            info!(
                "{} {} {} {:.1} (predicted {:.2}, edge {:+.1}%, confidence {:.3})",
                prediction.player,
                prediction.stat_kind,
                prediction.recommendation,
                prediction.line.as_ref().map_or(0., |line| line.line),
                prediction.predicted,
                prediction.edge_percent().unwrap_or_default(),
                prediction.confidence
            );
        }
    }

    let (parlay, parlay_error) = match args.parlay_legs {
        None => (None, None),
        Some(max_legs) => {
            let request = ParlayRequest {
                max_legs,
                min_probability: args.min_probability,
                game: None,
            };
            match engine.build_parlay(&batch.predictions, &request) {
                Ok(parlay) => {
                    info!(
                        "parlay {} at {:+} (probability {:.4}, EV {:+.4})",
                        DisplaySlice::from(&*parlay.legs),
                        parlay.american_odds,
                        parlay.adjusted_probability,
                        parlay.expected_value
                    );
                    (Some(parlay), None)
                }
                Err(err) => {
                    warn!("no viable parlay: {err}");
                    (None, Some(err.to_string()))
                }
            }
        }
    };

    let report = Report {
        predictions: batch.predictions,
        skipped: batch
            .skipped
            .into_iter()
            .map(|skipped| SkippedEntry {
                request: skipped.request,
                reason: skipped.error.to_string(),
            })
            .collect(),
        parlay,
        parlay_error,
        calibration: engine.calibration_summary(),
    };
    match &args.out {
        Some(path) => {
            report.write_json_file(path)?;
            info!("report written to {}", path.display());
        }
        None => println!("{}", serde_json::to_string_pretty(&report)?),
    }
    Ok(())
}
