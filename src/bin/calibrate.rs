use std::env;
use std::error::Error;
use std::path::PathBuf;

use anyhow::bail;
use clap::Parser;
use serde::Serialize;
use tracing::{debug, info};

use propcast::accuracy::OutcomeFilter;
use propcast::calibration::{AccuracySummary, CalibrationBucket};
use propcast::config::Config;
use propcast::display::DisplayPercent;
use propcast::engine::Engine;
use propcast::file::ReadJsonFile;
use propcast::snapshot::{Snapshot, SnapshotSource};
use propcast::stat::StatKind;

#[derive(Debug, clap::Parser, Clone)]
struct Args {
    /// snapshot file to source the resolved outcomes from, or `-` for stdin
    snapshot: PathBuf,

    /// engine configuration; defaults apply when omitted
    #[clap(short = 'c', long)]
    config: Option<PathBuf>,

    /// restrict to a stat kind (e.g. points, points_rebounds_assists)
    #[clap(short = 's', long)]
    stat: Option<StatKind>,

    /// ignore outcomes stated with less confidence than this
    #[clap(long)]
    min_confidence: Option<f64>,
}
impl Args {
    fn validate(&self) -> anyhow::Result<()> {
        if matches!(self.min_confidence, Some(min) if !(0. ..=1.).contains(&min)) {
            bail!("minimum confidence must be in [0, 1]");
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
struct Report<'a> {
    summary: &'a AccuracySummary,
    buckets: &'a [CalibrationBucket],
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
    let source = SnapshotSource::from(Snapshot::read_json_file(&args.snapshot)?);

    let filter = OutcomeFilter {
        stat_kinds: args.stat.map(|stat_kind| vec![stat_kind]),
        min_confidence: args.min_confidence,
        ..OutcomeFilter::default()
    };
    let table = engine.rebuild_calibration(&source, &filter);
    for bucket in table.buckets().iter().filter(|bucket| bucket.count > 0) {
        info!(
            "{:.2}-{:.2}: {} samples, {} correct ({})",
            bucket.lower,
            bucket.upper,
            bucket.count,
            bucket.correct,
            DisplayPercent(bucket.correct_rate().unwrap_or_default())
        );
    }
    let report = Report {
        summary: table.summary(),
        buckets: table.buckets(),
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
