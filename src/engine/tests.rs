use std::thread;

use assert_float_eq::*;
use chrono::Duration;

use crate::edge::Recommendation;
use crate::injury::{InjuryState, StatusSource};
use crate::projection::Tally;
use crate::snapshot::{Production, Snapshot, SnapshotSource};
use crate::testing::fixed_time;

use super::*;

fn guard() -> Player {
    Player::new("A. Guard", "BOS")
}

fn forward() -> Player {
    Player::new("B. Forward", "NYK")
}

fn production(player: Player, points: f64, rebounds: f64) -> Production {
    Production {
        player,
        window: Window::Season,
        totals: Tally {
            points,
            rebounds,
            assists: 0.,
            threes: 0.,
        },
        minutes: 360.,
    }
}

fn minutes(player: Player, game: &str, minutes: f64) -> MinutesProjection {
    MinutesProjection {
        player,
        game: game.into(),
        minutes,
        freshness: 1.,
    }
}

fn line(player: Player, stat_kind: StatKind, value: f64) -> BookmakerLine {
    BookmakerLine {
        bookmaker: "draftkings".into(),
        player,
        stat_kind,
        line: value,
        over_price: -110,
        under_price: -110,
        timestamp: fixed_time() - Duration::minutes(5),
    }
}

fn injury(player: Player, state: InjuryState) -> InjuryStatus {
    InjuryStatus {
        player,
        state,
        note: None,
        updated: fixed_time() - Duration::hours(2),
    }
}

fn outcome(confidence: f64, actual: f64) -> ResolvedOutcome {
    ResolvedOutcome {
        player: guard(),
        game: "BOS@MIA".into(),
        stat_kind: StatKind::Points,
        predicted: 27.,
        line: Some(25.5),
        recommendation: Recommendation::Over,
        confidence,
        actual,
        resolved: fixed_time() - Duration::days(3),
    }
}

/// The guard projects 30 points against a line of 25.5; the forward 10 rebounds against 12.5.
fn snapshot() -> Snapshot {
    Snapshot {
        now: Some(fixed_time()),
        production: vec![production(guard(), 300., 40.), production(forward(), 150., 100.)],
        minutes: vec![minutes(guard(), "BOS@NYK", 36.), minutes(forward(), "BOS@NYK", 36.)],
        injuries: vec![],
        lines: vec![
            line(guard(), StatKind::Points, 25.5),
            line(forward(), StatKind::Rebounds, 12.5),
        ],
        outcomes: (0..10)
            .map(|index| outcome(0.85, if index < 6 { 30. } else { 20. }))
            .collect(),
        requests: vec![],
    }
}

fn engine() -> Engine {
    Engine::try_from(Config::default()).unwrap()
}

#[test]
fn scores_over_without_injury_report() {
    let source = SnapshotSource::from(snapshot());
    let prediction = engine()
        .score_prediction(&source, &guard(), &"BOS@NYK".into(), StatKind::Points, fixed_time())
        .unwrap();
    assert_eq!(30., prediction.predicted);
    assert_eq!(Recommendation::Over, prediction.recommendation);
    assert_eq!(StatusSource::Assumed, prediction.minutes.source);
    assert_eq!(InjuryState::Available, prediction.minutes.state);
    assert!(prediction.confidence > 0. && prediction.confidence <= 1.);
}

#[test]
fn injury_discount_flips_call() {
    let mut snapshot = snapshot();
    snapshot.injuries.push(injury(guard(), InjuryState::Questionable));
    let source = SnapshotSource::from(snapshot);
    let prediction = engine()
        .score_prediction(&source, &guard(), &"BOS@NYK".into(), StatKind::Points, fixed_time())
        .unwrap();
    assert_float_absolute_eq!(21., prediction.predicted);
    assert_eq!(Recommendation::Under, prediction.recommendation);
    assert_eq!(StatusSource::Reported, prediction.minutes.source);
    assert_eq!(InjuryState::Questionable, prediction.minutes.state);
}

#[test]
fn ruled_out_is_excluded() {
    let mut snapshot = snapshot();
    snapshot.injuries.push(injury(guard(), InjuryState::Out));
    let source = SnapshotSource::from(snapshot);
    assert_eq!(
        Err(ScoreError::Excluded { player: guard() }),
        engine().score_prediction(
            &source,
            &guard(),
            &"BOS@NYK".into(),
            StatKind::Points,
            fixed_time()
        )
    );
}

#[test]
fn insufficient_data() {
    let source = SnapshotSource::from(snapshot());
    let engine = engine();
    assert_eq!(
        Err(ScoreError::InsufficientData(InsufficientData::MissingMinutes)),
        engine.score_prediction(
            &source,
            &guard(),
            &"BOS@MIA".into(),
            StatKind::Points,
            fixed_time()
        )
    );

    let mut snapshot = snapshot();
    snapshot.minutes.push(minutes(Player::new("C. Rookie", "BOS"), "BOS@NYK", 12.));
    let source = SnapshotSource::from(snapshot);
    assert_eq!(
        Err(ScoreError::InsufficientData(InsufficientData::MissingRate)),
        engine.score_prediction(
            &source,
            &Player::new("C. Rookie", "BOS"),
            &"BOS@NYK".into(),
            StatKind::Points,
            fixed_time()
        )
    );
}

#[test]
fn no_line_yields_none() {
    let source = SnapshotSource::from(snapshot());
    let prediction = engine()
        .score_prediction(&source, &guard(), &"BOS@NYK".into(), StatKind::Assists, fixed_time())
        .unwrap();
    assert_eq!(Recommendation::None, prediction.recommendation);
    assert_eq!(None, prediction.line);
}

#[test]
fn batch_isolates_failures() {
    let source = SnapshotSource::from(snapshot());
    let requests = vec![
        ScoreRequest {
            player: guard(),
            game: "BOS@NYK".into(),
            stat_kind: StatKind::Points,
        },
        ScoreRequest {
            player: Player::new("C. Rookie", "BOS"),
            game: "BOS@NYK".into(),
            stat_kind: StatKind::Points,
        },
        ScoreRequest {
            player: forward(),
            game: "BOS@NYK".into(),
            stat_kind: StatKind::Rebounds,
        },
    ];
    let batch = engine().score_batch(&source, &requests, fixed_time());
    assert_eq!(2, batch.predictions.len());
    assert_eq!(1, batch.skipped.len());
    assert_eq!(requests[1], batch.skipped[0].request);
    assert_eq!(Recommendation::Under, batch.predictions[1].recommendation);
}

#[test]
fn rebuild_publishes_new_table() {
    let source = SnapshotSource::from(snapshot());
    let engine = engine();
    let before = engine.calibration();
    assert_eq!(0, before.samples());

    let rebuilt = engine.rebuild_calibration(&source, &OutcomeFilter::default());
    assert_eq!(10, rebuilt.samples());
    assert_eq!(0, before.samples());
    let summary = engine.calibration_summary();
    assert_eq!(10, summary.total);
    assert_eq!(0.6, summary.overall.accuracy_rate);

    let again = engine.rebuild_calibration(&source, &OutcomeFilter::default());
    assert_eq!(*rebuilt, *again);
}

#[test]
fn rebuild_honours_filter() {
    let source = SnapshotSource::from(snapshot());
    let engine = engine();
    let filter = OutcomeFilter {
        stat_kinds: Some(vec![StatKind::Rebounds]),
        ..OutcomeFilter::default()
    };
    let table = engine.rebuild_calibration(&source, &filter);
    assert_eq!(0, table.samples());
    assert_eq!(0, engine.calibration_summary().total);
}

#[test]
fn calibration_shifts_confidence() {
    let mut snapshot = snapshot();
    snapshot.outcomes.clear();
    for bucket in 0..10 {
        let confidence = bucket as f64 / 10. + 0.05;
        snapshot.outcomes.extend((0..100).map(|_| outcome(confidence, 20.)));
    }
    let source = SnapshotSource::from(snapshot);
    let engine = engine();
    let uncalibrated = engine
        .score_prediction(&source, &guard(), &"BOS@NYK".into(), StatKind::Points, fixed_time())
        .unwrap();
    engine.rebuild_calibration(&source, &OutcomeFilter::default());
    let calibrated = engine
        .score_prediction(&source, &guard(), &"BOS@NYK".into(), StatKind::Points, fixed_time())
        .unwrap();
    // every bucket has only ever been wrong
    assert!(calibrated.confidence < uncalibrated.confidence);
}

#[test]
fn parlay_from_batch() {
    let source = SnapshotSource::from(snapshot());
    let engine = engine();
    let requests = vec![
        ScoreRequest {
            player: guard(),
            game: "BOS@NYK".into(),
            stat_kind: StatKind::Points,
        },
        ScoreRequest {
            player: forward(),
            game: "BOS@NYK".into(),
            stat_kind: StatKind::Rebounds,
        },
    ];
    let batch = engine.score_batch(&source, &requests, fixed_time());
    let parlay = engine
        .build_parlay(
            &batch.predictions,
            &ParlayRequest {
                max_legs: 2,
                min_probability: 0.,
                game: None,
            },
        )
        .unwrap();
    assert_eq!(2, parlay.legs.len());
    assert_eq!(1, parlay.same_game_pairs);
    assert!(parlay.adjusted_probability < parlay.naive_probability);
}

#[test]
fn invalid_config_rejected() {
    let mut config = Config::default();
    config.min_edge = -0.1;
    assert!(Engine::try_from(config).is_err());
}

#[test]
fn concurrent_scoring_during_rebuild() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Engine>();

    let source = &SnapshotSource::from(snapshot());
    let engine = &engine();
    thread::scope(|scope| {
        let scorers: Vec<_> = (0..4)
            .map(|_| {
                scope.spawn(move || {
                    (0..50)
                        .map(|_| {
                            engine
                                .score_prediction(
                                    source,
                                    &guard(),
                                    &"BOS@NYK".into(),
                                    StatKind::Points,
                                    fixed_time(),
                                )
                                .unwrap()
                        })
                        .collect::<Vec<_>>()
                })
            })
            .collect();
        scope.spawn(move || {
            for _ in 0..10 {
                engine.rebuild_calibration(source, &OutcomeFilter::default());
            }
        });
        for scorer in scorers {
            for prediction in scorer.join().unwrap() {
                assert_eq!(Recommendation::Over, prediction.recommendation);
                assert!((0. ..=1.).contains(&prediction.confidence));
            }
        }
    });
    assert_eq!(10, engine.calibration().samples());
}
