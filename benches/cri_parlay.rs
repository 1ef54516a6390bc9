use chrono::Utc;
use criterion::{criterion_group, criterion_main, Criterion};
use strum::IntoEnumIterator;
use tinyrand::{Rand, StdRand};

use propcast::domain::Player;
use propcast::edge::Recommendation;
use propcast::injury::{AdjustedMinutes, InjuryState, StatusSource};
use propcast::line::BookmakerLine;
use propcast::parlay::{ParlayOptions, ParlayRequest};
use propcast::prediction::Prediction;
use propcast::stat::StatKind;
use propcast::{odds, parlay};

fn slate(players: usize) -> Vec<Prediction> {
    let mut rand = StdRand::default();
    let timestamp = Utc::now();
    let mut predictions = Vec::with_capacity(players * 8);
    for index in 0..players {
        let team = format!("T{:02}", index % 10);
        let game = format!("T{:02}@T{:02}", index % 10 / 2 * 2, index % 10 / 2 * 2 + 1);
        let player = Player::new(format!("P{index}"), team);
        for stat_kind in StatKind::iter() {
            let line = 5. + (rand.next_u64() % 30) as f64 + 0.5;
            let predicted = line * (0.8 + (rand.next_u64() % 40) as f64 / 100.);
            let edge = (predicted - line) / line;
            let recommendation = if edge >= 0.05 {
                Recommendation::Over
            } else if edge <= -0.05 {
                Recommendation::Under
            } else {
                Recommendation::None
            };
            let price = -(100 + (rand.next_u64() % 60) as i32);
            predictions.push(Prediction {
                player: player.clone(),
                game: game.as_str().into(),
                stat_kind,
                predicted,
                line: Some(BookmakerLine {
                    bookmaker: "draftkings".into(),
                    player: player.clone(),
                    stat_kind,
                    line,
                    over_price: price,
                    under_price: price,
                    timestamp,
                }),
                recommendation,
                confidence: (rand.next_u64() % 100) as f64 / 100.,
                edge: Some(edge),
                minutes: AdjustedMinutes {
                    minutes: 32.,
                    state: InjuryState::Available,
                    source: StatusSource::Reported,
                },
            });
        }
    }
    predictions
}

fn criterion_benchmark(c: &mut Criterion) {
    let options = ParlayOptions::default();
    {
        let candidates = slate(20);
        let request = ParlayRequest {
            max_legs: 4,
            min_probability: 0.,
            game: None,
        };
        assert!(parlay::build(&candidates, &request, &options).is_ok());
        c.bench_function("cri_parlay_20_players_4_legs", |b| {
            b.iter(|| parlay::build(&candidates, &request, &options));
        });
    }
    {
        let candidates = slate(200);
        let request = ParlayRequest {
            max_legs: 6,
            min_probability: 0.,
            game: None,
        };
        assert!(parlay::build(&candidates, &request, &options).is_ok());
        c.bench_function("cri_parlay_200_players_6_legs", |b| {
            b.iter(|| parlay::build(&candidates, &request, &options));
        });
    }
    {
        let prices: Vec<_> = (0..6).map(|_| odds::american_to_decimal(-110).unwrap()).collect();
        c.bench_function("cri_parlay_combine_6", |b| {
            b.iter(|| odds::combine_decimal_odds(&prices));
        });
    }
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
