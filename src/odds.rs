//! Conversions between American odds, decimal odds and implied probabilities.

use thiserror::Error;

/// American odds of +100 and -100 both denote an even-money price; the decimal equivalent is
/// 2.0, which maps back to +100.
pub const EVEN_MONEY: f64 = 2.0;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum InvalidOdds {
    #[error("American odds cannot be zero")]
    ZeroAmerican,

    #[error("decimal odds {0} must be finite and greater than 1")]
    Decimal(f64),

    #[error("decimal odds {0} have no representable American equivalent")]
    Unrepresentable(f64),
}

/// Anything that carries a decimal price.
pub trait MarketPrice {
    fn decimal(&self) -> f64;
}

impl MarketPrice for f64 {
    fn decimal(&self) -> f64 {
        *self
    }
}

pub fn american_to_decimal(odds: i32) -> Result<f64, InvalidOdds> {
    match odds {
        0 => Err(InvalidOdds::ZeroAmerican),
        odds if odds > 0 => Ok(odds as f64 / 100. + 1.),
        odds => Ok(100. / odds.unsigned_abs() as f64 + 1.),
    }
}

/// The win probability implied by an American price, in (0, 1).
pub fn american_to_probability(odds: i32) -> Result<f64, InvalidOdds> {
    match odds {
        0 => Err(InvalidOdds::ZeroAmerican),
        odds if odds > 0 => Ok(100. / (odds as f64 + 100.)),
        odds => {
            let magnitude = odds.unsigned_abs() as f64;
            Ok(magnitude / (magnitude + 100.))
        }
    }
}

/// The decimal price of a multi, being the product of the individual prices. An empty set of
/// legs yields 1.0.
pub fn combine_decimal_odds<'a, P: MarketPrice + 'a>(
    prices: impl IntoIterator<Item = &'a P>,
) -> f64 {
    prices.into_iter().map(|price| price.decimal()).product()
}

/// American odds are widened to `i64`, as long multis readily exceed the `i32` range. Prices
/// beyond even that are rejected rather than saturated.
pub fn decimal_to_american(decimal: f64) -> Result<i64, InvalidOdds> {
    if !decimal.is_finite() || decimal <= 1. {
        return Err(InvalidOdds::Decimal(decimal));
    }
    let american = if decimal >= EVEN_MONEY {
        ((decimal - 1.) * 100.).round()
    } else {
        (-100. / (decimal - 1.)).round()
    };
    // i64::MAX as f64 rounds up to 2^63, which is itself out of range
    if !american.is_finite() || american.abs() >= i64::MAX as f64 {
        return Err(InvalidOdds::Unrepresentable(decimal));
    }
    Ok(american as i64)
}

/// The bookmaker's margin on a two-way market: the sum of the implied probabilities of both sides.
/// A fair market has an overround of 1.0.
pub fn overround(over: i32, under: i32) -> Result<f64, InvalidOdds> {
    Ok(american_to_probability(over)? + american_to_probability(under)?)
}
