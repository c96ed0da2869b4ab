use anyhow::bail;
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use std::fmt;
use std::str::FromStr;

/// Direction of a price step: `Up` to beat a competing buy order,
/// `Down` to undercut a competing sell order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceDirection {
    Up,
    Down,
}

impl fmt::Display for PriceDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PriceDirection::Up => write!(f, "up"),
            PriceDirection::Down => write!(f, "down"),
        }
    }
}

impl FromStr for PriceDirection {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "up" => Ok(PriceDirection::Up),
            "down" => Ok(PriceDirection::Down),
            _ => bail!("Invalid direction: {}. Must be 'up' or 'down'", s),
        }
    }
}

/// Baseline significant figures for prices of 10.00 and above.
const BASE_SIGNIFICANT_FIGURES: i32 = 4;

/// Smallest significant step above `value`, for beating a buy order.
pub fn significant_increment(value: Decimal) -> Decimal {
    significant_step(value, PriceDirection::Up)
}

/// Smallest significant step below `value`, for undercutting a sell order.
pub fn significant_decrement(value: Decimal) -> Decimal {
    significant_step(value, PriceDirection::Down)
}

/// Computes the next "significant" price step away from `value`.
///
/// The step size scales with the magnitude of the price, mimicking the
/// smallest tick a trader would realistically move by: a 0.05 price steps
/// by a different absolute amount than a 5,000,000 price. The result is
/// rounded to 2 decimal places, half-up.
///
/// Total over the whole `Decimal` domain: non-positive inputs yield zero
/// ("no meaningful step"), and a zero result must be treated as such by
/// callers.
pub fn significant_step(value: Decimal, direction: PriceDirection) -> Decimal {
    if value <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    // 0.01 is the minimum currency unit, nothing to undercut
    if value == dec!(0.01) {
        return match direction {
            PriceDirection::Up => dec!(0.02),
            PriceDirection::Down => dec!(0.01),
        };
    }
    let mut figures = if value < dec!(0.1) {
        BASE_SIGNIFICANT_FIGURES - 3
    } else if value < Decimal::ONE {
        BASE_SIGNIFICANT_FIGURES - 2
    } else if value < dec!(10) {
        BASE_SIGNIFICANT_FIGURES - 1
    } else {
        BASE_SIGNIFICANT_FIGURES
    };
    let exponent = base_ten_exponent(value);
    // Round numbers like 100.00 step down to 99.00, not 90.00. Only
    // applies going down; going up keeps the coarse step.
    if direction == PriceDirection::Down && value > dec!(10) && value == pow_ten(exponent) {
        figures += 1;
    }
    let power = pow_ten(exponent - figures + 1);
    let scaled = value / power;
    let stepped = match direction {
        PriceDirection::Up => scaled + Decimal::ONE,
        PriceDirection::Down => scaled - Decimal::ONE,
    };
    // Saturate instead of overflowing at the top of the decimal range
    let result = stepped.checked_mul(power).unwrap_or(Decimal::MAX);
    result.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// `floor(log10(value))` for `value > 0`, computed exactly in decimal so
/// the power-of-ten check above cannot misfire on float representation.
fn base_ten_exponent(value: Decimal) -> i32 {
    let mut v = value;
    let mut exponent = 0;
    while v >= Decimal::TEN {
        v /= Decimal::TEN;
        exponent += 1;
    }
    while v < Decimal::ONE {
        v *= Decimal::TEN;
        exponent -= 1;
    }
    exponent
}

fn pow_ten(exponent: i32) -> Decimal {
    let mut result = Decimal::ONE;
    if exponent >= 0 {
        for _ in 0..exponent {
            result *= Decimal::TEN;
        }
    } else {
        for _ in 0..-exponent {
            result /= Decimal::TEN;
        }
    }
    result
}
