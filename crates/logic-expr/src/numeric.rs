//! Float helpers whose rounding and sign conventions differ from the bare
//! IEEE operators.

/// Largest digit count that can still change a finite `f64` when rounding.
const MAX_ROUND_DIGITS: i64 = 323;
/// Below this, rounding to `10^-digits` sends every finite `f64` to zero.
const MIN_ROUND_DIGITS: i64 = -308;

/// Remainder with the sign of the divisor. A zero remainder carries the
/// divisor's sign. The caller rejects a zero divisor.
pub fn floor_mod(dividend: f64, divisor: f64) -> f64 {
    let remainder = dividend % divisor;
    if remainder == 0.0 {
        return 0.0_f64.copysign(divisor);
    }
    if (divisor < 0.0) != (remainder < 0.0) {
        remainder + divisor
    } else {
        remainder
    }
}

/// Quotient rounded toward negative infinity, consistent with
/// [`floor_mod`]: `a == b * floor_div(a, b) + floor_mod(a, b)` up to rounding.
pub fn floor_div(dividend: f64, divisor: f64) -> f64 {
    let remainder = dividend % divisor;
    let mut quotient = (dividend - remainder) / divisor;
    if remainder != 0.0 && (divisor < 0.0) != (remainder < 0.0) {
        quotient -= 1.0;
    }
    if quotient == 0.0 {
        return 0.0_f64.copysign(dividend / divisor);
    }
    let mut floored = quotient.floor();
    if quotient - floored > 0.5 {
        floored += 1.0;
    }
    floored
}

/// Rounds the exact binary value of `value` to `digits` decimal places,
/// breaking exact ties toward the even neighbour.
///
/// `round_to_digits(2.675, 2)` is `2.67` because the stored value of
/// `2.675` lies just below the midpoint.
pub fn round_to_digits(value: f64, digits: i64) -> f64 {
    if !value.is_finite() || value == 0.0 || digits > MAX_ROUND_DIGITS {
        return value;
    }
    if digits < MIN_ROUND_DIGITS {
        return 0.0_f64.copysign(value);
    }
    if digits >= 0 {
        // Fixed-precision formatting works on the exact binary expansion
        // and rounds ties to even, which is the rule we want.
        let precision = digits as usize;
        let rendered = format!("{value:.precision$}");
        return rendered.parse::<f64>().unwrap_or(value);
    }
    let scale = 10_f64.powi((-digits) as i32);
    let rounded = (value / scale).round_ties_even() * scale;
    if rounded == 0.0 {
        0.0_f64.copysign(value)
    } else {
        rounded
    }
}

#[cfg(test)]
#[path = "numeric_test.rs"]
mod tests;
