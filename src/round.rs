/// Decimal digits kept in a final result unless configured otherwise.
pub const DEFAULT_PRECISION: u32 = 4;

/// Largest precision accepted; beyond this the scaling itself loses digits.
pub const MAX_PRECISION: u32 = 10;

/// Past this scaled magnitude the gap between neighbouring doubles is wider than
/// `10^-digits`, so the nearest double to the rounded decimal is `value` itself.
const EXACT_LIMIT: f64 = 9_007_199_254_740_992.0; // 2^53

/// Rounds `value` to `digits` decimal places, halves away from zero.
///
/// This hides binary representation noise such as `0.1 + 0.2`. Non-finite values are
/// returned unchanged.
pub fn round_to(value: f64, digits: u32) -> f64 {
    let scale = 10f64.powi(digits.min(MAX_PRECISION) as i32);
    let scaled = value * scale;

    if !scaled.is_finite() || scaled.abs() >= EXACT_LIMIT {
        return value;
    }

    scaled.round() / scale
}
