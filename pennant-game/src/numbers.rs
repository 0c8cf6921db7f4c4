//! Numeric conversion helpers centralizing safe numeric casts.

use num_traits::cast::cast;

/// Floor a f64 and clamp it to the i32 range, returning 0 for NaN values.
#[must_use]
pub fn floor_f64_to_i32(value: f64) -> i32 {
    if value.is_nan() {
        return 0;
    }
    let min = cast::<i32, f64>(i32::MIN).unwrap_or(f64::MIN);
    let max = cast::<i32, f64>(i32::MAX).unwrap_or(f64::MAX);
    let clamped = value.clamp(min, max).floor();
    cast::<f64, i32>(clamped).unwrap_or(0)
}

/// Round a f64 and clamp it to the i32 range, returning 0 for NaN values.
#[must_use]
pub fn round_f64_to_i32(value: f64) -> i32 {
    if value.is_nan() {
        return 0;
    }
    let min = cast::<i32, f64>(i32::MIN).unwrap_or(f64::MIN);
    let max = cast::<i32, f64>(i32::MAX).unwrap_or(f64::MAX);
    let clamped = value.clamp(min, max).round();
    cast::<f64, i32>(clamped).unwrap_or(0)
}

/// Convert i64 to f64 while allowing precision loss in a single location.
#[must_use]
pub fn i64_to_f64(value: i64) -> f64 {
    cast::<i64, f64>(value).unwrap_or(0.0)
}

/// Convert a count to f64 while allowing precision loss in a single location.
#[must_use]
pub fn count_to_f64(value: usize) -> f64 {
    cast::<usize, f64>(value).unwrap_or(0.0)
}

/// Innings pitched as a fraction of full innings (`outs / 3`).
#[must_use]
pub fn outs_to_innings(outs: u32) -> f64 {
    f64::from(outs) / 3.0
}

/// Conventional `whole.partial` innings notation, e.g. 20 outs -> `"6.2"`.
#[must_use]
pub fn format_innings(outs: u32) -> String {
    format!("{}.{}", outs / 3, outs % 3)
}

/// `numerator / denominator`, or 0.0 when the denominator is zero.
#[must_use]
pub fn ratio(numerator: u32, denominator: u32) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        f64::from(numerator) / f64::from(denominator)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn floor_and_round_handle_non_finite() {
        assert_eq!(floor_f64_to_i32(f64::NAN), 0);
        assert_eq!(floor_f64_to_i32(f64::INFINITY), i32::MAX);
        assert_eq!(floor_f64_to_i32(-2.5), -3);
        assert_eq!(floor_f64_to_i32(2.99), 2);
        assert_eq!(round_f64_to_i32(2.5), 3);
        assert_eq!(round_f64_to_i32(f64::NAN), 0);
    }

    #[test]
    fn innings_notation_uses_thirds() {
        assert_eq!(format_innings(0), "0.0");
        assert_eq!(format_innings(20), "6.2");
        assert_eq!(format_innings(27), "9.0");
        assert!((outs_to_innings(24) - 8.0).abs() < f64::EPSILON);
    }

    #[test]
    fn ratio_guards_zero_denominator() {
        assert!(ratio(3, 0).abs() < f64::EPSILON);
        assert!((ratio(1, 4) - 0.25).abs() < f64::EPSILON);
        assert!((count_to_f64(12) - 12.0).abs() < f64::EPSILON);
        assert!((i64_to_f64(-7) + 7.0).abs() < f64::EPSILON);
    }
}
