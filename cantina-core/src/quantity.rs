/// Fallback used whenever a requested quantity is absent or unusable.
pub const DEFAULT_QUANTITY: i32 = 1;

/// Normalizes a client-requested quantity to a positive integer.
///
/// Missing, non-finite, non-integer, and non-positive values all collapse
/// to [`DEFAULT_QUANTITY`] rather than being rejected. Fractions round
/// down before the positivity check, so 0.7 becomes 1 via the fallback
/// and 2.7 becomes 2.
pub fn positive_quantity(requested: Option<f64>) -> i32 {
    let Some(raw) = requested else {
        return DEFAULT_QUANTITY;
    };
    if !raw.is_finite() {
        return DEFAULT_QUANTITY;
    }
    let floored = raw.floor();
    if floored < 1.0 {
        return DEFAULT_QUANTITY;
    }
    if floored >= i32::MAX as f64 {
        return i32::MAX;
    }
    floored as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_and_invalid_values_fall_back_to_one() {
        assert_eq!(positive_quantity(None), 1);
        assert_eq!(positive_quantity(Some(0.0)), 1);
        assert_eq!(positive_quantity(Some(-5.0)), 1);
        assert_eq!(positive_quantity(Some(0.7)), 1);
        assert_eq!(positive_quantity(Some(f64::NAN)), 1);
        assert_eq!(positive_quantity(Some(f64::INFINITY)), 1);
        assert_eq!(positive_quantity(Some(f64::NEG_INFINITY)), 1);
    }

    #[test]
    fn test_fractions_round_down() {
        assert_eq!(positive_quantity(Some(2.7)), 2);
        assert_eq!(positive_quantity(Some(1.0)), 1);
        assert_eq!(positive_quantity(Some(3.0)), 3);
    }

    #[test]
    fn test_huge_values_saturate() {
        assert_eq!(positive_quantity(Some(1e12)), i32::MAX);
    }
}
