//! The Fibonacci scale of legal story point values.

/// Allowed story points in ascending order.
pub const FIBONACCI_SCALE: [u32; 7] = [1, 2, 3, 5, 8, 13, 21];

/// Snap `score` to the closest scale value.
///
/// Ties go to the lower candidate, so `4.0` maps to `3`. NaN maps to the
/// smallest value and infinities to the ends of the scale.
pub fn discretize(score: f64) -> u32 {
    if score.is_nan() {
        return FIBONACCI_SCALE[0];
    }

    let mut best = FIBONACCI_SCALE[0];
    let mut best_distance = (score - best as f64).abs();

    for &candidate in &FIBONACCI_SCALE[1..] {
        let distance = (score - candidate as f64).abs();
        if distance < best_distance {
            best = candidate;
            best_distance = distance;
        }
    }

    if score.is_infinite() && score > 0.0 {
        return FIBONACCI_SCALE[FIBONACCI_SCALE.len() - 1];
    }

    best
}

pub fn is_on_scale(points: u32) -> bool {
    FIBONACCI_SCALE.contains(&points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn exact_values_map_to_themselves() {
        for value in FIBONACCI_SCALE {
            assert_eq!(discretize(value as f64), value);
        }
    }

    #[test]
    fn ties_resolve_to_the_lower_value() {
        assert_eq!(discretize(4.0), 3);
        assert_eq!(discretize(6.5), 5);
        assert_eq!(discretize(17.0), 13);
    }

    #[test]
    fn snaps_to_nearest() {
        assert_eq!(discretize(1.0), 1);
        assert_eq!(discretize(1.4), 1);
        assert_eq!(discretize(4.2), 5);
        assert_eq!(discretize(10.4), 8);
        assert_eq!(discretize(10.6), 13);
        assert_eq!(discretize(-3.0), 1);
        assert_eq!(discretize(500.0), 21);
    }

    #[test]
    fn non_finite_scores_stay_on_scale() {
        assert_eq!(discretize(f64::NAN), 1);
        assert_eq!(discretize(f64::NEG_INFINITY), 1);
        assert_eq!(discretize(f64::INFINITY), 21);
    }

    proptest! {
        #[test]
        fn discretize_is_idempotent(score in -100.0f64..100.0) {
            let once = discretize(score);
            prop_assert!(is_on_scale(once));
            prop_assert_eq!(discretize(once as f64), once);
        }
    }
}
