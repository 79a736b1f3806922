use crate::playback::domain::playback_range::PlaybackRange;

/// Maps a viewer distance to a frame index in a sequence of `frame_count` frames.
///
/// Distances are clamped into the window, normalised so that `dist_max_cm`
/// gives 0 and `dist_min_cm` gives 1, and scaled onto `[0, frame_count - 1]`
/// with floor rounding. Outside the window the result saturates at the
/// nearest boundary frame. A NaN distance maps to frame 0.
pub fn map_to_frame(distance_cm: f64, range: &PlaybackRange, frame_count: usize) -> usize {
    if frame_count <= 1 || distance_cm.is_nan() {
        return 0;
    }
    let last = frame_count - 1;
    let index = (normalized_position(distance_cm, range) * last as f64).floor();
    // `as` saturates, so the min() alone keeps us in bounds.
    (index as usize).min(last)
}

/// Normalised playback position in `[0, 1]` for a distance; 0 is far, 1 is near.
pub fn normalized_position(distance_cm: f64, range: &PlaybackRange) -> f64 {
    if distance_cm.is_nan() {
        return 0.0;
    }
    let clamped = distance_cm.clamp(range.dist_min_cm(), range.dist_max_cm());
    (range.dist_max_cm() - clamped) / range.span_cm()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;
    use rstest::rstest;

    fn range() -> PlaybackRange {
        PlaybackRange::new(100.0, 60.0).unwrap()
    }

    #[rstest]
    #[case::far_edge(100.0, 0)]
    #[case::midpoint(80.0, 20)]
    #[case::near_edge(60.0, 40)]
    #[case::beyond_far(250.0, 0)]
    #[case::inside_near(30.0, 40)]
    #[case::negative(-15.0, 40)]
    #[case::huge(1e300, 0)]
    #[case::neg_infinity(f64::NEG_INFINITY, 40)]
    #[case::infinity(f64::INFINITY, 0)]
    #[case::nan(f64::NAN, 0)]
    fn test_reference_window(#[case] distance: f64, #[case] expected: usize) {
        assert_eq!(map_to_frame(distance, &range(), 41), expected);
    }

    #[test]
    fn test_midpoint_normalized_is_half() {
        assert_relative_eq!(normalized_position(80.0, &range()), 0.5);
    }

    #[test]
    fn test_floor_rounding() {
        // normalized 0.49 * 40 = 19.6 -> 19
        assert_eq!(map_to_frame(80.4, &range(), 41), 19);
    }

    #[rstest]
    #[case(0)]
    #[case(1)]
    fn test_degenerate_counts_yield_zero(#[case] frame_count: usize) {
        for distance in [0.0, 60.0, 80.0, 100.0, 500.0] {
            assert_eq!(map_to_frame(distance, &range(), frame_count), 0);
        }
    }

    proptest! {
        #[test]
        fn prop_index_always_in_bounds(distance in proptest::num::f64::ANY, frame_count in 1usize..10_000) {
            let index = map_to_frame(distance, &range(), frame_count);
            prop_assert!(index < frame_count);
        }

        #[test]
        fn prop_monotonic_non_increasing(a in 60.0f64..100.0, b in 60.0f64..100.0, frame_count in 2usize..500) {
            let (near, far) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(map_to_frame(far, &range(), frame_count) <= map_to_frame(near, &range(), frame_count));
        }

        #[test]
        fn prop_saturates_beyond_far(distance in 100.0f64..1e9, frame_count in 1usize..500) {
            prop_assert_eq!(map_to_frame(distance, &range(), frame_count), 0);
        }

        #[test]
        fn prop_saturates_inside_near(distance in -1e9f64..=60.0, frame_count in 1usize..500) {
            prop_assert_eq!(map_to_frame(distance, &range(), frame_count), frame_count - 1);
        }
    }
}
