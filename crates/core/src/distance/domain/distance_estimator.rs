//! Pinhole-camera distance model.
//!
//! A face of known real width `W` that spans `w` pixels under focal length
//! `f` sits at `d = W * f / w`. The same relation, solved for `f`, calibrates
//! the camera from one measurement at a known distance.

use crate::detection::domain::detected_face::DetectedFace;
use crate::distance::domain::camera_intrinsics::CameraIntrinsics;
use crate::distance::domain::distance_estimate::{DistanceEstimate, DistanceSourceKind};
use crate::shared::geometry_error::{positive, GeometryError};

/// Estimates viewer distance from one detection.
///
/// Returns an invalid estimate when there is no face or its width is not a
/// positive, finite number of pixels. Never fails otherwise.
pub fn estimate(face: Option<&DetectedFace>, intrinsics: &CameraIntrinsics) -> DistanceEstimate {
    let Some(face) = face else {
        return DistanceEstimate::invalid(DistanceSourceKind::FaceWidth);
    };
    if !(face.relative_width > 0.0) {
        return DistanceEstimate::invalid(DistanceSourceKind::FaceWidth);
    }
    let face_pixel_width = face.pixel_width();
    if !(face_pixel_width.is_finite() && face_pixel_width > 0.0) {
        return DistanceEstimate::invalid(DistanceSourceKind::FaceWidth);
    }
    let distance_cm =
        intrinsics.reference_face_width_cm() * intrinsics.focal_length_px() / face_pixel_width;
    DistanceEstimate::valid(distance_cm, DistanceSourceKind::FaceWidth)
}

/// Estimates distance from a detector's result list.
///
/// Only the first detection is used, whatever the detector's ordering; with
/// several viewers in frame the result follows whichever face the detector
/// lists first.
pub fn estimate_first(faces: &[DetectedFace], intrinsics: &CameraIntrinsics) -> DistanceEstimate {
    estimate(faces.first(), intrinsics)
}

/// Solves the pinhole model for the focal length, given a face measured at a
/// known distance.
pub fn calibrate_focal_length(
    known_distance_cm: f64,
    face_pixel_width: f64,
    reference_face_width_cm: f64,
) -> Result<f64, GeometryError> {
    let distance = positive("known distance", known_distance_cm)?;
    let width_px = positive("face pixel width", face_pixel_width)?;
    let reference = positive("reference face width", reference_face_width_cm)?;
    Ok(width_px * distance / reference)
}

/// Focal length from several face measurements at the same known distance.
/// The median of the per-sample focal lengths is used, so a few bad
/// detections do not skew it. `None` when there are no usable samples.
pub fn median_focal_length(
    known_distance_cm: f64,
    face_pixel_widths: &[f64],
    reference_face_width_cm: f64,
) -> Option<f64> {
    let mut focals: Vec<f64> = face_pixel_widths
        .iter()
        .filter_map(|&w| calibrate_focal_length(known_distance_cm, w, reference_face_width_cm).ok())
        .collect();
    if focals.is_empty() {
        return None;
    }
    focals.sort_by(f64::total_cmp);
    let mid = focals.len() / 2;
    Some(if focals.len() % 2 == 0 {
        (focals[mid - 1] + focals[mid]) / 2.0
    } else {
        focals[mid]
    })
}

/// Pixel width a reference face would have at `distance_cm`.
pub fn face_pixel_width_at(distance_cm: f64, intrinsics: &CameraIntrinsics) -> f64 {
    intrinsics.reference_face_width_cm() * intrinsics.focal_length_px() / distance_cm
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;
    use rstest::rstest;

    fn intrinsics(width: f64, focal: f64) -> CameraIntrinsics {
        CameraIntrinsics::new(width, focal).unwrap()
    }

    #[test]
    fn test_no_face_is_invalid() {
        let result = estimate(None, &CameraIntrinsics::default());
        assert!(!result.valid);
        assert_eq!(result.source, DistanceSourceKind::FaceWidth);
    }

    #[test]
    fn test_reference_example() {
        // 0.2 * 640 = 128 px; 16 * 800 / 128 = 100 cm
        let face = DetectedFace::with_width(0.2, 640);
        let result = estimate(Some(&face), &intrinsics(16.0, 800.0));
        assert!(result.valid);
        assert_relative_eq!(result.value_cm, 100.0);
    }

    #[rstest]
    #[case::zero(0.0, 640)]
    #[case::negative(-0.3, 640)]
    #[case::nan(f64::NAN, 640)]
    #[case::zero_frame(0.2, 0)]
    fn test_degenerate_width_is_invalid(#[case] relative_width: f64, #[case] frame_width: u32) {
        let face = DetectedFace::with_width(relative_width, frame_width);
        assert!(!estimate(Some(&face), &CameraIntrinsics::default()).valid);
    }

    #[test]
    fn test_wider_face_is_closer() {
        let i = CameraIntrinsics::default();
        let near = estimate(Some(&DetectedFace::with_width(0.4, 640)), &i);
        let far = estimate(Some(&DetectedFace::with_width(0.1, 640)), &i);
        assert!(near.value_cm < far.value_cm);
    }

    #[test]
    fn test_estimate_first_uses_first_detection_only() {
        let faces = vec![
            DetectedFace::with_width(0.2, 640),
            DetectedFace::with_width(0.5, 640),
        ];
        let result = estimate_first(&faces, &intrinsics(16.0, 800.0));
        assert_relative_eq!(result.value_cm, 100.0);
    }

    #[test]
    fn test_estimate_first_empty_is_invalid() {
        assert!(!estimate_first(&[], &CameraIntrinsics::default()).valid);
    }

    #[test]
    fn test_calibrate_recovers_focal_length() {
        // A 128 px face at 100 cm with a 16 cm reference implies f = 800.
        assert_relative_eq!(calibrate_focal_length(100.0, 128.0, 16.0).unwrap(), 800.0);
    }

    #[test]
    fn test_calibrate_rejects_zero_width() {
        assert!(calibrate_focal_length(100.0, 0.0, 16.0).is_err());
    }

    proptest! {
        #[test]
        fn prop_estimate_inverts_pixel_width(distance in 10.0f64..500.0, focal in 100.0f64..2000.0) {
            let i = intrinsics(16.0, focal);
            let frame_width = 1280u32;
            let relative = face_pixel_width_at(distance, &i) / frame_width as f64;
            let face = DetectedFace::with_width(relative, frame_width);
            let result = estimate(Some(&face), &i);
            prop_assert!(result.valid);
            prop_assert!((result.value_cm - distance).abs() < 1e-6 * distance);
        }

        #[test]
        fn prop_calibrated_focal_reproduces_distance(distance in 20.0f64..300.0, width_px in 10.0f64..600.0) {
            let focal = calibrate_focal_length(distance, width_px, 16.0).unwrap();
            let i = intrinsics(16.0, focal);
            prop_assert!((face_pixel_width_at(distance, &i) - width_px).abs() < 1e-6 * width_px);
        }
    }

    #[test]
    fn test_median_focal_ignores_outlier() {
        // 16 cm face at 80 cm: 120 px gives f = 600.
        let focal = median_focal_length(80.0, &[120.0, 119.0, 121.0, 400.0, 0.0], 16.0).unwrap();
        assert_relative_eq!(focal, 602.5);
    }

    #[test]
    fn test_median_focal_without_samples() {
        assert!(median_focal_length(80.0, &[], 16.0).is_none());
        assert!(median_focal_length(80.0, &[f64::NAN], 16.0).is_none());
    }
}
