use crate::shared::constants::{DEFAULT_FOCAL_LENGTH_PX, DEFAULT_REFERENCE_FACE_WIDTH_CM};
use crate::shared::geometry_error::{positive, GeometryError};

/// Pinhole-camera parameters for face-width distance estimation.
///
/// Immutable once built; both values are finite and strictly positive.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraIntrinsics {
    reference_face_width_cm: f64,
    focal_length_px: f64,
}

impl CameraIntrinsics {
    pub fn new(reference_face_width_cm: f64, focal_length_px: f64) -> Result<Self, GeometryError> {
        Ok(Self {
            reference_face_width_cm: positive("reference face width", reference_face_width_cm)?,
            focal_length_px: positive("focal length", focal_length_px)?,
        })
    }

    pub fn reference_face_width_cm(&self) -> f64 {
        self.reference_face_width_cm
    }

    pub fn focal_length_px(&self) -> f64 {
        self.focal_length_px
    }
}

impl Default for CameraIntrinsics {
    fn default() -> Self {
        Self {
            reference_face_width_cm: DEFAULT_REFERENCE_FACE_WIDTH_CM,
            focal_length_px: DEFAULT_FOCAL_LENGTH_PX,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_valid_construction() {
        let intrinsics = CameraIntrinsics::new(16.0, 800.0).unwrap();
        assert_eq!(intrinsics.reference_face_width_cm(), 16.0);
        assert_eq!(intrinsics.focal_length_px(), 800.0);
    }

    #[rstest]
    #[case::zero_width(0.0, 800.0)]
    #[case::negative_width(-16.0, 800.0)]
    #[case::zero_focal(16.0, 0.0)]
    #[case::nan_focal(16.0, f64::NAN)]
    #[case::infinite_width(f64::INFINITY, 800.0)]
    fn test_rejects_non_positive(#[case] width: f64, #[case] focal: f64) {
        assert!(CameraIntrinsics::new(width, focal).is_err());
    }

    #[test]
    fn test_default_matches_installation_calibration() {
        let intrinsics = CameraIntrinsics::default();
        assert_eq!(intrinsics.reference_face_width_cm(), 16.0);
        assert_eq!(intrinsics.focal_length_px(), 600.0);
    }
}
