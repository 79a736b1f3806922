use crate::detection::domain::detected_face::DetectedFace;
use crate::detection::domain::face_detector::FaceDetector;
use crate::distance::domain::camera_intrinsics::CameraIntrinsics;
use crate::distance::domain::distance_estimate::{DistanceEstimate, DistanceSourceKind};
use crate::distance::domain::distance_estimator;
use crate::distance::domain::distance_source::DistanceSource;
use crate::shared::frame::Frame;

/// Distance from the apparent width of the first detected face.
///
/// A detector error counts as "no face this tick". The failure is logged
/// when it starts and when it clears, not on every tick.
pub struct FaceWidthSource {
    detector: Box<dyn FaceDetector>,
    intrinsics: CameraIntrinsics,
    last_detections: Vec<DetectedFace>,
    detector_failing: bool,
}

impl FaceWidthSource {
    pub fn new(detector: Box<dyn FaceDetector>, intrinsics: CameraIntrinsics) -> Self {
        Self {
            detector,
            intrinsics,
            last_detections: Vec::new(),
            detector_failing: false,
        }
    }

    /// Detections from the most recent `distance` call.
    pub fn last_detections(&self) -> &[DetectedFace] {
        &self.last_detections
    }

    fn detect(&mut self, frame: &Frame) -> Vec<DetectedFace> {
        match self.detector.detect(frame) {
            Ok(faces) => {
                if self.detector_failing {
                    log::info!("Face detector recovered");
                    self.detector_failing = false;
                }
                faces
            }
            Err(e) => {
                if !self.detector_failing {
                    log::warn!("Face detection failed, treating as no face: {e}");
                    self.detector_failing = true;
                }
                Vec::new()
            }
        }
    }
}

impl DistanceSource for FaceWidthSource {
    fn kind(&self) -> DistanceSourceKind {
        DistanceSourceKind::FaceWidth
    }

    fn distance(&mut self, frame: Option<&Frame>) -> DistanceEstimate {
        self.last_detections = match frame {
            Some(frame) => self.detect(frame),
            None => Vec::new(),
        };
        distance_estimator::estimate_first(&self.last_detections, &self.intrinsics)
    }
}


#[cfg(test)]
mod tests {
    use super::fakes::ScriptedDetector;
    use super::*;
    use crate::shared::color::Rgb;
    use approx::assert_relative_eq;

    fn frame() -> Frame {
        Frame::filled(640, 480, Rgb::BLACK)
    }

    fn intrinsics() -> CameraIntrinsics {
        CameraIntrinsics::new(16.0, 800.0).unwrap()
    }

    #[test]
    fn test_face_gives_pinhole_distance() {
        let detector = ScriptedDetector::constant(0.2, 640, 1);
        let mut source = FaceWidthSource::new(Box::new(detector), intrinsics());
        let estimate = source.distance(Some(&frame()));
        assert!(estimate.valid);
        assert_relative_eq!(estimate.value_cm, 100.0);
        assert_eq!(source.last_detections().len(), 1);
    }

    #[test]
    fn test_no_face_is_invalid() {
        let detector = ScriptedDetector::new(vec![Ok(vec![])]);
        let mut source = FaceWidthSource::new(Box::new(detector), intrinsics());
        assert!(!source.distance(Some(&frame())).valid);
    }

    #[test]
    fn test_missing_frame_is_invalid_and_clears_detections() {
        let detector = ScriptedDetector::constant(0.2, 640, 2);
        let mut source = FaceWidthSource::new(Box::new(detector), intrinsics());
        source.distance(Some(&frame()));
        assert!(!source.distance(None).valid);
        assert!(source.last_detections().is_empty());
    }

    #[test]
    fn test_detector_error_is_no_face() {
        let detector = ScriptedDetector::new(vec![
            Err("inference failed".into()),
            Err("inference failed".into()),
            Ok(vec![DetectedFace::with_width(0.2, 640)]),
        ]);
        let mut source = FaceWidthSource::new(Box::new(detector), intrinsics());
        assert!(!source.distance(Some(&frame())).valid);
        assert!(!source.distance(Some(&frame())).valid);
        assert!(source.distance(Some(&frame())).valid);
    }

    #[test]
    fn test_only_first_face_counts() {
        let detector = ScriptedDetector::new(vec![Ok(vec![
            DetectedFace::with_width(0.2, 640),
            DetectedFace::with_width(0.4, 640),
        ])]);
        let mut source = FaceWidthSource::new(Box::new(detector), intrinsics());
        assert_relative_eq!(source.distance(Some(&frame())).value_cm, 100.0);
    }
}
