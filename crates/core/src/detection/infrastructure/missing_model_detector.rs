use crate::detection::domain::detected_face::DetectedFace;
use crate::detection::domain::face_detector::FaceDetector;
use crate::shared::frame::Frame;

/// Detector used when no model could be loaded. Every call fails with the
/// load error, so face-width distance stays invalid while manual and sensor
/// sources keep working.
pub struct MissingModelDetector {
    reason: String,
}

impl MissingModelDetector {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl FaceDetector for MissingModelDetector {
    fn detect(&mut self, _frame: &Frame) -> Result<Vec<DetectedFace>, Box<dyn std::error::Error>> {
        Err(format!("no face model: {}", self.reason).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::color::Rgb;

    #[test]
    fn test_always_fails_with_reason() {
        let mut detector = MissingModelDetector::new("model file x.onnx does not exist");
        let err = detector.detect(&Frame::filled(2, 2, Rgb::BLACK)).unwrap_err();
        assert!(err.to_string().contains("x.onnx"));
    }
}
