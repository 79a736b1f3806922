use crate::detection::domain::detected_face::DetectedFace;
use crate::distance::domain::distance_estimate::{DistanceEstimate, DistanceSourceKind};
use crate::distance::domain::distance_source::DistanceSource;
use crate::distance::domain::face_width_source::FaceWidthSource;
use crate::distance::domain::manual_debug_source::ManualDebugSource;
use crate::shared::frame::Frame;

/// Holds every configured distance source and answers from exactly one.
///
/// With `fallback_to_face`, an external sensor that has nothing to report
/// yields to the face-width source for that tick.
pub struct DistanceSelector {
    face: FaceWidthSource,
    manual: ManualDebugSource,
    sensor: Option<Box<dyn DistanceSource>>,
    active: DistanceSourceKind,
    fallback_to_face: bool,
}

impl DistanceSelector {
    pub fn new(face: FaceWidthSource, manual: ManualDebugSource) -> Self {
        Self {
            face,
            manual,
            sensor: None,
            active: DistanceSourceKind::FaceWidth,
            fallback_to_face: true,
        }
    }

    pub fn with_sensor(mut self, sensor: Box<dyn DistanceSource>, fallback_to_face: bool) -> Self {
        self.sensor = Some(sensor);
        self.fallback_to_face = fallback_to_face;
        self
    }

    pub fn active(&self) -> DistanceSourceKind {
        self.active
    }

    /// Makes `kind` the active source from the next `distance` call on.
    pub fn select(&mut self, kind: DistanceSourceKind) -> Result<(), String> {
        if kind == DistanceSourceKind::ExternalSensor && self.sensor.is_none() {
            return Err("no external sensor is configured".into());
        }
        if kind != self.active {
            log::info!("Distance source: {} -> {kind}", self.active);
            self.active = kind;
        }
        Ok(())
    }

    pub fn set_manual_distance(&mut self, value_cm: f64) {
        self.manual.set(value_cm);
    }

    /// Detections made this tick, if the face source ran.
    pub fn last_detections(&self) -> &[DetectedFace] {
        self.face.last_detections()
    }

    pub fn distance(&mut self, frame: Option<&Frame>) -> DistanceEstimate {
        match self.active {
            DistanceSourceKind::FaceWidth => self.face.distance(frame),
            DistanceSourceKind::Manual => self.manual.distance(frame),
            DistanceSourceKind::ExternalSensor => {
                let estimate = match self.sensor.as_mut() {
                    Some(sensor) => sensor.distance(frame),
                    None => DistanceEstimate::invalid(DistanceSourceKind::ExternalSensor),
                };
                if !estimate.valid && self.fallback_to_face {
                    self.face.distance(frame)
                } else {
                    estimate
                }
            }
        }
    }

    pub fn shutdown(&mut self) {
        self.face.shutdown();
        self.manual.shutdown();
        if let Some(sensor) = self.sensor.as_mut() {
            sensor.shutdown();
        }
    }
}


#[cfg(test)]
mod tests {
    use super::fakes::ScriptedSensor;
    use super::*;
    use crate::distance::domain::camera_intrinsics::CameraIntrinsics;
    use crate::distance::domain::face_width_source::fakes::ScriptedDetector;
    use crate::shared::color::Rgb;
    use approx::assert_relative_eq;

    fn selector(face_ticks: usize) -> DistanceSelector {
        let face = FaceWidthSource::new(
            Box::new(ScriptedDetector::constant(0.2, 640, face_ticks)),
            CameraIntrinsics::new(16.0, 800.0).unwrap(),
        );
        DistanceSelector::new(face, ManualDebugSource::new(70.0))
    }

    fn frame() -> Frame {
        Frame::filled(640, 480, Rgb::BLACK)
    }

    #[test]
    fn test_face_is_default() {
        let mut selector = selector(1);
        assert_eq!(selector.active(), DistanceSourceKind::FaceWidth);
        let estimate = selector.distance(Some(&frame()));
        assert_eq!(estimate.source, DistanceSourceKind::FaceWidth);
        assert_relative_eq!(estimate.value_cm, 100.0);
    }

    #[test]
    fn test_manual_skips_detection() {
        let mut selector = selector(1);
        selector.select(DistanceSourceKind::Manual).unwrap();
        assert_eq!(selector.distance(None).value(), Some(70.0));
        selector.set_manual_distance(65.0);
        assert_eq!(selector.distance(None).value(), Some(65.0));
    }

    #[test]
    fn test_sensor_rejected_when_not_configured() {
        let mut selector = selector(1);
        assert!(selector.select(DistanceSourceKind::ExternalSensor).is_err());
        assert_eq!(selector.active(), DistanceSourceKind::FaceWidth);
    }

    #[test]
    fn test_sensor_falls_back_to_face() {
        let sensor = ScriptedSensor::new(vec![Some(75.0), None]);
        let mut selector = selector(5).with_sensor(Box::new(sensor), true);
        selector.select(DistanceSourceKind::ExternalSensor).unwrap();

        let first = selector.distance(Some(&frame()));
        assert_eq!(first.source, DistanceSourceKind::ExternalSensor);
        assert_eq!(first.value(), Some(75.0));

        let second = selector.distance(Some(&frame()));
        assert_eq!(second.source, DistanceSourceKind::FaceWidth);
        assert_relative_eq!(second.value_cm, 100.0);
    }

    #[test]
    fn test_sensor_without_fallback_stays_invalid() {
        let sensor = ScriptedSensor::new(vec![None]);
        let mut selector = selector(5).with_sensor(Box::new(sensor), false);
        selector.select(DistanceSourceKind::ExternalSensor).unwrap();
        let estimate = selector.distance(Some(&frame()));
        assert!(!estimate.valid);
        assert_eq!(estimate.source, DistanceSourceKind::ExternalSensor);
    }

    #[test]
    fn test_shutdown_reaches_sensor() {
        let sensor = ScriptedSensor::new(vec![]);
        let shutdowns = sensor.shutdowns.clone();
        let mut selector = selector(0).with_sensor(Box::new(sensor), true);
        selector.shutdown();
        assert_eq!(shutdowns.load(std::sync::atomic::Ordering::SeqCst), 1);
    }
}
