use crate::distance::domain::distance_estimate::{DistanceEstimate, DistanceSourceKind};
use crate::distance::domain::distance_source::DistanceSource;
use crate::shared::constants::DEFAULT_MANUAL_DISTANCE_CM;
use crate::shared::frame::Frame;

/// A user-set distance, always valid. Drives playback without a camera.
#[derive(Clone, Debug)]
pub struct ManualDebugSource {
    value_cm: f64,
}

impl ManualDebugSource {
    pub fn new(value_cm: f64) -> Self {
        let mut source = Self {
            value_cm: DEFAULT_MANUAL_DISTANCE_CM,
        };
        source.set(value_cm);
        source
    }

    /// Non-finite values are ignored and the previous value kept.
    pub fn set(&mut self, value_cm: f64) {
        if value_cm.is_finite() {
            self.value_cm = value_cm;
        } else {
            log::warn!("Ignoring non-finite manual distance {value_cm}");
        }
    }
}

impl Default for ManualDebugSource {
    fn default() -> Self {
        Self::new(DEFAULT_MANUAL_DISTANCE_CM)
    }
}

impl DistanceSource for ManualDebugSource {
    fn kind(&self) -> DistanceSourceKind {
        DistanceSourceKind::Manual
    }

    fn distance(&mut self, _frame: Option<&Frame>) -> DistanceEstimate {
        DistanceEstimate::valid(self.value_cm, DistanceSourceKind::Manual)
    }
}
