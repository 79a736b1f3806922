use crate::shared::constants::{DEFAULT_DIST_MAX_CM, DEFAULT_DIST_MIN_CM};
use crate::shared::geometry_error::{positive, GeometryError};

/// The distance window over which playback position varies.
///
/// At `dist_max_cm` playback sits on the first frame, at `dist_min_cm` on the
/// last. Always `dist_max_cm > dist_min_cm > 0`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlaybackRange {
    dist_max_cm: f64,
    dist_min_cm: f64,
}

impl PlaybackRange {
    pub fn new(dist_max_cm: f64, dist_min_cm: f64) -> Result<Self, GeometryError> {
        let max_cm = positive("maximum distance", dist_max_cm)?;
        let min_cm = positive("minimum distance", dist_min_cm)?;
        if max_cm <= min_cm {
            return Err(GeometryError::EmptyWindow { max_cm, min_cm });
        }
        Ok(Self {
            dist_max_cm: max_cm,
            dist_min_cm: min_cm,
        })
    }

    pub fn dist_max_cm(&self) -> f64 {
        self.dist_max_cm
    }

    pub fn dist_min_cm(&self) -> f64 {
        self.dist_min_cm
    }

    pub fn span_cm(&self) -> f64 {
        self.dist_max_cm - self.dist_min_cm
    }
}

impl Default for PlaybackRange {
    fn default() -> Self {
        Self {
            dist_max_cm: DEFAULT_DIST_MAX_CM,
            dist_min_cm: DEFAULT_DIST_MIN_CM,
        }
    }
}
