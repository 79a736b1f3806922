use serde::{Deserialize, Serialize};

/// Which distance source produced an estimate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistanceSourceKind {
    #[serde(alias = "face")]
    FaceWidth,
    Manual,
    #[serde(alias = "sensor")]
    ExternalSensor,
}

impl DistanceSourceKind {
    pub const ALL: &[DistanceSourceKind] = &[
        DistanceSourceKind::FaceWidth,
        DistanceSourceKind::Manual,
        DistanceSourceKind::ExternalSensor,
    ];
}

impl std::fmt::Display for DistanceSourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DistanceSourceKind::FaceWidth => write!(f, "Face width"),
            DistanceSourceKind::Manual => write!(f, "Manual"),
            DistanceSourceKind::ExternalSensor => write!(f, "External sensor"),
        }
    }
}

impl std::str::FromStr for DistanceSourceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "face" | "face_width" => Ok(DistanceSourceKind::FaceWidth),
            "manual" => Ok(DistanceSourceKind::Manual),
            "sensor" | "external_sensor" => Ok(DistanceSourceKind::ExternalSensor),
            other => Err(format!(
                "distance source must be one of: face, manual, sensor, got '{other}'"
            )),
        }
    }
}

/// Viewer distance for one tick.
///
/// `valid == false` is the normal "nobody there" state, not an error; the
/// value is meaningless in that case.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DistanceEstimate {
    pub value_cm: f64,
    pub source: DistanceSourceKind,
    pub valid: bool,
}

impl DistanceEstimate {
    pub fn valid(value_cm: f64, source: DistanceSourceKind) -> Self {
        Self {
            value_cm,
            source,
            valid: true,
        }
    }

    pub fn invalid(source: DistanceSourceKind) -> Self {
        Self {
            value_cm: 0.0,
            source,
            valid: false,
        }
    }

    /// The distance if valid.
    pub fn value(&self) -> Option<f64> {
        self.valid.then_some(self.value_cm)
    }
}
