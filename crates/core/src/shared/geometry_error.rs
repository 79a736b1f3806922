use thiserror::Error;

/// Rejected calibration parameters for the distance model or playback window.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeometryError {
    #[error("{name} must be a finite value greater than zero, got {value}")]
    NotPositive { name: &'static str, value: f64 },
    #[error("distance window is empty: max {max_cm} cm must exceed min {min_cm} cm")]
    EmptyWindow { max_cm: f64, min_cm: f64 },
}

/// Returns `value` if it is finite and strictly positive.
pub(crate) fn positive(name: &'static str, value: f64) -> Result<f64, GeometryError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(GeometryError::NotPositive { name, value })
    }
}
