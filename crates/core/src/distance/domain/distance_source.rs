use crate::distance::domain::distance_estimate::{DistanceEstimate, DistanceSourceKind};
use crate::shared::frame::Frame;

/// One way of obtaining the viewer distance for a tick.
///
/// `frame` is the camera frame of this tick, or `None` when the camera
/// produced nothing. Sources that do not look at the camera ignore it.
pub trait DistanceSource: Send {
    fn kind(&self) -> DistanceSourceKind;

    fn distance(&mut self, frame: Option<&Frame>) -> DistanceEstimate;

    /// Stops any background work. Called once when the loop shuts down.
    fn shutdown(&mut self) {}
}
