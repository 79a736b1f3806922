use thiserror::Error;

use crate::shared::frame::Frame;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CaptureError {
    #[error("camera {0} is unavailable")]
    DeviceUnavailable(String),
    #[error("failed to read camera frame: {0}")]
    ReadFailed(String),
}

/// A live camera. Frames come back as RGB.
///
/// A failed read is transient: the caller may keep calling `read_frame`
/// on the next tick.
pub trait CaptureDevice: Send {
    fn is_open(&self) -> bool;

    fn read_frame(&mut self) -> Result<Frame, CaptureError>;

    /// Releases the device. Safe to call more than once.
    fn close(&mut self);

    /// Human-readable description for logs and status lines.
    fn describe(&self) -> String;
}

/// Opens capture devices by index, so the render loop can switch cameras
/// at runtime without knowing the backend.
pub trait CameraOpener: Send {
    fn open(&self, index: u32) -> Result<Box<dyn CaptureDevice>, CaptureError>;
}
