use crate::capture::domain::capture_device::{CameraOpener, CaptureDevice, CaptureError};
use crate::shared::frame::Frame;

/// Placeholder for a camera that could not be opened.
///
/// Every read fails, so the loop keeps ticking and shows the background.
#[derive(Clone, Debug)]
pub struct UnavailableCamera {
    reason: String,
}

impl UnavailableCamera {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl CaptureDevice for UnavailableCamera {
    fn is_open(&self) -> bool {
        false
    }

    fn read_frame(&mut self) -> Result<Frame, CaptureError> {
        Err(CaptureError::DeviceUnavailable(self.reason.clone()))
    }

    fn close(&mut self) {}

    fn describe(&self) -> String {
        format!("no camera ({})", self.reason)
    }
}

/// Opener used when the crate is built without camera support.
#[derive(Clone, Copy, Debug, Default)]
pub struct UnavailableCameraOpener;

impl CameraOpener for UnavailableCameraOpener {
    fn open(&self, index: u32) -> Result<Box<dyn CaptureDevice>, CaptureError> {
        Err(CaptureError::DeviceUnavailable(format!(
            "{index} (built without camera support)"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_read_fails() {
        let mut camera = UnavailableCamera::new("unplugged");
        assert!(!camera.is_open());
        for _ in 0..3 {
            assert_eq!(
                camera.read_frame(),
                Err(CaptureError::DeviceUnavailable("unplugged".into()))
            );
        }
    }

    #[test]
    fn test_opener_always_rejects() {
        assert!(UnavailableCameraOpener.open(0).is_err());
    }
}
