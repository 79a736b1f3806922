#[cfg(feature = "camera")]
pub mod nokhwa_camera;
pub mod unavailable_camera;
pub mod video_file_camera;

use crate::capture::domain::capture_device::CameraOpener;

/// The opener for this build: nokhwa with the `camera` feature, otherwise
/// one that rejects every index.
pub fn default_camera_opener() -> Box<dyn CameraOpener> {
    #[cfg(feature = "camera")]
    {
        Box::new(nokhwa_camera::NokhwaCameraOpener)
    }
    #[cfg(not(feature = "camera"))]
    {
        Box::new(unavailable_camera::UnavailableCameraOpener)
    }
}
