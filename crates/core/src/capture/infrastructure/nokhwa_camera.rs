use nokhwa::pixel_format::RgbFormat;
use nokhwa::utils::{ApiBackend, CameraIndex, RequestedFormat, RequestedFormatType};
use nokhwa::Camera;

use crate::capture::domain::capture_device::{CameraOpener, CaptureDevice, CaptureError};
use crate::shared::frame::Frame;

/// Webcam capture through nokhwa's native backend.
pub struct NokhwaCamera {
    index: u32,
    name: String,
    camera: Option<Camera>,
    frames_read: usize,
}

// Safety: the camera is created and read on the render loop's thread only;
// it is moved there once, before the first read.
unsafe impl Send for NokhwaCamera {}

impl NokhwaCamera {
    pub fn open(index: u32) -> Result<Self, CaptureError> {
        let unavailable = |e: nokhwa::NokhwaError| {
            CaptureError::DeviceUnavailable(format!("{index} ({e})"))
        };

        let requested =
            RequestedFormat::new::<RgbFormat>(RequestedFormatType::AbsoluteHighestFrameRate);
        let mut camera = Camera::new(CameraIndex::Index(index), requested).map_err(unavailable)?;
        camera.open_stream().map_err(unavailable)?;

        let name = camera.info().human_name();
        let resolution = camera.resolution();
        log::info!(
            "Opened camera {index} ({name}) at {}x{}",
            resolution.width(),
            resolution.height()
        );

        Ok(Self {
            index,
            name,
            camera: Some(camera),
            frames_read: 0,
        })
    }
}

impl CaptureDevice for NokhwaCamera {
    fn is_open(&self) -> bool {
        self.camera
            .as_ref()
            .map(|c| c.is_stream_open())
            .unwrap_or(false)
    }

    fn read_frame(&mut self) -> Result<Frame, CaptureError> {
        let camera = self
            .camera
            .as_mut()
            .ok_or_else(|| CaptureError::ReadFailed("camera is closed".into()))?;
        let buffer = camera
            .frame()
            .map_err(|e| CaptureError::ReadFailed(e.to_string()))?;
        let decoded = buffer
            .decode_image::<RgbFormat>()
            .map_err(|e| CaptureError::ReadFailed(e.to_string()))?;

        let (width, height) = (decoded.width(), decoded.height());
        let frame = Frame::new(decoded.into_raw(), width, height, self.frames_read);
        self.frames_read += 1;
        Ok(frame)
    }

    fn close(&mut self) {
        if let Some(mut camera) = self.camera.take() {
            if let Err(e) = camera.stop_stream() {
                log::warn!("Failed to stop camera {}: {e}", self.index);
            }
            log::info!("Closed camera {}", self.index);
        }
    }

    fn describe(&self) -> String {
        format!("camera {} ({})", self.index, self.name)
    }
}

impl Drop for NokhwaCamera {
    fn drop(&mut self) {
        self.close();
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct NokhwaCameraOpener;

impl CameraOpener for NokhwaCameraOpener {
    fn open(&self, index: u32) -> Result<Box<dyn CaptureDevice>, CaptureError> {
        Ok(Box::new(NokhwaCamera::open(index)?))
    }
}

/// `(index, name)` for every camera the platform backend reports.
pub fn list_cameras() -> Result<Vec<(String, String)>, CaptureError> {
    let cameras = nokhwa::query(ApiBackend::Auto)
        .map_err(|e| CaptureError::DeviceUnavailable(e.to_string()))?;
    Ok(cameras
        .into_iter()
        .map(|info| (info.index().to_string(), info.human_name()))
        .collect())
}
