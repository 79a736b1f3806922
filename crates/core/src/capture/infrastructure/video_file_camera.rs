use std::path::{Path, PathBuf};

use crate::capture::domain::capture_device::{CaptureDevice, CaptureError};
use crate::playback::domain::frame_source::FrameSource;
use crate::playback::infrastructure::ffmpeg_frame_source::FfmpegFrameSource;
use crate::shared::frame::Frame;

/// Stands in for a webcam by replaying a recorded video, looping at the end.
///
/// Handy for demos and for running the pipeline on machines without a camera.
pub struct VideoFileCamera {
    path: PathBuf,
    source: FfmpegFrameSource,
    next_index: usize,
    open: bool,
}

impl VideoFileCamera {
    pub fn open(path: &Path) -> Result<Self, CaptureError> {
        let mut source = FfmpegFrameSource::new();
        source
            .replace(path)
            .map_err(|e| CaptureError::DeviceUnavailable(e.to_string()))?;
        Ok(Self {
            path: path.to_path_buf(),
            source,
            next_index: 0,
            open: true,
        })
    }
}

impl CaptureDevice for VideoFileCamera {
    fn is_open(&self) -> bool {
        self.open
    }

    fn read_frame(&mut self) -> Result<Frame, CaptureError> {
        if !self.open {
            return Err(CaptureError::ReadFailed("camera is closed".into()));
        }
        let frame_count = self.source.frame_count();
        let index = self.next_index % frame_count.max(1);
        self.next_index = index + 1;
        self.source
            .seek(index)
            .map_err(|e| CaptureError::ReadFailed(e.to_string()))
    }

    fn close(&mut self) {
        if self.open {
            self.source.close();
            self.open = false;
        }
    }

    fn describe(&self) -> String {
        format!("video file {}", self.path.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::playback::infrastructure::ffmpeg_frame_source::test_video::create_test_video;

    #[test]
    fn test_loops_at_end_of_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("camera.mp4");
        create_test_video(&path, 3, 32, 24, 25);

        let mut camera = VideoFileCamera::open(&path).unwrap();
        assert!(camera.is_open());
        let indices: Vec<usize> = (0..7)
            .map(|_| camera.read_frame().unwrap().index())
            .collect();
        assert_eq!(indices, vec![0, 1, 2, 0, 1, 2, 0]);
    }

    #[test]
    fn test_missing_file_is_unavailable() {
        assert!(matches!(
            VideoFileCamera::open(Path::new("/nonexistent/camera.mp4")),
            Err(CaptureError::DeviceUnavailable(_))
        ));
    }

    #[test]
    fn test_read_after_close_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("camera.mp4");
        create_test_video(&path, 2, 32, 24, 25);

        let mut camera = VideoFileCamera::open(&path).unwrap();
        camera.close();
        camera.close();
        assert!(!camera.is_open());
        assert!(matches!(
            camera.read_frame(),
            Err(CaptureError::ReadFailed(_))
        ));
    }
}
