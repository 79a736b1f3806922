use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::capture::domain::capture_device::{CameraOpener, CaptureDevice};
use crate::capture::infrastructure::unavailable_camera::UnavailableCamera;
use crate::capture::infrastructure::video_file_camera::VideoFileCamera;
use crate::detection::domain::face_detector::FaceDetector;
use crate::detection::infrastructure::missing_model_detector::MissingModelDetector;
use crate::detection::infrastructure::model_resolver::{self, ModelLocation, ProgressFn};
use crate::detection::infrastructure::onnx_blazeface_detector::OnnxBlazefaceDetector;
use crate::distance::domain::distance_selector::DistanceSelector;
use crate::distance::domain::face_width_source::FaceWidthSource;
use crate::distance::domain::manual_debug_source::ManualDebugSource;
use crate::distance::infrastructure::external_sensor_source::ExternalSensorSource;
use crate::distance::infrastructure::sensor_transport::{SensorAddress, SensorError};
use crate::playback::domain::frame_source::{FrameSource, FrameSourceError};
use crate::playback::infrastructure::sequence_catalog::{self, CatalogFrameSource};
use crate::render::domain::display_surface::DisplaySurface;
use crate::render::render_loop::{RenderLoop, RenderLoopParts};
use crate::render::tick_logger::TickLogger;
use crate::shared::constants::BLAZEFACE_MODEL_NAME;
use crate::shared::settings::{Settings, SettingsError};

#[derive(Error, Debug)]
pub enum BuildError {
    #[error(transparent)]
    Settings(#[from] SettingsError),
    #[error(transparent)]
    Sequence(#[from] FrameSourceError),
    #[error(transparent)]
    Sensor(#[from] SensorError),
}

/// Where a loop's output goes.
pub struct RenderOutputs {
    pub output: Box<dyn DisplaySurface>,
    pub preview: Box<dyn DisplaySurface>,
    pub logger: Box<dyn TickLogger>,
}

/// Assembles a [`RenderLoop`] from settings.
///
/// Invalid settings, an unparsable sensor address and an explicitly
/// configured sequence that will not open are errors. A missing camera or
/// face model is not: the loop starts without them and says so in the log.
pub fn build_render_loop(
    settings: &Settings,
    camera_opener: Box<dyn CameraOpener>,
    outputs: RenderOutputs,
    model_progress: Option<ProgressFn>,
) -> Result<RenderLoop, BuildError> {
    settings.validate()?;

    let camera = open_camera(settings, camera_opener.as_ref());
    let detector = build_detector(settings, model_progress);
    let distances = build_distances(settings, detector)?;
    let frames = open_frames(settings)?;

    Ok(RenderLoop::new(RenderLoopParts {
        camera,
        camera_opener,
        distances,
        frames,
        range: settings.playback_range()?,
        target: settings.display_target(),
        preview_size: settings.preview,
        show_face_box: settings.show_face_box,
        output: outputs.output,
        preview: outputs.preview,
        logger: outputs.logger,
    }))
}

/// Opens the configured camera, or a placeholder that reports why it could not.
pub fn open_camera(settings: &Settings, opener: &dyn CameraOpener) -> Box<dyn CaptureDevice> {
    let opened = match &settings.camera_video {
        Some(path) => VideoFileCamera::open(path).map(|c| Box::new(c) as Box<dyn CaptureDevice>),
        None => opener.open(settings.camera_index),
    };
    match opened {
        Ok(camera) => {
            log::debug!("Opened {}", camera.describe());
            camera
        }
        Err(e) => {
            log::warn!("Starting without a camera: {e}");
            Box::new(UnavailableCamera::new(e.to_string()))
        }
    }
}

/// Loads the BlazeFace model, or a detector that always fails if that is
/// not possible.
pub fn build_detector(settings: &Settings, progress: Option<ProgressFn>) -> Box<dyn FaceDetector> {
    let bundled = bundled_model_dir();
    let location = ModelLocation {
        explicit: settings.model_path.as_deref(),
        bundled_dir: bundled.as_deref(),
        url: settings.model_url.as_deref(),
    };
    let loaded = model_resolver::resolve(BLAZEFACE_MODEL_NAME, &location, progress)
        .map_err(|e| e.to_string())
        .and_then(|path| {
            OnnxBlazefaceDetector::new(&path, settings.detection_confidence)
                .map_err(|e| format!("cannot load {}: {e}", path.display()))
        });
    match loaded {
        Ok(detector) => Box::new(detector),
        Err(reason) => {
            log::warn!("Face-width distance unavailable: {reason}");
            Box::new(MissingModelDetector::new(reason))
        }
    }
}

fn build_distances(
    settings: &Settings,
    detector: Box<dyn FaceDetector>,
) -> Result<DistanceSelector, BuildError> {
    let face = FaceWidthSource::new(detector, settings.intrinsics()?);
    let mut distances =
        DistanceSelector::new(face, ManualDebugSource::new(settings.manual_distance_cm));

    if let Some(address) = &settings.sensor_address {
        let address: SensorAddress = address.parse()?;
        log::info!("Reading distances from sensor at {address}");
        distances = distances.with_sensor(
            Box::new(ExternalSensorSource::start(address)?),
            settings.sensor_fallback_to_face,
        );
    }
    if let Err(reason) = distances.select(settings.distance_source) {
        log::warn!("Cannot start with {}: {reason}", settings.distance_source);
    }
    Ok(distances)
}

/// Opens `settings.video`, or the first sequence found in `settings.video_dir`.
///
/// A remembered `video` that no longer opens falls back to the catalogue;
/// one required for this run does not.
fn open_frames(settings: &Settings) -> Result<Box<dyn FrameSource>, FrameSourceError> {
    if let Some(video) = &settings.video {
        match sequence_catalog::open_frame_source(video, settings.image_sequence_fps) {
            Ok(frames) => return Ok(frames),
            Err(e) if settings.require_video => return Err(e),
            Err(e) => log::warn!("Last sequence is unavailable ({e}); scanning instead"),
        }
    }

    let mut frames = CatalogFrameSource::new(settings.image_sequence_fps);
    match first_sequence(&settings.video_dir) {
        Some(path) => {
            if let Err(e) = frames.replace(&path) {
                log::warn!("Starting without a sequence: {e}");
            }
        }
        None => log::warn!(
            "No sequences found in {}; choose one to start playback",
            settings.video_dir.display()
        ),
    }
    Ok(Box::new(frames))
}

fn first_sequence(dir: &Path) -> Option<PathBuf> {
    match sequence_catalog::discover(dir) {
        Ok(found) => found.into_iter().next(),
        Err(e) => {
            log::debug!("Cannot scan {}: {e}", dir.display());
            None
        }
    }
}

fn bundled_model_dir() -> Option<PathBuf> {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join("models")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::infrastructure::unavailable_camera::UnavailableCameraOpener;
    use crate::distance::domain::distance_estimate::DistanceSourceKind;
    use crate::playback::infrastructure::ffmpeg_frame_source::test_video::create_test_video;
    use crate::render::domain::display_surface::{LatestFrameSurface, NullSurface};
    use crate::render::domain::tick_report::RenderState;
    use crate::render::tick_logger::NullTickLogger;

    fn outputs(output: &LatestFrameSurface) -> RenderOutputs {
        RenderOutputs {
            output: Box::new(output.clone()),
            preview: Box::new(NullSurface),
            logger: Box::new(NullTickLogger),
        }
    }

    fn settings_in(dir: &Path) -> Settings {
        Settings {
            video_dir: dir.to_path_buf(),
            model_path: Some(dir.join("absent.onnx")),
            canvas: (16, 16),
            ..Default::default()
        }
    }

    #[test]
    fn test_starts_without_camera_or_model() {
        let dir = tempfile::tempdir().unwrap();
        create_test_video(&dir.path().join("a.mp4"), 10, 64, 48, 10);
        let output = LatestFrameSurface::new();

        let mut render = build_render_loop(
            &settings_in(dir.path()),
            Box::new(UnavailableCameraOpener),
            outputs(&output),
            None,
        )
        .unwrap();

        assert_eq!(render.sequence().unwrap().frame_count, 10);
        assert!(render.camera_description().starts_with("no camera"));
        let report = render.tick();
        assert_eq!(report.state, RenderState::Idle);
        assert!(!report.camera_available);
        assert_eq!(output.take().unwrap().width(), 16);
    }

    #[test]
    fn test_manual_source_from_settings() {
        let dir = tempfile::tempdir().unwrap();
        create_test_video(&dir.path().join("a.mp4"), 10, 64, 48, 10);
        let settings = Settings {
            distance_source: DistanceSourceKind::Manual,
            manual_distance_cm: 60.0,
            ..settings_in(dir.path())
        };

        let mut render = build_render_loop(
            &settings,
            Box::new(UnavailableCameraOpener),
            outputs(&LatestFrameSurface::new()),
            None,
        )
        .unwrap();
        let report = render.tick();
        assert_eq!(report.state, RenderState::Active);
        assert_eq!(report.frame_index, 9);
    }

    #[test]
    fn test_empty_video_dir_starts_without_sequence() {
        let dir = tempfile::tempdir().unwrap();
        let render = build_render_loop(
            &settings_in(dir.path()),
            Box::new(UnavailableCameraOpener),
            outputs(&LatestFrameSurface::new()),
            None,
        )
        .unwrap();
        assert!(render.sequence().is_none());
    }

    #[test]
    fn test_explicit_missing_video_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings {
            video: Some(dir.path().join("missing.mp4")),
            require_video: true,
            ..settings_in(dir.path())
        };
        let result = build_render_loop(
            &settings,
            Box::new(UnavailableCameraOpener),
            outputs(&LatestFrameSurface::new()),
            None,
        );
        assert!(matches!(result, Err(BuildError::Sequence(_))));
    }

    #[test]
    fn test_remembered_missing_video_falls_back_to_catalogue() {
        let dir = tempfile::tempdir().unwrap();
        create_test_video(&dir.path().join("a.mp4"), 10, 64, 48, 10);
        let settings = Settings {
            video: Some(dir.path().join("gone.mp4")),
            ..settings_in(dir.path())
        };

        let mut render = build_render_loop(
            &settings,
            Box::new(UnavailableCameraOpener),
            outputs(&LatestFrameSurface::new()),
            None,
        )
        .unwrap();

        let sequence = render.sequence().unwrap();
        assert_eq!(sequence.identifier, dir.path().join("a.mp4"));
        assert_eq!(sequence.frame_count, 10);
        assert_eq!(render.tick().frame_count, 10);
    }

    #[test]
    fn test_remembered_missing_video_with_empty_dir_starts_without_sequence() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings {
            video: Some(dir.path().join("gone.mp4")),
            ..settings_in(dir.path())
        };
        let render = build_render_loop(
            &settings,
            Box::new(UnavailableCameraOpener),
            outputs(&LatestFrameSurface::new()),
            None,
        )
        .unwrap();
        assert!(render.sequence().is_none());
    }

    #[test]
    fn test_invalid_settings_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings {
            dist_min_cm: 200.0,
            ..settings_in(dir.path())
        };
        let result = build_render_loop(
            &settings,
            Box::new(UnavailableCameraOpener),
            outputs(&LatestFrameSurface::new()),
            None,
        );
        assert!(matches!(result, Err(BuildError::Settings(_))));
    }

    #[test]
    fn test_bad_sensor_address_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings {
            sensor_address: Some("udp://somewhere".into()),
            ..settings_in(dir.path())
        };
        let result = build_render_loop(
            &settings,
            Box::new(UnavailableCameraOpener),
            outputs(&LatestFrameSurface::new()),
            None,
        );
        assert!(matches!(result, Err(BuildError::Sensor(_))));
    }

    #[test]
    fn test_video_file_camera_from_settings() {
        let dir = tempfile::tempdir().unwrap();
        let clip = dir.path().join("viewer.mp4");
        create_test_video(&clip, 4, 64, 48, 10);
        let settings = Settings {
            camera_video: Some(clip),
            ..settings_in(dir.path())
        };
        let camera = open_camera(&settings, &UnavailableCameraOpener);
        assert!(camera.is_open());
    }

    #[test]
    fn test_unresolvable_model_gives_failing_detector() {
        let dir = tempfile::tempdir().unwrap();
        let mut detector = build_detector(&settings_in(dir.path()), None);
        let frame = crate::shared::frame::Frame::filled(4, 4, crate::shared::color::Rgb::BLACK);
        assert!(detector.detect(&frame).is_err());
    }
}
