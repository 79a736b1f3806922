use std::sync::Arc;
use std::time::Instant;

use crate::capture::domain::capture_device::{CameraOpener, CaptureDevice, CaptureError};
use crate::capture::infrastructure::unavailable_camera::UnavailableCamera;
use crate::distance::domain::distance_estimate::{DistanceEstimate, DistanceSourceKind};
use crate::distance::domain::distance_selector::DistanceSelector;
use crate::playback::domain::frame_source::FrameSource;
use crate::playback::domain::playback_mapper::map_to_frame;
use crate::playback::domain::playback_range::PlaybackRange;
use crate::playback::domain::playback_state::PlaybackState;
use crate::render::domain::compositor;
use crate::render::domain::display_surface::DisplaySurface;
use crate::render::domain::display_target::DisplayTarget;
use crate::render::domain::render_command::{RenderCommand, RenderEvent};
use crate::render::domain::tick_report::{RenderState, TickReport};
use crate::render::tick_logger::TickLogger;
use crate::shared::color::Rgb;
use crate::shared::frame::Frame;
use crate::shared::mailbox::Mailbox;
use crate::shared::sequence_info::SequenceInfo;

const FACE_BOX_COLOR: Rgb = Rgb([0, 255, 0]);
const FACE_BOX_THICKNESS: u32 = 2;

/// Everything a render loop owns, handed over at construction.
pub struct RenderLoopParts {
    pub camera: Box<dyn CaptureDevice>,
    pub camera_opener: Box<dyn CameraOpener>,
    pub distances: DistanceSelector,
    pub frames: Box<dyn FrameSource>,
    pub range: PlaybackRange,
    pub target: DisplayTarget,
    pub preview_size: (u32, u32),
    pub show_face_box: bool,
    pub output: Box<dyn DisplaySurface>,
    pub preview: Box<dyn DisplaySurface>,
    pub logger: Box<dyn TickLogger>,
}

/// One tick: read the camera, get a distance, map it to a frame, seek,
/// composite, publish.
///
/// The loop owns its camera, distance sources and frame source and releases
/// them in [`RenderLoop::shutdown`] (also run on drop). No failure inside a
/// tick escapes it: camera, detector and decode problems degrade the output
/// to a held frame or the background.
pub struct RenderLoop {
    camera: Box<dyn CaptureDevice>,
    camera_opener: Box<dyn CameraOpener>,
    distances: DistanceSelector,
    frames: Box<dyn FrameSource>,
    range: PlaybackRange,
    target: DisplayTarget,
    preview_size: (u32, u32),
    show_face_box: bool,
    output: Box<dyn DisplaySurface>,
    preview: Box<dyn DisplaySurface>,
    logger: Box<dyn TickLogger>,
    reports: Option<Arc<Mailbox<TickReport>>>,

    state: PlaybackState,
    render_state: RenderState,
    held_frame: Option<Frame>,
    ticks: u64,
    camera_failing: bool,
    decode_failing: bool,
    shut_down: bool,
}

impl RenderLoop {
    pub fn new(parts: RenderLoopParts) -> Self {
        Self {
            camera: parts.camera,
            camera_opener: parts.camera_opener,
            distances: parts.distances,
            frames: parts.frames,
            range: parts.range,
            target: parts.target,
            preview_size: parts.preview_size,
            show_face_box: parts.show_face_box,
            output: parts.output,
            preview: parts.preview,
            logger: parts.logger,
            reports: None,
            state: PlaybackState::default(),
            render_state: RenderState::Idle,
            held_frame: None,
            ticks: 0,
            camera_failing: false,
            decode_failing: false,
            shut_down: false,
        }
    }

    /// Also publish every tick's report to `reports`.
    pub fn with_reports(mut self, reports: Arc<Mailbox<TickReport>>) -> Self {
        self.reports = Some(reports);
        self
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn sequence(&self) -> Option<&SequenceInfo> {
        self.frames.sequence()
    }

    pub fn camera_description(&self) -> String {
        self.camera.describe()
    }

    /// Runs one iteration. Never fails; problems show up in the report.
    pub fn tick(&mut self) -> TickReport {
        let tick_start = Instant::now();
        self.ticks += 1;

        let started = Instant::now();
        let camera_frame = self.capture();
        self.logger.timing("capture", elapsed_ms(started));

        let started = Instant::now();
        let estimate = self.distances.distance(camera_frame.as_ref());
        self.logger.timing("distance", elapsed_ms(started));

        let mut decode_error = None;
        let canvas = self.target.output_size();
        let background = self.target.background.rgb();
        let composited = match estimate.value() {
            None => {
                self.render_state = RenderState::Idle;
                self.state.face_present = false;
                compositor::background(canvas, background)
            }
            Some(distance_cm) => {
                self.render_state = RenderState::Active;
                self.state.face_present = true;
                self.logger.metric("distance_cm", distance_cm);

                let started = Instant::now();
                decode_error = self.fetch_frame(distance_cm);
                self.logger.timing("seek", elapsed_ms(started));

                let started = Instant::now();
                let out = match &self.held_frame {
                    Some(frame) => compositor::letterbox(frame, canvas, background),
                    None => compositor::background(canvas, background),
                };
                self.logger.timing("composite", elapsed_ms(started));
                out
            }
        };
        self.output.publish(composited);

        if let Some(frame) = camera_frame {
            self.publish_preview(frame, &estimate);
        }

        let report = TickReport {
            tick: self.ticks,
            state: self.render_state,
            estimate,
            active_source: self.distances.active(),
            frame_index: self.state.current_frame_index,
            frame_count: self.frames.frame_count(),
            camera_available: !self.camera_failing,
            decode_error,
        };
        if let Some(reports) = &self.reports {
            reports.publish(report.clone());
        }
        self.logger.timing("tick", elapsed_ms(tick_start));
        self.logger.tick(self.ticks);
        report
    }

    /// Applies a user action. Returns an event for actions whose outcome the
    /// user needs to see.
    pub fn apply(&mut self, command: RenderCommand) -> Option<RenderEvent> {
        match command {
            RenderCommand::SelectSource(kind) => self
                .distances
                .select(kind)
                .err()
                .map(|reason| RenderEvent::SourceRejected { kind, reason }),
            RenderCommand::SetManualDistance(value_cm) => {
                self.distances.set_manual_distance(value_cm);
                None
            }
            RenderCommand::ReplaceSequence(identifier) => {
                Some(match self.frames.replace(&identifier) {
                    Ok(info) => {
                        self.state.reset();
                        self.held_frame = None;
                        self.decode_failing = false;
                        RenderEvent::SequenceReplaced(info)
                    }
                    Err(e) => {
                        log::warn!("Keeping current sequence: {e}");
                        RenderEvent::SequenceRejected {
                            identifier,
                            reason: e.to_string(),
                        }
                    }
                })
            }
            RenderCommand::SetBackground(background) => {
                self.target.background = background;
                None
            }
            RenderCommand::SetFullscreen(fullscreen) => {
                self.target.fullscreen = fullscreen;
                None
            }
            RenderCommand::SwitchCamera(index) => Some(self.switch_camera(index)),
            RenderCommand::SetShowFaceBox(show) => {
                self.show_face_box = show;
                None
            }
        }
    }

    /// Releases the sensor worker, camera and decoder. Each release runs
    /// regardless of how the others went. Safe to call more than once.
    pub fn shutdown(&mut self) {
        if self.shut_down {
            return;
        }
        self.shut_down = true;
        log::info!("Shutting down render loop after {} ticks", self.ticks);

        self.distances.shutdown();
        self.camera.close();
        self.frames.close();
        self.held_frame = None;
        self.logger.summary();
    }

    fn capture(&mut self) -> Option<Frame> {
        let result = if self.camera.is_open() {
            self.camera.read_frame()
        } else {
            Err(CaptureError::DeviceUnavailable(self.camera.describe()))
        };
        match result {
            Ok(frame) => {
                if self.camera_failing {
                    log::info!("Camera recovered: {}", self.camera.describe());
                    self.camera_failing = false;
                }
                Some(frame)
            }
            Err(e) => {
                if !self.camera_failing {
                    log::warn!("Camera read failed, retrying every tick: {e}");
                    self.camera_failing = true;
                }
                None
            }
        }
    }

    /// Maps the distance to a frame and decodes it into `held_frame`. On a
    /// decode failure the previous frame stays held and the error is returned.
    fn fetch_frame(&mut self, distance_cm: f64) -> Option<String> {
        let frame_count = self.frames.frame_count();
        if frame_count == 0 {
            return Some("no sequence loaded".into());
        }

        self.state.current_frame_index = map_to_frame(distance_cm, &self.range, frame_count);
        self.state.clamp_to(frame_count);
        let index = self.state.current_frame_index;
        self.logger.metric("frame_index", index as f64);

        match self.frames.seek(index) {
            Ok(frame) => {
                if self.decode_failing {
                    log::info!("Frame decoding recovered at frame {index}");
                    self.decode_failing = false;
                }
                self.held_frame = Some(frame);
                None
            }
            Err(e) => {
                if !self.decode_failing {
                    log::warn!("Holding last frame: {e}");
                    self.decode_failing = true;
                } else {
                    log::debug!("{e}");
                }
                Some(e.to_string())
            }
        }
    }

    fn publish_preview(&mut self, frame: Frame, estimate: &DistanceEstimate) {
        let frame = match self.distances.last_detections().first() {
            Some(face)
                if self.show_face_box && estimate.source == DistanceSourceKind::FaceWidth =>
            {
                compositor::draw_face_box(frame, face, FACE_BOX_COLOR, FACE_BOX_THICKNESS)
            }
            _ => frame,
        };
        self.preview
            .publish(compositor::letterbox(&frame, self.preview_size, Rgb::BLACK));
    }

    fn switch_camera(&mut self, index: u32) -> RenderEvent {
        // The old handle goes first; some backends refuse a second open.
        self.camera.close();
        match self.camera_opener.open(index) {
            Ok(camera) => {
                let description = camera.describe();
                log::info!("Switched to {description}");
                self.camera = camera;
                self.camera_failing = false;
                RenderEvent::CameraSwitched { index, description }
            }
            Err(e) => {
                log::warn!("Camera {index} unavailable: {e}");
                self.camera = Box::new(UnavailableCamera::new(e.to_string()));
                RenderEvent::CameraRejected {
                    index,
                    reason: e.to_string(),
                }
            }
        }
    }
}

impl Drop for RenderLoop {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn elapsed_ms(since: Instant) -> f64 {
    since.elapsed().as_secs_f64() * 1000.0
}
