//! In-memory stand-ins for the render loop's collaborators.

use std::collections::{HashMap, HashSet, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::capture::domain::capture_device::{CameraOpener, CaptureDevice, CaptureError};
use crate::distance::domain::camera_intrinsics::CameraIntrinsics;
use crate::distance::domain::distance_estimate::DistanceSourceKind;
use crate::distance::domain::distance_selector::DistanceSelector;
use crate::distance::domain::face_width_source::fakes::ScriptedDetector;
use crate::distance::domain::face_width_source::FaceWidthSource;
use crate::distance::domain::manual_debug_source::ManualDebugSource;
use crate::playback::domain::frame_source::{FrameSource, FrameSourceError};
use crate::playback::domain::playback_range::PlaybackRange;
use crate::render::domain::display_surface::{LatestFrameSurface, NullSurface};
use crate::render::domain::display_target::DisplayTarget;
use crate::render::render_loop::{RenderLoop, RenderLoopParts};
use crate::render::tick_logger::NullTickLogger;
use crate::shared::color::Rgb;
use crate::shared::frame::Frame;
use crate::shared::sequence_info::SequenceInfo;

/// Shared, ordered record of lifecycle calls across fakes.
pub type CallLog = Arc<Mutex<Vec<String>>>;

pub fn calls(log: &CallLog) -> Vec<String> {
    log.lock().unwrap().clone()
}

/// Camera that replays scripted reads; once the script runs out every read
/// returns a grey 8x6 frame.
pub struct FakeCamera {
    pub name: String,
    pub open: bool,
    pub script: VecDeque<Result<(), CaptureError>>,
    pub log: CallLog,
    reads: usize,
}

impl FakeCamera {
    pub fn new(name: &str, log: &CallLog) -> Self {
        Self {
            name: name.to_string(),
            open: true,
            script: VecDeque::new(),
            log: log.clone(),
            reads: 0,
        }
    }

    pub fn failing(mut self, times: usize) -> Self {
        for _ in 0..times {
            self.script
                .push_back(Err(CaptureError::ReadFailed("usb hiccup".into())));
        }
        self
    }
}

impl CaptureDevice for FakeCamera {
    fn is_open(&self) -> bool {
        self.open
    }

    fn read_frame(&mut self) -> Result<Frame, CaptureError> {
        self.script.pop_front().unwrap_or(Ok(()))?;
        self.reads += 1;
        Ok(Frame::filled(8, 6, Rgb::GRAY).with_index(self.reads))
    }

    fn close(&mut self) {
        if self.open {
            self.open = false;
            self.log.lock().unwrap().push(format!("close {}", self.name));
        }
    }

    fn describe(&self) -> String {
        self.name.clone()
    }
}

/// Opens `FakeCamera`s, except for indices listed in `broken`.
pub struct FakeOpener {
    pub broken: HashSet<u32>,
    pub log: CallLog,
}

impl CameraOpener for FakeOpener {
    fn open(&self, index: u32) -> Result<Box<dyn CaptureDevice>, CaptureError> {
        self.log.lock().unwrap().push(format!("open {index}"));
        if self.broken.contains(&index) {
            return Err(CaptureError::DeviceUnavailable(index.to_string()));
        }
        Ok(Box::new(FakeCamera::new(&format!("cam{index}"), &self.log)))
    }
}

/// Frame source over synthetic sequences keyed by path. Frame `i` is a 4x4
/// frame whose red channel is `i`. Indices in `corrupt` fail to decode.
pub struct FakeFrameSource {
    pub catalogue: HashMap<PathBuf, usize>,
    pub corrupt: HashSet<usize>,
    pub active: Option<SequenceInfo>,
    pub log: CallLog,
}

impl FakeFrameSource {
    pub fn new(catalogue: &[(&str, usize)], log: &CallLog) -> Self {
        Self {
            catalogue: catalogue
                .iter()
                .map(|(path, count)| (PathBuf::from(path), *count))
                .collect(),
            corrupt: HashSet::new(),
            active: None,
            log: log.clone(),
        }
    }

    pub fn opened(mut self, path: &str) -> Self {
        self.replace(Path::new(path)).unwrap();
        self
    }
}

pub fn frame_color(index: usize) -> Rgb {
    Rgb([index as u8, 0, 0])
}

impl FrameSource for FakeFrameSource {
    fn sequence(&self) -> Option<&SequenceInfo> {
        self.active.as_ref()
    }

    fn seek(&mut self, index: usize) -> Result<Frame, FrameSourceError> {
        let count = self.frame_count();
        if index >= count || self.corrupt.contains(&index) {
            return Err(FrameSourceError::decode(index, "corrupt"));
        }
        Ok(Frame::filled(4, 4, frame_color(index)).with_index(index))
    }

    fn replace(&mut self, identifier: &Path) -> Result<SequenceInfo, FrameSourceError> {
        let count = *self
            .catalogue
            .get(identifier)
            .ok_or_else(|| FrameSourceError::open(identifier, "no such sequence"))?;
        let info = SequenceInfo {
            identifier: identifier.to_path_buf(),
            width: 4,
            height: 4,
            fps: 20.0,
            frame_count: count,
        };
        self.active = Some(info.clone());
        Ok(info)
    }

    fn close(&mut self) {
        if self.active.take().is_some() {
            self.log.lock().unwrap().push("close frames".into());
        }
    }
}

/// A loop in manual mode at 80 cm over a 41-frame "long" sequence, with
/// `cam0` as its camera. Output goes to the returned surface.
pub fn manual_render_loop(log: &CallLog) -> (RenderLoop, LatestFrameSurface) {
    let face = FaceWidthSource::new(
        Box::new(ScriptedDetector::new(Vec::new())),
        CameraIntrinsics::default(),
    );
    let mut distances = DistanceSelector::new(face, ManualDebugSource::new(80.0));
    distances
        .select(DistanceSourceKind::Manual)
        .expect("manual source is always available");
    let output = LatestFrameSurface::new();
    let render = RenderLoop::new(RenderLoopParts {
        camera: Box::new(FakeCamera::new("cam0", log)),
        camera_opener: Box::new(FakeOpener {
            broken: HashSet::new(),
            log: log.clone(),
        }),
        distances,
        frames: Box::new(FakeFrameSource::new(&[("long", 41), ("short", 10)], log).opened("long")),
        range: PlaybackRange::default(),
        target: DisplayTarget {
            canvas: (8, 8),
            ..Default::default()
        },
        preview_size: (4, 3),
        show_face_box: false,
        output: Box::new(output.clone()),
        preview: Box::new(NullSurface),
        logger: Box::new(NullTickLogger),
    });
    (render, output)
}
