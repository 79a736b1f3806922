use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::distance::domain::camera_intrinsics::CameraIntrinsics;
use crate::distance::domain::distance_estimate::DistanceSourceKind;
use crate::playback::domain::playback_range::PlaybackRange;
use crate::render::domain::display_target::{DisplayGeometry, DisplayTarget};
use crate::shared::color::Background;
use crate::shared::constants::*;

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("cannot read settings from {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("malformed settings in {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("cannot write settings to {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid settings: {0}")]
    Invalid(String),
}

/// Installation configuration. Every field has a default, so a settings
/// file only needs the fields it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub camera_index: u32,
    /// Video file played as the camera instead of a webcam.
    pub camera_video: Option<PathBuf>,
    pub reference_face_width_cm: f64,
    pub focal_length_px: f64,
    pub dist_max_cm: f64,
    pub dist_min_cm: f64,
    pub tick_period_ms: u64,
    pub canvas: (u32, u32),
    pub preview: (u32, u32),
    pub background: Background,
    pub fullscreen: bool,
    pub display: DisplayGeometry,
    /// Directory scanned for frame sequences.
    pub video_dir: PathBuf,
    /// Sequence to start with; the first one in `video_dir` otherwise.
    pub video: Option<PathBuf>,
    /// Set when `video` was asked for on this run rather than remembered
    /// from the last one. Only then is a `video` that fails to open fatal.
    #[serde(skip)]
    pub require_video: bool,
    pub model_path: Option<PathBuf>,
    pub model_url: Option<String>,
    pub detection_confidence: f64,
    pub distance_source: DistanceSourceKind,
    pub manual_distance_cm: f64,
    /// `tcp://host:port` or a device path.
    pub sensor_address: Option<String>,
    pub sensor_fallback_to_face: bool,
    pub image_sequence_fps: u32,
    pub show_face_box: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            camera_index: 0,
            camera_video: None,
            reference_face_width_cm: DEFAULT_REFERENCE_FACE_WIDTH_CM,
            focal_length_px: DEFAULT_FOCAL_LENGTH_PX,
            dist_max_cm: DEFAULT_DIST_MAX_CM,
            dist_min_cm: DEFAULT_DIST_MIN_CM,
            tick_period_ms: DEFAULT_TICK_PERIOD_MS,
            canvas: DEFAULT_CANVAS_SIZE,
            preview: DEFAULT_PREVIEW_SIZE,
            background: Background::Black,
            fullscreen: false,
            display: DisplayGeometry::default(),
            video_dir: PathBuf::from(DEFAULT_VIDEO_DIR),
            video: None,
            require_video: false,
            model_path: None,
            model_url: None,
            detection_confidence: DEFAULT_DETECTION_CONFIDENCE,
            distance_source: DistanceSourceKind::FaceWidth,
            manual_distance_cm: DEFAULT_MANUAL_DISTANCE_CM,
            sensor_address: None,
            sensor_fallback_to_face: true,
            image_sequence_fps: DEFAULT_IMAGE_SEQUENCE_FPS,
            show_face_box: false,
        }
    }
}

impl Settings {
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("PortraitScrub").join("settings.json"))
    }

    /// Loads the user's settings, falling back to defaults when the file is
    /// missing, unreadable or invalid.
    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            return Self::default();
        };
        if !path.exists() {
            return Self::default();
        }
        match Self::load_from(&path) {
            Ok(settings) => settings,
            Err(e) => {
                log::warn!("{e}; using defaults");
                Self::default()
            }
        }
    }

    /// Loads and validates an explicit settings file.
    pub fn load_from(path: &Path) -> Result<Self, SettingsError> {
        let json = fs::read_to_string(path).map_err(|source| SettingsError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let settings: Settings =
            serde_json::from_str(&json).map_err(|source| SettingsError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        settings.validate()?;
        Ok(settings)
    }

    /// Saves to the user's config directory. Failures are logged.
    pub fn save(&self) {
        if let Some(path) = Self::config_path() {
            if let Err(e) = self.save_to(&path) {
                log::warn!("{e}");
            }
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<(), SettingsError> {
        let write_err = |source| SettingsError::Write {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(write_err)?;
        }
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| SettingsError::Invalid(e.to_string()))?;
        fs::write(path, json).map_err(write_err)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        self.intrinsics()?;
        self.playback_range()?;
        if self.canvas.0 == 0 || self.canvas.1 == 0 {
            return Err(invalid("canvas must be at least 1x1"));
        }
        if self.preview.0 == 0 || self.preview.1 == 0 {
            return Err(invalid("preview must be at least 1x1"));
        }
        if self.tick_period_ms == 0 {
            return Err(invalid("tick_period_ms must be at least 1"));
        }
        if !(0.0..=1.0).contains(&self.detection_confidence) {
            return Err(invalid(format!(
                "detection_confidence must be within [0, 1], got {}",
                self.detection_confidence
            )));
        }
        if self.image_sequence_fps == 0 {
            return Err(invalid("image_sequence_fps must be at least 1"));
        }
        Ok(())
    }

    pub fn intrinsics(&self) -> Result<CameraIntrinsics, SettingsError> {
        CameraIntrinsics::new(self.reference_face_width_cm, self.focal_length_px)
            .map_err(|e| invalid(e.to_string()))
    }

    pub fn playback_range(&self) -> Result<PlaybackRange, SettingsError> {
        PlaybackRange::new(self.dist_max_cm, self.dist_min_cm).map_err(|e| invalid(e.to_string()))
    }

    pub fn display_target(&self) -> DisplayTarget {
        DisplayTarget {
            canvas: self.canvas,
            display: self.display,
            background: self.background,
            fullscreen: self.fullscreen,
        }
    }

    pub fn tick_period(&self) -> Duration {
        Duration::from_millis(self.tick_period_ms.max(1))
    }
}

fn invalid(message: impl Into<String>) -> SettingsError {
    SettingsError::Invalid(message.into())
}
