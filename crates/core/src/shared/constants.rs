/// Average adult face width used by the pinhole distance model.
pub const DEFAULT_REFERENCE_FACE_WIDTH_CM: f64 = 16.0;
pub const DEFAULT_FOCAL_LENGTH_PX: f64 = 600.0;

/// Viewer distance that maps to the first frame.
pub const DEFAULT_DIST_MAX_CM: f64 = 100.0;
/// Viewer distance that maps to the last frame.
pub const DEFAULT_DIST_MIN_CM: f64 = 60.0;

pub const DEFAULT_TICK_PERIOD_MS: u64 = 30;

pub const DEFAULT_CANVAS_SIZE: (u32, u32) = (1200, 1200);
pub const DEFAULT_PREVIEW_SIZE: (u32, u32) = (480, 360);
pub const DEFAULT_DISPLAY_SIZE: (u32, u32) = (1920, 1080);

pub const DEFAULT_DETECTION_CONFIDENCE: f64 = 0.3;
pub const DEFAULT_MANUAL_DISTANCE_CM: f64 = 80.0;
pub const DEFAULT_IMAGE_SEQUENCE_FPS: u32 = 20;

pub const DEFAULT_VIDEO_DIR: &str = "Images/out";

pub const BLAZEFACE_MODEL_NAME: &str = "blazeface_short_range.onnx";

pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mov", "avi", "mkv", "webm"];
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "tiff", "tif", "webp"];
