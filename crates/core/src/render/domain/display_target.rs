use serde::{Deserialize, Serialize};

use crate::shared::color::Background;
use crate::shared::constants::{DEFAULT_CANVAS_SIZE, DEFAULT_DISPLAY_SIZE};

/// Resolution and offset of the physical display used in fullscreen mode.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayGeometry {
    pub width: u32,
    pub height: u32,
    pub x: i32,
    pub y: i32,
}

impl Default for DisplayGeometry {
    fn default() -> Self {
        Self {
            width: DEFAULT_DISPLAY_SIZE.0,
            height: DEFAULT_DISPLAY_SIZE.1,
            x: 0,
            y: 0,
        }
    }
}

/// Where composited output goes: a fixed canvas in a window, or the whole
/// display when fullscreen.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DisplayTarget {
    pub canvas: (u32, u32),
    pub display: DisplayGeometry,
    pub background: Background,
    pub fullscreen: bool,
}

impl DisplayTarget {
    /// Size the composited frame is produced at.
    pub fn output_size(&self) -> (u32, u32) {
        if self.fullscreen {
            (self.display.width.max(1), self.display.height.max(1))
        } else {
            (self.canvas.0.max(1), self.canvas.1.max(1))
        }
    }
}

impl Default for DisplayTarget {
    fn default() -> Self {
        Self {
            canvas: DEFAULT_CANVAS_SIZE,
            display: DisplayGeometry::default(),
            background: Background::Black,
            fullscreen: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_windowed_uses_canvas() {
        let target = DisplayTarget::default();
        assert_eq!(target.output_size(), (1200, 1200));
    }

    #[test]
    fn test_fullscreen_uses_display() {
        let target = DisplayTarget {
            fullscreen: true,
            display: DisplayGeometry {
                width: 2560,
                height: 1440,
                x: 1920,
                y: 0,
            },
            ..Default::default()
        };
        assert_eq!(target.output_size(), (2560, 1440));
    }

    #[test]
    fn test_zero_sizes_never_escape() {
        let target = DisplayTarget {
            canvas: (0, 0),
            ..Default::default()
        };
        assert_eq!(target.output_size(), (1, 1));
    }
}
