/// One face reported by a detector, in coordinates relative to the frame.
///
/// `relative_x`/`relative_y` locate the top-left corner, `relative_width` and
/// `relative_height` the extent, all as fractions of the frame size.
#[derive(Clone, Debug, PartialEq)]
pub struct DetectedFace {
    pub relative_x: f64,
    pub relative_y: f64,
    pub relative_width: f64,
    pub relative_height: f64,
    pub frame_width_px: u32,
    pub frame_height_px: u32,
    pub score: f64,
}

impl DetectedFace {
    /// A detection of the given relative width; position and height are
    /// irrelevant to distance estimation.
    #[cfg(test)]
    pub fn with_width(relative_width: f64, frame_width_px: u32) -> Self {
        Self {
            relative_x: 0.0,
            relative_y: 0.0,
            relative_width,
            relative_height: relative_width,
            frame_width_px,
            frame_height_px: frame_width_px,
            score: 1.0,
        }
    }

    pub fn pixel_width(&self) -> f64 {
        self.relative_width * self.frame_width_px as f64
    }

    /// Bounding box in pixels, clipped to the frame: `(x, y, width, height)`.
    pub fn pixel_rect(&self) -> (u32, u32, u32, u32) {
        let fw = self.frame_width_px as f64;
        let fh = self.frame_height_px as f64;
        let x1 = (self.relative_x * fw).clamp(0.0, fw);
        let y1 = (self.relative_y * fh).clamp(0.0, fh);
        let x2 = ((self.relative_x + self.relative_width) * fw).clamp(0.0, fw);
        let y2 = ((self.relative_y + self.relative_height) * fh).clamp(0.0, fh);
        (
            x1 as u32,
            y1 as u32,
            (x2 - x1).max(0.0) as u32,
            (y2 - y1).max(0.0) as u32,
        )
    }
}
