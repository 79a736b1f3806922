use std::path::PathBuf;

/// Describes the frame sequence currently held by a frame source.
///
/// `frame_count` is always at least 1 for an opened sequence.
#[derive(Clone, Debug, PartialEq)]
pub struct SequenceInfo {
    pub identifier: PathBuf,
    pub width: u32,
    pub height: u32,
    pub fps: f64,
    pub frame_count: usize,
}

impl SequenceInfo {
    pub fn name(&self) -> String {
        self.identifier
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| self.identifier.display().to_string())
    }

    pub fn duration_secs(&self) -> f64 {
        if self.fps > 0.0 {
            self.frame_count as f64 / self.fps
        } else {
            0.0
        }
    }
}
