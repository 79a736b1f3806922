use std::fs;
use std::path::{Path, PathBuf};

use crate::playback::domain::frame_source::{FrameSource, FrameSourceError};
use crate::shared::constants::{DEFAULT_IMAGE_SEQUENCE_FPS, IMAGE_EXTENSIONS};
use crate::shared::frame::Frame;
use crate::shared::sequence_info::SequenceInfo;

/// Plays a directory of still images as a frame sequence, one frame per file
/// in file-name order. A single image file is a one-frame sequence.
///
/// Frames are decoded on demand with the `image` crate, so seeking is plain
/// random access.
pub struct ImageSequenceSource {
    fps: u32,
    active: Option<ActiveSequence>,
}

struct ActiveSequence {
    info: SequenceInfo,
    files: Vec<PathBuf>,
}

impl ImageSequenceSource {
    pub fn new(fps: u32) -> Self {
        Self {
            fps: fps.max(1),
            active: None,
        }
    }
}

impl Default for ImageSequenceSource {
    fn default() -> Self {
        Self::new(DEFAULT_IMAGE_SEQUENCE_FPS)
    }
}

impl FrameSource for ImageSequenceSource {
    fn sequence(&self) -> Option<&SequenceInfo> {
        self.active.as_ref().map(|a| &a.info)
    }

    fn seek(&mut self, index: usize) -> Result<Frame, FrameSourceError> {
        let active = self
            .active
            .as_ref()
            .ok_or_else(|| FrameSourceError::decode(index, "no sequence open"))?;
        let path = active.files.get(index).ok_or_else(|| {
            FrameSourceError::decode(
                index,
                format!("index out of range (frame count {})", active.files.len()),
            )
        })?;
        decode(path, index)
    }

    fn replace(&mut self, identifier: &Path) -> Result<SequenceInfo, FrameSourceError> {
        let files = if identifier.is_dir() {
            list_images(identifier)?
        } else if is_image(identifier) && identifier.is_file() {
            vec![identifier.to_path_buf()]
        } else {
            return Err(FrameSourceError::open(
                identifier,
                "not an image or a directory of images",
            ));
        };

        let first = decode(&files[0], 0)
            .map_err(|e| FrameSourceError::open(identifier, e.to_string()))?;

        let info = SequenceInfo {
            identifier: identifier.to_path_buf(),
            width: first.width(),
            height: first.height(),
            fps: self.fps as f64,
            frame_count: files.len(),
        };
        log::info!(
            "Opened image sequence {} ({} frames, {}x{})",
            identifier.display(),
            info.frame_count,
            info.width,
            info.height
        );
        self.active = Some(ActiveSequence {
            info: info.clone(),
            files,
        });
        Ok(info)
    }

    fn close(&mut self) {
        self.active = None;
    }
}

pub fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Image files directly inside `dir`, sorted by file name.
fn list_images(dir: &Path) -> Result<Vec<PathBuf>, FrameSourceError> {
    let entries = fs::read_dir(dir).map_err(|e| FrameSourceError::open(dir, e))?;
    let mut files: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_file() && is_image(path))
        .collect();
    if files.is_empty() {
        return Err(FrameSourceError::open(dir, "directory contains no images"));
    }
    files.sort();
    Ok(files)
}

fn decode(path: &Path, index: usize) -> Result<Frame, FrameSourceError> {
    let image = image::open(path).map_err(|e| FrameSourceError::decode(index, e))?;
    Ok(Frame::from_rgb_image(image.to_rgb8(), index))
}
