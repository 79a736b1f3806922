use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::playback::domain::frame_source::{FrameSource, FrameSourceError};
use crate::playback::infrastructure::ffmpeg_frame_source::FfmpegFrameSource;
use crate::playback::infrastructure::image_sequence_source::{is_image, ImageSequenceSource};
use crate::shared::constants::VIDEO_EXTENSIONS;
use crate::shared::frame::Frame;
use crate::shared::sequence_info::SequenceInfo;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SequenceKind {
    Video,
    ImageSequence,
}

impl SequenceKind {
    /// Classifies a path by extension, or as an image directory.
    pub fn of(path: &Path) -> Option<Self> {
        if path.is_dir() {
            return has_images(path).then_some(Self::ImageSequence);
        }
        if is_video(path) {
            Some(Self::Video)
        } else if is_image(path) {
            Some(Self::ImageSequence)
        } else {
            None
        }
    }
}

pub fn is_video(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| VIDEO_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

fn has_images(dir: &Path) -> bool {
    fs::read_dir(dir)
        .map(|entries| {
            entries
                .filter_map(|e| e.ok())
                .any(|e| e.path().is_file() && is_image(&e.path()))
        })
        .unwrap_or(false)
}

/// Lists playable sequences directly inside `dir`: video files and
/// sub-directories holding images. Sorted by path.
pub fn discover(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut found: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| match SequenceKind::of(path) {
            Some(SequenceKind::Video) => path.is_file(),
            Some(SequenceKind::ImageSequence) => path.is_dir(),
            None => false,
        })
        .collect();
    found.sort();
    log::debug!("Discovered {} sequences in {}", found.len(), dir.display());
    Ok(found)
}

/// Frame source that accepts any sequence kind and routes each `replace`
/// to the matching adapter.
///
/// Switching kinds only closes the old adapter once the new one has opened.
pub struct CatalogFrameSource {
    video: FfmpegFrameSource,
    images: ImageSequenceSource,
    active: Option<SequenceKind>,
}

impl CatalogFrameSource {
    pub fn new(image_sequence_fps: u32) -> Self {
        Self {
            video: FfmpegFrameSource::new(),
            images: ImageSequenceSource::new(image_sequence_fps),
            active: None,
        }
    }

    fn adapter(&self, kind: SequenceKind) -> &dyn FrameSource {
        match kind {
            SequenceKind::Video => &self.video,
            SequenceKind::ImageSequence => &self.images,
        }
    }

    fn adapter_mut(&mut self, kind: SequenceKind) -> &mut dyn FrameSource {
        match kind {
            SequenceKind::Video => &mut self.video,
            SequenceKind::ImageSequence => &mut self.images,
        }
    }
}

impl FrameSource for CatalogFrameSource {
    fn sequence(&self) -> Option<&SequenceInfo> {
        self.active.and_then(|kind| self.adapter(kind).sequence())
    }

    fn seek(&mut self, index: usize) -> Result<Frame, FrameSourceError> {
        match self.active {
            Some(kind) => self.adapter_mut(kind).seek(index),
            None => Err(FrameSourceError::decode(index, "no sequence open")),
        }
    }

    fn replace(&mut self, identifier: &Path) -> Result<SequenceInfo, FrameSourceError> {
        let kind = SequenceKind::of(identifier).ok_or_else(|| {
            FrameSourceError::open(identifier, "not a video, image or image directory")
        })?;
        let info = self.adapter_mut(kind).replace(identifier)?;
        if let Some(previous) = self.active.filter(|&previous| previous != kind) {
            self.adapter_mut(previous).close();
        }
        self.active = Some(kind);
        Ok(info)
    }

    fn close(&mut self) {
        self.video.close();
        self.images.close();
        self.active = None;
    }
}

/// Opens `identifier` in a fresh catalog source.
pub fn open_frame_source(
    identifier: &Path,
    image_sequence_fps: u32,
) -> Result<Box<dyn FrameSource>, FrameSourceError> {
    let mut source = CatalogFrameSource::new(image_sequence_fps);
    source.replace(identifier)?;
    Ok(Box::new(source))
}
