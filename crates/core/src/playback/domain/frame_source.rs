use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::shared::frame::Frame;
use crate::shared::sequence_info::SequenceInfo;

#[derive(Error, Debug)]
pub enum FrameSourceError {
    /// The requested frame could not be produced (out of range, corrupt or
    /// truncated data, or no sequence open).
    #[error("cannot decode frame {index}: {reason}")]
    Decode { index: usize, reason: String },
    /// A replacement sequence could not be opened; the previous one stays active.
    #[error("cannot open {identifier}: {reason}")]
    Open { identifier: PathBuf, reason: String },
}

impl FrameSourceError {
    pub fn decode(index: usize, reason: impl ToString) -> Self {
        Self::Decode {
            index,
            reason: reason.to_string(),
        }
    }

    pub fn open(identifier: &Path, reason: impl ToString) -> Self {
        Self::Open {
            identifier: identifier.to_path_buf(),
            reason: reason.to_string(),
        }
    }
}

/// Seekable, replaceable sequence of decoded frames.
///
/// Implementations must support random access by absolute index, since the
/// requested index jumps with viewer distance. A source starts empty; the
/// first `replace` opens its initial sequence.
pub trait FrameSource: Send {
    /// The active sequence, or `None` before anything was opened.
    fn sequence(&self) -> Option<&SequenceInfo>;

    /// Decodes the frame at `index`.
    fn seek(&mut self, index: usize) -> Result<Frame, FrameSourceError>;

    /// Opens `identifier` and makes it the active sequence.
    ///
    /// On failure the previous sequence and its decode state are untouched.
    fn replace(&mut self, identifier: &Path) -> Result<SequenceInfo, FrameSourceError>;

    /// Releases decode handles. The source reports no sequence afterwards.
    fn close(&mut self);

    fn frame_count(&self) -> usize {
        self.sequence().map_or(0, |s| s.frame_count)
    }
}
