use std::path::PathBuf;

use crate::distance::domain::distance_estimate::DistanceSourceKind;
use crate::shared::color::Background;
use crate::shared::sequence_info::SequenceInfo;

/// A user action for the render loop, applied at the start of the next tick.
#[derive(Clone, Debug, PartialEq)]
pub enum RenderCommand {
    SelectSource(DistanceSourceKind),
    SetManualDistance(f64),
    ReplaceSequence(PathBuf),
    SetBackground(Background),
    SetFullscreen(bool),
    SwitchCamera(u32),
    SetShowFaceBox(bool),
}

/// Outcome of an explicit user action that can fail.
#[derive(Clone, Debug, PartialEq)]
pub enum RenderEvent {
    SequenceReplaced(SequenceInfo),
    SequenceRejected { identifier: PathBuf, reason: String },
    CameraSwitched { index: u32, description: String },
    CameraRejected { index: u32, reason: String },
    SourceRejected { kind: DistanceSourceKind, reason: String },
}

impl std::fmt::Display for RenderEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RenderEvent::SequenceReplaced(info) => {
                write!(f, "Playing {} ({} frames)", info.name(), info.frame_count)
            }
            RenderEvent::SequenceRejected { identifier, reason } => {
                write!(f, "Could not open {}: {reason}", identifier.display())
            }
            RenderEvent::CameraSwitched { description, .. } => write!(f, "Using {description}"),
            RenderEvent::CameraRejected { index, reason } => {
                write!(f, "Could not open camera {index}: {reason}")
            }
            RenderEvent::SourceRejected { kind, reason } => {
                write!(f, "Cannot use {kind}: {reason}")
            }
        }
    }
}
