use std::sync::Arc;

use crate::shared::frame::Frame;
use crate::shared::mailbox::Mailbox;

/// Output the render loop publishes frames to. Publishing never waits for
/// the consumer.
pub trait DisplaySurface: Send {
    fn publish(&self, frame: Frame);
}

/// Surface backed by a most-recent-wins mailbox. Clones share the slot, so
/// one clone can live in the render loop and another in the UI.
#[derive(Clone, Default)]
pub struct LatestFrameSurface {
    slot: Arc<Mailbox<Frame>>,
}

impl LatestFrameSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// The newest unconsumed frame, if any.
    pub fn take(&self) -> Option<Frame> {
        self.slot.take()
    }

    pub fn peek(&self) -> Option<Frame> {
        self.slot.peek()
    }
}

impl DisplaySurface for LatestFrameSurface {
    fn publish(&self, frame: Frame) {
        self.slot.publish(frame);
    }
}

/// Discards everything; for headless runs without a preview.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullSurface;

impl DisplaySurface for NullSurface {
    fn publish(&self, _frame: Frame) {}
}
