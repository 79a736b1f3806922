/// Where playback currently stands. Mutated once per tick by the render loop.
///
/// `current_frame_index` stays below the active sequence's frame count; it is
/// reset to 0 whenever the sequence is replaced.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PlaybackState {
    pub current_frame_index: usize,
    pub face_present: bool,
}

impl PlaybackState {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Pulls the index back into `[0, frame_count - 1]` (0 for an empty sequence).
    pub fn clamp_to(&mut self, frame_count: usize) {
        let last = frame_count.saturating_sub(1);
        self.current_frame_index = self.current_frame_index.min(last);
    }
}
