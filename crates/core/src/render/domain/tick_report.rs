use crate::distance::domain::distance_estimate::{DistanceEstimate, DistanceSourceKind};

/// Per-tick state of the loop: `Active` while a valid distance drives
/// playback, `Idle` otherwise.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RenderState {
    #[default]
    Idle,
    Active,
}

/// Snapshot of one tick, for status display.
#[derive(Clone, Debug, PartialEq)]
pub struct TickReport {
    pub tick: u64,
    pub state: RenderState,
    pub estimate: DistanceEstimate,
    pub active_source: DistanceSourceKind,
    pub frame_index: usize,
    pub frame_count: usize,
    pub camera_available: bool,
    /// Set when this tick could not decode the requested frame.
    pub decode_error: Option<String>,
}

impl TickReport {
    /// One-line human-readable summary.
    pub fn status_line(&self) -> String {
        let distance = match self.estimate.value() {
            Some(cm) => format!("{cm:.1} cm ({})", self.estimate.source),
            None => "no distance".to_string(),
        };
        let mut line = format!(
            "{:?} | {distance} | frame {}/{}",
            self.state,
            self.frame_index,
            self.frame_count.saturating_sub(1)
        );
        if !self.camera_available {
            line.push_str(" | camera unavailable");
        }
        if let Some(err) = &self.decode_error {
            line.push_str(" | ");
            line.push_str(err);
        }
        line
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(estimate: DistanceEstimate) -> TickReport {
        TickReport {
            tick: 3,
            state: RenderState::Active,
            estimate,
            active_source: DistanceSourceKind::FaceWidth,
            frame_index: 20,
            frame_count: 41,
            camera_available: true,
            decode_error: None,
        }
    }

    #[test]
    fn test_status_line_active() {
        let line =
            report(DistanceEstimate::valid(80.0, DistanceSourceKind::FaceWidth)).status_line();
        assert_eq!(line, "Active | 80.0 cm (Face width) | frame 20/40");
    }

    #[test]
    fn test_status_line_flags_problems() {
        let mut r = report(DistanceEstimate::invalid(DistanceSourceKind::FaceWidth));
        r.state = RenderState::Idle;
        r.camera_available = false;
        r.decode_error = Some("cannot decode frame 20: truncated".into());
        assert_eq!(
            r.status_line(),
            "Idle | no distance | frame 20/40 | camera unavailable | cannot decode frame 20: truncated"
        );
    }
}
