use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, Sender};

use crate::render::domain::render_command::{RenderCommand, RenderEvent};
use crate::render::render_loop::RenderLoop;

/// Drives a [`RenderLoop`] at a fixed period on the calling thread.
///
/// An overrunning tick delays the next one instead of skipping it, and ticks
/// never overlap. Commands queued since the previous tick are applied before
/// each tick. When the run ends, by cancellation or tick limit, the loop is
/// shut down.
pub struct FixedPeriodScheduler {
    period: Duration,
    max_ticks: Option<u64>,
    cancelled: Arc<AtomicBool>,
}

impl FixedPeriodScheduler {
    pub fn new(period: Duration) -> Self {
        Self {
            period: period.max(Duration::from_millis(1)),
            max_ticks: None,
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn with_max_ticks(mut self, max_ticks: Option<u64>) -> Self {
        self.max_ticks = max_ticks;
        self
    }

    /// Shares an existing cancellation flag, e.g. one set by a signal handler.
    pub fn with_cancel_flag(mut self, cancelled: Arc<AtomicBool>) -> Self {
        self.cancelled = cancelled;
        self
    }

    /// Setting this flag stops the run within one period.
    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        self.cancelled.clone()
    }

    /// Runs until cancelled or `max_ticks` is reached. Returns the number of
    /// ticks run.
    pub fn run(
        &self,
        render: &mut RenderLoop,
        commands: &Receiver<RenderCommand>,
        events: Option<&Sender<RenderEvent>>,
    ) -> u64 {
        log::info!(
            "Render loop running every {} ms",
            self.period.as_millis()
        );
        let mut ticks = 0u64;
        let mut deadline = Instant::now();

        while !self.should_stop(ticks) {
            for command in commands.try_iter() {
                log::debug!("Applying {command:?}");
                if let Some(event) = render.apply(command) {
                    log::info!("{event}");
                    if let Some(events) = events {
                        // Nobody listening is fine; the event was logged.
                        let _ = events.send(event);
                    }
                }
            }

            render.tick();
            ticks += 1;

            let now = Instant::now();
            deadline = next_deadline(deadline, self.period, now);
            if deadline > now {
                std::thread::sleep(deadline - now);
            }
        }

        render.shutdown();
        ticks
    }

    fn should_stop(&self, ticks: u64) -> bool {
        self.cancelled.load(Ordering::Relaxed) || self.max_ticks.is_some_and(|max| ticks >= max)
    }
}

/// Start of the next tick: one period after the previous start, or `now` if
/// that moment has already passed.
fn next_deadline(previous: Instant, period: Duration, now: Instant) -> Instant {
    (previous + period).max(now)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::fakes::{calls, frame_color, manual_render_loop, CallLog};
    use std::path::PathBuf;

    #[test]
    fn test_next_deadline_keeps_cadence() {
        let start = Instant::now();
        let period = Duration::from_millis(30);
        assert_eq!(
            next_deadline(start, period, start + Duration::from_millis(5)),
            start + period
        );
    }

    #[test]
    fn test_overrun_starts_next_tick_immediately() {
        let start = Instant::now();
        let late = start + Duration::from_millis(45);
        assert_eq!(next_deadline(start, Duration::from_millis(30), late), late);
    }

    #[test]
    fn test_runs_max_ticks_then_shuts_down() {
        let log = CallLog::default();
        let (mut render, _output) = manual_render_loop(&log);
        let (_tx, rx) = crossbeam_channel::unbounded();

        let ticks = FixedPeriodScheduler::new(Duration::from_millis(1))
            .with_max_ticks(Some(5))
            .run(&mut render, &rx, None);

        assert_eq!(ticks, 5);
        assert_eq!(calls(&log), vec!["close cam0", "close frames"]);
    }

    #[test]
    fn test_commands_apply_before_tick() {
        let log = CallLog::default();
        let (mut render, output) = manual_render_loop(&log);
        let (tx, rx) = crossbeam_channel::unbounded();
        let (event_tx, event_rx) = crossbeam_channel::unbounded();
        tx.send(RenderCommand::SetManualDistance(60.0)).unwrap();
        tx.send(RenderCommand::ReplaceSequence(PathBuf::from("short")))
            .unwrap();

        FixedPeriodScheduler::new(Duration::from_millis(1))
            .with_max_ticks(Some(1))
            .run(&mut render, &rx, Some(&event_tx));

        assert!(matches!(
            event_rx.try_recv(),
            Ok(RenderEvent::SequenceReplaced(_))
        ));
        let out = output.take().unwrap();
        assert_eq!(out.pixel(4, 4), frame_color(9));
    }

    #[test]
    fn test_cancel_stops_within_a_period() {
        let log = CallLog::default();
        let (mut render, _output) = manual_render_loop(&log);
        let (_tx, rx) = crossbeam_channel::unbounded::<RenderCommand>();
        let scheduler = FixedPeriodScheduler::new(Duration::from_millis(30));
        let cancel = scheduler.cancel_flag();

        let handle = std::thread::spawn(move || scheduler.run(&mut render, &rx, None));
        std::thread::sleep(Duration::from_millis(100));
        let cancelled_at = Instant::now();
        cancel.store(true, Ordering::Relaxed);
        let ticks = handle.join().unwrap();

        assert!(cancelled_at.elapsed() < Duration::from_millis(500));
        assert!(ticks >= 1);
        assert_eq!(calls(&log), vec!["close cam0", "close frames"]);
    }

    #[test]
    fn test_pre_cancelled_runs_no_ticks() {
        let log = CallLog::default();
        let (mut render, _output) = manual_render_loop(&log);
        let (_tx, rx) = crossbeam_channel::unbounded();
        let flag = Arc::new(AtomicBool::new(true));

        let ticks = FixedPeriodScheduler::new(Duration::from_millis(30))
            .with_cancel_flag(flag)
            .run(&mut render, &rx, None);
        assert_eq!(ticks, 0);
    }
}
