use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam_channel::{Receiver, Sender};

use portrait_scrub_core::capture::infrastructure::default_camera_opener;
use portrait_scrub_core::render::domain::display_surface::LatestFrameSurface;
use portrait_scrub_core::render::domain::render_command::{RenderCommand, RenderEvent};
use portrait_scrub_core::render::domain::tick_report::TickReport;
use portrait_scrub_core::render::infrastructure::fixed_period_scheduler::FixedPeriodScheduler;
use portrait_scrub_core::render::infrastructure::render_loop_factory::{
    build_render_loop, RenderOutputs,
};
use portrait_scrub_core::render::tick_logger::SummaryTickLogger;
use portrait_scrub_core::shared::mailbox::Mailbox;
use portrait_scrub_core::shared::settings::Settings;

/// Handle to the render loop running on its own thread.
///
/// The UI only ever reads the most recent output, preview and report, so a
/// slow redraw never holds up a tick.
pub struct RenderWorker {
    commands: Sender<RenderCommand>,
    events: Receiver<RenderEvent>,
    failure: Arc<Mailbox<String>>,
    pub output: LatestFrameSurface,
    pub preview: LatestFrameSurface,
    pub reports: Arc<Mailbox<TickReport>>,
    cancelled: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl RenderWorker {
    /// Builds the loop on a new thread and runs it until [`RenderWorker::stop`].
    pub fn spawn(settings: Settings) -> Self {
        let (commands, command_rx) = crossbeam_channel::unbounded::<RenderCommand>();
        let (event_tx, events) = crossbeam_channel::unbounded::<RenderEvent>();
        let failure = Arc::new(Mailbox::new());
        let output = LatestFrameSurface::new();
        let preview = LatestFrameSurface::new();
        let reports = Arc::new(Mailbox::new());
        let cancelled = Arc::new(AtomicBool::new(false));

        let handle = {
            let output = output.clone();
            let preview = preview.clone();
            let reports = reports.clone();
            let cancelled = cancelled.clone();
            let failure = failure.clone();
            thread::Builder::new()
                .name("render-loop".into())
                .spawn(move || {
                    run(
                        &settings,
                        RenderOutputs {
                            output: Box::new(output),
                            preview: Box::new(preview),
                            logger: Box::new(SummaryTickLogger::default()),
                        },
                        reports,
                        cancelled,
                        &command_rx,
                        &event_tx,
                        &failure,
                    )
                })
        };
        let handle = match handle {
            Ok(handle) => Some(handle),
            Err(e) => {
                log::error!("Cannot start render thread: {e}");
                None
            }
        };

        Self {
            commands,
            events,
            failure,
            output,
            preview,
            reports,
            cancelled,
            handle,
        }
    }

    /// Queues a command for the start of the next tick.
    pub fn send(&self, command: RenderCommand) {
        if self.commands.send(command).is_err() {
            log::warn!("Render loop is not running; command dropped");
        }
    }

    /// Outcomes of commands applied since the last call.
    pub fn drain_events(&self) -> Vec<RenderEvent> {
        self.events.try_iter().collect()
    }

    /// Why the loop could not be started, if it could not.
    pub fn failure(&self) -> Option<String> {
        self.failure.peek()
    }

    /// Cancels the loop and waits for it to release its devices.
    pub fn stop(&mut self) {
        self.cancelled.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::error!("Render thread panicked");
            }
        }
    }
}

impl Drop for RenderWorker {
    fn drop(&mut self) {
        self.stop();
    }
}

fn run(
    settings: &Settings,
    outputs: RenderOutputs,
    reports: Arc<Mailbox<TickReport>>,
    cancelled: Arc<AtomicBool>,
    commands: &Receiver<RenderCommand>,
    events: &Sender<RenderEvent>,
    failure: &Mailbox<String>,
) {
    let mut render = match build_render_loop(settings, default_camera_opener(), outputs, None) {
        Ok(render) => render.with_reports(reports),
        Err(e) => {
            log::error!("Cannot start: {e}");
            failure.publish(e.to_string());
            return;
        }
    };

    FixedPeriodScheduler::new(settings.tick_period())
        .with_cancel_flag(cancelled)
        .run(&mut render, commands, Some(events));
}
