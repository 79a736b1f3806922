use std::path::PathBuf;
use std::time::Duration;

use iced::widget::image;
use iced::{Element, Subscription, Task, Theme};

use portrait_scrub_core::distance::domain::distance_estimate::DistanceSourceKind;
use portrait_scrub_core::playback::infrastructure::sequence_catalog;
use portrait_scrub_core::render::domain::render_command::{RenderCommand, RenderEvent};
use portrait_scrub_core::render::domain::tick_report::TickReport;
use portrait_scrub_core::shared::color::Background;
use portrait_scrub_core::shared::frame::Frame;
use portrait_scrub_core::shared::settings::Settings;

use crate::panels;
use crate::theme;
use crate::workers::render_worker::RenderWorker;

/// How often the window pulls new frames from the render loop.
const POLL_INTERVAL: Duration = Duration::from_millis(30);

/// Camera indices offered in the picker.
const CAMERA_CHOICES: u32 = 4;

/// A sequence shown in the picker, labelled by file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceChoice(pub PathBuf);

impl std::fmt::Display for SequenceChoice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = self
            .0
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| self.0.display().to_string());
        write!(f, "{name}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CameraChoice(pub u32);

impl std::fmt::Display for CameraChoice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Camera {}", self.0)
    }
}

/// Feedback from the last explicit user action.
#[derive(Debug, Clone)]
pub struct Notice {
    pub text: String,
    pub is_error: bool,
}

#[derive(Debug, Clone)]
pub enum Message {
    Poll,
    SequenceChosen(SequenceChoice),
    BrowseSequence,
    SequenceBrowsed(Option<PathBuf>),
    RescanSequences,
    CameraChosen(CameraChoice),
    SourceChanged(DistanceSourceKind),
    ManualDistanceChanged(f32),
    ManualDistanceReleased,
    BackgroundChanged(Background),
    FaceBoxToggled(bool),
    FullscreenToggled(bool),
    CloseRequested(iced::window::Id),
}

impl Message {
    /// Whether handling this message should write settings to disk. Slider
    /// drags only save once the handle is released.
    fn persists_settings(&self) -> bool {
        matches!(
            self,
            Message::SourceChanged(_)
                | Message::ManualDistanceReleased
                | Message::BackgroundChanged(_)
                | Message::FaceBoxToggled(_)
                | Message::FullscreenToggled(_)
        )
    }
}

pub struct App {
    pub settings: Settings,
    worker: RenderWorker,
    pub output: Option<image::Handle>,
    pub preview: Option<image::Handle>,
    pub report: Option<TickReport>,
    pub notice: Option<Notice>,
    pub sequences: Vec<SequenceChoice>,
    pub current_sequence: Option<SequenceChoice>,
}

impl App {
    pub fn new() -> (Self, Task<Message>) {
        let settings = Settings::load();
        let worker = RenderWorker::spawn(settings.clone());
        let mut app = Self {
            current_sequence: settings.video.clone().map(SequenceChoice),
            settings,
            worker,
            output: None,
            preview: None,
            report: None,
            notice: None,
            sequences: Vec::new(),
        };
        app.rescan();
        (app, Task::none())
    }

    pub fn update(&mut self, message: Message) -> Task<Message> {
        let persist = message.persists_settings();
        match message {
            Message::Poll => self.poll(),
            Message::SequenceChosen(choice) => {
                self.worker
                    .send(RenderCommand::ReplaceSequence(choice.0.clone()));
            }
            Message::BrowseSequence => {
                let start_dir = self.settings.video_dir.clone();
                return Task::perform(
                    async move {
                        rfd::AsyncFileDialog::new()
                            .set_title("Select a sequence")
                            .set_directory(start_dir)
                            .add_filter("Videos", &["mp4", "mov", "avi", "mkv", "webm"])
                            .pick_file()
                            .await
                            .map(|h| h.path().to_path_buf())
                    },
                    Message::SequenceBrowsed,
                );
            }
            Message::SequenceBrowsed(Some(path)) => {
                self.worker.send(RenderCommand::ReplaceSequence(path));
            }
            Message::SequenceBrowsed(None) => {}
            Message::RescanSequences => self.rescan(),
            Message::CameraChosen(CameraChoice(index)) => {
                self.worker.send(RenderCommand::SwitchCamera(index));
            }
            Message::SourceChanged(kind) => {
                self.settings.distance_source = kind;
                self.worker.send(RenderCommand::SelectSource(kind));
            }
            Message::ManualDistanceChanged(value) => {
                self.settings.manual_distance_cm = value as f64;
                self.worker
                    .send(RenderCommand::SetManualDistance(value as f64));
            }
            Message::ManualDistanceReleased => {}
            Message::BackgroundChanged(background) => {
                self.settings.background = background;
                self.worker.send(RenderCommand::SetBackground(background));
            }
            Message::FaceBoxToggled(show) => {
                self.settings.show_face_box = show;
                self.worker.send(RenderCommand::SetShowFaceBox(show));
            }
            Message::FullscreenToggled(fullscreen) => {
                self.settings.fullscreen = fullscreen;
                self.output = None;
                self.worker.send(RenderCommand::SetFullscreen(fullscreen));
            }
            Message::CloseRequested(id) => {
                self.worker.stop();
                self.settings.save();
                return iced::window::close(id);
            }
        }
        if persist {
            self.settings.save();
        }
        Task::none()
    }

    pub fn view(&self) -> Element<'_, Message> {
        if self.settings.fullscreen {
            return panels::stage::fullscreen(self.output.as_ref());
        }
        panels::controls::view(self)
    }

    pub fn theme(&self) -> Theme {
        theme::control_theme()
    }

    pub fn subscription(&self) -> Subscription<Message> {
        Subscription::batch([
            iced::time::every(POLL_INTERVAL).map(|_| Message::Poll),
            iced::window::close_requests().map(Message::CloseRequested),
        ])
    }

    pub fn camera_choices() -> Vec<CameraChoice> {
        (0..CAMERA_CHOICES).map(CameraChoice).collect()
    }

    pub fn active_source(&self) -> DistanceSourceKind {
        self.report
            .as_ref()
            .map_or(self.settings.distance_source, |r| r.active_source)
    }

    /// Pulls whatever the render loop produced since the last poll.
    fn poll(&mut self) {
        if let Some(frame) = self.worker.output.take() {
            self.output = Some(to_handle(&frame));
        }
        if let Some(frame) = self.worker.preview.take() {
            self.preview = Some(to_handle(&frame));
        }
        if let Some(report) = self.worker.reports.take() {
            self.report = Some(report);
        }
        if let Some(reason) = self.worker.failure() {
            self.notice = Some(Notice {
                text: format!("Render loop stopped: {reason}"),
                is_error: true,
            });
        }
        for event in self.worker.drain_events() {
            self.on_event(event);
        }
    }

    fn on_event(&mut self, event: RenderEvent) {
        let is_error = matches!(
            event,
            RenderEvent::SequenceRejected { .. }
                | RenderEvent::CameraRejected { .. }
                | RenderEvent::SourceRejected { .. }
        );
        match &event {
            RenderEvent::SequenceReplaced(info) => {
                self.settings.video = Some(info.identifier.clone());
                self.current_sequence = Some(SequenceChoice(info.identifier.clone()));
                self.settings.save();
            }
            RenderEvent::CameraSwitched { index, .. } => {
                self.settings.camera_index = *index;
                self.settings.camera_video = None;
                self.settings.save();
            }
            RenderEvent::SequenceRejected { .. }
            | RenderEvent::CameraRejected { .. }
            | RenderEvent::SourceRejected { .. } => {}
        }
        self.notice = Some(Notice {
            text: event.to_string(),
            is_error,
        });
    }

    fn rescan(&mut self) {
        self.sequences = match sequence_catalog::discover(&self.settings.video_dir) {
            Ok(found) => found.into_iter().map(SequenceChoice).collect(),
            Err(e) => {
                log::warn!("Cannot scan {}: {e}", self.settings.video_dir.display());
                Vec::new()
            }
        };
    }
}

fn to_handle(frame: &Frame) -> image::Handle {
    image::Handle::from_rgba(frame.width(), frame.height(), frame.to_rgba())
}
