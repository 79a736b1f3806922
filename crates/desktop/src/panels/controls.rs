use iced::widget::{button, checkbox, column, container, pick_list, row, slider, text, Space};
use iced::{Alignment, Element, Length, Theme};

use portrait_scrub_core::distance::domain::distance_estimate::DistanceSourceKind;
use portrait_scrub_core::shared::color::Background;

use crate::app::{App, CameraChoice, Message};
use crate::panels::stage::frame_view;
use crate::theme::{danger_color, muted_color};

/// Slack on either side of the distance window for the manual slider, so
/// both saturation ends can be reached.
const MANUAL_MARGIN_CM: f64 = 20.0;

pub fn view(app: &App) -> Element<'_, Message> {
    let stages = row![
        labelled("Camera", frame_view(app.preview.as_ref(), "No camera frames")),
        labelled("Output", frame_view(app.output.as_ref(), "Waiting for output")),
    ]
    .spacing(12)
    .height(Length::FillPortion(3));

    column![stages, controls(app), status(app)]
        .spacing(12)
        .padding(16)
        .height(Length::Fill)
        .into()
}

fn labelled<'a>(title: &'a str, content: Element<'a, Message>) -> Element<'a, Message> {
    column![text(title).size(13), content]
        .spacing(6)
        .width(Length::Fill)
        .into()
}

fn controls(app: &App) -> Element<'_, Message> {
    let settings = &app.settings;
    let active = app.active_source();

    let sequence_row = row![
        text("Sequence").size(13).width(90),
        pick_list(
            app.sequences.as_slice(),
            app.current_sequence.clone(),
            Message::SequenceChosen
        )
        .placeholder("No sequences found")
        .text_size(13)
        .width(Length::Fill),
        button(text("Browse…").size(13)).on_press(Message::BrowseSequence),
        button(text("Rescan").size(13))
            .on_press(Message::RescanSequences)
            .style(button::secondary),
    ]
    .spacing(8)
    .align_y(Alignment::Center);

    let source_row = row![
        text("Distance").size(13).width(90),
        pick_list(DistanceSourceKind::ALL, Some(active), Message::SourceChanged).text_size(13),
        text("Camera").size(13),
        pick_list(
            App::camera_choices(),
            Some(CameraChoice(settings.camera_index)),
            Message::CameraChosen
        )
        .text_size(13),
        text("Background").size(13),
        pick_list(
            Background::ALL,
            Some(settings.background),
            Message::BackgroundChanged
        )
        .text_size(13),
    ]
    .spacing(8)
    .align_y(Alignment::Center);

    let min = (settings.dist_min_cm - MANUAL_MARGIN_CM).max(1.0) as f32;
    let max = (settings.dist_max_cm + MANUAL_MARGIN_CM) as f32;
    let manual_row = row![
        text("Manual").size(13).width(90),
        slider(
            min..=max,
            settings.manual_distance_cm as f32,
            Message::ManualDistanceChanged
        )
        .step(1.0)
        .on_release(Message::ManualDistanceReleased),
        text(format!("{:.0} cm", settings.manual_distance_cm))
            .size(13)
            .width(60),
    ]
    .spacing(8)
    .align_y(Alignment::Center);

    let toggles = row![
        checkbox(settings.show_face_box)
            .label("Show face box")
            .on_toggle(Message::FaceBoxToggled)
            .text_size(13),
        Space::new().width(Length::Fill),
        button(text("Fullscreen").size(13)).on_press(Message::FullscreenToggled(true)),
    ]
    .spacing(8)
    .align_y(Alignment::Center);

    let mut rows = column![sequence_row, source_row].spacing(10);
    if active == DistanceSourceKind::Manual {
        rows = rows.push(manual_row);
    }
    rows.push(toggles).into()
}

fn status(app: &App) -> Element<'_, Message> {
    let line = app
        .report
        .as_ref()
        .map_or_else(|| "Starting…".to_string(), |r| r.status_line());

    let mut lines = column![text(line)
        .size(12)
        .style(|theme: &Theme| text::Style {
            color: Some(muted_color(theme)),
        })]
    .spacing(4);
    if let Some(notice) = &app.notice {
        let is_error = notice.is_error;
        lines = lines.push(text(notice.text.as_str()).size(12).style(move |theme: &Theme| {
            text::Style {
                color: Some(if is_error {
                    danger_color(theme)
                } else {
                    muted_color(theme)
                }),
            }
        }));
    }
    container(lines).width(Length::Fill).into()
}
