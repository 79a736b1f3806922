use iced::widget::{container, image, mouse_area, text};
use iced::{Color, ContentFit, Element, Length, Theme};

use crate::app::Message;

/// A frame from the render loop scaled to fit, or a placeholder until the
/// first one arrives.
pub fn frame_view<'a>(handle: Option<&image::Handle>, placeholder: &'a str) -> Element<'a, Message> {
    let content: Element<'a, Message> = match handle {
        Some(handle) => image(handle.clone())
            .width(Length::Fill)
            .height(Length::Fill)
            .content_fit(ContentFit::Contain)
            .into(),
        None => text(placeholder).size(13).into(),
    };
    container(content)
        .width(Length::Fill)
        .height(Length::Fill)
        .center_x(Length::Fill)
        .center_y(Length::Fill)
        .style(|_theme: &Theme| container::Style {
            background: Some(iced::Background::Color(Color::BLACK)),
            ..Default::default()
        })
        .into()
}

/// Output only, edge to edge. Clicking leaves fullscreen.
pub fn fullscreen(handle: Option<&image::Handle>) -> Element<'_, Message> {
    mouse_area(frame_view(handle, ""))
        .on_press(Message::FullscreenToggled(false))
        .into()
}
