mod app;
mod panels;
mod theme;
mod workers;

use app::App;
use portrait_scrub_core::shared::settings::Settings;

fn main() -> iced::Result {
    env_logger::init();

    iced::application(App::new, App::update, App::view)
        .title("Portrait Scrub")
        .theme(App::theme)
        .subscription(App::subscription)
        .window(window_settings(&Settings::load()))
        .run()
}

/// Windowed control panel, or a borderless window covering the configured
/// display when starting fullscreen.
fn window_settings(settings: &Settings) -> iced::window::Settings {
    let base = iced::window::Settings {
        exit_on_close_request: false,
        ..Default::default()
    };
    if !settings.fullscreen {
        return iced::window::Settings {
            size: iced::Size::new(1100.0, 720.0),
            ..base
        };
    }
    let display = settings.display;
    iced::window::Settings {
        size: iced::Size::new(display.width as f32, display.height as f32),
        position: iced::window::Position::Specific(iced::Point::new(
            display.x as f32,
            display.y as f32,
        )),
        decorations: false,
        ..base
    }
}
