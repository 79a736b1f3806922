use iced::color;
use iced::theme::Palette;
use iced::{Color, Theme};

/// Dark theme for the control window; the room is dark during an
/// installation.
pub fn control_theme() -> Theme {
    Theme::custom("Portrait Scrub", palette())
}

fn palette() -> Palette {
    Palette {
        background: color!(0x1c, 0x1c, 0x1e),
        text: color!(0xcc, 0xcc, 0xcc),
        primary: color!(0x5e, 0x9f, 0xf5),
        success: color!(0x30, 0xd1, 0x58),
        warning: color!(0xff, 0xcc, 0x00),
        danger: color!(0xff, 0x45, 0x3a),
    }
}

pub fn muted_color(theme: &Theme) -> Color {
    Color {
        a: 0.6,
        ..theme.palette().text
    }
}

pub fn danger_color(theme: &Theme) -> Color {
    theme.palette().danger
}
