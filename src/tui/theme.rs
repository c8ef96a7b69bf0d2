use laydate::theme::Theme;
use ratatui::style::{Color, Modifier, Style};

pub(crate) const BASE_STYLE: Style = Style::new().fg(Color::White).bg(Color::Black);

pub(crate) const HEADER_STYLE: Style = BASE_STYLE.add_modifier(Modifier::BOLD);

pub(crate) const WEEKDAY_STYLE: Style = BASE_STYLE.add_modifier(Modifier::BOLD);

pub(crate) const OTHER_MONTH_STYLE: Style = BASE_STYLE.fg(Color::DarkGray);

pub(crate) const DISABLED_STYLE: Style = BASE_STYLE
    .fg(Color::DarkGray)
    .add_modifier(Modifier::CROSSED_OUT);

pub(crate) const MARK_STYLE: Style = BASE_STYLE.fg(Color::LightRed);

pub(crate) const INPUT_STYLE: Style = BASE_STYLE.add_modifier(Modifier::UNDERLINED);

pub(crate) const HINT_STYLE: Style = BASE_STYLE.fg(Color::LightYellow);

pub(crate) const FOCUSED_BUTTON_STYLE: Style = BASE_STYLE.add_modifier(Modifier::BOLD);

/// Fallback when the configured accent is not a hex colour
const DEFAULT_ACCENT: Color = Color::Green;

/// Styles that depend on the configured accent colour
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct Palette {
    pub(crate) selected: Style,
    pub(crate) in_range: Style,
    pub(crate) title: Style,
}

impl Palette {
    pub(crate) fn new(theme: &Theme) -> Palette {
        let accent = theme
            .accent_rgb()
            .map_or(DEFAULT_ACCENT, |(r, g, b)| Color::Rgb(r, g, b));
        Palette {
            selected: Style::new().fg(Color::Black).bg(accent),
            in_range: BASE_STYLE.fg(accent).add_modifier(Modifier::UNDERLINED),
            title: BASE_STYLE.fg(accent).add_modifier(Modifier::BOLD),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_palette_from_hex() {
        let palette = Palette::new(&Theme::parse(&["#FF5722"]));
        assert_eq!(palette.selected.bg, Some(Color::Rgb(0xFF, 0x57, 0x22)));
        let palette = Palette::new(&Theme::default());
        assert_eq!(palette.selected.bg, Some(Color::Rgb(0x16, 0xb7, 0x77)));
    }
}
