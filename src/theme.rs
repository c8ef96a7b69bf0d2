/// Accent colour used when a theme does not name one
pub const DEFAULT_ACCENT: &str = "#16b777";

/// Opacity of the light accent used for in-range backgrounds
pub const LIGHT_ACCENT_OPACITY: f64 = 0.1;

#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum ThemeBase {
    #[default]
    Default,
    Molv,
    Grid,
    Circle,
    FullPanel,
    Dark,
}

impl ThemeBase {
    pub fn from_name(name: &str) -> Option<ThemeBase> {
        match name {
            "default" => Some(ThemeBase::Default),
            "molv" => Some(ThemeBase::Molv),
            "grid" => Some(ThemeBase::Grid),
            "circle" => Some(ThemeBase::Circle),
            "fullpanel" => Some(ThemeBase::FullPanel),
            "dark" => Some(ThemeBase::Dark),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ThemeBase::Default => "default",
            ThemeBase::Molv => "molv",
            ThemeBase::Grid => "grid",
            ThemeBase::Circle => "circle",
            ThemeBase::FullPanel => "fullpanel",
            ThemeBase::Dark => "dark",
        }
    }
}

/// A parsed theme setting: a built-in look plus an optional accent colour
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Theme {
    pub base: ThemeBase,
    pub color: Option<String>,
}

impl Theme {
    /// Interpret the theme entries.  A single entry is a colour if it starts with
    /// `#`, a built-in name if it is one, and a colour otherwise.  Two
    /// entries are a built-in name (unknown names mean the default look)
    /// followed by a colour.
    pub fn parse<S: AsRef<str>>(entries: &[S]) -> Theme {
        match entries {
            [] => Theme::default(),
            [single] => {
                let single = single.as_ref();
                match ThemeBase::from_name(single) {
                    Some(base) => Theme { base, color: None },
                    None => Theme {
                        base: ThemeBase::Default,
                        color: Some(single.to_owned()),
                    },
                }
            }
            [base, color, ..] => Theme {
                base: ThemeBase::from_name(base.as_ref()).unwrap_or_default(),
                color: Some(color.as_ref())
                    .filter(|c| !c.is_empty())
                    .map(str::to_owned),
            },
        }
    }

    pub fn accent(&self) -> &str {
        self.color.as_deref().unwrap_or(DEFAULT_ACCENT)
    }

    pub fn light_accent(&self) -> String {
        hex_to_rgba(self.accent(), LIGHT_ACCENT_OPACITY)
    }

    pub fn is_dark(&self, dark_mode: bool) -> bool {
        dark_mode || self.base == ThemeBase::Dark
    }

    pub fn is_full_panel(&self) -> bool {
        self.base == ThemeBase::FullPanel
    }

    /// The accent as RGB components, if it is a `#rgb` or `#rrggbb` colour
    pub fn accent_rgb(&self) -> Option<(u8, u8, u8)> {
        hex_components(self.accent())
    }
}

/// Render a hex colour as a CSS `rgba()` string.  An empty string yields the
/// default accent; anything not starting with `#` is returned unchanged;
/// hex strings of an unexpected length give black.
pub fn hex_to_rgba(hex: &str, opacity: f64) -> String {
    if hex.is_empty() {
        return format!("rgba(22, 183, 119, {opacity})");
    }
    if !hex.starts_with('#') {
        return hex.to_owned();
    }
    let (r, g, b) = hex_components(hex).unwrap_or((0, 0, 0));
    format!("rgba({r}, {g}, {b}, {opacity})")
}

fn hex_components(hex: &str) -> Option<(u8, u8, u8)> {
    let digits = hex.strip_prefix('#')?;
    let channel = |s: &str| u8::from_str_radix(s, 16).unwrap_or(0);
    match digits.len() {
        3 => {
            let mut doubled = digits.chars().map(|c| channel(&format!("{c}{c}")));
            Some((doubled.next()?, doubled.next()?, doubled.next()?))
        }
        6 => Some((
            channel(digits.get(0..2)?),
            channel(digits.get(2..4)?),
            channel(digits.get(4..6)?),
        )),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_theme_entries() {
        assert_eq!(Theme::parse::<&str>(&[]), Theme::default());
        assert_eq!(
            Theme::parse(&["molv"]),
            Theme {
                base: ThemeBase::Molv,
                color: None
            }
        );
        assert_eq!(
            Theme::parse(&["#FF5722"]),
            Theme {
                base: ThemeBase::Default,
                color: Some(String::from("#FF5722"))
            }
        );
        assert_eq!(
            Theme::parse(&["tomato"]),
            Theme {
                base: ThemeBase::Default,
                color: Some(String::from("tomato"))
            }
        );
        assert_eq!(
            Theme::parse(&["grid", "#FF5722"]),
            Theme {
                base: ThemeBase::Grid,
                color: Some(String::from("#FF5722"))
            }
        );
        assert_eq!(
            Theme::parse(&["sparkly", ""]),
            Theme {
                base: ThemeBase::Default,
                color: None
            }
        );
    }

    #[test]
    fn test_hex_to_rgba() {
        assert_eq!(hex_to_rgba("#16b777", 0.1), "rgba(22, 183, 119, 0.1)");
        assert_eq!(hex_to_rgba("#fff", 0.5), "rgba(255, 255, 255, 0.5)");
        assert_eq!(hex_to_rgba("", 0.1), "rgba(22, 183, 119, 0.1)");
        assert_eq!(hex_to_rgba("red", 0.1), "red");
        assert_eq!(hex_to_rgba("#12345", 1.0), "rgba(0, 0, 0, 1)");
    }

    #[test]
    fn test_accents() {
        let theme = Theme::default();
        assert_eq!(theme.accent(), DEFAULT_ACCENT);
        assert_eq!(theme.light_accent(), "rgba(22, 183, 119, 0.1)");
        assert_eq!(theme.accent_rgb(), Some((0x16, 0xb7, 0x77)));
        assert!(!theme.is_dark(false));
        assert!(theme.is_dark(true));
        assert!(Theme::parse(&["dark"]).is_dark(false));
    }
}
