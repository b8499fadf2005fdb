use std::sync::OnceLock;

use ratatui::style::{Color, Modifier, Style};
use serde::Deserialize;

static THEME: OnceLock<Theme> = OnceLock::new();

/// Get the active theme. Falls back to the default until `install` runs.
pub fn current() -> &'static Theme {
    THEME.get_or_init(Theme::default)
}

/// Sets the theme for the rest of the process. Only the first call wins.
pub fn install(theme: Theme) {
    let _ = THEME.set(theme);
}

// Const fallback used in places that need compile-time styles
pub const DIM_STYLE: Style = Style::new().fg(Color::DarkGray);

#[derive(Debug, Clone)]
pub struct Theme {
    pub name: String,
    pub today: Style,
    pub selected: Style,
    pub header: Style,
    pub dim: Style,
    pub border: Style,
    pub status: Style,
    pub highlight: Style,
    pub error: Style,
    /// Countdown display once it reaches zero.
    pub expired: Style,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            name: "default".to_string(),
            today: Style::default().fg(Color::Black).bg(Color::Yellow),
            selected: Style::default().fg(Color::Black).bg(Color::Cyan),
            header: Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
            dim: Style::default().fg(Color::DarkGray),
            border: Style::default().fg(Color::Gray),
            status: Style::default().fg(Color::White).bg(Color::DarkGray),
            highlight: Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD),
            error: Style::default().fg(Color::White).bg(Color::Red),
            expired: Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        }
    }
}

impl Theme {
    /// Get a built-in preset by name.
    pub fn preset(name: &str) -> Self {
        match name {
            "dracula" => Self::from_palette(
                "dracula",
                Palette {
                    fg: (248, 248, 242),
                    surface: (68, 71, 90),
                    muted: (98, 114, 164),
                    today: (189, 147, 249),
                    selected: (139, 233, 253),
                    alert: (255, 85, 85),
                },
            ),
            "gruvbox" => Self::from_palette(
                "gruvbox",
                Palette {
                    fg: (235, 219, 178),
                    surface: (80, 73, 69),
                    muted: (146, 131, 116),
                    today: (250, 189, 47),
                    selected: (131, 165, 152),
                    alert: (251, 73, 52),
                },
            ),
            "nord" => Self::from_palette(
                "nord",
                Palette {
                    fg: (229, 233, 240),
                    surface: (67, 76, 94),
                    muted: (76, 86, 106),
                    today: (235, 203, 139),
                    selected: (136, 192, 208),
                    alert: (191, 97, 106),
                },
            ),
            _ => Self::default(),
        }
    }

    fn from_palette(name: &str, p: Palette) -> Self {
        let rgb = |(r, g, b): (u8, u8, u8)| Color::Rgb(r, g, b);
        Self {
            name: name.to_string(),
            today: Style::default().fg(Color::Black).bg(rgb(p.today)),
            selected: Style::default().fg(Color::Black).bg(rgb(p.selected)),
            header: Style::default().fg(rgb(p.fg)).add_modifier(Modifier::BOLD),
            dim: Style::default().fg(rgb(p.muted)),
            border: Style::default().fg(rgb(p.surface)),
            status: Style::default().fg(rgb(p.fg)).bg(rgb(p.surface)),
            highlight: Style::default().bg(rgb(p.surface)).add_modifier(Modifier::BOLD),
            error: Style::default().fg(rgb(p.fg)).bg(rgb(p.alert)),
            expired: Style::default().fg(rgb(p.alert)).add_modifier(Modifier::BOLD),
        }
    }
}

struct Palette {
    fg: (u8, u8, u8),
    surface: (u8, u8, u8),
    muted: (u8, u8, u8),
    today: (u8, u8, u8),
    selected: (u8, u8, u8),
    alert: (u8, u8, u8),
}

/// `[theme]` table of the config file: a preset plus per-style overrides.
#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct ThemeConfig {
    pub preset: Option<String>,
    pub today_fg: Option<String>,
    pub today_bg: Option<String>,
    pub selected_fg: Option<String>,
    pub selected_bg: Option<String>,
    pub header_fg: Option<String>,
    pub dim_fg: Option<String>,
    pub border_fg: Option<String>,
    pub status_fg: Option<String>,
    pub status_bg: Option<String>,
}

impl ThemeConfig {
    pub fn into_theme(self) -> Theme {
        let mut theme = self
            .preset
            .as_deref()
            .map(Theme::preset)
            .unwrap_or_default();

        let color = |s: &Option<String>| s.as_deref().and_then(parse_color);
        if let Some(c) = color(&self.today_fg) {
            theme.today = theme.today.fg(c);
        }
        if let Some(c) = color(&self.today_bg) {
            theme.today = theme.today.bg(c);
        }
        if let Some(c) = color(&self.selected_fg) {
            theme.selected = theme.selected.fg(c);
        }
        if let Some(c) = color(&self.selected_bg) {
            theme.selected = theme.selected.bg(c);
        }
        if let Some(c) = color(&self.header_fg) {
            theme.header = theme.header.fg(c);
        }
        if let Some(c) = color(&self.dim_fg) {
            theme.dim = theme.dim.fg(c);
        }
        if let Some(c) = color(&self.border_fg) {
            theme.border = theme.border.fg(c);
        }
        if let Some(c) = color(&self.status_fg) {
            theme.status = theme.status.fg(c);
        }
        if let Some(c) = color(&self.status_bg) {
            theme.status = theme.status.bg(c);
        }

        theme
    }
}

/// Parse a color string: hex "#rrggbb", or named colors.
pub fn parse_color(s: &str) -> Option<Color> {
    let s = s.trim();
    if let Some(hex) = s.strip_prefix('#') {
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
        let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
        let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
        return Some(Color::Rgb(r, g, b));
    }
    match s.to_lowercase().as_str() {
        "black" => Some(Color::Black),
        "red" => Some(Color::Red),
        "green" => Some(Color::Green),
        "yellow" => Some(Color::Yellow),
        "blue" => Some(Color::Blue),
        "magenta" => Some(Color::Magenta),
        "cyan" => Some(Color::Cyan),
        "white" => Some(Color::White),
        "gray" | "grey" => Some(Color::Gray),
        "darkgray" | "darkgrey" => Some(Color::DarkGray),
        "lightred" => Some(Color::LightRed),
        "lightgreen" => Some(Color::LightGreen),
        "lightyellow" => Some(Color::LightYellow),
        "lightblue" => Some(Color::LightBlue),
        "lightmagenta" => Some(Color::LightMagenta),
        "lightcyan" => Some(Color::LightCyan),
        _ => None,
    }
}

/// Color for a stored task; anything unparsable draws white.
pub fn task_color(s: &str) -> Color {
    parse_color(s).unwrap_or(Color::White)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hex_and_names() {
        assert_eq!(parse_color("#FF6B6B"), Some(Color::Rgb(255, 107, 107)));
        assert_eq!(parse_color(" DarkGrey "), Some(Color::DarkGray));
        assert_eq!(parse_color("#12345"), None);
        assert_eq!(parse_color("#ééé"), None);
        assert_eq!(parse_color("teal"), None);
    }

    #[test]
    fn overrides_apply_on_top_of_preset() {
        let config = ThemeConfig {
            preset: Some("nord".to_string()),
            today_bg: Some("red".to_string()),
            ..ThemeConfig::default()
        };
        let theme = config.into_theme();
        assert_eq!(theme.name, "nord");
        assert_eq!(theme.today.bg, Some(Color::Red));
        assert_eq!(Theme::preset("unknown").name, "default");
    }
}
