//! Dark and light palettes, picked from config or the terminal background.

use qrscan_core::ThemeConfig;
use ratatui::style::Color;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    /// Detect the terminal theme based on background luminance.
    ///
    /// Must run before raw mode is enabled; the query reads the reply from
    /// stdin.
    pub fn detect() -> Self {
        match terminal_light::luma() {
            Ok(luma) if luma > 0.5 => {
                tracing::info!("Detected light terminal (luma: {:.2})", luma);
                Theme::Light
            }
            Ok(luma) => {
                tracing::info!("Detected dark terminal (luma: {:.2})", luma);
                Theme::Dark
            }
            Err(e) => {
                tracing::debug!("Could not detect terminal theme: {}, defaulting to dark", e);
                Theme::Dark
            }
        }
    }

    /// Resolve the configured preference, detecting only for `System`.
    pub fn from_config(config: ThemeConfig) -> Self {
        match config {
            ThemeConfig::System => Self::detect(),
            ThemeConfig::Light => Theme::Light,
            ThemeConfig::Dark => Theme::Dark,
        }
    }

    pub fn palette(&self) -> Palette {
        match self {
            Theme::Dark => Palette::dark(),
            Theme::Light => Palette::light(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Palette {
    pub fg: Color,
    pub border: Color,
    pub primary: Color,
    pub success: Color,
    pub warning: Color,
    pub error: Color,
    pub muted: Color,
    /// Key hints in the footer.
    pub highlight: Color,
}

impl Palette {
    pub fn dark() -> Self {
        Self {
            fg: Color::White,
            border: Color::DarkGray,
            primary: Color::Cyan,
            success: Color::Green,
            warning: Color::Yellow,
            error: Color::Red,
            muted: Color::DarkGray,
            highlight: Color::Yellow,
        }
    }

    pub fn light() -> Self {
        Self {
            fg: Color::Black,
            border: Color::Gray,
            primary: Color::Rgb(0, 128, 128),
            success: Color::Rgb(0, 128, 0),
            warning: Color::Rgb(184, 134, 11),
            error: Color::Rgb(178, 34, 34),
            muted: Color::Gray,
            highlight: Color::Rgb(184, 134, 11),
        }
    }
}
