//! Light and dark palettes.

use crossterm::style::Color;

/// Process-wide display mode, toggled from the app bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThemeMode {
    #[default]
    Light,
    Dark,
}

impl ThemeMode {
    pub fn toggle(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }

    pub fn palette(self) -> Palette {
        match self {
            Self::Light => Palette::light(),
            Self::Dark => Palette::dark(),
        }
    }

    /// Label of the toggle action shown in the app bar.
    pub fn toggle_label(self) -> &'static str {
        match self {
            Self::Light => "Dark mode",
            Self::Dark => "Light mode",
        }
    }
}

/// Colors used by the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub background: Color,
    pub surface: Color,
    pub text: Color,
    pub muted: Color,
    pub primary: Color,
    pub on_primary: Color,
    pub header: Color,
    pub selected: Color,
    pub pinned: Color,
    pub error: Color,
}

impl Palette {
    pub fn light() -> Self {
        Self {
            background: Color::Rgb { r: 250, g: 250, b: 250 },
            surface: Color::Rgb { r: 255, g: 255, b: 255 },
            text: Color::Rgb { r: 33, g: 33, b: 33 },
            muted: Color::Rgb { r: 117, g: 117, b: 117 },
            primary: Color::Rgb { r: 25, g: 118, b: 210 },
            on_primary: Color::Rgb { r: 255, g: 255, b: 255 },
            header: Color::Rgb { r: 227, g: 232, b: 240 },
            selected: Color::Rgb { r: 200, g: 222, b: 248 },
            pinned: Color::Rgb { r: 238, g: 241, b: 246 },
            error: Color::Rgb { r: 198, g: 40, b: 40 },
        }
    }

    pub fn dark() -> Self {
        Self {
            background: Color::Rgb { r: 18, g: 18, b: 18 },
            surface: Color::Rgb { r: 30, g: 30, b: 30 },
            text: Color::Rgb { r: 236, g: 236, b: 236 },
            muted: Color::Rgb { r: 150, g: 150, b: 150 },
            primary: Color::Rgb { r: 144, g: 202, b: 249 },
            on_primary: Color::Rgb { r: 18, g: 18, b: 18 },
            header: Color::Rgb { r: 44, g: 48, b: 56 },
            selected: Color::Rgb { r: 40, g: 64, b: 96 },
            pinned: Color::Rgb { r: 36, g: 38, b: 44 },
            error: Color::Rgb { r: 244, g: 143, b: 177 },
        }
    }
}
