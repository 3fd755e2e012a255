use serde::{Deserialize, Serialize};
use tui::style::Color;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeName {
    #[default]
    Light,
    Dark,
}

impl ThemeName {
    pub fn toggled(self) -> Self {
        match self {
            ThemeName::Light => ThemeName::Dark,
            ThemeName::Dark => ThemeName::Light,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ThemeName::Light => "light",
            ThemeName::Dark => "dark",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Theme {
    pub name: ThemeName,
    pub bg: Color,
    pub fg: Color,
    pub text_bg: Color,
    pub select_bg: Color,
    pub select_fg: Color,
    pub disabled_fg: Color,
    pub status_bg: Color,
    pub status_fg: Color,
    pub duplicate_bg: Color,
    pub duplicate_fg: Color,
    pub accent: Color,
}

impl Theme {
    pub fn named(name: ThemeName) -> Self {
        match name {
            ThemeName::Light => Theme {
                name,
                bg: Color::Rgb(0xf0, 0xf0, 0xf0),
                fg: Color::Black,
                text_bg: Color::White,
                select_bg: Color::Rgb(0x00, 0x78, 0xd7),
                select_fg: Color::White,
                disabled_fg: Color::Rgb(0xa0, 0xa0, 0xa0),
                status_bg: Color::Rgb(0xe0, 0xe0, 0xe0),
                status_fg: Color::Black,
                duplicate_bg: Color::Rgb(0xff, 0xe0, 0xe0),
                duplicate_fg: Color::Black,
                accent: Color::Rgb(0x00, 0x5f, 0x87),
            },
            ThemeName::Dark => Theme {
                name,
                bg: Color::Rgb(0x2e, 0x2e, 0x2e),
                fg: Color::White,
                text_bg: Color::Rgb(0x3c, 0x3c, 0x3c),
                select_bg: Color::Rgb(0x00, 0x5f, 0x87),
                select_fg: Color::White,
                disabled_fg: Color::Rgb(0x77, 0x77, 0x77),
                status_bg: Color::Rgb(0x40, 0x40, 0x40),
                status_fg: Color::White,
                duplicate_bg: Color::Rgb(0x70, 0x30, 0x30),
                duplicate_fg: Color::White,
                accent: Color::Cyan,
            },
        }
    }

    pub fn toggled(self) -> Self {
        Theme::named(self.name.toggled())
    }
}
