//! Theme loading: btop-style `theme[key]="value"` and hex → ratatui Color.

use crate::block::BlockColor;
use ratatui::style::Color;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

/// Block and UI colours, One Dark by default.
#[derive(Debug, Clone)]
pub struct Theme {
    /// Hue colours in `BlockColor::HUES` order: red, blue, yellow, purple, green.
    pub hues: [Color; 5],
    /// Expired timer blocks.
    pub stone: Color,
    /// Board background.
    pub bg: Color,
    /// Borders and empty gaps.
    pub div_line: Color,
    /// Text (score, level).
    pub main_fg: Color,
    /// Highlight / titles.
    pub title: Color,
    /// Dimmed cells that cannot extend the current chain.
    pub inactive_fg: Color,
}

#[derive(Debug, Error)]
pub enum ThemeError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid hex: {0}")]
    InvalidHex(String),
}

impl Default for Theme {
    fn default() -> Self {
        Self::onedark_default()
    }
}

/// Hex literal known to be valid; falls back to white rather than panicking.
fn hex(s: &str) -> Color {
    parse_hex(s).unwrap_or(Color::White)
}

impl Theme {
    pub fn onedark_default() -> Self {
        Self {
            hues: [
                hex("#E06C75"), // cpu_end / red
                hex("#61AFEF"), // cpu_box / blue
                hex("#E5C07B"), // title / yellow
                hex("#C678DD"), // net_box / purple
                hex("#98C379"), // mem_box / green
            ],
            stone: hex("#5C6370"),
            bg: hex("#31353F"),
            div_line: hex("#3F444F"),
            main_fg: hex("#ABB2BF"),
            title: hex("#E5C07B"),
            inactive_fg: hex("#5C6370"),
        }
    }

    /// Load theme from a btop-style file. Missing path or file gives the palette's defaults.
    pub fn load(path: Option<&Path>, palette: crate::Palette) -> Result<Self, ThemeError> {
        let path = match path {
            Some(p) if p.exists() => p,
            _ => return Ok(Self::default_for_palette(palette)),
        };
        let s = std::fs::read_to_string(path)?;
        let map = parse_theme_file(&s);
        let mut theme = Self::from_map(&map);
        theme.apply_palette(palette);
        Ok(theme)
    }

    fn default_for_palette(palette: crate::Palette) -> Self {
        let mut t = Self::onedark_default();
        t.apply_palette(palette);
        t
    }

    /// Override hue colours for high-contrast or colorblind play.
    pub fn apply_palette(&mut self, palette: crate::Palette) {
        match palette {
            crate::Palette::Normal => {}
            crate::Palette::HighContrast => {
                self.hues = [
                    hex("#FF0000"),
                    hex("#0088FF"),
                    hex("#FFFF00"),
                    hex("#FF00FF"),
                    hex("#00FF00"),
                ];
            }
            crate::Palette::Colorblind => {
                // Okabe-Ito style: no red/green pair.
                self.hues = [
                    hex("#CC3311"),
                    hex("#0077BB"),
                    hex("#EE7733"),
                    hex("#EE3377"),
                    hex("#009988"),
                ];
            }
        }
    }

    fn from_map(map: &HashMap<String, String>) -> Self {
        let defaults = Self::onedark_default();
        let get = |key: &str, fallback: Color| {
            map.get(key)
                .and_then(|v| parse_hex(v).ok())
                .unwrap_or(fallback)
        };
        let [red, blue, yellow, purple, green] = defaults.hues;
        Self {
            hues: [
                get("cpu_end", red),
                get("cpu_box", blue),
                get("title", yellow),
                get("net_box", purple),
                get("mem_box", green),
            ],
            stone: get("inactive_fg", defaults.stone),
            bg: get("meter_bg", defaults.bg),
            div_line: get("div_line", defaults.div_line),
            main_fg: get("main_fg", defaults.main_fg),
            title: get("title", defaults.title),
            inactive_fg: get("inactive_fg", defaults.inactive_fg),
        }
    }

    /// Fill colour for a block colour. Rainbow has no single colour; callers draw it per glyph.
    pub fn block_color(&self, color: BlockColor) -> Color {
        match color.hue_index() {
            Some(i) => self.hues[i],
            None if color == BlockColor::Stone => self.stone,
            None => self.main_fg,
        }
    }
}

/// Parse btop-style theme file into key -> value map.
fn parse_theme_file(s: &str) -> HashMap<String, String> {
    let mut map = HashMap::new();
    for line in s.lines().map(str::trim) {
        if line.starts_with('#') {
            continue;
        }
        let Some(rest) = line.strip_prefix("theme[") else {
            continue;
        };
        let Some((key, value)) = rest.split_once(']') else {
            continue;
        };
        let Some((_, value)) = value.split_once('=') else {
            continue;
        };
        let value = value.trim().trim_matches('"').trim_matches('\'');
        if !value.is_empty() {
            map.insert(key.trim().to_string(), value.to_string());
        }
    }
    map
}

/// Parse hex colour "#RRGGBB" or "#RGB" into ratatui Color.
pub fn parse_hex(s: &str) -> Result<Color, ThemeError> {
    let s = s.trim().trim_start_matches('#');
    let bad = || ThemeError::InvalidHex(s.to_string());
    let channel = |from: usize, len: usize| {
        s.get(from..from + len)
            .and_then(|h| u8::from_str_radix(h, 16).ok())
            .ok_or_else(bad)
    };
    match s.len() {
        6 => Ok(Color::Rgb(channel(0, 2)?, channel(2, 2)?, channel(4, 2)?)),
        3 => Ok(Color::Rgb(
            channel(0, 1)? * 17,
            channel(1, 1)? * 17,
            channel(2, 1)? * 17,
        )),
        _ => Err(bad()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_6() {
        let c = parse_hex("#98C379").unwrap();
        assert!(matches!(c, Color::Rgb(0x98, 0xC3, 0x79)));
    }

    #[test]
    fn test_parse_hex_3() {
        let c = parse_hex("#FFF").unwrap();
        assert!(matches!(c, Color::Rgb(255, 255, 255)));
    }

    #[test]
    fn test_parse_hex_rejects_garbage() {
        assert!(parse_hex("#12345").is_err());
        assert!(parse_hex("#GGGGGG").is_err());
    }

    #[test]
    fn test_parse_theme_line() {
        let map = parse_theme_file(r##"theme[meter_bg]="#31353F""##);
        assert_eq!(map.get("meter_bg"), Some(&"#31353F".to_string()));
    }

    #[test]
    fn test_theme_file_overrides_hue() {
        let map = parse_theme_file("# comment\ntheme[cpu_end]='#FF0000'\nnot a theme line\n");
        let theme = Theme::from_map(&map);
        assert!(matches!(theme.block_color(BlockColor::Red), Color::Rgb(255, 0, 0)));
        assert_eq!(theme.block_color(BlockColor::Blue), Theme::default().hues[1]);
    }

    #[test]
    fn test_stone_colour() {
        let theme = Theme::default();
        assert_eq!(theme.block_color(BlockColor::Stone), theme.stone);
    }
}
