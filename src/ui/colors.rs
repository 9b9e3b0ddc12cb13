//! Key and block colors

use ratatui::style::Color;

pub const NATURAL_KEY: Color = Color::Rgb(236, 236, 236);
pub const ACCIDENTAL_KEY: Color = Color::Rgb(28, 28, 28);
pub const KEY_SEPARATOR: Color = Color::Rgb(120, 120, 120);
pub const ROLL_BACKGROUND: Color = Color::Rgb(18, 18, 24);
/// Lane guide under each C
pub const OCTAVE_LINE: Color = Color::Rgb(40, 40, 52);

/// Parse a press color ("#rrggbb" or a color name), falling back to cyan
pub fn parse(color: &str) -> Color {
    color.parse().unwrap_or(Color::Cyan)
}
