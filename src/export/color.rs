//! Color-token parsing for the export boundary.
//!
//! Inside the engine a color is an opaque string compared only for
//! equality; only rasterization to an image buffer needs actual channel
//! values. Supported syntaxes are what the editor itself produces: hex
//! (`#rgb`, `#rgba`, `#rrggbb`, `#rrggbbaa`) from the palette and
//! functional `rgb(r, g, b)` / `rgba(r, g, b, a)` from image import.

use image::Rgba;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ColorError {
    #[error("empty color string")]
    Empty,
    #[error("invalid hex length {0}, expected 3, 4, 6, or 8 digits")]
    InvalidHexLength(usize),
    #[error("invalid hex character '{0}'")]
    InvalidHexDigit(char),
    #[error("malformed functional color '{0}'")]
    MalformedFunctional(String),
    #[error("unsupported color syntax '{0}'")]
    UnsupportedSyntax(String),
}

pub fn parse_color_token(token: &str) -> Result<Rgba<u8>, ColorError> {
    let token = token.trim();
    if token.is_empty() {
        return Err(ColorError::Empty);
    }
    if let Some(hex) = token.strip_prefix('#') {
        return parse_hex(hex);
    }
    let lower = token.to_ascii_lowercase();
    if lower.starts_with("rgb(") || lower.starts_with("rgba(") {
        return parse_functional(token);
    }
    Err(ColorError::UnsupportedSyntax(token.to_string()))
}

fn hex_digit(c: char) -> Result<u8, ColorError> {
    c.to_digit(16)
        .map(|d| d as u8)
        .ok_or(ColorError::InvalidHexDigit(c))
}

fn parse_hex(hex: &str) -> Result<Rgba<u8>, ColorError> {
    let digits: Vec<u8> = hex.chars().map(hex_digit).collect::<Result<_, _>>()?;
    match digits.len() {
        // Shorthand digits duplicate: #f80 == #ff8800.
        3 | 4 => {
            let expand = |d: u8| d * 17;
            let alpha = if digits.len() == 4 { expand(digits[3]) } else { 255 };
            Ok(Rgba([
                expand(digits[0]),
                expand(digits[1]),
                expand(digits[2]),
                alpha,
            ]))
        }
        6 | 8 => {
            let pair = |i: usize| digits[i] * 16 + digits[i + 1];
            let alpha = if digits.len() == 8 { pair(6) } else { 255 };
            Ok(Rgba([pair(0), pair(2), pair(4), alpha]))
        }
        n => Err(ColorError::InvalidHexLength(n)),
    }
}

fn parse_functional(token: &str) -> Result<Rgba<u8>, ColorError> {
    let malformed = || ColorError::MalformedFunctional(token.to_string());

    let open = token.find('(').ok_or_else(malformed)?;
    let inner = token.strip_suffix(')').ok_or_else(malformed)?;
    let inner = &inner[open + 1..];
    let is_rgba = token[..open].trim().eq_ignore_ascii_case("rgba");

    let parts: Vec<&str> = inner.split(',').map(str::trim).collect();
    let expected = if is_rgba { 4 } else { 3 };
    if parts.len() != expected {
        return Err(malformed());
    }

    let channel = |s: &str| s.parse::<u8>().map_err(|_| malformed());
    let alpha = if is_rgba {
        let alpha: f32 = parts[3].parse().map_err(|_| malformed())?;
        if !(0.0..=1.0).contains(&alpha) {
            return Err(malformed());
        }
        (alpha * 255.0).round() as u8
    } else {
        255
    };

    Ok(Rgba([
        channel(parts[0])?,
        channel(parts[1])?,
        channel(parts[2])?,
        alpha,
    ]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_long_hex() {
        assert_eq!(
            parse_color_token("#ff8800"),
            Ok(Rgba([255, 136, 0, 255]))
        );
        assert_eq!(
            parse_color_token("#11223344"),
            Ok(Rgba([17, 34, 51, 68]))
        );
    }

    #[test]
    fn parses_shorthand_hex() {
        assert_eq!(parse_color_token("#f80"), Ok(Rgba([255, 136, 0, 255])));
        assert_eq!(parse_color_token("#f808"), Ok(Rgba([255, 136, 0, 136])));
    }

    #[test]
    fn parses_functional_rgb() {
        assert_eq!(
            parse_color_token("rgb(12, 200, 7)"),
            Ok(Rgba([12, 200, 7, 255]))
        );
        assert_eq!(
            parse_color_token("rgba(12, 200, 7, 0.5)"),
            Ok(Rgba([12, 200, 7, 128]))
        );
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(parse_color_token(""), Err(ColorError::Empty));
        assert_eq!(
            parse_color_token("#ff80f"),
            Err(ColorError::InvalidHexLength(5))
        );
        assert_eq!(
            parse_color_token("#ffxx00"),
            Err(ColorError::InvalidHexDigit('x'))
        );
        assert!(matches!(
            parse_color_token("rgb(300, 0, 0)"),
            Err(ColorError::MalformedFunctional(_))
        ));
        assert!(matches!(
            parse_color_token("rgb(1, 2)"),
            Err(ColorError::MalformedFunctional(_))
        ));
        assert!(matches!(
            parse_color_token("hsl(120, 50%, 50%)"),
            Err(ColorError::UnsupportedSyntax(_))
        ));
    }
}
