use derive_more::{Deref, From, Into};
use palette::{FromColor, Hsl, Srgb, Srgba};
use serde::{Deserialize, Deserializer};
use serde_with::{DeserializeFromStr, SerializeDisplay};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// An sRGB color with alpha, parsed from CSS color strings.
///
/// Accepted forms: hex (`#rgb`, `#rgba`, `#rrggbb`, `#rrggbbaa`), the CSS
/// named colors, `transparent`, and `rgb()`/`rgba()`/`hsl()`/`hsla()` in
/// either the comma or the space separated syntax.
#[derive(Debug, Clone, Copy, PartialEq, Deref, From, Into, SerializeDisplay, DeserializeFromStr)]
pub struct Color(Srgba<f64>);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ColorParseError {
    #[error("empty color string")]
    Empty,
    #[error("invalid hex color '{0}'")]
    Hex(String),
    #[error("invalid functional color '{0}'")]
    Functional(String),
    #[error("unknown color '{0}'")]
    Unknown(String),
}

impl Color {
    pub fn rgba(r: f64, g: f64, b: f64, a: f64) -> Self {
        Self(Srgba::new(r, g, b, a))
    }

    pub fn from_rgba8(r: u8, g: u8, b: u8, a: f64) -> Self {
        Self::rgba(r as f64 / 255.0, g as f64 / 255.0, b as f64 / 255.0, a)
    }

    fn from_srgb8(rgb: Srgb<u8>, a: f64) -> Self {
        Self::from_rgba8(rgb.red, rgb.green, rgb.blue, a)
    }

    pub fn alpha(&self) -> f64 {
        self.0.alpha
    }

    pub fn with_alpha(self, alpha: f64) -> Self {
        let (r, g, b, _) = self.0.into_components();
        Self::rgba(r, g, b, alpha)
    }

    fn channel8(v: f64) -> u8 {
        (v.clamp(0.0, 1.0) * 255.0).round() as u8
    }

    fn parse_hex(hex: &str) -> Result<Self, ColorParseError> {
        let err = || ColorParseError::Hex(hex.to_string());
        if !hex.is_ascii() {
            return Err(err());
        }
        let (rgb, alpha) = match hex.len() {
            3 | 6 => (hex, None),
            4 => (&hex[..3], Some(hex[3..].repeat(2))),
            8 => (&hex[..6], Some(hex[6..].to_string())),
            _ => return Err(err()),
        };
        let rgb = Srgb::<u8>::from_str(rgb).map_err(|_| err())?;
        let alpha = match alpha {
            Some(digits) => u8::from_str_radix(&digits, 16).map_err(|_| err())? as f64 / 255.0,
            None => 1.0,
        };
        Ok(Self::from_srgb8(rgb, alpha))
    }

    fn parse_functional(s: &str) -> Result<Self, ColorParseError> {
        let err = || ColorParseError::Functional(s.to_string());
        let (name, rest) = s.split_once('(').ok_or_else(err)?;
        let body = rest.strip_suffix(')').ok_or_else(err)?;
        let args: Vec<Arg> = body
            .split(|c: char| c == ',' || c == '/' || c.is_whitespace())
            .filter(|token| !token.is_empty())
            .map(Arg::parse)
            .collect::<Option<_>>()
            .ok_or_else(err)?;

        let alpha = |rest: &[Arg]| match rest {
            [] => Some(1.0),
            [a] => Some(a.fraction(1.0)),
            _ => None,
        };
        match (name.trim(), args.as_slice()) {
            ("rgb" | "rgba", [r, g, b, rest @ ..]) => {
                let a = alpha(rest).ok_or_else(err)?;
                Ok(Self::rgba(r.fraction(255.0), g.fraction(255.0), b.fraction(255.0), a))
            }
            ("hsl" | "hsla", [h, s, l, rest @ ..]) => {
                let a = alpha(rest).ok_or_else(err)?;
                // saturation and lightness are percentages with or without '%'
                let hsl: Hsl<palette::encoding::Srgb, f64> =
                    Hsl::new(h.value, s.fraction(100.0), l.fraction(100.0));
                let (r, g, b) = Srgb::from_color(hsl).into_components();
                Ok(Self::rgba(r, g, b, a))
            }
            _ => Err(err()),
        }
    }
}

/// One numeric argument of a functional color.
struct Arg {
    value: f64,
    percent: bool,
}

impl Arg {
    fn parse(token: &str) -> Option<Self> {
        let (number, percent) = match token.strip_suffix('%') {
            Some(number) => (number, true),
            None => (token.strip_suffix("deg").unwrap_or(token), false),
        };
        let value = number.parse::<f64>().ok().filter(|v| v.is_finite())?;
        Some(Self { value, percent })
    }

    /// Maps the argument into 0..=1, treating bare numbers as `0..=scale`.
    fn fraction(&self, scale: f64) -> f64 {
        let v = if self.percent {
            self.value / 100.0
        } else {
            self.value / scale
        };
        v.clamp(0.0, 1.0)
    }
}

impl FromStr for Color {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ColorParseError::Empty);
        }
        if let Some(hex) = s.strip_prefix('#') {
            return Self::parse_hex(hex);
        }
        let lower = s.to_ascii_lowercase();
        if lower.contains('(') {
            return Self::parse_functional(&lower);
        }
        if lower == "transparent" {
            return Ok(Self::rgba(0.0, 0.0, 0.0, 0.0));
        }
        palette::named::from_str(&lower)
            .map(|rgb| Self::from_srgb8(rgb, 1.0))
            .ok_or_else(|| ColorParseError::Unknown(s.to_string()))
    }
}

/// Deserializes an optional color, dropping values that do not parse
/// instead of failing the surrounding document.
pub fn lenient_color<'de, D>(deserializer: D) -> Result<Option<Color>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.and_then(|s| match s.parse() {
        Ok(color) => Some(color),
        Err(e) => {
            log::warn!("Ignoring color: {}", e);
            None
        }
    }))
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (r, g, b, a) = self.0.into_components();
        let (r, g, b) = (Self::channel8(r), Self::channel8(g), Self::channel8(b));
        if (a - 1.0).abs() < f64::EPSILON {
            write!(f, "#{r:02x}{g:02x}{b:02x}")
        } else {
            write!(f, "rgba({r}, {g}, {b}, {})", (a * 1000.0).round() / 1000.0)
        }
    }
}

/// Colors of the fixed chrome. Item and ring colors come from the dataset and
/// `group_colors` first and fall back to these.
#[derive(Debug, Clone, PartialEq, Deserialize, serde::Serialize)]
#[serde(default)]
pub struct ThemeColors {
    pub background: Color,
    pub ring: Color,
    pub center: Color,
    pub tooltip: Color,
    pub item: Color,
    pub item_stroke: Color,
    pub dial: Color,
    pub dial_selected: Color,
    pub text: Color,
}

impl Default for ThemeColors {
    fn default() -> Self {
        Self {
            background: Color::from_rgba8(0, 0, 0, 0.05),
            ring: Color::from_rgba8(100, 100, 100, 0.2),
            center: Color::from_rgba8(0x1a, 0x1a, 0x1a, 1.0),
            tooltip: Color::from_rgba8(0, 0, 0, 0.9),
            item: Color::from_rgba8(0x60, 0xa5, 0xfa, 1.0),
            item_stroke: Color::from_rgba8(255, 255, 255, 0.3),
            dial: Color::from_rgba8(0x55, 0x55, 0x55, 1.0),
            dial_selected: Color::from_rgba8(0x60, 0xa5, 0xfa, 1.0),
            text: Color::rgba(1.0, 1.0, 1.0, 1.0),
        }
    }
}
