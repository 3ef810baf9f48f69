//! CSS color parsing, validation and HSL arithmetic.
//!
//! Preset values and custom overrides arrive as CSS strings. Before the
//! reifier writes them to the root element they are checked here, and the
//! derived roles (dark, light, muted) are computed by adjusting the primary
//! preset in HSL space.

use crate::error::{ThemeError, ThemeResult};
use crate::validation::Validator;
use std::fmt;
use std::str::FromStr;

/// An sRGB color with 8-bit channels and alpha.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

/// Hue in degrees `[0, 360)`, saturation and lightness in percent `[0, 100]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hsl {
    pub h: f32,
    pub s: f32,
    pub l: f32,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Parse any supported CSS color notation.
    ///
    /// Accepted forms: `#rgb`, `#rgba`, `#rrggbb`, `#rrggbbaa`, `rgb()`,
    /// `rgba()`, `hsl()`, `hsla()` and the bare triplet used by CSS variable
    /// palettes (`"160 84% 39%"`).
    pub fn parse(input: &str) -> ThemeResult<Self> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(ThemeError::invalid_color(input, "empty color value"));
        }

        let lowered = trimmed.to_ascii_lowercase();
        if let Some(hex) = lowered.strip_prefix('#') {
            return Self::parse_hex(hex, input);
        }

        if let Some(open) = lowered.find('(') {
            let name = lowered[..open].trim();
            let Some(args) = lowered[open + 1..].strip_suffix(')') else {
                return Err(ThemeError::invalid_color(input, "missing closing parenthesis"));
            };
            let parts = split_arguments(args);
            return match name {
                "rgb" | "rgba" => Self::parse_rgb_parts(&parts, input),
                "hsl" | "hsla" => Self::parse_hsl_parts(&parts, input),
                other => Err(ThemeError::invalid_color(
                    input,
                    format!("unsupported color function '{other}'"),
                )),
            };
        }

        let parts = split_arguments(&lowered);
        if parts.len() == 3 && parts[1].ends_with('%') && parts[2].ends_with('%') {
            return Self::parse_hsl_parts(&parts, input);
        }

        Err(ThemeError::invalid_color(input, "unrecognized color format"))
    }

    fn parse_hex(hex: &str, original: &str) -> ThemeResult<Self> {
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ThemeError::invalid_color(original, "invalid hex digit"));
        }

        let expand = |c: &str| -> ThemeResult<u8> {
            u8::from_str_radix(&c.repeat(2), 16)
                .map_err(|_| ThemeError::invalid_color(original, "invalid hex component"))
        };
        let pair = |c: &str| -> ThemeResult<u8> {
            u8::from_str_radix(c, 16)
                .map_err(|_| ThemeError::invalid_color(original, "invalid hex component"))
        };

        match hex.len() {
            3 | 4 => Ok(Self {
                r: expand(&hex[0..1])?,
                g: expand(&hex[1..2])?,
                b: expand(&hex[2..3])?,
                a: if hex.len() == 4 {
                    expand(&hex[3..4])?
                } else {
                    255
                },
            }),
            6 | 8 => Ok(Self {
                r: pair(&hex[0..2])?,
                g: pair(&hex[2..4])?,
                b: pair(&hex[4..6])?,
                a: if hex.len() == 8 { pair(&hex[6..8])? } else { 255 },
            }),
            _ => Err(ThemeError::invalid_color(
                original,
                "hex colors need 3, 4, 6 or 8 digits",
            )),
        }
    }

    fn parse_rgb_parts(parts: &[&str], original: &str) -> ThemeResult<Self> {
        if !(3..=4).contains(&parts.len()) {
            return Err(ThemeError::invalid_color(
                original,
                "rgb() takes three channels and an optional alpha",
            ));
        }

        let channel = |token: &str| -> ThemeResult<u8> {
            let value = if let Some(pct) = token.strip_suffix('%') {
                parse_number(pct, original)? * 2.55
            } else {
                parse_number(token, original)?
            };
            if !(0.0..=255.0).contains(&value) {
                return Err(ThemeError::invalid_color(original, "channel out of range"));
            }
            Ok(value.round() as u8)
        };

        Ok(Self {
            r: channel(parts[0])?,
            g: channel(parts[1])?,
            b: channel(parts[2])?,
            a: match parts.get(3) {
                Some(token) => parse_alpha(token, original)?,
                None => 255,
            },
        })
    }

    fn parse_hsl_parts(parts: &[&str], original: &str) -> ThemeResult<Self> {
        if !(3..=4).contains(&parts.len()) {
            return Err(ThemeError::invalid_color(
                original,
                "hsl() takes hue, saturation, lightness and an optional alpha",
            ));
        }

        let hue = parse_number(parts[0].trim_end_matches("deg"), original)?;
        let percent = |token: &str| -> ThemeResult<f32> {
            let value = parse_number(token.trim_end_matches('%'), original)?;
            if !(0.0..=100.0).contains(&value) {
                return Err(ThemeError::invalid_color(original, "percentage out of range"));
            }
            Ok(value)
        };

        let hsl = Hsl {
            h: hue.rem_euclid(360.0),
            s: percent(parts[1])?,
            l: percent(parts[2])?,
        };
        let alpha = match parts.get(3) {
            Some(token) => parse_alpha(token, original)?,
            None => 255,
        };

        Ok(Self::from_hsl(hsl, alpha))
    }

    pub fn from_hsl(hsl: Hsl, alpha: u8) -> Self {
        let s = (hsl.s / 100.0).clamp(0.0, 1.0);
        let l = (hsl.l / 100.0).clamp(0.0, 1.0);
        let h = hsl.h.rem_euclid(360.0);

        let chroma = (1.0 - (2.0 * l - 1.0).abs()) * s;
        let sector = h / 60.0;
        let x = chroma * (1.0 - (sector % 2.0 - 1.0).abs());
        let (r1, g1, b1) = match sector as u32 {
            0 => (chroma, x, 0.0),
            1 => (x, chroma, 0.0),
            2 => (0.0, chroma, x),
            3 => (0.0, x, chroma),
            4 => (x, 0.0, chroma),
            _ => (chroma, 0.0, x),
        };
        let m = l - chroma / 2.0;
        let to_channel = |v: f32| ((v + m) * 255.0).round().clamp(0.0, 255.0) as u8;

        Self {
            r: to_channel(r1),
            g: to_channel(g1),
            b: to_channel(b1),
            a: alpha,
        }
    }

    pub fn to_hsl(&self) -> Hsl {
        let r = f32::from(self.r) / 255.0;
        let g = f32::from(self.g) / 255.0;
        let b = f32::from(self.b) / 255.0;

        let max = r.max(g).max(b);
        let min = r.min(g).min(b);
        let delta = max - min;
        let l = (max + min) / 2.0;

        if delta == 0.0 {
            return Hsl {
                h: 0.0,
                s: 0.0,
                l: l * 100.0,
            };
        }

        let s = delta / (1.0 - (2.0 * l - 1.0).abs());
        let h = if max == r {
            60.0 * ((g - b) / delta).rem_euclid(6.0)
        } else if max == g {
            60.0 * ((b - r) / delta + 2.0)
        } else {
            60.0 * ((r - g) / delta + 4.0)
        };

        Hsl {
            h,
            s: (s * 100.0).clamp(0.0, 100.0),
            l: l * 100.0,
        }
    }

    pub fn with_lightness(&self, lightness: f32) -> Self {
        let hsl = self.to_hsl();
        Self::from_hsl(
            Hsl {
                l: lightness.clamp(0.0, 100.0),
                ..hsl
            },
            self.a,
        )
    }

    pub fn with_saturation(&self, saturation: f32) -> Self {
        let hsl = self.to_hsl();
        Self::from_hsl(
            Hsl {
                s: saturation.clamp(0.0, 100.0),
                ..hsl
            },
            self.a,
        )
    }

    /// Lower-case `#rrggbb`, or `#rrggbbaa` when the color is translucent.
    pub fn to_hex(&self) -> String {
        if self.a == 255 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }
}

fn split_arguments(args: &str) -> Vec<&str> {
    args.split([',', '/', ' ', '\t'])
        .filter(|part| !part.is_empty())
        .collect()
}

fn parse_number(token: &str, original: &str) -> ThemeResult<f32> {
    token
        .trim()
        .parse::<f32>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or_else(|| ThemeError::invalid_color(original, format!("'{token}' is not a number")))
}

fn parse_alpha(token: &str, original: &str) -> ThemeResult<u8> {
    let value = match token.strip_suffix('%') {
        Some(pct) => parse_number(pct, original)? / 100.0,
        None => parse_number(token, original)?,
    };
    if !(0.0..=1.0).contains(&value) {
        return Err(ThemeError::invalid_color(original, "alpha out of range"));
    }
    Ok((value * 255.0).round() as u8)
}

impl FromStr for Color {
    type Err = ThemeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Validator for CSS color strings written to custom properties
pub struct ColorValidator;

impl Validator<str> for ColorValidator {
    type Error = ThemeError;

    fn validate(&self, input: &str) -> Result<(), Self::Error> {
        Color::parse(input).map(|_| ())
    }
}
