use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// An opaque 3-channel color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// The color as an RGBA pixel at full opacity.
    pub const fn rgba(&self) -> [u8; 4] {
        [self.r, self.g, self.b, 0xFF]
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ColorParseError {
    #[error("Expected 3 or 6 hex digits after '#', got {len}")]
    HexLength { len: usize },

    #[error("'{digit}' is not a hex digit")]
    HexDigit { digit: char },

    #[error("Expected \"rgb(r, g, b)\" with three components, got \"{got}\"")]
    RgbShape { got: String },

    #[error("RGB component \"{got}\" is not an integer in 0..=255")]
    RgbComponent { got: String },

    #[error("Unrecognized color \"{got}\"")]
    Unrecognized { got: String },
}

/// Parses `#rgb`, `#rrggbb` and `rgb(r, g, b)`.
impl FromStr for Color {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();

        if let Some(hex) = s.strip_prefix('#') {
            return parse_hex(hex);
        }

        if let Some(body) = s
            .strip_prefix("rgb(")
            .and_then(|rest| rest.strip_suffix(')'))
        {
            return parse_rgb(body);
        }

        Err(ColorParseError::Unrecognized { got: s.to_string() })
    }
}

fn parse_hex(hex: &str) -> Result<Color, ColorParseError> {
    let mut digits = Vec::with_capacity(6);

    for c in hex.chars() {
        let Some(d) = c.to_digit(16) else {
            return Err(ColorParseError::HexDigit { digit: c });
        };

        digits.push(d as u8);
    }

    match digits[..] {
        // #rgb is shorthand for #rrggbb
        [r, g, b] => Ok(Color::rgb(r * 0x11, g * 0x11, b * 0x11)),
        [r1, r0, g1, g0, b1, b0] => Ok(Color::rgb(r1 << 4 | r0, g1 << 4 | g0, b1 << 4 | b0)),
        _ => Err(ColorParseError::HexLength { len: digits.len() }),
    }
}

fn parse_rgb(body: &str) -> Result<Color, ColorParseError> {
    let parts: Vec<&str> = body.split(',').map(str::trim).collect();

    let [r, g, b] = parts[..] else {
        return Err(ColorParseError::RgbShape {
            got: body.to_string(),
        });
    };

    let channel = |part: &str| {
        part.parse::<u8>()
            .map_err(|_| ColorParseError::RgbComponent {
                got: part.to_string(),
            })
    };

    Ok(Color::rgb(channel(r)?, channel(g)?, channel(b)?))
}

pub trait ColorInterpolationExt<T> {
    fn lerp(&self, other: &T, p: f64) -> T;
}

impl ColorInterpolationExt<Color> for Color {
    /// `p = 1` yields `self`, `p = 0` yields `other`.
    fn lerp(&self, other: &Color, p: f64) -> Color {
        let p = p.clamp(0f64, 1f64);

        // interpolate a channel
        let f = |a: u8, b: u8| ((a as f64) * p + (b as f64) * (1f64 - p)).round() as u8;

        Color {
            r: f(self.r, other.r),
            g: f(self.g, other.g),
            b: f(self.b, other.b),
        }
    }
}

/// Colors of dead cells, live cells and the overlay mesh.
///
/// The RGBA forms used by the compositor are derived once per color change rather than per
/// pixel.
#[derive(Debug, Clone)]
pub struct Palette {
    dead: Color,
    alive: Color,
    mesh: Color,

    dead_rgba: [u8; 4],
    alive_rgba: [u8; 4],
}

impl Palette {
    pub fn new(dead: Color, alive: Color, mesh: Color) -> Self {
        Self {
            dead,
            alive,
            mesh,
            dead_rgba: dead.rgba(),
            alive_rgba: alive.rgba(),
        }
    }

    pub fn dead(&self) -> Color {
        self.dead
    }

    pub fn alive(&self) -> Color {
        self.alive
    }

    pub fn mesh(&self) -> Color {
        self.mesh
    }

    /// Returns `true` if the color actually changed.
    pub fn set_dead(&mut self, color: Color) -> bool {
        if color == self.dead {
            return false;
        }

        self.dead = color;
        self.dead_rgba = color.rgba();
        true
    }

    /// Returns `true` if the color actually changed.
    pub fn set_alive(&mut self, color: Color) -> bool {
        if color == self.alive {
            return false;
        }

        self.alive = color;
        self.alive_rgba = color.rgba();
        true
    }

    pub fn set_mesh(&mut self, color: Color) -> bool {
        if color == self.mesh {
            return false;
        }

        self.mesh = color;
        true
    }

    #[inline]
    pub fn cell_rgba(&self, alive: bool) -> [u8; 4] {
        if alive {
            self.alive_rgba
        } else {
            self.dead_rgba
        }
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::new(Color::BLACK, Color::WHITE, Color::rgb(0x80, 0x80, 0x80))
    }
}
