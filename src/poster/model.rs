use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Self = Self::rgb(0x00, 0x00, 0x00);
    pub const WHITE: Self = Self::rgb(0xFF, 0xFF, 0xFF);

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::rgba(r, g, b, 255)
    }

    /// Packs `0xRRGGBB` into an opaque colour.
    pub const fn hex(value: u32) -> Self {
        Self::rgb((value >> 16) as u8, (value >> 8) as u8, value as u8)
    }

    /// Parses `#RRGGBB` or `#RRGGBBAA` (the leading `#` is optional).
    pub fn parse_hex(input: &str) -> Result<Self> {
        let digits = input.trim().trim_start_matches('#');
        if !matches!(digits.len(), 6 | 8) || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(anyhow!("invalid hex colour {input:?}"));
        }
        let channel = |idx: usize| u8::from_str_radix(&digits[idx..idx + 2], 16);
        let alpha = if digits.len() == 8 { channel(6)? } else { 255 };
        Ok(Self::rgba(channel(0)?, channel(2)?, channel(4)?, alpha))
    }

    pub fn to_hex(self) -> String {
        if self.a == 255 {
            format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
        } else {
            format!("#{:02X}{:02X}{:02X}{:02X}", self.r, self.g, self.b, self.a)
        }
    }

    pub fn to_rgba_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

impl TryFrom<String> for Color {
    type Error = anyhow::Error;

    fn try_from(value: String) -> Result<Self> {
        Self::parse_hex(&value)
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_hex()
    }
}

/// Axis-aligned pixel rectangle; `x + width` and `y + height` are exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct PixelRect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl PixelRect {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn contains(self, point: (f32, f32)) -> bool {
        point.0 >= self.x as f32
            && point.1 >= self.y as f32
            && point.0 < (self.x + self.width) as f32
            && point.1 < (self.y + self.height) as f32
    }

    pub fn intersect(self, other: PixelRect) -> Option<PixelRect> {
        let x0 = self.x.max(other.x);
        let y0 = self.y.max(other.y);
        let x1 = (self.x + self.width).min(other.x + other.width);
        let y1 = (self.y + self.height).min(other.y + other.height);
        if x1 <= x0 || y1 <= y0 {
            return None;
        }
        Some(PixelRect::new(x0, y0, x1 - x0, y1 - y0))
    }

    pub fn union(self, other: PixelRect) -> PixelRect {
        let x0 = self.x.min(other.x);
        let y0 = self.y.min(other.y);
        let x1 = (self.x + self.width).max(other.x + other.width);
        let y1 = (self.y + self.height).max(other.y + other.height);
        PixelRect::new(x0, y0, x1 - x0, y1 - y0)
    }

    pub fn clamp(self, width: u32, height: u32) -> Option<PixelRect> {
        self.intersect(PixelRect::new(0, 0, width as i32, height as i32))
    }
}

/// Grid coordinate of a placed shape. Displays as `"<row>-<col>"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ShapeId {
    pub row: u32,
    pub col: u32,
}

impl ShapeId {
    pub const fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }
}

impl fmt::Display for ShapeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.row, self.col)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeKind {
    Square,
    TriangleTopLeft,
    TriangleTopRight,
    TriangleBottomLeft,
    TriangleBottomRight,
    SemicircleTop,
    SemicircleBottom,
    SemicircleLeft,
    SemicircleRight,
    QuarterTopLeft,
    QuarterTopRight,
    QuarterBottomLeft,
    QuarterBottomRight,
    Circle,
    HalfBar,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShapeCatalogue {
    #[default]
    Full,
    Basic,
}

impl ShapeCatalogue {
    const FULL: [ShapeKind; 13] = [
        ShapeKind::Square,
        ShapeKind::TriangleTopLeft,
        ShapeKind::TriangleTopRight,
        ShapeKind::TriangleBottomLeft,
        ShapeKind::TriangleBottomRight,
        ShapeKind::SemicircleTop,
        ShapeKind::SemicircleBottom,
        ShapeKind::SemicircleLeft,
        ShapeKind::SemicircleRight,
        ShapeKind::QuarterTopLeft,
        ShapeKind::QuarterTopRight,
        ShapeKind::QuarterBottomLeft,
        ShapeKind::QuarterBottomRight,
    ];

    const BASIC: [ShapeKind; 7] = [
        ShapeKind::Square,
        ShapeKind::TriangleTopLeft,
        ShapeKind::TriangleBottomRight,
        ShapeKind::SemicircleTop,
        ShapeKind::QuarterBottomLeft,
        ShapeKind::Circle,
        ShapeKind::HalfBar,
    ];

    pub fn kinds(self) -> &'static [ShapeKind] {
        match self {
            ShapeCatalogue::Full => &Self::FULL,
            ShapeCatalogue::Basic => &Self::BASIC,
        }
    }

    pub fn len(self) -> usize {
        self.kinds().len()
    }

    /// Maps a `[0, 1)` draw to a kind, uniformly over the catalogue.
    pub fn pick(self, draw: f64) -> ShapeKind {
        let kinds = self.kinds();
        let idx = ((draw * kinds.len() as f64).floor() as usize).min(kinds.len() - 1);
        kinds[idx]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Shape {
    pub id: ShapeId,
    pub x: i32,
    pub y: i32,
    pub size: u32,
    pub color: Color,
    pub kind: ShapeKind,
    pub bounds: PixelRect,
}
