use crate::poster::model::{Color, PixelRect};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlendMode {
    #[default]
    Normal,
    Multiply,
}

impl BlendMode {
    pub fn toggled(self) -> Self {
        match self {
            BlendMode::Normal => BlendMode::Multiply,
            BlendMode::Multiply => BlendMode::Normal,
        }
    }
}

/// Straight-alpha RGBA8 raster, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RgbaCanvas {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl RgbaCanvas {
    pub fn new(width: u32, height: u32, fill: Color) -> Self {
        let mut pixels = vec![0u8; (width as usize) * (height as usize) * 4];
        for chunk in pixels.chunks_exact_mut(4) {
            chunk.copy_from_slice(&fill.to_rgba_array());
        }
        Self {
            width,
            height,
            pixels,
        }
    }

    pub fn bounds(&self) -> PixelRect {
        PixelRect::new(0, 0, self.width as i32, self.height as i32)
    }

    fn index(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * 4
    }

    pub fn pixel(&self, x: u32, y: u32) -> Color {
        let idx = self.index(x, y);
        Color::rgba(
            self.pixels[idx],
            self.pixels[idx + 1],
            self.pixels[idx + 2],
            self.pixels[idx + 3],
        )
    }

    /// Paints `color` at `(x, y)` with extra coverage `alpha`. Out-of-bounds
    /// writes are dropped.
    pub fn blend_pixel(&mut self, x: i32, y: i32, color: Color, alpha: f32, mode: BlendMode) {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return;
        }
        let idx = self.index(x as u32, y as u32);
        let bottom = Color::rgba(
            self.pixels[idx],
            self.pixels[idx + 1],
            self.pixels[idx + 2],
            self.pixels[idx + 3],
        );
        let top = match mode {
            BlendMode::Normal => color,
            BlendMode::Multiply => multiply(bottom, color),
        };
        let out = blend_over(bottom, top, alpha);
        self.pixels[idx..idx + 4].copy_from_slice(&out.to_rgba_array());
    }

    pub fn fill_rect(&mut self, rect: PixelRect, color: Color, clip: Option<PixelRect>) {
        let Some(area) = clip_to(rect, clip, self.width, self.height) else {
            return;
        };
        for y in area.y..(area.y + area.height) {
            let row = y as usize * self.width as usize * 4;
            for x in area.x..(area.x + area.width) {
                let idx = row + x as usize * 4;
                self.pixels[idx..idx + 4].copy_from_slice(&color.to_rgba_array());
            }
        }
    }
}

/// Intersection of `rect` with the optional clip and the canvas.
pub(crate) fn clip_to(
    rect: PixelRect,
    clip: Option<PixelRect>,
    width: u32,
    height: u32,
) -> Option<PixelRect> {
    let rect = match clip {
        Some(clip) => rect.intersect(clip)?,
        None => rect,
    };
    rect.clamp(width, height)
}

fn multiply(bottom: Color, top: Color) -> Color {
    let mul = |a: u8, b: u8| ((a as u16 * b as u16 + 127) / 255) as u8;
    Color::rgba(
        mul(bottom.r, top.r),
        mul(bottom.g, top.g),
        mul(bottom.b, top.b),
        top.a,
    )
}

fn blend_over(bottom: Color, top: Color, alpha: f32) -> Color {
    let sa = (top.a as f32 / 255.0) * alpha.clamp(0.0, 1.0);
    let da = bottom.a as f32 / 255.0;
    let out_a = sa + da * (1.0 - sa);

    if out_a <= f32::EPSILON {
        return Color::rgba(0, 0, 0, 0);
    }

    let blend = |s: u8, d: u8| -> u8 {
        (((s as f32 * sa) + (d as f32 * da * (1.0 - sa))) / out_a)
            .round()
            .clamp(0.0, 255.0) as u8
    };

    Color::rgba(
        blend(top.r, bottom.r),
        blend(top.g, bottom.g),
        blend(top.b, bottom.b),
        (out_a * 255.0).round().clamp(0.0, 255.0) as u8,
    )
}
