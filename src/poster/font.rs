use crate::poster::canvas::{clip_to, BlendMode, RgbaCanvas};
use crate::poster::model::{Color, PixelRect};
use ab_glyph::{point, Font, FontArc, GlyphId, ScaleFont};
use epaint::text::{FontDefinitions, FontFamily};
use once_cell::sync::Lazy;
use std::borrow::Cow;

/// Largest pixel size the overlay accepts.
pub const MAX_FONT_SIZE: f32 = 512.0;

/// Faux-bold widening, as a fraction of the pixel size.
const BOLD_SPREAD: f32 = 1.0 / 18.0;
const RUN_SLACK: i32 = 2;

struct Face {
    font: FontArc,
    scale: f32,
    y_offset: f32,
}

static FACE: Lazy<Option<Face>> = Lazy::new(|| {
    let face = load_default_face();
    if face.is_none() {
        tracing::warn!("default proportional font unavailable, overlay text is skipped");
    }
    face
});

fn load_default_face() -> Option<Face> {
    let definitions = FontDefinitions::default();
    let family = definitions.families.get(&FontFamily::Proportional)?;
    let name = family.first()?;
    let data = definitions.font_data.get(name)?.clone();
    let font = match data.font {
        Cow::Borrowed(bytes) => ab_glyph::FontRef::try_from_slice_and_index(bytes, data.index)
            .map(FontArc::from)
            .ok(),
        Cow::Owned(bytes) => ab_glyph::FontVec::try_from_vec_and_index(bytes, data.index)
            .map(FontArc::from)
            .ok(),
    }?;
    Some(Face {
        font,
        scale: data.tweak.scale,
        y_offset: data.tweak.y_offset,
    })
}

/// egui's default proportional face at a pixel size, optionally widened to a
/// faux bold. The face is loaded once and shared.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayFont {
    size: f32,
    bold: bool,
}

impl OverlayFont {
    pub fn new(size: f32, bold: bool) -> Self {
        let size = if size.is_finite() {
            size.clamp(1.0, MAX_FONT_SIZE)
        } else {
            MAX_FONT_SIZE
        };
        Self { size, bold }
    }

    pub fn size(&self) -> f32 {
        self.size
    }

    pub fn is_available() -> bool {
        FACE.is_some()
    }

    fn spread(&self) -> u32 {
        if self.bold {
            (self.size * BOLD_SPREAD).round().max(1.0) as u32
        } else {
            0
        }
    }

    /// Sum of the advances (with kerning) plus the bold spread, rounded up.
    pub fn measure(&self, text: &str) -> u32 {
        let Some(face) = FACE.as_ref() else {
            return 0;
        };
        let scaled = face.font.as_scaled(self.size * face.scale);
        let mut width = 0.0f32;
        let mut previous: Option<GlyphId> = None;
        for ch in text.chars() {
            let id = scaled.glyph_id(ch);
            if let Some(previous) = previous {
                width += scaled.kern(previous, id);
            }
            width += scaled.h_advance(id);
            previous = Some(id);
        }
        if previous.is_none() {
            return 0;
        }
        (width.ceil() + self.spread() as f32).max(0.0) as u32
    }

    /// Draws `text` starting at `left`, centred vertically on `middle`
    /// (the middle of the ascent/descent box). Glyph coverage is
    /// anti-aliased and blended over the canvas.
    pub fn draw_text(
        &self,
        canvas: &mut RgbaCanvas,
        left: f32,
        middle: f32,
        text: &str,
        color: Color,
        clip: Option<PixelRect>,
    ) {
        let Some(face) = FACE.as_ref() else {
            return;
        };
        if text.is_empty() {
            return;
        }
        let scaled = face.font.as_scaled(self.size * face.scale);
        let baseline = middle + (scaled.ascent() + scaled.descent()) / 2.0 + face.y_offset * self.size;
        let spread = self.spread() as i32;

        let run = PixelRect::new(
            left.floor() as i32 - RUN_SLACK,
            (baseline - scaled.ascent()).floor() as i32 - RUN_SLACK,
            self.measure(text) as i32 + spread + RUN_SLACK * 2,
            (scaled.ascent() - scaled.descent()).ceil() as i32 + RUN_SLACK * 2,
        );
        let Some(visible) = clip_to(run, clip, canvas.width, canvas.height) else {
            return;
        };

        let mut coverage = CoverageMask::new(run);
        let mut caret = point(left, baseline);
        let mut previous: Option<GlyphId> = None;
        for ch in text.chars() {
            let mut glyph = scaled.scaled_glyph(ch);
            if let Some(previous) = previous {
                caret.x += scaled.kern(previous, glyph.id);
            }
            previous = Some(glyph.id);
            glyph.position = caret;
            caret.x += scaled.h_advance(glyph.id);
            let Some(outlined) = scaled.outline_glyph(glyph) else {
                continue;
            };
            let bounds = outlined.px_bounds();
            outlined.draw(|x, y, value| {
                let px = bounds.min.x as i32 + x as i32;
                let py = bounds.min.y as i32 + y as i32;
                for offset in 0..=spread {
                    coverage.add(px + offset, py, value);
                }
            });
        }

        for y in visible.y..(visible.y + visible.height) {
            for x in visible.x..(visible.x + visible.width) {
                let value = coverage.get(x, y);
                if value > 0.0 {
                    canvas.blend_pixel(x, y, color, value, BlendMode::Normal);
                }
            }
        }
    }
}

/// Max-combined glyph coverage over a text run, so overlapping bold passes
/// and neighbouring glyphs blend once.
struct CoverageMask {
    rect: PixelRect,
    values: Vec<f32>,
}

impl CoverageMask {
    fn new(rect: PixelRect) -> Self {
        let len = rect.width.max(0) as usize * rect.height.max(0) as usize;
        Self {
            rect,
            values: vec![0.0; len],
        }
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        let lx = x - self.rect.x;
        let ly = y - self.rect.y;
        if lx < 0 || ly < 0 || lx >= self.rect.width || ly >= self.rect.height {
            return None;
        }
        Some(ly as usize * self.rect.width as usize + lx as usize)
    }

    fn add(&mut self, x: i32, y: i32, value: f32) {
        if let Some(idx) = self.index(x, y) {
            let slot = &mut self.values[idx];
            *slot = slot.max(value.clamp(0.0, 1.0));
        }
    }

    fn get(&self, x: i32, y: i32) -> f32 {
        self.index(x, y).map_or(0.0, |idx| self.values[idx])
    }
}
