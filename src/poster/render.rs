use crate::poster::canvas::{BlendMode, RgbaCanvas};
use crate::poster::composer::{Composition, PLATE_COLOR, TEXT_COLOR};
use crate::poster::model::{PixelRect, ShapeId};
use crate::poster::motif::paint_motif;
use crate::poster::shapes::paint_shape;
use std::time::Instant;

/// Paints `composition` into `canvas`. With a clip, only pixels inside it are
/// touched and everything in the stack (background, neighbouring shapes,
/// motifs, frame, text plate) is repainted there, so partial updates match
/// a full paint.
pub fn paint<F>(
    canvas: &mut RgbaCanvas,
    composition: &Composition,
    alpha_of: F,
    blend: BlendMode,
    clip: Option<PixelRect>,
) where
    F: Fn(ShapeId) -> f32,
{
    canvas.fill_rect(canvas.bounds(), composition.background, clip);

    for shape in &composition.shapes {
        if let Some(clip) = clip {
            if shape.bounds.intersect(clip).is_none() {
                continue;
            }
        }
        let alpha = alpha_of(shape.id);
        if alpha <= 0.0 {
            continue;
        }
        paint_shape(
            canvas,
            shape.kind,
            shape.x,
            shape.y,
            shape.size,
            shape.color,
            alpha,
            blend,
            clip,
        );
    }

    for motif in &composition.motifs {
        if let Some(clip) = clip {
            if motif.bounds.intersect(clip).is_none() {
                continue;
            }
        }
        paint_motif(canvas, motif, alpha_of(motif.id), blend, clip);
    }

    if let Some(frame) = &composition.frame {
        frame.paint(canvas, clip);
    }

    if let Some(overlay) = &composition.text {
        if clip.map_or(true, |clip| overlay.plate.intersect(clip).is_some()) {
            canvas.fill_rect(overlay.plate, PLATE_COLOR, clip);
            let (left, middle) = overlay.text_anchor();
            overlay
                .font
                .draw_text(canvas, left, middle, &overlay.text, TEXT_COLOR, clip);
        }
    }
}

/// Full paint into a fresh canvas sized to the composition.
pub fn render_composition<F>(composition: &Composition, alpha_of: F, blend: BlendMode) -> RgbaCanvas
where
    F: Fn(ShapeId) -> f32,
{
    let started = Instant::now();
    let mut canvas = RgbaCanvas::new(
        composition.width,
        composition.height,
        composition.background,
    );
    paint(&mut canvas, composition, alpha_of, blend, None);
    tracing::trace!(
        elapsed_us = started.elapsed().as_micros() as u64,
        shapes = composition.shapes.len(),
        "rendered composition"
    );
    canvas
}

/// Repaints only the cells of `ids`. Returns the union of the touched rects.
pub fn repaint_shapes<F>(
    canvas: &mut RgbaCanvas,
    composition: &Composition,
    ids: &[ShapeId],
    alpha_of: F,
    blend: BlendMode,
) -> Option<PixelRect>
where
    F: Fn(ShapeId) -> f32,
{
    let mut dirty: Option<PixelRect> = None;
    for id in ids {
        let Some(bounds) = composition.bounds_of(*id) else {
            continue;
        };
        paint(canvas, composition, &alpha_of, blend, Some(bounds));
        dirty = Some(match dirty {
            Some(rect) => rect.union(bounds),
            None => bounds,
        });
    }
    dirty
}
