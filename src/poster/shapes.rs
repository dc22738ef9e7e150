use crate::poster::canvas::{clip_to, BlendMode, RgbaCanvas};
use crate::poster::model::{Color, PixelRect, ShapeKind};

impl ShapeKind {
    /// Whether the point `(px, py)`, relative to the cell origin, lies inside
    /// the primitive drawn in a `size × size` cell.
    pub fn covers(self, px: f32, py: f32, size: f32) -> bool {
        if px < 0.0 || py < 0.0 || px > size || py > size {
            return false;
        }
        let half = size * 0.5;
        match self {
            ShapeKind::Square => true,
            ShapeKind::TriangleTopLeft => px + py <= size,
            ShapeKind::TriangleTopRight => px >= py,
            ShapeKind::TriangleBottomLeft => py >= px,
            ShapeKind::TriangleBottomRight => px + py >= size,
            ShapeKind::SemicircleTop => py >= half && within(px, py, half, size, half),
            ShapeKind::SemicircleBottom => py <= half && within(px, py, half, 0.0, half),
            ShapeKind::SemicircleLeft => px >= half && within(px, py, size, half, half),
            ShapeKind::SemicircleRight => px <= half && within(px, py, 0.0, half, half),
            ShapeKind::QuarterTopLeft => within(px, py, size, size, size),
            ShapeKind::QuarterTopRight => within(px, py, 0.0, size, size),
            ShapeKind::QuarterBottomLeft => within(px, py, size, 0.0, size),
            ShapeKind::QuarterBottomRight => within(px, py, 0.0, 0.0, size),
            ShapeKind::Circle => within(px, py, half, half, half),
            ShapeKind::HalfBar => py <= half,
        }
    }
}

fn within(px: f32, py: f32, cx: f32, cy: f32, radius: f32) -> bool {
    let dx = px - cx;
    let dy = py - cy;
    dx * dx + dy * dy <= radius * radius
}

/// Rasterises one primitive into the cell at `(x, y)`, sampling pixel centres.
/// `alpha` scales the colour's own alpha; pixels outside `clip` are skipped.
pub fn paint_shape(
    canvas: &mut RgbaCanvas,
    kind: ShapeKind,
    x: i32,
    y: i32,
    size: u32,
    color: Color,
    alpha: f32,
    blend: BlendMode,
    clip: Option<PixelRect>,
) {
    if alpha <= 0.0 || size == 0 {
        return;
    }
    let cell = PixelRect::new(x, y, size as i32, size as i32);
    let Some(area) = clip_to(cell, clip, canvas.width, canvas.height) else {
        return;
    };
    let extent = size as f32;
    for py in area.y..(area.y + area.height) {
        for px in area.x..(area.x + area.width) {
            let local_x = (px - x) as f32 + 0.5;
            let local_y = (py - y) as f32 + 0.5;
            if kind.covers(local_x, local_y, extent) {
                canvas.blend_pixel(px, py, color, alpha, blend);
            }
        }
    }
}
