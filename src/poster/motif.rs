use crate::poster::canvas::{clip_to, BlendMode, RgbaCanvas};
use crate::poster::composer::GridGeometry;
use crate::poster::model::{Color, PixelRect, ShapeId};
use crate::poster::palette::Palette;
use crate::poster::rng::SeededRng;
use std::f32::consts::FRAC_PI_4;

pub const MOTIF_MARGIN: f32 = 80.0;
pub const MOTIF_COLS: u32 = 4;
pub const MOTIF_ROWS: u32 = 3;
pub const BAND_COUNT: usize = 6;
pub const BAND_WIDTH: f32 = 16.0;
pub const BAND_GAP: f32 = 10.0;
const BAND_STEP: f32 = BAND_WIDTH + BAND_GAP;

pub const FRAME_COLOR: Color = Color::rgb(220, 220, 220);
pub const GUIDE_COLOR: Color = Color::rgb(240, 240, 240);

const ROTATED_MOTIF_SHARE: f64 = 0.4;
const ROTATED_BAR_SHARE: f64 = 0.3;
const GUIDE_SHARE: f64 = 0.3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Down,
    Up,
    Left,
    Right,
}

impl Direction {
    const ALL: [Direction; 4] = [
        Direction::Down,
        Direction::Up,
        Direction::Left,
        Direction::Right,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    fn from_draw(draw: f64, below: Side, above: Side) -> Self {
        if draw < 0.5 {
            below
        } else {
            above
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Horizontal,
    Vertical,
}

/// Letter motifs are nested racetrack bands with part of the stack cut away.
/// A ribbon is six parallel round-capped bands.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MotifKind {
    /// Half stack; the direction names the kept half.
    U(Direction),
    D(Side),
    P(Side),
    J(Side),
    Ribbon {
        orientation: Orientation,
        /// Position of the first band across the frame.
        offset: f32,
        length: f32,
    },
}

/// Kept part of the local frame, in fractions of its width and height.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Keep {
    x: (f32, f32),
    y: (f32, f32),
}

const OPEN: (f32, f32) = (f32::NEG_INFINITY, f32::INFINITY);

impl Keep {
    fn contains(&self, lx: f32, ly: f32, width: f32, height: f32) -> bool {
        lx >= self.x.0 * width
            && lx < self.x.1 * width
            && ly >= self.y.0 * height
            && ly < self.y.1 * height
    }
}

impl MotifKind {
    fn keep(self) -> Keep {
        let before = |cut: f32| (f32::NEG_INFINITY, cut);
        let after = |cut: f32| (cut, f32::INFINITY);
        let (x, y) = match self {
            MotifKind::U(Direction::Down) => (OPEN, after(0.5)),
            MotifKind::U(Direction::Up) => (OPEN, before(0.5)),
            MotifKind::U(Direction::Left) => (before(0.5), OPEN),
            MotifKind::U(Direction::Right) => (after(0.5), OPEN),
            MotifKind::D(Side::Left) => (before(0.5), OPEN),
            MotifKind::D(Side::Right) => (after(0.5), OPEN),
            MotifKind::P(Side::Left) => (after(0.35), before(0.55)),
            MotifKind::P(Side::Right) => (before(0.65), before(0.55)),
            MotifKind::J(Side::Left) => (before(0.55), after(0.5)),
            MotifKind::J(Side::Right) => (after(0.45), after(0.5)),
            MotifKind::Ribbon { .. } => (OPEN, OPEN),
        };
        Keep { x, y }
    }
}

/// Local frame of a motif: a `width × height` box at `(x, y)`, optionally
/// turned 45° clockwise about its centre.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub rotated: bool,
}

impl Placement {
    fn centre(&self) -> (f32, f32) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn to_local(&self, point: (f32, f32)) -> (f32, f32) {
        if !self.rotated {
            return (point.0 - self.x, point.1 - self.y);
        }
        let (cx, cy) = self.centre();
        let (sin, cos) = FRAC_PI_4.sin_cos();
        let dx = point.0 - cx;
        let dy = point.1 - cy;
        (
            cos * dx + sin * dy + self.width / 2.0,
            -sin * dx + cos * dy + self.height / 2.0,
        )
    }

    pub fn to_canvas(&self, local: (f32, f32)) -> (f32, f32) {
        if !self.rotated {
            return (local.0 + self.x, local.1 + self.y);
        }
        let (cx, cy) = self.centre();
        let (sin, cos) = FRAC_PI_4.sin_cos();
        let dx = local.0 - self.width / 2.0;
        let dy = local.1 - self.height / 2.0;
        (cx + cos * dx - sin * dy, cy + sin * dx + cos * dy)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Motif {
    pub id: ShapeId,
    pub kind: MotifKind,
    pub placement: Placement,
    /// Band `i` is painted with `colors[i]`, outermost first.
    pub colors: [Color; BAND_COUNT],
    /// Canvas-space box around every pixel the motif can touch.
    pub bounds: PixelRect,
}

impl Motif {
    pub fn new(
        id: ShapeId,
        kind: MotifKind,
        placement: Placement,
        colors: [Color; BAND_COUNT],
    ) -> Self {
        let bounds = footprint(kind, &placement);
        Self {
            id,
            kind,
            placement,
            colors,
            bounds,
        }
    }

    /// Band colour and stroke coverage at a canvas point, if any band is hit.
    pub fn sample(&self, point: (f32, f32)) -> Option<(Color, f32)> {
        let frame = &self.placement;
        let (lx, ly) = frame.to_local(point);

        if let MotifKind::Ribbon {
            orientation,
            offset,
            length,
        } = self.kind
        {
            let (along, across) = match orientation {
                Orientation::Horizontal => (lx, ly),
                Orientation::Vertical => (ly, lx),
            };
            let overshoot = along - along.clamp(0.0, length.max(0.0));
            return (0..BAND_COUNT).find_map(|band| {
                let lane = across - (offset + band as f32 * BAND_STEP);
                let distance = (lane * lane + overshoot * overshoot).sqrt();
                let coverage = stroke_coverage(distance);
                (coverage > 0.0).then(|| (self.colors[band], coverage))
            });
        }

        if !self.kind.keep().contains(lx, ly, frame.width, frame.height) {
            return None;
        }
        let px = lx - frame.width / 2.0;
        let py = ly - frame.height / 2.0;
        for band in 0..BAND_COUNT {
            let inset = band as f32 * BAND_STEP;
            let half_w = frame.width / 2.0 - inset;
            let half_h = frame.height / 2.0 - inset;
            if half_w <= 0.0 || half_h <= 0.0 {
                break;
            }
            let coverage = stroke_coverage(stadium_distance(px, py, half_w, half_h).abs());
            if coverage > 0.0 {
                return Some((self.colors[band], coverage));
            }
        }
        None
    }
}

fn stroke_coverage(distance: f32) -> f32 {
    (BAND_WIDTH / 2.0 + 0.5 - distance).clamp(0.0, 1.0)
}

/// Signed distance to the outline of a rounded box whose corner radius is
/// its shorter half extent.
fn stadium_distance(px: f32, py: f32, half_w: f32, half_h: f32) -> f32 {
    let radius = half_w.min(half_h);
    let qx = px.abs() - (half_w - radius);
    let qy = py.abs() - (half_h - radius);
    let outside = (qx.max(0.0).powi(2) + qy.max(0.0).powi(2)).sqrt();
    outside + qx.max(qy).min(0.0) - radius
}

fn footprint(kind: MotifKind, frame: &Placement) -> PixelRect {
    let pad = BAND_WIDTH / 2.0 + 1.0;
    let (x_range, y_range) = match kind {
        MotifKind::Ribbon {
            orientation,
            offset,
            length,
        } => {
            let along = (-pad, length.max(0.0) + pad);
            let across = (
                offset - pad,
                offset + (BAND_COUNT - 1) as f32 * BAND_STEP + pad,
            );
            match orientation {
                Orientation::Horizontal => (along, across),
                Orientation::Vertical => (across, along),
            }
        }
        _ => {
            let keep = kind.keep();
            let narrow = |range: (f32, f32), cut: (f32, f32), extent: f32| {
                (range.0.max(cut.0 * extent), range.1.min(cut.1 * extent))
            };
            (
                narrow((-pad, frame.width + pad), keep.x, frame.width),
                narrow((-pad, frame.height + pad), keep.y, frame.height),
            )
        }
    };

    let corners = [
        (x_range.0, y_range.0),
        (x_range.1, y_range.0),
        (x_range.0, y_range.1),
        (x_range.1, y_range.1),
    ]
    .map(|corner| frame.to_canvas(corner));
    let min_x = corners.iter().map(|c| c.0).fold(f32::INFINITY, f32::min);
    let max_x = corners.iter().map(|c| c.0).fold(f32::NEG_INFINITY, f32::max);
    let min_y = corners.iter().map(|c| c.1).fold(f32::INFINITY, f32::min);
    let max_y = corners.iter().map(|c| c.1).fold(f32::NEG_INFINITY, f32::max);

    let x0 = min_x.floor() as i32;
    let y0 = min_y.floor() as i32;
    PixelRect::new(
        x0,
        y0,
        max_x.ceil() as i32 - x0,
        max_y.ceil() as i32 - y0,
    )
}

/// Samples pixel centres inside the motif's bounds; `alpha` scales every band.
pub fn paint_motif(
    canvas: &mut RgbaCanvas,
    motif: &Motif,
    alpha: f32,
    blend: BlendMode,
    clip: Option<PixelRect>,
) {
    if alpha <= 0.0 {
        return;
    }
    let Some(area) = clip_to(motif.bounds, clip, canvas.width, canvas.height) else {
        return;
    };
    for py in area.y..(area.y + area.height) {
        for px in area.x..(area.x + area.width) {
            if let Some((color, coverage)) = motif.sample((px as f32 + 0.5, py as f32 + 0.5)) {
                canvas.blend_pixel(px, py, color, alpha * coverage, blend);
            }
        }
    }
}

/// Thin outline at half the margin plus optional faint cell guides.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SketchFrame {
    pub width: u32,
    pub height: u32,
    pub cell_width: f32,
    pub cell_height: f32,
    pub guides: bool,
}

impl SketchFrame {
    /// Edges of the 2 px outline.
    pub fn outline(&self) -> [PixelRect; 4] {
        let inset = (MOTIF_MARGIN / 2.0) as i32 - 1;
        let width = self.width as i32 - 2 * inset;
        let height = self.height as i32 - 2 * inset;
        [
            PixelRect::new(inset, inset, width, 2),
            PixelRect::new(inset, inset + height - 2, width, 2),
            PixelRect::new(inset, inset, 2, height),
            PixelRect::new(inset + width - 2, inset, 2, height),
        ]
    }

    pub fn paint(&self, canvas: &mut RgbaCanvas, clip: Option<PixelRect>) {
        for edge in self.outline() {
            if edge.width > 0 && edge.height > 0 {
                canvas.fill_rect(edge, FRAME_COLOR, clip);
            }
        }
        if !self.guides {
            return;
        }
        let margin = MOTIF_MARGIN as i32;
        let inner_w = self.width as i32 - 2 * margin;
        let inner_h = self.height as i32 - 2 * margin;
        for col in 1..MOTIF_COLS {
            let x = (MOTIF_MARGIN + col as f32 * self.cell_width).floor() as i32;
            blend_rect(canvas, PixelRect::new(x, margin, 1, inner_h), clip);
        }
        for row in 1..MOTIF_ROWS {
            let y = (MOTIF_MARGIN + row as f32 * self.cell_height).floor() as i32;
            blend_rect(canvas, PixelRect::new(margin, y, inner_w, 1), clip);
        }
    }
}

// Guides are half-pixel strokes: one pixel at half coverage.
fn blend_rect(canvas: &mut RgbaCanvas, rect: PixelRect, clip: Option<PixelRect>) {
    let Some(area) = clip_to(rect, clip, canvas.width, canvas.height) else {
        return;
    };
    for y in area.y..(area.y + area.height) {
        for x in area.x..(area.x + area.width) {
            canvas.blend_pixel(x, y, GUIDE_COLOR, 0.5, BlendMode::Normal);
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MotifLayout {
    pub geometry: GridGeometry,
    pub motifs: Vec<Motif>,
    pub frame: SketchFrame,
}

/// Fisher-Yates from the back, one draw per swap.
fn shuffle<T>(rng: &mut SeededRng, items: &mut [T]) {
    let mut idx = items.len();
    while idx > 1 {
        let pick = (rng.next() * idx as f64).floor() as usize;
        idx -= 1;
        items.swap(idx, pick.min(idx));
    }
}

/// Lays out 4-6 letter motifs and 1-2 ribbon bars over a shuffled 4×3 grid
/// inside the margin. Each piece takes the id of its grid cell.
///
/// Draw order: motif count, the shuffle, size and offset per motif, then
/// kind, rotation and variant per motif, the bar count, rotation,
/// orientation and position per bar, and finally the guide toggle.
pub fn layout(rng: &mut SeededRng, width: u32, height: u32, palette: &Palette) -> MotifLayout {
    let inner_w = (width as f32 - 2.0 * MOTIF_MARGIN).max(0.0);
    let inner_h = (height as f32 - 2.0 * MOTIF_MARGIN).max(0.0);
    let cell_w = inner_w / MOTIF_COLS as f32;
    let cell_h = inner_h / MOTIF_ROWS as f32;
    let colors: [Color; BAND_COUNT] = std::array::from_fn(|band| palette.color_at(band));
    let cell_origin = |row: u32, col: u32| {
        (
            MOTIF_MARGIN + col as f32 * cell_w,
            MOTIF_MARGIN + row as f32 * cell_h,
        )
    };

    let main_count = (4.0 + rng.next() * 3.0).floor() as usize;
    let mut cells: Vec<(u32, u32)> = (0..MOTIF_ROWS)
        .flat_map(|row| (0..MOTIF_COLS).map(move |col| (row, col)))
        .collect();
    shuffle(rng, &mut cells);

    let mut blocks = Vec::with_capacity(main_count);
    for &(row, col) in cells.iter().take(main_count) {
        let (cell_x, cell_y) = cell_origin(row, col);
        let factor = 0.6 + rng.next() as f32 * 0.3;
        let block_w = cell_w * factor;
        let block_h = cell_h * factor;
        let x = cell_x + rng.next() as f32 * (cell_w - block_w);
        let y = cell_y + rng.next() as f32 * (cell_h - block_h);
        blocks.push((ShapeId::new(row, col), x, y, block_w, block_h));
    }

    let mut motifs = Vec::with_capacity(blocks.len() + 2);
    for (id, x, y, block_w, block_h) in blocks {
        let letter = (rng.next() * 4.0).floor() as u32;
        let rotated = rng.next() < ROTATED_MOTIF_SHARE;
        let variant = rng.next();
        let kind = match letter {
            0 => MotifKind::U(Direction::ALL[((variant * 4.0).floor() as usize).min(3)]),
            1 => MotifKind::D(Side::from_draw(variant, Side::Right, Side::Left)),
            2 => MotifKind::P(Side::from_draw(variant, Side::Right, Side::Left)),
            _ => MotifKind::J(Side::from_draw(variant, Side::Left, Side::Right)),
        };
        if block_w > 0.0 && block_h > 0.0 {
            let placement = Placement {
                x,
                y,
                width: block_w,
                height: block_h,
                rotated,
            };
            motifs.push(Motif::new(id, kind, placement, colors));
        }
    }

    let bar_count = (1.0 + rng.next() * 2.0).floor() as usize;
    for &(row, col) in cells.iter().skip(main_count).take(bar_count) {
        let (cell_x, cell_y) = cell_origin(row, col);
        let rotated = rng.next() < ROTATED_BAR_SHARE;
        let orientation = if rng.next() < 0.5 {
            Orientation::Horizontal
        } else {
            Orientation::Vertical
        };
        let (extent, cross) = match orientation {
            Orientation::Horizontal => (cell_w, cell_h),
            Orientation::Vertical => (cell_h, cell_w),
        };
        let offset = cross * 0.2 + rng.next() as f32 * cross * 0.6;
        let length = if rotated { extent } else { extent * 0.9 };
        let placement = Placement {
            x: cell_x,
            y: cell_y,
            width: cell_w,
            height: cell_h,
            rotated,
        };
        let kind = MotifKind::Ribbon {
            orientation,
            offset,
            length,
        };
        motifs.push(Motif::new(ShapeId::new(row, col), kind, placement, colors));
    }

    let guides = rng.next() < GUIDE_SHARE;

    MotifLayout {
        geometry: GridGeometry {
            cols: MOTIF_COLS,
            rows: MOTIF_ROWS,
            cell_size: cell_w.min(cell_h).floor() as u32,
        },
        motifs,
        frame: SketchFrame {
            width,
            height,
            cell_width: cell_w,
            cell_height: cell_h,
            guides,
        },
    }
}
