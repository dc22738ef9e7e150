use crate::poster::font::OverlayFont;
use crate::poster::model::{Color, PixelRect, Shape, ShapeCatalogue, ShapeId};
use crate::poster::motif::{self, Motif, SketchFrame};
use crate::poster::palette::Palette;
use crate::poster::rng::SeededRng;
use serde::{Deserialize, Serialize};

pub const DEFAULT_CELL_SIZE: u32 = 60;
pub const DEFAULT_DENSITY: f64 = 0.85;
pub const DEFAULT_TEXT_PROBABILITY: f64 = 0.9;
pub const DEFAULT_TEXT_MARGIN: f64 = 100.0;
pub const DEFAULT_TEXT_PADDING: f64 = 30.0;
pub const DEFAULT_FONT_SIZE: f32 = 36.0;

pub const PLATE_COLOR: Color = Color::WHITE;
pub const TEXT_COLOR: Color = Color::BLACK;

/// How the grid is sized. `Randomized` draws its parameters from the RNG right
/// after the background fill, so they are part of the seeded sequence.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GridMode {
    Fixed {
        cell_size: u32,
        density: f64,
    },
    Randomized {
        cell_size_min: u32,
        cell_size_max: u32,
        density_min: f64,
        density_max: f64,
    },
}

impl Default for GridMode {
    fn default() -> Self {
        GridMode::Fixed {
            cell_size: DEFAULT_CELL_SIZE,
            density: DEFAULT_DENSITY,
        }
    }
}

/// `Grid` fills square cells with primitives; `Motif` places banded letter
/// motifs and ribbon bars on a 4×3 grid inside a framed margin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompositionStyle {
    #[default]
    Grid,
    Motif,
}

impl CompositionStyle {
    pub fn toggled(self) -> Self {
        match self {
            CompositionStyle::Grid => CompositionStyle::Motif,
            CompositionStyle::Motif => CompositionStyle::Grid,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ComposerConfig {
    pub style: CompositionStyle,
    pub grid: GridMode,
    pub catalogue: ShapeCatalogue,
    pub text_probability: f64,
    pub text_margin: f64,
    pub text_padding: f64,
    pub font_size: f32,
}

impl Default for ComposerConfig {
    fn default() -> Self {
        Self {
            style: CompositionStyle::Grid,
            grid: GridMode::default(),
            catalogue: ShapeCatalogue::Full,
            text_probability: DEFAULT_TEXT_PROBABILITY,
            text_margin: DEFAULT_TEXT_MARGIN,
            text_padding: DEFAULT_TEXT_PADDING,
            font_size: DEFAULT_FONT_SIZE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GridGeometry {
    pub cols: u32,
    pub rows: u32,
    pub cell_size: u32,
}

impl GridGeometry {
    pub fn for_surface(width: u32, height: u32, cell_size: u32) -> Self {
        let cell_size = cell_size.max(1);
        Self {
            cols: width / cell_size,
            rows: height / cell_size,
            cell_size,
        }
    }

    pub fn cell_count(&self) -> usize {
        self.cols as usize * self.rows as usize
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextOverlay {
    pub text: String,
    pub center: (f64, f64),
    pub text_width: u32,
    pub plate: PixelRect,
    pub font: OverlayFont,
}

impl TextOverlay {
    /// Left edge and vertical middle of the glyph run, centred on `center`.
    pub fn text_anchor(&self) -> (f32, f32) {
        let left = self.center.0 - self.text_width as f64 / 2.0;
        (left as f32, self.center.1 as f32)
    }
}

/// One deterministic layout: everything the painter needs, nothing it derives.
#[derive(Debug, Clone, PartialEq)]
pub struct Composition {
    pub width: u32,
    pub height: u32,
    pub seed: i64,
    pub style: CompositionStyle,
    pub background: Color,
    pub geometry: GridGeometry,
    /// Populate probability of the grid walk; zero for the motif style.
    pub density: f64,
    pub catalogue: ShapeCatalogue,
    pub shapes: Vec<Shape>,
    pub motifs: Vec<Motif>,
    pub frame: Option<SketchFrame>,
    pub text: Option<TextOverlay>,
    pub draws: u64,
}

impl Composition {
    pub fn cells_evaluated(&self) -> usize {
        self.geometry.cell_count()
    }

    pub fn shape(&self, id: ShapeId) -> Option<&Shape> {
        self.shapes.iter().find(|shape| shape.id == id)
    }

    pub fn motif(&self, id: ShapeId) -> Option<&Motif> {
        self.motifs.iter().find(|motif| motif.id == id)
    }

    /// Every hit-testable piece in paint order: grid shapes, then motifs.
    pub fn targets(&self) -> impl Iterator<Item = (ShapeId, PixelRect)> + '_ {
        self.shapes
            .iter()
            .map(|shape| (shape.id, shape.bounds))
            .chain(self.motifs.iter().map(|motif| (motif.id, motif.bounds)))
    }

    pub fn bounds_of(&self, id: ShapeId) -> Option<PixelRect> {
        self.targets()
            .find(|(target, _)| *target == id)
            .map(|(_, bounds)| bounds)
    }

    /// Topmost piece whose bounds contain `point` (pixel coordinates).
    pub fn hit_test(&self, point: (f32, f32)) -> Option<ShapeId> {
        self.targets()
            .filter(|(_, bounds)| bounds.contains(point))
            .last()
            .map(|(id, _)| id)
    }
}

struct GridLayout {
    geometry: GridGeometry,
    density: f64,
    catalogue: ShapeCatalogue,
    shapes: Vec<Shape>,
}

/// Lays out one composition. Returns `None` for a detached (zero-sized)
/// surface without touching the generator.
///
/// Grid style: draw order per cell is populate, colour, shape; empty cells
/// consume only the populate draw. Motif style follows the order documented
/// on [`motif::layout`]. Either way the layout is followed by one text draw,
/// then two placement draws when the text is shown.
pub fn compose(
    rng: &mut SeededRng,
    seed: i64,
    size: (u32, u32),
    palette: &Palette,
    text: &str,
    config: &ComposerConfig,
) -> Option<Composition> {
    let (width, height) = size;
    if width == 0 || height == 0 {
        return None;
    }

    rng.reset(seed);
    let background = palette.background();

    let (grid, motifs, frame) = match config.style {
        CompositionStyle::Grid => (walk_grid(rng, width, height, palette, config), Vec::new(), None),
        CompositionStyle::Motif => {
            let layout = motif::layout(rng, width, height, palette);
            let grid = GridLayout {
                geometry: layout.geometry,
                density: 0.0,
                catalogue: config.catalogue,
                shapes: Vec::new(),
            };
            (grid, layout.motifs, Some(layout.frame))
        }
    };

    let text = if rng.next() < config.text_probability {
        Some(place_text(rng, width, height, text, config))
    } else {
        None
    };

    tracing::debug!(
        seed,
        width,
        height,
        style = ?config.style,
        cols = grid.geometry.cols,
        rows = grid.geometry.rows,
        shapes = grid.shapes.len(),
        motifs = motifs.len(),
        draws = rng.draw_count(),
        "composed poster"
    );

    Some(Composition {
        width,
        height,
        seed,
        style: config.style,
        background,
        geometry: grid.geometry,
        density: grid.density,
        catalogue: grid.catalogue,
        shapes: grid.shapes,
        motifs,
        frame,
        text,
        draws: rng.draw_count(),
    })
}

fn walk_grid(
    rng: &mut SeededRng,
    width: u32,
    height: u32,
    palette: &Palette,
    config: &ComposerConfig,
) -> GridLayout {
    let (cell_size, density, catalogue) = match config.grid {
        GridMode::Fixed { cell_size, density } => (cell_size, density, config.catalogue),
        GridMode::Randomized {
            cell_size_min,
            cell_size_max,
            density_min,
            density_max,
        } => {
            let span = cell_size_max.saturating_sub(cell_size_min) as f64 + 1.0;
            let cell_size = cell_size_min + (rng.next() * span).floor() as u32;
            let density = density_min + rng.next() * (density_max - density_min);
            let catalogue = if rng.next() < 0.5 {
                ShapeCatalogue::Full
            } else {
                ShapeCatalogue::Basic
            };
            (cell_size, density, catalogue)
        }
    };

    let geometry = GridGeometry::for_surface(width, height, cell_size);
    let cell = geometry.cell_size;
    let mut shapes = Vec::with_capacity(geometry.cell_count());

    for row in 0..geometry.rows {
        for col in 0..geometry.cols {
            let x = (col * cell) as i32;
            let y = (row * cell) as i32;

            if rng.next() >= density {
                continue;
            }
            let color_idx = (rng.next() * palette.colors.len() as f64).floor() as usize;
            let color = palette.color_at(color_idx);
            let kind = catalogue.pick(rng.next());

            shapes.push(Shape {
                id: ShapeId::new(row, col),
                x,
                y,
                size: cell,
                color,
                kind,
                bounds: PixelRect::new(x, y, cell as i32, cell as i32),
            });
        }
    }

    GridLayout {
        geometry,
        density,
        catalogue,
        shapes,
    }
}

fn place_text(
    rng: &mut SeededRng,
    width: u32,
    height: u32,
    text: &str,
    config: &ComposerConfig,
) -> TextOverlay {
    let margin = config.text_margin;
    let center_x = margin + rng.next() * (width as f64 - margin * 2.0);
    let center_y = margin + rng.next() * (height as f64 - margin * 2.0);

    let font = OverlayFont::new(config.font_size, true);
    let text_width = font.measure(text);
    let text_height = font.size() as f64;
    let padding = config.text_padding;

    let plate = PixelRect::new(
        (center_x - text_width as f64 / 2.0 - padding).round() as i32,
        (center_y - text_height / 2.0 - padding).round() as i32,
        (text_width as f64 + padding * 2.0).round() as i32,
        (text_height + padding * 2.0).round() as i32,
    );

    TextOverlay {
        text: text.to_string(),
        center: (center_x, center_y),
        text_width,
        plate,
        font,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::poster::model::ShapeKind;
    use crate::poster::palette::PaletteCatalogue;

    fn fixed(cell_size: u32, density: f64) -> ComposerConfig {
        ComposerConfig {
            grid: GridMode::Fixed { cell_size, density },
            ..ComposerConfig::default()
        }
    }

    fn run(seed: i64, size: (u32, u32), config: &ComposerConfig) -> Composition {
        let catalogue = PaletteCatalogue::builtin();
        let mut rng = SeededRng::new(0);
        compose(&mut rng, seed, size, catalogue.palette_at(0), "BAUHAUS", config)
            .expect("composition")
    }

    #[test]
    fn reference_scenario_walks_ten_by_eight_cells() {
        let composition = run(12345, (600, 480), &ComposerConfig::default());
        assert_eq!(composition.geometry.cols, 10);
        assert_eq!(composition.geometry.rows, 8);
        assert_eq!(composition.cells_evaluated(), 80);

        let mut rng = SeededRng::new(12345);
        let populate = rng.next();
        let color_draw = rng.next();
        let shape_draw = rng.next();
        assert!(populate < DEFAULT_DENSITY);

        let first = &composition.shapes[0];
        let palette = PaletteCatalogue::builtin().palette_at(0).clone();
        assert_eq!(first.id, ShapeId::new(0, 0));
        assert_eq!(first.id.to_string(), "0-0");
        assert_eq!(
            first.color,
            palette.color_at((color_draw * palette.colors.len() as f64).floor() as usize)
        );
        assert_eq!(first.kind, ShapeCatalogue::Full.pick(shape_draw));
        assert_eq!(first.color, Color::hex(0xFFD700));
        assert_eq!(first.kind, ShapeKind::QuarterTopRight);
    }

    #[test]
    fn identical_inputs_give_identical_layouts() {
        let a = run(987_654, (1280, 720), &ComposerConfig::default());
        let b = run(987_654, (1280, 720), &ComposerConfig::default());
        assert_eq!(a, b);
        assert_ne!(a, run(987_655, (1280, 720), &ComposerConfig::default()));
    }

    #[test]
    fn zero_sized_surface_is_a_no_op() {
        let palette = PaletteCatalogue::builtin().palette_at(0).clone();
        let mut rng = SeededRng::new(5);
        let config = ComposerConfig::default();
        assert!(compose(&mut rng, 5, (0, 480), &palette, "X", &config).is_none());
        assert!(compose(&mut rng, 5, (600, 0), &palette, "X", &config).is_none());
        assert_eq!(rng.draw_count(), 0);
    }

    #[test]
    fn empty_cells_consume_exactly_one_draw() {
        let composition = run(42, (600, 480), &fixed(60, 0.0));
        assert!(composition.shapes.is_empty());
        let expected = if composition.text.is_some() { 83 } else { 81 };
        assert_eq!(composition.draws, expected);
    }

    #[test]
    fn full_cells_consume_three_draws() {
        let composition = run(42, (600, 480), &fixed(60, 1.0));
        assert_eq!(composition.shapes.len(), 80);
        let text_draws = if composition.text.is_some() { 3 } else { 1 };
        assert_eq!(composition.draws, 240 + text_draws);
    }

    #[test]
    fn populated_share_tracks_density() {
        let composition = run(2024, (6000, 6000), &fixed(20, 0.85));
        let cells = composition.cells_evaluated() as f64;
        let share = composition.shapes.len() as f64 / cells;
        assert_eq!(cells, 90_000.0);
        assert!((share - 0.85).abs() < 0.02, "share {share}");
    }

    #[test]
    fn shapes_are_row_major_and_inside_the_grid() {
        let composition = run(77, (610, 250), &ComposerConfig::default());
        let ids: Vec<ShapeId> = composition.shapes.iter().map(|s| s.id).collect();
        let mut sorted = ids.clone();
        sorted.sort();
        assert_eq!(ids, sorted);
        for shape in &composition.shapes {
            assert!(shape.id.col < 10 && shape.id.row < 4);
            assert_eq!(shape.x, shape.id.col as i32 * 60);
            assert_eq!(shape.y, shape.id.row as i32 * 60);
            assert_eq!(shape.bounds, PixelRect::new(shape.x, shape.y, 60, 60));
        }
    }

    #[test]
    fn empty_palette_falls_back_to_black() {
        let palette = Palette {
            background: None,
            colors: Vec::new(),
        };
        let mut rng = SeededRng::new(0);
        let composition = compose(
            &mut rng,
            3,
            (300, 300),
            &palette,
            "",
            &fixed(60, 1.0),
        )
        .unwrap();
        assert_eq!(composition.background, Color::hex(0xE8E8E8));
        assert!(composition.shapes.iter().all(|s| s.color == Color::BLACK));
    }

    #[test]
    fn text_plate_is_padded_around_measured_text() {
        let mut seed = 0;
        let composition = loop {
            let candidate = run(seed, (800, 600), &ComposerConfig::default());
            if candidate.text.is_some() {
                break candidate;
            }
            seed += 1;
        };
        let overlay = composition.text.as_ref().unwrap();
        assert_eq!(overlay.text, "BAUHAUS");
        assert_eq!(overlay.text_width, overlay.font.measure("BAUHAUS"));
        assert_eq!(overlay.plate.width, overlay.text_width as i32 + 60);
        assert_eq!(overlay.plate.height, 96);
        assert!(overlay.text_width > 0);
        assert!((100.0..=700.0).contains(&overlay.center.0));
        assert!((100.0..=500.0).contains(&overlay.center.1));
        let mid_x = overlay.plate.x as f64 + overlay.plate.width as f64 / 2.0;
        assert!((mid_x - overlay.center.0).abs() <= 1.0);
    }

    #[test]
    fn text_can_be_suppressed_by_probability() {
        let config = ComposerConfig {
            text_probability: 0.0,
            ..ComposerConfig::default()
        };
        let composition = run(12345, (600, 480), &config);
        assert!(composition.text.is_none());
    }

    #[test]
    fn randomized_grid_draws_parameters_before_the_walk() {
        let config = ComposerConfig {
            grid: GridMode::Randomized {
                cell_size_min: 40,
                cell_size_max: 80,
                density_min: 0.5,
                density_max: 0.9,
            },
            ..ComposerConfig::default()
        };
        let composition = run(31337, (800, 600), &config);

        let mut rng = SeededRng::new(31337);
        let cell = 40 + (rng.next() * 41.0).floor() as u32;
        let density = 0.5 + rng.next() * 0.4;
        let catalogue = if rng.next() < 0.5 {
            ShapeCatalogue::Full
        } else {
            ShapeCatalogue::Basic
        };
        assert_eq!(composition.geometry.cell_size, cell);
        assert_eq!(composition.density, density);
        assert_eq!(composition.catalogue, catalogue);
        assert_eq!(composition, run(31337, (800, 600), &config));
    }

    #[test]
    fn hit_test_finds_the_cell_under_the_pointer() {
        let composition = run(12345, (600, 480), &fixed(60, 1.0));
        let hit = composition.hit_test((130.0, 70.0)).unwrap();
        assert_eq!(hit, ShapeId::new(1, 2));
        assert!(composition.hit_test((605.0, 10.0)).is_none());
        assert_eq!(
            composition.bounds_of(hit),
            Some(PixelRect::new(120, 60, 60, 60))
        );
    }

    fn motif_config() -> ComposerConfig {
        ComposerConfig {
            style: CompositionStyle::Motif,
            ..ComposerConfig::default()
        }
    }

    #[test]
    fn motif_style_replaces_the_grid_walk() {
        let palettes = PaletteCatalogue::sketch();
        let mut rng = SeededRng::new(0);
        let composition = compose(
            &mut rng,
            2024,
            (1200, 900),
            palettes.palette_at(0),
            "BAUHAUS",
            &motif_config(),
        )
        .unwrap();

        assert_eq!(composition.style, CompositionStyle::Motif);
        assert!(composition.shapes.is_empty());
        assert!((5..=8).contains(&composition.motifs.len()));
        assert_eq!(composition.background, Color::rgb(248, 248, 248));
        assert!(composition.frame.is_some());
        assert_eq!((composition.geometry.cols, composition.geometry.rows), (4, 3));

        let mut layout_rng = SeededRng::new(2024);
        let layout = motif::layout(&mut layout_rng, 1200, 900, palettes.palette_at(0));
        assert_eq!(composition.motifs, layout.motifs);
        let text_draws = if composition.text.is_some() { 3 } else { 1 };
        assert_eq!(composition.draws, layout_rng.draw_count() + text_draws);
    }

    #[test]
    fn motifs_are_hit_testable_by_cell_id() {
        let composition = run(77, (1200, 900), &motif_config());
        let target = &composition.motifs[0];
        let inside = (
            target.bounds.x as f32 + target.bounds.width as f32 / 2.0,
            target.bounds.y as f32 + target.bounds.height as f32 / 2.0,
        );
        let hit = composition.hit_test(inside).unwrap();
        assert!(composition.motif(hit).is_some());
        assert_eq!(composition.bounds_of(target.id), Some(target.bounds));
        assert_eq!(composition.targets().count(), composition.motifs.len());
    }

    #[test]
    fn huge_font_sizes_are_capped() {
        let config = ComposerConfig {
            font_size: 1e9,
            text_probability: 1.0,
            ..ComposerConfig::default()
        };
        let composition = run(12345, (600, 480), &config);
        let overlay = composition.text.unwrap();
        assert_eq!(overlay.font.size(), crate::poster::font::MAX_FONT_SIZE);
        assert_eq!(overlay.plate.height, 512 + 60);
    }
}
