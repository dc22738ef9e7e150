use crate::poster::canvas::{BlendMode, RgbaCanvas};
use crate::poster::composer::{compose, ComposerConfig, Composition, CompositionStyle};
use crate::poster::input::PosterAction;
use crate::poster::interaction::{InteractionState, InteractionUpdate};
use crate::poster::palette::PaletteCatalogue;
use crate::poster::render::{render_composition, repaint_shapes};
use crate::poster::rng::SeededRng;
use crate::poster::save::{export_file_name, ExportSink};
use crate::poster::settings::PosterSettings;
use crate::poster::text_store::{TextStore, CUSTOM_TEXT_KEY};
use anyhow::{Context, Result};
use chrono::Local;
use rand::Rng;
use std::path::PathBuf;
use std::time::Duration;

/// Seeds drawn by the regenerate action fall in `0..SEED_SPACE`.
pub const SEED_SPACE: i64 = 10_000_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    Redrawn,
    Exported(PathBuf),
    /// No surface yet, nothing was written.
    NothingToExport,
    /// The caller should ask for new text and hand it to
    /// [`PosterSession::apply_text_edit`].
    TextPromptRequested,
    BlendChanged(BlendMode),
    StyleChanged(CompositionStyle),
}

/// Owns the poster state (seed, palette, text, surface size) and keeps the
/// composition, its raster and the interaction state in step with it.
pub struct PosterSession {
    config: ComposerConfig,
    palettes: PaletteCatalogue,
    sketch_palettes: PaletteCatalogue,
    max_text_len: usize,
    export_prefix: String,
    seed: i64,
    palette_idx: i64,
    text: String,
    size: (u32, u32),
    rng: SeededRng,
    composition: Option<Composition>,
    canvas: Option<RgbaCanvas>,
    canvas_revision: u64,
    interaction: InteractionState,
    blend: BlendMode,
    redraw_count: u64,
    store: Box<dyn TextStore>,
}

impl PosterSession {
    /// Reads the stored overlay text once; a failing store falls back to the
    /// configured default. No surface exists until the first [`resize`].
    ///
    /// [`resize`]: PosterSession::resize
    pub fn new(settings: &PosterSettings, store: Box<dyn TextStore>) -> Self {
        let text = match store.get(CUSTOM_TEXT_KEY) {
            Ok(Some(saved)) if !saved.is_empty() => saved,
            Ok(_) => settings.default_text.clone(),
            Err(err) => {
                tracing::warn!(error = ?err, "failed to read stored poster text");
                settings.default_text.clone()
            }
        };

        Self {
            config: settings.composer_config(),
            palettes: settings.palette_catalogue(),
            sketch_palettes: PaletteCatalogue::sketch(),
            max_text_len: settings.max_text_len.max(1),
            export_prefix: settings.export_prefix.clone(),
            seed: settings.initial_seed,
            palette_idx: settings.initial_palette,
            text,
            size: (0, 0),
            rng: SeededRng::new(settings.initial_seed),
            composition: None,
            canvas: None,
            canvas_revision: 0,
            interaction: InteractionState::new(settings.fade_timing()),
            blend: BlendMode::Normal,
            redraw_count: 0,
            store,
        }
    }

    pub fn seed(&self) -> i64 {
        self.seed
    }

    pub fn palette_index(&self) -> i64 {
        self.palette_idx
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn size(&self) -> (u32, u32) {
        self.size
    }

    pub fn blend_mode(&self) -> BlendMode {
        self.blend
    }

    pub fn style(&self) -> CompositionStyle {
        self.config.style
    }

    pub fn composition(&self) -> Option<&Composition> {
        self.composition.as_ref()
    }

    pub fn canvas(&self) -> Option<&RgbaCanvas> {
        self.canvas.as_ref()
    }

    /// Bumped on every change to the canvas pixels.
    pub fn canvas_revision(&self) -> u64 {
        self.canvas_revision
    }

    pub fn interaction(&self) -> &InteractionState {
        &self.interaction
    }

    /// Number of full recompositions so far.
    pub fn redraw_count(&self) -> u64 {
        self.redraw_count
    }

    pub fn max_text_len(&self) -> usize {
        self.max_text_len
    }

    pub fn text_store(&self) -> &dyn TextStore {
        self.store.as_ref()
    }

    /// Recomposes at the new size with the same seed, palette and text.
    /// Returns false when nothing changed.
    pub fn resize(&mut self, width: u32, height: u32) -> bool {
        if self.size == (width, height) && (self.composition.is_some() || width == 0 || height == 0)
        {
            return false;
        }
        self.size = (width, height);
        self.redraw();
        true
    }

    /// Full recomposition from the current state. A zero-sized surface drops
    /// the composition and the interaction state.
    pub fn redraw(&mut self) -> bool {
        let palette = match self.config.style {
            CompositionStyle::Grid => self.palettes.palette_at(self.palette_idx),
            CompositionStyle::Motif => self.sketch_palettes.palette_at(self.palette_idx),
        };
        let Some(composition) = compose(
            &mut self.rng,
            self.seed,
            self.size,
            palette,
            &self.text,
            &self.config,
        ) else {
            if self.composition.take().is_some() {
                tracing::debug!(size = ?self.size, "surface detached");
            }
            self.canvas = None;
            self.interaction.detach();
            return false;
        };

        let geometry_changed = self.interaction.sync_with(&composition);
        let interaction = &self.interaction;
        let canvas = render_composition(&composition, |id| interaction.alpha_of(id), self.blend);

        self.redraw_count += 1;
        tracing::debug!(
            seed = self.seed,
            palette = self.palette_idx,
            geometry_changed,
            redraws = self.redraw_count,
            "poster redrawn"
        );
        self.composition = Some(composition);
        self.canvas = Some(canvas);
        self.canvas_revision += 1;
        true
    }

    pub fn regenerate(&mut self) -> i64 {
        self.regenerate_with(&mut rand::thread_rng())
    }

    /// Draws a fresh seed from `rng` and recomposes once.
    pub fn regenerate_with<R: Rng + ?Sized>(&mut self, rng: &mut R) -> i64 {
        self.seed = rng.gen_range(0..SEED_SPACE);
        tracing::debug!(seed = self.seed, "regenerating poster");
        self.redraw();
        self.seed
    }

    pub fn select_palette(&mut self, index: usize) {
        self.palette_idx = index as i64;
        self.redraw();
    }

    /// Cancelled or blank input is ignored. Otherwise the text is cut to the
    /// length cap, uppercased, redrawn and persisted. A persistence failure
    /// is reported after the redraw.
    pub fn apply_text_edit(&mut self, input: Option<String>) -> Result<bool> {
        let Some(raw) = input else {
            return Ok(false);
        };
        if raw.trim().is_empty() {
            return Ok(false);
        }

        let limited: String = raw.chars().take(self.max_text_len).collect();
        self.text = limited.to_uppercase();
        tracing::info!(text = %self.text, "overlay text updated");
        self.redraw();

        self.store
            .set(CUSTOM_TEXT_KEY, &self.text)
            .context("persist overlay text")
            .map_err(|err| {
                tracing::error!(error = ?err, "failed to store poster text");
                err
            })?;
        Ok(true)
    }

    /// Switches between normal and multiply painting. The layout is kept.
    pub fn toggle_blend(&mut self) -> BlendMode {
        self.blend = self.blend.toggled();
        if let Some(composition) = &self.composition {
            let interaction = &self.interaction;
            self.canvas = Some(render_composition(
                composition,
                |id| interaction.alpha_of(id),
                self.blend,
            ));
            self.canvas_revision += 1;
        }
        self.blend
    }

    /// Switches between the grid and motif layouts and recomposes with the
    /// same seed and palette index. Visibility state is cleared.
    pub fn toggle_style(&mut self) -> CompositionStyle {
        self.config.style = self.config.style.toggled();
        tracing::debug!(style = ?self.config.style, "composition style changed");
        self.redraw();
        self.config.style
    }

    /// Hands the current raster to `sink` as `<prefix>_YYYYMMDD_HHMMSS.png`.
    pub fn export(&self, sink: &mut dyn ExportSink) -> Result<Option<PathBuf>> {
        let Some(canvas) = &self.canvas else {
            tracing::debug!("export requested without a surface");
            return Ok(None);
        };
        let file_name = export_file_name(&self.export_prefix, Local::now());
        let path = sink
            .export(canvas, &file_name)
            .with_context(|| format!("export poster as {file_name}"))
            .map_err(|err| {
                tracing::error!(error = ?err, "poster export failed");
                err
            })?;
        tracing::info!(path = %path.display(), "poster exported");
        Ok(Some(path))
    }

    pub fn apply(&mut self, action: PosterAction, sink: &mut dyn ExportSink) -> Result<ActionOutcome> {
        match action {
            PosterAction::Regenerate => {
                self.regenerate();
                Ok(ActionOutcome::Redrawn)
            }
            PosterAction::SelectPalette(index) => {
                self.select_palette(index);
                Ok(ActionOutcome::Redrawn)
            }
            PosterAction::Save => Ok(match self.export(sink)? {
                Some(path) => ActionOutcome::Exported(path),
                None => ActionOutcome::NothingToExport,
            }),
            PosterAction::EditText => Ok(ActionOutcome::TextPromptRequested),
            PosterAction::ToggleBlend => Ok(ActionOutcome::BlendChanged(self.toggle_blend())),
            PosterAction::ToggleStyle => Ok(ActionOutcome::StyleChanged(self.toggle_style())),
        }
    }

    pub fn pointer_pressed(&mut self, point: (f32, f32)) -> bool {
        let update = self.interaction.on_press(point);
        self.apply_update(update)
    }

    pub fn pointer_moved(&mut self, point: (f32, f32)) -> bool {
        let update = self.interaction.on_pointer_move(point);
        self.apply_update(update)
    }

    pub fn pointer_released(&mut self, point: (f32, f32)) -> bool {
        let update = self.interaction.on_release(point);
        self.apply_update(update)
    }

    pub fn pointer_left(&mut self) -> bool {
        let update = self.interaction.on_pointer_leave();
        self.apply_update(update)
    }

    /// Per-frame callback. Returns whether another frame is needed.
    pub fn tick(&mut self, dt: Duration) -> bool {
        if !self.interaction.is_animating() {
            return false;
        }
        let update = self.interaction.tick(dt);
        self.apply_update(update)
    }

    fn apply_update(&mut self, update: InteractionUpdate) -> bool {
        if update.repaint.is_empty() {
            return update.animating;
        }
        if let (Some(canvas), Some(composition)) = (self.canvas.as_mut(), self.composition.as_ref())
        {
            let interaction = &self.interaction;
            let dirty = repaint_shapes(
                canvas,
                composition,
                &update.repaint,
                |id| interaction.alpha_of(id),
                self.blend,
            );
            if dirty.is_some() {
                self.canvas_revision += 1;
            }
        }
        update.animating
    }
}
