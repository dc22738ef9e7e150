use crate::poster::animation::{FadeTiming, DEFAULT_CLICK_STEP};
use crate::poster::composer::{
    ComposerConfig, CompositionStyle, GridMode, DEFAULT_DENSITY, DEFAULT_FONT_SIZE,
    DEFAULT_TEXT_MARGIN, DEFAULT_TEXT_PADDING, DEFAULT_TEXT_PROBABILITY,
};
use crate::poster::font::MAX_FONT_SIZE;
use crate::poster::model::ShapeCatalogue;
use crate::poster::palette::{Palette, PaletteCatalogue};
use crate::poster::save::DEFAULT_EXPORT_PREFIX;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_SEED: i64 = 12345;
pub const DEFAULT_TEXT: &str = "BAUHAUS";
pub const DEFAULT_MAX_TEXT_LEN: usize = 30;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PosterSettings {
    #[serde(default = "default_initial_seed")]
    pub initial_seed: i64,
    #[serde(default)]
    pub initial_palette: i64,
    #[serde(default = "default_text")]
    pub default_text: String,
    #[serde(default = "default_max_text_len")]
    pub max_text_len: usize,
    #[serde(default)]
    pub style: CompositionStyle,
    #[serde(default)]
    pub grid: GridMode,
    #[serde(default)]
    pub catalogue: ShapeCatalogue,
    #[serde(default = "default_text_probability")]
    pub text_probability: f64,
    #[serde(default = "default_text_margin")]
    pub text_margin: f64,
    #[serde(default = "default_text_padding")]
    pub text_padding: f64,
    #[serde(default = "default_font_size")]
    pub font_size: f32,
    #[serde(default = "default_click_fade_step")]
    pub click_fade_step: f32,
    #[serde(default = "default_hover_fade_ms")]
    pub hover_fade_ms: u64,
    #[serde(default = "default_hover_hold_ms")]
    pub hover_hold_ms: u64,
    #[serde(default = "default_export_prefix")]
    pub export_prefix: String,
    /// Replaces the built-in palettes when present.
    #[serde(default)]
    pub palettes: Option<Vec<Palette>>,
    #[serde(default)]
    pub debug_logging: bool,
    #[serde(default)]
    pub log_file: Option<PathBuf>,
}

fn default_initial_seed() -> i64 {
    DEFAULT_SEED
}

fn default_text() -> String {
    DEFAULT_TEXT.to_string()
}

fn default_max_text_len() -> usize {
    DEFAULT_MAX_TEXT_LEN
}

fn default_text_probability() -> f64 {
    DEFAULT_TEXT_PROBABILITY
}

fn default_text_margin() -> f64 {
    DEFAULT_TEXT_MARGIN
}

fn default_text_padding() -> f64 {
    DEFAULT_TEXT_PADDING
}

fn default_font_size() -> f32 {
    DEFAULT_FONT_SIZE
}

fn default_click_fade_step() -> f32 {
    DEFAULT_CLICK_STEP
}

fn default_hover_fade_ms() -> u64 {
    1000
}

fn default_hover_hold_ms() -> u64 {
    3000
}

fn default_export_prefix() -> String {
    DEFAULT_EXPORT_PREFIX.to_string()
}

impl Default for PosterSettings {
    fn default() -> Self {
        Self {
            initial_seed: default_initial_seed(),
            initial_palette: 0,
            default_text: default_text(),
            max_text_len: default_max_text_len(),
            style: CompositionStyle::default(),
            grid: GridMode::default(),
            catalogue: ShapeCatalogue::default(),
            text_probability: default_text_probability(),
            text_margin: default_text_margin(),
            text_padding: default_text_padding(),
            font_size: default_font_size(),
            click_fade_step: default_click_fade_step(),
            hover_fade_ms: default_hover_fade_ms(),
            hover_hold_ms: default_hover_hold_ms(),
            export_prefix: default_export_prefix(),
            palettes: None,
            debug_logging: false,
            log_file: None,
        }
    }
}

fn unit_or(value: f64, fallback: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, 1.0)
    } else {
        fallback
    }
}

fn non_negative_or(value: f64, fallback: f64) -> f64 {
    if value.is_finite() {
        value.max(0.0)
    } else {
        fallback
    }
}

impl PosterSettings {
    /// Pulls hand-edited values back into ranges the composer can use.
    pub fn sanitize(&mut self) {
        self.grid = match self.grid {
            GridMode::Fixed { cell_size, density } => GridMode::Fixed {
                cell_size: cell_size.max(1),
                density: unit_or(density, DEFAULT_DENSITY),
            },
            GridMode::Randomized {
                cell_size_min,
                cell_size_max,
                density_min,
                density_max,
            } => {
                let lo = cell_size_min.max(1);
                let hi = cell_size_max.max(1);
                let dlo = unit_or(density_min, DEFAULT_DENSITY);
                let dhi = unit_or(density_max, DEFAULT_DENSITY);
                GridMode::Randomized {
                    cell_size_min: lo.min(hi),
                    cell_size_max: lo.max(hi),
                    density_min: dlo.min(dhi),
                    density_max: dlo.max(dhi),
                }
            }
        };
        self.max_text_len = self.max_text_len.max(1);
        self.text_probability = unit_or(self.text_probability, DEFAULT_TEXT_PROBABILITY);
        self.text_margin = non_negative_or(self.text_margin, DEFAULT_TEXT_MARGIN);
        self.text_padding = non_negative_or(self.text_padding, DEFAULT_TEXT_PADDING);
        if !self.font_size.is_finite() || self.font_size < 1.0 {
            self.font_size = DEFAULT_FONT_SIZE;
        }
        self.font_size = self.font_size.min(MAX_FONT_SIZE);
        if !self.click_fade_step.is_finite() || self.click_fade_step <= 0.0 {
            self.click_fade_step = DEFAULT_CLICK_STEP;
        }
        self.click_fade_step = self.click_fade_step.min(1.0);
        if self.export_prefix.trim().is_empty() {
            self.export_prefix = default_export_prefix();
        }
    }

    pub fn composer_config(&self) -> ComposerConfig {
        ComposerConfig {
            style: self.style,
            grid: self.grid,
            catalogue: self.catalogue,
            text_probability: self.text_probability,
            text_margin: self.text_margin,
            text_padding: self.text_padding,
            font_size: self.font_size,
        }
    }

    pub fn fade_timing(&self) -> FadeTiming {
        FadeTiming {
            click_step: self.click_fade_step,
            hover_fade: Duration::from_millis(self.hover_fade_ms),
            hover_hold: Duration::from_millis(self.hover_hold_ms),
        }
    }

    pub fn palette_catalogue(&self) -> PaletteCatalogue {
        match &self.palettes {
            Some(entries) => PaletteCatalogue::from_entries(entries.clone()),
            None => PaletteCatalogue::builtin(),
        }
    }
}
