use crate::poster::model::Color;
use serde::{Deserialize, Serialize};

pub const DEFAULT_BACKGROUND: Color = Color::hex(0xE8E8E8);
pub const FALLBACK_COLOR: Color = Color::BLACK;
pub const SKETCH_BACKGROUND: Color = Color::rgb(248, 248, 248);
/// Motif bands are translucent so crossings show through.
pub const SKETCH_ALPHA: u8 = 220;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Palette {
    #[serde(default)]
    pub background: Option<Color>,
    #[serde(default)]
    pub colors: Vec<Color>,
}

impl Palette {
    fn from_hex(background: u32, colors: &[u32]) -> Self {
        Self {
            background: Some(Color::hex(background)),
            colors: colors.iter().copied().map(Color::hex).collect(),
        }
    }

    pub fn background(&self) -> Color {
        self.background.unwrap_or(DEFAULT_BACKGROUND)
    }

    /// Colour `k`, wrapping over the list. An empty list yields black.
    pub fn color_at(&self, k: usize) -> Color {
        if self.colors.is_empty() {
            return FALLBACK_COLOR;
        }
        self.colors[k % self.colors.len()]
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaletteCatalogue {
    entries: Vec<Palette>,
    fallback: Palette,
}

impl PaletteCatalogue {
    pub fn builtin() -> Self {
        Self::from_entries(builtin_palettes())
    }

    /// Five-colour sets for the motif style, all on the same light ground.
    pub fn sketch() -> Self {
        Self::from_entries(sketch_palettes())
    }

    pub fn from_entries(entries: Vec<Palette>) -> Self {
        Self {
            entries,
            fallback: Palette {
                background: Some(DEFAULT_BACKGROUND),
                colors: vec![FALLBACK_COLOR],
            },
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Any index resolves: it wraps modulo the catalogue length, negatives included.
    pub fn palette_at(&self, index: i64) -> &Palette {
        if self.entries.is_empty() {
            return &self.fallback;
        }
        let idx = index.rem_euclid(self.entries.len() as i64) as usize;
        &self.entries[idx]
    }
}

impl Default for PaletteCatalogue {
    fn default() -> Self {
        Self::builtin()
    }
}

fn builtin_palettes() -> Vec<Palette> {
    vec![
        // primaries on light grey
        Palette::from_hex(
            0xE8E8E8,
            &[0xFF0000, 0x0066CC, 0xFFD700, 0x000000, 0xFFFFFF, 0x32CD32, 0xFF7F00],
        ),
        // blue and violet on navy
        Palette::from_hex(
            0x2E3A5F,
            &[0x4A90E2, 0x6A7FDB, 0x8B5CF6, 0xA855F7, 0x3B82F6, 0x60A5FA, 0xFFFFFF],
        ),
        // vibrant
        Palette::from_hex(
            0xFFFFFF,
            &[0xDC143C, 0x1E90FF, 0x32CD32, 0xFFD700, 0xFF7F00, 0x9370DB, 0x000000],
        ),
        // minimal
        Palette::from_hex(
            0xF8F8F8,
            &[0x000000, 0xFF0000, 0x0000FF, 0xFFFF00, 0xFFFFFF, 0x808080, 0x696969],
        ),
        // ocean
        Palette::from_hex(
            0xE0F6FF,
            &[0x006994, 0x87CEEB, 0x4682B4, 0x191970, 0xFFFFFF, 0x20B2AA, 0xFFD700],
        ),
        // autumn
        Palette::from_hex(
            0xFFF8DC,
            &[0xFF7F00, 0xDAA520, 0xB22222, 0x8B4513, 0xFFFFFF, 0x2F4F4F, 0x32CD32],
        ),
        // night
        Palette::from_hex(
            0x2C2C2C,
            &[0xFFD700, 0xFF6347, 0x87CEEB, 0x9370DB, 0xFFFFFF, 0x32CD32, 0xFF7F00],
        ),
        // spring
        Palette::from_hex(
            0xF0FFF0,
            &[0x32CD32, 0x00CED1, 0xFF69B4, 0xFFD700, 0xFFFFFF, 0x9370DB, 0x000000],
        ),
    ]
}

fn sketch_palettes() -> Vec<Palette> {
    let sets: [[u32; 5]; 8] = [
        [0xFF0000, 0x0000FF, 0xFFFF00, 0x000000, 0xFFFFFF],
        // Kandinsky
        [0xDC143C, 0x4169E1, 0xFFD700, 0x228B22, 0x9370DB],
        // Klee
        [0xB22222, 0x4682B4, 0xDAA520, 0x2F4F4F, 0xDDA0DD],
        // Itten
        [0xFF4500, 0x1E90FF, 0x32CD32, 0x8B0000, 0x4B0082],
        [0xDC143C, 0x000000, 0xFFFFFF, 0x696969, 0xFF6347],
        // De Stijl
        [0xFF0000, 0x0000FF, 0xFFFF00, 0x000000, 0xC0C0C0],
        [0x2F2F2F, 0xE74C3C, 0xF39C12, 0xFFFFFF, 0x95A5A6],
        [0x1C1C1C, 0x3D3D3D, 0x5E5E5E, 0x808080, 0xA1A1A1],
    ];
    sets.iter()
        .map(|set| Palette {
            background: Some(SKETCH_BACKGROUND),
            colors: set
                .iter()
                .map(|&value| Color {
                    a: SKETCH_ALPHA,
                    ..Color::hex(value)
                })
                .collect(),
        })
        .collect()
}
