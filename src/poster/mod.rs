pub mod animation;
pub mod canvas;
pub mod composer;
pub mod font;
pub mod input;
pub mod interaction;
pub mod model;
pub mod motif;
pub mod palette;
pub mod render;
pub mod rng;
pub mod save;
pub mod session;
pub mod settings;
pub mod settings_store;
pub mod shapes;
pub mod text_store;

pub use canvas::{BlendMode, RgbaCanvas};
pub use composer::{
    compose, ComposerConfig, Composition, CompositionStyle, GridGeometry, GridMode, TextOverlay,
};
pub use font::OverlayFont;
pub use input::{map_key_event, KeyCode, KeyEvent, KeyModifiers, PosterAction};
pub use interaction::{InteractionState, InteractionUpdate, Visibility};
pub use model::{Color, PixelRect, Shape, ShapeCatalogue, ShapeId, ShapeKind};
pub use motif::{Motif, MotifKind, SketchFrame};
pub use palette::{Palette, PaletteCatalogue};
pub use rng::SeededRng;
pub use save::{ExportSink, MemorySink, PngDirectorySink};
pub use session::{ActionOutcome, PosterSession};
pub use settings::PosterSettings;
pub use text_store::{JsonTextStore, MemoryTextStore, TextStore, CUSTOM_TEXT_KEY};
