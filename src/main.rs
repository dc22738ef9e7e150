use bauhaus_poster::gui::PosterApp;
use bauhaus_poster::logging;
use bauhaus_poster::poster::settings::PosterSettings;
use bauhaus_poster::poster::settings_store;
use bauhaus_poster::poster::{JsonTextStore, PngDirectorySink};

use eframe::egui;

fn main() -> anyhow::Result<()> {
    let (settings, load_error) = match settings_store::load() {
        Ok(settings) => (settings, None),
        Err(err) => (PosterSettings::default(), Some(err)),
    };
    logging::init(settings.debug_logging, settings.log_file.clone());
    if let Some(err) = load_error {
        tracing::warn!(error = ?err, "using default poster settings");
    }

    let store = JsonTextStore::beside_executable()?;
    let sink = PngDirectorySink::beside_executable()?;
    tracing::info!(exports = %sink.dir().display(), "starting poster viewer");

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1024.0, 768.0])
            .with_min_inner_size([320.0, 240.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Bauhaus Poster",
        native_options,
        Box::new(move |_cc| Box::new(PosterApp::new(&settings, Box::new(store), Box::new(sink)))),
    )
    .map_err(|err| anyhow::anyhow!("poster viewer failed: {err}"))
}
