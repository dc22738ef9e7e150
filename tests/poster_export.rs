use bauhaus_poster::poster::settings_store;
use bauhaus_poster::poster::{
    JsonTextStore, PngDirectorySink, PosterSession, PosterSettings, TextStore, CUSTOM_TEXT_KEY,
};

#[test]
fn export_writes_png_with_canvas_dimensions() {
    let dir = tempfile::tempdir().expect("temp dir");
    let mut session = PosterSession::new(
        &PosterSettings::default(),
        Box::new(JsonTextStore::new(dir.path().join("text.json"))),
    );
    session.resize(320, 200);

    let mut sink = PngDirectorySink::new(dir.path().join("exports"));
    let path = session.export(&mut sink).expect("export").expect("path");
    assert!(path.starts_with(dir.path().join("exports")));

    let decoded = image::open(&path).expect("decode png").to_rgba8();
    assert_eq!(decoded.dimensions(), (320, 200));
    let canvas = session.canvas().unwrap();
    assert_eq!(decoded.as_raw(), &canvas.pixels);
}

#[test]
fn export_prefix_comes_from_settings() {
    let dir = tempfile::tempdir().expect("temp dir");
    let settings = PosterSettings {
        export_prefix: "bauhaus".into(),
        ..PosterSettings::default()
    };
    let mut session = PosterSession::new(
        &settings,
        Box::new(JsonTextStore::new(dir.path().join("text.json"))),
    );
    session.resize(120, 120);
    let mut sink = PngDirectorySink::new(dir.path());
    let path = session.export(&mut sink).unwrap().unwrap();
    let name = path.file_name().unwrap().to_string_lossy().into_owned();
    assert!(name.starts_with("bauhaus_2"), "{name}");
}

#[test]
fn edited_text_persists_across_sessions() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("poster_text.json");

    let mut first = PosterSession::new(
        &PosterSettings::default(),
        Box::new(JsonTextStore::new(&path)),
    );
    first.resize(200, 200);
    first.apply_text_edit(Some("bauhaus dessau".into())).unwrap();

    let store = JsonTextStore::new(&path);
    assert_eq!(
        store.get(CUSTOM_TEXT_KEY).unwrap().as_deref(),
        Some("BAUHAUS DESSAU")
    );
    let second = PosterSession::new(&PosterSettings::default(), Box::new(store));
    assert_eq!(second.text(), "BAUHAUS DESSAU");
}

#[test]
fn unwritable_store_reports_error_but_keeps_text() {
    let dir = tempfile::tempdir().expect("temp dir");
    // A directory where the file should be makes every write fail.
    let path = dir.path().join("blocked");
    std::fs::create_dir_all(&path).unwrap();

    let mut session =
        PosterSession::new(&PosterSettings::default(), Box::new(JsonTextStore::new(&path)));
    session.resize(200, 200);
    let err = session.apply_text_edit(Some("ulm".into())).unwrap_err();
    assert!(format!("{err:#}").contains("persist overlay text"));
    assert_eq!(session.text(), "ULM");
    assert_eq!(session.redraw_count(), 2);
}

#[test]
fn settings_file_drives_the_session() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join(settings_store::POSTER_SETTINGS_FILE_NAME);
    std::fs::write(
        &path,
        r#"{"initial_seed":99,"initial_palette":5,"default_text":"ULM",
            "grid":{"kind":"fixed","cell_size":50,"density":0.5}}"#,
    )
    .unwrap();

    let settings = settings_store::load_from_path(&path).unwrap();
    let mut session = PosterSession::new(
        &settings,
        Box::new(JsonTextStore::new(dir.path().join("text.json"))),
    );
    session.resize(500, 300);
    let comp = session.composition().unwrap();
    assert_eq!(session.seed(), 99);
    assert_eq!(session.palette_index(), 5);
    assert_eq!(session.text(), "ULM");
    assert_eq!((comp.geometry.cols, comp.geometry.rows), (10, 6));
}
