use crate::poster::settings::PosterSettings;
use anyhow::{anyhow, Context, Result};
use std::path::{Path, PathBuf};

pub const POSTER_SETTINGS_FILE_NAME: &str = "poster_settings.json";

pub fn settings_path_from_exe_path(exe_path: &Path) -> Result<PathBuf> {
    let parent = exe_path
        .parent()
        .ok_or_else(|| anyhow!("executable path has no parent: {}", exe_path.display()))?;
    Ok(parent.join(POSTER_SETTINGS_FILE_NAME))
}

pub fn resolve_settings_path() -> Result<PathBuf> {
    let exe_path = std::env::current_exe().context("resolve current executable")?;
    settings_path_from_exe_path(&exe_path)
}

pub fn load() -> Result<PosterSettings> {
    load_from_path(&resolve_settings_path()?)
}

/// Missing or blank files give the defaults; anything else must parse.
pub fn load_from_path(path: &Path) -> Result<PosterSettings> {
    if !path.exists() {
        return Ok(PosterSettings::default());
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("read poster settings file {}", path.display()))?;

    if content.trim().is_empty() {
        return Ok(PosterSettings::default());
    }

    let mut loaded: PosterSettings = serde_json::from_str(&content)
        .with_context(|| format!("deserialize poster settings file {}", path.display()))?;
    loaded.sanitize();
    Ok(loaded)
}

pub fn save_to_path(path: &Path, settings: &PosterSettings) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create poster settings parent folder {}", parent.display()))?;
    }

    let mut sanitized = settings.clone();
    sanitized.sanitize();
    let json = serde_json::to_string_pretty(&sanitized).context("serialize poster settings")?;
    std::fs::write(path, json)
        .with_context(|| format!("write poster settings file {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::poster::composer::GridMode;
    use crate::poster::font::MAX_FONT_SIZE;

    #[test]
    fn settings_path_is_resolved_next_to_executable() {
        let exe = Path::new("/tmp/myapp/bin/bauhaus_poster");
        let path = settings_path_from_exe_path(exe).expect("path");
        assert_eq!(
            path,
            Path::new("/tmp/myapp/bin").join(POSTER_SETTINGS_FILE_NAME)
        );
    }

    #[test]
    fn missing_and_blank_files_load_defaults() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join(POSTER_SETTINGS_FILE_NAME);
        assert_eq!(load_from_path(&path).unwrap(), PosterSettings::default());

        std::fs::write(&path, "\n\t").unwrap();
        assert_eq!(load_from_path(&path).unwrap(), PosterSettings::default());
    }

    #[test]
    fn store_roundtrip_keeps_values() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("nested").join(POSTER_SETTINGS_FILE_NAME);
        let settings = PosterSettings {
            initial_seed: 42,
            initial_palette: 3,
            default_text: "ULM".into(),
            export_prefix: "bauhaus".into(),
            grid: GridMode::Fixed {
                cell_size: 80,
                density: 0.5,
            },
            ..PosterSettings::default()
        };

        save_to_path(&path, &settings).expect("save");
        assert_eq!(load_from_path(&path).expect("load"), settings);
    }

    #[test]
    fn load_sanitizes_hand_edited_values() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join(POSTER_SETTINGS_FILE_NAME);
        std::fs::write(
            &path,
            r#"{"grid":{"kind":"fixed","cell_size":0,"density":4.0},"max_text_len":0,"font_size":1e9}"#,
        )
        .unwrap();

        let loaded = load_from_path(&path).unwrap();
        assert_eq!(
            loaded.grid,
            GridMode::Fixed {
                cell_size: 1,
                density: 1.0,
            }
        );
        assert_eq!(loaded.max_text_len, 1);
        assert_eq!(loaded.font_size, MAX_FONT_SIZE);
    }

    #[test]
    fn malformed_file_reports_path() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join(POSTER_SETTINGS_FILE_NAME);
        std::fs::write(&path, "{ nope").unwrap();
        let err = load_from_path(&path).unwrap_err();
        assert!(format!("{err:#}").contains("deserialize poster settings file"));
    }
}
