use crate::poster::canvas::RgbaCanvas;
use anyhow::{anyhow, Context, Result};
use chrono::Local;
use image::{ColorType, ImageFormat};
use std::fs;
use std::path::{Path, PathBuf};

pub const POSTER_EXPORT_SUBDIR: &str = "poster_exports";
pub const DEFAULT_EXPORT_PREFIX: &str = "bauhaus_poster";

/// Destination for exported posters.
pub trait ExportSink {
    /// Writes `canvas` under `file_name` and returns where it landed.
    fn export(&mut self, canvas: &RgbaCanvas, file_name: &str) -> Result<PathBuf>;
}

pub fn exe_relative_output_folder_from_path(exe_path: &Path) -> Result<PathBuf> {
    let parent = exe_path
        .parent()
        .ok_or_else(|| anyhow!("executable path has no parent: {}", exe_path.display()))?;
    Ok(parent.join(POSTER_EXPORT_SUBDIR))
}

pub fn timestamped_stem(now: chrono::DateTime<Local>) -> String {
    now.format("%Y%m%d_%H%M%S").to_string()
}

pub fn build_filename(prefix: &str, stem: &str) -> String {
    format!("{}_{}.png", prefix, stem)
}

/// `<prefix>_YYYYMMDD_HHMMSS.png` for the given instant.
pub fn export_file_name(prefix: &str, now: chrono::DateTime<Local>) -> String {
    build_filename(prefix, &timestamped_stem(now))
}

/// Writes PNG files into one directory, creating it on first use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PngDirectorySink {
    dir: PathBuf,
}

impl PngDirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// `poster_exports/` next to the running executable.
    pub fn beside_executable() -> Result<Self> {
        let exe_path = std::env::current_exe().context("resolve current executable")?;
        Ok(Self::new(exe_relative_output_folder_from_path(&exe_path)?))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl ExportSink for PngDirectorySink {
    fn export(&mut self, canvas: &RgbaCanvas, file_name: &str) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("create poster output folder {}", self.dir.display()))?;
        let path = self.dir.join(file_name);
        image::save_buffer_with_format(
            &path,
            &canvas.pixels,
            canvas.width,
            canvas.height,
            ColorType::Rgba8,
            ImageFormat::Png,
        )
        .with_context(|| format!("write poster png {}", path.display()))?;
        Ok(path)
    }
}

/// Keeps exported canvases in memory; used for headless runs and tests.
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    pub exports: Vec<(String, RgbaCanvas)>,
}

impl ExportSink for MemorySink {
    fn export(&mut self, canvas: &RgbaCanvas, file_name: &str) -> Result<PathBuf> {
        self.exports.push((file_name.to_string(), canvas.clone()));
        Ok(PathBuf::from(file_name))
    }
}
