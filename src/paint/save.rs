use crate::paint::raster::PixelCanvas;
use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Local};
use image::{ImageOutputFormat, RgbaImage};
use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};

pub const EXPORT_SUBDIR: &str = "paintings";
pub const EXPORT_NAME_PREFIX: &str = "Pollock No. ";

pub fn exe_relative_export_folder_from_path(exe_path: &Path) -> Result<PathBuf> {
    let parent = exe_path
        .parent()
        .ok_or_else(|| anyhow!("executable path has no parent: {}", exe_path.display()))?;
    Ok(parent.join(EXPORT_SUBDIR))
}

pub fn ensure_export_folder() -> Result<PathBuf> {
    let exe_path = std::env::current_exe().context("resolve current executable")?;
    let output = exe_relative_export_folder_from_path(&exe_path)?;
    fs::create_dir_all(&output)
        .with_context(|| format!("create export folder {}", output.display()))?;
    Ok(output)
}

/// `Pollock No. <unix millis>.png`
pub fn export_file_name(now: DateTime<Local>) -> String {
    format!("{EXPORT_NAME_PREFIX}{}.png", now.timestamp_millis())
}

pub fn to_rgba_image(canvas: &PixelCanvas) -> Result<RgbaImage> {
    let (width, height) = canvas.size();
    RgbaImage::from_raw(width, height, canvas.rgba_pixels().to_vec())
        .ok_or_else(|| anyhow!("pixel buffer does not match {width}x{height}"))
}

pub fn encode_png(canvas: &PixelCanvas) -> Result<Vec<u8>> {
    let img = to_rgba_image(canvas)?;
    let mut bytes = Cursor::new(Vec::new());
    img.write_to(&mut bytes, ImageOutputFormat::Png)
        .context("encode canvas as png")?;
    Ok(bytes.into_inner())
}

/// Writes the canvas into `dir` under a timestamped name and returns the path.
pub fn export_png(canvas: &PixelCanvas, dir: &Path, now: DateTime<Local>) -> Result<PathBuf> {
    fs::create_dir_all(dir).with_context(|| format!("create export folder {}", dir.display()))?;
    let path = dir.join(export_file_name(now));
    let img = to_rgba_image(canvas)?;
    img.save(&path)
        .with_context(|| format!("save painting to {}", path.display()))?;
    tracing::info!(path = %path.display(), "exported painting");
    Ok(path)
}
