//! File boundary for the commands: images and JSON in, images and JSON out.

use std::path::Path;

use anyhow::Context;
use dwell_core::{DesignImage, SpatialModel};
use serde::Serialize;

/// Read an image file, accepting raw raster bytes or a text file holding a
/// `data:` URL.
pub fn read_image(path: &Path) -> anyhow::Result<DesignImage> {
    let bytes = std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;

    if let Ok(text) = std::str::from_utf8(&bytes)
        && text.trim_start().starts_with("data:")
    {
        return DesignImage::from_data_url(text.trim())
            .with_context(|| format!("{} holds a malformed data URL", path.display()));
    }

    DesignImage::from_bytes(&bytes).with_context(|| format!("unsupported image {}", path.display()))
}

/// Read a spatial model previously written by `dwell analyze`.
pub fn read_model(path: &Path) -> anyhow::Result<SpatialModel> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("{} is not a spatial model", path.display()))
}

/// Decode and write an image, creating parent directories as needed.
pub fn write_image(path: &Path, image: &DesignImage) -> anyhow::Result<()> {
    let bytes = image.decode().context("backend returned an undecodable image")?;
    ensure_parent(path)?;
    std::fs::write(path, bytes).with_context(|| format!("failed to write {}", path.display()))
}

/// Write a value as pretty JSON, creating parent directories as needed.
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    ensure_parent(path)?;
    std::fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))
}

/// File extension matching an image's MIME type.
pub fn extension(image: &DesignImage) -> &'static str {
    image.format().map_or("bin", |format| format.extension())
}

fn ensure_parent(path: &Path) -> anyhow::Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display())),
        _ => Ok(()),
    }
}
