//! File output: palette previews and flame files

use crate::flame::Flame;
use crate::fmt::write_flames;
use crate::palette::Palette;
use image::RgbImage;
use std::io;
use std::path::Path;
use tracing::debug;

/// Error type for output operations
#[derive(Debug)]
pub enum OutputError {
    /// IO error during file operations
    Io(io::Error),
    /// Image encoding error
    Image(image::ImageError),
}

impl std::fmt::Display for OutputError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputError::Io(e) => write!(f, "IO error: {}", e),
            OutputError::Image(e) => write!(f, "Image error: {}", e),
        }
    }
}

impl std::error::Error for OutputError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            OutputError::Io(e) => Some(e),
            OutputError::Image(e) => Some(e),
        }
    }
}

impl From<io::Error> for OutputError {
    fn from(e: io::Error) -> Self {
        OutputError::Io(e)
    }
}

impl From<image::ImageError> for OutputError {
    fn from(e: image::ImageError) -> Self {
        OutputError::Image(e)
    }
}

fn create_parent_dirs(path: &Path) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

/// A 256-pixel-wide strip showing the palette left to right.
pub fn palette_strip(palette: &Palette, height: u32) -> RgbImage {
    RgbImage::from_fn(palette.len() as u32, height.max(1), |x, _| image::Rgb(palette[x as usize]))
}

/// Save a palette preview strip to a PNG file.
pub fn save_palette_png(palette: &Palette, height: u32, path: &Path) -> Result<(), OutputError> {
    create_parent_dirs(path)?;
    palette_strip(palette, height).save(path)?;
    Ok(())
}

/// Write flames to a `<flames>` file.
///
/// An existing `.flame` file is first copied next to itself with a `.bak`
/// extension when `backup` is set. Parent directories are created as needed.
pub fn save_flames(path: &Path, flames: &[Flame], backup: bool) -> Result<(), OutputError> {
    let is_flame_file = path.extension().is_some_and(|e| e == "flame");
    if backup && is_flame_file && path.exists() {
        let bak = path.with_extension("bak");
        std::fs::copy(path, &bak)?;
        debug!(from = %path.display(), to = %bak.display(), "backed up flame file");
    }
    create_parent_dirs(path)?;
    std::fs::write(path, write_flames(flames))?;
    Ok(())
}
