#[cfg(feature = "png")]
pub mod raster;

use orbit_layout::{Scene, SvgSurface};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DrawError {
    #[error("Unsupported output format '{0}', expected .svg or .png")]
    UnsupportedFormat(String),
    #[cfg(not(feature = "png"))]
    #[error("PNG output needs the `png` feature")]
    PngDisabled,
    #[error("Failed to format SVG")]
    Svg(#[from] std::fmt::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[cfg(feature = "png")]
    #[error("Cairo error: {0}")]
    Cairo(#[from] cairo::Error),
    #[cfg(feature = "png")]
    #[error("PNG encoding error: {0}")]
    Png(#[from] cairo::IoError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Svg,
    Png,
}

impl OutputFormat {
    pub fn from_path(path: &Path) -> Result<Self, DrawError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        match ext.as_str() {
            "svg" => Ok(Self::Svg),
            "png" => Ok(Self::Png),
            _ => Err(DrawError::UnsupportedFormat(ext)),
        }
    }
}

/// Options only raster output honors.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DrawOptions {
    /// Seconds since load. `None` draws the settled, unrotated state.
    pub elapsed_secs: Option<f64>,
}

pub fn write_scene(scene: &Scene, path: &Path, options: &DrawOptions) -> Result<(), DrawError> {
    match OutputFormat::from_path(path)? {
        OutputFormat::Svg => {
            let svg = SvgSurface::render(scene)?;
            fs_err::write(path, svg)?;
            Ok(())
        }
        OutputFormat::Png => write_png(scene, path, options),
    }
}

#[cfg(feature = "png")]
fn write_png(scene: &Scene, path: &Path, options: &DrawOptions) -> Result<(), DrawError> {
    let surface = raster::render(scene, options)?;
    let mut file = fs_err::File::create(path)?;
    surface.write_to_png(&mut file)?;
    Ok(())
}

#[cfg(not(feature = "png"))]
fn write_png(_scene: &Scene, _path: &Path, _options: &DrawOptions) -> Result<(), DrawError> {
    Err(DrawError::PngDisabled)
}
