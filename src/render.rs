//! Rendering engine seam
//!
//! Pixel-level rendering (IFS sampling, density estimation, filtering) belongs to
//! an external engine. This module defines the contract with it: a serialized
//! genome plus output size and quality go in, an 8-bit pixel buffer comes out.
//! Bounding-box estimation for [`reframe`] goes through the same kind of seam.

use crate::flame::Flame;
use crate::parser::{self, ParseError};
use thiserror::Error;
use tracing::debug;

/// Relative precision asked of a bounds estimator.
const BOUNDS_EPS: f64 = 0.01;
/// Samples drawn when estimating bounds.
const BOUNDS_SAMPLES: usize = 10_000;

/// Error type for render requests
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("render size must be non-zero, got {width}x{height}")]
    ZeroSize { width: u32, height: u32 },
    #[error("renderer returned {found} bytes, expected {expected}")]
    BufferSize { expected: usize, found: usize },
    #[error("renderer failed: {0}")]
    Engine(String),
    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// Axis-aligned box in logical coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: (f64, f64),
    pub max: (f64, f64),
}

impl Bounds {
    pub fn center(&self) -> (f64, f64) {
        ((self.min.0 + self.max.0) / 2.0, (self.min.1 + self.max.1) / 2.0)
    }

    /// `(width, height)` of the box.
    pub fn extent(&self) -> (f64, f64) {
        (self.max.0 - self.min.0, self.max.1 - self.min.1)
    }
}

/// Engine options passed through untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderOptions {
    /// Ask for an alpha channel (RGBA instead of RGB).
    pub transparent: bool,
    /// Engine-specific numeric parameters.
    pub params: Vec<(String, f64)>,
}

impl RenderOptions {
    pub fn channels(&self) -> u8 {
        if self.transparent {
            4
        } else {
            3
        }
    }
}

/// What the engine is asked to render.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderRequest<'a> {
    /// Serialized genome, with its size already set to the output size.
    pub genome: String,
    pub width: u32,
    pub height: u32,
    pub quality: f64,
    pub options: &'a RenderOptions,
}

/// Row-major 8-bit pixels, `channels` bytes per pixel.
#[derive(Debug, Clone, PartialEq)]
pub struct PixelBuffer {
    pub width: u32,
    pub height: u32,
    pub channels: u8,
    pub data: Vec<u8>,
}

impl PixelBuffer {
    pub fn expected_len(width: u32, height: u32, channels: u8) -> usize {
        width as usize * height as usize * channels as usize
    }
}

/// An external rendering engine.
pub trait Renderer {
    fn render(&self, request: &RenderRequest<'_>) -> Result<PixelBuffer, RenderError>;
}

/// An external estimator of the attractor's extent.
pub trait BoundsEstimator {
    fn estimate(&self, genome: &str, eps: f64, samples: usize) -> Bounds;
}

/// Render `flame` at `size` pixels.
///
/// The flame's zoom is kept relative to the image width, so the rendered view is
/// the same whatever the output size.
pub fn render_flame(
    renderer: &dyn Renderer,
    flame: &Flame,
    size: (u32, u32),
    quality: f64,
    options: &RenderOptions,
) -> Result<PixelBuffer, RenderError> {
    let (width, height) = size;
    if width == 0 || height == 0 {
        return Err(RenderError::ZeroSize { width, height });
    }
    let mut job = flame.clone();
    job.size = size;
    let request = RenderRequest { genome: job.to_string(), width, height, quality, options };
    debug!(name = %flame.name, width, height, quality, "render request");

    let buffer = renderer.render(&request)?;
    let expected = PixelBuffer::expected_len(width, height, options.channels());
    if buffer.data.len() != expected || buffer.width != width || buffer.height != height {
        return Err(RenderError::BufferSize { expected, found: buffer.data.len() });
    }
    Ok(buffer)
}

/// Render a genome given as text. Legacy documents are migrated first.
pub fn render_text(
    renderer: &dyn Renderer,
    text: &str,
    size: (u32, u32),
    quality: f64,
    options: &RenderOptions,
) -> Result<PixelBuffer, RenderError> {
    let flame = parser::parse_flame(text)?;
    render_flame(renderer, &flame, size, quality, options)
}

/// Fit the flame's view to its attractor using an external estimator.
pub fn reframe(flame: &mut Flame, estimator: &dyn BoundsEstimator) {
    let bounds = estimator.estimate(&flame.to_string(), BOUNDS_EPS, BOUNDS_SAMPLES);
    flame.reframe(&bounds);
}
