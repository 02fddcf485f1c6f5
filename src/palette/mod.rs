//! 256-entry color palettes
//!
//! A [`Palette`] is always exactly 256 RGB byte triples. Every construction path
//! (document parsing, gradient synthesis, image extraction) either yields 256
//! entries or fails.
//!
//! Editing operations work in HLS space and round back to the nearest byte.

mod gradient;
mod optimize;

pub use gradient::{Curve, RandomGradient};
pub use optimize::{PaletteOptimizer, SmoothingOptimizer};

use crate::geometry::{clip, hls_to_rgb, rgb_to_hls, to_byte, wrap_unit, Rgb};
use regex::Regex;
use std::sync::OnceLock;
use thiserror::Error;

/// Number of entries in every palette.
pub const PALETTE_SIZE: usize = 256;

/// Palette construction and editing errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PaletteError {
    #[error("unknown interpolation curve '{0}' (expected 'lin' or 'cos')")]
    UnknownCurve(String),
    #[error("split distance {0} is wider than half the palette (128)")]
    SplitTooWide(usize),
    #[error("at least one seed color is required")]
    NoSeeds,
    #[error("image of {width}x{height} pixels with {len} bytes cannot be sampled")]
    ImageTooSmall { width: u32, height: u32, len: usize },
    #[error("palette needs exactly 256 entries, got {0}")]
    WrongLength(usize),
}

/// A fixed table of 256 RGB colors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    colors: [Rgb; PALETTE_SIZE],
}

impl Default for Palette {
    fn default() -> Self {
        Self { colors: [[0, 0, 0]; PALETTE_SIZE] }
    }
}

fn hex_pair_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)[a-f0-9]{2}").expect("valid regex"))
}

impl Palette {
    /// Build from a list of entries, which must hold exactly 256 colors.
    pub fn from_entries(entries: Vec<Rgb>) -> Result<Self, PaletteError> {
        let colors: [Rgb; PALETTE_SIZE] =
            entries.try_into().map_err(|v: Vec<Rgb>| PaletteError::WrongLength(v.len()))?;
        Ok(Self { colors })
    }

    /// Build from floating point channels (`0.0..=255.0`), rounding each to a byte.
    pub fn from_channels(entries: &[[f64; 3]]) -> Result<Self, PaletteError> {
        Self::from_entries(entries.iter().map(|c| c.map(to_byte)).collect())
    }

    /// Decode the body of an Apophysis-style `<palette>` block: a run of hex
    /// pairs, three per color. Whitespace and line breaks are ignored.
    ///
    /// # Examples
    ///
    /// ```
    /// use flamekit::palette::Palette;
    ///
    /// let entries = Palette::decode_hex("FF0000 00ff00\n0000FF");
    /// assert_eq!(entries, vec![[255, 0, 0], [0, 255, 0], [0, 0, 255]]);
    /// ```
    pub fn decode_hex(text: &str) -> Vec<Rgb> {
        let bytes: Vec<u8> = hex_pair_regex()
            .find_iter(text)
            .filter_map(|m| u8::from_str_radix(m.as_str(), 16).ok())
            .collect();
        bytes.chunks_exact(3).map(|c| [c[0], c[1], c[2]]).collect()
    }

    pub fn colors(&self) -> &[Rgb; PALETTE_SIZE] {
        &self.colors
    }

    /// Always [`PALETTE_SIZE`].
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn get(&self, index: usize) -> Option<Rgb> {
        self.colors.get(index).copied()
    }

    pub fn set(&mut self, index: usize, color: Rgb) {
        if let Some(slot) = self.colors.get_mut(index) {
            *slot = color;
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Rgb> {
        self.colors.iter()
    }

    /// The 256 `<color index="i" rgb="r g b"/>` lines of a genome document.
    pub fn to_color_elements(&self) -> String {
        self.colors
            .iter()
            .enumerate()
            .map(|(i, [r, g, b])| format!("   <color index=\"{}\" rgb=\"{} {} {}\"/>\n", i, r, g, b))
            .collect()
    }

    /// Hex serialization: 32 rows of 8 colors.
    pub fn hex_block(&self) -> String {
        self.colors
            .chunks(8)
            .map(|row| {
                let line: String = row.iter().map(|[r, g, b]| format!("{:02X}{:02X}{:02X}", r, g, b)).collect();
                format!("      {}\n", line)
            })
            .collect()
    }

    fn map_hls(&mut self, f: impl Fn((f64, f64, f64)) -> (f64, f64, f64)) {
        for color in self.colors.iter_mut() {
            *color = hls_to_rgb(f(rgb_to_hls(*color))).map(to_byte);
        }
    }

    /// Rotate every hue by `degrees` around the color wheel.
    pub fn hue(&mut self, degrees: f64) {
        let delta = degrees / 360.0;
        self.map_hls(|(h, l, s)| (wrap_unit(h + delta), l, s));
    }

    /// Shift saturation by `percent` points, clamped into range.
    pub fn saturation(&mut self, percent: f64) {
        let delta = percent / 100.0;
        self.map_hls(|(h, l, s)| (h, l, clip(s + delta, 0.0, 1.0)));
    }

    /// Shift lightness by `percent` points, clamped into range.
    pub fn brightness(&mut self, percent: f64) {
        let delta = percent / 100.0;
        self.map_hls(|(h, l, s)| (h, clip(l + delta, 0.0, 1.0), s));
    }

    pub fn reverse(&mut self) {
        self.colors.reverse();
    }

    /// Cyclic shift: entry `i` moves to `i + k`. Negative `k` shifts the other way.
    pub fn rotate(&mut self, k: isize) {
        let shift = k.rem_euclid(PALETTE_SIZE as isize) as usize;
        self.colors.rotate_right(shift);
    }

    pub fn invert(&mut self) {
        for color in self.colors.iter_mut() {
            *color = color.map(|c| 255 - c);
        }
    }
}

impl std::ops::Index<usize> for Palette {
    type Output = Rgb;

    fn index(&self, index: usize) -> &Rgb {
        &self.colors[index]
    }
}
