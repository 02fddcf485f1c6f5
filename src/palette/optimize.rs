//! Image-driven palettes
//!
//! [`Palette::from_image`] samples 256 random pixels and hands them to a
//! [`PaletteOptimizer`], which orders (or otherwise refines) them into a palette.

use super::{Palette, PaletteError, PALETTE_SIZE};
use rand::seq::SliceRandom;
use rand::{Rng, RngCore};

/// Turns 256 sampled colors into 256 palette colors.
pub trait PaletteOptimizer {
    fn improve(&self, samples: &[[f64; 3]], rng: &mut dyn RngCore) -> Vec<[f64; 3]>;
}

/// Orders samples so neighbouring entries are close in color.
///
/// Runs `num_tries` random restarts; each one shuffles the samples and then
/// attempts `try_size` random swaps, keeping a swap when it lowers the summed
/// distance between adjacent entries. The best ordering over all restarts wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SmoothingOptimizer {
    pub num_tries: usize,
    pub try_size: usize,
}

impl Default for SmoothingOptimizer {
    fn default() -> Self {
        Self { num_tries: 50, try_size: 1000 }
    }
}

fn distance(a: &[f64; 3], b: &[f64; 3]) -> f64 {
    ((a[0] - b[0]).powi(2) + (a[1] - b[1]).powi(2) + (a[2] - b[2]).powi(2)).sqrt()
}

fn total_cost(colors: &[[f64; 3]]) -> f64 {
    colors.windows(2).map(|w| distance(&w[0], &w[1])).sum()
}

/// Cost of the edges touching positions `i` and `j`.
fn local_cost(colors: &[[f64; 3]], i: usize, j: usize) -> f64 {
    let mut edges = vec![];
    for p in [i, j] {
        if p > 0 {
            edges.push((p - 1, p));
        }
        if p + 1 < colors.len() {
            edges.push((p, p + 1));
        }
    }
    edges.sort_unstable();
    edges.dedup();
    edges.iter().map(|(a, b)| distance(&colors[*a], &colors[*b])).sum()
}

impl SmoothingOptimizer {
    fn refine(&self, colors: &mut [[f64; 3]], rng: &mut dyn RngCore) {
        let n = colors.len();
        if n < 2 {
            return;
        }
        for _ in 0..self.try_size {
            let i = rng.gen_range(0..n);
            let j = rng.gen_range(0..n);
            if i == j {
                continue;
            }
            let before = local_cost(colors, i, j);
            colors.swap(i, j);
            if local_cost(colors, i, j) >= before {
                colors.swap(i, j);
            }
        }
    }
}

impl PaletteOptimizer for SmoothingOptimizer {
    fn improve(&self, samples: &[[f64; 3]], rng: &mut dyn RngCore) -> Vec<[f64; 3]> {
        let mut best = samples.to_vec();
        let mut best_cost = total_cost(&best);
        for _ in 0..self.num_tries {
            let mut candidate = samples.to_vec();
            candidate.shuffle(rng);
            self.refine(&mut candidate, rng);
            let cost = total_cost(&candidate);
            if cost < best_cost {
                best = candidate;
                best_cost = cost;
            }
        }
        best
    }
}

impl Palette {
    /// Build a palette from an RGB8 image buffer (`width * height * 3` bytes,
    /// row-major).
    pub fn from_image(
        pixels: &[u8],
        width: u32,
        height: u32,
        optimizer: &dyn PaletteOptimizer,
        rng: &mut dyn RngCore,
    ) -> Result<Palette, PaletteError> {
        let needed = width as usize * height as usize * 3;
        if width == 0 || height == 0 || pixels.len() < needed {
            return Err(PaletteError::ImageTooSmall { width, height, len: pixels.len() });
        }
        let samples: Vec<[f64; 3]> = (0..PALETTE_SIZE)
            .map(|_| {
                let x = rng.gen_range(0..width) as usize;
                let y = rng.gen_range(0..height) as usize;
                let idx = 3 * (x + width as usize * y);
                [pixels[idx] as f64, pixels[idx + 1] as f64, pixels[idx + 2] as f64]
            })
            .collect();
        Palette::from_channels(&optimizer.improve(&samples, rng))
    }
}
