//! Gradient synthesis from seed colors

use super::{Palette, PaletteError, PALETTE_SIZE};
use crate::geometry::{hls_to_rgb, hsv_to_rgb, rgb_to_hls, Rgb};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::str::FromStr;

/// Interpolation easing between two gradient stops.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Curve {
    /// Constant speed
    #[serde(rename = "lin")]
    Linear,
    /// Slow at both stops
    #[default]
    #[serde(rename = "cos")]
    Cosine,
}

impl Curve {
    /// Blend from `a` to `b` at position `t` in `[0, 1)`.
    pub fn blend(self, a: f64, b: f64, t: f64) -> f64 {
        let t = match self {
            Curve::Linear => t,
            Curve::Cosine => (1.0 - (PI * t).cos()) / 2.0,
        };
        a + (b - a) * t
    }

    fn blend3(self, a: [f64; 3], b: [f64; 3], t: f64) -> [f64; 3] {
        [self.blend(a[0], b[0], t), self.blend(a[1], b[1], t), self.blend(a[2], b[2], t)]
    }
}

impl FromStr for Curve {
    type Err = PaletteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "lin" => Ok(Curve::Linear),
            "cos" => Ok(Curve::Cosine),
            other => Err(PaletteError::UnknownCurve(other.to_string())),
        }
    }
}

/// Append `len` blended stops from `from` towards `to`, excluding `to` itself.
fn run(out: &mut Vec<[f64; 3]>, from: [f64; 3], to: [f64; 3], len: usize, curve: Curve) {
    for i in 0..len {
        out.push(curve.blend3(from, to, i as f64 / len as f64));
    }
}

impl Palette {
    /// Gradient around a seed color and its complement.
    ///
    /// The palette is built from four runs: complement to left split (`dist`
    /// entries), left split to seed and seed to right split (`128 - dist` each),
    /// right split back to the complement (`dist`). The splits sit `split` degrees
    /// either side of the seed hue; the complement is offset from the opposite
    /// hue by `complementary_split` degrees.
    pub fn from_seed(
        seed: Rgb,
        complementary_split: f64,
        split: f64,
        dist: usize,
        curve: Curve,
    ) -> Result<Palette, PaletteError> {
        if dist > PALETTE_SIZE / 2 {
            return Err(PaletteError::SplitTooWide(dist));
        }
        let (h, l, s) = rgb_to_hls(seed);
        let split = split / 360.0;
        let complementary_split = complementary_split / 360.0;
        let comp = hls_to_rgb((h + complementary_split + 0.5, l, s));
        let lspl = hls_to_rgb((h - split, l, s));
        let rspl = hls_to_rgb((h + split, l, s));
        let seed = seed.map(f64::from);
        let inner = PALETTE_SIZE / 2 - dist;

        let mut gen = Vec::with_capacity(PALETTE_SIZE);
        run(&mut gen, comp, lspl, dist, curve);
        run(&mut gen, lspl, seed, inner, curve);
        run(&mut gen, seed, rspl, inner, curve);
        run(&mut gen, rspl, comp, dist, curve);
        Palette::from_channels(&gen)
    }

    /// Cyclic gradient through `seeds`, given as `(hue, saturation, value)`.
    ///
    /// The 256 entries are split into one arc per seed, as evenly as possible
    /// (the first `256 % n` arcs get one extra entry). Arc `i` blends from the
    /// previous seed to seed `i`, so the gradient wraps back to its start.
    pub fn from_seeds(seeds: &[(f64, f64, f64)], curve: Curve) -> Result<Palette, PaletteError> {
        if seeds.is_empty() {
            return Err(PaletteError::NoSeeds);
        }
        let n = seeds.len();
        let base = PALETTE_SIZE / n;
        let extra = PALETTE_SIZE % n;

        let mut gen = Vec::with_capacity(PALETTE_SIZE);
        for i in 0..n {
            let len = if i < extra { base + 1 } else { base };
            let (h0, s0, v0) = seeds[(i + n - 1) % n];
            let (h1, s1, v1) = seeds[i];
            for j in 0..len {
                let t = j as f64 / len as f64;
                let [h, s, v] = curve.blend3([h0, s0, v0], [h1, s1, v1], t);
                gen.push(hsv_to_rgb((h, s, v)));
            }
        }
        Palette::from_channels(&gen)
    }

    /// A random multi-seed gradient.
    pub fn random(options: &RandomGradient, rng: &mut impl Rng) -> Result<Palette, PaletteError> {
        options.generate(rng)
    }
}

/// Ranges for [`Palette::random`].
#[derive(Debug, Clone, PartialEq)]
pub struct RandomGradient {
    pub hue: (f64, f64),
    pub saturation: (f64, f64),
    pub value: (f64, f64),
    /// Inclusive range for the number of seeds.
    pub nodes: (usize, usize),
    pub curve: Curve,
}

impl Default for RandomGradient {
    fn default() -> Self {
        Self {
            hue: (0.0, 1.0),
            saturation: (0.0, 1.0),
            value: (0.0, 1.0),
            nodes: (5, 5),
            curve: Curve::Cosine,
        }
    }
}

fn uniform(rng: &mut impl Rng, (lo, hi): (f64, f64)) -> f64 {
    lo + (hi - lo) * rng.gen::<f64>()
}

impl RandomGradient {
    pub fn generate(&self, rng: &mut impl Rng) -> Result<Palette, PaletteError> {
        let (lo, hi) = self.nodes;
        let count = if lo >= hi { lo } else { rng.gen_range(lo..=hi) };
        let seeds: Vec<_> = (0..count)
            .map(|_| {
                let h = uniform(rng, self.hue);
                let s = uniform(rng, self.saturation);
                let v = uniform(rng, self.value);
                (h, s, v)
            })
            .collect();
        Palette::from_seeds(&seeds, self.curve)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_curve_from_str() {
        assert_eq!("lin".parse::<Curve>(), Ok(Curve::Linear));
        assert_eq!("cos".parse::<Curve>(), Ok(Curve::Cosine));
        assert_eq!("cubic".parse::<Curve>(), Err(PaletteError::UnknownCurve("cubic".to_string())));
    }

    #[test]
    fn test_curve_endpoints() {
        for curve in [Curve::Linear, Curve::Cosine] {
            assert_eq!(curve.blend(10.0, 20.0, 0.0), 10.0);
            assert!((curve.blend(10.0, 20.0, 1.0) - 20.0).abs() < 1e-12);
            assert!((curve.blend(10.0, 20.0, 0.5) - 15.0).abs() < 1e-12);
        }
        assert!(Curve::Cosine.blend(0.0, 1.0, 0.1) < Curve::Linear.blend(0.0, 1.0, 0.1));
    }

    #[test]
    fn test_from_seed_layout() {
        let palette = Palette::from_seed([255, 0, 0], 0.0, 30.0, 64, Curve::Linear).unwrap();
        assert_eq!(palette.len(), 256);
        // The seed itself opens the third run
        assert_eq!(palette[128], [255, 0, 0]);
        // The complement of red opens the first run
        assert_eq!(palette[0], [0, 255, 255]);
    }

    #[test]
    fn test_from_seed_extreme_dist() {
        assert!(Palette::from_seed([10, 200, 30], 0.0, 30.0, 0, Curve::Cosine).is_ok());
        assert!(Palette::from_seed([10, 200, 30], 0.0, 30.0, 128, Curve::Cosine).is_ok());
        assert_eq!(
            Palette::from_seed([10, 200, 30], 0.0, 30.0, 129, Curve::Cosine),
            Err(PaletteError::SplitTooWide(129))
        );
    }

    #[test]
    fn test_from_seeds_arc_starts() {
        // Three seeds: arcs of 86, 85, 85 entries
        let seeds = [(0.0, 1.0, 1.0), (1.0 / 3.0, 1.0, 1.0), (2.0 / 3.0, 1.0, 1.0)];
        let palette = Palette::from_seeds(&seeds, Curve::Linear).unwrap();
        // Each arc starts at the previous seed
        assert_eq!(palette[0], [0, 0, 255]);
        assert_eq!(palette[86], [255, 0, 0]);
        assert_eq!(palette[171], [0, 255, 0]);
    }

    #[test]
    fn test_from_seeds_requires_seed() {
        assert_eq!(Palette::from_seeds(&[], Curve::Cosine), Err(PaletteError::NoSeeds));
    }

    #[test]
    fn test_from_seeds_single_seed_is_flat() {
        let palette = Palette::from_seeds(&[(0.5, 1.0, 1.0)], Curve::Cosine).unwrap();
        assert!(palette.iter().all(|c| *c == [0, 255, 255]));
    }

    #[test]
    fn test_random_is_deterministic_per_seed() {
        let options = RandomGradient { nodes: (2, 7), ..Default::default() };
        let a = Palette::random(&options, &mut StdRng::seed_from_u64(9)).unwrap();
        let b = Palette::random(&options, &mut StdRng::seed_from_u64(9)).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 256);
    }
}
