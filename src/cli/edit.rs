//! Commands that modify flames: palette, symmetry, new

use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::config::FlamekitConfig;
use crate::flame::{Flame, RandomXform};
use crate::geometry::Rgb;
use crate::output::{save_flames, save_palette_png};
use crate::palette::Palette;

use super::{load_flames, EXIT_ERROR, EXIT_INVALID_ARGS, EXIT_SUCCESS};

/// Height of palette preview strips.
const PREVIEW_HEIGHT: u32 = 32;

/// Where a replacement palette comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum PaletteSource {
    /// Gradient around a seed color and its complement
    Seed(Rgb),
    /// Random multi-node gradient
    Random,
    /// Colors sampled from an image
    Image(PathBuf),
}

/// Palette edits, applied in field order after an optional replacement.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PaletteAdjust {
    pub source: Option<PaletteSource>,
    pub hue: Option<f64>,
    pub saturation: Option<f64>,
    pub brightness: Option<f64>,
    pub reverse: bool,
    pub rotate: Option<isize>,
    pub invert: bool,
}

fn rng_from(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

fn load_image_rgb(path: &Path) -> Result<image::RgbImage, String> {
    image::open(path).map(|img| img.to_rgb8()).map_err(|e| format!("Cannot open image '{}': {}", path.display(), e))
}

/// Build a replacement palette from `source`.
fn replacement(
    source: &PaletteSource,
    config: &FlamekitConfig,
    rng: &mut StdRng,
) -> Result<Palette, String> {
    let palette = &config.palette;
    let result = match source {
        PaletteSource::Seed(color) => Palette::from_seed(*color, 0.0, palette.split, palette.dist, palette.seed_curve),
        PaletteSource::Random => Palette::random(&palette.random_gradient(), rng),
        PaletteSource::Image(path) => {
            let img = load_image_rgb(path)?;
            Palette::from_image(img.as_raw(), img.width(), img.height(), &palette.optimizer(), rng)
        }
    };
    result.map_err(|e| e.to_string())
}

/// Apply `adjust` to a palette in place.
pub fn adjust_palette(gradient: &mut Palette, adjust: &PaletteAdjust) {
    if let Some(degrees) = adjust.hue {
        gradient.hue(degrees);
    }
    if let Some(percent) = adjust.saturation {
        gradient.saturation(percent);
    }
    if let Some(percent) = adjust.brightness {
        gradient.brightness(percent);
    }
    if adjust.reverse {
        gradient.reverse();
    }
    if let Some(k) = adjust.rotate {
        gradient.rotate(k);
    }
    if adjust.invert {
        gradient.invert();
    }
}

fn save(path: &Path, flames: &[Flame], config: &FlamekitConfig) -> ExitCode {
    match save_flames(path, flames, config.output.backup) {
        Ok(()) => {
            eprintln!("{}: saved {} flame(s)", path.display(), flames.len());
            ExitCode::from(EXIT_SUCCESS)
        }
        Err(e) => {
            eprintln!("Error: Cannot write '{}': {}", path.display(), e);
            ExitCode::from(EXIT_ERROR)
        }
    }
}

/// Execute the palette command
pub fn run_palette(
    file: &Path,
    output: Option<&Path>,
    adjust: &PaletteAdjust,
    rng_seed: Option<u64>,
    preview: Option<&Path>,
    config: &FlamekitConfig,
) -> ExitCode {
    let mut flames = match load_flames(file) {
        Ok(flames) => flames,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_ERROR);
        }
    };

    let mut rng = rng_from(rng_seed);
    for flame in &mut flames {
        if let Some(source) = &adjust.source {
            match replacement(source, config, &mut rng) {
                Ok(palette) => flame.gradient = palette,
                Err(e) => {
                    eprintln!("Error: {}", e);
                    return ExitCode::from(EXIT_INVALID_ARGS);
                }
            }
        }
        adjust_palette(&mut flame.gradient, adjust);
    }

    if let (Some(path), Some(first)) = (preview, flames.first()) {
        if let Err(e) = save_palette_png(&first.gradient, PREVIEW_HEIGHT, path) {
            eprintln!("Error: Cannot write '{}': {}", path.display(), e);
            return ExitCode::from(EXIT_ERROR);
        }
    }

    save(output.unwrap_or(file), &flames, config)
}

/// Execute the symmetry command
pub fn run_symmetry(
    file: &Path,
    kind: i32,
    seed: Option<u64>,
    output: Option<&Path>,
    config: &FlamekitConfig,
) -> ExitCode {
    let mut flames = match load_flames(file) {
        Ok(flames) => flames,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_ERROR);
        }
    };

    let mut rng = rng_from(seed);
    for flame in &mut flames {
        let added = flame.add_symmetry(kind, &mut rng);
        eprintln!("{}: added {} xform(s)", flame.name, added);
    }
    save(output.unwrap_or(file), &flames, config)
}

/// Build `count` random flames named after the output file.
pub fn random_flames(
    stem: &str,
    count: usize,
    xforms: usize,
    config: &FlamekitConfig,
    rng: &mut StdRng,
) -> Result<Vec<Flame>, String> {
    let options = RandomXform::default();
    let gradient = config.palette.random_gradient();
    let mut flames = Vec::with_capacity(count);
    for i in 0..count {
        let mut flame = Flame::new();
        flame.name = format!("{}_{:03}", stem, i + 1);
        flame.size = (config.defaults.size[0], config.defaults.size[1]);
        flame.scale = config.defaults.scale;
        flame.extra.set("quality", config.defaults.quality);
        flame.gradient = Palette::random(&gradient, rng).map_err(|e| e.to_string())?;
        for _ in 0..xforms {
            flame.add_random_xform(&options, rng);
        }
        flames.push(flame);
    }
    Ok(flames)
}

/// Execute the new command
pub fn run_new(output: &Path, count: usize, xforms: usize, seed: Option<u64>, config: &FlamekitConfig) -> ExitCode {
    let stem = output.file_stem().and_then(|s| s.to_str()).unwrap_or("flame");
    let mut rng = rng_from(seed);
    match random_flames(stem, count, xforms, config, &mut rng) {
        Ok(flames) => save(output, &flames, config),
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(EXIT_ERROR)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_adjust_palette_order() {
        let mut gradient = Palette::default();
        gradient.set(0, [10, 20, 30]);
        let adjust = PaletteAdjust { reverse: true, invert: true, ..Default::default() };
        adjust_palette(&mut gradient, &adjust);
        assert_eq!(gradient[255], [245, 235, 225]);
        assert_eq!(gradient[0], [255, 255, 255]);
    }

    #[test]
    fn test_seed_replacement_uses_config() {
        let config = FlamekitConfig::default();
        let mut rng = rng_from(Some(1));
        let palette = replacement(&PaletteSource::Seed([200, 40, 40]), &config, &mut rng).unwrap();
        assert_eq!(palette.len(), 256);

        let mut narrow = FlamekitConfig::default();
        narrow.palette.dist = 129;
        assert!(replacement(&PaletteSource::Seed([200, 40, 40]), &narrow, &mut rng).is_err());
    }

    #[test]
    fn test_random_flames_follow_config() {
        let mut config = FlamekitConfig::default();
        config.defaults.size = [320, 200];
        let mut rng = rng_from(Some(7));
        let flames = random_flames("batch", 2, 3, &config, &mut rng).unwrap();

        assert_eq!(flames.len(), 2);
        assert_eq!(flames[1].name, "batch_002");
        assert_eq!(flames[0].size, (320, 200));
        assert_eq!(flames[0].xforms().len(), 3);
        assert_eq!(flames[0].extra.number("quality"), 100.0);
    }

    #[test]
    fn test_random_flames_are_seeded() {
        let config = FlamekitConfig::default();
        let a = random_flames("a", 1, 2, &config, &mut rng_from(Some(3))).unwrap();
        let b = random_flames("a", 1, 2, &config, &mut rng_from(Some(3))).unwrap();
        assert_eq!(a[0].to_string(), b[0].to_string());
    }
}
