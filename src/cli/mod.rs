//! Command-line interface implementation
//!
//! This module provides the `flk` entry point and dispatches to submodules
//! for specific command implementations.

mod edit;
mod fmt;
mod info;

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::str::FromStr;

use glob::glob;
use tracing::Level;

use crate::config::{self, CliOverrides, FlamekitConfig};
use crate::flame::Flame;
use crate::geometry::Rgb;
use crate::palette::Curve;
use crate::parser;

pub(crate) const EXIT_SUCCESS: u8 = 0;
pub(crate) const EXIT_ERROR: u8 = 1;
pub(crate) const EXIT_INVALID_ARGS: u8 = 2;

/// Check if a path has a flame file extension (.flame or .xml).
pub fn is_flame_file(path: &Path) -> bool {
    matches!(path.extension().and_then(|e| e.to_str()), Some("flame") | Some("xml"))
}

/// Expand command-line inputs. Arguments containing glob characters are
/// matched against the filesystem; a pattern matching nothing is an error.
pub fn expand_inputs(inputs: &[String]) -> Result<Vec<PathBuf>, String> {
    let mut files = Vec::new();
    for input in inputs {
        if !input.contains(['*', '?', '[']) {
            files.push(PathBuf::from(input));
            continue;
        }
        let paths = glob(input).map_err(|e| format!("invalid pattern '{}': {}", input, e))?;
        let before = files.len();
        files.extend(paths.filter_map(Result::ok).filter(|p| is_flame_file(p)));
        if files.len() == before {
            return Err(format!("no flame files match '{}'", input));
        }
    }
    Ok(files)
}

/// Parse an `RRGGBB` color, with or without a leading `#`.
pub fn parse_hex_color(text: &str) -> Result<Rgb, String> {
    let hex = text.strip_prefix('#').unwrap_or(text);
    if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(format!("expected RRGGBB, got '{}'", text));
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|e| e.to_string());
    Ok([channel(0)?, channel(2)?, channel(4)?])
}

fn parse_size(text: &str) -> Result<[u32; 2], String> {
    let (w, h) = text.split_once('x').ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{}'", text))?;
    let w: u32 = w.trim().parse().map_err(|_| format!("invalid width in '{}'", text))?;
    let h: u32 = h.trim().parse().map_err(|_| format!("invalid height in '{}'", text))?;
    if w == 0 || h == 0 {
        return Err(format!("size must be non-zero, got '{}'", text));
    }
    Ok([w, h])
}

/// Read a file and parse every flame in it, keeping the raw text.
pub(crate) fn read_flame_file(path: &Path) -> Result<(String, Vec<Flame>), String> {
    let text = std::fs::read_to_string(path).map_err(|e| format!("Cannot read '{}': {}", path.display(), e))?;
    let flames = parser::parse_flames(&text).map_err(|e| format!("Cannot parse '{}': {}", path.display(), e))?;
    if flames.is_empty() {
        return Err(format!("'{}' contains no flames", path.display()));
    }
    Ok((text, flames))
}

/// Read and parse every flame in a file.
pub(crate) fn load_flames(path: &Path) -> Result<Vec<Flame>, String> {
    read_flame_file(path).map(|(_, flames)| flames)
}

/// Flamekit - edit fractal flame genomes, palettes and legacy files
#[derive(Parser)]
#[command(name = "flk")]
#[command(about = "Flamekit - edit fractal flame genomes (.flame) and their palettes")]
#[command(version)]
pub struct Cli {
    /// Path to flamekit.toml (default: discovered from the current directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Increase log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Log level when -v is not given (overrides log_level in flamekit.toml)
    #[arg(long, global = true, value_parser = ["error", "warn", "info", "debug", "trace"])]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Parse, migrate and re-save flame files in the current format
    Fmt {
        /// Input files or glob patterns
        #[arg(required = true)]
        files: Vec<String>,

        /// Write to this file instead of in place (single input only)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Report files that would change without writing them
        #[arg(long)]
        check: bool,

        /// Do not keep a .bak copy of overwritten files
        #[arg(long)]
        no_backup: bool,
    },

    /// Show the flames in a file
    Info {
        /// Input flame file
        file: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List the variation catalog
    Variations {
        /// Also list each variation's parameters and defaults
        #[arg(long)]
        params: bool,
    },

    /// Adjust or replace the palette of every flame in a file
    Palette {
        /// Input flame file
        file: PathBuf,

        /// Output file (default: overwrite the input)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Rotate hues by this many degrees
        #[arg(long, allow_hyphen_values = true)]
        hue: Option<f64>,

        /// Shift saturation by this many percent
        #[arg(long, allow_hyphen_values = true)]
        saturation: Option<f64>,

        /// Shift lightness by this many percent
        #[arg(long, allow_hyphen_values = true)]
        brightness: Option<f64>,

        /// Reverse the palette
        #[arg(long)]
        reverse: bool,

        /// Rotate entries by this many places
        #[arg(long, allow_hyphen_values = true)]
        rotate: Option<isize>,

        /// Invert every color
        #[arg(long)]
        invert: bool,

        /// Replace the palette with a gradient around this RRGGBB color
        #[arg(long, value_parser = parse_hex_color, conflicts_with_all = ["random", "image"])]
        seed: Option<Rgb>,

        /// Replace the palette with a random gradient
        #[arg(long, conflicts_with = "image")]
        random: bool,

        /// Replace the palette with colors sampled from an image
        #[arg(long)]
        image: Option<PathBuf>,

        /// Blend curve for synthesized gradients (lin or cos)
        #[arg(long)]
        curve: Option<String>,

        /// Random seed for --random and --image
        #[arg(long)]
        rng_seed: Option<u64>,

        /// Also save a PNG strip of the first flame's palette
        #[arg(long)]
        preview: Option<PathBuf>,
    },

    /// Add rotational or reflective symmetry to every flame in a file
    Symmetry {
        /// Input flame file
        file: PathBuf,

        /// Symmetry order; negative adds a reflection, 0 picks one at random
        #[arg(short, long, allow_hyphen_values = true)]
        kind: i32,

        /// Random seed used when --kind is 0
        #[arg(long)]
        seed: Option<u64>,

        /// Output file (default: overwrite the input)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Create a file of random flames
    New {
        /// Output flame file
        output: PathBuf,

        /// Number of flames
        #[arg(short = 'n', long, default_value = "1")]
        count: usize,

        /// Xforms per flame
        #[arg(long, default_value = "3")]
        xforms: usize,

        /// Image size, e.g. 1024x768 (default from config)
        #[arg(long, value_parser = parse_size)]
        size: Option<[u32; 2]>,

        /// Render quality recorded in each flame (default from config)
        #[arg(long)]
        quality: Option<f64>,

        /// Random seed
        #[arg(long)]
        seed: Option<u64>,
    },
}

fn level_for(verbose: u8, config: &FlamekitConfig) -> Level {
    match verbose {
        0 => Level::from_str(&config.log_level).unwrap_or(Level::WARN),
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

fn init_tracing(level: Level) {
    // A second init (e.g. from a test harness) keeps the existing subscriber.
    let _ = tracing_subscriber::fmt().with_max_level(level).with_writer(std::io::stderr).with_target(false).try_init();
}

/// Entry point for the CLI
pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let mut config = match config::load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_ERROR);
        }
    };

    let mut overrides = match &cli.command {
        Commands::Fmt { no_backup, .. } => CliOverrides { no_backup: *no_backup, ..Default::default() },
        Commands::New { size, quality, .. } => {
            CliOverrides { size: *size, quality: *quality, ..Default::default() }
        }
        Commands::Palette { curve: Some(curve), .. } => match curve.parse::<Curve>() {
            Ok(curve) => CliOverrides { curve: Some(curve), ..Default::default() },
            Err(e) => {
                eprintln!("Error: {}", e);
                return ExitCode::from(EXIT_INVALID_ARGS);
            }
        },
        _ => CliOverrides::default(),
    };
    overrides.log_level = cli.log_level.clone();
    config::merge_cli_overrides(&mut config, &overrides);
    let errors = config.validate();
    if !errors.is_empty() {
        for error in &errors {
            eprintln!("Error: {}", error);
        }
        return ExitCode::from(EXIT_INVALID_ARGS);
    }
    init_tracing(level_for(cli.verbose, &config));

    match cli.command {
        Commands::Fmt { files, output, check, .. } => fmt::run_fmt(&files, output.as_deref(), check, &config),
        Commands::Info { file, json } => info::run_info(&file, json),
        Commands::Variations { params } => info::run_variations(params),
        Commands::Palette {
            file,
            output,
            hue,
            saturation,
            brightness,
            reverse,
            rotate,
            invert,
            seed,
            random,
            image,
            rng_seed,
            preview,
            ..
        } => {
            let source = match (seed, random, image) {
                (Some(color), _, _) => Some(edit::PaletteSource::Seed(color)),
                (None, true, _) => Some(edit::PaletteSource::Random),
                (None, false, Some(path)) => Some(edit::PaletteSource::Image(path)),
                (None, false, None) => None,
            };
            let adjust = edit::PaletteAdjust { source, hue, saturation, brightness, reverse, rotate, invert };
            edit::run_palette(&file, output.as_deref(), &adjust, rng_seed, preview.as_deref(), &config)
        }
        Commands::Symmetry { file, kind, seed, output } => {
            edit::run_symmetry(&file, kind, seed, output.as_deref(), &config)
        }
        Commands::New { output, count, xforms, seed, .. } => edit::run_new(&output, count, xforms, seed, &config),
    }
}
