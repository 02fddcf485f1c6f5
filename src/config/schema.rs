//! Configuration schema types for `flamekit.toml`
//!
//! Defines the structure and validation rules for flamekit configuration.
//! Every section is optional; missing keys take the defaults below.

use crate::palette::{Curve, RandomGradient, SmoothingOptimizer};
use serde::{Deserialize, Serialize};

/// Defaults for newly created flames and renders
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Image size in pixels
    #[serde(default = "default_size")]
    pub size: [u32; 2],
    /// Zoom in the internal unit
    #[serde(default = "default_scale")]
    pub scale: f64,
    /// Render quality passed to the engine
    #[serde(default = "default_quality")]
    pub quality: f64,
}

fn default_size() -> [u32; 2] {
    [640, 480]
}

fn default_scale() -> f64 {
    25.0
}

fn default_quality() -> f64 {
    100.0
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self { size: default_size(), scale: default_scale(), quality: default_quality() }
    }
}

/// Palette synthesis settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaletteConfig {
    /// Blend curve of random gradients, `lin` or `cos`
    #[serde(default)]
    pub curve: Curve,
    /// Blend curve of gradients built around a seed color
    #[serde(default = "default_seed_curve")]
    pub seed_curve: Curve,
    /// Hue offset of the split colors, in degrees
    #[serde(default = "default_split")]
    pub split: f64,
    /// Entries between the complement and each split color
    #[serde(default = "default_dist")]
    pub dist: usize,
    #[serde(default = "default_unit_range")]
    pub hue: [f64; 2],
    #[serde(default = "default_unit_range")]
    pub saturation: [f64; 2],
    #[serde(default = "default_unit_range")]
    pub value: [f64; 2],
    /// Inclusive range for the number of random gradient nodes
    #[serde(default = "default_nodes")]
    pub nodes: [usize; 2],
    /// Random restarts when ordering colors taken from an image
    #[serde(default = "default_num_tries")]
    pub num_tries: usize,
    /// Swaps attempted per restart
    #[serde(default = "default_try_size")]
    pub try_size: usize,
}

fn default_seed_curve() -> Curve {
    Curve::Linear
}

fn default_split() -> f64 {
    30.0
}

fn default_dist() -> usize {
    64
}

fn default_unit_range() -> [f64; 2] {
    [0.0, 1.0]
}

fn default_nodes() -> [usize; 2] {
    [5, 5]
}

fn default_num_tries() -> usize {
    50
}

fn default_try_size() -> usize {
    1000
}

impl Default for PaletteConfig {
    fn default() -> Self {
        Self {
            curve: Curve::default(),
            seed_curve: default_seed_curve(),
            split: default_split(),
            dist: default_dist(),
            hue: default_unit_range(),
            saturation: default_unit_range(),
            value: default_unit_range(),
            nodes: default_nodes(),
            num_tries: default_num_tries(),
            try_size: default_try_size(),
        }
    }
}

impl PaletteConfig {
    /// Options for [`crate::palette::Palette::random`].
    pub fn random_gradient(&self) -> RandomGradient {
        RandomGradient {
            hue: (self.hue[0], self.hue[1]),
            saturation: (self.saturation[0], self.saturation[1]),
            value: (self.value[0], self.value[1]),
            nodes: (self.nodes[0], self.nodes[1]),
            curve: self.curve,
        }
    }

    /// Optimizer used when extracting a palette from an image.
    pub fn optimizer(&self) -> SmoothingOptimizer {
        SmoothingOptimizer { num_tries: self.num_tries, try_size: self.try_size }
    }
}

/// File output settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Copy an existing `.flame` file to `.bak` before overwriting it
    #[serde(default = "default_true")]
    pub backup: bool,
}

fn default_true() -> bool {
    true
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { backup: true }
    }
}

/// Root configuration structure for `flamekit.toml`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlamekitConfig {
    #[serde(default)]
    pub defaults: DefaultsConfig,
    #[serde(default)]
    pub palette: PaletteConfig,
    #[serde(default)]
    pub output: OutputConfig,
    /// Tracing level: error, warn, info, debug or trace
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for FlamekitConfig {
    fn default() -> Self {
        Self {
            defaults: DefaultsConfig::default(),
            palette: PaletteConfig::default(),
            output: OutputConfig::default(),
            log_level: default_log_level(),
        }
    }
}

/// Configuration validation error
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    /// Path to the invalid field (e.g., "palette.dist")
    pub field: String,
    /// Error message
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "flamekit.toml: '{}' {}", self.field, self.message)
    }
}

const LOG_LEVELS: &[&str] = &["error", "warn", "info", "debug", "trace"];

impl FlamekitConfig {
    /// Validate the configuration and return any errors
    pub fn validate(&self) -> Vec<ConfigValidationError> {
        let mut errors = Vec::new();
        let mut push = |field: &str, message: &str| {
            errors.push(ConfigValidationError { field: field.to_string(), message: message.to_string() });
        };

        if self.defaults.size[0] == 0 || self.defaults.size[1] == 0 {
            push("defaults.size", "must have non-zero width and height");
        }
        if !(self.defaults.scale.is_finite() && self.defaults.scale > 0.0) {
            push("defaults.scale", "must be a positive number");
        }
        if !(self.defaults.quality.is_finite() && self.defaults.quality > 0.0) {
            push("defaults.quality", "must be a positive number");
        }

        if self.palette.dist > 128 {
            push("palette.dist", "must be at most 128");
        }
        for (field, [lo, hi]) in [
            ("palette.hue", self.palette.hue),
            ("palette.saturation", self.palette.saturation),
            ("palette.value", self.palette.value),
        ] {
            if !(0.0..=1.0).contains(&lo) || !(0.0..=1.0).contains(&hi) || lo > hi {
                push(field, "must be an ordered range within [0, 1]");
            }
        }
        let [min_nodes, max_nodes] = self.palette.nodes;
        if min_nodes == 0 || min_nodes > max_nodes {
            push("palette.nodes", "must be an ordered range of positive counts");
        }
        if self.palette.num_tries == 0 {
            push("palette.num_tries", "must be a positive integer");
        }

        if !LOG_LEVELS.contains(&self.log_level.to_ascii_lowercase().as_str()) {
            push("log_level", "must be one of error, warn, info, debug, trace");
        }

        errors
    }

    /// Check if validation passed
    pub fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_parse() {
        let config: FlamekitConfig = toml::from_str("").unwrap();
        assert_eq!(config, FlamekitConfig::default());
        assert_eq!(config.defaults.size, [640, 480]);
        assert_eq!(config.palette.curve, Curve::Cosine);
        assert_eq!(config.palette.seed_curve, Curve::Linear);
        assert!(config.output.backup);
        assert_eq!(config.log_level, "warn");
        assert!(config.is_valid());
    }

    #[test]
    fn test_full_config_parse() {
        let toml = r#"
log_level = "debug"

[defaults]
size = [1024, 768]
scale = 40.0
quality = 500.0

[palette]
curve = "lin"
seed_curve = "cos"
split = 15.0
dist = 32
hue = [0.2, 0.4]
nodes = [3, 8]
num_tries = 10
try_size = 200

[output]
backup = false
"#;
        let config: FlamekitConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.defaults.size, [1024, 768]);
        assert_eq!(config.defaults.quality, 500.0);
        assert_eq!(config.palette.curve, Curve::Linear);
        assert_eq!(config.palette.seed_curve, Curve::Cosine);
        assert_eq!(config.palette.dist, 32);
        assert_eq!(config.palette.saturation, [0.0, 1.0]);
        assert!(!config.output.backup);
        assert_eq!(config.log_level, "debug");

        let gradient = config.palette.random_gradient();
        assert_eq!(gradient.hue, (0.2, 0.4));
        assert_eq!(gradient.nodes, (3, 8));
        assert_eq!(config.palette.optimizer(), SmoothingOptimizer { num_tries: 10, try_size: 200 });
    }

    #[test]
    fn test_unknown_curve_rejected() {
        let result: Result<FlamekitConfig, _> = toml::from_str("[palette]\ncurve = \"cubic\"\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_validation_errors() {
        let toml = r#"
log_level = "loud"

[defaults]
size = [0, 480]
scale = -1.0

[palette]
dist = 200
hue = [0.8, 0.2]
nodes = [0, 4]
"#;
        let config: FlamekitConfig = toml::from_str(toml).unwrap();
        let fields: Vec<String> = config.validate().into_iter().map(|e| e.field).collect();
        for field in ["defaults.size", "defaults.scale", "palette.dist", "palette.hue", "palette.nodes", "log_level"] {
            assert!(fields.iter().any(|f| f == field), "missing {}", field);
        }
        assert!(!fields.iter().any(|f| f == "palette.value"));
    }

    #[test]
    fn test_validation_message() {
        let error = ConfigValidationError { field: "palette.dist".to_string(), message: "must be at most 128".to_string() };
        assert_eq!(error.to_string(), "flamekit.toml: 'palette.dist' must be at most 128");
    }
}
