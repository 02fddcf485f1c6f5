//! Configuration loading and discovery for `flamekit.toml`
//!
//! Provides functions to find, load, and merge configuration.

use super::schema::FlamekitConfig;
use crate::palette::Curve;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the configuration file.
pub const CONFIG_FILE: &str = "flamekit.toml";

/// Configuration loading error
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// File I/O error
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error
    #[error("Failed to parse flamekit.toml: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error
    #[error("Config validation failed:\n{}", .0.iter().map(|e| format!("  - {}", e)).collect::<Vec<_>>().join("\n"))]
    Validation(Vec<String>),
}

/// CLI arguments that can override config values
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    /// Override the default image size
    pub size: Option<[u32; 2]>,
    /// Override render quality
    pub quality: Option<f64>,
    /// Override the blend curve of every synthesized gradient
    pub curve: Option<Curve>,
    /// Disable `.bak` copies
    pub no_backup: bool,
    /// Override the tracing level
    pub log_level: Option<String>,
}

/// Find flamekit.toml by walking up from the current working directory.
///
/// Search order:
/// 1. Walk up from current directory looking for flamekit.toml
/// 2. Check XDG_CONFIG_HOME/flamekit/flamekit.toml (or ~/.config/flamekit/flamekit.toml)
pub fn find_config() -> Option<PathBuf> {
    if let Ok(cwd) = env::current_dir() {
        if let Some(path) = find_config_from(cwd) {
            return Some(path);
        }
    }

    find_xdg_config()
}

/// Find flamekit.toml in the XDG config directory.
pub fn find_xdg_config() -> Option<PathBuf> {
    let xdg_config = env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|_| env::var("HOME").map(|h| PathBuf::from(h).join(".config")))
        .ok()?;

    let config_path = xdg_config.join("flamekit").join(CONFIG_FILE);
    if config_path.exists() {
        Some(config_path)
    } else {
        None
    }
}

/// Find flamekit.toml by walking up from a specific directory.
pub fn find_config_from(start: PathBuf) -> Option<PathBuf> {
    let mut current = start;

    loop {
        let config_path = current.join(CONFIG_FILE);
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            return None;
        }
    }
}

/// Load configuration from a flamekit.toml file.
///
/// If a path is provided, loads from that file. Otherwise, uses `find_config()`
/// to locate the config file. If no config file is found, returns the defaults.
///
/// # Example
/// ```ignore
/// let config = load_config(None)?;
/// let config = load_config(Some(Path::new("renders/flamekit.toml")))?;
/// ```
pub fn load_config(path: Option<&Path>) -> Result<FlamekitConfig, ConfigError> {
    let config_path = match path {
        Some(p) => Some(p.to_path_buf()),
        None => find_config(),
    };

    match config_path {
        Some(p) => load_config_file(&p),
        None => Ok(default_config()),
    }
}

/// Load configuration from a specific file path.
fn load_config_file(path: &Path) -> Result<FlamekitConfig, ConfigError> {
    let contents = fs::read_to_string(path)?;
    let config: FlamekitConfig = toml::from_str(&contents)?;

    let errors = config.validate();
    if !errors.is_empty() {
        return Err(ConfigError::Validation(errors.into_iter().map(|e| e.to_string()).collect()));
    }

    tracing::debug!(path = %path.display(), "loaded config");
    Ok(config)
}

/// Configuration used when no flamekit.toml is found.
pub fn default_config() -> FlamekitConfig {
    FlamekitConfig::default()
}

/// Merge CLI overrides into a configuration.
///
/// CLI arguments take precedence over config file values.
pub fn merge_cli_overrides(config: &mut FlamekitConfig, overrides: &CliOverrides) {
    if let Some(size) = overrides.size {
        config.defaults.size = size;
    }
    if let Some(quality) = overrides.quality {
        config.defaults.quality = quality;
    }
    if let Some(curve) = overrides.curve {
        config.palette.curve = curve;
        config.palette.seed_curve = curve;
    }
    if overrides.no_backup {
        config.output.backup = false;
    }
    if let Some(ref level) = overrides.log_level {
        config.log_level = level.clone();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::fs::File;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_config(dir: &Path, contents: &[u8]) -> PathBuf {
        let config_path = dir.join(CONFIG_FILE);
        File::create(&config_path)
            .expect("should create config file")
            .write_all(contents)
            .expect("should write config content");
        config_path
    }

    #[test]
    fn test_find_config_in_current_dir() {
        let temp = TempDir::new().expect("should create temp dir");
        let config_path = write_config(temp.path(), b"log_level = \"info\"");

        let found = find_config_from(temp.path().to_path_buf());
        assert_eq!(found, Some(config_path));
    }

    #[test]
    fn test_find_config_in_parent_dir() {
        let temp = TempDir::new().expect("should create temp dir");
        let config_path = write_config(temp.path(), b"");

        let subdir = temp.path().join("flames").join("archive");
        fs::create_dir_all(&subdir).expect("should create subdirectories");

        let found = find_config_from(subdir);
        assert_eq!(found, Some(config_path));
    }

    #[test]
    fn test_find_config_not_found() {
        let temp = TempDir::new().expect("should create temp dir");
        let found = find_config_from(temp.path().to_path_buf());
        assert_eq!(found, None);
    }

    #[test]
    #[serial]
    fn test_find_xdg_config() {
        let temp = TempDir::new().expect("should create temp dir");
        let app_dir = temp.path().join("flamekit");
        fs::create_dir_all(&app_dir).expect("should create app dir");
        let config_path = write_config(&app_dir, b"");

        let previous = env::var_os("XDG_CONFIG_HOME");
        env::set_var("XDG_CONFIG_HOME", temp.path());
        let found = find_xdg_config();
        match previous {
            Some(value) => env::set_var("XDG_CONFIG_HOME", value),
            None => env::remove_var("XDG_CONFIG_HOME"),
        }
        assert_eq!(found, Some(config_path));
    }

    #[test]
    fn test_load_config_from_file() {
        let temp = TempDir::new().expect("should create temp dir");
        let config_path = write_config(
            temp.path(),
            br#"
[defaults]
size = [320, 200]

[palette]
curve = "lin"
"#,
        );

        let config = load_config(Some(&config_path)).expect("should load valid config");
        assert_eq!(config.defaults.size, [320, 200]);
        assert_eq!(config.defaults.scale, 25.0);
        assert_eq!(config.palette.curve, Curve::Linear);
    }

    #[test]
    fn test_load_config_missing_file() {
        let temp = TempDir::new().expect("should create temp dir");
        let result = load_config(Some(&temp.path().join("nonexistent.toml")));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_load_config_invalid_toml() {
        let temp = TempDir::new().expect("should create temp dir");
        let config_path = write_config(temp.path(), b"this is not valid toml {{{");

        let result = load_config(Some(&config_path));
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_load_config_validation_error() {
        let temp = TempDir::new().expect("should create temp dir");
        let config_path = write_config(temp.path(), b"[palette]\ndist = 300\n");

        let err = load_config(Some(&config_path)).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(ref errors) if errors.len() == 1));
        assert!(err.to_string().contains("  - flamekit.toml: 'palette.dist'"));
    }

    #[test]
    #[serial]
    fn test_load_config_discovers_from_cwd() {
        let temp = TempDir::new().expect("should create temp dir");
        write_config(temp.path(), b"log_level = \"trace\"\n");
        let nested = temp.path().join("a/b");
        fs::create_dir_all(&nested).expect("should create subdirectories");

        let previous = env::current_dir().expect("should read cwd");
        env::set_current_dir(&nested).expect("should change cwd");
        let config = load_config(None);
        env::set_current_dir(previous).expect("should restore cwd");

        assert_eq!(config.expect("should load discovered config").log_level, "trace");
    }

    #[test]
    fn test_merge_cli_overrides() {
        let mut config = default_config();
        let overrides = CliOverrides {
            size: Some([100, 50]),
            quality: Some(250.0),
            curve: Some(Curve::Cosine),
            no_backup: true,
            log_level: Some("debug".to_string()),
        };
        merge_cli_overrides(&mut config, &overrides);

        assert_eq!(config.defaults.size, [100, 50]);
        assert_eq!(config.defaults.quality, 250.0);
        assert_eq!(config.palette.curve, Curve::Cosine);
        assert_eq!(config.palette.seed_curve, Curve::Cosine);
        assert!(!config.output.backup);
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    fn test_merge_empty_overrides_is_noop() {
        let mut config = default_config();
        merge_cli_overrides(&mut config, &CliOverrides::default());
        assert_eq!(config, default_config());
    }
}
