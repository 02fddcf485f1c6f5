//! Fmt command implementation

use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::config::FlamekitConfig;
use crate::fmt::write_flames;
use crate::output::save_flames;

use super::{expand_inputs, read_flame_file, EXIT_ERROR, EXIT_INVALID_ARGS, EXIT_SUCCESS};

/// What happened to one file.
#[derive(Debug, PartialEq)]
enum Outcome {
    Formatted,
    Unchanged,
    NeedsFormatting,
}

fn format_file(input: &Path, target: &Path, check: bool, backup: bool) -> Result<Outcome, String> {
    let (content, flames) = read_flame_file(input)?;
    let formatted = write_flames(&flames);

    if content == formatted && input == target {
        return Ok(Outcome::Unchanged);
    }
    if check {
        return Ok(Outcome::NeedsFormatting);
    }
    save_flames(target, &flames, backup).map_err(|e| format!("Cannot write '{}': {}", target.display(), e))?;
    Ok(Outcome::Formatted)
}

/// Execute the fmt command
pub fn run_fmt(inputs: &[String], output: Option<&Path>, check: bool, config: &FlamekitConfig) -> ExitCode {
    let files = match expand_inputs(inputs) {
        Ok(files) => files,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_INVALID_ARGS);
        }
    };
    if output.is_some() && files.len() != 1 {
        eprintln!("Error: --output needs exactly one input file, got {}", files.len());
        return ExitCode::from(EXIT_INVALID_ARGS);
    }

    let backup = config.output.backup;
    let results: Vec<(PathBuf, Result<Outcome, String>)> = files
        .par_iter()
        .map(|file| {
            let target = output.unwrap_or(file);
            (file.clone(), format_file(file, target, check, backup))
        })
        .collect();

    let mut failed = false;
    for (file, result) in results {
        match result {
            Ok(Outcome::Formatted) => eprintln!("{}: formatted", file.display()),
            Ok(Outcome::Unchanged) => eprintln!("{}: already formatted", file.display()),
            Ok(Outcome::NeedsFormatting) => {
                eprintln!("{}: needs formatting", file.display());
                failed = true;
            }
            Err(e) => {
                eprintln!("Error: {}", e);
                failed = true;
            }
        }
    }

    if failed {
        ExitCode::from(EXIT_ERROR)
    } else {
        ExitCode::from(EXIT_SUCCESS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flame::Flame;
    use tempfile::TempDir;

    const LEGACY: &str = r#"<flames><flame name="old" version="Apophysis 2.08" zoom="1" scale="50" size="100 100"><xform weight="1" linear="1" symmetry="1" coefs="1 0 0 1 0 0"/><palette count="256" format="RGB">"#;

    fn legacy_document() -> String {
        format!("{}{}</palette></flame></flames>", LEGACY, "000000".repeat(256))
    }

    #[test]
    fn test_format_file_migrates_in_place() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("old.flame");
        std::fs::write(&path, legacy_document()).unwrap();

        assert_eq!(format_file(&path, &path, false, true).unwrap(), Outcome::Formatted);
        assert!(temp.path().join("old.bak").exists());

        let text = std::fs::read_to_string(&path).unwrap();
        let flame = Flame::parse(&text).unwrap();
        assert_eq!(flame.version.as_deref(), Some(crate::compat::VERSION));
        assert!(!text.contains("zoom="));

        // A second pass has nothing left to do
        assert_eq!(format_file(&path, &path, false, true).unwrap(), Outcome::Unchanged);
    }

    #[test]
    fn test_format_file_check_does_not_write() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("old.flame");
        std::fs::write(&path, legacy_document()).unwrap();

        assert_eq!(format_file(&path, &path, true, true).unwrap(), Outcome::NeedsFormatting);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), legacy_document());
    }

    #[test]
    fn test_format_file_reports_parse_errors() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("bad.flame");
        std::fs::write(&path, "<flames></flames>").unwrap();
        let err = format_file(&path, &path, false, false).unwrap_err();
        assert!(err.contains("contains no flames"));
    }
}
