//! Info command implementations (info, variations)

use serde_json::json;
use std::path::Path;
use std::process::ExitCode;

use crate::compat;
use crate::flame::Flame;
use crate::variations::VARIATIONS;

use super::{read_flame_file, EXIT_ERROR, EXIT_SUCCESS};

/// Variation names used by any xform of the flame, in catalog order.
fn variations_in_use(flame: &Flame) -> Vec<&'static str> {
    VARIATIONS
        .iter()
        .map(|v| v.name)
        .filter(|name| flame.iter_xforms().any(|x| x.get(name) != 0.0))
        .collect()
}

fn flame_json(flame: &Flame) -> serde_json::Value {
    json!({
        "name": flame.name,
        "version": flame.version,
        "legacy": !compat::is_current(flame.version.as_deref()),
        "size": [flame.width(), flame.height()],
        "center": [flame.center.0, flame.center.1],
        "scale": flame.scale,
        "rotate": flame.rotate,
        "xforms": flame.xforms().len(),
        "final": flame.final_xform().is_some(),
        "posts": flame.iter_posts().count(),
        "variations": variations_in_use(flame),
    })
}

fn print_flame(flame: &Flame) {
    println!("{}", flame.name);
    println!("  size:       {}x{}", flame.width(), flame.height());
    println!("  center:     {} {}", flame.center.0, flame.center.1);
    println!("  scale:      {}", flame.scale);
    let finals = if flame.final_xform().is_some() { " + final" } else { "" };
    println!("  xforms:     {}{}", flame.xforms().len(), finals);
    println!("  variations: {}", variations_in_use(flame).join(", "));
}

/// Execute the info command
pub fn run_info(file: &Path, json: bool) -> ExitCode {
    let (text, flames) = match read_flame_file(file) {
        Ok(read) => read,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_ERROR);
        }
    };
    // The version check reads the raw root element; parsing migrates.
    let legacy = crate::parser::needs_conversion(&text).unwrap_or(false);

    if json {
        let report = json!({
            "file": file.display().to_string(),
            "needs_conversion": legacy,
            "flames": flames.iter().map(flame_json).collect::<Vec<_>>(),
        });
        match serde_json::to_string_pretty(&report) {
            Ok(text) => println!("{}", text),
            Err(e) => {
                eprintln!("Error: {}", e);
                return ExitCode::from(EXIT_ERROR);
            }
        }
    } else {
        println!("{}: {} flame(s){}", file.display(), flames.len(), if legacy { " (needs conversion)" } else { "" });
        for flame in &flames {
            println!();
            print_flame(flame);
        }
    }
    ExitCode::from(EXIT_SUCCESS)
}

/// Execute the variations command
pub fn run_variations(params: bool) -> ExitCode {
    for (index, variation) in VARIATIONS.iter().enumerate() {
        println!("{:3} {}", index, variation.name);
        if params {
            for (name, default) in variation.params {
                println!("      {} = {}", name, default);
            }
        }
    }
    ExitCode::from(EXIT_SUCCESS)
}
